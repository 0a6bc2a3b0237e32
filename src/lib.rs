pub mod config;
pub mod controller;
pub mod error;
pub mod io;
pub mod logging;
pub mod mst;
pub mod network;
pub mod scenario;
