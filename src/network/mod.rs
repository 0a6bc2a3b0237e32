pub use location_graph::{LocationGraph, LocationGraphBuilder};

mod location_graph;

/// A named place. Coordinates are carried along for renderers and never used for routing decisions.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    name: String,
    longitude: f64,
    latitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Location {
            name: name.into(),
            longitude,
            latitude,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }
}

/// Undirected connection between two locations, stored as it was added.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}
