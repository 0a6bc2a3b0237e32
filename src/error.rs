use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while constructing or querying a [`crate::network::LocationGraph`].
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("a location graph needs at least one vertex, got {0}")]
    InvalidSize(usize),
    #[error("vertex index {index} is out of range or unassigned (vertex count {vertex_count})")]
    IndexOutOfRange { index: usize, vertex_count: usize },
    #[error("a vertex named '{0}' already exists")]
    DuplicateName(String),
    #[error("edge weight {0} is not a finite, non-negative number")]
    InvalidWeight(f64),
    #[error("no vertex named '{0}'")]
    NotFound(String),
    #[error("vertex slot {0} was never assigned")]
    UnassignedVertex(usize),
}

/// Errors raised while loading a config or a network definition from disk.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse yaml in {path:?}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to read or write json at {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("config module '{0}' was not set")]
    MissingModule(&'static str),
    #[error("invalid value '{value}' for config key '{key}'")]
    InvalidOverride { key: String, value: String },
    #[error(transparent)]
    Graph(#[from] GraphError),
}
