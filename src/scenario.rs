use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::ScenarioError;
use crate::io::{resolve_path, NetworkDefinition};
use crate::network::LocationGraph;

/// Everything a run needs: the config, the finalized graph and the resolved start vertex.
#[derive(Debug)]
pub struct Scenario {
    pub config: Arc<Config>,
    pub graph: LocationGraph,
    pub start: usize,
}

impl Scenario {
    pub fn load(config: Arc<Config>) -> Result<Self, ScenarioError> {
        let network = config.network()?;
        let path = resolve_path(config.context(), &network.path);
        let definition = NetworkDefinition::from_file(&path)?;
        let graph = LocationGraph::from_definition(&definition)?;
        Self::new(config, graph)
    }

    /// Wraps an already built graph. The start vertex is looked up by the configured name, the
    /// first location is used if no name is configured.
    pub fn new(config: Arc<Config>, graph: LocationGraph) -> Result<Self, ScenarioError> {
        let start = match config.mst().start {
            Some(name) => graph.find_vertex_by_name(&name)?,
            None => 0,
        };
        info!(
            "Scenario with {} locations and {} links, starting at #{start}",
            graph.vertex_count(),
            graph.links().len()
        );
        Ok(Scenario {
            config,
            graph,
            start,
        })
    }
}
