use derive_builder::Builder;
use itertools::Itertools;
use std::fs;
use tracing::{info, warn};

use crate::config::write_config;
use crate::error::ScenarioError;
use crate::io::{resolve_path, write_json};
use crate::mst::{compute_mst_with, MstReport, MstResult, PrimStrategy};
use crate::scenario::Scenario;

#[derive(Debug, Builder)]
#[builder(pattern = "owned")]
pub struct MstController {
    scenario: Scenario,
    /// Overrides the strategy from the config.
    #[builder(default, setter(strip_option))]
    strategy: Option<PrimStrategy>,
}

impl MstController {
    /// Computes the spanning tree, reports it and writes output files if an output directory is
    /// configured.
    pub fn run(self) -> Result<MstResult, ScenarioError> {
        let config = &self.scenario.config;
        let graph = &self.scenario.graph;
        let strategy = self.strategy.unwrap_or(config.mst().strategy);

        let result = compute_mst_with(graph, self.scenario.start, strategy)?;
        let report = MstReport::new(graph, &result);

        info!("Spanning tree starting from {}:", report.start);
        for edge in &report.tree {
            info!("Edge: {} - {} Weight: {}", edge.from, edge.to, edge.weight);
        }
        info!("Total cost of spanning tree: {}", report.total_cost);
        if !report.spanning {
            warn!(
                "Not reachable from {}: {}",
                report.start,
                report.unreached.iter().join(", ")
            );
        }

        if let Some(output_dir) = config.output().output_dir {
            let output_path = resolve_path(config.context(), &output_dir);
            fs::create_dir_all(&output_path).map_err(|source| ScenarioError::Io {
                path: output_path.clone(),
                source,
            })?;

            info!("Writing output files to {output_path:?}");
            write_config(config, &output_path)?;
            write_json(&report, &output_path.join("output_mst.json"))?;
        }

        Ok(result)
    }
}
