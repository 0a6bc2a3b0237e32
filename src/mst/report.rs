use serde::{Deserialize, Serialize};

use super::MstResult;
use crate::network::LocationGraph;

/// Name based view of a spanning tree and its input links, handed to renderers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MstReport {
    pub start: String,
    pub total_cost: f64,
    pub spanning: bool,
    pub tree: Vec<NamedLink>,
    pub unreached: Vec<String>,
    pub links: Vec<NamedLink>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NamedLink {
    pub from: String,
    pub to: String,
    pub weight: f64,
}

impl MstReport {
    pub fn new(graph: &LocationGraph, result: &MstResult) -> Self {
        let name = |index: usize| {
            graph
                .location(index)
                .map(|l| l.name().to_string())
                .unwrap_or_else(|| index.to_string())
        };

        MstReport {
            start: name(result.start()),
            total_cost: result.total_cost(),
            spanning: result.is_spanning(),
            tree: result
                .edges()
                .iter()
                .map(|e| NamedLink {
                    from: name(e.parent),
                    to: name(e.child),
                    weight: e.weight,
                })
                .collect(),
            unreached: result.unreached().iter().map(|&v| name(v)).collect(),
            links: graph
                .links()
                .iter()
                .map(|l| NamedLink {
                    from: name(l.from),
                    to: name(l.to),
                    weight: l.weight,
                })
                .collect(),
        }
    }
}
