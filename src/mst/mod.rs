use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GraphError;
use crate::network::LocationGraph;

pub use report::{MstReport, NamedLink};

mod prim;
mod report;

/// How Prim's algorithm picks the next vertex. Both strategies apply the same tie-break (lowest
/// vertex index among equal keys) and therefore produce identical results.
#[derive(PartialEq, Eq, Debug, ValueEnum, Clone, Copy, Serialize, Deserialize, Default)]
pub enum PrimStrategy {
    /// Keyed binary heap with decrease-key. O(E log V).
    #[default]
    Queue,
    /// Linear scan over all keys per extraction. O(V²), meant for small graphs and cross checks.
    DenseScan,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MstEdge {
    pub parent: usize,
    pub child: usize,
    pub weight: f64,
}

/// Outcome of one spanning tree computation.
///
/// Edges are ordered by child index. Vertices which could not be reached from the start vertex
/// are listed in `unreached`; in that case the edges only span the start vertex' component.
#[derive(Debug, Clone, PartialEq)]
pub struct MstResult {
    start: usize,
    edges: Vec<MstEdge>,
    total_cost: f64,
    unreached: Vec<usize>,
}

impl MstResult {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn edges(&self) -> &[MstEdge] {
        &self.edges
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn unreached(&self) -> &[usize] {
        &self.unreached
    }

    /// True if every vertex of the graph is part of the tree.
    pub fn is_spanning(&self) -> bool {
        self.unreached.is_empty()
    }
}

/// Computes a minimum spanning tree rooted at `start` with the default [`PrimStrategy::Queue`].
pub fn compute_mst(graph: &LocationGraph, start: usize) -> Result<MstResult, GraphError> {
    compute_mst_with(graph, start, PrimStrategy::default())
}

pub fn compute_mst_with(
    graph: &LocationGraph,
    start: usize,
    strategy: PrimStrategy,
) -> Result<MstResult, GraphError> {
    if !graph.contains(start) {
        return Err(GraphError::IndexOutOfRange {
            index: start,
            vertex_count: graph.vertex_count(),
        });
    }
    debug!(
        "Computing spanning tree from vertex {start} over {} vertices with {strategy:?}",
        graph.vertex_count()
    );

    let state = match strategy {
        PrimStrategy::Queue => prim::grow_with_queue(graph, start),
        PrimStrategy::DenseScan => prim::grow_with_dense_scan(graph, start),
    };

    let mut edges = Vec::new();
    let mut total_cost = 0.0;
    let mut unreached = Vec::new();
    for vertex in 0..graph.vertex_count() {
        if let Some(parent) = state.parent[vertex] {
            let weight = state.key[vertex];
            debug!("Tree edge {parent} - {vertex} with weight {weight}");
            edges.push(MstEdge {
                parent,
                child: vertex,
                weight,
            });
            total_cost += weight;
        } else if !state.in_tree[vertex] {
            unreached.push(vertex);
        }
    }

    debug!("Total cost of spanning tree: {total_cost}");
    if !unreached.is_empty() {
        warn!(
            "{} vertices are not reachable from vertex {start}; the tree only spans its component",
            unreached.len()
        );
    }

    Ok(MstResult {
        start,
        edges,
        total_cost,
        unreached,
    })
}

#[cfg(test)]
mod tests {
    use crate::error::GraphError;
    use crate::mst::{compute_mst, compute_mst_with, MstEdge, PrimStrategy};
    use crate::network::{LocationGraph, LocationGraphBuilder};

    fn graph(names: &[&str], links: &[(usize, usize, f64)]) -> LocationGraph {
        let mut builder = LocationGraphBuilder::new(names.len()).unwrap();
        for (index, name) in names.iter().enumerate() {
            builder.set_vertex(index, *name, 0., 0.).unwrap();
        }
        for &(from, to, weight) in links {
            builder.link(from, to, weight).unwrap();
        }
        builder.build().unwrap()
    }

    fn edge(parent: usize, child: usize, weight: f64) -> MstEdge {
        MstEdge {
            parent,
            child,
            weight,
        }
    }

    #[test]
    fn triangle() {
        let graph = graph(&["A", "B", "C"], &[(0, 1, 1.), (1, 2, 2.), (0, 2, 5.)]);
        let start = graph.find_vertex_by_name("A").unwrap();

        let result = compute_mst(&graph, start).unwrap();

        assert_eq!(result.edges(), &[edge(0, 1, 1.), edge(1, 2, 2.)]);
        assert_eq!(result.total_cost(), 3.);
        assert!(result.is_spanning());
        assert_eq!(result.start(), 0);
    }

    #[test]
    fn single_vertex() {
        let graph = graph(&["A"], &[]);
        let result = compute_mst(&graph, 0).unwrap();
        assert!(result.edges().is_empty());
        assert_eq!(result.total_cost(), 0.);
        assert!(result.is_spanning());
    }

    #[test]
    fn start_out_of_range() {
        let graph = graph(&["A", "B"], &[(0, 1, 1.)]);
        assert_eq!(
            compute_mst(&graph, 2).unwrap_err(),
            GraphError::IndexOutOfRange {
                index: 2,
                vertex_count: 2
            }
        );
    }

    #[test]
    fn isolated_vertex_is_reported() {
        let graph = graph(&["A", "B", "C", "D"], &[(0, 1, 4.), (1, 2, 1.), (0, 2, 2.)]);

        for strategy in [PrimStrategy::Queue, PrimStrategy::DenseScan] {
            let result = compute_mst_with(&graph, 0, strategy).unwrap();
            assert_eq!(result.edges(), &[edge(2, 1, 1.), edge(0, 2, 2.)]);
            assert_eq!(result.total_cost(), 3.);
            assert_eq!(result.unreached(), &[3]);
            assert!(!result.is_spanning());
        }
    }

    #[test]
    fn start_in_isolated_vertex() {
        let graph = graph(&["A", "B", "C"], &[(0, 1, 4.)]);
        let result = compute_mst(&graph, 2).unwrap();
        assert!(result.edges().is_empty());
        assert_eq!(result.unreached(), &[0, 1]);
    }

    #[test]
    fn equal_keys_resolve_to_lowest_index() {
        // 1 and 2 both enter with key 1. 1 is extracted first and claims 3, 2 cannot improve it.
        let graph = graph(
            &["A", "B", "C", "D"],
            &[(0, 2, 1.), (0, 1, 1.), (2, 3, 2.), (1, 3, 2.)],
        );

        for strategy in [PrimStrategy::Queue, PrimStrategy::DenseScan] {
            for _ in 0..5 {
                let result = compute_mst_with(&graph, 0, strategy).unwrap();
                assert_eq!(
                    result.edges(),
                    &[edge(0, 1, 1.), edge(0, 2, 1.), edge(1, 3, 2.)]
                );
            }
        }
    }

    #[test]
    fn zero_weights_and_parallel_links() {
        let graph = graph(&["A", "B", "C"], &[(0, 1, 3.), (0, 1, 0.), (1, 2, 0.)]);
        let result = compute_mst(&graph, 0).unwrap();
        assert_eq!(result.edges(), &[edge(0, 1, 0.), edge(1, 2, 0.)]);
        assert_eq!(result.total_cost(), 0.);
    }

    #[test]
    fn self_loops_are_ignored() {
        let graph = graph(&["A", "B"], &[(0, 0, 0.5), (0, 1, 2.)]);
        let result = compute_mst(&graph, 0).unwrap();
        assert_eq!(result.edges(), &[edge(0, 1, 2.)]);
    }

    #[test]
    fn strategies_agree() {
        let graph = graph(
            &["A", "B", "C", "D", "E"],
            &[
                (0, 1, 2.),
                (0, 3, 6.),
                (1, 2, 3.),
                (1, 3, 8.),
                (1, 4, 5.),
                (2, 4, 7.),
                (3, 4, 9.),
            ],
        );
        for start in 0..graph.vertex_count() {
            let queue = compute_mst_with(&graph, start, PrimStrategy::Queue).unwrap();
            let dense = compute_mst_with(&graph, start, PrimStrategy::DenseScan).unwrap();
            assert_eq!(queue, dense);
            assert_eq!(queue.total_cost(), 16.);
        }
    }
}
