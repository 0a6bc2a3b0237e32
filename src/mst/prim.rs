use std::cmp::Ordering;

use keyed_priority_queue::KeyedPriorityQueue;
use tracing::trace;

use crate::network::LocationGraph;

/// Priority of a vertex in the queue. Ordering is reversed so that the max-queue pops the smallest
/// weight first and, among equal weights, the lowest vertex index.
#[derive(Debug, Clone, Copy)]
pub(super) struct Key {
    weight: f64,
    vertex: usize,
}

impl Key {
    fn new(weight: f64, vertex: usize) -> Self {
        Key { weight, vertex }
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then_with(|| self.vertex.cmp(&other.vertex))
            .reverse()
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Key {}

/// Working arrays of one Prim run. `key[v]` is the cheapest known link from the tree to `v`.
pub(super) struct PrimState<'g> {
    graph: &'g LocationGraph,
    pub(super) key: Vec<f64>,
    pub(super) parent: Vec<Option<usize>>,
    pub(super) in_tree: Vec<bool>,
}

impl<'g> PrimState<'g> {
    fn new(graph: &'g LocationGraph, start: usize) -> Self {
        let vertex_count = graph.vertex_count();
        let mut key = vec![f64::INFINITY; vertex_count];
        key[start] = 0.0;
        PrimState {
            graph,
            key,
            parent: vec![None; vertex_count],
            in_tree: vec![false; vertex_count],
        }
    }

    /// Moves `vertex` into the tree and relaxes its neighbours. `on_update` is called for every
    /// neighbour whose key dropped.
    fn include(&mut self, vertex: usize, mut on_update: impl FnMut(usize, f64)) {
        trace!("Including vertex {vertex} with key {}", self.key[vertex]);
        self.in_tree[vertex] = true;

        let graph = self.graph;
        for (neighbour, weight) in graph.neighbors(vertex) {
            if !self.in_tree[neighbour] && weight < self.key[neighbour] {
                trace!("Relaxing {neighbour}: {} -> {weight} via {vertex}", self.key[neighbour]);
                self.key[neighbour] = weight;
                self.parent[neighbour] = Some(vertex);
                on_update(neighbour, weight);
            }
        }
    }
}

pub(super) fn grow_with_queue(graph: &LocationGraph, start: usize) -> PrimState<'_> {
    let mut state = PrimState::new(graph, start);
    let mut queue = KeyedPriorityQueue::new();
    queue.push(start, Key::new(0.0, start));

    while let Some((vertex, _)) = queue.pop() {
        // pushing an existing vertex only updates its priority, i.e. decrease-key
        state.include(vertex, |neighbour, weight| {
            queue.push(neighbour, Key::new(weight, neighbour));
        });
    }
    state
}

pub(super) fn grow_with_dense_scan(graph: &LocationGraph, start: usize) -> PrimState<'_> {
    let mut state = PrimState::new(graph, start);

    // every round picks among the vertices already touched by the tree, so an infinite key
    // means the rest is unreachable
    loop {
        let next = (0..graph.vertex_count())
            .filter(|&v| !state.in_tree[v] && state.key[v].is_finite())
            .max_by_key(|&v| Key::new(state.key[v], v));
        let Some(vertex) = next else {
            break;
        };
        state.include(vertex, |_, _| {});
    }
    state
}
