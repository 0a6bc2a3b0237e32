use ahash::AHashMap;
use tracing::debug;

use super::{Link, Location};
use crate::error::GraphError;
use crate::io::NetworkDefinition;

/// Collects locations and links before they are frozen into a [`LocationGraph`].
#[derive(Debug)]
pub struct LocationGraphBuilder {
    locations: Vec<Option<Location>>,
    name_index: AHashMap<String, usize>,
    links: Vec<Link>,
}

impl LocationGraphBuilder {
    pub fn new(vertex_count: usize) -> Result<Self, GraphError> {
        if vertex_count == 0 {
            return Err(GraphError::InvalidSize(vertex_count));
        }
        Ok(LocationGraphBuilder {
            locations: vec![None; vertex_count],
            name_index: AHashMap::with_capacity(vertex_count),
            links: Vec::new(),
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.locations.len()
    }

    pub fn set_vertex(
        &mut self,
        index: usize,
        name: impl Into<String>,
        longitude: f64,
        latitude: f64,
    ) -> Result<&mut Self, GraphError> {
        let name = name.into();
        let vertex_count = self.vertex_count();
        let slot = self
            .locations
            .get_mut(index)
            .ok_or(GraphError::IndexOutOfRange {
                index,
                vertex_count,
            })?;

        match self.name_index.get(&name) {
            Some(&existing) if existing != index => return Err(GraphError::DuplicateName(name)),
            _ => {}
        }

        // re-assigning a slot frees its previous name
        if let Some(previous) = slot.take() {
            self.name_index.remove(previous.name());
        }
        self.name_index.insert(name.clone(), index);
        *slot = Some(Location::new(name, longitude, latitude));
        Ok(self)
    }

    pub fn link(&mut self, from: usize, to: usize, weight: f64) -> Result<&mut Self, GraphError> {
        self.check_assigned(from)?;
        self.check_assigned(to)?;
        if !(weight.is_finite() && weight >= 0.0) {
            return Err(GraphError::InvalidWeight(weight));
        }
        self.links.push(Link { from, to, weight });
        Ok(self)
    }

    pub fn find_vertex_by_name(&self, name: &str) -> Result<usize, GraphError> {
        self.name_index
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::NotFound(name.to_string()))
    }

    /// Freezes the graph. Every slot must have been assigned by now.
    pub fn build(self) -> Result<LocationGraph, GraphError> {
        let locations = self
            .locations
            .into_iter()
            .enumerate()
            .map(|(index, location)| location.ok_or(GraphError::UnassignedVertex(index)))
            .collect::<Result<Vec<_>, _>>()?;

        let (first_out, head, weight) = compress_adjacency(locations.len(), &self.links);
        debug!(
            "Built location graph with {} vertices and {} links",
            locations.len(),
            self.links.len()
        );

        Ok(LocationGraph {
            locations,
            name_index: self.name_index,
            links: self.links,
            first_out,
            head,
            weight,
        })
    }

    fn check_assigned(&self, index: usize) -> Result<(), GraphError> {
        match self.locations.get(index) {
            Some(Some(_)) => Ok(()),
            _ => Err(GraphError::IndexOutOfRange {
                index,
                vertex_count: self.vertex_count(),
            }),
        }
    }
}

/// Builds the forward star representation. Each link is written into both endpoint ranges, and
/// within a range neighbours keep the order in which their links were added.
fn compress_adjacency(vertex_count: usize, links: &[Link]) -> (Vec<usize>, Vec<usize>, Vec<f64>) {
    let mut first_out = vec![0; vertex_count + 1];
    for link in links {
        first_out[link.from + 1] += 1;
        first_out[link.to + 1] += 1;
    }
    for i in 0..vertex_count {
        first_out[i + 1] += first_out[i];
    }

    let total = first_out[vertex_count];
    let mut head = vec![0; total];
    let mut weight = vec![0.0; total];
    let mut next = first_out[..vertex_count].to_vec();

    for link in links {
        for (from, to) in [(link.from, link.to), (link.to, link.from)] {
            let slot = next[from];
            head[slot] = to;
            weight[slot] = link.weight;
            next[from] += 1;
        }
    }

    (first_out, head, weight)
}

/// Immutable, finalized location graph. Adjacency is index based; names are only resolved
/// through the name index.
#[derive(Debug, Clone)]
pub struct LocationGraph {
    locations: Vec<Location>,
    name_index: AHashMap<String, usize>,
    links: Vec<Link>,
    first_out: Vec<usize>,
    head: Vec<usize>,
    weight: Vec<f64>,
}

impl LocationGraph {
    pub fn from_definition(definition: &NetworkDefinition) -> Result<Self, GraphError> {
        let mut builder = LocationGraphBuilder::new(definition.locations.len())?;
        for (index, location) in definition.locations.iter().enumerate() {
            builder.set_vertex(
                index,
                location.name.as_str(),
                location.longitude,
                location.latitude,
            )?;
        }
        for link in &definition.links {
            builder.link(link.from, link.to, link.weight)?;
        }
        builder.build()
    }

    pub fn vertex_count(&self) -> usize {
        self.locations.len()
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.vertex_count()
    }

    pub fn location(&self, index: usize) -> Option<&Location> {
        self.locations.get(index)
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// The links in the order they were added. Handed to renderers next to the spanning tree.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn find_vertex_by_name(&self, name: &str) -> Result<usize, GraphError> {
        self.name_index
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::NotFound(name.to_string()))
    }

    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.first_out[index]..self.first_out[index + 1];
        self.head[range.clone()]
            .iter()
            .copied()
            .zip(self.weight[range].iter().copied())
    }

    pub fn degree(&self, index: usize) -> usize {
        self.first_out[index + 1] - self.first_out[index]
    }
}
