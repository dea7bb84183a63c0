//! Directed stop graph with path-length edge weights

use std::collections::BTreeMap;

use hashbrown::HashMap;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::StopId;

/// Sparse adjacency matrix: `from -> to -> meters`
///
/// Edges are directional. Inserting an existing pair replaces its weight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjacencyMatrix {
    edges: BTreeMap<StopId, BTreeMap<StopId, f64>>,
}

impl AdjacencyMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the weight of `from -> to`, returning the previous one
    pub fn insert(&mut self, from: StopId, to: StopId, meters: f64) -> Option<f64> {
        self.edges.entry(from).or_default().insert(to, meters)
    }

    pub fn get(&self, from: StopId, to: StopId) -> Option<f64> {
        self.edges.get(&from)?.get(&to).copied()
    }

    /// Outgoing edges of a stop
    pub fn neighbors(&self, from: StopId) -> impl Iterator<Item = (StopId, f64)> + '_ {
        self.edges
            .get(&from)
            .into_iter()
            .flat_map(|targets| targets.iter().map(|(&to, &meters)| (to, meters)))
    }

    /// All edges ordered by source, then destination
    pub fn edges(&self) -> impl Iterator<Item = (StopId, StopId, f64)> + '_ {
        self.edges.iter().flat_map(|(&from, targets)| {
            targets.iter().map(move |(&to, &meters)| (from, to, meters))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count() == 0
    }

    /// Builds a `petgraph` view of the matrix; node weights are stop ids
    pub fn to_graph(&self) -> DiGraph<StopId, f64> {
        let mut graph = DiGraph::new();
        let mut nodes: HashMap<StopId, NodeIndex> = HashMap::new();

        for (from, to, meters) in self.edges() {
            let source = *nodes.entry(from).or_insert_with(|| graph.add_node(from));
            let target = *nodes.entry(to).or_insert_with(|| graph.add_node(to));
            graph.add_edge(source, target, meters);
        }

        graph
    }
}
