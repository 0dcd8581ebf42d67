//! Dependency graph for WBS elements
//!
//! Dependencies are informational: they drive the dependency diagram and are
//! never enforced. Uses petgraph for graph storage.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

use super::element::WorkBreakdownElement;

/// A directed `dependency -> dependent` edge between element ids
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
}

/// A dependency graph over work elements
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// The underlying directed graph
    graph: DiGraph<String, ()>,

    /// Map from element id to node index
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Builds a graph from work elements
    ///
    /// Elements without an id are not nodes. Dependencies naming an unknown
    /// id are dropped silently. Cycles are kept as-is.
    pub fn from_elements<'a>(elements: impl IntoIterator<Item = &'a WorkBreakdownElement>) -> Self {
        let mut graph = Self::new();

        // First pass: add all nodes
        let elements: Vec<_> = elements.into_iter().collect();
        for element in &elements {
            if !element.id.is_empty() {
                graph.add_element(&element.id);
            }
        }

        // Second pass: add all known edges
        for element in &elements {
            if element.id.is_empty() {
                continue;
            }
            for dep_id in &element.dependencies {
                graph.add_dependency(&element.id, dep_id);
            }
        }

        graph
    }

    /// Adds an element id to the graph
    pub fn add_element(&mut self, id: &str) {
        if !self.node_map.contains_key(id) {
            let idx = self.graph.add_node(id.to_string());
            self.node_map.insert(id.to_string(), idx);
        }
    }

    /// Adds a dependency edge: `element` depends on `depends_on`
    ///
    /// The edge direction is `depends_on -> element`. Returns false (and adds
    /// nothing) when either id is unknown.
    pub fn add_dependency(&mut self, element: &str, depends_on: &str) -> bool {
        match (self.node_map.get(depends_on), self.node_map.get(element)) {
            (Some(&dep_idx), Some(&element_idx)) => {
                self.graph.add_edge(dep_idx, element_idx, ());
                true
            }
            _ => false,
        }
    }

    /// All edges in insertion order (element order, then dependency order)
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.graph
            .edge_references()
            .filter_map(|edge| {
                let from = self.graph.node_weight(edge.source())?;
                let to = self.graph.node_weight(edge.target())?;
                Some(DependencyEdge {
                    from: from.clone(),
                    to: to.clone(),
                })
            })
            .collect()
    }

    /// Returns the known direct dependencies of an element
    pub fn dependencies(&self, id: &str) -> Vec<String> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Returns the elements that depend directly on `id`
    pub fn dependents(&self, id: &str) -> Vec<String> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<String> {
        let idx = match self.node_map.get(id) {
            Some(idx) => *idx,
            None => return vec![],
        };

        let mut ids: Vec<String> = self
            .graph
            .neighbors_directed(idx, direction)
            .filter_map(|idx| self.graph.node_weight(idx).cloned())
            .collect();
        // petgraph walks adjacency lists newest-first
        ids.reverse();
        ids
    }

    /// Returns true if the graph contains the element id
    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Returns the number of elements in the graph
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    /// Returns the number of edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
