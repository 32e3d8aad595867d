//! Graph analysis over resolved dependency caches.
//!
//! The resolver's cache is a flat map from module to reachable-module set.
//! This module lifts that map into a petgraph [`DiGraph`] so the CLI can
//! answer structural questions: does the graph contain cycles, and which
//! modules are reached from more than one place (shared dependencies).
//!
//! Edges are reachability edges - module A points at every module in its
//! resolved dependency set - mirroring how the nested tree view expands
//! nodes.

use std::collections::HashMap;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use super::cache::DependencyCache;
use super::module_id::ModuleId;

/// Directed graph view over a [`DependencyCache`].
pub struct DependencyGraph {
    graph: DiGraph<ModuleId, ()>,
    node_map: HashMap<ModuleId, NodeIndex>,
}

impl DependencyGraph {
    /// Builds the graph from every completed resolution in the cache.
    #[must_use]
    pub fn from_cache(cache: &DependencyCache) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map: HashMap<ModuleId, NodeIndex> = HashMap::new();

        let mut ensure_node = |graph: &mut DiGraph<ModuleId, ()>,
                               node_map: &mut HashMap<ModuleId, NodeIndex>,
                               id: &ModuleId| {
            if let Some(&index) = node_map.get(id) {
                index
            } else {
                let index = graph.add_node(id.clone());
                node_map.insert(id.clone(), index);
                index
            }
        };

        for module in cache.modules() {
            let from = ensure_node(&mut graph, &mut node_map, &module);
            if let Some(dependencies) = cache.get(&module) {
                for dep in dependencies.iter() {
                    let to = ensure_node(&mut graph, &mut node_map, dep);
                    graph.update_edge(from, to, ());
                }
            }
        }

        Self {
            graph,
            node_map,
        }
    }

    /// Number of distinct modules in the graph.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph contains at least one import cycle.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Modules reached from more than one other module.
    ///
    /// These are the entries the tree renderer marks with `(*)` after their
    /// first expansion.
    #[must_use]
    pub fn shared_modules(&self) -> Vec<ModuleId> {
        let mut shared: Vec<ModuleId> = self
            .graph
            .node_indices()
            .filter(|&index| {
                self.graph.neighbors_directed(index, Direction::Incoming).count() > 1
            })
            .map(|index| self.graph[index].clone())
            .collect();
        shared.sort();
        shared
    }

    /// Direct reachability test between two modules.
    #[must_use]
    pub fn depends_on(&self, from: &ModuleId, to: &ModuleId) -> bool {
        match (self.node_map.get(from), self.node_map.get(to)) {
            (Some(&from), Some(&to)) => self.graph.contains_edge(from, to),
            _ => false,
        }
    }
}
