//! All targets of a project and the order they are built in.

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tether_config::ProjectConfig;

use crate::target::{BuildTarget, TargetChunk, TargetKind};

/// Dependency graph over every target of a project.
///
/// An edge points from a target to a target it depends on:
/// production classes depend on the production classes of the module's
/// dependencies; test classes depend on their module's production classes and
/// on the test classes of the dependencies. Resource targets stand alone.
#[derive(Debug, Default)]
pub struct BuildTargetIndex {
    graph: DiGraph<BuildTarget, ()>,
    nodes: HashMap<BuildTarget, NodeIndex>,
}

impl BuildTargetIndex {
    /// Builds the index for every module of `config`.
    pub fn from_config(config: &ProjectConfig) -> Self {
        let mut index = Self::default();
        for name in config.modules.keys() {
            for kind in TargetKind::ALL {
                index.add_target(BuildTarget::new(kind, name.as_str()));
            }
        }
        for (name, module) in &config.modules {
            let production = BuildTarget::production(name.as_str());
            let tests = BuildTarget::tests(name.as_str());
            index.add_dependency(&tests, &production);
            for dep in &module.dependencies {
                index.add_dependency(&production, &BuildTarget::production(dep.as_str()));
                index.add_dependency(&tests, &BuildTarget::tests(dep.as_str()));
            }
        }
        tracing::debug!(
            targets = index.graph.node_count(),
            edges = index.graph.edge_count(),
            "target index built"
        );
        index
    }

    fn add_target(&mut self, target: BuildTarget) -> NodeIndex {
        if let Some(&node) = self.nodes.get(&target) {
            return node;
        }
        let node = self.graph.add_node(target.clone());
        self.nodes.insert(target, node);
        node
    }

    fn add_dependency(&mut self, from: &BuildTarget, to: &BuildTarget) {
        let from = self.add_target(from.clone());
        let to = self.add_target(to.clone());
        self.graph.update_edge(from, to, ());
    }

    /// Every target, in creation order.
    pub fn targets(&self) -> impl Iterator<Item = &BuildTarget> {
        self.graph.node_weights()
    }

    /// Returns `true` if `target` is known.
    pub fn contains(&self, target: &BuildTarget) -> bool {
        self.nodes.contains_key(target)
    }

    /// Direct dependencies of `target`, sorted.
    pub fn dependencies(&self, target: &BuildTarget) -> Vec<&BuildTarget> {
        let Some(&node) = self.nodes.get(target) else {
            return Vec::new();
        };
        let mut deps: Vec<&BuildTarget> = self
            .graph
            .neighbors_directed(node, petgraph::Direction::Outgoing)
            .map(|n| &self.graph[n])
            .collect();
        deps.sort();
        deps
    }

    /// Target chunks in build order: every chunk comes after the chunks it
    /// depends on. Mutually dependent targets share a chunk.
    pub fn sorted_chunks(&self) -> Vec<TargetChunk> {
        // Tarjan emits components in reverse topological order of the edges,
        // and edges point at dependencies.
        tarjan_scc(&self.graph)
            .into_iter()
            .map(|component| {
                TargetChunk::new(component.into_iter().map(|n| self.graph[n].clone()).collect())
            })
            .collect()
    }
}
