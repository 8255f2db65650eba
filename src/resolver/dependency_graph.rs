//! Requirement graph between artifacts, for diagnostics.
//!
//! The resolver records one edge per resolved requirement (`from` requires an
//! extension provided by `to`). The graph backs the `extenv tree` output and
//! yields a build order in which providers precede the artifacts needing them.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::{Artifact, ExtenvError};

/// Directed graph of artifacts; an edge `a → b` means `a` requires something `b` provides.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<Artifact, ()>,
    node_map: HashMap<Artifact, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, artifact: Artifact) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&artifact) {
            index
        } else {
            let index = self.graph.add_node(artifact.clone());
            self.node_map.insert(artifact, index);
            index
        }
    }

    /// Make sure `artifact` is a node even if it has no requirements.
    pub fn ensure_root(&mut self, artifact: &Artifact) {
        self.ensure_node(artifact.clone());
    }

    /// Record that `from` requires an extension provided by `to`.
    pub fn add_dependency(&mut self, from: Artifact, to: Artifact) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Providers before the artifacts that require them.
    ///
    /// # Errors
    ///
    /// Returns [`ExtenvError::CycleDetected`] if the graph contains a cycle, which a
    /// graph produced by the resolver never does.
    pub fn build_order(&self) -> Result<Vec<Artifact>, ExtenvError> {
        let indices = toposort(&self.graph, None).map_err(|cycle| {
            let id = self.graph[cycle.node_id()].id().clone();
            ExtenvError::CycleDetected {
                artifact: id.clone(),
                chain: vec![id],
            }
        })?;

        Ok(indices.into_iter().rev().map(|idx| self.graph[idx].clone()).collect())
    }

    /// Every artifact `artifact` depends on, directly or indirectly.
    pub fn transitive_deps(&self, artifact: &Artifact) -> HashSet<Artifact> {
        let mut deps = HashSet::new();
        let mut queue = VecDeque::new();

        if let Some(&start) = self.node_map.get(artifact) {
            queue.push_back(start);
            while let Some(current) = queue.pop_front() {
                for neighbor in self.graph.neighbors(current) {
                    if deps.insert(self.graph[neighbor].clone()) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        deps
    }

    /// Direct providers of `artifact`, in the order they were recorded.
    pub fn direct_deps(&self, artifact: &Artifact) -> Vec<Artifact> {
        let Some(&idx) = self.node_map.get(artifact) else {
            return Vec::new();
        };
        // petgraph yields neighbors most-recent-edge first
        let mut deps: Vec<Artifact> = self.graph.neighbors(idx).map(|n| self.graph[n].clone()).collect();
        deps.reverse();
        deps
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Render the requirement tree below `root`, one artifact file name per line.
    ///
    /// A provider reached again through another branch is printed once more and
    /// marked `(shared)` instead of being expanded a second time.
    pub fn to_tree_string(&self, root: &Artifact) -> String {
        let mut result = format!("{}\n", root.file_name());
        let mut expanded = HashSet::from([root.clone()]);
        self.build_tree_string(root, &mut result, "", &mut expanded);
        result
    }

    fn build_tree_string(
        &self,
        node: &Artifact,
        result: &mut String,
        prefix: &str,
        expanded: &mut HashSet<Artifact>,
    ) {
        let deps = self.direct_deps(node);
        for (i, dep) in deps.iter().enumerate() {
            let is_last = i == deps.len() - 1;
            let connector = if is_last {
                "└── "
            } else {
                "├── "
            };

            if !expanded.insert(dep.clone()) {
                result.push_str(&format!("{prefix}{connector}{} (shared)\n", dep.file_name()));
                continue;
            }

            result.push_str(&format!("{prefix}{connector}{}\n", dep.file_name()));
            let child_prefix = if is_last {
                format!("{prefix}    ")
            } else {
                format!("{prefix}│   ")
            };
            self.build_tree_string(dep, result, &child_prefix, expanded);
        }
    }
}
