//! Resolution - the outcome of one resolver run.

use indexmap::IndexMap;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::core::Formula;
use crate::resolver::policy::Decision;

/// One module with the version chosen for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub module: String,
    pub version: String,
    /// The manifest or module that first asked for this version.
    pub requestor: String,
}

/// A request that disagreed with the version already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConflict {
    pub module: String,
    pub resolved_version: String,
    pub resolved_requestor: String,
    pub requested_version: String,
    pub requestor: String,
    pub decision: Decision,
}

/// Resolved modules in first-resolved order.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    root: String,
    entries: IndexMap<String, (ResolvedDependency, Formula)>,
    conflicts: Vec<VersionConflict>,
}

impl Resolution {
    pub(crate) fn new(root: impl Into<String>) -> Self {
        Resolution {
            root: root.into(),
            entries: IndexMap::new(),
            conflicts: Vec::new(),
        }
    }

    pub(crate) fn get(&self, module: &str) -> Option<&ResolvedDependency> {
        self.entries.get(module).map(|(dep, _)| dep)
    }

    pub(crate) fn insert(&mut self, dep: ResolvedDependency, formula: Formula) {
        self.entries.insert(dep.module.clone(), (dep, formula));
    }

    pub(crate) fn record_conflict(&mut self, conflict: VersionConflict) {
        self.conflicts.push(conflict);
    }

    /// The root requestor (the project manifest's file name).
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolved dependencies in first-resolved order.
    pub fn dependencies(&self) -> impl Iterator<Item = &ResolvedDependency> {
        self.entries.values().map(|(dep, _)| dep)
    }

    /// Resolved dependencies with their formulas.
    pub fn iter(&self) -> impl Iterator<Item = (&ResolvedDependency, &Formula)> {
        self.entries.values().map(|(dep, formula)| (dep, formula))
    }

    /// Module name to resolved version.
    pub fn version_map(&self) -> IndexMap<String, String> {
        self.entries
            .iter()
            .map(|(module, (dep, _))| (module.clone(), dep.version.clone()))
            .collect()
    }

    /// Conflicting requests seen during resolution, in order.
    pub fn conflicts(&self) -> &[VersionConflict] {
        &self.conflicts
    }

    /// Graph of first requestor to module, rooted at the project manifest.
    pub fn requestor_graph(&self) -> (DiGraph<String, ()>, NodeIndex) {
        let mut graph = DiGraph::new();
        let root = graph.add_node(self.root.clone());

        let mut nodes: IndexMap<&str, NodeIndex> = IndexMap::new();
        for (dep, _) in self.entries.values() {
            let label = format!("{} v{}", dep.module, dep.version);
            nodes.insert(dep.module.as_str(), graph.add_node(label));
        }
        for (dep, _) in self.entries.values() {
            let from = if dep.requestor == self.root {
                Some(root)
            } else {
                nodes.get(dep.requestor.as_str()).copied()
            };
            if let Some(from) = from {
                graph.add_edge(from, nodes[dep.module.as_str()], ());
            }
        }
        (graph, root)
    }
}
