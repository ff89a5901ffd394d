//! Dependency resolution.
//!
//! Resolution walks a FIFO worklist of `(module, version, requestor)`
//! requests seeded from the project manifest. The first request for a module
//! loads its formula, freezes that version and queues the formula's own
//! dependencies. Later requests for a different version are conflicts handed
//! to the [`ConflictPolicy`]; they are warnings, never errors. A module that
//! is already resolved is not expanded again, so cycles terminate. A module
//! is never replaced by a version it already held, so a policy that keeps
//! answering `Replace` cannot make two formulas swap each other forever.
//!
//! Versions are exact strings. There is no range matching and no
//! backtracking.

pub mod policy;
pub mod resolve;

pub use policy::{ConflictPolicy, Decision, FreezeFirst, Request};
pub use resolve::{Resolution, ResolvedDependency, VersionConflict};

use std::collections::{HashSet, VecDeque};

use anyhow::Result;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::core::{Formula, FormulaSource};

/// Resolves a dependency map against a formula source.
pub struct Resolver<'a> {
    source: &'a dyn FormulaSource,
    policy: Box<dyn ConflictPolicy + 'a>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver with the freeze-first policy.
    pub fn new(source: &'a dyn FormulaSource) -> Self {
        Resolver {
            source,
            policy: Box::new(FreezeFirst),
        }
    }

    /// Use a different conflict policy.
    pub fn with_policy(mut self, policy: impl ConflictPolicy + 'a) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Resolve `dependencies` requested by `root` (the project manifest name).
    pub fn resolve(
        &self,
        root: &str,
        dependencies: &IndexMap<String, String>,
    ) -> Result<Resolution> {
        let mut resolution = Resolution::new(root);
        let mut held: HashSet<(String, String)> = HashSet::new();
        let mut queue: VecDeque<(String, String, String)> = dependencies
            .iter()
            .map(|(m, v)| (m.clone(), v.clone(), root.to_string()))
            .collect();

        while let Some((module, version, requestor)) = queue.pop_front() {
            let Some(resolved) = resolution.get(&module).cloned() else {
                debug!("resolving {} {} requested by {}", module, version, requestor);
                let formula = self.source.load_formula(&module, &version)?;
                enqueue_dependencies(&mut queue, &formula);
                held.insert((module.clone(), version.clone()));
                resolution.insert(
                    ResolvedDependency {
                        module,
                        version,
                        requestor,
                    },
                    formula,
                );
                continue;
            };

            if resolved.version == version {
                continue;
            }

            warn!(
                "version conflict for {} requested by first {} and then {}",
                module, resolved.requestor, requestor
            );
            let decision = match self.policy.decide(
                &module,
                Request {
                    version: &resolved.version,
                    requestor: &resolved.requestor,
                },
                Request {
                    version: &version,
                    requestor: &requestor,
                },
            ) {
                Decision::Replace if held.contains(&(module.clone(), version.clone())) => {
                    debug!(
                        "{} already held {}, keeping {}",
                        module, version, resolved.version
                    );
                    Decision::Keep
                }
                decision => decision,
            };
            resolution.record_conflict(VersionConflict {
                module: module.clone(),
                resolved_version: resolved.version.clone(),
                resolved_requestor: resolved.requestor.clone(),
                requested_version: version.clone(),
                requestor: requestor.clone(),
                decision,
            });

            if decision == Decision::Replace {
                // Dependencies already queued by the replaced formula stay queued.
                let formula = self.source.load_formula(&module, &version)?;
                enqueue_dependencies(&mut queue, &formula);
                held.insert((module.clone(), version.clone()));
                resolution.insert(
                    ResolvedDependency {
                        module,
                        version,
                        requestor,
                    },
                    formula,
                );
            }
        }

        Ok(resolution)
    }
}

fn enqueue_dependencies(queue: &mut VecDeque<(String, String, String)>, formula: &Formula) {
    queue.extend(
        formula
            .dependencies
            .iter()
            .map(|(m, v)| (m.clone(), v.clone(), formula.module.clone())),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BruError;
    use crate::test_support::MemoryFormulas;

    fn deps(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(m, v)| (m.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_disjoint_dependencies() {
        let source = MemoryFormulas::new()
            .with("app-a", "1.0", &[("zlib", "1.2.8")])
            .with("app-b", "2.0", &[("libpng", "1.6.0")])
            .with("zlib", "1.2.8", &[])
            .with("libpng", "1.6.0", &[]);

        let resolution = Resolver::new(&source)
            .resolve("package.bru", &deps(&[("app-a", "1.0"), ("app-b", "2.0")]))
            .unwrap();

        let got: Vec<_> = resolution
            .dependencies()
            .map(|d| (d.module.as_str(), d.version.as_str(), d.requestor.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("app-a", "1.0", "package.bru"),
                ("app-b", "2.0", "package.bru"),
                ("zlib", "1.2.8", "app-a"),
                ("libpng", "1.6.0", "app-b"),
            ]
        );
        assert!(resolution.conflicts().is_empty());
    }

    #[test]
    fn test_conflict_keeps_first_version() {
        let source = MemoryFormulas::new()
            .with("x", "1.0", &[])
            .with("x", "2.0", &[])
            .with("y", "1.0", &[("x", "2.0")]);

        let resolution = Resolver::new(&source)
            .resolve("package.bru", &deps(&[("x", "1.0"), ("y", "1.0")]))
            .unwrap();

        assert_eq!(resolution.version_map()["x"], "1.0");
        assert_eq!(resolution.len(), 2);

        let conflicts = resolution.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].module, "x");
        assert_eq!(conflicts[0].resolved_requestor, "package.bru");
        assert_eq!(conflicts[0].requestor, "y");
        assert_eq!(conflicts[0].requested_version, "2.0");
        assert_eq!(conflicts[0].decision, Decision::Keep);

        // the losing version's formula is never loaded
        assert_eq!(source.loads("x", "2.0"), 0);
    }

    #[test]
    fn test_cycle_terminates() {
        let source = MemoryFormulas::new()
            .with("a", "1.0", &[("b", "1.0")])
            .with("b", "1.0", &[("a", "1.0")]);

        let resolution = Resolver::new(&source)
            .resolve("package.bru", &deps(&[("a", "1.0")]))
            .unwrap();

        assert_eq!(resolution.len(), 2);
        assert_eq!(source.loads("a", "1.0"), 1);
        assert_eq!(source.loads("b", "1.0"), 1);
    }

    #[test]
    fn test_missing_formula_is_fatal() {
        let source = MemoryFormulas::new().with("a", "1.0", &[("ghost", "0.1")]);

        let err = Resolver::new(&source)
            .resolve("package.bru", &deps(&[("a", "1.0")]))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BruError>(),
            Some(BruError::ModuleNotFound { .. })
        ));
    }

    #[derive(Debug)]
    struct PreferLater;

    impl ConflictPolicy for PreferLater {
        fn decide(&self, _: &str, _: Request<'_>, _: Request<'_>) -> Decision {
            Decision::Replace
        }
    }

    #[test]
    fn test_replace_policy_swaps_entry_in_place() {
        let source = MemoryFormulas::new()
            .with("x", "1.0", &[])
            .with("x", "2.0", &[("z", "3.0")])
            .with("y", "1.0", &[("x", "2.0")])
            .with("z", "3.0", &[]);

        let resolution = Resolver::new(&source)
            .with_policy(PreferLater)
            .resolve("package.bru", &deps(&[("x", "1.0"), ("y", "1.0")]))
            .unwrap();

        let got: Vec<_> = resolution
            .dependencies()
            .map(|d| (d.module.as_str(), d.version.as_str()))
            .collect();
        assert_eq!(got, vec![("x", "2.0"), ("y", "1.0"), ("z", "3.0")]);
        assert_eq!(resolution.conflicts()[0].decision, Decision::Replace);
    }

    #[test]
    fn test_replace_policy_does_not_swap_back() {
        let source = MemoryFormulas::new()
            .with("a", "1.0", &[("b", "1.0")])
            .with("b", "1.0", &[("a", "2.0")])
            .with("a", "2.0", &[("b", "2.0")])
            .with("b", "2.0", &[("a", "1.0")]);

        let resolution = Resolver::new(&source)
            .with_policy(PreferLater)
            .resolve("package.bru", &deps(&[("a", "1.0")]))
            .unwrap();

        let map = resolution.version_map();
        assert_eq!(map["a"], "2.0");
        assert_eq!(map["b"], "2.0");
        assert_eq!(source.loads("a", "1.0"), 1);
        assert_eq!(source.loads("a", "2.0"), 1);
        assert_eq!(
            resolution.conflicts().last().map(|c| c.decision),
            Some(Decision::Keep)
        );
    }

    #[test]
    fn test_requestor_graph() {
        let source = MemoryFormulas::new()
            .with("a", "1.0", &[("b", "1.0")])
            .with("b", "1.0", &[]);

        let resolution = Resolver::new(&source)
            .resolve("package.bru", &deps(&[("a", "1.0")]))
            .unwrap();

        let (graph, root) = resolution.requestor_graph();
        assert_eq!(graph[root], "package.bru");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }
}
