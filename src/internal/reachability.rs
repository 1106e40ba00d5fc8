// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reachability trimming: produce the subgraph reachable from the run-list,
//! injecting a placeholder for every referenced-but-undefined package.

use indexmap::IndexMap;
use log::debug;

use crate::constraint::Constraint;
use crate::graph::{DepGraph, VersionEntry};
use crate::package::PackageName;

/// A package as it appears in the trimmed graph: either its real declared
/// versions, or the injected placeholder for a name referenced by some
/// constraint but absent from the universe.
///
/// This distinction — not merely "zero versions" — is what lets the problem
/// builder tell apart a legitimately unsatisfiable package from one that was
/// never defined at all, without re-walking the original graph.
#[derive(Debug, Clone)]
pub(crate) enum ReachableEntry {
    Declared(Vec<VersionEntry>),
    Missing,
}

/// The trimmed graph: every package transitively reachable from the goals,
/// in the order reachability first visited them.
#[derive(Debug, Clone, Default)]
pub(crate) struct ReachableGraph {
    packages: IndexMap<PackageName, ReachableEntry>,
}

impl ReachableGraph {
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&PackageName, &ReachableEntry)> {
        self.packages.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.packages.len()
    }
}

/// Trim `graph` to the packages reachable from `goals`, following every
/// dependency name referenced by any constraint of any visited version.
/// Each package is visited at most once, so this terminates even on cyclic
/// universes.
pub(crate) fn trim(graph: &DepGraph, goals: &[Constraint]) -> ReachableGraph {
    let mut result = ReachableGraph::default();
    let mut stack: Vec<PackageName> = goals.iter().map(|c| c.package().clone()).collect();

    while let Some(name) = stack.pop() {
        if result.packages.contains_key(&name) {
            continue;
        }
        match graph.get(&name) {
            Some(versions) => {
                for (_, constraints) in versions {
                    for c in constraints {
                        stack.push(c.package().clone());
                    }
                }
                result
                    .packages
                    .insert(name, ReachableEntry::Declared(versions.to_vec()));
            }
            None => {
                debug!("reachability: {name} is referenced but not defined, injecting placeholder");
                result.packages.insert(name, ReachableEntry::Missing);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::CmpOp;

    fn graph() -> DepGraph {
        DepGraph::new()
            .add_package_version(
                "app1",
                "0.1.0",
                vec![
                    Constraint::exact("app2", "0.2.0").unwrap(),
                    Constraint::cmp("app3", "0.2.0", CmpOp::Ge).unwrap(),
                ],
            )
            .unwrap()
            .add_package_version("app2", "0.2.0", vec![]).unwrap()
            .add_package_version("app3", "0.1.0", vec![]).unwrap()
            .add_package_version("unrelated", "1.0.0", vec![]).unwrap()
    }

    #[test]
    fn only_reachable_packages_are_kept() {
        let g = graph();
        let goals = vec![Constraint::exact("app1", "0.1.0").unwrap()];
        let reached = trim(&g, &goals);
        assert_eq!(reached.len(), 3);
        assert!(reached
            .iter()
            .all(|(n, _)| n.as_str() != "unrelated"));
    }

    #[test]
    fn undefined_dependency_becomes_a_placeholder() {
        let g = DepGraph::new()
            .add_package_version("app1", "0.1.0", vec![Constraint::any("missing_dep")])
            .unwrap();
        let goals = vec![Constraint::exact("app1", "0.1.0").unwrap()];
        let reached = trim(&g, &goals);
        let (_, entry) = reached
            .iter()
            .find(|(n, _)| n.as_str() == "missing_dep")
            .expect("missing_dep should be present as a placeholder");
        assert!(matches!(entry, ReachableEntry::Missing));
    }

    #[test]
    fn unreachable_goal_package_is_itself_a_placeholder() {
        let g = graph();
        let goals = vec![Constraint::exact("appX", "0.1.0").unwrap()];
        let reached = trim(&g, &goals);
        assert_eq!(reached.len(), 1);
        assert!(matches!(
            reached.iter().next().unwrap().1,
            ReachableEntry::Missing
        ));
    }
}
