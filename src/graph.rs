// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The dependency graph: an ordered mapping from package name to its
//! declared versions and their dependency constraints.
//!
//! `DepGraph` grows monotonically through `add_*` calls and is never
//! mutated by [`crate::solve`]; a fresh [`crate::internal::version_manager::VersionManager`]
//! and solver problem are built from it on every solve.

use indexmap::IndexMap;
use log::debug;

use crate::constraint::Constraint;
use crate::package::PackageName;
use crate::version::{IntoVersion, ParseVersionError, Version};

/// One declared version of a package, with the constraints it places on its
/// dependencies.
pub type VersionEntry = (Version, Vec<Constraint>);

/// Ordered mapping from package name to its declared versions.
///
/// Iteration order is insertion order, which is what drives the solver's
/// preference heuristic once a problem is encoded (see `VersionManager`).
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DepGraph {
    packages: IndexMap<PackageName, Vec<VersionEntry>>,
}

impl DepGraph {
    /// An empty graph.
    pub fn new() -> Self {
        DepGraph {
            packages: IndexMap::new(),
        }
    }

    /// Iterate packages in the order they were first inserted.
    pub fn iter(&self) -> impl Iterator<Item = (&PackageName, &[VersionEntry])> {
        self.packages.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Look up a package's declared versions.
    pub fn get(&self, name: &PackageName) -> Option<&[VersionEntry]> {
        self.packages.get(name).map(Vec::as_slice)
    }

    /// Number of distinct packages in the graph.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// `true` if the graph has no packages.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Add one version of `name`, with the constraints it declares on its
    /// dependencies. If `(name, version)` already exists, the incoming
    /// constraints are appended to the existing list, skipping any that are
    /// already present (by canonical equality); the original order is kept
    /// in front.
    pub fn add_package_version(
        mut self,
        name: impl Into<PackageName>,
        version: impl IntoVersion,
        constraints: impl IntoIterator<Item = Constraint>,
    ) -> Result<Self, ParseVersionError> {
        let name = name.into();
        let version = version.into_version()?;
        let incoming: Vec<Constraint> = constraints.into_iter().collect();
        let entries = self.packages.entry(name.clone()).or_default();
        match entries.iter_mut().find(|(v, _)| *v == version) {
            Some((_, existing)) => {
                for c in incoming {
                    if !existing.contains(&c) {
                        existing.push(c);
                    }
                }
                debug!("merged constraints into existing {name} {version}");
            }
            None => {
                debug!("added {name} {version} with {} constraint(s)", incoming.len());
                entries.push((version, incoming));
            }
        }
        Ok(self)
    }

    /// Add every `(version, constraints)` pair of `name` in one call.
    pub fn add_package<V, I, C>(
        mut self,
        name: impl Into<PackageName>,
        versions: impl IntoIterator<Item = (V, I)>,
    ) -> Result<Self, ParseVersionError>
    where
        V: IntoVersion,
        I: IntoIterator<Item = C>,
        C: Into<Constraint>,
    {
        let name = name.into();
        let versions: Vec<(V, I)> = versions.into_iter().collect();
        debug!("add_package {name} with {} version(s)", versions.len());
        for (version, constraints) in versions {
            self = self.add_package_version(
                name.clone(),
                version,
                constraints.into_iter().map(Into::into),
            )?;
        }
        Ok(self)
    }

    /// Add several packages in one call.
    pub fn add_packages<N, V, I, C>(
        mut self,
        packages: impl IntoIterator<Item = (N, Vec<(V, I)>)>,
    ) -> Result<Self, ParseVersionError>
    where
        N: Into<PackageName>,
        V: IntoVersion,
        I: IntoIterator<Item = C>,
        C: Into<Constraint>,
    {
        let packages: Vec<(N, Vec<(V, I)>)> = packages.into_iter().collect();
        debug!("add_packages with {} package(s)", packages.len());
        for (name, versions) in packages {
            self = self.add_package(name, versions)?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::CmpOp;

    #[test]
    fn add_package_version_accumulates() {
        let g = DepGraph::new()
            .add_package_version("app1", "0.1.0", vec![Constraint::any("app2")])
            .unwrap();
        assert_eq!(g.len(), 1);
        let entries = g.get(&"app1".into()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1.len(), 1);
    }

    #[test]
    fn re_adding_a_version_merges_constraints_without_duplicating() {
        let g = DepGraph::new()
            .add_package_version("app1", "0.1.0", vec![Constraint::any("app2")])
            .unwrap()
            .add_package_version(
                "app1",
                "0.1.0",
                vec![
                    Constraint::any("app2"),
                    Constraint::cmp("app3", "1.0.0", CmpOp::Ge).unwrap(),
                ],
            )
            .unwrap();
        let entries = g.get(&"app1".into()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1.len(), 2);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let g = DepGraph::new()
            .add_package_version("z", "1.0.0", vec![])
            .unwrap()
            .add_package_version("a", "1.0.0", vec![])
            .unwrap();
        let names: Vec<_> = g.iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, vec!["z".to_string(), "a".to_string()]);
    }
}
