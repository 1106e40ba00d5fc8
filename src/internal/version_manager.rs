// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The id mapping between the named/versioned world ([`crate::graph::DepGraph`])
//! and the all-integer world the finite-domain encoding speaks: every
//! package becomes a variable index, every declared version becomes a
//! non-negative id in that variable's domain, and `-1` means "this package is
//! not part of the solution".

use indexmap::IndexMap;

use crate::constraint::Constraint;
use crate::graph::VersionEntry;
use crate::package::PackageName;
use crate::version::Version;

use super::reachability::{ReachableEntry, ReachableGraph};

/// The synthetic run-list package always occupies variable index 0.
pub(crate) const RUN_LIST_PKG_INDEX: usize = 0;

/// The domain value meaning "this package is absent from the solution".
pub(crate) const UNUSED: i64 = -1;

/// One variable of the encoded problem: either a real package with its
/// declared versions (id = position in this list), or a placeholder for a
/// name that was referenced but never defined.
#[derive(Debug, Clone)]
pub(crate) enum PackageEntry {
    Declared(PackageName, Vec<VersionEntry>),
    Missing(PackageName),
}

impl PackageEntry {
    pub(crate) fn name(&self) -> &PackageName {
        match self {
            PackageEntry::Declared(name, _) => name,
            PackageEntry::Missing(name) => name,
        }
    }
}

/// The fully id-mapped problem: a sequence of variables (package index 0 is
/// always the run list) each with an integer domain, ready for
/// [`super::problem_builder::encode`].
#[derive(Debug, Clone)]
pub(crate) struct SolverProblem {
    entries: Vec<PackageEntry>,
    index_of: IndexMap<PackageName, usize>,
}

impl SolverProblem {
    /// Build the mapping from a trimmed, reachable graph. `run_list_name` is
    /// the synthetic package representing the user's run list itself; it
    /// always gets [`RUN_LIST_PKG_INDEX`].
    pub(crate) fn build(
        run_list_name: impl Into<PackageName>,
        run_list_versions: Vec<VersionEntry>,
        reachable: &ReachableGraph,
    ) -> Self {
        let mut entries = Vec::with_capacity(reachable.len() + 1);
        let mut index_of = IndexMap::with_capacity(reachable.len() + 1);

        let run_list_name = run_list_name.into();
        index_of.insert(run_list_name.clone(), RUN_LIST_PKG_INDEX);
        entries.push(PackageEntry::Declared(run_list_name, run_list_versions));

        for (name, entry) in reachable.iter() {
            let id = entries.len();
            index_of.insert(name.clone(), id);
            entries.push(match entry {
                ReachableEntry::Declared(versions) => {
                    PackageEntry::Declared(name.clone(), versions.clone())
                }
                ReachableEntry::Missing => PackageEntry::Missing(name.clone()),
            });
        }

        SolverProblem { entries, index_of }
    }

    /// Total number of variables, including the run-list package.
    pub(crate) fn package_count(&self) -> usize {
        self.entries.len()
    }

    /// Variable index of a package name, if it appears in this problem.
    pub(crate) fn package_id(&self, name: &PackageName) -> Option<usize> {
        self.index_of.get(name).copied()
    }

    pub(crate) fn entry(&self, id: usize) -> &PackageEntry {
        &self.entries[id]
    }

    /// Every real variable other than the run list, in declared order.
    pub(crate) fn entries_after_run_list(&self) -> impl Iterator<Item = (usize, &PackageEntry)> {
        self.entries.iter().enumerate().skip(1)
    }

    /// Map a constraint to the `(package id, (min id, max id))` bounds it
    /// admits, scanning the package's version list in declared order (it is
    /// never re-sorted). Returns `None` if the constrained package is not
    /// part of this problem at all (neither declared nor a placeholder —
    /// this only happens for goals whose name was never reached by
    /// trimming, which cannot occur once the run list seeded the walk).
    ///
    /// A placeholder ([`PackageEntry::Missing`]) or a real package with no
    /// version admitted by the constraint both map to the domain
    /// `(UNUSED, UNUSED)`: the former is always unusable, the latter is
    /// unusable under this particular constraint. Distinguishing "why" is
    /// [`super::problem_builder`]'s job, not this mapping's.
    pub(crate) fn map_constraint(&self, c: &Constraint) -> Option<(usize, (i64, i64), bool)> {
        let id = self.package_id(c.package())?;
        match &self.entries[id] {
            PackageEntry::Missing(_) => Some((id, (UNUSED, UNUSED), true)),
            PackageEntry::Declared(_, versions) => {
                let ranges = c.to_ranges();
                let mut lo: Option<usize> = None;
                let mut hi: Option<usize> = None;
                for (i, (v, _)) in versions.iter().enumerate() {
                    if ranges.contains(v) {
                        lo.get_or_insert(i);
                        hi = Some(i);
                    }
                }
                match (lo, hi) {
                    (Some(l), Some(h)) => Some((id, (l as i64, h as i64), false)),
                    _ => Some((id, (UNUSED, UNUSED), false)),
                }
            }
        }
    }

    /// Resolve one `(package id, version id)` pair back to its name and
    /// version. Returns `None` for the `UNUSED` sentinel or a placeholder.
    pub(crate) fn unmap_any(&self, package_id: usize, version_id: i64) -> Option<(&PackageName, &Version)> {
        if version_id == UNUSED {
            return None;
        }
        match &self.entries[package_id] {
            PackageEntry::Missing(_) => None,
            PackageEntry::Declared(name, versions) => {
                versions.get(version_id as usize).map(|(v, _)| (name, v))
            }
        }
    }

    /// Resolve a full assignment vector (indexed by package id, run list
    /// included) back into a name-to-version map, dropping the run list
    /// itself and any package left `UNUSED`.
    pub(crate) fn unmap_solution(&self, assignment: &[i64]) -> IndexMap<PackageName, Version> {
        let mut out = IndexMap::with_capacity(assignment.len().saturating_sub(1));
        for (id, &version_id) in assignment.iter().enumerate().skip(1) {
            if let Some((name, version)) = self.unmap_any(id, version_id) {
                out.insert(name.clone(), version.clone());
            }
        }
        out
    }
}
