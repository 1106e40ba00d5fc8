// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors a solve can fail with.

use thiserror::Error;

use crate::package::PackageName;
use crate::version::ParseVersionError;

/// Everything that can go wrong while solving a run list.
#[derive(Debug, Error)]
pub enum Error {
    /// A goal, or some version's dependency, names a package that is not
    /// declared anywhere in the graph.
    #[error("package {0} is referenced but not defined in the graph")]
    UnreachablePackage(PackageName),

    /// No assignment satisfies the run list, even after relaxing every
    /// `required` package.
    #[error("no solution satisfies the run list")]
    NoSolution,

    /// No assignment satisfies the run list as given, but this prefix of it
    /// does, once the packages in `disabled` are dropped.
    #[error("no solution for the full run list; culprit search found a satisfiable prefix of length {prefix_len} with {} package(s) disabled", disabled.len())]
    NoSolutionPrefix {
        /// Length of the minimal failing prefix that was found to be
        /// satisfiable once relaxed.
        prefix_len: usize,
        /// Packages that had to be dropped from that prefix's run list to
        /// reach a solution.
        disabled: Vec<PackageName>,
    },

    /// The run list passed to [`crate::solve`] was empty.
    #[error("run list must not be empty")]
    EmptyRunList,

    /// The pool had no session available to hand out.
    #[error("no solver worker was available")]
    NoDepsolverWorkers,

    /// The session's deadline elapsed before a verdict was reached.
    #[error("solve timed out: {0}")]
    Timeout(String),

    /// A run-list entry or dependency version failed to parse as semver.
    #[error(transparent)]
    InvalidVersion(#[from] ParseVersionError),

    /// The external solver adapter reported a failure of its own.
    #[error("solver session error: {0}")]
    Session(#[source] Box<dyn std::error::Error + Send + Sync>),
}
