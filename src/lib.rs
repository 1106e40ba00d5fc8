// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Finite-domain dependency resolution over a pluggable external solver.
//!
//! This crate builds a [`DepGraph`] of packages, their declared versions,
//! and the constraints each version places on its dependencies; trims it to
//! what a run list can actually reach; encodes the result as a finite-domain
//! constraint problem; and hands that problem to an external
//! [`SolverSession`] to solve. The solver's own search algorithm is
//! deliberately not this crate's concern — [`solver_session`] is the whole
//! surface it needs to implement.
//!
//! # Basic example
//!
//! ```
//! use depsolver::{solve, Constraint, DepGraph, PackageName};
//! use depsolver::testing::InMemoryPool;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let graph = DepGraph::new()
//!     .add_package_version("menu", "1.0.0", vec![Constraint::any("dropdown")])?
//!     .add_package_version("dropdown", "1.0.0", vec![Constraint::any("icons")])?
//!     .add_package_version("icons", "1.0.0", vec![])?;
//!
//! let run_list = vec![Constraint::any("menu")];
//! let pool = InMemoryPool::new(1);
//! let result = solve(&graph, &run_list, &pool)?;
//! assert!(result.valid);
//! assert!(result.assignments.contains_key(&PackageName::from("icons")));
//! # Ok(())
//! # }
//! ```
//!
//! # Pipeline
//!
//! 1. [`DepGraph`] accumulates packages, versions, and [`Constraint`]s.
//! 2. [`solve`] trims the graph to what the run list reaches, injecting a
//!    placeholder for any name a constraint references but the graph never
//!    declared.
//! 3. The trimmed graph is id-mapped and encoded as a finite-domain
//!    problem: one variable per package, one domain value per declared
//!    version, plus the sentinel value `-1` meaning "not part of the
//!    solution".
//! 4. A [`WorkerPool`](solver_session::WorkerPool) lends out a
//!    [`SolverSession`](solver_session::SolverSession), which is given the
//!    whole problem and asked for an assignment.
//! 5. If no assignment exists even after relaxing which packages are
//!    required, [`solve`] re-encodes growing prefixes of the run list to
//!    find the shortest one that is itself unsatisfiable.
//!
//! # Errors and logging
//!
//! Every fallible entry point returns [`Error`]. The driver logs phase
//! transitions (encoding, renting a session, culprit search) through the
//! [`log`] facade; wire up any subscriber you like, or use [`env_logger`]
//! in a binary.

#![warn(missing_docs)]

mod constraint;
mod driver;
mod error;
mod graph;
mod internal;
mod package;
pub mod solver_session;
pub mod testing;
mod version;

pub use constraint::{CmpOp, Constraint};
pub use driver::{solve, solve_with_config, Assignments, SolveConfig, SolveResult};
pub use error::Error;
pub use graph::{DepGraph, VersionEntry};
pub use package::PackageName;
pub use solver_session::{Disposition, SolverSession, WorkerPool};
pub use version::{IntoVersion, ParseVersionError, Version, VersionPrecision};
