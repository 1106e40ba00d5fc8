// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Non exposed modules: the machinery between the public [`crate::graph::DepGraph`]
//! and the public [`crate::solver_session::SolverSession`] boundary.

pub(crate) mod problem_builder;
pub(crate) mod reachability;
pub(crate) mod version_manager;

pub(crate) use problem_builder::{encode, EncodeError};
pub(crate) use reachability::{trim, ReachableEntry, ReachableGraph};
pub(crate) use version_manager::{SolverProblem, RUN_LIST_PKG_INDEX, UNUSED};
