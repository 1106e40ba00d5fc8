// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The boundary to the external finite-domain solver.
//!
//! The solver itself — search strategy, propagation, conflict handling — is
//! deliberately out of scope here: [`SolverSession`] is the narrow surface a
//! concrete FD solver adapter implements, and [`WorkerPool`] is how a driver
//! borrows one for the duration of a single solve, mirroring a pooled-worker
//! collaborator rather than a global solver singleton.

use std::error::Error as StdError;

/// A package variable's index within the encoded problem. Equal to the
/// package id assigned by [`crate::internal::version_manager::SolverProblem`].
pub type VarId = usize;

/// The sentinel domain value meaning "this package is not part of the
/// solution".
pub const UNUSED: i64 = crate::internal::version_manager::UNUSED;

/// What a solve attempt produced.
#[derive(Debug, Clone)]
pub enum SolveOutcome {
    /// A full assignment was found. `disabled` lists the ids of packages
    /// that were declared [`SolverSession::post_required`] but still ended
    /// up [`UNUSED`] — a non-empty list means the run list could only be
    /// satisfied by dropping some of it (see `valid` on the public
    /// [`crate::SolveResult`]).
    Solved {
        assignment: Vec<i64>,
        disabled: Vec<VarId>,
    },
    /// No assignment exists, even after relaxing required packages.
    Unsatisfiable,
    /// The session's deadline elapsed before a verdict was reached.
    TimedOut,
}

/// The narrow interface a finite-domain solver adapter implements.
///
/// A session is single-use: construct it (or rent it from a [`WorkerPool`]),
/// post the whole problem, call [`SolverSession::solve`] once, then discard
/// or return it.
pub trait SolverSession {
    /// The adapter's own error type, for failures that are not "no
    /// solution" (a malformed posting, a session that died mid-search, ...).
    type Error: StdError + Send + Sync + 'static;

    /// Declare every package variable's inclusive domain bounds in one call,
    /// indexed by package id (`domains[i]` bounds package `i`). Bounds of
    /// `(UNUSED, UNUSED)` mean the package can only ever be absent.
    fn set_domains(&mut self, domains: &[(i64, i64)]) -> Result<(), Self::Error>;

    /// Post `var == value` unconditionally.
    fn post_equals(&mut self, var: VarId, value: i64) -> Result<(), Self::Error>;

    /// Post `lhs == lhs_value => rhs in [lo, hi]` (a half-reified bound
    /// constraint). This is how a selected version's dependency constraints
    /// are encoded against the packages it depends on.
    fn post_implication(
        &mut self,
        lhs: VarId,
        lhs_value: i64,
        rhs: VarId,
        bounds: (i64, i64),
    ) -> Result<(), Self::Error>;

    /// Mark `var` as required: a solution where it is forced to [`UNUSED`]
    /// should be reported as `disabled`, not silently accepted, though it
    /// may still be the best the solver can do.
    fn post_required(&mut self, var: VarId) -> Result<(), Self::Error>;

    /// Run the search over everything posted so far. `timeout_ms` of `None`
    /// defers to the adapter's own documented default; enforcing the
    /// deadline is the adapter's responsibility, not this trait's.
    fn solve(&mut self, timeout_ms: Option<u64>) -> Result<SolveOutcome, Self::Error>;
}

/// Whether a rented session came back usable for a future solve, or should
/// be discarded.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Disposition {
    /// The session completed cleanly; the pool may lend it out again.
    Ok,
    /// The session is in an unknown or poisoned state and must not be
    /// reused.
    Fail,
}

/// A pool of reusable [`SolverSession`]s, borrowed for the span of one solve
/// and returned with a [`Disposition`] so the pool knows whether to keep it.
pub trait WorkerPool {
    /// The kind of session this pool lends out.
    type Session: SolverSession;
    /// The pool's own error type, for exhaustion or a dead backing service.
    type Error: StdError + Send + Sync + 'static;

    /// Borrow a session, blocking (per the implementation's own policy) if
    /// none is immediately available.
    fn take_member(&self) -> Result<Self::Session, Self::Error>;

    /// Return a session previously obtained from [`WorkerPool::take_member`].
    fn return_member(&self, session: Self::Session, disposition: Disposition);
}
