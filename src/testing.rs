// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reference [`SolverSession`]/[`WorkerPool`] implementations for tests and
//! examples.
//!
//! [`BruteForceSession`] is a plain backtracking search: correct, not fast,
//! and with no notion of a deadline. It exists so the rest of the crate
//! (graph building, reachability, encoding, culprit search) can be exercised
//! end to end without depending on a real external FD solver.

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use crate::solver_session::{Disposition, SolveOutcome, SolverSession, WorkerPool, UNUSED};

/// A session backed by exhaustive backtracking search over the posted
/// domains. Intended for tests and small examples, not production use.
#[derive(Debug, Default)]
pub struct BruteForceSession {
    domains: Vec<(i64, i64)>,
    equals: Vec<(usize, i64)>,
    implications: Vec<(usize, i64, usize, (i64, i64))>,
    required: Vec<usize>,
}

fn satisfies(
    equals: &[(usize, i64)],
    implications: &[(usize, i64, usize, (i64, i64))],
    required: &[usize],
    enforce_required: bool,
    assign: &[i64],
) -> bool {
    if enforce_required && required.iter().any(|&v| assign[v] == UNUSED) {
        return false;
    }
    if !equals.iter().all(|&(v, val)| assign[v] == val) {
        return false;
    }
    implications.iter().all(|&(lhs, lhs_val, rhs, (lo, hi))| {
        assign[lhs] != lhs_val || (assign[rhs] >= lo && assign[rhs] <= hi)
    })
}

fn backtrack(
    domains: &[(i64, i64)],
    equals: &[(usize, i64)],
    implications: &[(usize, i64, usize, (i64, i64))],
    required: &[usize],
    enforce_required: bool,
    idx: usize,
    assign: &mut Vec<i64>,
) -> bool {
    if idx == domains.len() {
        return satisfies(equals, implications, required, enforce_required, assign);
    }
    let (lo, hi) = domains[idx];
    for v in lo..=hi {
        assign[idx] = v;
        if backtrack(domains, equals, implications, required, enforce_required, idx + 1, assign) {
            return true;
        }
    }
    false
}

impl SolverSession for BruteForceSession {
    type Error = Infallible;

    fn set_domains(&mut self, domains: &[(i64, i64)]) -> Result<(), Self::Error> {
        self.domains = domains.to_vec();
        Ok(())
    }

    fn post_equals(&mut self, var: usize, value: i64) -> Result<(), Self::Error> {
        self.equals.push((var, value));
        Ok(())
    }

    fn post_implication(
        &mut self,
        lhs: usize,
        lhs_value: i64,
        rhs: usize,
        bounds: (i64, i64),
    ) -> Result<(), Self::Error> {
        self.implications.push((lhs, lhs_value, rhs, bounds));
        Ok(())
    }

    fn post_required(&mut self, var: usize) -> Result<(), Self::Error> {
        self.required.push(var);
        Ok(())
    }

    fn solve(&mut self, _timeout_ms: Option<u64>) -> Result<SolveOutcome, Self::Error> {
        let n = self.domains.len();
        let mut assign = vec![0i64; n];
        if backtrack(
            &self.domains,
            &self.equals,
            &self.implications,
            &self.required,
            true,
            0,
            &mut assign,
        ) {
            return Ok(SolveOutcome::Solved {
                assignment: assign,
                disabled: Vec::new(),
            });
        }

        let mut relaxed = vec![0i64; n];
        if backtrack(
            &self.domains,
            &self.equals,
            &self.implications,
            &self.required,
            false,
            0,
            &mut relaxed,
        ) {
            let disabled = self
                .required
                .iter()
                .copied()
                .filter(|&v| relaxed[v] == UNUSED)
                .collect();
            return Ok(SolveOutcome::Solved {
                assignment: relaxed,
                disabled,
            });
        }

        Ok(SolveOutcome::Unsatisfiable)
    }
}

/// No session was available within the pool's capacity.
#[derive(Debug, Error)]
#[error("no solver worker was available in this pool")]
pub struct NoWorkers;

/// A fixed-capacity pool of [`BruteForceSession`]s, modeled on a pooled
/// worker collaborator: callers rent a session, use it for exactly one
/// solve, and return it with the [`Disposition`] it came back in.
#[derive(Debug)]
pub struct InMemoryPool {
    capacity: usize,
    in_use: AtomicUsize,
}

impl InMemoryPool {
    /// A pool that can lend out at most `capacity` sessions concurrently.
    pub fn new(capacity: usize) -> Self {
        InMemoryPool {
            capacity,
            in_use: AtomicUsize::new(0),
        }
    }
}

impl WorkerPool for InMemoryPool {
    type Session = BruteForceSession;
    type Error = NoWorkers;

    fn take_member(&self) -> Result<Self::Session, Self::Error> {
        loop {
            let cur = self.in_use.load(Ordering::SeqCst);
            if cur >= self.capacity {
                return Err(NoWorkers);
            }
            if self
                .in_use
                .compare_exchange(cur, cur + 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return Ok(BruteForceSession::default());
            }
        }
    }

    fn return_member(&self, _session: Self::Session, _disposition: Disposition) {
        self.in_use.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_rejects_beyond_capacity() {
        let pool = InMemoryPool::new(1);
        let a = pool.take_member().unwrap();
        assert!(pool.take_member().is_err());
        pool.return_member(a, Disposition::Ok);
        assert!(pool.take_member().is_ok());
    }

    #[test]
    fn brute_force_respects_implications() {
        let mut session = BruteForceSession::default();
        session.set_domains(&[(0, 0), (-1, 1)]).unwrap();
        session.post_equals(0, 0).unwrap();
        session.post_implication(0, 0, 1, (1, 1)).unwrap();
        match session.solve(None).unwrap() {
            SolveOutcome::Solved { assignment, disabled } => {
                assert_eq!(assignment[1], 1);
                assert!(disabled.is_empty());
            }
            other => panic!("expected a solution, got {other:?}"),
        }
    }

    #[test]
    fn unsatisfiable_domain_reports_unsatisfiable() {
        let mut session = BruteForceSession::default();
        session.set_domains(&[(0, 0)]).unwrap();
        session.post_equals(0, 1).unwrap();
        assert!(matches!(session.solve(None).unwrap(), SolveOutcome::Unsatisfiable));
    }
}
