// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The solve driver: encode, rent a session, solve, unmap — and, on total
//! failure, binary-search-free culprit search over run-list prefixes.

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::error::Error;
use crate::graph::DepGraph;
use crate::constraint::Constraint;
use crate::internal::{encode, trim, EncodeError, SolverProblem, RUN_LIST_PKG_INDEX};
use crate::package::PackageName;
use crate::solver_session::{Disposition, SolveOutcome, SolverSession, WorkerPool};
use crate::version::Version;

/// The name reserved for the synthetic package representing the run list
/// itself. Not a legal target for a real dependency, since no caller can
/// declare a package under this name through [`DepGraph`]'s public API
/// without going through [`crate::solve`].
const RUN_LIST_PACKAGE: &str = "$run_list";

/// A solved run list: every package the run list (transitively) resolved to,
/// in no particular order beyond what [`indexmap::IndexMap`] preserves.
pub type Assignments = IndexMap<PackageName, Version>;

/// Per-solve tuning. `Default` matches the adapter's own documented default
/// timeout.
#[derive(Debug, Clone, Default)]
pub struct SolveConfig {
    /// Deadline passed through to the solver session, in milliseconds.
    /// `None` defers to the adapter's default.
    pub timeout_ms: Option<u64>,
}

/// The outcome of a successful solve.
///
/// `valid` is always `true` and `disabled` always empty here: a run list
/// that could only be satisfied by disabling one of its own packages is not
/// a solution (SS4.5) and surfaces as [`Error::NoSolutionPrefix`] from
/// culprit search instead of as an `Ok` result. Both fields are kept on this
/// struct, rather than dropped down to a bare `Assignments`, so a future
/// caller who wants to distinguish "culprit search could not even name a
/// disabled set" from "solved outright" has somewhere to do it without an
/// API break.
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// The resolved assignment.
    pub assignments: Assignments,
    /// Always `true`; see the struct-level note.
    pub valid: bool,
    /// Always empty; see the struct-level note.
    pub disabled: Vec<PackageName>,
}

enum RunOutcome {
    Solved {
        assignments: Assignments,
        disabled: Vec<PackageName>,
    },
    Unsatisfiable,
}

/// Solve `run_list` against `graph` using the adapter's documented default
/// timeout.
pub fn solve<P: WorkerPool>(
    graph: &DepGraph,
    run_list: &[Constraint],
    pool: &P,
) -> Result<SolveResult, Error> {
    solve_with_config(graph, run_list, pool, &SolveConfig::default())
}

/// Solve `run_list` against `graph`, with explicit per-solve configuration.
pub fn solve_with_config<P: WorkerPool>(
    graph: &DepGraph,
    run_list: &[Constraint],
    pool: &P,
    config: &SolveConfig,
) -> Result<SolveResult, Error> {
    if run_list.is_empty() {
        warn!("rejecting solve: run list is empty");
        return Err(Error::EmptyRunList);
    }

    info!("solving run list of {} entr(y/ies)", run_list.len());
    match run_once(graph, run_list, pool, config)? {
        RunOutcome::Solved {
            assignments,
            disabled,
        } if disabled.is_empty() => {
            info!("solved with {} package(s) assigned", assignments.len());
            Ok(SolveResult {
                valid: true,
                assignments,
                disabled,
            })
        }
        RunOutcome::Solved { disabled, .. } => {
            // A disabled package here means the full run list only solves
            // once some package it names is forced out — not a valid
            // answer, per SPEC_FULL.md SS4.5: it must drive culprit search
            // rather than being returned directly.
            warn!(
                "full run list only solves with {} package(s) disabled, starting culprit search",
                disabled.len()
            );
            run_culprit_search(graph, run_list, pool, config)
        }
        RunOutcome::Unsatisfiable => {
            warn!("full run list is unsatisfiable, starting culprit search");
            run_culprit_search(graph, run_list, pool, config)
        }
    }
}

/// Run culprit search and turn its outcome into the terminal `Err` it always
/// produces once the full run list has failed to solve cleanly.
fn run_culprit_search<P: WorkerPool>(
    graph: &DepGraph,
    run_list: &[Constraint],
    pool: &P,
    config: &SolveConfig,
) -> Result<SolveResult, Error> {
    match culprit_search(graph, run_list, pool, config)? {
        Some((prefix_len, disabled)) => {
            warn!(
                "no solution for the full run list; minimal failing prefix has length {prefix_len} with {} package(s) disabled",
                disabled.len()
            );
            Err(Error::NoSolutionPrefix {
                prefix_len,
                disabled,
            })
        }
        None => {
            warn!("no solution satisfies the run list");
            Err(Error::NoSolution)
        }
    }
}

/// Encode `goals` against `graph` and run exactly one solve through `pool`.
fn run_once<P: WorkerPool>(
    graph: &DepGraph,
    goals: &[Constraint],
    pool: &P,
    config: &SolveConfig,
) -> Result<RunOutcome, Error> {
    let reachable = trim(graph, goals);
    debug!("reachability trimmed to {} package(s)", reachable.len());
    let problem = SolverProblem::build(
        RUN_LIST_PACKAGE,
        vec![(Version::NO_VSN, Vec::new())],
        &reachable,
    );

    let mut session = pool.take_member().map_err(|_| {
        warn!("no solver worker was available");
        Error::NoDepsolverWorkers
    })?;

    match encode(&problem, goals, &mut session) {
        Ok(()) => {}
        Err(EncodeError::UnreachablePackage(name)) => {
            warn!("package {name} is referenced but not defined in the graph");
            pool.return_member(session, Disposition::Fail);
            return Err(Error::UnreachablePackage(name));
        }
        Err(EncodeError::Session(e)) => {
            warn!("solver session rejected a posting: {e}");
            pool.return_member(session, Disposition::Fail);
            return Err(Error::Session(Box::new(e)));
        }
    }

    // Disposition is decided on the outcome itself, not on the outer
    // `Result`: a `TimedOut` verdict still returns `Ok` from `solve`, but
    // per SPEC_FULL.md SS4.5/SS5 the session must come back `Fail` so the
    // pool retires it.
    let outcome = match session.solve(config.timeout_ms) {
        Ok(SolveOutcome::TimedOut) => {
            pool.return_member(session, Disposition::Fail);
            SolveOutcome::TimedOut
        }
        Ok(outcome) => {
            pool.return_member(session, Disposition::Ok);
            outcome
        }
        Err(e) => {
            warn!("solver session failed: {e}");
            pool.return_member(session, Disposition::Fail);
            return Err(Error::Session(Box::new(e)));
        }
    };

    match outcome {
        SolveOutcome::Solved {
            assignment,
            disabled,
        } => {
            let assignments = problem.unmap_solution(&assignment);
            let disabled = disabled
                .into_iter()
                .filter(|&id| id != RUN_LIST_PKG_INDEX)
                .map(|id| problem.entry(id).name().clone())
                .collect();
            Ok(RunOutcome::Solved {
                assignments,
                disabled,
            })
        }
        SolveOutcome::Unsatisfiable => Ok(RunOutcome::Unsatisfiable),
        SolveOutcome::TimedOut => {
            warn!("solve timed out (timeout_ms={:?})", config.timeout_ms);
            Err(Error::Timeout(format!("{:?}", config.timeout_ms)))
        }
    }
}

/// Find the shortest prefix of `run_list` that is itself unsatisfiable, by
/// re-encoding and re-solving each growing prefix in turn. Quadratic in the
/// length of the run list, traded for a dramatically simpler mental model
/// than an incremental encoder.
fn culprit_search<P: WorkerPool>(
    graph: &DepGraph,
    run_list: &[Constraint],
    pool: &P,
    config: &SolveConfig,
) -> Result<Option<(usize, Vec<PackageName>)>, Error> {
    for k in 1..=run_list.len() {
        let prefix = &run_list[..k];
        // A `Solved` outcome only counts as this prefix succeeding when
        // nothing had to be disabled to reach it; a non-empty `disabled`
        // set is the same "invalid" verdict as `Unsatisfiable` (SS4.5).
        let prefix_fails = match run_once(graph, prefix, pool, config)? {
            RunOutcome::Solved { disabled, .. } => !disabled.is_empty(),
            RunOutcome::Unsatisfiable => true,
        };
        if prefix_fails {
            warn!("culprit search: prefix of length {k} is unsatisfiable");
            let disabled = if k == 1 {
                Vec::new()
            } else {
                match run_once(graph, &run_list[..k - 1], pool, config)? {
                    RunOutcome::Solved { disabled, .. } => disabled,
                    RunOutcome::Unsatisfiable => Vec::new(),
                }
            };
            return Ok(Some((k, disabled)));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::CmpOp;
    use crate::testing::InMemoryPool;

    fn app_universe() -> DepGraph {
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
            .add_package_version("app1", "0.2.0", vec![]).unwrap()
            .add_package_version("app1", "0.3.0", vec![]).unwrap()
            .add_package_version("app2", "0.1.0", vec![]).unwrap()
            .add_package_version("app2", "0.3.0", vec![]).unwrap()
            .add_package_version(
                "app2",
                "0.2.0",
                vec![Constraint::exact("app3", "0.3.0").unwrap()],
            )
            .unwrap()
            .add_package_version("app3", "0.1.0", vec![]).unwrap()
            .add_package_version("app3", "0.2.0", vec![]).unwrap()
            .add_package_version("app3", "0.3.0", vec![]).unwrap()
    }

    #[test]
    fn s1_basic_resolution() {
        let graph = app_universe();
        let run_list = vec![Constraint::exact("app3", "0.3.0").unwrap()];
        let pool = InMemoryPool::new(1);
        let result = solve(&graph, &run_list, &pool).unwrap();
        assert!(result.valid);
        assert_eq!(result.assignments.len(), 1);
        assert_eq!(
            result.assignments.get(&PackageName::from("app3")),
            Some(&Version::parse("0.3.0").unwrap())
        );
    }

    #[test]
    fn s2_transitive() {
        let graph = app_universe();
        let run_list = vec![Constraint::exact("app1", "0.1.0").unwrap()];
        let pool = InMemoryPool::new(1);
        let result = solve(&graph, &run_list, &pool).unwrap();
        assert!(result.valid);
        assert_eq!(result.assignments.len(), 3);
        assert_eq!(
            result.assignments.get(&PackageName::from("app2")),
            Some(&Version::parse("0.2.0").unwrap())
        );
        assert_eq!(
            result.assignments.get(&PackageName::from("app3")),
            Some(&Version::parse("0.3.0").unwrap())
        );
    }

    #[test]
    fn s3_lower_bound() {
        let graph = app_universe();
        let run_list = vec![Constraint::cmp("app3", "0.3.0", CmpOp::Ge).unwrap()];
        let pool = InMemoryPool::new(1);
        let result = solve(&graph, &run_list, &pool).unwrap();
        assert!(result.valid);
        assert_eq!(result.assignments.len(), 1);
        assert_eq!(
            result.assignments.get(&PackageName::from("app3")),
            Some(&Version::parse("0.3.0").unwrap())
        );
    }

    #[test]
    fn s4_unreachable_package_errors() {
        let graph = app_universe();
        let run_list = vec![Constraint::exact("appX", "0.1.0").unwrap()];
        let pool = InMemoryPool::new(1);
        let err = solve(&graph, &run_list, &pool).unwrap_err();
        match err {
            Error::UnreachablePackage(name) => assert_eq!(name, PackageName::from("appX")),
            other => panic!("expected UnreachablePackage, got {other:?}"),
        }
    }

    #[test]
    fn s5_overconstrained_finds_length_two_culprit() {
        let graph = DepGraph::new()
            .add_package_version("a", "1.0.0", vec![Constraint::exact("b", "1.0.0").unwrap()])
            .unwrap()
            .add_package_version("a", "2.0.0", vec![Constraint::exact("b", "2.0.0").unwrap()])
            .unwrap()
            .add_package_version("b", "1.0.0", vec![]).unwrap()
            .add_package_version("b", "2.0.0", vec![]).unwrap();
        let run_list = vec![
            Constraint::exact("a", "1.0.0").unwrap(),
            Constraint::exact("b", "2.0.0").unwrap(),
        ];
        let pool = InMemoryPool::new(1);
        let err = solve(&graph, &run_list, &pool).unwrap_err();
        match err {
            Error::NoSolutionPrefix { prefix_len, disabled } => {
                assert_eq!(prefix_len, 2);
                assert!(disabled.is_empty());
            }
            other => panic!("expected NoSolutionPrefix, got {other:?}"),
        }
    }

    #[test]
    fn s6_culprit_search_finds_minimal_failing_prefix() {
        let graph = DepGraph::new()
            .add_package_version("x", "1.0.0", vec![Constraint::exact("s", "1.0.0").unwrap()])
            .unwrap()
            .add_package_version("y", "1.0.0", vec![]).unwrap()
            .add_package_version("s", "1.0.0", vec![]).unwrap()
            .add_package_version("s", "2.0.0", vec![]).unwrap()
            .add_package_version("w", "1.0.0", vec![]).unwrap();
        let run_list = vec![
            Constraint::exact("x", "1.0.0").unwrap(),
            Constraint::exact("y", "1.0.0").unwrap(),
            Constraint::exact("s", "2.0.0").unwrap(),
            Constraint::any("w"),
        ];
        let pool = InMemoryPool::new(1);
        let err = solve(&graph, &run_list, &pool).unwrap_err();
        match err {
            Error::NoSolutionPrefix { prefix_len, .. } => assert_eq!(prefix_len, 3),
            other => panic!("expected NoSolutionPrefix, got {other:?}"),
        }
    }

    #[test]
    fn empty_run_list_is_rejected() {
        let graph = DepGraph::new();
        let pool = InMemoryPool::new(1);
        assert!(matches!(
            solve(&graph, &[], &pool).unwrap_err(),
            Error::EmptyRunList
        ));
    }

    #[test]
    fn goal_naming_a_nonexistent_version_of_a_real_package_errors_instead_of_disabling_it() {
        let graph = DepGraph::new()
            .add_package_version("foo", "1.0.0", vec![])
            .unwrap()
            .add_package_version("foo", "2.0.0", vec![])
            .unwrap();
        let run_list = vec![Constraint::exact("foo", "3.0.0").unwrap()];
        let pool = InMemoryPool::new(1);
        let err = solve(&graph, &run_list, &pool).unwrap_err();
        assert!(matches!(err, Error::NoSolutionPrefix { .. } | Error::NoSolution));
    }
}
