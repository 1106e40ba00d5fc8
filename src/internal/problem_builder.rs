// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Translates a [`SolverProblem`] plus a run list into postings against a
//! [`SolverSession`]: variable domains, the run list's own implications, and
//! every declared version's dependency implications.

use log::debug;
use thiserror::Error;

use crate::constraint::Constraint;
use crate::package::PackageName;
use crate::solver_session::SolverSession;

use super::version_manager::{PackageEntry, SolverProblem, RUN_LIST_PKG_INDEX, UNUSED};

/// The synthetic single value the run-list package is always pinned to.
const RUN_LIST_SELECTED: i64 = 0;

/// Encoding failed before any session call could return an error of its own.
#[derive(Debug, Error)]
pub(crate) enum EncodeError<E> {
    /// A goal or dependency constraint named a package that is not defined
    /// anywhere in the graph.
    #[error("package {0} is referenced but not defined")]
    UnreachablePackage(PackageName),
    /// The session rejected a posting.
    #[error(transparent)]
    Session(E),
}

/// Post the whole problem — domains, the run list's goals, and every
/// declared version's dependency implications — onto `session`.
///
/// `goals` is the (possibly trimmed, for culprit search) run list being
/// encoded this round; it need not be every constraint `problem` was built
/// from.
pub(crate) fn encode<S: SolverSession>(
    problem: &SolverProblem,
    goals: &[Constraint],
    session: &mut S,
) -> Result<(), EncodeError<S::Error>> {
    let mut domains = Vec::with_capacity(problem.package_count());
    domains.push((RUN_LIST_SELECTED, RUN_LIST_SELECTED));
    for (_, entry) in problem.entries_after_run_list() {
        domains.push(match entry {
            PackageEntry::Declared(_, versions) if !versions.is_empty() => {
                (UNUSED, versions.len() as i64 - 1)
            }
            PackageEntry::Declared(_, _) | PackageEntry::Missing(_) => (UNUSED, UNUSED),
        });
    }
    session
        .set_domains(&domains)
        .map_err(EncodeError::Session)?;
    session
        .post_equals(RUN_LIST_PKG_INDEX, RUN_LIST_SELECTED)
        .map_err(EncodeError::Session)?;

    for goal in goals {
        let (pkg_id, bounds, is_missing) = problem
            .map_constraint(goal)
            .expect("goal packages are always part of the problem they were encoded from");
        if is_missing {
            return Err(EncodeError::UnreachablePackage(goal.package().clone()));
        }
        session
            .post_implication(RUN_LIST_PKG_INDEX, RUN_LIST_SELECTED, pkg_id, bounds)
            .map_err(EncodeError::Session)?;
        session.post_required(pkg_id).map_err(EncodeError::Session)?;
    }

    for (pkg_id, entry) in problem.entries_after_run_list() {
        let PackageEntry::Declared(_, versions) = entry else {
            continue;
        };
        for (version_id, (_, constraints)) in versions.iter().enumerate() {
            for c in constraints {
                let (target_id, bounds, is_missing) = problem
                    .map_constraint(c)
                    .expect("dependency targets are always part of the problem they were encoded from");
                if is_missing {
                    return Err(EncodeError::UnreachablePackage(c.package().clone()));
                }
                debug!(
                    "posting ({pkg_id}, {version_id}) -> {target_id} in {bounds:?}",
                );
                session
                    .post_implication(pkg_id, version_id as i64, target_id, bounds)
                    .map_err(EncodeError::Session)?;
            }
        }
    }

    Ok(())
}
