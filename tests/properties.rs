// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Property tests over small randomly generated universes, checking the
//! universal invariants rather than fixed scenarios.

use depsolver::testing::InMemoryPool;
use depsolver::{solve, Constraint, DepGraph};
use proptest::prelude::*;

const PACKAGE_NAMES: &[&str] = &["p0", "p1", "p2", "p3"];

/// Each of up to 4 packages gets 1-2 versions, and each version may depend
/// on exactly one other, lower-indexed package (so the dependency graph is
/// always acyclic by construction). `spec[i] = (i, version_count, dep)`.
fn build_graph(spec: &[(usize, usize, Option<usize>)]) -> DepGraph {
    let mut graph = DepGraph::new();
    for &(i, version_count, dep) in spec {
        for v in 1..=version_count {
            let mut constraints = Vec::new();
            if let Some(target) = dep {
                if target < i {
                    constraints.push(Constraint::any(PACKAGE_NAMES[target]));
                }
            }
            graph = graph
                .add_package_version(PACKAGE_NAMES[i], (v as u64, 0, 0), constraints)
                .unwrap();
        }
    }
    graph
}

fn small_graph_spec() -> impl Strategy<Value = Vec<(usize, usize, Option<usize>)>> {
    (1..=PACKAGE_NAMES.len()).prop_flat_map(|pkg_count| {
        proptest::collection::vec((1..=2usize, proptest::option::of(0..pkg_count)), pkg_count)
            .prop_map(|v| v.into_iter().enumerate().map(|(i, (vc, dep))| (i, vc, dep)).collect())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn solving_is_deterministic(spec in small_graph_spec()) {
        let graph = build_graph(&spec);
        let run_list = vec![Constraint::any(PACKAGE_NAMES[0])];
        let pool = InMemoryPool::new(1);

        let first = solve(&graph, &run_list, &pool);
        let second = solve(&graph, &run_list, &pool);

        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a.assignments, b.assignments),
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "solve was non-deterministic across identical calls"),
        }
    }

    #[test]
    fn graph_order_does_not_affect_package_set(spec in small_graph_spec()) {
        let forward = build_graph(&spec);
        let mut reversed_spec = spec.clone();
        reversed_spec.reverse();
        let backward = build_graph(&reversed_spec);

        let mut forward_names: Vec<_> = forward.iter().map(|(n, _)| n.to_string()).collect();
        let mut backward_names: Vec<_> = backward.iter().map(|(n, _)| n.to_string()).collect();
        forward_names.sort();
        backward_names.sort();
        prop_assert_eq!(forward_names, backward_names);
    }

    #[test]
    fn a_solution_always_satisfies_every_goal(spec in small_graph_spec()) {
        let graph = build_graph(&spec);
        let run_list = vec![Constraint::any(PACKAGE_NAMES[0])];
        let pool = InMemoryPool::new(1);

        if let Ok(result) = solve(&graph, &run_list, &pool) {
            for goal in &run_list {
                let assigned = result.assignments.get(goal.package());
                prop_assert!(assigned.is_some(), "goal package missing from solution");
                prop_assert!(goal.to_ranges().contains(assigned.unwrap()));
            }
        }
    }
}
