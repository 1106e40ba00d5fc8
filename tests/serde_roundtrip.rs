// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Serde round-trip tests, gated behind the `serde` feature, matching the
//! `version-ranges` workspace member's own round-trip style.

#![cfg(feature = "serde")]

use depsolver::{CmpOp, Constraint, DepGraph};

#[test]
fn constraint_round_trips_through_ron() {
    let c = Constraint::cmp("app2", "1.2.3", CmpOp::Ge).unwrap();
    let s = ron::ser::to_string(&c).unwrap();
    let back: Constraint = ron::de::from_str(&s).unwrap();
    assert_eq!(c, back);
}

#[test]
fn graph_round_trips_through_ron() {
    let graph = DepGraph::new()
        .add_package_version("app1", "0.1.0", vec![Constraint::any("app2")])
        .unwrap()
        .add_package_version("app2", "0.2.0", vec![])
        .unwrap();
    let s = ron::ser::to_string(&graph).unwrap();
    let back: DepGraph = ron::de::from_str(&s).unwrap();
    let names_before: Vec<_> = graph.iter().map(|(n, _)| n.clone()).collect();
    let names_after: Vec<_> = back.iter().map(|(n, _)| n.clone()).collect();
    assert_eq!(names_before, names_after);
}
