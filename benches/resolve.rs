// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use depsolver::testing::InMemoryPool;
use depsolver::{solve, Constraint, DepGraph};

/// A linear chain of `depth` packages, each depending on the next, with two
/// decoy versions per package that a correct solver should never need to
/// backtrack into.
fn chain_universe(depth: usize) -> DepGraph {
    let mut graph = DepGraph::new();
    for i in 0..depth {
        let name = format!("pkg{i}");
        let mut constraints = Vec::new();
        if i + 1 < depth {
            constraints.push(Constraint::exact(format!("pkg{}", i + 1), "1.0.0").unwrap());
        }
        graph = graph
            .add_package_version(name.clone(), "1.0.0", constraints)
            .unwrap()
            .add_package_version(name.clone(), "0.9.0", vec![])
            .unwrap()
            .add_package_version(name, "0.8.0", vec![])
            .unwrap();
    }
    graph
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_chain");
    for depth in [4usize, 8, 12] {
        let graph = chain_universe(depth);
        let run_list = vec![Constraint::exact("pkg0", "1.0.0").unwrap()];
        let pool = InMemoryPool::new(1);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| solve(&graph, &run_list, &pool).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
