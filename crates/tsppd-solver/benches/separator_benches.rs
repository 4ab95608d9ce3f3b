// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use criterion::{criterion_group, criterion_main, Criterion};
use tsppd_model::prelude::{ArcIndex, Graph};
use tsppd_solver::bc::callbacks::capacity::CapacitySeparator;
use tsppd_solver::bc::callbacks::fork::ForkSeparator;
use tsppd_solver::bc::callbacks::generalised_order::GeneralisedOrderSeparator;
use tsppd_solver::bc::callbacks::simplified_fork::SimplifiedForkSeparator;
use tsppd_solver::bc::callbacks::solution::SolutionSnapshot;
use tsppd_solver::bc::callbacks::subtour_elimination::SubtourEliminationSeparator;

const EPS: f64 = 1e-6;

fn benchmark_instance(n: usize) -> (Graph<i64>, ArcIndex, SolutionSnapshot) {
    let nodes = 2 * n + 2;
    let mut costs = vec![vec![-1.0; nodes]; nodes];
    for i in 0..nodes {
        for j in 0..nodes {
            if i != j && j != 0 && i != nodes - 1 {
                costs[i][j] = 1.0 + ((3 * i + 5 * j) % 11) as f64;
            }
        }
    }
    let demands: Vec<i64> = (0..n).map(|r| 1 + (r as i64 % 4)).collect();
    let graph = Graph::with_pickup_demands(6, &demands, costs, vec![6; nodes]).unwrap();
    let arc_index = ArcIndex::new(&graph);

    // Deterministic fractional soup with row sums close to one.
    let mut x = vec![vec![0.0; nodes]; nodes];
    for (k, (i, j)) in arc_index.iter() {
        if (i + 2 * j + k) % 7 == 0 {
            x[i][j] = 0.25 + ((k % 4) as f64) * 0.2;
        }
    }
    let snapshot = SolutionSnapshot::from_dense(x, EPS);
    (graph, arc_index, snapshot)
}

fn separator_benches(c: &mut Criterion) {
    let (graph, arc_index, snapshot) = benchmark_instance(12);

    c.bench_function("subtour_elimination_n12", |b| {
        b.iter(|| {
            SubtourEliminationSeparator::new(&graph, &arc_index, &snapshot, EPS)
                .separate_valid_cuts()
                .unwrap()
        })
    });

    c.bench_function("generalised_order_n12", |b| {
        b.iter(|| {
            GeneralisedOrderSeparator::new(&graph, &arc_index, &snapshot, EPS)
                .separate_valid_cuts()
                .unwrap()
        })
    });

    c.bench_function("capacity_n12", |b| {
        b.iter(|| {
            CapacitySeparator::new(&graph, &arc_index, &snapshot, EPS)
                .separate_valid_cuts()
                .unwrap()
        })
    });

    c.bench_function("simplified_fork_n12", |b| {
        b.iter(|| {
            SimplifiedForkSeparator::new(&graph, &arc_index, &snapshot, EPS)
                .separate_valid_cuts()
                .unwrap()
        })
    });

    c.bench_function("fork_n12", |b| {
        b.iter(|| {
            ForkSeparator::new(&graph, &arc_index, &snapshot, EPS)
                .separate_valid_cuts()
                .unwrap()
        })
    });
}

criterion_group!(benches, separator_benches);
criterion_main!(benches);
