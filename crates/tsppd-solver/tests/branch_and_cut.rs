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

use std::sync::Arc;
use tsppd_model::prelude::{ArcIndex, Graph, Tour};
use tsppd_solver::bc::callbacks::cuts_callback::{CutSink, CutsCallback, NodeCallback};
use tsppd_solver::bc::callbacks::solution::SolutionSnapshot;
use tsppd_solver::bc::callbacks::subtour_elimination::SubtourEliminationSeparator;
use tsppd_solver::bc::cut::Cut;
use tsppd_solver::bc::model_builder::ModelBuilder;
use tsppd_solver::bc::params::BranchAndCutParams;
use tsppd_solver::bc::solver::{BranchAndCutSolver, SolveStatus};
use tsppd_solver::bc::stats::CutStats;
use tsppd_solver::heuristics::best_insertion::BestInsertionHeuristic;
use tsppd_solver::mip::highs::{self, LpOutcome, SolveMode};

/// Complete cost matrix forbidding self arcs, arcs into the source and
/// arcs out of the sink.
fn complete_costs(nodes: usize, cost: impl Fn(usize, usize) -> f64) -> Vec<Vec<f64>> {
    let mut c = vec![vec![-1.0; nodes]; nodes];
    for i in 0..nodes {
        for j in 0..nodes {
            if i != j && j != 0 && i != nodes - 1 {
                c[i][j] = cost(i, j);
            }
        }
    }
    c
}

/// One pickup, nodes on a line at x = 0, 1, 2, 3, Euclidean costs.
fn line_instance() -> Graph<i64> {
    let pts = [0.0f64, 1.0, 2.0, 3.0];
    let costs = complete_costs(4, |i, j| (pts[i] - pts[j]).abs());
    Graph::with_pickup_demands(10, &[5], costs, vec![10; 4]).unwrap()
}

/// Two requests with q = [3, 4] and Q = 5: the pickups can never share
/// the vehicle, forcing an interleaved tour.
fn interleaving_instance() -> Graph<i64> {
    let costs = complete_costs(6, |_, _| 1.0);
    Graph::with_pickup_demands(5, &[3, 4], costs, vec![5, 5, 5, 5, 5, 5]).unwrap()
}

fn all_feasible_tours(graph: &Graph<i64>) -> Vec<Tour> {
    let n = graph.n();
    let mut interior: Vec<usize> = (1..=2 * n).collect();
    let mut tours = Vec::new();
    permute(&mut interior, 0, &mut |perm| {
        let mut nodes = vec![0];
        nodes.extend_from_slice(perm);
        nodes.push(2 * n + 1);
        if let Ok(tour) = Tour::new(nodes, graph) {
            tours.push(tour);
        }
    });
    tours
}

fn permute(items: &mut Vec<usize>, k: usize, visit: &mut impl FnMut(&[usize])) {
    if k == items.len() {
        visit(items);
        return;
    }
    for i in k..items.len() {
        items.swap(k, i);
        permute(items, k + 1, visit);
        items.swap(k, i);
    }
}

#[derive(Default)]
struct RecordingSink {
    cuts: parking_lot::Mutex<Vec<Cut>>,
}

impl CutSink for RecordingSink {
    fn add_cut(&self, cut: Cut) {
        self.cuts.lock().push(cut);
    }
}

#[test]
fn test_line_instance_is_solved_to_optimality() {
    let graph = line_instance();
    let outcome = BranchAndCutSolver::new(&graph, BranchAndCutParams::default())
        .solve()
        .unwrap();
    assert_eq!(outcome.status, SolveStatus::ProvenOptimal);
    let tour = outcome.tour.expect("optimal tour");
    assert_eq!(tour.nodes(), &[0, 1, 2, 3]);
    assert!((outcome.cost.unwrap() - 3.0).abs() < 1e-6);
}

#[test]
fn test_capacity_forces_the_interleaved_tour() {
    let graph = interleaving_instance();
    let outcome = BranchAndCutSolver::new(&graph, BranchAndCutParams::default())
        .solve()
        .unwrap();
    assert_eq!(outcome.status, SolveStatus::ProvenOptimal);
    let tour = outcome.tour.expect("optimal tour");
    assert!((outcome.cost.unwrap() - 5.0).abs() < 1e-6);

    // A Tour is feasible by construction; double-check the interleaving
    // shape: one request completes before the other pickup happens.
    let pos = |v: usize| tour.nodes().iter().position(|&x| x == v).unwrap();
    assert!(pos(3) < pos(2) || pos(4) < pos(1));
}

#[test]
fn test_two_cycle_elimination_preserves_the_optimum() {
    // Symmetric Euclidean costs.
    let pts: [(f64, f64); 6] = [
        (0.0, 0.0),
        (1.0, 0.0),
        (0.0, 1.0),
        (2.0, 1.0),
        (1.0, 2.0),
        (2.0, 2.0),
    ];
    let dist = |i: usize, j: usize| -> f64 {
        let (xi, yi) = pts[i];
        let (xj, yj) = pts[j];
        ((xi - xj).powi(2) + (yi - yj).powi(2)).sqrt()
    };
    let costs = complete_costs(6, dist);
    let graph = Graph::with_pickup_demands(10i64, &[2, 3], costs, vec![10; 6]).unwrap();

    let with = BranchAndCutSolver::new(
        &graph,
        BranchAndCutParams {
            two_cycles_elim: true,
            ..BranchAndCutParams::default()
        },
    )
    .solve()
    .unwrap();
    let without = BranchAndCutSolver::new(
        &graph,
        BranchAndCutParams {
            two_cycles_elim: false,
            ..BranchAndCutParams::default()
        },
    )
    .solve()
    .unwrap();

    assert_eq!(with.status, SolveStatus::ProvenOptimal);
    assert_eq!(without.status, SolveStatus::ProvenOptimal);
    assert!((with.cost.unwrap() - without.cost.unwrap()).abs() < 1e-6);
}

#[test]
fn test_root_relaxation_subtour_is_separated() {
    // Arcs (1,3) and (3,1) are free while everything else costs 1: the
    // relaxed optimum circulates on {1, 3} next to the short depot path.
    let mut costs = complete_costs(6, |_, _| 1.0);
    costs[1][3] = 0.0;
    costs[3][1] = 0.0;
    let graph = Graph::with_pickup_demands(10i64, &[2, 3], costs, vec![10; 6]).unwrap();
    let arc_index = ArcIndex::new(&graph);
    let params = BranchAndCutParams {
        two_cycles_elim: false,
        subpath_elim: false,
        ..BranchAndCutParams::default()
    };
    let model = ModelBuilder::new(&graph, &arc_index, &params, None)
        .build()
        .unwrap();

    let LpOutcome::Optimal(solution) =
        highs::solve(model.mip(), SolveMode::Relaxed, &[], None).unwrap()
    else {
        panic!("root relaxation must solve");
    };
    let x_values: Vec<f64> = model
        .x_columns()
        .iter()
        .map(|c| solution.value(c.get()))
        .collect();
    let snapshot = SolutionSnapshot::from_arc_values(6, &arc_index, &x_values, params.eps);
    assert!(snapshot.x(1, 3) + snapshot.x(3, 1) > 1.0 + params.eps);

    let cuts = SubtourEliminationSeparator::new(&graph, &arc_index, &snapshot, params.eps)
        .separate_valid_cuts()
        .unwrap();
    let pair_cut = cuts
        .iter()
        .find(|c| c.arcs() == [(1, 3), (3, 1)])
        .expect("expected the {1, n+1} subtour cut at the root");
    assert_eq!(pair_cut.rhs(), 1.0);
}

#[test]
fn test_forbidden_arcs_stay_out_of_variables_and_cuts() {
    let mut costs = complete_costs(6, |_, _| 1.0);
    costs[1][2] = -1.0;
    costs[4][3] = -1.0;
    let graph = Graph::with_pickup_demands(5i64, &[3, 4], costs, vec![5; 6]).unwrap();
    let arc_index = ArcIndex::new(&graph);

    // Absent from the variable set.
    assert_eq!(arc_index.column(1, 2), None);
    assert_eq!(arc_index.column(4, 3), None);
    let params = BranchAndCutParams::default();
    let model = ModelBuilder::new(&graph, &arc_index, &params, None)
        .build()
        .unwrap();
    for column in model.mip().columns() {
        assert_ne!(column.name_str(), "x_1_2");
        assert_ne!(column.name_str(), "y_4_3");
    }

    // Absent from every cut separated over a saturated snapshot.
    let stats = Arc::new(CutStats::new());
    let callback = CutsCallback::new(&graph, &arc_index, &params, stats);
    let mut x = vec![vec![0.0; 6]; 6];
    for (k, (i, j)) in arc_index.iter() {
        // Deterministic fractional soup over the allowed arcs.
        x[i][j] = 0.3 + 0.4 * ((k % 3) as f64) / 2.0;
    }
    let snapshot = SolutionSnapshot::from_dense(x, params.eps);
    let sink = RecordingSink::default();
    callback.on_node(0, &snapshot, &sink).unwrap();
    for cut in sink.cuts.lock().iter() {
        for &(i, j) in cut.arcs() {
            assert!(graph.is_arc(i, j), "cut references forbidden arc ({i},{j})");
        }
    }
}

#[test]
fn test_k_opt_zero_pins_the_reference_tour() {
    // Distinct costs so the reference is not coincidentally optimal.
    let costs = complete_costs(6, |i, j| 1.0 + (7 * i + 3 * j) as f64 / 10.0);
    let graph = Graph::with_pickup_demands(5i64, &[3, 4], costs, vec![5; 6]).unwrap();
    let reference = BestInsertionHeuristic::new(&graph).solve().unwrap();

    let outcome = BranchAndCutSolver::new(
        &graph,
        BranchAndCutParams {
            k_opt: Some(0),
            ..BranchAndCutParams::default()
        },
    )
    .with_reference_tour(&reference)
    .solve()
    .unwrap();

    assert_eq!(outcome.status, SolveStatus::ProvenOptimal);
    assert!((outcome.cost.unwrap() - reference.cost(&graph)).abs() < 1e-6);
    assert_eq!(outcome.tour.unwrap().nodes(), reference.nodes());
}

#[test]
fn test_emitted_cuts_are_valid_for_every_feasible_tour() {
    let graph = interleaving_instance();
    let arc_index = ArcIndex::new(&graph);
    let params = BranchAndCutParams::default();
    let stats = Arc::new(CutStats::new());
    let callback = CutsCallback::new(&graph, &arc_index, &params, stats);

    let tours = all_feasible_tours(&graph);
    assert!(!tours.is_empty());
    let tour_arcs: Vec<Vec<(usize, usize)>> =
        tours.iter().map(|t| t.arcs().collect()).collect();

    // A few deterministic snapshots, fractional and integer-infeasible.
    let stage = |entries: &[(usize, usize, f64)]| {
        let mut x = vec![vec![0.0; 6]; 6];
        for &(i, j, v) in entries {
            x[i][j] = v;
        }
        SolutionSnapshot::from_dense(x, params.eps)
    };
    let snapshots = vec![
        stage(&[(1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0), (4, 1, 0.8), (1, 4, 0.2)]),
        stage(&[(0, 2, 1.0), (2, 4, 1.0), (4, 5, 1.0), (1, 3, 1.0), (3, 1, 1.0)]),
        stage(&[(1, 3, 0.5), (3, 1, 0.5), (1, 2, 0.5), (2, 4, 0.5), (0, 1, 1.0)]),
    ];

    for snapshot in &snapshots {
        let sink = RecordingSink::default();
        callback.on_node(0, snapshot, &sink).unwrap();
        for cut in sink.cuts.lock().iter() {
            // No feasible tour may violate any emitted inequality.
            for arcs in &tour_arcs {
                assert!(
                    cut.holds_for_arcs(arcs),
                    "cut {:?} <= {} cuts off a feasible tour {:?}",
                    cut.arcs(),
                    cut.rhs(),
                    arcs
                );
            }
        }
    }
}

#[test]
fn test_load_variables_match_the_simulated_tour() {
    let graph = line_instance();
    let arc_index = ArcIndex::new(&graph);
    let params = BranchAndCutParams::default();
    let model = ModelBuilder::new(&graph, &arc_index, &params, None)
        .build()
        .unwrap();

    let LpOutcome::Optimal(solution) =
        highs::solve(model.mip(), SolveMode::Integral, &[], None).unwrap()
    else {
        panic!("integral solve must succeed");
    };

    // Decode the tour and compare the y values on its arcs against the
    // simulated load profile.
    let x_values: Vec<f64> = model
        .x_columns()
        .iter()
        .map(|c| solution.value(c.get()))
        .collect();
    let snapshot = SolutionSnapshot::from_arc_values(4, &arc_index, &x_values, params.eps);
    assert!(snapshot.is_integer());
    let tour = Tour::new(vec![0, 1, 2, 3], &graph).unwrap();
    for &(i, j) in arc_index.arcs() {
        let expected = if tour.arcs().any(|a| a == (i, j)) { 1.0 } else { 0.0 };
        assert!((snapshot.x(i, j) - expected).abs() < 1e-6);
    }

    let profile = tour.load_profile(&graph);
    for (pos, (i, j)) in tour.arcs().enumerate() {
        let column = model.y_column(arc_index.column(i, j).unwrap());
        let y = solution.value(column.get());
        assert!(
            (y - profile[pos] as f64).abs() < 1e-6,
            "y({i},{j}) = {y}, simulated load = {}",
            profile[pos]
        );
    }
}

#[test]
fn test_solver_reports_monotone_statistics() {
    let graph = interleaving_instance();
    let outcome = BranchAndCutSolver::new(&graph, BranchAndCutParams::default())
        .solve()
        .unwrap();
    for (family, report) in &outcome.cut_report {
        assert!(
            report.separation_seconds >= 0.0,
            "negative separation time for {family}"
        );
    }
    assert_eq!(
        outcome.total_cuts,
        outcome.cut_report.values().map(|r| r.cuts_added).sum::<u64>()
    );
}
