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

use crate::bc::callbacks::cuts_callback::{CutSink, CutsCallback, NodeCallback};
use crate::bc::callbacks::solution::SolutionSnapshot;
use crate::bc::cut::{Cut, CutPool};
use crate::bc::err::SolveError;
use crate::bc::model_builder::{BcModel, ModelBuilder};
use crate::bc::params::BranchAndCutParams;
use crate::bc::stats::{CutStats, FamilyReport};
use crate::core::numeric::LoadNumeric;
use crate::mip::highs::{self, LpOutcome, SolveMode};
use crate::mip::model::CutRow;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tsppd_model::prelude::{ArcIndex, Graph, Tour};

/// Terminal condition of a solve. These are reported values, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    ProvenOptimal,
    Feasible,
    Infeasible,
    Interrupted,
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SolveStatus::ProvenOptimal => "proven-optimal",
            SolveStatus::Feasible => "feasible-no-proof",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Interrupted => "interrupted",
        };
        write!(f, "{s}")
    }
}

/// Everything a finished solve reports: the terminal condition, the best
/// tour (when one exists), its cost, cut statistics and round counters.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub tour: Option<Tour>,
    pub cost: Option<f64>,
    pub cut_report: BTreeMap<String, FamilyReport>,
    pub total_cuts: u64,
    pub root_cut_rounds: u64,
    pub lazy_rounds: u64,
}

/// Branch-and-cut driver.
///
/// HiGHS exposes no in-tree callback, so the callback contract is realised
/// as an iterated cut loop: a root cutting-plane phase over the LP
/// relaxation separates user cuts from fractional points, then integer
/// solves alternate with lazy feasibility separation until an incumbent
/// survives unscathed. Every emitted inequality is valid for the original
/// feasible region, so the final incumbent is proven optimal.
#[derive(Debug)]
pub struct BranchAndCutSolver<'a, T: Copy + Ord> {
    graph: &'a Graph<T>,
    params: BranchAndCutParams,
    reference_tour: Option<&'a Tour>,
}

struct PoolSink {
    cuts: Mutex<Vec<Cut>>,
}

impl PoolSink {
    fn new() -> Self {
        Self {
            cuts: Mutex::new(Vec::new()),
        }
    }

    fn drain(self) -> Vec<Cut> {
        self.cuts.into_inner()
    }
}

impl CutSink for PoolSink {
    fn add_cut(&self, cut: Cut) {
        self.cuts.lock().push(cut);
    }
}

impl<'a, T: LoadNumeric> BranchAndCutSolver<'a, T> {
    pub fn new(graph: &'a Graph<T>, params: BranchAndCutParams) -> Self {
        Self {
            graph,
            params,
            reference_tour: None,
        }
    }

    /// Supplies the warm-start tour: the k-opt reference and the incumbent
    /// reported when the proof is cut short.
    pub fn with_reference_tour(mut self, tour: &'a Tour) -> Self {
        self.reference_tour = Some(tour);
        self
    }

    pub fn solve(&self) -> Result<SolveOutcome, SolveError> {
        self.params.validate()?;

        let arc_index = ArcIndex::new(self.graph);
        let model = ModelBuilder::new(self.graph, &arc_index, &self.params, self.reference_tour)
            .build()?;
        let stats = Arc::new(CutStats::new());
        let callback = CutsCallback::new(self.graph, &arc_index, &self.params, Arc::clone(&stats));

        let mut pool = CutPool::new();
        let mut cut_rows: Vec<CutRow> = Vec::new();
        let mut node_number: u64 = 0;

        tracing::info!(
            requests = self.graph.n(),
            arcs = arc_index.len(),
            rows = model.mip().num_rows(),
            "starting branch-and-cut"
        );

        // Root cutting-plane phase over the LP relaxation.
        let mut root_cut_rounds = 0;
        while root_cut_rounds < self.params.max_root_cut_rounds {
            let solution = match self.run_engine(&model, SolveMode::Relaxed, &cut_rows)? {
                LpOutcome::Optimal(solution) => solution,
                LpOutcome::Infeasible => {
                    return Ok(self.finished(SolveStatus::Infeasible, None, None, &stats, 0, 0));
                }
                LpOutcome::Unbounded => {
                    return Ok(self.finished(SolveStatus::Interrupted, None, None, &stats, 0, 0));
                }
            };
            let snapshot = self.snapshot(&arc_index, &model, &solution);
            root_cut_rounds += 1;

            let fresh = self.invoke_callback(
                &callback,
                &mut node_number,
                &snapshot,
                &mut pool,
                &mut cut_rows,
                &arc_index,
                &model,
            )?;
            tracing::debug!(
                round = root_cut_rounds,
                objective = solution.objective(),
                fresh_cuts = fresh,
                "root relaxation round"
            );
            if fresh == 0 {
                break;
            }
        }

        // Integer phase: alternate integral solves with lazy separation.
        let mut lazy_rounds = 0;
        loop {
            if lazy_rounds >= self.params.max_lazy_rounds {
                tracing::warn!(
                    rounds = lazy_rounds,
                    "lazy-constraint round cap reached before the proof closed"
                );
                let status = if self.reference_tour.is_some() {
                    SolveStatus::Feasible
                } else {
                    SolveStatus::Interrupted
                };
                let tour = self.reference_tour.cloned();
                let cost = tour.as_ref().map(|t| t.cost(self.graph));
                return Ok(self.finished(
                    status,
                    tour,
                    cost,
                    &stats,
                    root_cut_rounds,
                    lazy_rounds,
                ));
            }

            let solution = match self.run_engine(&model, SolveMode::Integral, &cut_rows)? {
                LpOutcome::Optimal(solution) => solution,
                LpOutcome::Infeasible => {
                    return Ok(self.finished(
                        SolveStatus::Infeasible,
                        None,
                        None,
                        &stats,
                        root_cut_rounds,
                        lazy_rounds,
                    ));
                }
                LpOutcome::Unbounded => {
                    return Ok(self.finished(
                        SolveStatus::Interrupted,
                        None,
                        None,
                        &stats,
                        root_cut_rounds,
                        lazy_rounds,
                    ));
                }
            };
            let snapshot = self.snapshot(&arc_index, &model, &solution);
            lazy_rounds += 1;

            let fresh = self.invoke_callback(
                &callback,
                &mut node_number,
                &snapshot,
                &mut pool,
                &mut cut_rows,
                &arc_index,
                &model,
            )?;
            if fresh > 0 {
                tracing::debug!(round = lazy_rounds, fresh_cuts = fresh, "incumbent rejected");
                continue;
            }

            // No separator objected: the incumbent is a feasible tour and,
            // by cut validity, an optimal one.
            let nodes = tour_nodes(self.graph, &snapshot);
            let tour = Tour::new(nodes, self.graph)
                .expect("clean incumbent must decode to a feasible tour");
            let cost = solution.objective();
            tracing::info!(cost, rounds = lazy_rounds, "proven optimal");
            return Ok(self.finished(
                SolveStatus::ProvenOptimal,
                Some(tour),
                Some(cost),
                &stats,
                root_cut_rounds,
                lazy_rounds,
            ));
        }
    }

    fn run_engine(
        &self,
        model: &BcModel,
        mode: SolveMode,
        cut_rows: &[CutRow],
    ) -> Result<LpOutcome, SolveError> {
        highs::solve(model.mip(), mode, cut_rows, self.params.time_limit_seconds)
            .map_err(SolveError::from)
    }

    fn snapshot(
        &self,
        arc_index: &ArcIndex,
        model: &BcModel,
        solution: &crate::mip::highs::MipSolution,
    ) -> SolutionSnapshot {
        let x_values: Vec<f64> = model
            .x_columns()
            .iter()
            .map(|c| solution.value(c.get()))
            .collect();
        SolutionSnapshot::from_arc_values(
            self.graph.num_nodes(),
            arc_index,
            &x_values,
            self.params.eps,
        )
    }

    /// Runs the callback once and installs the freshly discovered cuts;
    /// returns how many were new to the pool.
    #[allow(clippy::too_many_arguments)]
    fn invoke_callback(
        &self,
        callback: &CutsCallback<'_, T>,
        node_number: &mut u64,
        snapshot: &SolutionSnapshot,
        pool: &mut CutPool,
        cut_rows: &mut Vec<CutRow>,
        arc_index: &ArcIndex,
        model: &BcModel,
    ) -> Result<u64, SolveError> {
        let sink = PoolSink::new();
        callback.on_node(*node_number, snapshot, &sink)?;
        *node_number += 1;

        let mut fresh = 0;
        for cut in sink.drain() {
            let row = cut.to_cut_row(arc_index, model.x_columns());
            if pool.insert(cut) {
                cut_rows.push(row);
                fresh += 1;
            }
        }
        Ok(fresh)
    }

    fn finished(
        &self,
        status: SolveStatus,
        tour: Option<Tour>,
        cost: Option<f64>,
        stats: &Arc<CutStats>,
        root_cut_rounds: u64,
        lazy_rounds: u64,
    ) -> SolveOutcome {
        SolveOutcome {
            status,
            tour,
            cost,
            cut_report: stats.report(),
            total_cuts: stats.total_cuts_added(),
            root_cut_rounds,
            lazy_rounds,
        }
    }
}

/// Decodes the visiting order of a clean integer incumbent.
fn tour_nodes<T: Copy + Ord>(graph: &Graph<T>, snapshot: &SolutionSnapshot) -> Vec<usize> {
    let nodes = graph.num_nodes();
    let mut order = vec![graph.source()];
    let mut current = graph.source();
    while current != graph.sink() && order.len() <= nodes {
        let mut next = None;
        for j in 0..nodes {
            if snapshot.x(current, j) > 0.5 {
                next = Some(j);
                break;
            }
        }
        match next {
            Some(j) => {
                order.push(j);
                current = j;
            }
            None => break,
        }
    }
    order
}
