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

use crate::bc::callbacks::capacity::CapacitySeparator;
use crate::bc::callbacks::feasibility::FeasibilityCutsSeparator;
use crate::bc::callbacks::fork::ForkSeparator;
use crate::bc::callbacks::generalised_order::GeneralisedOrderSeparator;
use crate::bc::callbacks::simplified_fork::SimplifiedForkSeparator;
use crate::bc::callbacks::solution::SolutionSnapshot;
use crate::bc::callbacks::subtour_elimination::SubtourEliminationSeparator;
use crate::bc::cut::{Cut, CutFamily};
use crate::bc::err::SeparatorError;
use crate::bc::params::BranchAndCutParams;
use crate::bc::stats::CutStats;
use crate::core::numeric::LoadNumeric;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tsppd_model::prelude::{ArcIndex, Graph};

/// Receives cuts discovered during one callback invocation. Implementations
/// must be thread-safe: user-cut families are separated concurrently.
pub trait CutSink: Sync {
    fn add_cut(&self, cut: Cut);
}

/// The engine-facing callback interface: one method per tree node.
pub trait NodeCallback {
    fn on_node(
        &self,
        node_number: u64,
        solution: &SolutionSnapshot,
        sink: &dyn CutSink,
    ) -> Result<(), SeparatorError>;
}

/// Orchestrates the separators: the lazy feasibility pass on integer
/// solutions, then every enabled user-cut family whose stride divides the
/// node number. Families run independently; the statistics collector is
/// the only shared mutable state.
#[derive(Debug)]
pub struct CutsCallback<'a, T: Copy + Ord> {
    graph: &'a Graph<T>,
    arc_index: &'a ArcIndex,
    params: &'a BranchAndCutParams,
    stats: Arc<CutStats>,
}

impl<'a, T: LoadNumeric> CutsCallback<'a, T> {
    pub fn new(
        graph: &'a Graph<T>,
        arc_index: &'a ArcIndex,
        params: &'a BranchAndCutParams,
        stats: Arc<CutStats>,
    ) -> Self {
        Self {
            graph,
            arc_index,
            params,
            stats,
        }
    }

    #[inline]
    pub fn stats(&self) -> &Arc<CutStats> {
        &self.stats
    }

    /// User-cut families scheduled at this node number.
    fn scheduled_families(&self, node_number: u64) -> Vec<CutFamily> {
        [
            (CutFamily::SubtourElimination, &self.params.subtour_elim),
            (CutFamily::GeneralisedOrder, &self.params.generalised_order),
            (CutFamily::Capacity, &self.params.capacity),
            (CutFamily::SimplifiedFork, &self.params.simplified_fork),
            (CutFamily::Fork, &self.params.fork),
        ]
        .into_iter()
        .filter(|(_, p)| p.applies_at(node_number))
        .map(|(f, _)| f)
        .collect()
    }

    fn separate_family(
        &self,
        family: CutFamily,
        solution: &SolutionSnapshot,
    ) -> Result<Vec<Cut>, SeparatorError> {
        let eps = self.params.eps;
        match family {
            CutFamily::SubtourElimination => {
                SubtourEliminationSeparator::new(self.graph, self.arc_index, solution, eps)
                    .separate_valid_cuts()
            }
            CutFamily::GeneralisedOrder => {
                GeneralisedOrderSeparator::new(self.graph, self.arc_index, solution, eps)
                    .separate_valid_cuts()
            }
            CutFamily::Capacity => {
                CapacitySeparator::new(self.graph, self.arc_index, solution, eps)
                    .separate_valid_cuts()
            }
            CutFamily::SimplifiedFork => {
                SimplifiedForkSeparator::new(self.graph, self.arc_index, solution, eps)
                    .separate_valid_cuts()
            }
            CutFamily::Fork => {
                ForkSeparator::new(self.graph, self.arc_index, solution, eps).separate_valid_cuts()
            }
            CutFamily::Feasibility => FeasibilityCutsSeparator::separate_feasibility_cuts(
                self.graph,
                self.arc_index,
                solution,
            ),
        }
    }
}

impl<'a, T: LoadNumeric> NodeCallback for CutsCallback<'a, T> {
    fn on_node(
        &self,
        node_number: u64,
        solution: &SolutionSnapshot,
        sink: &dyn CutSink,
    ) -> Result<(), SeparatorError> {
        if solution.is_integer() {
            let start = Instant::now();
            let cuts = self.separate_family(CutFamily::Feasibility, solution)?;
            self.stats
                .record_separation(CutFamily::Feasibility, cuts.len() as u64, start.elapsed());
            if !cuts.is_empty() {
                tracing::debug!(node = node_number, count = cuts.len(), "adding feasibility cuts");
            }
            for cut in cuts {
                sink.add_cut(cut);
            }
        }

        let families = self.scheduled_families(node_number);
        let separated: Result<Vec<_>, SeparatorError> = families
            .into_par_iter()
            .map(|family| {
                let start = Instant::now();
                let cuts = self.separate_family(family, solution)?;
                Ok((family, cuts, start.elapsed()))
            })
            .collect();

        for (family, cuts, elapsed) in separated? {
            self.stats
                .record_separation(family, cuts.len() as u64, elapsed);
            if !cuts.is_empty() {
                tracing::debug!(
                    node = node_number,
                    family = %family,
                    count = cuts.len(),
                    "adding user cuts"
                );
            }
            for cut in cuts {
                sink.add_cut(cut);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bc::cut::CutKind;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct VecSink {
        cuts: Mutex<Vec<Cut>>,
    }

    impl CutSink for VecSink {
        fn add_cut(&self, cut: Cut) {
            self.cuts.lock().push(cut);
        }
    }

    fn costs(nodes: usize) -> Vec<Vec<f64>> {
        let mut c = vec![vec![1.0; nodes]; nodes];
        for i in 0..nodes {
            c[i][i] = -1.0;
            c[i][0] = -1.0;
            c[nodes - 1][i] = -1.0;
        }
        c
    }

    fn graph() -> Graph<i64> {
        Graph::with_pickup_demands(5, &[3, 4], costs(6), vec![5; 6]).unwrap()
    }

    fn snapshot(entries: &[(usize, usize, f64)]) -> SolutionSnapshot {
        let mut x = vec![vec![0.0; 6]; 6];
        for &(i, j, v) in entries {
            x[i][j] = v;
        }
        SolutionSnapshot::from_dense(x, 1e-6)
    }

    #[test]
    fn test_integer_solution_runs_feasibility_and_updates_stats() {
        let g = graph();
        let idx = ArcIndex::new(&g);
        let params = BranchAndCutParams::default();
        let stats = Arc::new(CutStats::new());
        let callback = CutsCallback::new(&g, &idx, &params, Arc::clone(&stats));

        // Integer incumbent with a depot-less cycle on {1, 3}.
        let snap = snapshot(&[
            (0, 2, 1.0),
            (2, 4, 1.0),
            (4, 5, 1.0),
            (1, 3, 1.0),
            (3, 1, 1.0),
        ]);
        assert!(snap.is_integer());
        let sink = VecSink::default();
        callback.on_node(0, &snap, &sink).unwrap();

        let cuts = sink.cuts.lock();
        assert!(cuts
            .iter()
            .any(|c| c.family() == CutFamily::Feasibility && c.kind() == CutKind::Lazy));
        assert!(stats.family(CutFamily::Feasibility).cuts_added() >= 1);
    }

    #[test]
    fn test_stride_gates_user_families() {
        let g = graph();
        let idx = ArcIndex::new(&g);
        let mut params = BranchAndCutParams::default();
        params.subtour_elim.cut_every_n_nodes = 2;
        params.generalised_order.enabled = false;
        params.capacity.enabled = false;
        params.fork.enabled = false;
        params.simplified_fork.enabled = false;
        let stats = Arc::new(CutStats::new());
        let callback = CutsCallback::new(&g, &idx, &params, Arc::clone(&stats));

        // Fractional two-node circulation that subtour elimination cuts.
        let snap = snapshot(&[(1, 3, 0.9), (3, 1, 0.9)]);
        let sink = VecSink::default();

        // Node 1 is skipped by the stride...
        callback.on_node(1, &snap, &sink).unwrap();
        assert_eq!(stats.family(CutFamily::SubtourElimination).cuts_added(), 0);
        assert!(sink.cuts.lock().is_empty());

        // ...node 2 runs.
        callback.on_node(2, &snap, &sink).unwrap();
        assert!(stats.family(CutFamily::SubtourElimination).cuts_added() >= 1);
        assert!(!sink.cuts.lock().is_empty());
    }

    #[test]
    fn test_disabled_families_never_run() {
        let g = graph();
        let idx = ArcIndex::new(&g);
        let mut params = BranchAndCutParams::default();
        params.subtour_elim = crate::bc::params::CutFamilyParams::disabled();
        params.generalised_order = crate::bc::params::CutFamilyParams::disabled();
        params.capacity = crate::bc::params::CutFamilyParams::disabled();
        params.fork = crate::bc::params::CutFamilyParams::disabled();
        params.simplified_fork = crate::bc::params::CutFamilyParams::disabled();
        let stats = Arc::new(CutStats::new());
        let callback = CutsCallback::new(&g, &idx, &params, Arc::clone(&stats));

        let snap = snapshot(&[(1, 3, 0.9), (3, 1, 0.9)]);
        let sink = VecSink::default();
        callback.on_node(0, &snap, &sink).unwrap();
        assert!(sink.cuts.lock().is_empty());
        assert_eq!(stats.total_cuts_added(), 0);
    }
}
