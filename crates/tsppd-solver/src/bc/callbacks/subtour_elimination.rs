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

use crate::bc::callbacks::solution::{BestNode, SolutionSnapshot};
use crate::bc::cut::{Cut, CutFamily, CutKind};
use crate::bc::err::SeparatorError;
use fixedbitset::FixedBitSet;
use tsppd_model::prelude::{ArcIndex, Graph};

/// Shrink-style heuristic separation of subtour elimination inequalities
/// `x(S:S) <= |S| - 1` on fractional points: starting from every non-depot
/// seed, repeatedly absorb the node with the largest in-plus-out fractional
/// flow to `S` and report each violated intermediate set.
#[derive(Debug)]
pub struct SubtourEliminationSeparator<'a, T: Copy + Ord> {
    graph: &'a Graph<T>,
    arc_index: &'a ArcIndex,
    solution: &'a SolutionSnapshot,
    eps: f64,
    s: Vec<usize>,
    in_s: FixedBitSet,
}

impl<'a, T: Copy + Ord> SubtourEliminationSeparator<'a, T> {
    pub fn new(
        graph: &'a Graph<T>,
        arc_index: &'a ArcIndex,
        solution: &'a SolutionSnapshot,
        eps: f64,
    ) -> Self {
        let nodes = graph.num_nodes();
        Self {
            graph,
            arc_index,
            solution,
            eps,
            s: Vec::with_capacity(nodes),
            in_s: FixedBitSet::with_capacity(nodes),
        }
    }

    pub fn separate_valid_cuts(&mut self) -> Result<Vec<Cut>, SeparatorError> {
        let n = self.graph.n();
        let mut cuts = Vec::new();

        for seed in 1..=2 * n {
            self.s.clear();
            self.in_s.clear();
            self.s.push(seed);
            self.in_s.insert(seed);
            let mut inner = 0.0;

            while let Some(best) = self.best_node_for_s() {
                // Flow within S grows by exactly the candidate's flow.
                inner += best.flow;
                self.s.push(best.node);
                self.in_s.insert(best.node);

                if inner > self.s.len() as f64 - 1.0 + self.eps {
                    cuts.push(self.build_cut());
                }
            }
        }

        Ok(cuts)
    }

    /// Node of `{1..2n} \ S` with the largest fractional flow to `S`.
    fn best_node_for_s(&self) -> Option<BestNode> {
        let mut best: Option<BestNode> = None;
        for v in 1..=2 * self.graph.n() {
            if self.in_s.contains(v) {
                continue;
            }
            let flow: f64 = self
                .s
                .iter()
                .map(|&s| self.solution.x(s, v) + self.solution.x(v, s))
                .sum();
            if flow > best.map_or(0.0, |b| b.flow) + self.eps {
                best = Some(BestNode::new(v, flow));
            }
        }
        best
    }

    fn build_cut(&self) -> Cut {
        let mut arcs = Vec::new();
        for (_, (i, j)) in self.arc_index.iter() {
            if self.in_s.contains(i) && self.in_s.contains(j) {
                arcs.push((i, j));
            }
        }
        Cut::new(
            CutFamily::SubtourElimination,
            CutKind::User,
            arcs,
            self.s.len() as f64 - 1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
        Graph::with_pickup_demands(10, &[2, 3], costs(6), vec![10; 6]).unwrap()
    }

    fn snapshot(entries: &[(usize, usize, f64)]) -> SolutionSnapshot {
        let mut x = vec![vec![0.0; 6]; 6];
        for &(i, j, v) in entries {
            x[i][j] = v;
        }
        SolutionSnapshot::from_dense(x, 1e-6)
    }

    #[test]
    fn test_two_cycle_subtour_is_separated() {
        let g = graph();
        let idx = ArcIndex::new(&g);
        // Fractional two-node circulation on {1, 3}.
        let snap = snapshot(&[
            (0, 2, 1.0),
            (2, 4, 1.0),
            (4, 5, 1.0),
            (1, 3, 1.0),
            (3, 1, 1.0),
        ]);
        let cuts = SubtourEliminationSeparator::new(&g, &idx, &snap, 1e-6)
            .separate_valid_cuts()
            .unwrap();
        assert!(!cuts.is_empty());
        let on_pair = cuts
            .iter()
            .find(|c| c.arcs() == [(1, 3), (3, 1)])
            .expect("expected the {1, n+1} subtour cut");
        assert_eq!(on_pair.rhs(), 1.0);
        assert!(on_pair.activity(&snap) > on_pair.rhs() + 1e-6);
    }

    #[test]
    fn test_tour_without_subtours_produces_no_cut() {
        let g = graph();
        let idx = ArcIndex::new(&g);
        let snap = snapshot(&[
            (0, 1, 1.0),
            (1, 3, 1.0),
            (3, 2, 1.0),
            (2, 4, 1.0),
            (4, 5, 1.0),
        ]);
        let cuts = SubtourEliminationSeparator::new(&g, &idx, &snap, 1e-6)
            .separate_valid_cuts()
            .unwrap();
        assert!(cuts.is_empty());
    }

    #[test]
    fn test_fractional_three_node_subtour_is_separated() {
        let g = graph();
        let idx = ArcIndex::new(&g);
        // Each arc of the triangle {1, 2, 3} at 0.9: x(S:S) = 2.7 > 2.
        let snap = snapshot(&[
            (1, 2, 0.9),
            (2, 3, 0.9),
            (3, 1, 0.9),
            (0, 4, 1.0),
            (4, 5, 1.0),
        ]);
        let cuts = SubtourEliminationSeparator::new(&g, &idx, &snap, 1e-6)
            .separate_valid_cuts()
            .unwrap();
        let triangle = cuts
            .iter()
            .find(|c| c.rhs() == 2.0 && c.arcs().len() == 6)
            .expect("expected a three-node subtour cut");
        assert!(triangle.activity(&snap) > 2.0 + 1e-6);
    }
}
