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

use crate::bc::callbacks::solution::SolutionSnapshot;
use crate::bc::cut::{Cut, CutFamily, CutKind};
use crate::bc::err::SeparatorError;
use crate::core::numeric::LoadNumeric;
use tsppd_model::prelude::{ArcIndex, Graph};

/// Simplified fork inequalities around a single hub node `h`: for
/// predecessor and successor sets `L`, `R` such that every consecutive
/// window `(l, h, r)` is infeasible, a tour can use an arc of `L -> h` or
/// an arc of `h -> R`, never both:
///
/// `x(L:h) + x(h:R) <= 1`.
///
/// For each hub, every in-neighbour with positive flow seeds `L`; `R`
/// collects the flow-carrying successors incompatible with the seed and
/// `L` then grows by decreasing flow among predecessors incompatible with
/// all of `R`.
#[derive(Debug)]
pub struct SimplifiedForkSeparator<'a, T: Copy + Ord> {
    graph: &'a Graph<T>,
    arc_index: &'a ArcIndex,
    solution: &'a SolutionSnapshot,
    eps: f64,
}

impl<'a, T: LoadNumeric> SimplifiedForkSeparator<'a, T> {
    pub fn new(
        graph: &'a Graph<T>,
        arc_index: &'a ArcIndex,
        solution: &'a SolutionSnapshot,
        eps: f64,
    ) -> Self {
        Self {
            graph,
            arc_index,
            solution,
            eps,
        }
    }

    pub fn separate_valid_cuts(&self) -> Result<Vec<Cut>, SeparatorError> {
        let n = self.graph.n();
        let mut cuts = Vec::new();

        for hub in 1..=2 * n {
            let mut predecessors: Vec<(usize, f64)> = (1..=2 * n)
                .filter(|&l| l != hub && self.arc_index.column(l, hub).is_some())
                .map(|l| (l, self.solution.x(l, hub)))
                .filter(|&(_, flow)| flow > self.eps)
                .collect();
            let successors: Vec<(usize, f64)> = (1..=2 * n)
                .filter(|&r| r != hub && self.arc_index.column(hub, r).is_some())
                .map(|r| (r, self.solution.x(hub, r)))
                .filter(|&(_, flow)| flow > self.eps)
                .collect();
            if predecessors.is_empty() || successors.is_empty() {
                continue;
            }
            predecessors.sort_by(|a, b| b.1.total_cmp(&a.1));

            for seed_index in 0..predecessors.len() {
                let (seed, _) = predecessors[seed_index];
                let r_set: Vec<(usize, f64)> = successors
                    .iter()
                    .copied()
                    .filter(|&(r, _)| self.graph.is_path_eliminable(seed, hub, r))
                    .collect();
                if r_set.is_empty() {
                    continue;
                }

                let mut l_set = vec![(seed, predecessors[seed_index].1)];
                for &(l, flow) in &predecessors {
                    if l == seed {
                        continue;
                    }
                    if r_set
                        .iter()
                        .all(|&(r, _)| self.graph.is_path_eliminable(l, hub, r))
                    {
                        l_set.push((l, flow));
                    }
                }

                let lhs: f64 = l_set.iter().map(|&(_, f)| f).sum::<f64>()
                    + r_set.iter().map(|&(_, f)| f).sum::<f64>();
                if lhs > 1.0 + self.eps {
                    let arcs = l_set
                        .iter()
                        .map(|&(l, _)| (l, hub))
                        .chain(r_set.iter().map(|&(r, _)| (hub, r)))
                        .collect();
                    cuts.push(Cut::new(CutFamily::SimplifiedFork, CutKind::User, arcs, 1.0));
                }
            }
        }

        Ok(cuts)
    }
}
