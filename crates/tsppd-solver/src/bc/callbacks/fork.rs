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

/// Fork inequalities over a hub arc `(h1, h2)`: with predecessor set `L`
/// and successor set `R` such that every window `(l, h1, h2, r)` is
/// infeasible, a tour can realise at most two of {an `L -> h1` arc, the
/// hub arc, an `h2 -> R` arc}:
///
/// `x(L:h1) + x(h1,h2) + x(h2:R) <= 2`.
///
/// Every flow-carrying hub arc is tried; `L` is seeded per in-neighbour
/// and `R` holds the successors incompatible with the whole of `L`.
#[derive(Debug)]
pub struct ForkSeparator<'a, T: Copy + Ord> {
    graph: &'a Graph<T>,
    arc_index: &'a ArcIndex,
    solution: &'a SolutionSnapshot,
    eps: f64,
}

impl<'a, T: LoadNumeric> ForkSeparator<'a, T> {
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

        for h1 in 1..=2 * n {
            for h2 in 1..=2 * n {
                let hub_flow = self.solution.x(h1, h2);
                if h1 == h2 || hub_flow <= self.eps {
                    continue;
                }

                let mut predecessors: Vec<(usize, f64)> = (1..=2 * n)
                    .filter(|&l| l != h1 && l != h2 && self.arc_index.column(l, h1).is_some())
                    .map(|l| (l, self.solution.x(l, h1)))
                    .filter(|&(_, flow)| flow > self.eps)
                    .collect();
                let successors: Vec<(usize, f64)> = (1..=2 * n)
                    .filter(|&r| r != h1 && r != h2 && self.arc_index.column(h2, r).is_some())
                    .map(|r| (r, self.solution.x(h2, r)))
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
                        .filter(|&(r, _)| self.graph.is_subpath_infeasible(&[seed, h1, h2, r]))
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
                            .all(|&(r, _)| self.graph.is_subpath_infeasible(&[l, h1, h2, r]))
                        {
                            l_set.push((l, flow));
                        }
                    }

                    let lhs: f64 = l_set.iter().map(|&(_, f)| f).sum::<f64>()
                        + hub_flow
                        + r_set.iter().map(|&(_, f)| f).sum::<f64>();
                    if lhs > 2.0 + self.eps {
                        let arcs = l_set
                            .iter()
                            .map(|&(l, _)| (l, h1))
                            .chain(std::iter::once((h1, h2)))
                            .chain(r_set.iter().map(|&(r, _)| (h2, r)))
                            .collect();
                        cuts.push(Cut::new(CutFamily::Fork, CutKind::User, arcs, 2.0));
                    }
                }
            }
        }

        Ok(cuts)
    }
}
