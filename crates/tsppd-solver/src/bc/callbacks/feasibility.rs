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
use num_traits::Zero;
use tsppd_model::prelude::{ArcIndex, Graph};

/// Lazy feasibility separation on integer incumbents. The load-flow rows
/// keep the depot path load-feasible, but the base model admits depot-less
/// cycles; those cycles (and, defensively, any load or precedence breach
/// along the depot path) are cut off here.
#[derive(Debug)]
pub struct FeasibilityCutsSeparator;

impl FeasibilityCutsSeparator {
    /// Cuts for one integer solution:
    /// - for each depot-less cycle `V`: the generalised subtour cut
    ///   `x(V:V) <= |V| - 1`, plus for every delivery in `V` without its
    ///   pickup the strengthened companion over `V + {pickup}`;
    /// - for the first capacity, draught or precedence breach on the depot
    ///   path: the infeasible-prefix cut forbidding those arcs together.
    pub fn separate_feasibility_cuts<T: LoadNumeric>(
        graph: &Graph<T>,
        arc_index: &ArcIndex,
        solution: &SolutionSnapshot,
    ) -> Result<Vec<Cut>, SeparatorError> {
        let successors = successors(graph, solution)?;
        let mut cuts = Vec::new();
        let mut visited = vec![false; graph.num_nodes()];

        // Depot path first.
        let path = walk_depot_path(graph, &successors, &mut visited);
        if let Some(prefix_len) = first_violation(graph, &path) {
            let arcs: Vec<(usize, usize)> = path[..=prefix_len]
                .windows(2)
                .map(|w| (w[0], w[1]))
                .collect();
            let rhs = arcs.len() as f64 - 1.0;
            cuts.push(Cut::new(CutFamily::Feasibility, CutKind::Lazy, arcs, rhs));
        }

        // Remaining nodes sit on depot-less cycles.
        for start in 1..=2 * graph.n() {
            if visited[start] {
                continue;
            }
            let mut cycle = Vec::new();
            let mut v = start;
            while !visited[v] {
                visited[v] = true;
                cycle.push(v);
                v = successors[v].ok_or(SeparatorError::MissingSuccessor { node: v })?;
            }

            cuts.push(subtour_cut(graph, arc_index, &cycle));
            for &node in &cycle {
                if graph.is_delivery(node) {
                    let pickup = graph.partner(node);
                    if !cycle.contains(&pickup) {
                        let mut augmented = cycle.clone();
                        augmented.push(pickup);
                        cuts.push(subtour_cut(graph, arc_index, &augmented));
                    }
                }
            }
        }

        Ok(cuts)
    }
}

/// Out-neighbour of every node in the integer solution; `None` only for
/// the sink.
fn successors<T: Copy + Ord>(
    graph: &Graph<T>,
    solution: &SolutionSnapshot,
) -> Result<Vec<Option<usize>>, SeparatorError> {
    let nodes = graph.num_nodes();
    let mut successors = vec![None; nodes];
    for i in 0..nodes {
        if i == graph.sink() {
            continue;
        }
        for j in 0..nodes {
            if solution.x(i, j) > 0.5 {
                successors[i] = Some(j);
                break;
            }
        }
        if successors[i].is_none() {
            return Err(SeparatorError::MissingSuccessor { node: i });
        }
    }
    Ok(successors)
}

fn walk_depot_path<T: Copy + Ord>(
    graph: &Graph<T>,
    successors: &[Option<usize>],
    visited: &mut [bool],
) -> Vec<usize> {
    let mut path = vec![graph.source()];
    visited[graph.source()] = true;
    let mut v = graph.source();
    while v != graph.sink() {
        match successors[v] {
            Some(next) if !visited[next] => {
                visited[next] = true;
                path.push(next);
                v = next;
            }
            _ => break,
        }
    }
    path
}

/// Index of the first node on the depot path where the simulated load
/// leaves `[0, min(Q, draught)]` or a delivery precedes its pickup.
fn first_violation<T: LoadNumeric>(graph: &Graph<T>, path: &[usize]) -> Option<usize> {
    let mut load = T::zero();
    let mut picked = vec![false; graph.num_nodes()];
    for (pos, &v) in path.iter().enumerate() {
        if graph.is_pickup(v) {
            picked[v] = true;
        }
        if graph.is_delivery(v) && !picked[graph.partner(v)] {
            return Some(pos);
        }
        load = match load.checked_add(&graph.demand(v)) {
            Some(l) => l,
            None => return Some(pos),
        };
        if load < T::zero() || load > graph.max_load(v) {
            return Some(pos);
        }
    }
    None
}

fn subtour_cut<T: Copy + Ord>(graph: &Graph<T>, arc_index: &ArcIndex, nodes: &[usize]) -> Cut {
    let mut member = vec![false; graph.num_nodes()];
    for &v in nodes {
        member[v] = true;
    }
    let mut arcs = Vec::new();
    for (_, (i, j)) in arc_index.iter() {
        if member[i] && member[j] {
            arcs.push((i, j));
        }
    }
    Cut::new(
        CutFamily::Feasibility,
        CutKind::Lazy,
        arcs,
        nodes.len() as f64 - 1.0,
    )
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
    fn test_depot_less_cycle_gets_subtour_and_strengthened_cuts() {
        let g = graph();
        let idx = ArcIndex::new(&g);
        // Depot path 0 -> 1 -> 4 -> 5 next to the cycle {2, 3}; delivery 3
        // sits in the cycle while its pickup 1 does not.
        let snap = snapshot(&[
            (0, 1, 1.0),
            (1, 4, 1.0),
            (4, 5, 1.0),
            (2, 3, 1.0),
            (3, 2, 1.0),
        ]);
        let cuts =
            FeasibilityCutsSeparator::separate_feasibility_cuts(&g, &idx, &snap).unwrap();

        // Depot path 0 -> 1 -> 4 -> 5 delivers request 2 without pickup:
        // prefix cut plus the cycle cuts.
        assert!(cuts.len() >= 3);
        let plain = cuts
            .iter()
            .find(|c| c.rhs() == 1.0 && c.arcs() == [(2, 3), (3, 2)])
            .expect("expected plain subtour cut on {2, 3}");
        assert!(!plain.holds_for_arcs(&[(2, 3), (3, 2)]));

        // The strengthened companion covers {1, 2, 3}.
        let strengthened = cuts
            .iter()
            .find(|c| c.rhs() == 2.0 && c.arcs().contains(&(1, 2)))
            .expect("expected strengthened cut on {1, 2, 3}");
        assert!(strengthened.arcs().contains(&(2, 3)));
    }

    #[test]
    fn test_capacity_breach_on_depot_path_gets_prefix_cut() {
        // Q = 5 and both pickups together exceed it.
        let g = Graph::with_pickup_demands(5i64, &[3, 4], costs(6), vec![5; 6]).unwrap();
        let idx = ArcIndex::new(&g);
        let snap = snapshot(&[
            (0, 1, 1.0),
            (1, 2, 1.0),
            (2, 3, 1.0),
            (3, 4, 1.0),
            (4, 5, 1.0),
        ]);
        let cuts =
            FeasibilityCutsSeparator::separate_feasibility_cuts(&g, &idx, &snap).unwrap();
        assert_eq!(cuts.len(), 1);
        let cut = &cuts[0];
        // The violating prefix is 0 -> 1 -> 2; its two arcs cannot both be
        // used.
        assert_eq!(cut.arcs(), &[(0, 1), (1, 2)]);
        assert_eq!(cut.rhs(), 1.0);
        assert!(!cut.holds_for_arcs(&[(0, 1), (1, 2)]));
    }

    #[test]
    fn test_feasible_incumbent_produces_no_cut() {
        let g = graph();
        let idx = ArcIndex::new(&g);
        let snap = snapshot(&[
            (0, 1, 1.0),
            (1, 3, 1.0),
            (3, 2, 1.0),
            (2, 4, 1.0),
            (4, 5, 1.0),
        ]);
        let cuts =
            FeasibilityCutsSeparator::separate_feasibility_cuts(&g, &idx, &snap).unwrap();
        assert!(cuts.is_empty());
    }

    #[test]
    fn test_missing_successor_is_an_invariant_error() {
        let g = graph();
        let idx = ArcIndex::new(&g);
        // Node 1 has no out-arc at all.
        let snap = snapshot(&[(0, 1, 1.0)]);
        let err =
            FeasibilityCutsSeparator::separate_feasibility_cuts(&g, &idx, &snap).unwrap_err();
        assert_eq!(err, SeparatorError::MissingSuccessor { node: 1 });
    }
}
