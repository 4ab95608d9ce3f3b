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

pub mod err;

use crate::graph::Graph;
use crate::tour::err::TourError;
use num_traits::{CheckedAdd, CheckedSub, Zero};

/// A feasible tour: a Hamiltonian path `0, ..., 2n + 1` over the instance
/// graph respecting arcs, precedence, capacity and draughts. Construction
/// validates; an existing `Tour` is feasible by definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tour {
    nodes: Vec<usize>,
}

impl Tour {
    pub fn new<T>(nodes: Vec<usize>, graph: &Graph<T>) -> Result<Self, TourError>
    where
        T: Copy + Ord + CheckedAdd + CheckedSub + Zero,
    {
        validate(&nodes, graph)?;
        Ok(Self { nodes })
    }

    #[inline]
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consecutive arcs of the tour.
    #[inline]
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes.windows(2).map(|w| (w[0], w[1]))
    }

    /// Total arc cost.
    pub fn cost<T: Copy + Ord>(&self, graph: &Graph<T>) -> f64 {
        self.arcs().map(|(i, j)| graph.cost(i, j)).sum()
    }

    /// Load after leaving each visited node, in visit order. Equals the `y`
    /// value on the arc leaving that node in the load-flow formulation.
    pub fn load_profile<T>(&self, graph: &Graph<T>) -> Vec<T>
    where
        T: Copy + Ord + CheckedAdd + Zero,
    {
        let mut load = T::zero();
        self.nodes
            .iter()
            .map(|&v| {
                load = load
                    .checked_add(&graph.demand(v))
                    .expect("load fits the numeric type; validated at construction");
                load
            })
            .collect()
    }

    pub fn into_nodes(self) -> Vec<usize> {
        self.nodes
    }
}

impl std::fmt::Display for Tour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for v in &self.nodes {
            if !first {
                write!(f, " -> ")?;
            }
            write!(f, "{v}")?;
            first = false;
        }
        Ok(())
    }
}

fn validate<T>(nodes: &[usize], graph: &Graph<T>) -> Result<(), TourError>
where
    T: Copy + Ord + CheckedAdd + CheckedSub + Zero,
{
    let expected = graph.num_nodes();
    if nodes.len() != expected {
        return Err(TourError::WrongLength {
            expected,
            actual: nodes.len(),
        });
    }
    if nodes[0] != graph.source() || nodes[expected - 1] != graph.sink() {
        return Err(TourError::WrongEndpoints);
    }

    let mut position = vec![usize::MAX; expected];
    for (pos, &v) in nodes.iter().enumerate() {
        if v >= expected {
            return Err(TourError::MissingNode { node: v });
        }
        if position[v] != usize::MAX {
            return Err(TourError::RepeatedNode { node: v });
        }
        position[v] = pos;
    }
    if let Some(node) = position.iter().position(|&p| p == usize::MAX) {
        return Err(TourError::MissingNode { node });
    }

    for w in nodes.windows(2) {
        if !graph.is_arc(w[0], w[1]) {
            return Err(TourError::ForbiddenArc {
                from: w[0],
                to: w[1],
            });
        }
    }

    for request in 1..=graph.n() {
        if position[request] > position[graph.n() + request] {
            return Err(TourError::PrecedenceViolated { request });
        }
    }

    let mut load = T::zero();
    for &v in nodes {
        load = load
            .checked_add(&graph.demand(v))
            .ok_or(TourError::CapacityExceeded { node: v })?;
        if load < T::zero() {
            return Err(TourError::NegativeLoad { node: v });
        }
        if load > graph.capacity() {
            return Err(TourError::CapacityExceeded { node: v });
        }
        if load > graph.draught(v) {
            return Err(TourError::DraughtExceeded { node: v });
        }
    }

    Ok(())
}
