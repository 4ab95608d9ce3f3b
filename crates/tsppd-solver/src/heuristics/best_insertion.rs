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

use crate::core::numeric::LoadNumeric;
use num_traits::Zero;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tsppd_model::prelude::{Graph, Tour};

/// No insertion order produced a feasible tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoFeasibleTourError {
    request: usize,
}

impl NoFeasibleTourError {
    pub fn request(&self) -> usize {
        self.request
    }
}

impl std::fmt::Display for NoFeasibleTourError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "best insertion found no feasible position for request {}",
            self.request
        )
    }
}

impl std::error::Error for NoFeasibleTourError {}

/// Cheapest-insertion construction: requests are inserted one at a time at
/// the pickup/delivery position pair with the smallest cost increase that
/// keeps the partial tour feasible. A seeded multi-start shuffles the
/// insertion order and keeps the cheapest completed tour.
#[derive(Debug)]
pub struct BestInsertionHeuristic<'a, T: Copy + Ord> {
    graph: &'a Graph<T>,
    restarts: usize,
    seed: u64,
}

impl<'a, T: LoadNumeric> BestInsertionHeuristic<'a, T> {
    pub fn new(graph: &'a Graph<T>) -> Self {
        Self {
            graph,
            restarts: 8,
            seed: 0,
        }
    }

    #[inline]
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts.max(1);
        self
    }

    #[inline]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn solve(&self) -> Result<Tour, NoFeasibleTourError> {
        let n = self.graph.n();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        // First pass inserts big demands first; the restarts shuffle.
        let mut order: Vec<usize> = (1..=n).collect();
        order.sort_by_key(|&r| std::cmp::Reverse(self.graph.demand(r)));

        let mut best: Option<(f64, Tour)> = None;
        let mut last_failure = NoFeasibleTourError { request: 0 };

        for restart in 0..self.restarts {
            if restart > 0 {
                order.shuffle(&mut rng);
            }
            match self.construct(&order) {
                Ok(tour) => {
                    let cost = tour.cost(self.graph);
                    if best.as_ref().map_or(true, |(c, _)| cost < *c) {
                        best = Some((cost, tour));
                    }
                }
                Err(e) => last_failure = e,
            }
        }

        match best {
            Some((cost, tour)) => {
                tracing::debug!(cost, "best insertion finished");
                Ok(tour)
            }
            None => Err(last_failure),
        }
    }

    fn construct(&self, order: &[usize]) -> Result<Tour, NoFeasibleTourError> {
        let g = self.graph;
        let mut nodes = vec![g.source(), g.sink()];

        for &request in order {
            let pickup = request;
            let delivery = g.partner(request);
            let mut best: Option<(f64, usize, usize)> = None;

            // Pickup goes to position p, delivery to position d with
            // p <= d, both measured in the tour before insertion.
            for p in 1..nodes.len() {
                for d in p..nodes.len() {
                    let mut candidate = nodes.clone();
                    candidate.insert(p, pickup);
                    candidate.insert(d + 1, delivery);
                    if !self.is_partial_feasible(&candidate) {
                        continue;
                    }
                    let delta = self.sequence_cost(&candidate) - self.sequence_cost(&nodes);
                    if best.as_ref().map_or(true, |(c, _, _)| delta < *c) {
                        best = Some((delta, p, d));
                    }
                }
            }

            match best {
                Some((_, p, d)) => {
                    nodes.insert(p, pickup);
                    nodes.insert(d + 1, delivery);
                }
                None => return Err(NoFeasibleTourError { request }),
            }
        }

        Ok(Tour::new(nodes, g).expect("constructed sequence passes the same checks as Tour"))
    }

    /// Arc existence plus the load envelope; precedence holds by
    /// construction.
    fn is_partial_feasible(&self, nodes: &[usize]) -> bool {
        let g = self.graph;
        for w in nodes.windows(2) {
            if !g.is_arc(w[0], w[1]) {
                return false;
            }
        }
        let mut load = T::zero();
        for &v in nodes {
            load = match load.checked_add(&g.demand(v)) {
                Some(l) => l,
                None => return false,
            };
            if load < T::zero() || load > g.max_load(v) {
                return false;
            }
        }
        true
    }

    fn sequence_cost(&self, nodes: &[usize]) -> f64 {
        nodes
            .windows(2)
            .map(|w| self.graph.cost(w[0], w[1]))
            .sum()
    }
}
