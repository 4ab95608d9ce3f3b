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

pub mod arcs;
pub mod err;
pub mod loader;

use crate::graph::err::GraphError;
use num_traits::{CheckedAdd, CheckedSub, Zero};

/// The immutable instance graph of a pickup-and-delivery TSP with capacity
/// and draught limits.
///
/// Nodes are `0` (source depot), `1..=n` (pickups), `n+1..=2n` (deliveries,
/// `n + i` pairing with pickup `i`) and `2n + 1` (sink depot). An arc
/// `(i, j)` is allowed iff `cost[i][j] >= 0`; a negative entry encodes a
/// forbidden arc.
#[derive(Debug, Clone)]
pub struct Graph<T: Copy + Ord> {
    n: usize,
    capacity: T,
    cost: Vec<Vec<f64>>,
    demand: Vec<T>,
    draught: Vec<T>,
}

impl<T> Graph<T>
where
    T: Copy + Ord + CheckedAdd + CheckedSub + Zero,
{
    /// Builds a graph from full demand and draught vectors, validating every
    /// instance invariant.
    pub fn new(
        n: usize,
        capacity: T,
        cost: Vec<Vec<f64>>,
        demand: Vec<T>,
        draught: Vec<T>,
    ) -> Result<Self, GraphError> {
        let nodes = 2 * n + 2;
        if cost.len() != nodes {
            return Err(GraphError::CostMatrixDimension {
                expected: nodes,
                actual: cost.len(),
            });
        }
        for (row, r) in cost.iter().enumerate() {
            if r.len() != nodes {
                return Err(GraphError::CostRowDimension {
                    row,
                    expected: nodes,
                    actual: r.len(),
                });
            }
        }
        if demand.len() != nodes {
            return Err(GraphError::VectorDimension {
                what: "demand",
                expected: nodes,
                actual: demand.len(),
            });
        }
        if draught.len() != nodes {
            return Err(GraphError::VectorDimension {
                what: "draught",
                expected: nodes,
                actual: draught.len(),
            });
        }

        let zero = T::zero();
        if demand[0] != zero {
            return Err(GraphError::DepotDemandNonZero { node: 0 });
        }
        if demand[nodes - 1] != zero {
            return Err(GraphError::DepotDemandNonZero { node: nodes - 1 });
        }
        for i in 1..=n {
            if demand[i] <= zero {
                return Err(GraphError::NonPositivePickupDemand { pickup: i });
            }
            if demand[i] > capacity {
                return Err(GraphError::DemandExceedsCapacity { pickup: i });
            }
            let negated = zero
                .checked_sub(&demand[i])
                .ok_or(GraphError::UnpairedDeliveryDemand { request: i })?;
            if demand[n + i] != negated {
                return Err(GraphError::UnpairedDeliveryDemand { request: i });
            }
        }
        for i in 0..nodes {
            let visited_load = if demand[i] > zero { demand[i] } else { zero };
            if draught[i] < visited_load {
                return Err(GraphError::DraughtBelowDemand { node: i });
            }
        }

        for i in 0..nodes {
            if cost[i][i] >= 0.0 {
                return Err(GraphError::SelfArcAllowed { node: i });
            }
        }
        for i in 0..nodes {
            if cost[i][0] >= 0.0 {
                return Err(GraphError::ArcIntoSource { from: i });
            }
            if cost[nodes - 1][i] >= 0.0 {
                return Err(GraphError::ArcOutOfSink { to: i });
            }
        }

        Ok(Self {
            n,
            capacity,
            cost,
            demand,
            draught,
        })
    }

    /// Convenience constructor taking only the pickup demands; delivery
    /// demands are mirrored and depot demands are zero.
    pub fn with_pickup_demands(
        capacity: T,
        pickup_demands: &[T],
        cost: Vec<Vec<f64>>,
        draught: Vec<T>,
    ) -> Result<Self, GraphError> {
        let n = pickup_demands.len();
        let mut demand = vec![T::zero(); 2 * n + 2];
        for (i, &q) in pickup_demands.iter().enumerate() {
            demand[1 + i] = q;
            demand[n + 1 + i] = T::zero()
                .checked_sub(&q)
                .ok_or(GraphError::UnpairedDeliveryDemand { request: i + 1 })?;
        }
        Self::new(n, capacity, cost, demand, draught)
    }
}

impl<T: Copy + Ord> Graph<T> {
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn capacity(&self) -> T {
        self.capacity
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        2 * self.n + 2
    }

    #[inline]
    pub fn source(&self) -> usize {
        0
    }

    #[inline]
    pub fn sink(&self) -> usize {
        2 * self.n + 1
    }

    #[inline]
    pub fn cost(&self, i: usize, j: usize) -> f64 {
        self.cost[i][j]
    }

    #[inline]
    pub fn demand(&self, i: usize) -> T {
        self.demand[i]
    }

    #[inline]
    pub fn draught(&self, i: usize) -> T {
        self.draught[i]
    }

    /// Whether the arc `(i, j)` is allowed.
    #[inline]
    pub fn is_arc(&self, i: usize, j: usize) -> bool {
        self.cost[i][j] >= 0.0
    }

    #[inline]
    pub fn is_pickup(&self, i: usize) -> bool {
        i >= 1 && i <= self.n
    }

    #[inline]
    pub fn is_delivery(&self, i: usize) -> bool {
        i > self.n && i <= 2 * self.n
    }

    /// Delivery of a pickup or pickup of a delivery.
    ///
    /// # Panics
    /// Panics when called on a depot node.
    #[inline]
    pub fn partner(&self, i: usize) -> usize {
        if self.is_pickup(i) {
            i + self.n
        } else if self.is_delivery(i) {
            i - self.n
        } else {
            panic!("depot node {i} has no partner")
        }
    }

    /// The load ceiling while visiting `i`: `min(capacity, draught(i))`.
    #[inline]
    pub fn max_load(&self, i: usize) -> T {
        self.capacity.min(self.draught[i])
    }
}

impl<T> Graph<T>
where
    T: Copy + Ord + CheckedAdd + CheckedSub + Zero,
{
    /// Conservative subpath infeasibility: true only when no feasible tour
    /// can visit `nodes` consecutively in this order.
    ///
    /// Checked conditions: repeated nodes, depots in interior positions, a
    /// delivery followed by its own pickup inside the window, and the load
    /// interval propagated along the window (items delivered inside the
    /// window without their in-window pickup must already be aboard on
    /// entry; the running load must stay within `[0, min(Q, draught)]` at
    /// every visited node).
    pub fn is_subpath_infeasible(&self, nodes: &[usize]) -> bool {
        if nodes.len() < 2 {
            return false;
        }

        let mut seen = vec![false; self.num_nodes()];
        for &v in nodes {
            if seen[v] {
                return true;
            }
            seen[v] = true;
        }

        for (pos, &v) in nodes.iter().enumerate() {
            if v == self.source() && pos != 0 {
                return true;
            }
            if v == self.sink() && pos != nodes.len() - 1 {
                return true;
            }
        }

        // A delivery whose pickup shows up later in the window can never be
        // completed in order.
        for (pos, &v) in nodes.iter().enumerate() {
            if self.is_delivery(v) {
                let pickup = self.partner(v);
                if nodes[pos + 1..].contains(&pickup) {
                    return true;
                }
            }
        }

        // Items delivered inside the window but picked up outside of it are
        // aboard when the window is entered.
        let zero = T::zero();
        let mut entry_required = zero;
        for (pos, &v) in nodes.iter().enumerate() {
            if self.is_delivery(v) && !nodes[..pos].contains(&self.partner(v)) {
                entry_required = match entry_required.checked_add(&self.demand(self.partner(v))) {
                    Some(s) => s,
                    None => return false,
                };
            }
        }

        // Feasible entering loads form an interval; the window is infeasible
        // iff that interval is empty.
        let mut lower = entry_required;
        let mut upper: Option<T> = None;
        let mut running = zero;
        for &v in nodes {
            running = match running.checked_add(&self.demand(v)) {
                Some(s) => s,
                None => return false,
            };
            if let Some(from_below) = zero.checked_sub(&running) {
                lower = lower.max(from_below);
            }
            if let Some(from_above) = self.max_load(v).checked_sub(&running) {
                upper = Some(match upper {
                    Some(u) => u.min(from_above),
                    None => from_above,
                });
            }
        }
        if nodes[0] == self.source() {
            // The vehicle leaves the depot empty.
            if lower > zero {
                return true;
            }
            return matches!(upper, Some(u) if u < zero);
        }
        matches!(upper, Some(u) if lower > u)
    }

    /// Whether the consecutive subpath `i -> j -> k` can appear in no
    /// feasible tour. Feeds the a-priori subpath elimination rows and the
    /// fork separators.
    #[inline]
    pub fn is_path_eliminable(&self, i: usize, j: usize, k: usize) -> bool {
        self.is_subpath_infeasible(&[i, j, k])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Complete cost matrix over `nodes` nodes with unit costs, forbidding
    /// self arcs, arcs into the source and arcs out of the sink.
    fn unit_costs(nodes: usize) -> Vec<Vec<f64>> {
        let mut c = vec![vec![1.0; nodes]; nodes];
        for i in 0..nodes {
            c[i][i] = -1.0;
            c[i][0] = -1.0;
            c[nodes - 1][i] = -1.0;
        }
        c
    }

    fn small_graph() -> Graph<i64> {
        // n = 2, Q = 5, q = [3, 4], unconstraining draughts.
        Graph::with_pickup_demands(5, &[3, 4], unit_costs(6), vec![5; 6]).unwrap()
    }

    #[test]
    fn test_valid_graph_roundtrips_accessors() {
        let g = small_graph();
        assert_eq!(g.n(), 2);
        assert_eq!(g.num_nodes(), 6);
        assert_eq!(g.source(), 0);
        assert_eq!(g.sink(), 5);
        assert_eq!(g.demand(1), 3);
        assert_eq!(g.demand(3), -3);
        assert_eq!(g.demand(4), -4);
        assert!(g.is_pickup(2));
        assert!(g.is_delivery(3));
        assert_eq!(g.partner(1), 3);
        assert_eq!(g.partner(4), 2);
        assert!(g.is_arc(1, 3));
        assert!(!g.is_arc(3, 0));
    }

    #[test]
    fn test_rejects_unpaired_delivery_demand() {
        let mut demand = vec![0, 3, 4, -3, -5, 0];
        let err = Graph::new(2, 5i64, unit_costs(6), demand.clone(), vec![5; 6]).unwrap_err();
        assert_eq!(err, GraphError::UnpairedDeliveryDemand { request: 2 });
        demand[4] = -4;
        assert!(Graph::new(2, 5i64, unit_costs(6), demand, vec![5; 6]).is_ok());
    }

    #[test]
    fn test_rejects_demand_above_capacity() {
        let err = Graph::with_pickup_demands(3i64, &[4], unit_costs(4), vec![4; 4]).unwrap_err();
        assert_eq!(err, GraphError::DemandExceedsCapacity { pickup: 1 });
    }

    #[test]
    fn test_rejects_draught_below_pickup_demand() {
        let mut draught = vec![5i64; 6];
        draught[2] = 3;
        let err = Graph::with_pickup_demands(5, &[3, 4], unit_costs(6), draught).unwrap_err();
        assert_eq!(err, GraphError::DraughtBelowDemand { node: 2 });
    }

    #[test]
    fn test_rejects_self_arc_and_depot_arcs() {
        let mut c = unit_costs(6);
        c[1][1] = 0.0;
        let err = Graph::with_pickup_demands(5i64, &[3, 4], c, vec![5; 6]).unwrap_err();
        assert_eq!(err, GraphError::SelfArcAllowed { node: 1 });

        let mut c = unit_costs(6);
        c[2][0] = 7.0;
        let err = Graph::with_pickup_demands(5i64, &[3, 4], c, vec![5; 6]).unwrap_err();
        assert_eq!(err, GraphError::ArcIntoSource { from: 2 });

        let mut c = unit_costs(6);
        c[5][2] = 7.0;
        let err = Graph::with_pickup_demands(5i64, &[3, 4], c, vec![5; 6]).unwrap_err();
        assert_eq!(err, GraphError::ArcOutOfSink { to: 2 });
    }

    #[test]
    fn test_subpath_with_delivery_before_its_pickup_is_eliminable() {
        let g = small_graph();
        // Delivery 3 followed by its pickup 1.
        assert!(g.is_path_eliminable(3, 1, 2));
        assert!(g.is_subpath_infeasible(&[4, 3, 2]));
        // Pickup then its delivery is fine.
        assert!(!g.is_path_eliminable(1, 3, 2));
    }

    #[test]
    fn test_subpath_exceeding_capacity_is_eliminable() {
        let g = small_graph();
        // Both pickups aboard: 3 + 4 > Q = 5.
        assert!(g.is_path_eliminable(1, 2, 3));
        // Drop request 1 before picking up 2.
        assert!(!g.is_subpath_infeasible(&[1, 3, 2]));
    }

    #[test]
    fn test_subpath_exceeding_draught_is_eliminable() {
        // Draught 3 at pickup 2: leaving node 2 with request 1's 2 units
        // still aboard means a load of 5 > 3.
        let mut draught = vec![9i64; 6];
        draught[2] = 3;
        let g = Graph::with_pickup_demands(9, &[2, 3], unit_costs(6), draught).unwrap();
        assert!(g.is_subpath_infeasible(&[1, 2]));
        // Visiting node 2 with nothing aboard fits the draught.
        assert!(!g.is_subpath_infeasible(&[2, 4, 1]));
    }

    #[test]
    fn test_subpath_from_source_requires_empty_start() {
        let g = small_graph();
        // Starting at the depot with an unmatched delivery first cannot
        // happen; the item would have to be aboard already.
        assert!(g.is_subpath_infeasible(&[0, 3, 1]));
        assert!(!g.is_subpath_infeasible(&[0, 1, 3]));
    }

    #[test]
    fn test_subpath_with_repeated_node_is_eliminable() {
        let g = small_graph();
        assert!(g.is_subpath_infeasible(&[1, 2, 1]));
    }
}
