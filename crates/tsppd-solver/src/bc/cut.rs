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
use crate::mip::model::{ColumnId, CutRow};
use std::collections::HashSet;
use tsppd_model::prelude::ArcIndex;

/// The separation families of the solver; one statistics bucket each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CutFamily {
    Feasibility,
    SubtourElimination,
    GeneralisedOrder,
    Capacity,
    Fork,
    SimplifiedFork,
}

impl CutFamily {
    pub const ALL: [CutFamily; 6] = [
        CutFamily::Feasibility,
        CutFamily::SubtourElimination,
        CutFamily::GeneralisedOrder,
        CutFamily::Capacity,
        CutFamily::Fork,
        CutFamily::SimplifiedFork,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CutFamily::Feasibility => "feasibility",
            CutFamily::SubtourElimination => "subtour_elimination",
            CutFamily::GeneralisedOrder => "generalised_order",
            CutFamily::Capacity => "capacity",
            CutFamily::Fork => "fork",
            CutFamily::SimplifiedFork => "simplified_fork",
        }
    }

    #[inline]
    pub(crate) fn bucket(self) -> usize {
        match self {
            CutFamily::Feasibility => 0,
            CutFamily::SubtourElimination => 1,
            CutFamily::GeneralisedOrder => 2,
            CutFamily::Capacity => 3,
            CutFamily::Fork => 4,
            CutFamily::SimplifiedFork => 5,
        }
    }
}

impl std::fmt::Display for CutFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How the engine should treat the inequality. User cuts tighten the
/// relaxation; lazy cuts restore feasibility constraints missing from the
/// base model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CutKind {
    User,
    Lazy,
}

/// A unit-coefficient inequality `sum of x over arcs <= rhs`. Arc lists
/// contain allowed arcs only; separators build them by walking the arc
/// index.
#[derive(Debug, Clone, PartialEq)]
pub struct Cut {
    family: CutFamily,
    kind: CutKind,
    arcs: Vec<(usize, usize)>,
    rhs: f64,
}

impl Cut {
    pub fn new(family: CutFamily, kind: CutKind, mut arcs: Vec<(usize, usize)>, rhs: f64) -> Self {
        arcs.sort_unstable();
        arcs.dedup();
        Self {
            family,
            kind,
            arcs,
            rhs,
        }
    }

    #[inline]
    pub fn family(&self) -> CutFamily {
        self.family
    }

    #[inline]
    pub fn kind(&self) -> CutKind {
        self.kind
    }

    #[inline]
    pub fn arcs(&self) -> &[(usize, usize)] {
        &self.arcs
    }

    #[inline]
    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Left-hand-side value under a solution snapshot.
    pub fn activity(&self, snapshot: &SolutionSnapshot) -> f64 {
        self.arcs.iter().map(|&(i, j)| snapshot.x(i, j)).sum()
    }

    /// Whether an integer tour (given as its arc set) satisfies the cut.
    pub fn holds_for_arcs(&self, tour_arcs: &[(usize, usize)]) -> bool {
        let used = self
            .arcs
            .iter()
            .filter(|a| tour_arcs.contains(a))
            .count() as f64;
        used <= self.rhs + 1e-9
    }

    /// Renders the cut as an engine row over the `x` columns.
    pub(crate) fn to_cut_row(&self, arc_index: &ArcIndex, x_columns: &[ColumnId]) -> CutRow {
        let entries = self
            .arcs
            .iter()
            .filter_map(|&(i, j)| arc_index.column(i, j))
            .map(|k| (x_columns[k], 1.0))
            .collect();
        CutRow {
            entries,
            upper: self.rhs,
        }
    }

    fn identity(&self) -> (Vec<(usize, usize)>, i64) {
        (self.arcs.clone(), self.rhs.round() as i64)
    }
}

/// The driver-side cut pool. Accepts duplicates from a single separation
/// round gracefully: a cut already present is not added again, so the
/// active model never grows with re-separated rows.
#[derive(Debug, Default)]
pub struct CutPool {
    cuts: Vec<Cut>,
    seen: HashSet<(Vec<(usize, usize)>, i64)>,
}

impl CutPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the cut; returns false when an identical inequality is
    /// already pooled.
    pub fn insert(&mut self, cut: Cut) -> bool {
        if self.seen.insert(cut.identity()) {
            self.cuts.push(cut);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Cut> {
        self.cuts.iter()
    }
}
