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

use crate::graph::Graph;

/// Stable enumeration of the allowed arcs in row-major `(i, j)` order.
///
/// The position of an arc in this enumeration is its column: the k-th
/// allowed arc corresponds to the k-th `x` and the k-th `y` variable of the
/// formulation, and every separator addresses arcs through it.
#[derive(Debug, Clone)]
pub struct ArcIndex {
    arcs: Vec<(usize, usize)>,
    columns: Vec<Vec<Option<usize>>>,
}

impl ArcIndex {
    pub fn new<T: Copy + Ord>(graph: &Graph<T>) -> Self {
        let nodes = graph.num_nodes();
        let mut arcs = Vec::new();
        let mut columns = vec![vec![None; nodes]; nodes];
        for i in 0..nodes {
            for j in 0..nodes {
                if graph.is_arc(i, j) {
                    columns[i][j] = Some(arcs.len());
                    arcs.push((i, j));
                }
            }
        }
        Self { arcs, columns }
    }

    /// Number of allowed arcs.
    #[inline]
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Column of the allowed arc `(i, j)`, `None` for forbidden arcs.
    #[inline]
    pub fn column(&self, i: usize, j: usize) -> Option<usize> {
        self.columns[i][j]
    }

    /// Endpoints of the arc stored at `column`.
    #[inline]
    pub fn endpoints(&self, column: usize) -> (usize, usize) {
        self.arcs[column]
    }

    /// All allowed arcs in column order.
    #[inline]
    pub fn arcs(&self) -> &[(usize, usize)] {
        &self.arcs
    }

    /// Iterates `(column, (i, j))` pairs in column order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (usize, (usize, usize))> + '_ {
        self.arcs.iter().copied().enumerate()
    }
}
