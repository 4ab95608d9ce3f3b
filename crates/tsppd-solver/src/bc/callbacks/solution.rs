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

use tsppd_model::prelude::ArcIndex;

/// Dense view of the `x` values at one callback invocation. Values at or
/// below `eps` are clamped to zero; `is_integer` holds iff every remaining
/// value lies within `eps` of one.
#[derive(Debug, Clone)]
pub struct SolutionSnapshot {
    x: Vec<Vec<f64>>,
    is_integer: bool,
}

impl SolutionSnapshot {
    /// Reads per-arc-column `x` values into the dense matrix. Forbidden
    /// arcs stay at zero.
    pub fn from_arc_values(
        num_nodes: usize,
        arc_index: &ArcIndex,
        values: &[f64],
        eps: f64,
    ) -> Self {
        let mut x = vec![vec![0.0; num_nodes]; num_nodes];
        let mut is_integer = true;
        for (k, (i, j)) in arc_index.iter() {
            let value = values[k];
            if value > eps {
                if value < 1.0 - eps {
                    is_integer = false;
                }
                x[i][j] = value;
            }
        }
        Self { x, is_integer }
    }

    /// Wraps an explicit matrix; used by tests and benches to stage
    /// fractional points directly.
    pub fn from_dense(x: Vec<Vec<f64>>, eps: f64) -> Self {
        let is_integer = x
            .iter()
            .flatten()
            .all(|&v| v <= eps || v >= 1.0 - eps);
        Self { x, is_integer }
    }

    #[inline]
    pub fn x(&self, i: usize, j: usize) -> f64 {
        self.x[i][j]
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        self.is_integer
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.x.len()
    }
}

/// Best enlargement candidate reported by a separator helper: the node and
/// its fractional flow to the set under construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestNode {
    pub node: usize,
    pub flow: f64,
}

impl BestNode {
    #[inline]
    pub fn new(node: usize, flow: f64) -> Self {
        Self { node, flow }
    }
}
