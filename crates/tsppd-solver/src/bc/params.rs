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

use serde::{Deserialize, Serialize};

/// Per-family switches: whether the separator runs at all, and at which
/// node stride (`node_number % cut_every_n_nodes == 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutFamilyParams {
    pub enabled: bool,
    pub cut_every_n_nodes: u64,
}

impl Default for CutFamilyParams {
    fn default() -> Self {
        Self {
            enabled: true,
            cut_every_n_nodes: 1,
        }
    }
}

impl CutFamilyParams {
    #[inline]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            cut_every_n_nodes: 1,
        }
    }

    #[inline]
    pub fn applies_at(&self, node_number: u64) -> bool {
        self.enabled && node_number % self.cut_every_n_nodes == 0
    }
}

/// Branch-and-cut configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchAndCutParams {
    /// A-priori two-cycle elimination rows.
    pub two_cycles_elim: bool,
    /// A-priori subpath elimination rows over eliminable triples.
    pub subpath_elim: bool,
    pub subtour_elim: CutFamilyParams,
    pub generalised_order: CutFamilyParams,
    pub capacity: CutFamilyParams,
    pub fork: CutFamilyParams,
    pub simplified_fork: CutFamilyParams,
    /// Integrality / violation tolerance.
    pub eps: f64,
    /// When set, restrict the search to tours differing from the reference
    /// tour in at most `k` arcs.
    pub k_opt: Option<usize>,
    /// Cap on cutting-plane rounds over the root relaxation.
    pub max_root_cut_rounds: u64,
    /// Cap on lazy-constraint rounds over integer solves.
    pub max_lazy_rounds: u64,
    /// Wall-clock limit handed to the engine, per solve, in seconds.
    pub time_limit_seconds: Option<f64>,
}

impl Default for BranchAndCutParams {
    fn default() -> Self {
        Self {
            two_cycles_elim: true,
            subpath_elim: true,
            subtour_elim: CutFamilyParams::default(),
            generalised_order: CutFamilyParams::default(),
            capacity: CutFamilyParams::default(),
            fork: CutFamilyParams::default(),
            simplified_fork: CutFamilyParams::default(),
            eps: 1e-6,
            k_opt: None,
            max_root_cut_rounds: 20,
            max_lazy_rounds: 200,
            time_limit_seconds: None,
        }
    }
}

impl BranchAndCutParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(self.eps > 0.0) {
            return Err(ParamsError::NonPositiveEps { eps: self.eps });
        }
        for (label, family) in [
            ("subtour_elim", &self.subtour_elim),
            ("generalised_order", &self.generalised_order),
            ("capacity", &self.capacity),
            ("fork", &self.fork),
            ("simplified_fork", &self.simplified_fork),
        ] {
            if family.cut_every_n_nodes == 0 {
                return Err(ParamsError::ZeroStride { family: label });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamsError {
    NonPositiveEps { eps: f64 },
    ZeroStride { family: &'static str },
}

impl std::fmt::Display for ParamsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamsError::NonPositiveEps { eps } => {
                write!(f, "eps must be positive, got {eps}")
            }
            ParamsError::ZeroStride { family } => {
                write!(f, "{family}.cut_every_n_nodes must be at least 1")
            }
        }
    }
}

impl std::error::Error for ParamsError {}
