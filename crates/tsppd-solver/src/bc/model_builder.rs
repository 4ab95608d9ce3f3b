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

use crate::bc::err::ModelBuildError;
use crate::bc::params::BranchAndCutParams;
use crate::core::numeric::{load_to_f64, LoadNumeric};
use crate::mip::model::{Column, ColumnId, MipModel, RowId, VarKind};
use std::collections::{HashMap, HashSet};
use tsppd_model::prelude::{ArcIndex, Graph, Tour};

/// The base MIP plus the arc-to-column maps the rest of the solver needs.
#[derive(Debug, Clone)]
pub struct BcModel {
    mip: MipModel,
    x_columns: Vec<ColumnId>,
    y_columns: Vec<ColumnId>,
}

impl BcModel {
    #[inline]
    pub fn mip(&self) -> &MipModel {
        &self.mip
    }

    /// Column of the binary arc variable of the k-th allowed arc.
    #[inline]
    pub fn x_column(&self, arc: usize) -> ColumnId {
        self.x_columns[arc]
    }

    /// Column of the integer load variable of the k-th allowed arc.
    #[inline]
    pub fn y_column(&self, arc: usize) -> ColumnId {
        self.y_columns[arc]
    }

    #[inline]
    pub fn x_columns(&self) -> &[ColumnId] {
        &self.x_columns
    }

    #[inline]
    pub fn y_columns(&self) -> &[ColumnId] {
        &self.y_columns
    }
}

/// Builds the base formulation: degree rows, Gavish-Graves load flow,
/// arc-load linking, the empty-departure row and the optional a-priori
/// strengthenings (two-cycle elimination, subpath elimination, k-opt
/// neighbourhood restriction).
#[derive(Debug)]
pub struct ModelBuilder<'a, T: Copy + Ord> {
    graph: &'a Graph<T>,
    arc_index: &'a ArcIndex,
    params: &'a BranchAndCutParams,
    reference_tour: Option<&'a Tour>,
}

impl<'a, T: LoadNumeric> ModelBuilder<'a, T> {
    pub fn new(
        graph: &'a Graph<T>,
        arc_index: &'a ArcIndex,
        params: &'a BranchAndCutParams,
        reference_tour: Option<&'a Tour>,
    ) -> Self {
        Self {
            graph,
            arc_index,
            params,
            reference_tour,
        }
    }

    pub fn build(&self) -> Result<BcModel, ModelBuildError> {
        let g = self.graph;
        let n = g.n();
        let mut mip = MipModel::new();

        // Degree rows. The sink has no out-arcs and the source no in-arcs.
        let outdegree: Vec<RowId> = (0..=2 * n)
            .map(|i| mip.add_row(format!("outdegree_{i}"), 1.0, 1.0))
            .collect();
        let indegree: Vec<RowId> = (1..=2 * n + 1)
            .map(|j| mip.add_row(format!("indegree_{j}"), 1.0, 1.0))
            .collect();

        // Load flow: out-flow minus in-flow equals the node demand.
        let load: Vec<RowId> = (1..=2 * n)
            .map(|i| {
                let q = load_to_f64(g.demand(i));
                mip.add_row(format!("load_{i}"), q, q)
            })
            .collect();

        // Arc-load linking, one pair of rows per allowed arc.
        let mut y_lower = Vec::with_capacity(self.arc_index.len());
        let mut y_upper = Vec::with_capacity(self.arc_index.len());
        for (_, (i, j)) in self.arc_index.iter() {
            y_lower.push(mip.add_row(format!("y_lower_{i}_{j}"), f64::NEG_INFINITY, 0.0));
            y_upper.push(mip.add_row(format!("y_upper_{i}_{j}"), 0.0, f64::INFINITY));
        }

        let initial_load = mip.add_row("initial_load", 0.0, 0.0);

        let two_cycle_rows = self.two_cycle_rows(&mut mip);
        let subpath_rows = self.subpath_rows(&mut mip);
        let k_opt = self.k_opt_row(&mut mip)?;

        let mut x_columns = Vec::with_capacity(self.arc_index.len());
        for (k, (i, j)) in self.arc_index.iter() {
            let mut column = Column::new(format!("x_{i}_{j}"), VarKind::Binary, 0.0, 1.0)
                .objective(g.cost(i, j))
                .entry(outdegree[i], 1.0)
                .entry(indegree[j - 1], 1.0)
                .entry(y_lower[k], self.alpha(i, j))
                .entry(y_upper[k], self.beta(i, j));
            if let Some(&row) = two_cycle_rows.get(&ordered(i, j)) {
                column = column.entry(row, 1.0);
            }
            if let Some(rows) = subpath_rows.get(&(i, j)) {
                for &row in rows {
                    column = column.entry(row, 1.0);
                }
            }
            if let Some((row, reference_arcs)) = &k_opt {
                if reference_arcs.contains(&(i, j)) {
                    column = column.entry(*row, 1.0);
                }
            }
            x_columns.push(mip.add_column(column)?);
        }

        let capacity = load_to_f64(g.capacity());
        let mut y_columns = Vec::with_capacity(self.arc_index.len());
        for (k, (i, j)) in self.arc_index.iter() {
            let mut column = Column::new(format!("y_{i}_{j}"), VarKind::Integer, 0.0, capacity)
                .entry(y_lower[k], -1.0)
                .entry(y_upper[k], -1.0);
            if (1..=2 * n).contains(&i) {
                column = column.entry(load[i - 1], 1.0);
            }
            if (1..=2 * n).contains(&j) {
                column = column.entry(load[j - 1], -1.0);
            }
            if i == g.source() {
                column = column.entry(initial_load, 1.0);
            }
            y_columns.push(mip.add_column(column)?);
        }

        Ok(BcModel {
            mip,
            x_columns,
            y_columns,
        })
    }

    /// Lower linking coefficient: the least load an arc carries when used.
    fn alpha(&self, i: usize, j: usize) -> f64 {
        let g = self.graph;
        if g.is_pickup(i) && g.is_pickup(j) {
            load_to_f64(g.demand(i))
        } else if g.is_delivery(i) && g.is_delivery(j) {
            -load_to_f64(g.demand(j))
        } else if g.is_pickup(i) && g.is_delivery(j) {
            if j != g.partner(i) {
                load_to_f64(g.demand(i)) - load_to_f64(g.demand(j))
            } else {
                load_to_f64(g.demand(i))
            }
        } else {
            0.0
        }
    }

    /// Upper linking coefficient: capacity and draught ceiling of the arc.
    fn beta(&self, i: usize, j: usize) -> f64 {
        let g = self.graph;
        let q_j = load_to_f64(g.demand(j)).max(0.0);
        let capacity = load_to_f64(g.capacity());
        (capacity - q_j)
            .min(load_to_f64(g.draught(i)))
            .min(load_to_f64(g.draught(j)) - q_j)
    }

    /// `x(i,j) + x(j,i) <= 1` for every pair allowed in both directions.
    fn two_cycle_rows(&self, mip: &mut MipModel) -> HashMap<(usize, usize), RowId> {
        let mut rows = HashMap::new();
        if !self.params.two_cycles_elim {
            return rows;
        }
        let g = self.graph;
        let nodes = g.num_nodes();
        for i in 0..nodes {
            for j in i + 1..nodes {
                if g.is_arc(i, j) && g.is_arc(j, i) {
                    let row = mip.add_row(format!("tce_{i}_{j}"), f64::NEG_INFINITY, 1.0);
                    rows.insert((i, j), row);
                }
            }
        }
        rows
    }

    /// `x(i,j) + x(j,k) <= 1` for every eliminable triple; each arc maps to
    /// the rows it participates in.
    fn subpath_rows(&self, mip: &mut MipModel) -> HashMap<(usize, usize), Vec<RowId>> {
        let mut rows: HashMap<(usize, usize), Vec<RowId>> = HashMap::new();
        if !self.params.subpath_elim {
            return rows;
        }
        let g = self.graph;
        let n = g.n();
        for i in 1..=2 * n {
            for j in 1..=2 * n {
                for k in 1..=2 * n {
                    if g.is_arc(i, j) && g.is_arc(j, k) && g.is_path_eliminable(i, j, k) {
                        let row = mip.add_row(format!("sube_{i}_{j}_{k}"), f64::NEG_INFINITY, 1.0);
                        rows.entry((i, j)).or_default().push(row);
                        rows.entry((j, k)).or_default().push(row);
                    }
                }
            }
        }
        rows
    }

    /// `sum of x over reference arcs >= |reference| - k`.
    fn k_opt_row(
        &self,
        mip: &mut MipModel,
    ) -> Result<Option<(RowId, HashSet<(usize, usize)>)>, ModelBuildError> {
        let Some(k) = self.params.k_opt else {
            return Ok(None);
        };
        let Some(reference) = self.reference_tour else {
            return Err(ModelBuildError::KOptWithoutReference);
        };
        let reference_arcs: HashSet<(usize, usize)> = reference.arcs().collect();
        let rhs = reference_arcs.len() as f64 - k as f64;
        let row = mip.add_row("k_opt", rhs, f64::INFINITY);
        Ok(Some((row, reference_arcs)))
    }
}

#[inline]
fn ordered(i: usize, j: usize) -> (usize, usize) {
    if i < j { (i, j) } else { (j, i) }
}
