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

use crate::mip::err::BackendError;
use crate::mip::model::{CutRow, MipModel, VarKind};
use good_lp::solvers::highs::highs;
use good_lp::*;

/// Whether to honour the declared integralities or to solve the pure LP
/// relaxation (binaries become `[0, 1]` continuous, integers lose their
/// integrality).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveMode {
    Relaxed,
    Integral,
}

/// Values and objective of a finished solve, indexed by column.
#[derive(Debug, Clone)]
pub struct MipSolution {
    values: Vec<f64>,
    objective: f64,
}

impl MipSolution {
    #[inline]
    pub fn value(&self, column: usize) -> f64 {
        self.values[column]
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn objective(&self) -> f64 {
        self.objective
    }
}

#[derive(Debug, Clone)]
pub enum LpOutcome {
    Optimal(MipSolution),
    Infeasible,
    Unbounded,
}

/// Materialises the column-wise model (plus the cut pool) into a `good_lp`
/// problem and solves it with HiGHS.
pub fn solve(
    model: &MipModel,
    mode: SolveMode,
    cuts: &[CutRow],
    time_limit: Option<f64>,
) -> Result<LpOutcome, BackendError> {
    let mut vars = variables!();
    let lp_vars: Vec<Variable> = model
        .columns()
        .iter()
        .map(|c| {
            let def = variable().name(c.name_str().to_owned());
            let def = match (mode, c.kind()) {
                (SolveMode::Integral, VarKind::Binary) => def.binary(),
                (SolveMode::Integral, VarKind::Integer) => {
                    def.integer().min(c.lower()).max(c.upper())
                }
                (SolveMode::Relaxed, VarKind::Binary) => def.min(0.0).max(1.0),
                _ => def.min(c.lower()).max(c.upper()),
            };
            vars.add(def)
        })
        .collect();

    let mut objective = Expression::from(0.0);
    let mut row_exprs: Vec<Expression> = (0..model.num_rows())
        .map(|_| Expression::from(0.0))
        .collect();
    for (k, column) in model.columns().iter().enumerate() {
        if column.objective_coefficient() != 0.0 {
            objective += column.objective_coefficient() * lp_vars[k];
        }
        for &(row, coefficient) in column.entries() {
            row_exprs[row.get()] += coefficient * lp_vars[k];
        }
    }

    let mut problem = vars.minimise(objective).using(highs);
    if let Some(limit) = time_limit {
        problem = problem.with_time_limit(limit);
    }

    for (row, expr) in model.rows().iter().zip(row_exprs) {
        let (lower, upper) = (row.lower(), row.upper());
        if lower == upper {
            problem.add_constraint(expr.eq(lower));
        } else {
            if lower.is_finite() {
                problem.add_constraint(expr.clone().geq(lower));
            }
            if upper.is_finite() {
                problem.add_constraint(expr.leq(upper));
            }
        }
    }

    for cut in cuts {
        let mut expr = Expression::from(0.0);
        for &(column, coefficient) in &cut.entries {
            expr += coefficient * lp_vars[column.get()];
        }
        problem.add_constraint(expr.leq(cut.upper));
    }

    match problem.solve() {
        Ok(solution) => {
            let values: Vec<f64> = lp_vars.iter().map(|&v| solution.value(v)).collect();
            let objective = model
                .columns()
                .iter()
                .enumerate()
                .map(|(k, c)| c.objective_coefficient() * values[k])
                .sum();
            Ok(LpOutcome::Optimal(MipSolution { values, objective }))
        }
        Err(ResolutionError::Infeasible) => Ok(LpOutcome::Infeasible),
        Err(ResolutionError::Unbounded) => Ok(LpOutcome::Unbounded),
        Err(other) => Err(BackendError::new(other.to_string())),
    }
}
