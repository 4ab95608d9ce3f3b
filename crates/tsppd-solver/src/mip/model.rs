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

use crate::mip::err::UnknownRowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(pub usize);

impl RowId {
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnId(pub usize);

impl ColumnId {
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Continuous,
    Integer,
    Binary,
}

/// A named range constraint `lower <= a'x <= upper`; coefficients arrive
/// column-wise when the variables are declared.
#[derive(Debug, Clone)]
pub struct Row {
    name: String,
    lower: f64,
    upper: f64,
}

impl Row {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper
    }
}

/// A variable with bounds, integrality, objective coefficient and its
/// entries against existing rows.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    kind: VarKind,
    lower: f64,
    upper: f64,
    objective: f64,
    entries: Vec<(RowId, f64)>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: VarKind, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            lower,
            upper,
            objective: 0.0,
            entries: Vec::new(),
        }
    }

    #[inline]
    pub fn objective(mut self, coefficient: f64) -> Self {
        self.objective = coefficient;
        self
    }

    #[inline]
    pub fn entry(mut self, row: RowId, coefficient: f64) -> Self {
        if coefficient != 0.0 {
            self.entries.push((row, coefficient));
        }
        self
    }

    #[inline]
    pub fn name_str(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> VarKind {
        self.kind
    }

    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    #[inline]
    pub fn objective_coefficient(&self) -> f64 {
        self.objective
    }

    #[inline]
    pub fn entries(&self) -> &[(RowId, f64)] {
        &self.entries
    }
}

/// A row appended after construction (the cut pool), specified row-wise
/// over existing columns: `a'x <= upper`.
#[derive(Debug, Clone)]
pub struct CutRow {
    pub entries: Vec<(ColumnId, f64)>,
    pub upper: f64,
}

/// Column-wise MIP model: rows first, then variables carrying their
/// coefficients against the rows and the objective.
#[derive(Debug, Clone, Default)]
pub struct MipModel {
    rows: Vec<Row>,
    columns: Vec<Column>,
}

impl MipModel {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, name: impl Into<String>, lower: f64, upper: f64) -> RowId {
        let id = RowId(self.rows.len());
        self.rows.push(Row {
            name: name.into(),
            lower,
            upper,
        });
        id
    }

    pub fn add_column(&mut self, column: Column) -> Result<ColumnId, UnknownRowError> {
        for &(row, _) in column.entries() {
            if row.get() >= self.rows.len() {
                return Err(UnknownRowError::new(column.name_str(), row.get()));
            }
        }
        let id = ColumnId(self.columns.len());
        self.columns.push(column);
        Ok(id)
    }

    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_validate_row_references() {
        let mut model = MipModel::new();
        let r = model.add_row("degree_0", 1.0, 1.0);
        let ok = Column::new("x_0_1", VarKind::Binary, 0.0, 1.0)
            .objective(2.5)
            .entry(r, 1.0);
        let id = model.add_column(ok).unwrap();
        assert_eq!(id.get(), 0);

        let bad = Column::new("x_0_2", VarKind::Binary, 0.0, 1.0).entry(RowId(7), 1.0);
        let err = model.add_column(bad).unwrap_err();
        assert_eq!(err.row(), 7);
        assert_eq!(err.column(), "x_0_2");
    }

    #[test]
    fn test_zero_entries_are_dropped() {
        let mut model = MipModel::new();
        let r = model.add_row("load_1", 3.0, 3.0);
        let col = Column::new("y_0_1", VarKind::Integer, 0.0, 10.0)
            .entry(r, 0.0)
            .entry(r, -1.0);
        let id = model.add_column(col).unwrap();
        assert_eq!(model.columns()[id.get()].entries(), &[(r, -1.0)]);
    }
}
