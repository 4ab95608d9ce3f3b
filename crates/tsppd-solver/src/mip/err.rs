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

/// A column referenced a row that does not exist in the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRowError {
    column: String,
    row: usize,
}

impl UnknownRowError {
    pub fn new(column: impl Into<String>, row: usize) -> Self {
        Self {
            column: column.into(),
            row,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn row(&self) -> usize {
        self.row
    }
}

impl std::fmt::Display for UnknownRowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "column {} references unknown row index {}",
            self.column, self.row
        )
    }
}

impl std::error::Error for UnknownRowError {}

/// Failure reported by the LP/MIP backend itself (numerical trouble,
/// missing license, out of memory). Infeasible and unbounded models are
/// outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MIP backend error: {}", self.message)
    }
}

impl std::error::Error for BackendError {}
