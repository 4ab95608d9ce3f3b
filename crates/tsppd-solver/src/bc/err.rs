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

use crate::mip::err::{BackendError, UnknownRowError};

/// An internal separator precondition was violated. This is a bug, not a
/// data problem; the solve aborts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeparatorError {
    /// A helper was asked to reduce over an empty node set.
    EmptyNodeSet {
        separator: &'static str,
        operation: &'static str,
    },
    /// An integer solution misses an out-arc the degree rows guarantee.
    MissingSuccessor { node: usize },
}

impl std::fmt::Display for SeparatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeparatorError::EmptyNodeSet {
                separator,
                operation,
            } => write!(f, "{separator}: {operation} invoked on an empty node set"),
            SeparatorError::MissingSuccessor { node } => write!(
                f,
                "integer solution has no out-arc at node {node}; degree rows violated"
            ),
        }
    }
}

impl std::error::Error for SeparatorError {}

/// The engine rejected a row or column, or the model configuration is
/// inconsistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelBuildError {
    UnknownRow(UnknownRowError),
    KOptWithoutReference,
}

impl From<UnknownRowError> for ModelBuildError {
    fn from(e: UnknownRowError) -> Self {
        Self::UnknownRow(e)
    }
}

impl std::fmt::Display for ModelBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelBuildError::UnknownRow(e) => write!(f, "{e}"),
            ModelBuildError::KOptWithoutReference => {
                write!(f, "k_opt is set but no reference tour was supplied")
            }
        }
    }
}

impl std::error::Error for ModelBuildError {}

/// Fatal solve failures. Infeasibility and interruption are outcomes, not
/// errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    Params(crate::bc::params::ParamsError),
    ModelBuild(ModelBuildError),
    Separator(SeparatorError),
    Engine(BackendError),
}

impl From<crate::bc::params::ParamsError> for SolveError {
    fn from(e: crate::bc::params::ParamsError) -> Self {
        Self::Params(e)
    }
}

impl From<ModelBuildError> for SolveError {
    fn from(e: ModelBuildError) -> Self {
        Self::ModelBuild(e)
    }
}

impl From<SeparatorError> for SolveError {
    fn from(e: SeparatorError) -> Self {
        Self::Separator(e)
    }
}

impl From<BackendError> for SolveError {
    fn from(e: BackendError) -> Self {
        Self::Engine(e)
    }
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveError::Params(e) => write!(f, "parameter error: {e}"),
            SolveError::ModelBuild(e) => write!(f, "model construction error: {e}"),
            SolveError::Separator(e) => write!(f, "separator invariant error: {e}"),
            SolveError::Engine(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SolveError {}
