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

/// Why a node sequence is not a feasible tour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourError {
    WrongLength { expected: usize, actual: usize },
    WrongEndpoints,
    RepeatedNode { node: usize },
    MissingNode { node: usize },
    ForbiddenArc { from: usize, to: usize },
    PrecedenceViolated { request: usize },
    CapacityExceeded { node: usize },
    DraughtExceeded { node: usize },
    NegativeLoad { node: usize },
}

impl std::fmt::Display for TourError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TourError::*;
        match self {
            WrongLength { expected, actual } => {
                write!(f, "tour visits {actual} nodes, expected {expected}")
            }
            WrongEndpoints => write!(f, "tour must start at the source and end at the sink"),
            RepeatedNode { node } => write!(f, "tour visits node {node} more than once"),
            MissingNode { node } => write!(f, "tour never visits node {node}"),
            ForbiddenArc { from, to } => write!(f, "tour uses the forbidden arc ({from}, {to})"),
            PrecedenceViolated { request } => write!(
                f,
                "tour delivers request {request} before picking it up"
            ),
            CapacityExceeded { node } => write!(
                f,
                "load after leaving node {node} exceeds the vehicle capacity"
            ),
            DraughtExceeded { node } => {
                write!(f, "load after leaving node {node} exceeds its draught")
            }
            NegativeLoad { node } => write!(f, "load after leaving node {node} is negative"),
        }
    }
}

impl std::error::Error for TourError {}
