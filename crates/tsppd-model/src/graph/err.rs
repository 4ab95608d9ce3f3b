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

use std::num::{ParseFloatError, ParseIntError};

/// Instance invariant violations. The solver never starts on an instance
/// that fails construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    CostMatrixDimension { expected: usize, actual: usize },
    CostRowDimension { row: usize, expected: usize, actual: usize },
    VectorDimension { what: &'static str, expected: usize, actual: usize },
    DepotDemandNonZero { node: usize },
    NonPositivePickupDemand { pickup: usize },
    DemandExceedsCapacity { pickup: usize },
    UnpairedDeliveryDemand { request: usize },
    DraughtBelowDemand { node: usize },
    SelfArcAllowed { node: usize },
    ArcIntoSource { from: usize },
    ArcOutOfSink { to: usize },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use GraphError::*;
        match self {
            CostMatrixDimension { expected, actual } => {
                write!(f, "cost matrix has {actual} rows, expected {expected}")
            }
            CostRowDimension {
                row,
                expected,
                actual,
            } => write!(
                f,
                "cost matrix row {row} has {actual} entries, expected {expected}"
            ),
            VectorDimension {
                what,
                expected,
                actual,
            } => write!(f, "{what} vector has {actual} entries, expected {expected}"),
            DepotDemandNonZero { node } => write!(f, "depot node {node} has non-zero demand"),
            NonPositivePickupDemand { pickup } => {
                write!(f, "pickup {pickup} has non-positive demand")
            }
            DemandExceedsCapacity { pickup } => {
                write!(f, "pickup {pickup} demand exceeds the vehicle capacity")
            }
            UnpairedDeliveryDemand { request } => write!(
                f,
                "delivery demand of request {request} is not the negated pickup demand"
            ),
            DraughtBelowDemand { node } => write!(
                f,
                "draught at node {node} is below the load carried when visiting it"
            ),
            SelfArcAllowed { node } => write!(f, "self arc ({node}, {node}) is not forbidden"),
            ArcIntoSource { from } => write!(f, "arc ({from}, source) is not forbidden"),
            ArcOutOfSink { to } => write!(f, "arc (sink, {to}) is not forbidden"),
        }
    }
}

impl std::error::Error for GraphError {}

#[derive(Debug)]
pub enum InstanceLoaderError {
    Io(std::io::Error),
    ParseInt(ParseIntError),
    ParseFloat(ParseFloatError),
    UnexpectedEof,
    NonPositiveRequestCount,
    Graph(GraphError),
}

impl From<std::io::Error> for InstanceLoaderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ParseIntError> for InstanceLoaderError {
    fn from(e: ParseIntError) -> Self {
        Self::ParseInt(e)
    }
}

impl From<ParseFloatError> for InstanceLoaderError {
    fn from(e: ParseFloatError) -> Self {
        Self::ParseFloat(e)
    }
}

impl From<GraphError> for InstanceLoaderError {
    fn from(e: GraphError) -> Self {
        Self::Graph(e)
    }
}

impl std::fmt::Display for InstanceLoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use InstanceLoaderError::*;
        match self {
            Io(e) => write!(f, "I/O error: {e}"),
            ParseInt(e) => write!(f, "parse-int error: {e}"),
            ParseFloat(e) => write!(f, "parse-float error: {e}"),
            UnexpectedEof => write!(f, "unexpected end of file while parsing instance"),
            NonPositiveRequestCount => write!(f, "the request count must be positive"),
            Graph(e) => write!(f, "instance error: {e}"),
        }
    }
}

impl std::error::Error for InstanceLoaderError {}
