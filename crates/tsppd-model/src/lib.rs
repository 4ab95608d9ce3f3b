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

//! Instance model for the single-vehicle pickup-and-delivery travelling
//! salesman problem with capacity and per-node draught limits.
//!
//! A problem over `n` requests lives on `2n + 2` nodes: the source depot 0,
//! pickups `1..=n`, deliveries `n+1..=2n` (the delivery of request `i` is
//! node `n + i`) and the sink depot `2n + 1`. This crate holds the immutable
//! instance graph, the canonical enumeration of its allowed arcs, the tour
//! type with its feasibility validation, and a plain-text instance loader.

pub mod graph;
pub mod tour;

pub mod prelude {
    pub use crate::graph::arcs::ArcIndex;
    pub use crate::graph::err::{GraphError, InstanceLoaderError};
    pub use crate::graph::loader::InstanceLoader;
    pub use crate::graph::Graph;
    pub use crate::tour::err::TourError;
    pub use crate::tour::Tour;
}
