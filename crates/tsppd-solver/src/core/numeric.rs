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

use num_traits::{CheckedAdd, CheckedSub, ToPrimitive, Zero};

/// Numeric bounds a load type (demand, draught, capacity) must satisfy to
/// flow through the solver. Blanket-implemented; `i64` is the canonical
/// instantiation.
pub trait LoadNumeric:
    Copy
    + Ord
    + CheckedAdd
    + CheckedSub
    + Zero
    + ToPrimitive
    + std::fmt::Debug
    + std::fmt::Display
    + Send
    + Sync
{
}

impl<T> LoadNumeric for T where
    T: Copy
        + Ord
        + CheckedAdd
        + CheckedSub
        + Zero
        + ToPrimitive
        + std::fmt::Debug
        + std::fmt::Display
        + Send
        + Sync
{
}

/// Converts a load value into the `f64` coefficient space of the LP.
#[inline]
pub fn load_to_f64<T: LoadNumeric>(value: T) -> f64 {
    value
        .to_f64()
        .expect("load values must be representable as f64")
}
