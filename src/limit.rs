// Saturation intervals for the controller output and integrator
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use num_traits::Float;

/// A closed interval `[lower, upper]` used to saturate the controller output and its integrator.
///
/// Either bound may be infinite. The bounds are not validated: constructing a `Limit` with
/// `lower > upper` is a caller error and produces a degenerate interval that always clamps to
/// `upper`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Limit<F: Float> {
    lower: F,
    upper: F,
}

impl<F: Float> Limit<F> {
    /// Creates a new interval from its lower and upper bounds.
    pub fn new(lower: F, upper: F) -> Self {
        Self { lower, upper }
    }

    /// The interval `(-∞, +∞)`, which leaves every value unchanged.
    pub fn unbounded() -> Self {
        Self::new(F::neg_infinity(), F::infinity())
    }

    /// Returns the lower bound.
    pub fn lower(&self) -> F {
        self.lower
    }

    /// Returns the upper bound.
    pub fn upper(&self) -> F {
        self.upper
    }

    /// Saturates `value` to the interval.
    ///
    /// - If the value is less than `lower`, you get `lower`.
    /// - If the value is greater than `upper`, you get `upper`.
    /// - Otherwise you get the value itself.
    ///
    /// Unlike `f64::clamp` this never panics. A NaN `value` fails both comparisons and is
    /// passed through unchanged, so a corrupted input stays visible downstream.
    #[must_use]
    pub fn clamp(&self, value: F) -> F {
        let raised = if value < self.lower { self.lower } else { value };
        if raised > self.upper {
            self.upper
        } else {
            raised
        }
    }
}

impl<F: Float> Default for Limit<F> {
    fn default() -> Self {
        Self::unbounded()
    }
}
