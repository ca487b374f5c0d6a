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

/// Errors surfaced while constructing a [`PidController`](crate::pid::PidController).
///
/// Gains, filters and limits are never validated, so the only way construction can fail is
/// through an attached collaborator, i.e. registering telemetry instruments.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum PidError {
    /// Telemetry instruments must be registered under a non-empty name
    #[cfg_attr(feature = "std", error("telemetry instruments require a non-empty name"))]
    EmptyMetricsName,

    /// The registry already holds as many distinct names as it was created for
    #[cfg_attr(
        feature = "std",
        error("telemetry registry is full ({capacity} names registered)")
    )]
    RegistryFull {
        /// Maximum number of distinct names the registry accepts
        capacity: usize,
    },
}
