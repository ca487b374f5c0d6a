// Defines a trait for time-like objects and a timestamp-driven controller wrapper
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

use core::ops::Add;
use core::time::Duration;

use core::fmt::Debug;

use num_traits::Float;

use crate::pid::PidController;

/// A trait for time-like objects that can be used to measure elapsed time.
/// [`ClockedPidController`] uses it to derive the time step between two updates.
pub trait InstantLike: Copy + Debug + PartialEq<Self> {
    /// Returns the amount of time elapsed from another instant to this one, saturating to zero
    /// if `earlier` is actually later
    #[must_use]
    fn duration_since(&self, earlier: Self) -> Duration;
}

/// A wrapper around an unsigned 64-bit integer representing milliseconds, e.g. a tick counter
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Millis(pub u64);

impl InstantLike for Millis {
    fn duration_since(&self, earlier: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Millis {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Millis(
            self.0
                .saturating_add(u64::try_from(rhs.as_millis()).unwrap_or(u64::MAX)),
        )
    }
}

/// A wrapper around an unsigned 64-bit integer representing microseconds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Micros(pub u64);

impl InstantLike for Micros {
    fn duration_since(&self, earlier: Self) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Micros {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Micros(
            self.0
                .saturating_add(u64::try_from(rhs.as_micros()).unwrap_or(u64::MAX)),
        )
    }
}

/// Seconds since an arbitrary epoch, e.g. simulated time
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeF64(pub f64);

impl InstantLike for TimeF64 {
    fn duration_since(&self, earlier: Self) -> Duration {
        let secs = self.0 - earlier.0;
        if secs.is_nan() || secs <= 0.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
        }
    }
}

impl Add<Duration> for TimeF64 {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        TimeF64(self.0 + rhs.as_secs_f64())
    }
}

impl TimeF64 {
    /// Constructs a new TimeF64 from raw seconds.
    pub fn from_secs(secs: f64) -> Self {
        TimeF64(secs)
    }

    /// Returns the underlying seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }
}

/// A convenient wrapper around `std::time::Instant` satisfying the `InstantLike` trait.
#[cfg(feature = "std")]
mod std_instant {

    use super::{Add, Duration, InstantLike};

    /// `std::time::Instant` as an [`InstantLike`]
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct StdInstant(pub std::time::Instant);

    impl StdInstant {
        /// The current instant
        pub fn now() -> Self {
            StdInstant(std::time::Instant::now())
        }
    }

    impl InstantLike for StdInstant {
        fn duration_since(&self, other: Self) -> Duration {
            self.0.saturating_duration_since(other.0)
        }
    }

    impl Add<Duration> for StdInstant {
        type Output = Self;

        fn add(self, rhs: Duration) -> Self::Output {
            StdInstant(self.0 + rhs)
        }
    }

    /// Tests that StdInstant is just one constructor call away from std::time::Instant
    /// and calling duration_since is equivalent to calling the same method on the underlying Instant.
    #[cfg(test)]
    #[test]
    fn test_std_instant_wrapper() {
        let start = StdInstant::now();
        let end = StdInstant(std::time::Instant::now());
        let result = end.duration_since(start);
        let expected = end.0.duration_since(start.0);
        assert_eq!(result, expected);
        assert_eq!(start.duration_since(end + Duration::from_secs(1)), Duration::ZERO);
    }
}

#[cfg(feature = "std")]
pub use std_instant::StdInstant;

/// A [`PidController`] driven by timestamps instead of time steps.
///
/// The first call only starts timekeeping: with no previous timestamp the step is zero, so the
/// controller holds its (zero) output. Later calls step the controller by the time elapsed
/// since the previous call.
#[derive(Clone, Debug)]
pub struct ClockedPidController<I: InstantLike, F: Float = f64> {
    pid: PidController<F>,
    last_time: Option<I>,
}

impl<I: InstantLike, F: Float> ClockedPidController<I, F> {
    /// Wraps a controller; no timestamp has been seen yet.
    pub fn new(pid: PidController<F>) -> Self {
        Self {
            pid,
            last_time: None,
        }
    }

    /// Timestamp of the previous call, if any.
    pub fn last_time(&self) -> Option<I> {
        self.last_time
    }

    /// The wrapped controller.
    pub fn controller(&self) -> &PidController<F> {
        &self.pid
    }

    /// Unwraps the controller, discarding timekeeping.
    pub fn into_inner(self) -> PidController<F> {
        self.pid
    }

    /// Computes the next control signal at time `now`.
    pub fn update(&mut self, target: F, current: F, now: I) -> F {
        let delta = self
            .last_time
            .map_or(Duration::ZERO, |last| now.duration_since(last));
        self.last_time = Some(now);
        self.pid.update(target, current, delta)
    }

    /// Clears the controller state and forgets the previous timestamp.
    pub fn reset(&mut self) {
        self.pid.reset();
        self.last_time = None;
    }
}
