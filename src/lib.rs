#![warn(missing_docs)]

//! # Feedback PID Controller Library
//!
//! This library provides a discrete-time PID (Proportional-Integral-Derivative) feedback
//! controller in Rust. It is a numerical primitive: embed it in your own control loop and call
//! `update` once per iteration with the target, the latest measurement and the elapsed time.
//!
//! ## Features
//!
//! - Anti reset-windup: the integral accumulator is bounded so that its contribution alone can
//!   never push the output past the output limit.
//! - Optional single-pole low-pass filters on the error and on the derivative term.
//! - Rectangular (Euler) or trapezoidal integration.
//! - Gains from raw values, the standard PID form, or the Ziegler-Nichols tuning rule.
//! - Composable, reusable option bundles.
//! - Optional telemetry: an update counter and target/measurement/control-signal gauges per
//!   named controller, with idempotent registration (`std` only).
//! - `no_std` compatible, generic over `f32` and `f64`.
//!
//! ## Usage
//!
//! ### Stepping by elapsed time
//!
//! ```rust
//! use std::time::Duration;
//!
//! use feedback_pid::pid::PidConfigBuilder;
//!
//! let mut pid = PidConfigBuilder::default()
//!     .standard_form(1.5, 1.0, 0.2)
//!     .trapezoidal_integral(true)
//!     .output_limit(-1.0, 1.0)
//!     .build()
//!     .expect("Invalid PID config");
//!
//! let target = 1.0;
//! let mut measurement = 0.0;
//! for _ in 0..5 {
//!     let control = pid.update(target, measurement, Duration::from_millis(100));
//!     assert!((-1.0..=1.0).contains(&control));
//!     measurement += 0.25 * control;
//! }
//! ```
//!
//! ### Reusable option bundles
//!
//! ```rust
//! use feedback_pid::pid::{PidConfigBuilder, PidOption};
//!
//! const HEATER: [PidOption<f64>; 2] = [
//!     PidOption::ZieglerNichols { ultimate_gain: 1.7, oscillation_period: 2.0 },
//!     PidOption::OutputLimit(0.0, 20.0),
//! ];
//!
//! let pid = PidConfigBuilder::default()
//!     .options(HEATER)
//!     .trapezoidal_integral(true)
//!     .build()
//!     .expect("Invalid PID config");
//! assert_eq!(pid.config().output_limit().upper(), 20.0);
//! ```
//!
//! ### Stepping by timestamps
//!
//! ``` rust
//! use feedback_pid::pid::PidController;
//! use feedback_pid::time::{ClockedPidController, Millis};
//!
//! let mut pid = ClockedPidController::new(PidController::new(Default::default()));
//!
//! // The first call only starts timekeeping
//! assert_eq!(pid.update(1.0, 0.0, Millis(0)), 0.0);
//! assert_eq!(pid.update(1.0, 0.0, Millis(10)), 1.0);
//! ```
//!
//! ### Telemetry
//!
//! ```rust
//! use std::time::Duration;
//!
//! use feedback_pid::pid::PidConfigBuilder;
//! use feedback_pid::telemetry::Registry;
//!
//! let registry = Registry::new();
//! let mut pid = PidConfigBuilder::default()
//!     .telemetry("oven", &registry)
//!     .build()
//!     .expect("registration failed");
//!
//! pid.update(5.0, 2.0, Duration::from_secs(1));
//! let metrics = registry.get("oven").unwrap();
//! assert_eq!(metrics.updates_total(), 1);
//! assert_eq!(metrics.control_signal(), 3.0);
//! ```
#![no_std]

#[cfg(feature = "std")]
extern crate std;

/// Construction-time errors.
pub mod error;

/// Closed intervals used for output and integral saturation.
pub mod limit;

/// The PID controller, its configuration builder and its step memory.
pub mod pid;

/// The module containing time-related utilities to drive the controller from timestamps
pub mod time;

/// Observation of controller updates and idempotent instrument registration.
#[cfg(feature = "std")]
pub mod telemetry;

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
