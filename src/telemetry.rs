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

//! Observation of controller updates.
//!
//! A [`PidController`](crate::pid::PidController) can hold an optional [`Telemetry`] sink. The
//! controller reports every call to `update` to it; the sink never influences the returned
//! control signal and cannot fail the update.
//!
//! [`Registry`] hands out one [`PidMetrics`] instrument set per name. Registration is
//! idempotent, so controllers that intentionally share a name also share their instruments.

use std::collections::HashMap;
use std::fmt::Debug;
use std::string::{String, ToString};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::vec::Vec;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::PidError;

/// Name of the counter incremented on every update
pub const UPDATES_TOTAL: &str = "pid_updates_total";
/// Name of the gauge holding the latest target
pub const TARGET: &str = "pid_target";
/// Name of the gauge holding the latest measurement
pub const CURRENT: &str = "pid_current";
/// Name of the gauge holding the latest control signal
pub const CONTROL_SIGNAL: &str = "pid_control_signal";

/// A sink for controller update events.
///
/// Implementations must be cheap: `record_update` runs on the control loop's hot path.
pub trait Telemetry: Debug + Send + Sync {
    /// Called once per controller update with the inputs and the returned control signal.
    fn record_update(&self, target: f64, current: f64, control_signal: f64);
}

/// An `f64` gauge stored as raw bits so it can be updated without locking.
#[derive(Debug, Default)]
struct Gauge(AtomicU64);

impl Gauge {
    fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }
}

/// The instrument set of one named controller: an update counter and three gauges.
#[derive(Debug)]
pub struct PidMetrics {
    name: String,
    updates_total: AtomicU64,
    target: Gauge,
    current: Gauge,
    control_signal: Gauge,
}

impl PidMetrics {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            updates_total: AtomicU64::new(0),
            target: Gauge::default(),
            current: Gauge::default(),
            control_signal: Gauge::default(),
        }
    }

    /// The `name` label shared by all instruments of this set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of updates recorded so far.
    pub fn updates_total(&self) -> u64 {
        self.updates_total.load(Ordering::Relaxed)
    }

    /// Latest recorded target.
    pub fn target(&self) -> f64 {
        self.target.get()
    }

    /// Latest recorded measurement.
    pub fn current(&self) -> f64 {
        self.current.get()
    }

    /// Latest recorded control signal.
    pub fn control_signal(&self) -> f64 {
        self.control_signal.get()
    }

    /// Reads all instruments at once.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            name: self.name.clone(),
            updates_total: self.updates_total(),
            target: self.target(),
            current: self.current(),
            control_signal: self.control_signal(),
        }
    }
}

impl Telemetry for PidMetrics {
    fn record_update(&self, target: f64, current: f64, control_signal: f64) {
        self.updates_total.fetch_add(1, Ordering::Relaxed);
        self.target.set(target);
        self.current.set(current);
        self.control_signal.set(control_signal);
    }
}

/// Point-in-time values of a [`PidMetrics`] set.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricsSnapshot {
    /// Value of the `name` label
    pub name: String,
    /// Value of `pid_updates_total`
    pub updates_total: u64,
    /// Value of `pid_target`
    pub target: f64,
    /// Value of `pid_current`
    pub current: f64,
    /// Value of `pid_control_signal`
    pub control_signal: f64,
}

/// A registry of named instrument sets.
///
/// Registering a name that is already present returns the existing instruments instead of
/// failing. Registration takes a lock and is meant to happen once per controller at
/// construction, never per step.
#[derive(Debug, Default)]
pub struct Registry {
    metrics: Mutex<HashMap<String, Arc<PidMetrics>>>,
    capacity: Option<usize>,
}

impl Registry {
    /// Creates an unbounded registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry that rejects new names once `capacity` distinct names are held.
    /// Re-registering an existing name always succeeds.
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            metrics: Mutex::default(),
            capacity: Some(capacity),
        }
    }

    /// Registers the instrument set for `name`, or returns the one already registered.
    pub fn register(&self, name: &str) -> Result<Arc<PidMetrics>, PidError> {
        if name.is_empty() {
            return Err(PidError::EmptyMetricsName);
        }

        let mut metrics = self.metrics.lock();
        if let Some(existing) = metrics.get(name) {
            debug!(name, "reusing registered PID metrics");
            return Ok(Arc::clone(existing));
        }

        if let Some(capacity) = self.capacity {
            if metrics.len() >= capacity {
                return Err(PidError::RegistryFull { capacity });
            }
        }

        let registered = Arc::new(PidMetrics::new(name));
        metrics.insert(name.to_string(), Arc::clone(&registered));
        debug!(name, "registered PID metrics");
        Ok(registered)
    }

    /// Looks up the instrument set registered under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<PidMetrics>> {
        self.metrics.lock().get(name).cloned()
    }

    /// Number of distinct names registered.
    pub fn len(&self) -> usize {
        self.metrics.lock().len()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshots every registered instrument set, sorted by name.
    pub fn gather(&self) -> Vec<MetricsSnapshot> {
        let mut snapshots: Vec<_> = self
            .metrics
            .lock()
            .values()
            .map(|metrics| metrics.snapshot())
            .collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }
}
