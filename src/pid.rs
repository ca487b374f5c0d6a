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

use core::time::Duration;

use num_traits::Float;
use tracing::{debug, trace};

#[cfg(feature = "std")]
use std::sync::Arc;

use crate::error::PidError;
use crate::limit::Limit;
#[cfg(feature = "std")]
use crate::telemetry::{Registry, Telemetry};

/// Converts a literal into the controller's float type.
fn lit<F: Float>(value: f64) -> F {
    F::from(value).unwrap_or_else(F::nan)
}

fn to_f64<F: Float>(value: F) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// A single configuration step of a [`PidConfigBuilder`].
///
/// Options are plain values, so reusable bundles can be kept in arrays or slices and applied
/// with [`PidConfigBuilder::options`]. Options are applied in order; a later option overwrites
/// whatever an earlier one set for the same field.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PidOption<F: Float> {
    /// Sets the proportional gain (Kp)
    ProportionalGain(F),
    /// Sets the integral gain (Ki)
    IntegralGain(F),
    /// Sets the derivative gain (Kd)
    DerivativeGain(F),
    /// Derives gains and filters from the standard (ideal) PID form
    StandardForm {
        /// Proportional gain Kp
        proportional_gain: F,
        /// Integral time constant Ti, so that Ki = Kp / Ti
        integral_time: F,
        /// Derivative time constant Td, so that Kd = Kp * Td
        derivative_time: F,
    },
    /// Derives the standard form from the Ziegler-Nichols ultimate gain and oscillation period
    ZieglerNichols {
        /// Gain at which the closed loop oscillates with constant amplitude
        ultimate_gain: F,
        /// Period of that oscillation, in seconds
        oscillation_period: F,
    },
    /// Sets the time constant of the low-pass filter on the error; zero disables it
    ErrorFilter(F),
    /// Sets the time constant of the low-pass filter on the derivative; zero disables it
    DerivativeFilter(F),
    /// Bounds the control signal to `[lower, upper]`
    OutputLimit(F, F),
    /// Selects trapezoidal (`true`) or rectangular (`false`) integration
    TrapezoidalIntegral(bool),
}

/// The fixed configuration of a [`PidController`].
///
/// Obtained from [`PidConfigBuilder`]; the integral limit is derived from the output limit and
/// the integral gain when the configuration is finalized and never changes afterwards.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidConfig<F: Float> {
    proportional_gain: F,
    integral_gain: F,
    derivative_gain: F,
    error_filter_tc: F,
    derivative_filter_tc: F,
    output_limit: Limit<F>,
    integral_limit: Limit<F>,
    use_trapezoidal_integral: bool,
}

impl<F: Float> Default for PidConfig<F> {
    fn default() -> Self {
        PidConfigBuilder::default().config()
    }
}

impl<F: Float> PidConfig<F> {
    /// Returns the proportional gain.
    pub fn proportional_gain(&self) -> F {
        self.proportional_gain
    }

    /// Returns the integral gain.
    pub fn integral_gain(&self) -> F {
        self.integral_gain
    }

    /// Returns the derivative gain.
    pub fn derivative_gain(&self) -> F {
        self.derivative_gain
    }

    /// Convenience method that returns the proportional, integral, and derivative gains together as a tuple.
    pub fn gains(&self) -> (F, F, F) {
        (
            self.proportional_gain,
            self.integral_gain,
            self.derivative_gain,
        )
    }

    /// Returns the time constant of the low-pass filter applied to the error.
    pub fn error_filter_tc(&self) -> F {
        self.error_filter_tc
    }

    /// Returns the time constant of the low-pass filter applied to the derivative term.
    pub fn derivative_filter_tc(&self) -> F {
        self.derivative_filter_tc
    }

    /// Returns the bounds of the control signal.
    pub fn output_limit(&self) -> Limit<F> {
        self.output_limit
    }

    /// Returns the bounds of the integral accumulator.
    pub fn integral_limit(&self) -> Limit<F> {
        self.integral_limit
    }

    /// Returns whether the integral term uses the trapezoidal rule.
    pub fn use_trapezoidal_integral(&self) -> bool {
        self.use_trapezoidal_integral
    }
}

/// Builder for [`PidController`].
///
/// Every setter is applied immediately, in call order. Derived quantities (the integral limit)
/// are computed by [`build`](Self::build), so the order in which the output limit and the
/// integral gain are set does not matter for anti-windup.
///
/// ```rust
/// use feedback_pid::pid::PidConfigBuilder;
///
/// let pid = PidConfigBuilder::<f64>::default()
///     .ziegler_nichols(1.7, 2.0)
///     .trapezoidal_integral(true)
///     .output_limit(0.0, 20.0)
///     .build()
///     .expect("no telemetry attached, cannot fail");
/// assert_eq!(pid.config().integral_gain(), 1.02);
/// ```
#[derive(Clone, Debug)]
pub struct PidConfigBuilder<F: Float> {
    proportional_gain: F,
    integral_gain: F,
    derivative_gain: F,
    error_filter_tc: F,
    derivative_filter_tc: F,
    output_limit: Limit<F>,
    use_trapezoidal_integral: bool,

    // First failure reported by an option, surfaced by `build`
    error: Option<PidError>,

    #[cfg(feature = "std")]
    telemetry: Option<Arc<dyn Telemetry>>,
}

impl<F: Float> Default for PidConfigBuilder<F> {
    fn default() -> Self {
        Self {
            proportional_gain: F::one(),
            integral_gain: F::zero(),
            derivative_gain: F::zero(),
            error_filter_tc: F::zero(),
            derivative_filter_tc: F::zero(),
            output_limit: Limit::unbounded(),
            use_trapezoidal_integral: false,
            error: None,
            #[cfg(feature = "std")]
            telemetry: None,
        }
    }
}

impl<F: Float> PidConfigBuilder<F> {
    /// Sets the proportional gain.
    pub fn proportional_gain(self, proportional_gain: F) -> Self {
        self.option(PidOption::ProportionalGain(proportional_gain))
    }

    /// Sets the integral gain.
    ///
    /// Zero disables the integral term's contribution; negative values are accepted but leave
    /// the integrator without an anti-windup bound.
    pub fn integral_gain(self, integral_gain: F) -> Self {
        self.option(PidOption::IntegralGain(integral_gain))
    }

    /// Sets the derivative gain.
    pub fn derivative_gain(self, derivative_gain: F) -> Self {
        self.option(PidOption::DerivativeGain(derivative_gain))
    }

    /// Configures the controller using the standard PID form.
    ///
    /// Sets `Ki = Kp / Ti` and `Kd = Kp * Td`, and enables the derivative and error filters
    /// with time constants `Td / 8` and `Td / 64`.
    pub fn standard_form(self, proportional_gain: F, integral_time: F, derivative_time: F) -> Self {
        self.option(PidOption::StandardForm {
            proportional_gain,
            integral_time,
            derivative_time,
        })
    }

    /// Configures gains using the Ziegler-Nichols tuning rule, i.e. the standard form with
    /// `Kp = 0.6 Ku`, `Ti = Tu / 2` and `Td = Tu / 8`.
    pub fn ziegler_nichols(self, ultimate_gain: F, oscillation_period: F) -> Self {
        self.option(PidOption::ZieglerNichols {
            ultimate_gain,
            oscillation_period,
        })
    }

    /// Sets the time constant of the low-pass filter applied to the error.
    ///
    /// A large value results in a slow response and more smoothing. Zero disables the filter.
    pub fn error_filter_tc(self, error_filter_tc: F) -> Self {
        self.option(PidOption::ErrorFilter(error_filter_tc))
    }

    /// Sets the time constant of the low-pass filter applied to the derivative term.
    pub fn derivative_filter_tc(self, derivative_filter_tc: F) -> Self {
        self.option(PidOption::DerivativeFilter(derivative_filter_tc))
    }

    /// Bounds the control signal. The bounds may be infinite and are not validated.
    pub fn output_limit(self, lower: F, upper: F) -> Self {
        self.option(PidOption::OutputLimit(lower, upper))
    }

    /// Selects the trapezoidal rule for the integral term instead of the rectangular (Euler)
    /// rule. The trapezoidal rule is more accurate at slow sampling rates.
    pub fn trapezoidal_integral(self, enabled: bool) -> Self {
        self.option(PidOption::TrapezoidalIntegral(enabled))
    }

    /// Applies a single option.
    pub fn option(mut self, option: PidOption<F>) -> Self {
        self.apply(option);
        self
    }

    /// Applies a bundle of options in order.
    pub fn options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = PidOption<F>>,
    {
        for option in options {
            self.apply(option);
        }
        self
    }

    /// Registers telemetry instruments under `name` in `registry` and reports every update to
    /// them. Registering a name twice shares the instruments. Any other registration failure
    /// makes [`build`](Self::build) fail.
    #[cfg(feature = "std")]
    pub fn telemetry(mut self, name: &str, registry: &Registry) -> Self {
        match registry.register(name) {
            Ok(metrics) => self.telemetry = Some(metrics),
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
        self
    }

    /// Reports every update to an arbitrary sink.
    #[cfg(feature = "std")]
    pub fn telemetry_sink(mut self, sink: Arc<dyn Telemetry>) -> Self {
        self.telemetry = Some(sink);
        self
    }

    /// Finalizes the configuration and creates a controller with zeroed state.
    pub fn build(self) -> Result<PidController<F>, PidError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let config = self.config();
        debug!(
            kp = to_f64(config.proportional_gain),
            ki = to_f64(config.integral_gain),
            kd = to_f64(config.derivative_gain),
            output_min = to_f64(config.output_limit.lower()),
            output_max = to_f64(config.output_limit.upper()),
            trapezoidal = config.use_trapezoidal_integral,
            "built PID controller"
        );

        Ok(PidController {
            config,
            ctx: PidContext::default(),
            #[cfg(feature = "std")]
            telemetry: self.telemetry,
        })
    }

    fn apply(&mut self, option: PidOption<F>) {
        match option {
            PidOption::ProportionalGain(kp) => self.proportional_gain = kp,
            PidOption::IntegralGain(ki) => self.integral_gain = ki,
            PidOption::DerivativeGain(kd) => self.derivative_gain = kd,
            PidOption::StandardForm {
                proportional_gain,
                integral_time,
                derivative_time,
            } => {
                self.proportional_gain = proportional_gain;
                self.integral_gain = proportional_gain / integral_time;
                self.derivative_gain = proportional_gain * derivative_time;
                self.derivative_filter_tc = derivative_time / lit(8.0);
                self.error_filter_tc = derivative_time / lit(64.0);
            }
            PidOption::ZieglerNichols {
                ultimate_gain,
                oscillation_period,
            } => self.apply(PidOption::StandardForm {
                proportional_gain: lit::<F>(0.6) * ultimate_gain,
                integral_time: oscillation_period / lit(2.0),
                derivative_time: oscillation_period / lit(8.0),
            }),
            PidOption::ErrorFilter(tc) => self.error_filter_tc = tc,
            PidOption::DerivativeFilter(tc) => self.derivative_filter_tc = tc,
            PidOption::OutputLimit(lower, upper) => self.output_limit = Limit::new(lower, upper),
            PidOption::TrapezoidalIntegral(enabled) => self.use_trapezoidal_integral = enabled,
        }
    }

    fn config(&self) -> PidConfig<F> {
        // Bound the accumulator so that even when saturated, Ki * integral stays inside the
        // output limit. A zero or negative Ki leaves nothing meaningful to bound.
        let integral_limit = if self.integral_gain > F::zero() {
            Limit::new(
                self.output_limit.lower() / self.integral_gain,
                self.output_limit.upper() / self.integral_gain,
            )
        } else {
            Limit::unbounded()
        };

        PidConfig {
            proportional_gain: self.proportional_gain,
            integral_gain: self.integral_gain,
            derivative_gain: self.derivative_gain,
            error_filter_tc: self.error_filter_tc,
            derivative_filter_tc: self.derivative_filter_tc,
            output_limit: self.output_limit,
            integral_limit,
            use_trapezoidal_integral: self.use_trapezoidal_integral,
        }
    }
}

/// The step memory of a [`PidController`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidContext<F: Float> {
    previous_error: F,
    integral: F,
    derivative: F,
    last_output: F,
}

impl<F: Float> Default for PidContext<F> {
    fn default() -> Self {
        Self {
            previous_error: F::zero(),
            integral: F::zero(),
            derivative: F::zero(),
            last_output: F::zero(),
        }
    }
}

impl<F: Float> PidContext<F> {
    /// The (filtered) error of the last step.
    pub fn error(&self) -> F {
        self.previous_error
    }

    /// The integral accumulator, always within the configured integral limit.
    pub fn integral(&self) -> F {
        self.integral
    }

    /// The last (filtered) derivative estimate.
    pub fn derivative(&self) -> F {
        self.derivative
    }

    /// The last control signal returned.
    pub fn output(&self) -> F {
        self.last_output
    }
}

/// A discrete-time PID controller.
///
/// Call [`update`](Self::update) once per control loop iteration with the time elapsed since
/// the previous call. The controller does not model the plant; feed back whatever measurement
/// results from applying the returned signal.
///
/// ```rust
/// use std::time::Duration;
/// use feedback_pid::pid::PidConfigBuilder;
///
/// let mut pid = PidConfigBuilder::default()
///     .proportional_gain(1.5)
///     .output_limit(-3.0, 3.0)
///     .build()
///     .unwrap();
///
/// // 1.5 * (10 - 7) = 4.5, saturated to 3
/// assert_eq!(pid.update(10.0, 7.0, Duration::from_secs(1)), 3.0);
/// ```
#[derive(Clone, Debug)]
pub struct PidController<F: Float = f64> {
    config: PidConfig<F>,
    ctx: PidContext<F>,

    #[cfg(feature = "std")]
    telemetry: Option<Arc<dyn Telemetry>>,
}

impl<F: Float> PidController<F> {
    /// Creates a controller with zeroed state and no telemetry.
    pub fn new(config: PidConfig<F>) -> Self {
        Self {
            config,
            ctx: PidContext::default(),
            #[cfg(feature = "std")]
            telemetry: None,
        }
    }

    /// Returns the controller's configuration.
    pub fn config(&self) -> &PidConfig<F> {
        &self.config
    }

    /// Returns the controller's step memory.
    pub fn context(&self) -> &PidContext<F> {
        &self.ctx
    }

    /// The last control signal returned.
    pub fn output(&self) -> F {
        self.ctx.last_output
    }

    /// Clears the step memory, as if the controller had just been built.
    ///
    /// Gains cannot be changed in place; to re-tune, build a new controller.
    pub fn reset(&mut self) {
        self.ctx = PidContext::default();
    }

    /// Computes the next control signal.
    ///
    /// A zero `delta` means no time has elapsed since the previous call: the state is left
    /// untouched and the previous control signal is returned.
    pub fn update(&mut self, target: F, current: F, delta: Duration) -> F {
        let output = if delta.is_zero() {
            trace!("zero time step, holding previous control signal");
            self.ctx.last_output
        } else {
            self.step(target, current, lit(delta.as_secs_f64()))
        };

        self.report(target, current, output);
        output
    }

    fn step(&mut self, target: F, current: F, step: F) -> F {
        let error = self.filter_error(target - current, step);

        self.ctx.integral = self
            .config
            .integral_limit
            .clamp(self.accumulate_integral(error, step));
        self.ctx.derivative = self.estimate_derivative(error, step);

        // Both the integral and the derivative need the error of the previous step
        self.ctx.previous_error = error;

        let output = self.config.proportional_gain * error
            + self.config.integral_gain * self.ctx.integral
            + self.config.derivative_gain * self.ctx.derivative;

        self.ctx.last_output = self.config.output_limit.clamp(output);
        self.ctx.last_output
    }

    /// Single-pole low-pass filter over the raw error and the previous filtered error.
    fn filter_error(&self, error: F, step: F) -> F {
        let tc = self.config.error_filter_tc;
        if tc == F::zero() {
            return error;
        }
        (error * step + self.ctx.previous_error * tc) / (tc + step)
    }

    fn accumulate_integral(&self, error: F, step: F) -> F {
        if self.config.use_trapezoidal_integral {
            self.ctx.integral + step * (error + self.ctx.previous_error) / lit(2.0)
        } else {
            self.ctx.integral + error * step
        }
    }

    fn estimate_derivative(&self, error: F, step: F) -> F {
        let difference = error - self.ctx.previous_error;
        let tc = self.config.derivative_filter_tc;
        if tc == F::zero() {
            difference / step
        } else {
            (difference + tc * self.ctx.derivative) / (step + tc)
        }
    }

    #[cfg(feature = "std")]
    fn report(&self, target: F, current: F, output: F) {
        if let Some(telemetry) = &self.telemetry {
            telemetry.record_update(to_f64(target), to_f64(current), to_f64(output));
        }
    }

    #[cfg(not(feature = "std"))]
    fn report(&self, _target: F, _current: F, _output: F) {}
}
