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


#[cfg(feature = "std")]
mod test_telemetry {
    use super::fixtures::test_pid::ONE_SECOND;

    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use feedback_pid::error::PidError;
    use feedback_pid::pid::PidConfigBuilder;
    use feedback_pid::telemetry::{
        MetricsSnapshot, Registry, Telemetry, CONTROL_SIGNAL, CURRENT, TARGET, UPDATES_TOTAL,
    };

    #[test]
    fn test_update_is_recorded() {
        let registry = Registry::new();
        let mut pid = PidConfigBuilder::default()
            .telemetry("oven", &registry)
            .build()
            .unwrap();

        let output = pid.update(5.0, 2.0, ONE_SECOND);
        let metrics = registry.get("oven").expect("registered by the builder");
        assert_eq!(metrics.name(), "oven");
        assert_eq!(metrics.updates_total(), 1);
        assert_eq!(metrics.target(), 5.0);
        assert_eq!(metrics.current(), 2.0);
        assert_eq!(metrics.control_signal(), output);

        pid.update(5.0, 1.0, ONE_SECOND);
        assert_eq!(metrics.updates_total(), 2);
        assert_eq!(metrics.current(), 1.0);
        assert_eq!(metrics.control_signal(), 4.0);
    }

    #[test]
    fn test_held_updates_are_recorded() {
        let registry = Registry::new();
        let mut pid = PidConfigBuilder::default()
            .telemetry("held", &registry)
            .build()
            .unwrap();

        let output = pid.update(5.0, 2.0, ONE_SECOND);
        let held = pid.update(50.0, 2.0, Duration::ZERO);
        assert_eq!(held, output);

        let metrics = registry.get("held").unwrap();
        assert_eq!(metrics.updates_total(), 2);
        assert_eq!(metrics.target(), 50.0);
        assert_eq!(metrics.control_signal(), output);
    }

    #[test]
    fn test_telemetry_does_not_alter_output() {
        let registry = Registry::new();
        let builder = PidConfigBuilder::default()
            .standard_form(2.0, 0.5, 0.1)
            .output_limit(-4.0, 4.0);

        let mut observed = builder.clone().telemetry("observed", &registry).build().unwrap();
        let mut plain = builder.build().unwrap();

        for i in 0..100 {
            let current = (i as f64 * 0.2).cos();
            let step = Duration::from_millis(20);
            assert_eq!(
                observed.update(1.0, current, step),
                plain.update(1.0, current, step)
            );
        }
        assert_eq!(registry.get("observed").unwrap().updates_total(), 100);
    }

    #[test]
    fn test_registration_is_idempotent() {
        let registry = Registry::new();

        let first = registry.register("shared").unwrap();
        let second = registry.register("shared").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);

        // Two controllers with the same name share their instruments
        let mut a = PidConfigBuilder::default()
            .telemetry("shared", &registry)
            .build()
            .unwrap();
        let mut b = PidConfigBuilder::default()
            .telemetry("shared", &registry)
            .build()
            .unwrap();
        a.update(1.0, 0.0, ONE_SECOND);
        b.update(3.0, 0.0, ONE_SECOND);

        assert_eq!(first.updates_total(), 2);
        assert_eq!(first.target(), 3.0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_name_fails_construction() {
        let registry = Registry::new();
        let result = PidConfigBuilder::<f64>::default()
            .telemetry("", &registry)
            .build();

        assert_eq!(result.map(|_| ()), Err(PidError::EmptyMetricsName));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_full_registry_fails_construction() {
        let registry = Registry::with_capacity_limit(1);
        assert!(PidConfigBuilder::<f64>::default()
            .telemetry("first", &registry)
            .build()
            .is_ok());

        let result = PidConfigBuilder::<f64>::default()
            .telemetry("second", &registry)
            .build();
        assert_eq!(
            result.map(|_| ()),
            Err(PidError::RegistryFull { capacity: 1 })
        );

        // Re-registering an existing name is not a new registration
        assert!(PidConfigBuilder::<f64>::default()
            .telemetry("first", &registry)
            .build()
            .is_ok());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_first_failure_is_kept() {
        let registry = Registry::new();
        let result = PidConfigBuilder::<f64>::default()
            .telemetry("", &registry)
            .telemetry("valid", &registry)
            .build();

        assert_eq!(result.map(|_| ()), Err(PidError::EmptyMetricsName));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PidError::EmptyMetricsName.to_string(),
            "telemetry instruments require a non-empty name"
        );
        assert_eq!(
            PidError::RegistryFull { capacity: 3 }.to_string(),
            "telemetry registry is full (3 names registered)"
        );
    }

    #[test]
    fn test_gather_is_sorted_by_name() {
        let registry = Registry::new();
        let mut zeta = PidConfigBuilder::default()
            .telemetry("zeta", &registry)
            .build()
            .unwrap();
        let _alpha = PidConfigBuilder::<f64>::default()
            .telemetry("alpha", &registry)
            .build()
            .unwrap();

        zeta.update(2.0, 0.5, ONE_SECOND);

        assert_eq!(
            registry.gather(),
            vec![
                MetricsSnapshot {
                    name: "alpha".to_string(),
                    updates_total: 0,
                    target: 0.0,
                    current: 0.0,
                    control_signal: 0.0,
                },
                MetricsSnapshot {
                    name: "zeta".to_string(),
                    updates_total: 1,
                    target: 2.0,
                    current: 0.5,
                    control_signal: 1.5,
                },
            ]
        );
    }

    #[test]
    fn test_instrument_names() {
        assert_eq!(
            [UPDATES_TOTAL, TARGET, CURRENT, CONTROL_SIGNAL],
            [
                "pid_updates_total",
                "pid_target",
                "pid_current",
                "pid_control_signal"
            ]
        );
    }

    #[derive(Debug, Default)]
    struct CountingSink(AtomicU64);

    impl Telemetry for CountingSink {
        fn record_update(&self, _target: f64, _current: f64, _control_signal: f64) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_custom_sink() {
        let sink = Arc::new(CountingSink::default());
        let mut pid = PidConfigBuilder::<f32>::default()
            .telemetry_sink(sink.clone())
            .build()
            .unwrap();

        for _ in 0..3 {
            pid.update(1.0, 0.0, ONE_SECOND);
        }
        assert_eq!(sink.0.load(Ordering::Relaxed), 3);
    }
}
