//! Property tests for the sample window, outlier filter and timers

use proptest::prelude::*;

use wiretemp_core::time::{elapsed, IntervalTimer};
use wiretemp_core::units::celsius_to_fahrenheit;
use wiretemp_core::validators::OutlierFilter;
use wiretemp_core::{Diagnostics, SampleWindow};

proptest! {
    #[test]
    fn window_holds_most_recent_in_order(readings in prop::collection::vec(-55.0f32..125.0, 0..40)) {
        let mut window: SampleWindow<3> = SampleWindow::new();
        for r in &readings {
            window.insert(*r);
        }

        let expected: Vec<f32> = readings.iter().rev().take(3).rev().copied().collect();
        let held: Vec<f32> = window.iter().collect();

        prop_assert!(window.len() <= window.capacity());
        prop_assert_eq!(held, expected);
        prop_assert_eq!(window.latest(), readings.last().copied());
    }

    #[test]
    fn statistics_bounded_by_extremes(readings in prop::collection::vec(-55.0f32..125.0, 1..20)) {
        let mut window: SampleWindow<3> = SampleWindow::new();
        for r in &readings {
            window.insert(*r);
        }

        let min = window.min().unwrap();
        let max = window.max().unwrap();
        let avg = window.average().unwrap();

        prop_assert!(min <= max);
        prop_assert!(avg >= min - 1e-3 && avg <= max + 1e-3);
    }

    #[test]
    fn filter_admits_exactly_the_plausible_range(value in -200.0f32..200.0) {
        let filter = OutlierFilter::default();
        let mut diagnostics = Diagnostics::default();

        let admitted = filter.admit(value, &mut diagnostics);

        prop_assert_eq!(admitted, (-55.0..=125.0).contains(&value));
        prop_assert_eq!(diagnostics.invalid_readings, u32::from(!admitted));
    }

    #[test]
    fn fahrenheit_is_affine(c in -55.0f32..125.0) {
        let f = celsius_to_fahrenheit(c);
        prop_assert!((f - (c * 1.8 + 32.0)).abs() < 1e-3);
    }

    #[test]
    fn elapsed_is_wrap_safe(mark in any::<u32>(), delta in any::<u32>()) {
        prop_assert_eq!(elapsed(mark.wrapping_add(delta), mark), delta);
    }

    #[test]
    fn timer_due_exactly_after_interval(mark in any::<u32>(), interval in 1u32..100_000, delta in 0u32..200_000) {
        let mut timer = IntervalTimer::new(interval);
        timer.mark(mark);
        prop_assert_eq!(timer.is_due(mark.wrapping_add(delta)), delta >= interval);
    }
}
