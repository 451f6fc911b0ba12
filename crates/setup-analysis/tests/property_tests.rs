//! Property-based tests for problem aggregation.
//!
//! Verifies severity clamping, determinism of re-analysis, and phase
//! classification totality over arbitrary telemetry.

use paddock_setup_analysis::{coarse_phases, detect_problems, phase_behavior};
use paddock_telemetry_core::{TelemetrySample, VehicleClass, WheelSet};
use proptest::prelude::*;

const LOCK: f32 = 450.0;

fn arbitrary_sample() -> impl Strategy<Value = TelemetrySample> {
    (
        0.0f32..350.0,     // speed
        0.0f32..100.0,     // throttle
        0.0f32..100.0,     // brake
        -450.0f32..450.0,  // steering
        -0.5f32..0.5,      // slip ratio, per axle
        -0.5f32..0.5,
        0.0f32..150.0,     // tire temp
        0.0f32..900.0,     // brake temp
        0.0f32..80.0,      // ride height
    )
        .prop_map(
            |(speed, throttle, brake, steering, front_slip, rear_slip, temp, brake_temp, height)| {
                TelemetrySample {
                    speed,
                    throttle,
                    brake,
                    steering,
                    slip_ratio: WheelSet {
                        fl: front_slip,
                        fr: front_slip,
                        rl: rear_slip,
                        rr: rear_slip,
                    },
                    tire_temp: WheelSet::splat(temp),
                    brake_temp: WheelSet::splat(brake_temp),
                    ride_height: WheelSet::splat(height),
                    grip: WheelSet::splat(1.0),
                    ..Default::default()
                }
            },
        )
}

fn vehicle_class() -> impl Strategy<Value = VehicleClass> {
    prop_oneof![
        Just(VehicleClass::Gt3),
        Just(VehicleClass::Lmp2),
        Just(VehicleClass::Lmh),
    ]
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    /// Every emitted severity sits in 0.0..=1.0 no matter how wild the input.
    #[test]
    fn prop_severities_stay_clamped(
        samples in proptest::collection::vec(arbitrary_sample(), 0..300),
        class in vehicle_class(),
    ) {
        let phases = coarse_phases(&samples, LOCK);
        let problems = detect_problems(&samples, &phases, class, LOCK);
        for (problem, severity) in problems.iter() {
            prop_assert!(
                (0.0..=1.0).contains(&severity),
                "{problem} severity {severity} out of range"
            );
        }
    }

    /// Re-analyzing an identical sample sequence is bit-identical.
    #[test]
    fn prop_analysis_is_deterministic(
        samples in proptest::collection::vec(arbitrary_sample(), 0..300),
        class in vehicle_class(),
    ) {
        let phases_a = coarse_phases(&samples, LOCK);
        let phases_b = coarse_phases(&samples, LOCK);
        prop_assert_eq!(&phases_a, &phases_b);
        let problems_a = detect_problems(&samples, &phases_a, class, LOCK);
        let problems_b = detect_problems(&samples, &phases_b, class, LOCK);
        prop_assert_eq!(problems_a, problems_b);
    }

    /// Balance ratios per phase bucket always sum to one.
    #[test]
    fn prop_phase_ratios_sum_to_one(
        samples in proptest::collection::vec(arbitrary_sample(), 0..300),
    ) {
        let phases = coarse_phases(&samples, LOCK);
        for (_, behavior) in phase_behavior(&samples, &phases) {
            let total = behavior.understeer + behavior.oversteer + behavior.neutral;
            prop_assert!((total - 1.0).abs() < 1e-5, "ratios sum to {total}");
        }
    }

    /// Phase classification covers every sample exactly once.
    #[test]
    fn prop_every_sample_gets_a_phase(
        samples in proptest::collection::vec(arbitrary_sample(), 0..300),
    ) {
        let phases = coarse_phases(&samples, LOCK);
        prop_assert_eq!(phases.len(), samples.len());
    }
}
