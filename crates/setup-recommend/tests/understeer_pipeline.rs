//! End-to-end check: entry understeer in raw telemetry comes out the far end
//! as a front anti-roll-bar recommendation.

use paddock_setup_analysis::{coarse_phases, detect_problems};
use paddock_setup_recommend::RecommendationEngine;
use paddock_telemetry_core::{
    Adjustment, CarSetup, Problem, TelemetrySample, VehicleClass, WheelSet,
};

const LOCK: f32 = 450.0;

fn cruising_sample() -> TelemetrySample {
    TelemetrySample {
        speed: 150.0,
        throttle: 80.0,
        tire_temp: WheelSet::splat(85.0),
        grip: WheelSet::splat(1.0),
        ride_height: WheelSet::splat(50.0),
        ..Default::default()
    }
}

/// Corner-entry sample whose front axle slips 0.02 more than the rear,
/// clearing the 0.015 understeer margin.
fn pushing_entry_sample() -> TelemetrySample {
    TelemetrySample {
        throttle: 0.0,
        brake: 40.0,
        steering: 90.0,
        slip_ratio: WheelSet {
            fl: 0.05,
            fr: 0.05,
            rl: 0.03,
            rr: 0.03,
        },
        ..cruising_sample()
    }
}

#[test]
fn entry_understeer_yields_front_arb_recommendation() {
    let mut samples = vec![cruising_sample(); 100];
    samples.extend(vec![pushing_entry_sample(); 150]);

    let phases = coarse_phases(&samples, LOCK);
    let problems = detect_problems(&samples, &phases, VehicleClass::Gt3, LOCK);
    assert_eq!(problems.get(Problem::UndersteerEntry), Some(1.0));

    let engine = RecommendationEngine::default();
    let recommendations = engine.generate(&problems, None);
    assert!(!recommendations.is_empty());

    let top = recommendations.first().unwrap();
    assert!(top.parameter == "front_arb" || top.parameter == "front_spring");
    // Negative effect weight: stiffening the front end cuts entry push.
    assert_eq!(top.adjustment, Adjustment::Increase);
    assert_eq!(top.priority, 10);
    assert_eq!(top.addresses, vec![Problem::UndersteerEntry]);
}

#[test]
fn clean_telemetry_produces_no_recommendations() {
    let samples = vec![cruising_sample(); 250];
    let phases = coarse_phases(&samples, LOCK);
    let problems = detect_problems(&samples, &phases, VehicleClass::Gt3, LOCK);
    assert!(problems.is_empty());

    let engine = RecommendationEngine::default();
    let setup = CarSetup::default();
    assert!(engine.generate(&problems, Some(&setup)).is_empty());
}
