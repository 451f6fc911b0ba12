//! Session-level problem aggregation over one lap of samples.
//!
//! Severities here are normalized to `0.0..=1.0`. Three sources feed the map:
//! phase-bucketed balance ratios, thermal excursions against the vehicle
//! class operating ranges, and mechanical signatures (wheelspin, lockup,
//! straight-line instability, roll, bottoming).

use paddock_setup_knowledge::OperatingRanges;
use paddock_telemetry_core::{DrivePhase, Problem, ProblemMap, TelemetrySample, VehicleClass};
use serde::{Deserialize, Serialize};

use crate::phase::classify_drive_phase;

/// Balance ratios for one coarse phase bucket. The three fields sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseBehavior {
    pub understeer: f32,
    pub oversteer: f32,
    pub neutral: f32,
}

impl Default for PhaseBehavior {
    /// A bucket with too few samples to judge.
    fn default() -> Self {
        Self {
            understeer: 0.0,
            oversteer: 0.0,
            neutral: 1.0,
        }
    }
}

/// Coarse-classify every sample, normalizing raw pedal and steering values.
pub fn coarse_phases(samples: &[TelemetrySample], steering_lock_deg: f32) -> Vec<DrivePhase> {
    samples
        .iter()
        .map(|s| {
            classify_drive_phase(
                s.throttle / 100.0,
                s.brake / 100.0,
                s.steering.abs() / steering_lock_deg,
            )
        })
        .collect()
}

/// Balance ratios per cornering phase (Entry, Mid, Exit, in that order).
///
/// A bucket with fewer than 10 samples carries no signal and stays neutral.
/// Per sample: understeer when the front axle has less grip than the rear
/// (margin 0.03) or slips more (margin 0.015); oversteer mirrored.
pub fn phase_behavior(
    samples: &[TelemetrySample],
    phases: &[DrivePhase],
) -> [(DrivePhase, PhaseBehavior); 3] {
    DrivePhase::CORNERING.map(|phase| {
        let bucket: Vec<&TelemetrySample> = samples
            .iter()
            .zip(phases)
            .filter(|(_, p)| **p == phase)
            .map(|(s, _)| s)
            .collect();

        if bucket.len() < 10 {
            return (phase, PhaseBehavior::default());
        }

        let mut under = 0usize;
        let mut over = 0usize;
        for s in &bucket {
            let front_grip = s.front_grip();
            let rear_grip = s.rear_grip();
            let front_slip = s.front_slip_ratio();
            let rear_slip = s.rear_slip_ratio();

            if front_grip < rear_grip - 0.03 || front_slip > rear_slip + 0.015 {
                under += 1;
            } else if rear_grip < front_grip - 0.03 || rear_slip > front_slip + 0.015 {
                over += 1;
            }
        }

        let total = bucket.len() as f32;
        let understeer = under as f32 / total;
        let oversteer = over as f32 / total;
        (
            phase,
            PhaseBehavior {
                understeer,
                oversteer,
                neutral: 1.0 - understeer - oversteer,
            },
        )
    })
}

/// Fraction of coarse Exit samples where the rear axle spins (mean rear
/// |slip ratio| above 0.08).
pub fn wheelspin_ratio(samples: &[TelemetrySample], phases: &[DrivePhase]) -> f32 {
    ratio_in_phases(samples, phases, &[DrivePhase::Exit], |s| {
        s.rear_slip_ratio() > 0.08
    })
}

/// Fraction of braking-phase samples with a locked wheel (any slip ratio
/// below -0.1).
pub fn lockup_ratio(samples: &[TelemetrySample], phases: &[DrivePhase]) -> f32 {
    ratio_in_phases(
        samples,
        phases,
        &[DrivePhase::Braking, DrivePhase::Entry],
        |s| s.slip_ratio.min() < -0.1,
    )
}

fn ratio_in_phases(
    samples: &[TelemetrySample],
    phases: &[DrivePhase],
    wanted: &[DrivePhase],
    predicate: impl Fn(&TelemetrySample) -> bool,
) -> f32 {
    let bucket: Vec<&TelemetrySample> = samples
        .iter()
        .zip(phases)
        .filter(|(_, p)| wanted.contains(p))
        .map(|(s, _)| s)
        .collect();
    if bucket.is_empty() {
        return 0.0;
    }
    let hits = bucket.iter().filter(|s| predicate(s)).count();
    hits as f32 / bucket.len() as f32
}

/// Straight-line stability from steering corrections above 180 km/h.
///
/// 1.0 is rock solid; fewer than 20 qualifying samples is treated as solid.
pub fn stability_score(
    samples: &[TelemetrySample],
    phases: &[DrivePhase],
    steering_lock_deg: f32,
) -> f32 {
    let corrections = high_speed_corrections(samples, phases, steering_lock_deg);
    match corrections {
        Some(mean) => (1.0 - mean * 8.0).max(0.0),
        None => 1.0,
    }
}

/// Mean steering fraction on fast straights, or `None` with too few samples.
fn high_speed_corrections(
    samples: &[TelemetrySample],
    phases: &[DrivePhase],
    steering_lock_deg: f32,
) -> Option<f32> {
    let high_speed: Vec<&TelemetrySample> = samples
        .iter()
        .zip(phases)
        .filter(|(s, p)| **p == DrivePhase::Straight && s.speed > 180.0)
        .map(|(s, _)| s)
        .collect();
    if high_speed.len() < 20 {
        return None;
    }
    let mean = high_speed
        .iter()
        .map(|s| s.steering.abs() / steering_lock_deg)
        .sum::<f32>()
        / high_speed.len() as f32;
    Some(mean)
}

/// Aggregate all session-level problems over one lap of samples.
pub fn detect_problems(
    samples: &[TelemetrySample],
    phases: &[DrivePhase],
    class: VehicleClass,
    steering_lock_deg: f32,
) -> ProblemMap {
    let mut problems = ProblemMap::new();
    if samples.is_empty() {
        return problems;
    }
    let ranges = OperatingRanges::for_class(class);

    // Balance by phase, against per-phase floors.
    let behavior = phase_behavior(samples, phases);
    let floors = [
        (Problem::UndersteerEntry, Problem::OversteerEntry, 0.35, 0.3),
        (Problem::UndersteerMid, Problem::OversteerMid, 0.4, 0.35),
        (Problem::UndersteerExit, Problem::OversteerExit, 0.35, 0.3),
    ];
    for ((_, ratios), (under_problem, over_problem, under_floor, over_floor)) in
        behavior.iter().zip(floors)
    {
        if ratios.understeer > under_floor {
            problems.insert(under_problem, ratios.understeer);
        }
        if ratios.oversteer > over_floor {
            problems.insert(over_problem, ratios.oversteer);
        }
    }

    // Tire temperatures against the class window.
    let n = samples.len() as f32;
    let front_temp = samples.iter().map(|s| s.tire_temp.front_avg()).sum::<f32>() / n;
    let rear_temp = samples.iter().map(|s| s.tire_temp.rear_avg()).sum::<f32>() / n;

    if front_temp > ranges.tire_temp.max {
        problems.insert(
            Problem::TireOverheatFront,
            (front_temp - ranges.tire_temp.max) / 10.0,
        );
    }
    if front_temp < ranges.tire_temp.min {
        problems.insert(
            Problem::TireColdFront,
            (ranges.tire_temp.min - front_temp) / 10.0,
        );
    }
    if rear_temp > ranges.tire_temp.max {
        problems.insert(
            Problem::TireOverheatRear,
            (rear_temp - ranges.tire_temp.max) / 10.0,
        );
    }
    if rear_temp < ranges.tire_temp.min {
        problems.insert(
            Problem::TireColdRear,
            (ranges.tire_temp.min - rear_temp) / 10.0,
        );
    }

    // Brake temperatures against the hard ceiling.
    let front_brake_max = samples
        .iter()
        .map(|s| s.brake_temp.front_max())
        .fold(0.0, f32::max);
    let rear_brake_max = samples
        .iter()
        .map(|s| s.brake_temp.rear_max())
        .fold(0.0, f32::max);
    if front_brake_max > ranges.brake_temp_max {
        problems.insert(
            Problem::BrakeOverheatFront,
            (front_brake_max - ranges.brake_temp_max) / 100.0,
        );
    }
    if rear_brake_max > ranges.brake_temp_max {
        problems.insert(
            Problem::BrakeOverheatRear,
            (rear_brake_max - ranges.brake_temp_max) / 100.0,
        );
    }

    // Traction and lockup.
    let wheelspin = wheelspin_ratio(samples, phases);
    if wheelspin > 0.1 {
        problems.insert(Problem::Wheelspin, wheelspin * 2.0);
        problems.insert(Problem::PoorTraction, wheelspin * 1.5);
    }
    let lockup = lockup_ratio(samples, phases);
    if lockup > 0.1 {
        problems.insert(Problem::WheelLock, lockup * 2.0);
    }

    // Straight-line stability.
    let stability = stability_score(samples, phases, steering_lock_deg);
    if stability < 0.7 {
        problems.insert(Problem::InstabilityHighSpeed, 1.0 - stability);
    }

    // Body roll, worst axle.
    let max_roll = samples
        .iter()
        .map(|s| s.front_roll().max(s.rear_roll()))
        .fold(0.0, f32::max);
    if max_roll > 12.0 {
        problems.insert(Problem::ExcessiveRoll, (max_roll - 12.0) / 10.0);
    }

    // Bottoming.
    let bottoming = samples
        .iter()
        .filter(|s| s.ride_height.min() < 5.0)
        .count() as f32
        / n;
    if bottoming > 0.05 {
        problems.insert(Problem::Bottoming, bottoming * 5.0);
    }

    problems
}
