//! Per-sample driving-phase classification.
//!
//! Two cascades, first match wins. The coarse cascade works on normalized
//! inputs (pedals 0-1, steering as fraction of full lock) and feeds the
//! streaming path; the fine cascade works on raw units (pedals 0-100,
//! steering in degrees) and feeds the corner path.

use paddock_telemetry_core::{CornerPhase, DrivePhase, TelemetrySample};

/// Coarse phase from normalized inputs.
///
/// `steering_frac` is the absolute steering position as a fraction of full
/// lock, `throttle` and `brake` are 0-1.
pub fn classify_drive_phase(throttle: f32, brake: f32, steering_frac: f32) -> DrivePhase {
    if brake > 0.8 && steering_frac < 0.05 {
        DrivePhase::Braking
    } else if brake > 0.15 && steering_frac > 0.03 {
        DrivePhase::Entry
    } else if throttle > 0.7 && steering_frac > 0.03 {
        DrivePhase::Exit
    } else if throttle > 0.9 && steering_frac < 0.03 {
        DrivePhase::Acceleration
    } else if steering_frac > 0.08 {
        DrivePhase::Mid
    } else {
        DrivePhase::Straight
    }
}

/// Fine corner phase from raw units.
///
/// `prev` is the preceding sample of the lap, used to detect an increasing
/// steering angle for turn-in.
pub fn classify_corner_phase(
    sample: &TelemetrySample,
    prev: Option<&TelemetrySample>,
) -> CornerPhase {
    let throttle = sample.throttle;
    let brake = sample.brake;
    let steering = sample.steering.abs();
    let g_lat = sample.g_lat.abs();
    let g_long = sample.g_long;

    if brake > 50.0 && g_long < -0.5 {
        return CornerPhase::BrakeZone;
    }
    if brake > 10.0 && brake <= 50.0 && steering > 10.0 {
        return CornerPhase::TrailBrake;
    }
    if steering > 20.0 && throttle < 30.0 && brake < 30.0 {
        if let Some(prev) = prev {
            if steering - prev.steering.abs() > 2.0 {
                return CornerPhase::TurnIn;
            }
        }
    }
    if g_lat > 0.8 && throttle < 50.0 && brake < 10.0 {
        return CornerPhase::Apex;
    }
    if g_lat > 0.5 && steering > 15.0 {
        return CornerPhase::MidCorner;
    }
    if throttle > 30.0 && steering > 10.0 && g_long > 0.0 {
        return CornerPhase::Exit;
    }
    if throttle > 80.0 && steering < 10.0 {
        return CornerPhase::Acceleration;
    }
    CornerPhase::Approach
}

/// Classify every sample of a lap, threading the previous sample through for
/// turn-in detection.
pub fn tag_corner_phases(samples: &[TelemetrySample]) -> Vec<CornerPhase> {
    let mut phases = Vec::with_capacity(samples.len());
    let mut prev: Option<&TelemetrySample> = None;
    for sample in samples {
        phases.push(classify_corner_phase(sample, prev));
        prev = Some(sample);
    }
    phases
}
