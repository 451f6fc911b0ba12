//! Corner-level behavior detectors.
//!
//! Severities here are on the corner scale, `0.0..=100.0`. When several
//! heuristics fire in the same corner the severities merge by maximum, not by
//! average; a single big moment matters more than many small ones.

use paddock_telemetry_core::{CornerPhase, TelemetrySample};
use serde::{Deserialize, Serialize};

/// Slip-angle margin (degrees) separating axle behaviors.
pub const SLIP_ANGLE_THRESHOLD_DEG: f32 = 8.0;
/// Rear slip ratio above which the driven axle is spinning.
pub const TRACTION_SLIP_RATIO_THRESHOLD: f32 = 0.15;
/// Front slip ratio below which a wheel counts as locked.
pub const BRAKE_LOCK_THRESHOLD: f32 = -0.20;

/// Outcome of one behavior detector over a corner pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Detection {
    pub detected: bool,
    /// 0.0 to 100.0.
    pub severity: f32,
    /// Phase of the worst qualifying sample.
    pub phase: Option<CornerPhase>,
}

/// Detect understeer over a corner pass.
///
/// Two heuristics: the front axle slipping more than the rear by the
/// slip-angle margin, and steering saturation (lots of lock, little lateral
/// response). Detected when qualifying samples exceed 10% of the pass.
pub fn detect_understeer(samples: &[TelemetrySample], phases: &[CornerPhase]) -> Detection {
    if samples.is_empty() {
        return Detection::default();
    }

    let mut count = 0usize;
    let mut max_severity = 0.0f32;
    let mut worst_phase = None;

    for (sample, phase) in samples.iter().zip(phases) {
        let slip_diff = sample.front_slip_angle() - sample.rear_slip_angle();
        if slip_diff > SLIP_ANGLE_THRESHOLD_DEG {
            count += 1;
            let severity = ((slip_diff - SLIP_ANGLE_THRESHOLD_DEG) * 10.0).min(100.0);
            if severity > max_severity {
                max_severity = severity;
                worst_phase = Some(*phase);
            }
        }
    }

    for (sample, phase) in samples.iter().zip(phases) {
        let steering = sample.steering.abs();
        let g_lat = sample.g_lat.abs();
        if steering > 60.0 && g_lat < 1.0 {
            let expected_g = steering / 60.0;
            if g_lat < expected_g * 0.7 {
                count += 1;
                let severity = (1.0 - g_lat / expected_g) * 50.0;
                if severity > max_severity {
                    max_severity = severity;
                    worst_phase = Some(*phase);
                }
            }
        }
    }

    Detection {
        detected: count as f32 > samples.len() as f32 * 0.1,
        severity: max_severity,
        phase: worst_phase,
    }
}

/// Detect oversteer over a corner pass.
///
/// Two heuristics: the rear axle slipping more than the front by the margin,
/// and counter-steering (a steering sign flip while still loaded laterally).
/// Detected when qualifying samples exceed 5% of the pass.
pub fn detect_oversteer(samples: &[TelemetrySample], phases: &[CornerPhase]) -> Detection {
    if samples.is_empty() {
        return Detection::default();
    }

    let mut count = 0usize;
    let mut max_severity = 0.0f32;
    let mut worst_phase = None;

    for (sample, phase) in samples.iter().zip(phases) {
        let slip_diff = sample.rear_slip_angle() - sample.front_slip_angle();
        if slip_diff > SLIP_ANGLE_THRESHOLD_DEG {
            count += 1;
            let severity = ((slip_diff - SLIP_ANGLE_THRESHOLD_DEG) * 10.0).min(100.0);
            if severity > max_severity {
                max_severity = severity;
                worst_phase = Some(*phase);
            }
        }
    }

    for (window, phase) in samples.windows(2).zip(phases.iter().skip(1)) {
        let (prev, curr) = match window {
            [prev, curr] => (prev, curr),
            _ => continue,
        };
        if prev.steering * curr.steering < 0.0 && curr.g_lat.abs() > 0.5 {
            count += 1;
            let severity = (curr.steering - prev.steering).abs().min(100.0);
            if severity > max_severity {
                max_severity = severity;
                worst_phase = Some(*phase);
            }
        }
    }

    Detection {
        detected: count as f32 > samples.len() as f32 * 0.05,
        severity: max_severity,
        phase: worst_phase,
    }
}

/// Detect traction loss (wheelspin) under throttle.
///
/// Qualifies on throttle above 50% with the worst rear slip ratio above the
/// traction threshold; detected with more than 3 qualifying samples.
pub fn detect_traction_loss(samples: &[TelemetrySample]) -> Detection {
    if samples.is_empty() {
        return Detection::default();
    }

    let mut count = 0usize;
    let mut max_severity = 0.0f32;

    for sample in samples {
        if sample.throttle > 50.0 {
            let rear_slip = sample.rear_slip_ratio_peak();
            if rear_slip > TRACTION_SLIP_RATIO_THRESHOLD {
                count += 1;
                max_severity = max_severity.max((rear_slip * 200.0).min(100.0));
            }
        }
    }

    Detection {
        detected: count > 3,
        severity: max_severity,
        phase: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_telemetry_core::WheelSet;

    fn understeering_sample(front_slip_deg: f32) -> TelemetrySample {
        TelemetrySample {
            slip_angle: WheelSet {
                fl: front_slip_deg,
                fr: front_slip_deg,
                rl: 1.0,
                rr: 1.0,
            },
            ..Default::default()
        }
    }

    fn neutral_sample() -> TelemetrySample {
        TelemetrySample::default()
    }

    #[test]
    fn understeer_needs_more_than_ten_percent() {
        // 2 of 20 samples is exactly 10%, not above it.
        let mut samples = vec![neutral_sample(); 18];
        samples.extend(vec![understeering_sample(17.0); 2]);
        let phases = vec![CornerPhase::MidCorner; samples.len()];
        assert!(!detect_understeer(&samples, &phases).detected);

        // 3 of 20 crosses the line.
        let mut samples = vec![neutral_sample(); 17];
        samples.extend(vec![understeering_sample(17.0); 3]);
        let phases = vec![CornerPhase::MidCorner; samples.len()];
        let detection = detect_understeer(&samples, &phases);
        assert!(detection.detected);
        assert_eq!(detection.phase, Some(CornerPhase::MidCorner));
    }

    #[test]
    fn understeer_severity_is_clamped() {
        let samples = vec![understeering_sample(40.0); 10];
        let phases = vec![CornerPhase::Apex; 10];
        let detection = detect_understeer(&samples, &phases);
        assert_eq!(detection.severity, 100.0);
    }

    #[test]
    fn severity_merges_by_maximum() {
        // One severe sample among mild ones dominates.
        let mut samples = vec![understeering_sample(10.0); 9];
        samples.push(understeering_sample(14.0));
        let phases = vec![CornerPhase::Apex; 10];
        let detection = detect_understeer(&samples, &phases);
        // (14 - 1 rear - 8) * 10 = 50 from the severe sample.
        assert_eq!(detection.severity, 50.0);
    }

    #[test]
    fn counter_steering_counts_as_oversteer() {
        let mut samples = Vec::new();
        for i in 0..20 {
            let steering = if i % 2 == 0 { 30.0 } else { -30.0 };
            samples.push(TelemetrySample {
                steering,
                g_lat: 1.0,
                ..Default::default()
            });
        }
        let phases = vec![CornerPhase::Exit; samples.len()];
        let detection = detect_oversteer(&samples, &phases);
        assert!(detection.detected);
        assert_eq!(detection.severity, 60.0);
        assert_eq!(detection.phase, Some(CornerPhase::Exit));
    }

    #[test]
    fn traction_loss_needs_more_than_three_samples() {
        let spinning = TelemetrySample {
            throttle: 80.0,
            slip_ratio: WheelSet {
                fl: 0.0,
                fr: 0.0,
                rl: 0.3,
                rr: 0.1,
            },
            ..Default::default()
        };
        let samples = vec![spinning.clone(); 3];
        assert!(!detect_traction_loss(&samples).detected);

        let samples = vec![spinning; 4];
        let detection = detect_traction_loss(&samples);
        assert!(detection.detected);
        assert_eq!(detection.severity, 60.0);
    }

    #[test]
    fn off_throttle_slides_are_not_traction_loss() {
        let sliding = TelemetrySample {
            throttle: 20.0,
            slip_ratio: WheelSet::splat(0.5),
            ..Default::default()
        };
        let samples = vec![sliding; 50];
        assert!(!detect_traction_loss(&samples).detected);
    }

    #[test]
    fn empty_pass_is_neutral() {
        assert_eq!(detect_understeer(&[], &[]), Detection::default());
        assert_eq!(detect_oversteer(&[], &[]), Detection::default());
        assert_eq!(detect_traction_loss(&[]), Detection::default());
    }
}
