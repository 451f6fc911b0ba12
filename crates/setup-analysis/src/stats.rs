//! Whole-session analysis and the aggregated behavior profile.

use std::collections::BTreeMap;

use paddock_telemetry_core::{CornerAnalysis, CornerDefinition, CornerKind, Lap, SessionData};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::corners::{analyze_lap_corners, detect_corners};

/// Aggregated driving behavior over a session.
///
/// Balance scores read 0 = full understeer, 50 = neutral, 100 = full
/// oversteer. Tendencies and stress values are 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorProfile {
    pub understeer_tendency: f32,
    pub oversteer_tendency: f32,
    pub balance_score: f32,

    pub entry_balance: f32,
    pub mid_corner_balance: f32,
    pub exit_balance: f32,

    pub slow_corner_balance: f32,
    pub medium_corner_balance: f32,
    pub fast_corner_balance: f32,

    pub traction_on_throttle: f32,
    pub front_tire_stress: f32,
    pub rear_tire_stress: f32,
    pub tire_balance: f32,

    /// Lap-time repeatability, 100 = metronomic.
    pub consistency: f32,

    /// Number of corner passes behind the aggregates.
    pub sample_size: usize,

    /// Corners failing on more than half the laps, worst time loss first.
    pub problem_corners: Vec<CornerAnalysis>,
}

impl Default for BehaviorProfile {
    fn default() -> Self {
        Self {
            understeer_tendency: 0.0,
            oversteer_tendency: 0.0,
            balance_score: 50.0,
            entry_balance: 50.0,
            mid_corner_balance: 50.0,
            exit_balance: 50.0,
            slow_corner_balance: 50.0,
            medium_corner_balance: 50.0,
            fast_corner_balance: 50.0,
            traction_on_throttle: 0.0,
            front_tire_stress: 0.0,
            rear_tire_stress: 0.0,
            tire_balance: 50.0,
            consistency: 0.0,
            sample_size: 0,
            problem_corners: Vec::new(),
        }
    }
}

/// Session-level analyzer for recorded telemetry.
///
/// Corner geometry is detected once from the best valid lap and then reused
/// for every lap, so corner ids stay comparable across the session.
#[derive(Debug, Default)]
pub struct TelemetryAnalyzer {
    corners: Vec<CornerDefinition>,
}

impl TelemetryAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_corners(&self) -> &[CornerDefinition] {
        &self.corners
    }

    /// Analyze a whole session in place.
    ///
    /// Fills each valid lap's `corners`, assigns per-corner time loss against
    /// the session's best pass, and returns the aggregated profile. A session
    /// without valid laps yields the neutral default profile.
    pub fn analyze_session(&mut self, session: &mut SessionData) -> BehaviorProfile {
        info!(session = %session.session_id, laps = session.laps.len(), "analyzing session");

        if self.corners.is_empty() {
            if let Some(best) = session.best_valid_lap() {
                self.corners = detect_corners(best);
            }
        }

        for lap in session.laps.iter_mut().filter(|l| l.valid) {
            lap.corners = analyze_lap_corners(&self.corners, lap);
        }
        assign_time_loss(session);

        let all_corners: Vec<CornerAnalysis> = session
            .valid_laps()
            .flat_map(|lap| lap.corners.iter().cloned())
            .collect();

        let mut profile = aggregate_profile(session, &all_corners);
        profile.problem_corners = identify_problem_corners(session);
        profile
    }

    /// Analyze a single lap against the known corner set.
    pub fn analyze_lap(&self, lap: &mut Lap) -> Vec<CornerAnalysis> {
        let corners = analyze_lap_corners(&self.corners, lap);
        lap.corners = corners.clone();
        corners
    }
}

/// Time loss per corner pass: time through the corner minus the session's
/// best pass through the same corner.
fn assign_time_loss(session: &mut SessionData) {
    let mut best: BTreeMap<u32, f64> = BTreeMap::new();
    for lap in session.valid_laps() {
        for corner in &lap.corners {
            best.entry(corner.corner_id)
                .and_modify(|t| *t = t.min(corner.time_through_corner))
                .or_insert(corner.time_through_corner);
        }
    }
    for lap in session.laps.iter_mut().filter(|l| l.valid) {
        for corner in &mut lap.corners {
            if let Some(best_time) = best.get(&corner.corner_id) {
                corner.time_loss = (corner.time_through_corner - best_time).max(0.0);
            }
        }
    }
}

fn aggregate_profile(session: &SessionData, corners: &[CornerAnalysis]) -> BehaviorProfile {
    let mut profile = BehaviorProfile::default();
    if corners.is_empty() {
        return profile;
    }

    let understeer: Vec<f32> = corners
        .iter()
        .filter(|c| c.understeer_detected)
        .map(|c| c.understeer_severity)
        .collect();
    let oversteer: Vec<f32> = corners
        .iter()
        .filter(|c| c.oversteer_detected)
        .map(|c| c.oversteer_severity)
        .collect();

    profile.understeer_tendency = mean(&understeer);
    profile.oversteer_tendency = mean(&oversteer);
    if profile.understeer_tendency + profile.oversteer_tendency > 0.0 {
        profile.balance_score = (50.0
            + (profile.oversteer_tendency - profile.understeer_tendency) / 2.0)
            .clamp(0.0, 100.0);
    }

    // Balance per corner phase, bucketed on the worst phase of either axle.
    let in_entry: Vec<&CornerAnalysis> = corners
        .iter()
        .filter(|c| {
            c.understeer_phase.is_some_and(|p| p.is_entry())
                || c.oversteer_phase.is_some_and(|p| p.is_entry())
        })
        .collect();
    let in_mid: Vec<&CornerAnalysis> = corners
        .iter()
        .filter(|c| {
            c.understeer_phase.is_some_and(|p| p.is_mid())
                || c.oversteer_phase.is_some_and(|p| p.is_mid())
        })
        .collect();
    let in_exit: Vec<&CornerAnalysis> = corners
        .iter()
        .filter(|c| {
            c.understeer_phase.is_some_and(|p| p.is_exit())
                || c.oversteer_phase.is_some_and(|p| p.is_exit())
        })
        .collect();
    profile.entry_balance = phase_balance(&in_entry);
    profile.mid_corner_balance = phase_balance(&in_mid);
    profile.exit_balance = phase_balance(&in_exit);

    // Balance per corner kind.
    let slow: Vec<&CornerAnalysis> = corners
        .iter()
        .filter(|c| c.kind == CornerKind::Slow)
        .collect();
    let medium: Vec<&CornerAnalysis> = corners
        .iter()
        .filter(|c| c.kind == CornerKind::Medium)
        .collect();
    let fast: Vec<&CornerAnalysis> = corners
        .iter()
        .filter(|c| matches!(c.kind, CornerKind::Fast | CornerKind::VeryFast))
        .collect();
    profile.slow_corner_balance = phase_balance(&slow);
    profile.medium_corner_balance = phase_balance(&medium);
    profile.fast_corner_balance = phase_balance(&fast);

    let traction: Vec<f32> = corners
        .iter()
        .filter(|c| c.traction_loss_detected)
        .map(|c| c.traction_loss_severity)
        .collect();
    profile.traction_on_throttle = mean(&traction);

    // Tire stress from average corner temps; 70 C is the stress-free floor.
    let front_temps: Vec<f32> = corners
        .iter()
        .filter(|c| c.tire_temp_front_avg > 0.0)
        .map(|c| c.tire_temp_front_avg)
        .collect();
    let rear_temps: Vec<f32> = corners
        .iter()
        .filter(|c| c.tire_temp_rear_avg > 0.0)
        .map(|c| c.tire_temp_rear_avg)
        .collect();
    if !front_temps.is_empty() && !rear_temps.is_empty() {
        profile.front_tire_stress = ((mean(&front_temps) - 70.0) * 2.0).clamp(0.0, 100.0);
        profile.rear_tire_stress = ((mean(&rear_temps) - 70.0) * 2.0).clamp(0.0, 100.0);
        profile.tire_balance =
            50.0 + (profile.rear_tire_stress - profile.front_tire_stress) / 2.0;
    }

    // Lap-time consistency.
    let times: Vec<f64> = session.valid_laps().map(|l| l.lap_time).collect();
    if times.len() > 1 {
        let mean_time = times.iter().sum::<f64>() / times.len() as f64;
        let variance = times
            .iter()
            .map(|t| (t - mean_time) * (t - mean_time))
            .sum::<f64>()
            / times.len() as f64;
        profile.consistency = (100.0 - variance.sqrt() * 10.0).max(0.0) as f32;
    }

    profile.sample_size = corners.len();
    profile
}

fn phase_balance(corners: &[&CornerAnalysis]) -> f32 {
    if corners.is_empty() {
        return 50.0;
    }
    let under: f32 = corners.iter().map(|c| c.understeer_severity).sum();
    let over: f32 = corners.iter().map(|c| c.oversteer_severity).sum();
    if under + over == 0.0 {
        return 50.0;
    }
    50.0 + (over - under) / (corners.len() as f32 * 2.0)
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}

/// Corners with a consistent issue: failing on more than half the laps that
/// pass through them, with at least 2 passes. Worst time loss first, top 5.
fn identify_problem_corners(session: &SessionData) -> Vec<CornerAnalysis> {
    struct CornerIssues {
        corner: CornerAnalysis,
        understeer: usize,
        oversteer: usize,
        traction: usize,
        laps: usize,
    }

    let mut by_id: BTreeMap<u32, CornerIssues> = BTreeMap::new();
    for lap in session.valid_laps() {
        for corner in &lap.corners {
            let issues = by_id.entry(corner.corner_id).or_insert_with(|| CornerIssues {
                corner: corner.clone(),
                understeer: 0,
                oversteer: 0,
                traction: 0,
                laps: 0,
            });
            issues.laps += 1;
            if corner.understeer_detected {
                issues.understeer += 1;
            }
            if corner.oversteer_detected {
                issues.oversteer += 1;
            }
            if corner.traction_loss_detected {
                issues.traction += 1;
            }
            // Keep the pass with the worst time loss as the representative.
            if corner.time_loss > issues.corner.time_loss {
                issues.corner = corner.clone();
            }
        }
    }

    let mut problem_corners: Vec<CornerAnalysis> = by_id
        .into_values()
        .filter(|issues| issues.laps >= 2)
        .filter(|issues| {
            let worst = issues.understeer.max(issues.oversteer).max(issues.traction);
            worst as f32 / issues.laps as f32 > 0.5
        })
        .map(|issues| issues.corner)
        .collect();

    problem_corners.sort_by(|a, b| b.time_loss.total_cmp(&a.time_loss));
    problem_corners.truncate(5);
    problem_corners
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_telemetry_core::{CornerDirection, CornerPhase};

    fn corner(id: u32, kind: CornerKind) -> CornerAnalysis {
        CornerAnalysis {
            corner_id: id,
            corner_name: format!("Turn {id}"),
            kind,
            direction: CornerDirection::Right,
            start_distance: 0.0,
            apex_distance: 50.0,
            end_distance: 100.0,
            entry_speed: 150.0,
            min_speed: 90.0,
            apex_speed: 90.0,
            exit_speed: 140.0,
            brake_point_distance: 0.0,
            brake_pressure_max: 0.0,
            brake_duration: 0.0,
            trail_brake_duration: 0.0,
            understeer_detected: false,
            understeer_severity: 0.0,
            understeer_phase: None,
            oversteer_detected: false,
            oversteer_severity: 0.0,
            oversteer_phase: None,
            traction_loss_detected: false,
            traction_loss_severity: 0.0,
            tire_temp_front_avg: 0.0,
            tire_temp_rear_avg: 0.0,
            slip_angle_front_max: 0.0,
            slip_angle_rear_max: 0.0,
            time_through_corner: 5.0,
            time_loss: 0.0,
            max_lat_g: 1.0,
            max_brake_g: 0.0,
            max_accel_g: 0.0,
        }
    }

    #[test]
    fn empty_corner_set_yields_neutral_profile() {
        let session = SessionData::default();
        let profile = aggregate_profile(&session, &[]);
        assert_eq!(profile, BehaviorProfile::default());
        assert_eq!(profile.balance_score, 50.0);
    }

    #[test]
    fn understeer_dominated_profile_leans_low() {
        let mut pushy = corner(1, CornerKind::Medium);
        pushy.understeer_detected = true;
        pushy.understeer_severity = 60.0;
        pushy.understeer_phase = Some(CornerPhase::TurnIn);
        let session = SessionData::default();
        let profile = aggregate_profile(&session, &[pushy]);
        assert_eq!(profile.understeer_tendency, 60.0);
        assert_eq!(profile.balance_score, 20.0);
        // The only affected corner is an entry-phase one.
        assert!(profile.entry_balance < 50.0);
        assert_eq!(profile.mid_corner_balance, 50.0);
    }

    #[test]
    fn tire_stress_floor_and_balance() {
        let mut hot = corner(1, CornerKind::Fast);
        hot.tire_temp_front_avg = 100.0;
        hot.tire_temp_rear_avg = 90.0;
        let session = SessionData::default();
        let profile = aggregate_profile(&session, &[hot]);
        assert_eq!(profile.front_tire_stress, 60.0);
        assert_eq!(profile.rear_tire_stress, 40.0);
        assert_eq!(profile.tire_balance, 40.0);
    }

    #[test]
    fn problem_corner_needs_majority_of_laps() {
        let mut session = SessionData::default();
        // Three valid laps through corner 1; it understeers on two of them.
        for i in 0..3 {
            let mut c = corner(1, CornerKind::Slow);
            c.understeer_detected = i < 2;
            c.time_through_corner = 5.0 + i as f64 * 0.2;
            let lap = Lap {
                lap_number: i + 4,
                lap_time: 90.0,
                valid: true,
                outlap: false,
                inlap: false,
                max_speed: 200.0,
                avg_speed: 150.0,
                fuel_used: 2.0,
                tire_temp_front_avg: 85.0,
                tire_temp_rear_avg: 85.0,
                understeer_pct: 0.0,
                oversteer_pct: 0.0,
                traction_loss_pct: 0.0,
                lockup_pct: 0.0,
                corners: vec![c],
                samples: Vec::new(),
            };
            session.laps.push(lap);
        }
        let problems = identify_problem_corners(&session);
        assert_eq!(problems.len(), 1);

        // One failing lap out of three is below the majority bar.
        for lap in session.laps.iter_mut() {
            for c in &mut lap.corners {
                c.understeer_detected = lap.lap_number == 4;
            }
        }
        assert!(identify_problem_corners(&session).is_empty());
    }

    #[test]
    fn consistency_penalizes_spread() {
        let mut session = SessionData::default();
        for (i, time) in [90.0f64, 92.0, 94.0].iter().enumerate() {
            session.laps.push(Lap {
                lap_number: i as u32 + 4,
                lap_time: *time,
                valid: true,
                outlap: false,
                inlap: false,
                max_speed: 0.0,
                avg_speed: 0.0,
                fuel_used: 0.0,
                tire_temp_front_avg: 0.0,
                tire_temp_rear_avg: 0.0,
                understeer_pct: 0.0,
                oversteer_pct: 0.0,
                traction_loss_pct: 0.0,
                lockup_pct: 0.0,
                corners: Vec::new(),
                samples: Vec::new(),
            });
        }
        let profile = aggregate_profile(&session, &[corner(1, CornerKind::Slow)]);
        // Std dev of 90/92/94 is about 1.63 s.
        assert!(profile.consistency > 80.0);
        assert!(profile.consistency < 90.0);
    }
}
