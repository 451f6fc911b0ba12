//! Corner segmentation and per-corner analysis.

use paddock_telemetry_core::{
    CornerAnalysis, CornerDefinition, CornerDirection, CornerKind, Lap, TelemetrySample,
};
use tracing::{debug, info};

use crate::behavior::{detect_oversteer, detect_traction_loss, detect_understeer};
use crate::phase::tag_corner_phases;

/// Steering angle above which a sample counts as cornering, degrees.
const CORNER_STEERING_THRESHOLD_DEG: f32 = 15.0;
/// Lateral acceleration above which a sample counts as cornering, G.
const CORNER_LATERAL_G_THRESHOLD: f32 = 0.3;
/// Shorter runs are kinks, not corners, seconds.
const MIN_CORNER_DURATION_S: f64 = 0.5;

/// Segment a reference lap into corners.
///
/// A corner is a contiguous run of samples steering past the threshold or
/// pulling lateral G past the threshold, lasting at least the minimum
/// duration. The apex is the minimum-speed sample; direction follows the sign
/// of the mean steering angle. The returned definitions are meant to be
/// computed once per session and reused for every lap.
pub fn detect_corners(reference_lap: &Lap) -> Vec<CornerDefinition> {
    let points = &reference_lap.samples;
    let mut corners = Vec::new();
    if points.is_empty() {
        return corners;
    }

    let mut in_corner = false;
    let mut start_idx = 0usize;
    let mut corner_id = 1u32;

    for (i, point) in points.iter().enumerate() {
        let is_turning = point.steering.abs() > CORNER_STEERING_THRESHOLD_DEG
            || point.g_lat.abs() > CORNER_LATERAL_G_THRESHOLD;

        if is_turning && !in_corner {
            in_corner = true;
            start_idx = i;
        } else if !is_turning && in_corner {
            in_corner = false;
            if let Some(corner) = close_corner(points, start_idx, i, corner_id) {
                corners.push(corner);
                corner_id += 1;
            }
        }
    }

    info!(corners = corners.len(), "detected corners on track");
    corners
}

fn close_corner(
    points: &[TelemetrySample],
    start_idx: usize,
    end_idx: usize,
    corner_id: u32,
) -> Option<CornerDefinition> {
    let start = points.get(start_idx)?;
    let end = points.get(end_idx)?;
    if end.timestamp - start.timestamp < MIN_CORNER_DURATION_S {
        return None;
    }

    let span = points.get(start_idx..end_idx)?;
    let apex = span.iter().min_by(|a, b| a.speed.total_cmp(&b.speed))?;

    let avg_steering = span.iter().map(|p| p.steering).sum::<f32>() / span.len() as f32;
    let direction = if avg_steering < 0.0 {
        CornerDirection::Left
    } else {
        CornerDirection::Right
    };

    Some(CornerDefinition {
        corner_id,
        name: format!("Turn {corner_id}"),
        start_distance: start.distance,
        apex_distance: apex.distance,
        end_distance: end.distance,
        direction,
        kind: CornerKind::from_apex_speed(apex.speed),
    })
}

/// Analyze every defined corner over one lap.
///
/// Corners the lap has no samples for (telemetry gaps) are skipped.
pub fn analyze_lap_corners(
    definitions: &[CornerDefinition],
    lap: &Lap,
) -> Vec<CornerAnalysis> {
    let mut results = Vec::new();
    if definitions.is_empty() || lap.samples.is_empty() {
        return results;
    }

    let phases = tag_corner_phases(&lap.samples);

    for definition in definitions {
        let indexed: Vec<usize> = lap
            .samples
            .iter()
            .enumerate()
            .filter(|(_, p)| definition.contains(p.distance))
            .map(|(i, _)| i)
            .collect();
        if indexed.is_empty() {
            continue;
        }

        let points: Vec<TelemetrySample> = indexed
            .iter()
            .filter_map(|&i| lap.samples.get(i).cloned())
            .collect();
        let point_phases: Vec<_> = indexed
            .iter()
            .filter_map(|&i| phases.get(i).copied())
            .collect();

        results.push(analyze_single_corner(definition, &points, &point_phases));
    }

    debug!(
        lap = lap.lap_number,
        corners = results.len(),
        "analyzed lap corners"
    );
    results
}

fn analyze_single_corner(
    definition: &CornerDefinition,
    points: &[TelemetrySample],
    phases: &[paddock_telemetry_core::CornerPhase],
) -> CornerAnalysis {
    let entry_speed = points.first().map(|p| p.speed).unwrap_or(0.0);
    let exit_speed = points.last().map(|p| p.speed).unwrap_or(0.0);
    let min_speed = points
        .iter()
        .map(|p| p.speed)
        .fold(f32::INFINITY, f32::min);
    let min_speed = if min_speed.is_finite() { min_speed } else { 0.0 };

    // Braking profile.
    let braking: Vec<&TelemetrySample> = points.iter().filter(|p| p.brake > 10.0).collect();
    let brake_point_distance = braking
        .first()
        .map(|p| p.distance)
        .unwrap_or(definition.start_distance);
    let brake_pressure_max = points.iter().map(|p| p.brake).fold(0.0, f32::max);
    let brake_duration = match (braking.first(), braking.last()) {
        (Some(first), Some(last)) => last.timestamp - first.timestamp,
        _ => 0.0,
    };
    let trailing: Vec<&&TelemetrySample> = braking
        .iter()
        .filter(|p| p.steering.abs() > 15.0)
        .collect();
    let trail_brake_duration = match (trailing.first(), trailing.last()) {
        (Some(first), Some(last)) => last.timestamp - first.timestamp,
        _ => 0.0,
    };

    let understeer = detect_understeer(points, phases);
    let oversteer = detect_oversteer(points, phases);
    let traction = detect_traction_loss(points);

    // Thermal averages skip samples with dead temp sensors.
    let front_temps: Vec<f32> = points
        .iter()
        .filter(|p| p.tire_temp.fl > 0.0)
        .map(|p| p.tire_temp.front_avg())
        .collect();
    let rear_temps: Vec<f32> = points
        .iter()
        .filter(|p| p.tire_temp.rl > 0.0)
        .map(|p| p.tire_temp.rear_avg())
        .collect();

    let slip_angle_front_max = points
        .iter()
        .map(|p| p.slip_angle.abs().front_max())
        .fold(0.0, f32::max);
    let slip_angle_rear_max = points
        .iter()
        .map(|p| p.slip_angle.abs().rear_max())
        .fold(0.0, f32::max);

    let max_lat_g = points.iter().map(|p| p.g_lat.abs()).fold(0.0, f32::max);
    let max_brake_g = points
        .iter()
        .map(|p| p.g_long)
        .fold(f32::INFINITY, f32::min);
    let max_brake_g = if max_brake_g.is_finite() {
        max_brake_g.abs()
    } else {
        0.0
    };
    let max_accel_g = points.iter().map(|p| p.g_long).fold(0.0, f32::max);

    let time_through_corner = match (points.first(), points.last()) {
        (Some(first), Some(last)) => last.timestamp - first.timestamp,
        _ => 0.0,
    };

    CornerAnalysis {
        corner_id: definition.corner_id,
        corner_name: definition.name.clone(),
        kind: definition.kind,
        direction: definition.direction,
        start_distance: definition.start_distance,
        apex_distance: definition.apex_distance,
        end_distance: definition.end_distance,
        entry_speed,
        min_speed,
        apex_speed: min_speed,
        exit_speed,
        brake_point_distance,
        brake_pressure_max,
        brake_duration,
        trail_brake_duration,
        understeer_detected: understeer.detected,
        understeer_severity: understeer.severity,
        understeer_phase: understeer.phase,
        oversteer_detected: oversteer.detected,
        oversteer_severity: oversteer.severity,
        oversteer_phase: oversteer.phase,
        traction_loss_detected: traction.detected,
        traction_loss_severity: traction.severity,
        tire_temp_front_avg: mean(&front_temps),
        tire_temp_rear_avg: mean(&rear_temps),
        slip_angle_front_max,
        slip_angle_rear_max,
        time_through_corner,
        time_loss: 0.0,
        max_lat_g,
        max_brake_g,
        max_accel_g,
    }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}
