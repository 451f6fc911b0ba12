//! Static corner geometry and per-lap corner analysis results.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::phase::CornerPhase;

/// Corner speed classification from apex speed, in km/h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerKind {
    /// Apex speed below 80 km/h.
    Slow,
    /// Apex speed below 140 km/h.
    Medium,
    /// Apex speed below 200 km/h.
    Fast,
    /// Apex speed at or above 200 km/h.
    VeryFast,
}

impl CornerKind {
    /// Classify a corner from its apex (minimum) speed in km/h.
    pub fn from_apex_speed(speed: f32) -> Self {
        if speed < 80.0 {
            CornerKind::Slow
        } else if speed < 140.0 {
            CornerKind::Medium
        } else if speed < 200.0 {
            CornerKind::Fast
        } else {
            CornerKind::VeryFast
        }
    }
}

impl fmt::Display for CornerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CornerKind::Slow => "slow",
            CornerKind::Medium => "medium",
            CornerKind::Fast => "fast",
            CornerKind::VeryFast => "very_fast",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerDirection {
    Left,
    Right,
}

impl fmt::Display for CornerDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CornerDirection::Left => write!(f, "left"),
            CornerDirection::Right => write!(f, "right"),
        }
    }
}

/// Static definition of a corner, computed once from a reference lap and
/// reused as stable identity for every later lap of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CornerDefinition {
    pub corner_id: u32,
    pub name: String,
    pub start_distance: f32,
    pub apex_distance: f32,
    pub end_distance: f32,
    pub direction: CornerDirection,
    pub kind: CornerKind,
}

impl CornerDefinition {
    /// Whether a sample at `distance` falls inside this corner.
    pub fn contains(&self, distance: f32) -> bool {
        distance >= self.start_distance && distance <= self.end_distance
    }
}

/// Analysis result for a single pass through one corner.
///
/// Read-only after creation. Behavior severities here are on the corner-level
/// `0.0..=100.0` scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CornerAnalysis {
    pub corner_id: u32,
    pub corner_name: String,
    pub kind: CornerKind,
    pub direction: CornerDirection,

    pub start_distance: f32,
    pub apex_distance: f32,
    pub end_distance: f32,

    // Speed profile
    pub entry_speed: f32,
    pub min_speed: f32,
    pub apex_speed: f32,
    pub exit_speed: f32,

    // Braking
    pub brake_point_distance: f32,
    pub brake_pressure_max: f32,
    pub brake_duration: f64,
    pub trail_brake_duration: f64,

    // Behavior
    pub understeer_detected: bool,
    pub understeer_severity: f32,
    pub understeer_phase: Option<CornerPhase>,
    pub oversteer_detected: bool,
    pub oversteer_severity: f32,
    pub oversteer_phase: Option<CornerPhase>,
    pub traction_loss_detected: bool,
    pub traction_loss_severity: f32,

    // Tires and slip
    pub tire_temp_front_avg: f32,
    pub tire_temp_rear_avg: f32,
    pub slip_angle_front_max: f32,
    pub slip_angle_rear_max: f32,

    // Time
    pub time_through_corner: f64,
    pub time_loss: f64,

    // G-forces
    pub max_lat_g: f32,
    pub max_brake_g: f32,
    pub max_accel_g: f32,
}

impl CornerAnalysis {
    /// Whether any behavior problem was flagged in this corner pass.
    pub fn has_issue(&self) -> bool {
        self.understeer_detected || self.oversteer_detected || self.traction_loss_detected
    }
}
