//! Driving-phase enumerations at the two classification granularities.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Coarse per-sample driving phase used by the streaming session path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrivePhase {
    Straight,
    Braking,
    Entry,
    Mid,
    Exit,
    Acceleration,
}

impl DrivePhase {
    /// The three phases that carry balance information.
    pub const CORNERING: [DrivePhase; 3] = [DrivePhase::Entry, DrivePhase::Mid, DrivePhase::Exit];

    pub fn is_cornering(&self) -> bool {
        matches!(self, DrivePhase::Entry | DrivePhase::Mid | DrivePhase::Exit)
    }

    pub fn is_braking(&self) -> bool {
        matches!(self, DrivePhase::Braking | DrivePhase::Entry)
    }
}

impl fmt::Display for DrivePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DrivePhase::Straight => "straight",
            DrivePhase::Braking => "braking",
            DrivePhase::Entry => "entry",
            DrivePhase::Mid => "mid",
            DrivePhase::Exit => "exit",
            DrivePhase::Acceleration => "acceleration",
        };
        write!(f, "{name}")
    }
}

/// Fine-grained phase within a corner, used by the lap/corner path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerPhase {
    Approach,
    BrakeZone,
    TrailBrake,
    TurnIn,
    Apex,
    MidCorner,
    Exit,
    Acceleration,
}

impl CornerPhase {
    /// Whether this phase belongs to the entry portion of a corner.
    pub fn is_entry(&self) -> bool {
        matches!(
            self,
            CornerPhase::BrakeZone | CornerPhase::TrailBrake | CornerPhase::TurnIn
        )
    }

    /// Whether this phase belongs to the middle portion of a corner.
    pub fn is_mid(&self) -> bool {
        matches!(self, CornerPhase::Apex | CornerPhase::MidCorner)
    }

    /// Whether this phase belongs to the exit portion of a corner.
    pub fn is_exit(&self) -> bool {
        matches!(self, CornerPhase::Exit | CornerPhase::Acceleration)
    }
}

impl fmt::Display for CornerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CornerPhase::Approach => "approach",
            CornerPhase::BrakeZone => "brake_zone",
            CornerPhase::TrailBrake => "trail_brake",
            CornerPhase::TurnIn => "turn_in",
            CornerPhase::Apex => "apex",
            CornerPhase::MidCorner => "mid_corner",
            CornerPhase::Exit => "exit",
            CornerPhase::Acceleration => "acceleration",
        };
        write!(f, "{name}")
    }
}
