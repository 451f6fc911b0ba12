//! Closed handling-problem enumeration and vehicle class inference.

use core::fmt;
use serde::{Deserialize, Serialize};

/// A handling problem the pipeline can diagnose.
///
/// Session-level severities for these problems are normalized to `0.0..=1.0`;
/// corner-level detector severities are `0.0..=100.0` (see `CornerAnalysis`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Problem {
    UndersteerEntry,
    UndersteerMid,
    UndersteerExit,
    OversteerEntry,
    OversteerMid,
    OversteerExit,
    Wheelspin,
    WheelLock,
    InstabilityHighSpeed,
    TireOverheatFront,
    TireOverheatRear,
    TireColdFront,
    TireColdRear,
    BrakeOverheatFront,
    BrakeOverheatRear,
    ExcessiveRoll,
    Bottoming,
    PoorTraction,
}

impl Problem {
    pub const ALL: [Problem; 18] = [
        Problem::UndersteerEntry,
        Problem::UndersteerMid,
        Problem::UndersteerExit,
        Problem::OversteerEntry,
        Problem::OversteerMid,
        Problem::OversteerExit,
        Problem::Wheelspin,
        Problem::WheelLock,
        Problem::InstabilityHighSpeed,
        Problem::TireOverheatFront,
        Problem::TireOverheatRear,
        Problem::TireColdFront,
        Problem::TireColdRear,
        Problem::BrakeOverheatFront,
        Problem::BrakeOverheatRear,
        Problem::ExcessiveRoll,
        Problem::Bottoming,
        Problem::PoorTraction,
    ];

    /// Declaration-order rank, used as a deterministic tie-break when sorting
    /// problems of equal severity.
    pub fn rank(&self) -> usize {
        Self::ALL.iter().position(|p| p == self).unwrap_or(Self::ALL.len())
    }

    /// Human-readable label used in recommendation reasons and warnings.
    pub fn label(&self) -> &'static str {
        match self {
            Problem::UndersteerEntry => "corner-entry understeer",
            Problem::UndersteerMid => "mid-corner understeer",
            Problem::UndersteerExit => "corner-exit understeer",
            Problem::OversteerEntry => "corner-entry oversteer",
            Problem::OversteerMid => "mid-corner oversteer",
            Problem::OversteerExit => "corner-exit oversteer",
            Problem::Wheelspin => "wheelspin",
            Problem::WheelLock => "wheel lock",
            Problem::InstabilityHighSpeed => "high-speed instability",
            Problem::TireOverheatFront => "front tire overheating",
            Problem::TireOverheatRear => "rear tire overheating",
            Problem::TireColdFront => "cold front tires",
            Problem::TireColdRear => "cold rear tires",
            Problem::BrakeOverheatFront => "front brake overheating",
            Problem::BrakeOverheatRear => "rear brake overheating",
            Problem::ExcessiveRoll => "excessive body roll",
            Problem::Bottoming => "bottoming out",
            Problem::PoorTraction => "poor traction",
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Diagnosed problems with session-level severities (`0.0..=1.0`).
///
/// Insertion order is preserved, so detection order stays observable and
/// recommendation generation is deterministic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProblemMap {
    entries: Vec<(Problem, f32)>,
}

impl ProblemMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a problem. Severity is clamped to `0.0..=1.0`.
    pub fn insert(&mut self, problem: Problem, severity: f32) {
        let severity = severity.clamp(0.0, 1.0);
        if let Some(entry) = self.entries.iter_mut().find(|(p, _)| *p == problem) {
            entry.1 = severity;
        } else {
            self.entries.push((problem, severity));
        }
    }

    pub fn get(&self, problem: Problem) -> Option<f32> {
        self.entries
            .iter()
            .find(|(p, _)| *p == problem)
            .map(|(_, s)| *s)
    }

    pub fn contains(&self, problem: Problem) -> bool {
        self.get(problem).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Problem, f32)> + '_ {
        self.entries.iter().copied()
    }

    /// Entries sorted by severity descending; equal severities fall back to
    /// declaration order of [`Problem`].
    pub fn sorted_by_severity(&self) -> Vec<(Problem, f32)> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|(pa, sa), (pb, sb)| {
            sb.total_cmp(sa).then_with(|| pa.rank().cmp(&pb.rank()))
        });
        sorted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Vehicle class tier, driving the thermal operating-range tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleClass {
    /// Base tier: GT3-style machinery with modest downforce.
    #[default]
    Gt3,
    /// Mid tier: LMP2-style prototypes.
    Lmp2,
    /// Top tier: LMH/hypercar machinery with the most downforce.
    Lmh,
}

impl VehicleClass {
    /// Infer the class from combined front+rear downforce, in Newtons.
    ///
    /// The boundaries are strict: exactly 15000 N resolves to the lower tier.
    pub fn from_downforce(total_downforce: f32) -> Self {
        if total_downforce > 15_000.0 {
            VehicleClass::Lmh
        } else if total_downforce > 8_000.0 {
            VehicleClass::Lmp2
        } else {
            VehicleClass::Gt3
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VehicleClass::Gt3 => "GT3",
            VehicleClass::Lmp2 => "LMP2",
            VehicleClass::Lmh => "LMH",
        };
        write!(f, "{name}")
    }
}
