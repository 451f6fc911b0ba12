//! Diagnostic output types for the feedback rule path.

use core::fmt;
use paddock_telemetry_core::{Adjustment, DrivePhase};
use serde::{Deserialize, Serialize};

/// How urgently a diagnosis needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Info,
    Success,
}

impl Severity {
    /// Sort rank; critical first.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::Warning => 1,
            Severity::Info => 2,
            Severity::Success => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Success => "success",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCategory {
    Balance,
    Traction,
    Braking,
    Tire,
    Suspension,
    Aero,
    Differential,
}

/// Problems the feedback rules can diagnose. Narrower than the telemetry
/// problem enumeration: these are things a driver can put into words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleProblem {
    UndersteerEntry,
    UndersteerMid,
    OversteerEntry,
    OversteerMid,
    OversteerExit,
    Wheelspin,
    PowerOversteer,
    FrontLockup,
    RearLockup,
    BrakingInstability,
}

impl RuleProblem {
    /// Dangerous diagnoses are always reported at critical severity,
    /// regardless of the rule's own level. Never downgraded.
    pub fn is_dangerous(&self) -> bool {
        matches!(self, RuleProblem::RearLockup | RuleProblem::PowerOversteer)
    }
}

/// One parameter change proposed by a rule, with presentation-ready values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecommendation {
    pub parameter: String,
    /// Current value, formatted (`"56.0%"`).
    pub current: String,
    /// Proposed value, formatted and clamped to the parameter's safe range.
    pub recommended: String,
    pub direction: Adjustment,
    /// Coarse magnitude hint (`"2-3 clicks"`).
    pub amount: String,
    /// 0.0 to 1.0.
    pub confidence: f32,
    pub explanation: String,
}

/// One matched rule with its recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub rule_id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub category: DiagnosticCategory,
    pub problem: RuleProblem,
    /// Where on the corner the problem lives.
    pub phase: DrivePhase,
    /// 1 is highest.
    pub priority: u8,
    pub recommendations: Vec<RuleRecommendation>,
}

impl Diagnostic {
    /// Parameters touched by this diagnostic, in recommendation order.
    pub fn affected_parameters(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for rec in &self.recommendations {
            if !names.contains(&rec.parameter.as_str()) {
                names.push(&rec.parameter);
            }
        }
        names
    }
}
