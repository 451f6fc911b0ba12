//! Output types shared by the recommendation and correlation stages.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::problem::Problem;

/// Direction of a proposed setup change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    Increase,
    Decrease,
}

impl Adjustment {
    /// +1.0 for increase, -1.0 for decrease; the sign the greedy generator
    /// applies to a parameter's effect weights.
    pub fn multiplier(&self) -> f32 {
        match self {
            Adjustment::Increase => 1.0,
            Adjustment::Decrease => -1.0,
        }
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Adjustment::Increase => write!(f, "increase"),
            Adjustment::Decrease => write!(f, "decrease"),
        }
    }
}

/// One proposed setup change, ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Knowledge-table parameter id, e.g. `front_arb`.
    pub parameter: String,
    pub adjustment: Adjustment,
    /// 1 (mild) to 10 (urgent), derived from problem severity.
    pub priority: u8,
    /// 0.0 to 1.0.
    pub confidence: f32,
    pub reason: String,
    /// Concrete change text, e.g. `"120 -> 115"` or `"-1-2 clicks/points"`.
    pub suggested_change: String,
    /// Diagnosed problems this change targets.
    pub addresses: Vec<Problem>,
    /// Labels of other diagnosed problems this change may aggravate.
    pub side_effects: Vec<String>,
}

/// Direction a parameter should move according to cross-session correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationTrend {
    Increase,
    Decrease,
    /// |r| below the significance cutoff; leave the parameter alone.
    Optimal,
}

impl fmt::Display for CorrelationTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationTrend::Increase => write!(f, "increase"),
            CorrelationTrend::Decrease => write!(f, "decrease"),
            CorrelationTrend::Optimal => write!(f, "optimal"),
        }
    }
}

/// Correlation of one setup parameter against an outcome across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupCorrelation {
    pub parameter: String,
    /// Pearson coefficient, -1.0 to 1.0.
    pub correlation: f64,
    /// 0 to 100, grows with both |r| and the number of sessions.
    pub confidence: f64,
    pub trend: CorrelationTrend,
    /// Recommended delta in the parameter's own units; 0.0 when optimal.
    pub suggested_change: f64,
    /// Parameter value from the session with the best outcome.
    pub optimal_value: f64,
    /// Number of sessions the correlation was computed over.
    pub sessions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjustment_multiplier_signs() {
        assert_eq!(Adjustment::Increase.multiplier(), 1.0);
        assert_eq!(Adjustment::Decrease.multiplier(), -1.0);
    }
}
