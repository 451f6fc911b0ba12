//! Pearson correlation of setup parameters against session outcomes.

use core::fmt;
use paddock_telemetry_core::{CorrelationTrend, SessionData, SetupCorrelation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::record::SessionRecord;

/// Below this many sessions no correlation is meaningful.
const MIN_SESSIONS: usize = 2;
/// |r| below this is noise; the parameter is reported as already optimal.
const SIGNIFICANCE_CUTOFF: f64 = 0.3;
/// Behavior correlations weaker than this confidence are dropped.
const BEHAVIOR_MIN_CONFIDENCE: f64 = 30.0;
/// Only correlations at least this confident make the suggestion list.
const SUGGESTION_MIN_CONFIDENCE: f64 = 50.0;
/// Suggested deltas cover half the observed spread, not all of it.
const CHANGE_FRACTION: f64 = 0.5;

/// Balance tendency an individual parameter can be correlated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorCategory {
    Understeer,
    Oversteer,
    Traction,
}

impl BehaviorCategory {
    pub const ALL: [BehaviorCategory; 3] = [
        BehaviorCategory::Understeer,
        BehaviorCategory::Oversteer,
        BehaviorCategory::Traction,
    ];
}

impl fmt::Display for BehaviorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BehaviorCategory::Understeer => "understeer",
            BehaviorCategory::Oversteer => "oversteer",
            BehaviorCategory::Traction => "traction",
        };
        write!(f, "{name}")
    }
}

/// Append-only store of session records with correlation queries on top.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetupCorrelator {
    sessions: Vec<SessionRecord>,
}

impl SetupCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract and store a record from a session. Returns `false` for
    /// sessions with no setup or no valid lap.
    pub fn add_session(&mut self, data: &SessionData) -> bool {
        match SessionRecord::from_session(data) {
            Some(record) => {
                self.add_record(record);
                true
            }
            None => {
                debug!(session = %data.session_id, "session has nothing to correlate");
                false
            }
        }
    }

    pub fn add_record(&mut self, record: SessionRecord) {
        self.sessions.push(record);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Correlation of every parameter against best lap time.
    ///
    /// Parameters with zero variance across sessions are omitted. With fewer
    /// than two sessions the list is empty.
    pub fn lap_time_correlations(&self) -> Vec<SetupCorrelation> {
        if self.sessions.len() < MIN_SESSIONS {
            warn!(
                sessions = self.sessions.len(),
                "not enough sessions to correlate"
            );
            return Vec::new();
        }

        let mut results: Vec<SetupCorrelation> = self
            .parameter_names()
            .into_iter()
            .filter_map(|name| self.correlate(&name, |r| r.lap_time, true))
            .collect();
        sort_by_confidence(&mut results);
        results
    }

    /// Correlations against each balance tendency, weak ones filtered out.
    ///
    /// Suggested changes stay zero here: a tendency is context, not a lap
    /// time, so only the direction is reported.
    pub fn behavior_correlations(&self) -> Vec<(BehaviorCategory, Vec<SetupCorrelation>)> {
        if self.sessions.len() < MIN_SESSIONS {
            warn!(
                sessions = self.sessions.len(),
                "not enough sessions to correlate"
            );
            return Vec::new();
        }

        BehaviorCategory::ALL
            .into_iter()
            .map(|category| {
                let outcome: fn(&SessionRecord) -> f64 = match category {
                    BehaviorCategory::Understeer => |r| r.understeer_tendency,
                    BehaviorCategory::Oversteer => |r| r.oversteer_tendency,
                    BehaviorCategory::Traction => |r| r.traction_tendency,
                };
                let mut results: Vec<SetupCorrelation> = self
                    .parameter_names()
                    .into_iter()
                    .filter_map(|name| self.correlate(&name, outcome, false))
                    .filter(|c| c.confidence >= BEHAVIOR_MIN_CONFIDENCE)
                    .collect();
                sort_by_confidence(&mut results);
                (category, results)
            })
            .collect()
    }

    /// Lap-time correlations confident enough to act on.
    pub fn optimal_setup_suggestions(&self) -> Vec<SetupCorrelation> {
        self.lap_time_correlations()
            .into_iter()
            .filter(|c| {
                c.confidence >= SUGGESTION_MIN_CONFIDENCE && c.trend != CorrelationTrend::Optimal
            })
            .collect()
    }

    /// Human-readable summary of everything the correlator knows.
    pub fn report(&self) -> String {
        let mut out = String::new();
        out.push_str("Setup correlation report\n");
        out.push_str(&format!("Sessions analyzed: {}\n", self.sessions.len()));
        out.push_str(&format!(
            "Parameters tracked: {}\n",
            self.parameter_names().len()
        ));

        let lap_time = self.lap_time_correlations();
        if !lap_time.is_empty() {
            out.push_str("\nLap time correlations:\n");
            for c in lap_time.iter().take(10) {
                out.push_str(&format!(
                    "- {}: r={:+.2}, confidence {:.0}%, {} (suggested change {:+.1}, best value {:.1})\n",
                    c.parameter, c.correlation, c.confidence, c.trend, c.suggested_change,
                    c.optimal_value,
                ));
            }
        }

        for (category, correlations) in self.behavior_correlations() {
            if correlations.is_empty() {
                continue;
            }
            out.push_str(&format!("\n{category} correlations:\n"));
            for c in correlations.iter().take(5) {
                out.push_str(&format!(
                    "- {}: r={:+.2}, confidence {:.0}%, {}\n",
                    c.parameter, c.correlation, c.confidence, c.trend,
                ));
            }
        }

        out.push_str("\nSessions:\n");
        for record in &self.sessions {
            out.push_str(&format!(
                "- {}: best lap {:.3}s, understeer {:.0}%, oversteer {:.0}%, wheelspin {:.0}%\n",
                record.session_id,
                record.lap_time,
                record.understeer_tendency,
                record.oversteer_tendency,
                record.traction_tendency,
            ));
        }
        out
    }

    /// Parameter names in first-seen order across all sessions.
    fn parameter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for record in &self.sessions {
            for (name, _) in &record.parameters {
                if !names.iter().any(|n| n == name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    /// Correlate one parameter against an outcome over all sessions that
    /// carry it. Lower outcomes are better.
    fn correlate(
        &self,
        name: &str,
        outcome: impl Fn(&SessionRecord) -> f64,
        with_change: bool,
    ) -> Option<SetupCorrelation> {
        let points: Vec<(f64, f64)> = self
            .sessions
            .iter()
            .filter_map(|r| r.parameter(name).map(|v| (v, outcome(r))))
            .collect();
        if points.len() < MIN_SESSIONS {
            return None;
        }

        let correlation = pearson(&points)?;
        let n = points.len() as f64;
        let confidence = (correlation.abs() * 100.0 * (n + 1.0).log2()).min(100.0);

        // Most recent session defines the current value.
        let current = self
            .sessions
            .iter()
            .rev()
            .find_map(|r| r.parameter(name))?;
        let observed_min = points.iter().map(|(v, _)| *v).fold(f64::INFINITY, f64::min);
        let observed_max = points
            .iter()
            .map(|(v, _)| *v)
            .fold(f64::NEG_INFINITY, f64::max);
        let optimal_value = points
            .iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(v, _)| *v)?;

        let (trend, suggested_change) = if correlation.abs() < SIGNIFICANCE_CUTOFF {
            (CorrelationTrend::Optimal, 0.0)
        } else if correlation < 0.0 {
            // Higher values go with better outcomes.
            let change = if with_change {
                (observed_max - current) * CHANGE_FRACTION
            } else {
                0.0
            };
            (CorrelationTrend::Increase, change)
        } else {
            let change = if with_change {
                (current - observed_min) * CHANGE_FRACTION
            } else {
                0.0
            };
            (CorrelationTrend::Decrease, change)
        };

        Some(SetupCorrelation {
            parameter: name.to_string(),
            correlation,
            confidence,
            trend,
            suggested_change,
            optimal_value,
            sessions: points.len(),
        })
    }
}

/// Pearson coefficient over (x, y) pairs, or `None` when either series has
/// zero variance.
fn pearson(points: &[(f64, f64)]) -> Option<f64> {
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sum_x2: f64 = points.iter().map(|(x, _)| x * x).sum();
    let sum_y2: f64 = points.iter().map(|(_, y)| y * y).sum();

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();
    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        None
    }
}

fn sort_by_confidence(results: &mut [SetupCorrelation]) {
    results.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.parameter.cmp(&b.parameter))
    });
}
