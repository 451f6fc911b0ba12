//! Rule evaluation over free-text feedback.

use paddock_telemetry_core::CarSetup;
use tracing::debug;

use crate::diagnostic::{Diagnostic, RuleProblem, Severity};
use crate::rules::{default_rules, recommendations_for, FeedbackRule};

/// Matches driver feedback against the rule table and emits diagnostics.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<FeedbackRule>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl RuleEngine {
    /// Engine with the built-in rule table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with no rules; callers register their own.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn register(&mut self, rule: FeedbackRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[FeedbackRule] {
        &self.rules
    }

    /// Mutable access to one rule, for swapping keyword lists per locale.
    pub fn rule_mut(&mut self, id: &str) -> Option<&mut FeedbackRule> {
        self.rules.iter_mut().find(|r| r.id == id)
    }

    /// Evaluate every rule against the feedback text.
    ///
    /// Matching is case-insensitive substring search. Dangerous diagnoses
    /// (rear lockup, power oversteer) are escalated to critical no matter
    /// what the rule table says. Results come back critical-first, then by
    /// priority.
    pub fn evaluate(&self, setup: &CarSetup, feedback: &str) -> Vec<Diagnostic> {
        let normalized = feedback.to_lowercase();

        let mut diagnostics: Vec<Diagnostic> = self
            .rules
            .iter()
            .filter(|rule| rule.matches(&normalized))
            .map(|rule| {
                let severity = if rule.problem.is_dangerous() {
                    Severity::Critical
                } else {
                    rule.severity
                };
                Diagnostic {
                    rule_id: rule.id.clone(),
                    title: rule.title.clone(),
                    description: rule.description.clone(),
                    severity,
                    category: rule.category,
                    problem: rule.problem,
                    phase: rule.phase,
                    priority: 1,
                    recommendations: recommendations_for(rule.problem, setup),
                }
            })
            .collect();

        diagnostics.sort_by_key(|d| (d.severity.rank(), d.priority));

        debug!(
            matched = diagnostics.len(),
            rules = self.rules.len(),
            "evaluated driver feedback"
        );
        diagnostics
    }

    /// Evaluate only the rules diagnosing one specific problem.
    pub fn evaluate_for_problem(
        &self,
        setup: &CarSetup,
        feedback: &str,
        problem: RuleProblem,
    ) -> Vec<Diagnostic> {
        let normalized = feedback.to_lowercase();
        self.rules
            .iter()
            .filter(|rule| rule.problem == problem && rule.matches(&normalized))
            .map(|rule| Diagnostic {
                rule_id: rule.id.clone(),
                title: rule.title.clone(),
                description: rule.description.clone(),
                severity: if rule.problem.is_dangerous() {
                    Severity::Critical
                } else {
                    rule.severity
                },
                category: rule.category,
                problem: rule.problem,
                phase: rule.phase,
                priority: 1,
                recommendations: recommendations_for(rule.problem, setup),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_telemetry_core::Adjustment;

    fn gt3_setup() -> CarSetup {
        let mut setup = CarSetup::default();
        setup.front_arb = 120_000.0;
        setup.rear_arb = 90_000.0;
        setup.brake_bias = 56.0;
        setup.brake_pressure = 95.0;
        setup.diff_power = 60.0;
        setup.diff_coast = 40.0;
        setup.diff_preload = 50.0;
        setup.traction_control = 3.0;
        setup.rear_wing = 8.0;
        setup
    }

    #[test]
    fn silence_produces_no_diagnostics() {
        let engine = RuleEngine::new();
        assert!(engine.evaluate(&gt3_setup(), "").is_empty());
        assert!(engine.evaluate(&gt3_setup(), "car feels great").is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let engine = RuleEngine::new();
        let diagnostics = engine.evaluate(&gt3_setup(), "Bad UNDERSTEER ENTRY into T3");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule_id, "understeer_entry");
    }

    #[test]
    fn rear_lockup_is_critical_and_sorts_first() {
        let engine = RuleEngine::new();
        let diagnostics = engine.evaluate(
            &gt3_setup(),
            "understeer entry everywhere, and rear lockup into the chicane",
        );
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].rule_id, "rear_lockup");
        assert_eq!(diagnostics[0].severity, Severity::Critical);
        assert_eq!(diagnostics[1].severity, Severity::Warning);
    }

    #[test]
    fn power_oversteer_escalates_past_its_table_severity() {
        let engine = RuleEngine::new();
        let diagnostics = engine.evaluate(&gt3_setup(), "snap oversteer on throttle");
        let power = diagnostics
            .iter()
            .find(|d| d.rule_id == "power_oversteer")
            .unwrap();
        assert_eq!(power.severity, Severity::Critical);
    }

    #[test]
    fn power_oversteer_keyword_also_fires_exit_rule() {
        // Shared keyword: both the balance rule and the traction rule match.
        let engine = RuleEngine::new();
        let diagnostics = engine.evaluate(&gt3_setup(), "power oversteer out of the hairpin");
        let ids: Vec<&str> = diagnostics.iter().map(|d| d.rule_id.as_str()).collect();
        assert!(ids.contains(&"power_oversteer"));
        assert!(ids.contains(&"oversteer_exit"));
        // The escalated diagnosis outranks the warning-level one.
        assert_eq!(diagnostics[0].rule_id, "power_oversteer");
    }

    #[test]
    fn understeer_entry_recommendations_match_the_table() {
        let engine = RuleEngine::new();
        let diagnostics = engine.evaluate(&gt3_setup(), "push entry");
        let recs = &diagnostics[0].recommendations;
        assert_eq!(recs.len(), 4);
        assert_eq!(recs[0].parameter, "front_arb");
        assert_eq!(recs[0].direction, Adjustment::Decrease);
        assert_eq!(recs[0].recommended, "115000 N/mm");
        assert_eq!(recs[2].parameter, "brake_bias");
        assert_eq!(recs[2].recommended, "54.0%");
    }

    #[test]
    fn affected_parameters_come_back_in_order() {
        let engine = RuleEngine::new();
        let diagnostics = engine.evaluate(&gt3_setup(), "loose entry");
        let affected = diagnostics[0].affected_parameters();
        assert_eq!(
            affected,
            ["rear_arb", "front_arb", "brake_bias", "diff_coast"]
        );
    }

    #[test]
    fn filtering_by_problem_ignores_other_matches() {
        let engine = RuleEngine::new();
        let diagnostics = engine.evaluate_for_problem(
            &gt3_setup(),
            "wheelspin and understeer entry",
            RuleProblem::Wheelspin,
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule_id, "wheelspin");
    }

    #[test]
    fn localized_keywords_can_be_swapped() {
        let mut engine = RuleEngine::new();
        let rule = engine.rule_mut("wheelspin").unwrap();
        rule.keywords = vec!["durchdrehende raeder".to_string()];
        assert!(engine.evaluate(&gt3_setup(), "wheelspin").is_empty());
        let diagnostics = engine.evaluate(&gt3_setup(), "Durchdrehende Raeder am Kurvenausgang");
        assert_eq!(diagnostics.len(), 1);
    }
}
