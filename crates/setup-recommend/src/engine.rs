//! Greedy recommendation generation with conflict penalties.
//!
//! Problems are visited in severity order. For each problem, every parameter
//! with a nonzero effect is scored by the magnitude of that effect; a
//! candidate whose other effects would push against a change already
//! recommended has its score halved per conflicting effect. The accumulator
//! makes the output order-dependent, which keeps the heuristic deterministic
//! but means it is not a global optimum. That is intentional.

use paddock_setup_knowledge::{EffectTable, ParameterSpec};
use paddock_telemetry_core::{Adjustment, CarSetup, Problem, ProblemMap, Recommendation};
use tracing::debug;

/// Never emit more than this many recommendations.
const MAX_RECOMMENDATIONS: usize = 5;
/// Only the most severe problems are worth touching the setup for.
const MAX_PROBLEMS: usize = 5;
/// Problems below this severity are ignored.
const MIN_PROBLEM_SEVERITY: f32 = 0.2;
/// Candidates scoring at or below this are dropped.
const MIN_SCORE: f32 = 0.1;
/// Score multiplier per effect that fights an already-applied change.
const CONFLICT_PENALTY: f32 = 0.5;
/// At most this many parameters are recommended per problem.
const PER_PROBLEM_LIMIT: usize = 2;
/// A change must worsen another problem by more than this to warrant a warning.
const SIDE_EFFECT_THRESHOLD: f32 = 0.1;
/// Side effects on problems below this severity are not worth mentioning.
const SIDE_EFFECT_MIN_SEVERITY: f32 = 0.3;

struct Candidate<'a> {
    spec: &'a ParameterSpec,
    adjustment: Adjustment,
    score: f32,
}

/// Generates ranked setup recommendations from diagnosed problems.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    table: EffectTable,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(EffectTable::builtin())
    }
}

impl RecommendationEngine {
    pub fn new(table: EffectTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &EffectTable {
        &self.table
    }

    /// Generate at most five recommendations, one parameter each.
    ///
    /// When `setup` is provided the suggested change is concrete
    /// (`"120000 -> 125000"`); otherwise it falls back to a click count.
    pub fn generate(
        &self,
        problems: &ProblemMap,
        setup: Option<&CarSetup>,
    ) -> Vec<Recommendation> {
        let mut applied: Vec<(Problem, f32)> = Vec::new();
        let mut recommendations = Vec::new();

        for (problem, severity) in problems
            .sorted_by_severity()
            .into_iter()
            .take(MAX_PROBLEMS)
        {
            if severity < MIN_PROBLEM_SEVERITY {
                continue;
            }

            let mut candidates: Vec<Candidate<'_>> = self
                .table
                .affecting(problem)
                .filter_map(|spec| {
                    let effect = spec.effect_on(problem);
                    let adjustment = if effect < 0.0 {
                        Adjustment::Increase
                    } else {
                        Adjustment::Decrease
                    };
                    let mut score = effect.abs();
                    for (other, weight) in &spec.effects {
                        if let Some(prior) = applied_effect(&applied, *other) {
                            if (*weight > 0.0 && prior < 0.0) || (*weight < 0.0 && prior > 0.0) {
                                score *= CONFLICT_PENALTY;
                            }
                        }
                    }
                    (score > MIN_SCORE).then_some(Candidate {
                        spec,
                        adjustment,
                        score,
                    })
                })
                .collect();
            // Stable, so equal scores keep table registration order.
            candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

            for candidate in candidates.into_iter().take(PER_PROBLEM_LIMIT) {
                let multiplier = candidate.adjustment.multiplier();

                let side_effects: Vec<String> = candidate
                    .spec
                    .effects
                    .iter()
                    .filter(|(other, weight)| {
                        *other != problem
                            && weight * multiplier > SIDE_EFFECT_THRESHOLD
                            && problems.get(*other).unwrap_or(0.0) > SIDE_EFFECT_MIN_SEVERITY
                    })
                    .map(|(other, _)| format!("may aggravate {}", other.label()))
                    .collect();

                recommendations.push(Recommendation {
                    parameter: candidate.spec.id.clone(),
                    adjustment: candidate.adjustment,
                    priority: priority_from_severity(severity),
                    confidence: (candidate.score * severity).min(1.0),
                    reason: format!("counters {}", problem.label()),
                    suggested_change: suggest_change(candidate.spec, candidate.adjustment, setup),
                    addresses: vec![problem],
                    side_effects,
                });

                for (other, weight) in &candidate.spec.effects {
                    accumulate(&mut applied, *other, weight * multiplier);
                }
            }
        }

        // One recommendation per parameter, keeping the highest-priority one.
        recommendations.sort_by(|a, b| b.priority.cmp(&a.priority));
        let mut seen: Vec<String> = Vec::new();
        recommendations.retain(|r| {
            if seen.iter().any(|s| s == &r.parameter) {
                false
            } else {
                seen.push(r.parameter.clone());
                true
            }
        });
        recommendations.truncate(MAX_RECOMMENDATIONS);

        debug!(
            problems = problems.len(),
            recommendations = recommendations.len(),
            "generated setup recommendations"
        );
        recommendations
    }
}

fn applied_effect(applied: &[(Problem, f32)], problem: Problem) -> Option<f32> {
    applied
        .iter()
        .find(|(p, _)| *p == problem)
        .map(|(_, v)| *v)
}

fn accumulate(applied: &mut Vec<(Problem, f32)>, problem: Problem, delta: f32) {
    if let Some(entry) = applied.iter_mut().find(|(p, _)| *p == problem) {
        entry.1 += delta;
    } else {
        applied.push((problem, delta));
    }
}

/// Severity 0.0..=1.0 mapped to priority 1..=10.
fn priority_from_severity(severity: f32) -> u8 {
    let scaled = (severity * 10.0).round().clamp(1.0, 10.0) as i32;
    u8::try_from(scaled).unwrap_or(10)
}

fn suggest_change(
    spec: &ParameterSpec,
    adjustment: Adjustment,
    setup: Option<&CarSetup>,
) -> String {
    match setup.and_then(|s| s.parameter(&spec.id)) {
        Some(current) => {
            let new = current + spec.step * adjustment.multiplier();
            format!("{current:.1} -> {new:.1}")
        }
        None => match adjustment {
            Adjustment::Increase => "+1-2 clicks/points".to_string(),
            Adjustment::Decrease => "-1-2 clicks/points".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use paddock_setup_knowledge::ParameterCategory;

    fn spec_with(id: &str, effects: &[(Problem, f32)]) -> ParameterSpec {
        ParameterSpec {
            id: id.to_string(),
            display_name: id.to_string(),
            unit: "clicks".to_string(),
            category: ParameterCategory::Suspension,
            step: 1.0,
            effects: effects.to_vec(),
        }
    }

    #[test]
    fn no_problems_means_no_recommendations() {
        let engine = RecommendationEngine::default();
        assert!(engine.generate(&ProblemMap::new(), None).is_empty());
    }

    #[test]
    fn faint_problems_are_ignored() {
        let engine = RecommendationEngine::default();
        let mut problems = ProblemMap::new();
        problems.insert(Problem::UndersteerEntry, 0.19);
        assert!(engine.generate(&problems, None).is_empty());
    }

    #[test]
    fn capped_at_five_with_unique_parameters() {
        let engine = RecommendationEngine::default();
        let mut problems = ProblemMap::new();
        for problem in Problem::ALL {
            problems.insert(problem, 0.9);
        }
        let recommendations = engine.generate(&problems, None);
        assert!(recommendations.len() <= 5);
        for (i, a) in recommendations.iter().enumerate() {
            for b in recommendations.iter().skip(i + 1) {
                assert_ne!(a.parameter, b.parameter);
            }
        }
    }

    #[test]
    fn direction_follows_effect_sign() {
        // front_arb reduces entry understeer when stiffened (negative weight).
        let engine = RecommendationEngine::default();
        let mut problems = ProblemMap::new();
        problems.insert(Problem::UndersteerEntry, 1.0);
        let recommendations = engine.generate(&problems, None);
        let top = recommendations.first().unwrap();
        assert_eq!(top.parameter, "front_arb");
        assert_eq!(top.adjustment, Adjustment::Increase);
        assert_eq!(top.priority, 10);
        assert_relative_eq!(top.confidence, 0.3);
    }

    #[test]
    fn conflicting_candidate_score_is_halved() {
        // "a" fixes P1 when increased but worsens P2; "b" fixes P2 when
        // decreased but its tiny P1 weight then fights the applied "a" change.
        let mut table = EffectTable::new();
        table
            .insert(spec_with(
                "a",
                &[(Problem::UndersteerEntry, -0.4), (Problem::OversteerExit, 0.4)],
            ))
            .unwrap();
        table
            .insert(spec_with(
                "b",
                &[(Problem::OversteerExit, 0.35), (Problem::UndersteerEntry, 0.05)],
            ))
            .unwrap();
        let engine = RecommendationEngine::new(table);

        let mut problems = ProblemMap::new();
        problems.insert(Problem::UndersteerEntry, 1.0);
        problems.insert(Problem::OversteerExit, 0.9);
        let recommendations = engine.generate(&problems, None);

        let b = recommendations
            .iter()
            .find(|r| r.parameter == "b")
            .unwrap();
        // Unpenalized: 0.35 * 0.9 = 0.315. Halved once: 0.1575.
        assert_relative_eq!(b.confidence, 0.1575, epsilon = 1e-6);

        // Without the competing problem the same candidate scores in full.
        let mut alone = ProblemMap::new();
        alone.insert(Problem::OversteerExit, 0.9);
        let solo = engine.generate(&alone, None);
        let b_solo = solo.iter().find(|r| r.parameter == "b").unwrap();
        assert_relative_eq!(b_solo.confidence, 0.315, epsilon = 1e-6);
    }

    #[test]
    fn recommendations_carry_their_target_problem() {
        let engine = RecommendationEngine::default();
        let mut problems = ProblemMap::new();
        problems.insert(Problem::UndersteerEntry, 1.0);
        problems.insert(Problem::Wheelspin, 0.8);
        let recommendations = engine.generate(&problems, None);
        assert!(!recommendations.is_empty());
        for rec in &recommendations {
            assert_eq!(rec.addresses.len(), 1);
        }
        let top = recommendations.first().unwrap();
        assert_eq!(top.addresses, vec![Problem::UndersteerEntry]);
    }

    #[test]
    fn side_effect_warning_names_the_aggravated_problem() {
        let engine = RecommendationEngine::default();
        let mut problems = ProblemMap::new();
        // Stiffening the front ARB fights understeer but worsens exit
        // oversteer (weight +0.2), which is itself diagnosed.
        problems.insert(Problem::UndersteerMid, 1.0);
        problems.insert(Problem::OversteerExit, 0.5);
        let recommendations = engine.generate(&problems, None);
        let arb = recommendations
            .iter()
            .find(|r| r.parameter == "front_arb")
            .unwrap();
        assert!(arb
            .side_effects
            .iter()
            .any(|w| w.contains("corner-exit oversteer")));
    }

    #[test]
    fn concrete_change_uses_parameter_step() {
        let engine = RecommendationEngine::default();
        let mut problems = ProblemMap::new();
        problems.insert(Problem::UndersteerEntry, 1.0);

        let mut setup = CarSetup::default();
        setup.front_arb = 120_000.0;
        let recommendations = engine.generate(&problems, Some(&setup));
        let top = recommendations.first().unwrap();
        assert_eq!(top.parameter, "front_arb");
        assert_eq!(top.suggested_change, "120000.0 -> 125000.0");
    }

    #[test]
    fn vague_change_without_a_setup() {
        let engine = RecommendationEngine::default();
        let mut problems = ProblemMap::new();
        problems.insert(Problem::UndersteerEntry, 1.0);
        let recommendations = engine.generate(&problems, None);
        let top = recommendations.first().unwrap();
        assert_eq!(top.suggested_change, "+1-2 clicks/points");
    }

    #[test]
    fn deduplication_keeps_highest_priority() {
        // rear_wing helps both problems; it must appear once, tagged with the
        // more severe problem's priority.
        let engine = RecommendationEngine::default();
        let mut problems = ProblemMap::new();
        problems.insert(Problem::InstabilityHighSpeed, 1.0);
        problems.insert(Problem::OversteerMid, 0.5);
        let recommendations = engine.generate(&problems, None);
        let wings: Vec<&Recommendation> = recommendations
            .iter()
            .filter(|r| r.parameter == "rear_wing")
            .collect();
        assert_eq!(wings.len(), 1);
        assert_eq!(wings[0].priority, 10);
        assert!(wings[0].reason.contains("high-speed instability"));
    }
}
