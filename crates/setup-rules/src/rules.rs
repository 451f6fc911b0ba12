//! The built-in rule table and per-problem recommendations.
//!
//! Rules are plain data: a keyword list over normalized feedback text plus
//! metadata. The default table carries English and French keywords; callers
//! can edit or replace keyword lists for other locales without touching the
//! matching logic.

use paddock_telemetry_core::{Adjustment, CarSetup, DrivePhase};
use serde::{Deserialize, Serialize};

use crate::diagnostic::{DiagnosticCategory, RuleProblem, RuleRecommendation, Severity};

/// One keyword-triggered diagnostic rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRule {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: DiagnosticCategory,
    pub severity: Severity,
    pub problem: RuleProblem,
    pub phase: DrivePhase,
    /// Lowercase substrings; any hit fires the rule.
    pub keywords: Vec<String>,
}

impl FeedbackRule {
    /// Substring match against already-lowercased feedback.
    pub fn matches(&self, normalized_feedback: &str) -> bool {
        self.keywords
            .iter()
            .any(|kw| normalized_feedback.contains(kw.as_str()))
    }
}

fn rule(
    id: &str,
    title: &str,
    description: &str,
    category: DiagnosticCategory,
    severity: Severity,
    problem: RuleProblem,
    phase: DrivePhase,
    keywords: &[&str],
) -> FeedbackRule {
    FeedbackRule {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category,
        severity,
        problem,
        phase,
        keywords: keywords.iter().map(|kw| kw.to_string()).collect(),
    }
}

/// The ten built-in rules, in evaluation order.
pub fn default_rules() -> Vec<FeedbackRule> {
    use DiagnosticCategory as Cat;
    use DrivePhase as Phase;
    use RuleProblem as P;
    use Severity as Sev;

    vec![
        rule(
            "understeer_entry",
            "Understeer on Entry",
            "The car pushes when entering corners, especially during trail \
             braking. The front tires lose grip before the rears.",
            Cat::Balance,
            Sev::Warning,
            P::UndersteerEntry,
            Phase::Entry,
            &["understeer entry", "push entry", "sous-virage entree"],
        ),
        rule(
            "understeer_mid",
            "Understeer at Mid-Corner",
            "The car understeers at the apex and through mid-corner. This is \
             typically a mechanical grip issue at the front.",
            Cat::Balance,
            Sev::Warning,
            P::UndersteerMid,
            Phase::Mid,
            &["understeer mid", "push mid", "sous-virage milieu"],
        ),
        rule(
            "oversteer_entry",
            "Oversteer on Entry",
            "The rear becomes loose when entering corners, especially under \
             braking. This can lead to spins.",
            Cat::Balance,
            Sev::Warning,
            P::OversteerEntry,
            Phase::Entry,
            &["oversteer entry", "loose entry", "survirage entree"],
        ),
        rule(
            "oversteer_mid",
            "Oversteer at Mid-Corner",
            "The rear slides at mid-corner during steady-state cornering. \
             This indicates a mechanical grip imbalance.",
            Cat::Balance,
            Sev::Warning,
            P::OversteerMid,
            Phase::Mid,
            &["oversteer mid", "loose mid", "survirage milieu"],
        ),
        rule(
            "oversteer_exit",
            "Oversteer on Exit",
            "The rear slides when applying power exiting corners. This is \
             often due to differential settings or traction issues.",
            Cat::Balance,
            Sev::Warning,
            P::OversteerExit,
            Phase::Exit,
            &[
                "oversteer exit",
                "loose exit",
                "survirage sortie",
                "power oversteer",
                "wheelspin exit",
            ],
        ),
        rule(
            "wheelspin",
            "Excessive Wheelspin",
            "Excessive wheelspin under acceleration, especially exiting slow \
             corners. This hurts acceleration and tire life.",
            Cat::Traction,
            Sev::Warning,
            P::Wheelspin,
            Phase::Acceleration,
            &[
                "wheelspin",
                "patinage",
                "spinning",
                "traction",
                "roues qui patinent",
                "wheel spin",
            ],
        ),
        rule(
            "power_oversteer",
            "Power Oversteer",
            "The rear snaps out suddenly when applying throttle. This is \
             dangerous and needs to be addressed for car control.",
            Cat::Traction,
            Sev::Warning,
            P::PowerOversteer,
            Phase::Exit,
            &[
                "power oversteer",
                "snap oversteer",
                "survirage acceleration",
                "rear snap",
                "arriere part a l'acceleration",
            ],
        ),
        rule(
            "front_lockup",
            "Front Wheel Lockup",
            "The front wheels are locking under braking. This causes flat \
             spots, reduces steering, and extends braking distance.",
            Cat::Braking,
            Sev::Warning,
            P::FrontLockup,
            Phase::Braking,
            &[
                "front lock",
                "front lockup",
                "blocage avant",
                "front wheels lock",
                "avant bloque",
            ],
        ),
        rule(
            "rear_lockup",
            "Rear Wheel Lockup",
            "The rear wheels are locking under braking. This causes spins \
             and must be fixed immediately.",
            Cat::Braking,
            Sev::Critical,
            P::RearLockup,
            Phase::Braking,
            &[
                "rear lock",
                "rear lockup",
                "blocage arriere",
                "rear wheels lock",
                "arriere bloque",
                "spin braking",
            ],
        ),
        rule(
            "braking_instability",
            "Braking Instability",
            "The car feels unstable and nervous under heavy braking. This \
             makes it hard to brake late and accurately.",
            Cat::Braking,
            Sev::Warning,
            P::BrakingInstability,
            Phase::Braking,
            &[
                "unstable braking",
                "instable freinage",
                "dancing",
                "brake instability",
                "nervous braking",
            ],
        ),
    ]
}

/// Anti-roll bar and spring adjustment increment, N/mm.
const STIFFNESS_STEP: f32 = 5000.0;

fn rec(
    parameter: &str,
    current: String,
    recommended: String,
    direction: Adjustment,
    amount: &str,
    confidence: f32,
    explanation: &str,
) -> RuleRecommendation {
    RuleRecommendation {
        parameter: parameter.to_string(),
        current,
        recommended,
        direction,
        amount: amount.to_string(),
        confidence,
        explanation: explanation.to_string(),
    }
}

fn stiffness(value: f32) -> String {
    format!("{value:.0} N/mm")
}

fn pct1(value: f32) -> String {
    format!("{value:.1}%")
}

fn pct0(value: f32) -> String {
    format!("{value:.0}%")
}

fn mm0(value: f32) -> String {
    format!("{value:.0}mm")
}

fn nm0(value: f32) -> String {
    format!("{value:.0} Nm")
}

fn deg1(value: f32) -> String {
    format!("{value:.1}")
}

fn level0(value: f32) -> String {
    format!("{value:.0}")
}

/// Fixed parameter recommendations per diagnosed problem, with proposed
/// values clamped to sane operating bounds.
pub fn recommendations_for(problem: RuleProblem, setup: &CarSetup) -> Vec<RuleRecommendation> {
    use Adjustment::{Decrease, Increase};

    match problem {
        RuleProblem::UndersteerEntry => vec![
            rec(
                "front_arb",
                stiffness(setup.front_arb),
                stiffness((setup.front_arb - STIFFNESS_STEP).max(0.0)),
                Decrease,
                "2-3 clicks",
                0.85,
                "Softer front ARB increases mechanical grip on entry",
            ),
            rec(
                "rear_arb",
                stiffness(setup.rear_arb),
                stiffness(setup.rear_arb + STIFFNESS_STEP),
                Increase,
                "2-3 clicks",
                0.75,
                "Stiffer rear ARB reduces rear grip, rotating the car",
            ),
            rec(
                "brake_bias",
                pct1(setup.brake_bias),
                pct1((setup.brake_bias - 2.0).max(50.0)),
                Decrease,
                "-1-2%",
                0.8,
                "More rear braking rotates the car on entry",
            ),
            rec(
                "diff_coast",
                pct0(setup.diff_coast),
                pct0((setup.diff_coast - 10.0).max(10.0)),
                Decrease,
                "-5-10%",
                0.7,
                "Lower coast lock allows more rotation on deceleration",
            ),
        ],
        RuleProblem::UndersteerMid => vec![
            rec(
                "front_spring",
                stiffness(setup.front_spring_rate()),
                stiffness(setup.front_spring_rate() * 0.95),
                Decrease,
                "-5%",
                0.75,
                "Softer front springs increase mechanical grip at apex",
            ),
            rec(
                "front_camber",
                deg1(setup.front_camber()),
                deg1(setup.front_camber() - 0.3),
                Decrease,
                "-0.2 to -0.3",
                0.8,
                "More negative camber improves cornering grip",
            ),
            rec(
                "front_ride_height",
                mm0(setup.front_ride_height()),
                mm0((setup.front_ride_height() - 3.0).max(20.0)),
                Decrease,
                "-2-3mm",
                0.7,
                "Lower front increases front downforce effect",
            ),
        ],
        RuleProblem::OversteerEntry => vec![
            rec(
                "rear_arb",
                stiffness(setup.rear_arb),
                stiffness((setup.rear_arb - STIFFNESS_STEP).max(0.0)),
                Decrease,
                "2-3 clicks",
                0.85,
                "Softer rear ARB increases rear grip on entry",
            ),
            rec(
                "front_arb",
                stiffness(setup.front_arb),
                stiffness(setup.front_arb + STIFFNESS_STEP),
                Increase,
                "2-3 clicks",
                0.75,
                "Stiffer front ARB reduces front grip transfer",
            ),
            rec(
                "brake_bias",
                pct1(setup.brake_bias),
                pct1((setup.brake_bias + 2.0).min(65.0)),
                Increase,
                "+1-2%",
                0.85,
                "More front braking stabilizes the rear on entry",
            ),
            rec(
                "diff_coast",
                pct0(setup.diff_coast),
                pct0((setup.diff_coast + 10.0).min(80.0)),
                Increase,
                "+5-10%",
                0.75,
                "Higher coast lock stabilizes the rear under deceleration",
            ),
        ],
        RuleProblem::OversteerMid => vec![
            rec(
                "rear_spring",
                stiffness(setup.rear_spring_rate()),
                stiffness(setup.rear_spring_rate() * 0.95),
                Decrease,
                "-5%",
                0.75,
                "Softer rear springs increase mechanical rear grip",
            ),
            rec(
                "rear_camber",
                deg1(setup.rear_camber()),
                deg1(setup.rear_camber() - 0.2),
                Decrease,
                "-0.2",
                0.8,
                "More negative camber improves rear cornering grip",
            ),
            rec(
                "rear_wing",
                level0(setup.rear_wing),
                level0((setup.rear_wing + 2.0).min(40.0)),
                Increase,
                "+1-2",
                0.7,
                "More rear downforce increases rear grip",
            ),
        ],
        RuleProblem::OversteerExit => vec![
            rec(
                "diff_power",
                pct0(setup.diff_power),
                pct0((setup.diff_power - 10.0).max(20.0)),
                Decrease,
                "-5-10%",
                0.85,
                "Lower power lock reduces wheelspin tendency",
            ),
            rec(
                "diff_preload",
                nm0(setup.diff_preload),
                nm0((setup.diff_preload - 10.0).max(0.0)),
                Decrease,
                "-10 Nm",
                0.7,
                "Lower preload allows more wheel speed difference",
            ),
            rec(
                "rear_ride_height",
                mm0(setup.rear_ride_height()),
                mm0((setup.rear_ride_height() + 2.0).min(80.0)),
                Increase,
                "+2mm",
                0.6,
                "Higher rear can improve traction",
            ),
            rec(
                "traction_control",
                level0(setup.traction_control),
                level0((setup.traction_control + 1.0).min(10.0)),
                Increase,
                "+1",
                0.9,
                "TC helps manage wheelspin on exit",
            ),
        ],
        RuleProblem::Wheelspin => vec![
            rec(
                "diff_power",
                pct0(setup.diff_power),
                pct0((setup.diff_power - 15.0).max(20.0)),
                Decrease,
                "-10-15%",
                0.9,
                "Lower power lock lets the inside wheel spin less",
            ),
            rec(
                "diff_preload",
                nm0(setup.diff_preload),
                nm0((setup.diff_preload - 20.0).max(0.0)),
                Decrease,
                "-15-20 Nm",
                0.75,
                "Lower preload reduces the initial diff lock effect",
            ),
            rec(
                "traction_control",
                level0(setup.traction_control),
                level0((setup.traction_control + 2.0).min(10.0)),
                Increase,
                "+2",
                0.95,
                "TC is the most effective way to manage wheelspin",
            ),
            rec(
                "rear_ride_height",
                mm0(setup.rear_ride_height()),
                mm0((setup.rear_ride_height() + 3.0).min(80.0)),
                Increase,
                "+2-3mm",
                0.65,
                "Higher rear can improve mechanical grip",
            ),
            rec(
                "rear_spring",
                stiffness(setup.rear_spring_rate()),
                stiffness(setup.rear_spring_rate() * 0.92),
                Decrease,
                "-5-8%",
                0.7,
                "Softer rear springs improve traction",
            ),
        ],
        RuleProblem::PowerOversteer => vec![
            rec(
                "diff_power",
                pct0(setup.diff_power),
                pct0((setup.diff_power - 20.0).max(15.0)),
                Decrease,
                "-15-20%",
                0.95,
                "Lower power lock to reduce snap oversteer",
            ),
            rec(
                "traction_control",
                level0(setup.traction_control),
                level0((setup.traction_control + 3.0).min(10.0)),
                Increase,
                "+2-3",
                0.9,
                "TC helps prevent sudden power application issues",
            ),
            rec(
                "rear_arb",
                stiffness(setup.rear_arb),
                stiffness((setup.rear_arb - STIFFNESS_STEP).max(0.0)),
                Decrease,
                "3-4 clicks",
                0.8,
                "Softer rear ARB gives more progressive rear behavior",
            ),
            rec(
                "rear_slow_bump",
                level0(rear_slow_bump(setup)),
                level0((rear_slow_bump(setup) + 2.0).min(20.0)),
                Increase,
                "+2 clicks",
                0.7,
                "Stiffer bump controls squat under acceleration",
            ),
            rec(
                "rear_wing",
                level0(setup.rear_wing),
                level0((setup.rear_wing + 3.0).min(40.0)),
                Increase,
                "+2-3",
                0.75,
                "More rear downforce improves stability",
            ),
        ],
        RuleProblem::FrontLockup => {
            let mut recs = vec![rec(
                "brake_bias",
                pct1(setup.brake_bias),
                pct1((setup.brake_bias - 3.0).max(50.0)),
                Decrease,
                "-2-3%",
                0.9,
                "Less front brake pressure prevents front lockup",
            )];
            if setup.brake_pressure > 90.0 {
                recs.push(rec(
                    "brake_pressure",
                    pct0(setup.brake_pressure),
                    pct0(setup.brake_pressure - 5.0),
                    Decrease,
                    "-5%",
                    0.7,
                    "Lower overall pressure if modulation is difficult",
                ));
            }
            recs.push(rec(
                "front_ride_height",
                mm0(setup.front_ride_height()),
                mm0((setup.front_ride_height() + 2.0).min(80.0)),
                Increase,
                "+2mm",
                0.5,
                "Slightly higher front reduces dive and lockup tendency",
            ));
            recs
        }
        RuleProblem::RearLockup => vec![
            rec(
                "brake_bias",
                pct1(setup.brake_bias),
                pct1((setup.brake_bias + 4.0).min(65.0)),
                Increase,
                "+3-4%",
                0.95,
                "More front bias prevents dangerous rear lockup",
            ),
            rec(
                "diff_coast",
                pct0(setup.diff_coast),
                pct0((setup.diff_coast + 15.0).min(80.0)),
                Increase,
                "+10-15%",
                0.8,
                "Higher coast lock prevents the inside rear from locking",
            ),
            rec(
                "rear_arb",
                stiffness(setup.rear_arb),
                stiffness((setup.rear_arb - STIFFNESS_STEP).max(0.0)),
                Decrease,
                "2-3 clicks",
                0.7,
                "Softer rear ARB gives more rear grip under braking",
            ),
        ],
        RuleProblem::BrakingInstability => vec![
            rec(
                "front_slow_rebound",
                level0(front_slow_rebound(setup)),
                level0((front_slow_rebound(setup) + 2.0).min(20.0)),
                Increase,
                "+2 clicks",
                0.75,
                "Stiffer rebound controls front dive oscillation",
            ),
            rec(
                "rear_slow_bump",
                level0(rear_slow_bump(setup)),
                level0((rear_slow_bump(setup) + 2.0).min(20.0)),
                Increase,
                "+2 clicks",
                0.7,
                "Stiffer rear bump controls lift under braking",
            ),
            rec(
                "diff_coast",
                pct0(setup.diff_coast),
                pct0((setup.diff_coast + 10.0).min(80.0)),
                Increase,
                "+5-10%",
                0.8,
                "Higher coast lock improves straight-line stability",
            ),
        ],
    }
}

fn rear_slow_bump(setup: &CarSetup) -> f32 {
    (setup.rl.slow_bump + setup.rr.slow_bump) / 2.0
}

fn front_slow_rebound(setup: &CarSetup) -> f32 {
    (setup.fl.slow_rebound + setup.fr.slow_rebound) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_has_ten_rules() {
        let rules = default_rules();
        assert_eq!(rules.len(), 10);
        let ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        assert!(ids.contains(&"understeer_entry"));
        assert!(ids.contains(&"rear_lockup"));
        assert!(ids.contains(&"braking_instability"));
    }

    #[test]
    fn french_keywords_match() {
        let rules = default_rules();
        let lockup = rules.iter().find(|r| r.id == "rear_lockup").unwrap();
        assert!(lockup.matches("gros blocage arriere au freinage"));
        assert!(!lockup.matches("tout va bien"));
    }

    #[test]
    fn recommended_values_are_clamped() {
        let mut setup = CarSetup::default();
        setup.brake_bias = 64.0;
        setup.diff_coast = 75.0;
        let recs = recommendations_for(RuleProblem::RearLockup, &setup);
        let bias = recs.iter().find(|r| r.parameter == "brake_bias").unwrap();
        assert_eq!(bias.recommended, "65.0%");
        let coast = recs.iter().find(|r| r.parameter == "diff_coast").unwrap();
        assert_eq!(coast.recommended, "80%");
    }

    #[test]
    fn brake_pressure_advice_only_when_high() {
        let mut setup = CarSetup::default();
        setup.brake_pressure = 95.0;
        let recs = recommendations_for(RuleProblem::FrontLockup, &setup);
        assert!(recs.iter().any(|r| r.parameter == "brake_pressure"));

        setup.brake_pressure = 80.0;
        let recs = recommendations_for(RuleProblem::FrontLockup, &setup);
        assert!(!recs.iter().any(|r| r.parameter == "brake_pressure"));
    }

    #[test]
    fn arb_softening_never_goes_negative() {
        let setup = CarSetup::default();
        let recs = recommendations_for(RuleProblem::UndersteerEntry, &setup);
        let arb = recs.iter().find(|r| r.parameter == "front_arb").unwrap();
        assert_eq!(arb.recommended, "0 N/mm");
        assert_eq!(arb.direction, Adjustment::Decrease);
    }
}
