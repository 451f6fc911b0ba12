//! Keyword-driven diagnosis of free-text driver feedback.
//!
//! The numeric pipeline sees what the telemetry says; this crate hears what
//! the driver says. A declarative rule table maps keyword hits in normalized
//! feedback text to diagnostics with fixed, clamped parameter
//! recommendations. Keyword lists are plain data and can be swapped per
//! locale; the built-in table ships English and French.

pub mod diagnostic;
pub mod engine;
pub mod rules;

pub use diagnostic::{
    Diagnostic, DiagnosticCategory, RuleProblem, RuleRecommendation, Severity,
};
pub use engine::RuleEngine;
pub use rules::{default_rules, recommendations_for, FeedbackRule};
