//! Setup recommendation generation.
//!
//! Turns a diagnosed [`ProblemMap`](paddock_telemetry_core::ProblemMap) into a
//! short ranked list of setup changes, using the parameter effect table to
//! score candidates and to penalize changes that would fight an earlier
//! recommendation.

pub mod engine;

pub use engine::RecommendationEngine;
