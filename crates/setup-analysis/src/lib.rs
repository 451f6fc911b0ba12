//! Telemetry analysis: phase classification, corner segmentation, behavior
//! detection and handling-problem aggregation.
//!
//! Two paths feed the rest of the pipeline:
//!
//! - the **lap path** ([`TelemetryAnalyzer`]) works on complete recorded
//!   sessions: it segments the track into corners from a reference lap,
//!   analyzes every pass through every corner and aggregates a
//!   [`BehaviorProfile`];
//! - the **streaming path** ([`SessionAnalyzer`]) ingests live samples one at
//!   a time, closes laps as the lap counter changes and keeps a bounded
//!   history of per-lap [`LapInsight`] results.
//!
//! Both paths degrade on missing data instead of erroring; the only fallible
//! operation is configuration validation.

pub mod behavior;
pub mod corners;
pub mod error;
pub mod phase;
pub mod problems;
pub mod session;
pub mod stats;

pub use behavior::{detect_oversteer, detect_traction_loss, detect_understeer, Detection};
pub use corners::{analyze_lap_corners, detect_corners};
pub use error::AnalysisError;
pub use phase::{classify_corner_phase, classify_drive_phase, tag_corner_phases};
pub use problems::{coarse_phases, detect_problems, phase_behavior, PhaseBehavior};
pub use session::{AnalyzerConfig, LapInsight, SessionAnalyzer, SessionSummary};
pub use stats::{BehaviorProfile, TelemetryAnalyzer};
