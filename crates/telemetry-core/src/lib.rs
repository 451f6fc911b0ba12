//! Telemetry and setup domain models for OpenPaddock.
//!
//! This crate holds the shared vocabulary of the analysis pipeline: raw
//! telemetry samples, lap and session containers, corner geometry and
//! per-corner analysis results, the closed `Problem` enumeration, the numeric
//! car setup record, and the recommendation/correlation output types.
//!
//! ## Modules
//! - `sample` - `TelemetrySample` and the per-wheel `WheelSet` container
//! - `phase` - coarse (`DrivePhase`) and fine (`CornerPhase`) driving phases
//! - `problem` - closed handling-problem enumeration with severity ranges
//! - `corner` - static corner geometry and per-lap corner analysis
//! - `lap` - lap/session containers with validity derivation
//! - `setup` - numeric car setup record (read-only for the pipeline)
//! - `report` - recommendation and correlation output types

pub mod corner;
pub mod lap;
pub mod phase;
pub mod problem;
pub mod report;
pub mod sample;
pub mod setup;

pub use corner::{CornerAnalysis, CornerDefinition, CornerDirection, CornerKind};
pub use lap::{Lap, SessionData, SessionKind};
pub use phase::{CornerPhase, DrivePhase};
pub use problem::{Problem, ProblemMap, VehicleClass};
pub use report::{Adjustment, CorrelationTrend, Recommendation, SetupCorrelation};
pub use sample::{TelemetrySample, WheelSet};
pub use setup::{CarSetup, CornerTuning, WheelPosition};
