//! Cross-session setup correlation.
//!
//! Collects one record per driven session (flattened setup parameters, best
//! valid lap time, balance tendencies) and computes Pearson correlations of
//! each parameter against lap time and against the balance tendencies. With
//! enough sessions on varied setups this surfaces which knobs actually move
//! the stopwatch for a given driver and track.

pub mod correlator;
pub mod record;

pub use correlator::{BehaviorCategory, SetupCorrelator};
pub use record::SessionRecord;
