//! Static setup knowledge for the recommendation pipeline.
//!
//! Two tables live here: the [`EffectTable`] mapping setup parameters to the
//! handling problems they influence, and the per-class [`OperatingRanges`]
//! for tire, brake and engine temperatures.
//!
//! Both ship with built-in defaults and can be overridden from JSON, so a
//! tuned table for a specific car can be dropped in without a rebuild.

pub mod effects;
pub mod error;
pub mod ranges;

pub use effects::{EffectTable, ParameterCategory, ParameterSpec};
pub use error::KnowledgeError;
pub use ranges::{OperatingRange, OperatingRanges};
