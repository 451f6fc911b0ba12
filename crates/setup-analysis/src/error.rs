use thiserror::Error;

/// Errors raised by analyzer configuration.
///
/// The analysis itself never errors; partial or missing telemetry degrades to
/// neutral results instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("sample buffer capacity must be nonzero")]
    ZeroSampleCapacity,

    #[error("lap history capacity must be nonzero")]
    ZeroLapHistory,

    #[error("steering lock must be positive, got {0}")]
    InvalidSteeringLock(f32),
}
