use thiserror::Error;

/// Errors raised while loading or validating knowledge tables.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("invalid knowledge table JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate parameter id `{0}`")]
    DuplicateParameter(String),

    #[error("parameter `{id}` has effect weight {weight} outside -1.0..=1.0")]
    WeightOutOfRange { id: String, weight: f32 },

    #[error("parameter `{0}` declares no effects")]
    EmptyEffects(String),
}
