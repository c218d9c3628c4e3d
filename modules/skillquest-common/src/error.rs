use thiserror::Error;

/// Error taxonomy shared by the store, the engine and the HTTP surface.
#[derive(Error, Debug)]
pub enum SkillQuestError {
    #[error("{entity} with identifier '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No handler registered for action type: {0}")]
    UnregisteredActionType(String),

    /// Underlying persistence failure. Always carries the original cause.
    #[error("Store error: {0}")]
    Store(#[source] anyhow::Error),
}

impl SkillQuestError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn store(err: impl Into<anyhow::Error>) -> Self {
        Self::Store(err.into())
    }
}

/// Result type alias for every fallible domain operation.
pub type Result<T> = std::result::Result<T, SkillQuestError>;
