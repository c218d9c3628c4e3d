use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use skillquest_common::SkillQuestError;

/// Renders domain errors as `{"error": "..."}` with a matching status.
#[derive(Debug)]
pub struct ApiError(pub SkillQuestError);

impl From<SkillQuestError> for ApiError {
    fn from(err: SkillQuestError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SkillQuestError::NotFound { .. } => StatusCode::NOT_FOUND,
            SkillQuestError::Conflict(_) => StatusCode::CONFLICT,
            SkillQuestError::InvalidState(_)
            | SkillQuestError::Validation(_)
            | SkillQuestError::UnregisteredActionType(_) => StatusCode::BAD_REQUEST,
            SkillQuestError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            SkillQuestError::Store(cause) => {
                tracing::error!(error = ?cause, "Store failure");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
