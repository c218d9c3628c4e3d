use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use skillquest_common::{ActionEvent, AssignQuest, QuestDefinition};

use super::ApiResult;
use crate::AppState;

pub async fn api_create_quest(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QuestDefinition>,
) -> ApiResult<impl IntoResponse> {
    let quest = state.engine.create_quest(&body).await?;
    Ok((StatusCode::CREATED, Json(quest)))
}

pub async fn api_quests(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.engine.get_all_quests().await?))
}

pub async fn api_assign_quest(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AssignQuest>,
) -> ApiResult<impl IntoResponse> {
    state.engine.assign_quest(&body).await?;
    Ok(Json(serde_json::json!({
        "message": "Quest assigned successfully"
    })))
}

pub async fn api_employee_quests(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.engine.get_employee_quests(employee_id).await?))
}

pub async fn api_quest_progress(
    State(state): State<Arc<AppState>>,
    Path((employee_id, quest_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state.engine.get_quest_progress(employee_id, quest_id).await?,
    ))
}

/// Apply an action event directly. Unlike internal dispatch, failures are
/// reported to the caller.
pub async fn api_quest_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<ActionEvent>,
) -> ApiResult<impl IntoResponse> {
    event.validate()?;
    let updated = state.engine.handle_event(&event).await?;
    info!(
        employee_id = event.employee_id,
        action_type = %event.action_type,
        updated = updated.len(),
        "Quest event applied"
    );
    Ok(Json(updated))
}
