use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use skillquest_common::{AddEmployeeSkill, NewSkill, UpdateEmployeeSkill};

use super::ApiResult;
use crate::AppState;

// --- Skill catalogue ---

pub async fn api_create_skill(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewSkill>,
) -> ApiResult<impl IntoResponse> {
    let skill = state.skills.create_skill(&body).await?;
    Ok((StatusCode::CREATED, Json(skill)))
}

pub async fn api_skills(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.skills.get_all_skills().await?))
}

// --- Employee skills ---

pub async fn api_add_employee_skill(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<i64>,
    Json(body): Json<AddEmployeeSkill>,
) -> ApiResult<impl IntoResponse> {
    let detail = state.employee_skills.add_skill(employee_id, &body).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn api_employee_skills(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state.employee_skills.get_employee_skills(employee_id).await?,
    ))
}

pub async fn api_update_employee_skill(
    State(state): State<Arc<AppState>>,
    Path((employee_id, skill_id)): Path<(i64, i64)>,
    Json(body): Json<UpdateEmployeeSkill>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state
            .employee_skills
            .update_skill(employee_id, skill_id, &body)
            .await?,
    ))
}

pub async fn api_remove_employee_skill(
    State(state): State<Arc<AppState>>,
    Path((employee_id, skill_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    state
        .employee_skills
        .remove_skill(employee_id, skill_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
