use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use skillquest_common::{EmployeeUpdate, NewEmployee};

use super::ApiResult;
use crate::AppState;

pub async fn api_create_employee(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewEmployee>,
) -> ApiResult<impl IntoResponse> {
    let employee = state.employees.create_employee(&body).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn api_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.employees.get_employee(id).await?))
}

pub async fn api_update_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<EmployeeUpdate>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.employees.update_employee(id, &body).await?))
}

pub async fn api_employee_completion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.employees.calculate_completion(id).await?))
}
