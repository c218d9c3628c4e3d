//! HTTP surface for quests, employees and skills.

pub mod error;
pub mod rest;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use typed_builder::TypedBuilder;

use skillquest_domains::{
    EmployeeService, EmployeeSkillService, ProfileCompletionCalculator, SkillService,
};
use skillquest_engine::{EventDispatcher, HandlerContext, HandlerRegistry, ProgressEngine};
use skillquest_store::{EmployeeStore, QuestStore};

pub use error::ApiError;

#[derive(TypedBuilder)]
pub struct AppState {
    pub engine: Arc<ProgressEngine>,
    pub employees: EmployeeService,
    pub skills: SkillService,
    pub employee_skills: EmployeeSkillService,
}

impl AppState {
    /// Wire the engine, dispatcher and services over a single store.
    pub fn from_store<S>(store: Arc<S>, max_skills_for_employee: u32) -> Self
    where
        S: QuestStore + EmployeeStore + 'static,
    {
        let engine = Arc::new(ProgressEngine::new(store.clone()));
        let completion = Arc::new(ProfileCompletionCalculator::new(
            store.clone(),
            max_skills_for_employee,
        ));
        let dispatcher = Arc::new(EventDispatcher::new(
            HandlerRegistry::with_defaults(),
            HandlerContext {
                engine: engine.clone(),
                completion: completion.clone(),
            },
        ));

        Self::builder()
            .engine(engine)
            .employees(EmployeeService::new(
                store.clone(),
                dispatcher.clone(),
                completion,
            ))
            .skills(SkillService::new(store.clone()))
            .employee_skills(EmployeeSkillService::new(store, dispatcher))
            .build()
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(|| async { "ok" }))
        // Quests
        .route(
            "/quests/v1",
            post(rest::quests::api_create_quest).get(rest::quests::api_quests),
        )
        .route("/quests/v1/assign", post(rest::quests::api_assign_quest))
        .route(
            "/quests/v1/employee/{employee_id}",
            get(rest::quests::api_employee_quests),
        )
        .route(
            "/quests/v1/progress/{employee_id}/{quest_id}",
            get(rest::quests::api_quest_progress),
        )
        .route("/quests/v1/events", post(rest::quests::api_quest_event))
        // Employees
        .route("/employees/v1", post(rest::employees::api_create_employee))
        .route(
            "/employees/v1/{id}",
            get(rest::employees::api_employee).put(rest::employees::api_update_employee),
        )
        .route(
            "/employees/v1/{id}/completion",
            get(rest::employees::api_employee_completion),
        )
        // Employee skills
        .route(
            "/employees/v1/skills/{employee_id}",
            post(rest::skills::api_add_employee_skill),
        )
        .route(
            "/employees/v1/skills/{employee_id}/all",
            get(rest::skills::api_employee_skills),
        )
        .route(
            "/employees/v1/skills/{employee_id}/{skill_id}",
            put(rest::skills::api_update_employee_skill)
                .delete(rest::skills::api_remove_employee_skill),
        )
        // Skills
        .route(
            "/skills/v1",
            post(rest::skills::api_create_skill).get(rest::skills::api_skills),
        )
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}
