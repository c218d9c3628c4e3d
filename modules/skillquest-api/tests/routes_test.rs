//! Router tests over MemoryStore, driven with `oneshot`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use skillquest_api::{build_router, AppState};
use skillquest_store::MemoryStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn app() -> Router {
    let store = Arc::new(MemoryStore::new());
    build_router(Arc::new(AppState::from_store(store, 5)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn create_employee(app: &Router, email: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/employees/v1",
        Some(json!({
            "email": email,
            "first_name": "Ada",
            "last_name": "Lovelace",
            "department": "R&D"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

async fn create_quest(app: &Router, action_type: &str, required_count: i32) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/quests/v1",
        Some(json!({
            "name": format!("{action_type} quest"),
            "xp_reward": 100,
            "action_type": action_type,
            "required_count": required_count
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["is_active"], json!(true));
    body["id"].as_i64().unwrap()
}

async fn assign(app: &Router, employee_id: i64, quest_id: i64) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/quests/v1/assign",
        Some(json!({ "employee_id": employee_id, "quest_id": quest_id })),
    )
    .await
}

// =========================================================================
// Health
// =========================================================================

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}

// =========================================================================
// Quests
// =========================================================================

#[tokio::test]
async fn quest_progress_flows_from_skills_and_events() {
    let app = app();
    let employee_id = create_employee(&app, "ada@example.com").await;
    let quest_id = create_quest(&app, "skill_add", 3).await;

    let (status, body) = assign(&app, employee_id, quest_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Quest assigned successfully");

    let (status, skill) = send(
        &app,
        Method::POST,
        "/skills/v1",
        Some(json!({ "name": "Rust" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, detail) = send(
        &app,
        Method::POST,
        &format!("/employees/v1/skills/{employee_id}"),
        Some(json!({ "skill_id": skill["id"], "proficiency_level": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(detail["skill_name"], "Rust");

    let (status, progress) = send(
        &app,
        Method::GET,
        &format!("/quests/v1/progress/{employee_id}/{quest_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["current_count"], 1);
    assert_eq!(progress["progress_percentage"], 33.3);

    let (status, updated) = send(
        &app,
        Method::POST,
        "/quests/v1/events",
        Some(json!({ "employee_id": employee_id, "action_type": "skill_add", "count": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated[0]["current_count"], 3);
    assert_eq!(updated[0]["is_completed"], true);
    assert_eq!(updated[0]["progress_percentage"], 100.0);

    let (status, quests) = send(
        &app,
        Method::GET,
        &format!("/quests/v1/employee/{employee_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quests.as_array().unwrap().len(), 1);
    assert_eq!(quests[0]["quest_id"], quest_id);
}

#[tokio::test]
async fn quest_list_includes_created_quests() {
    let app = app();
    create_quest(&app, "skill_add", 1).await;
    create_quest(&app, "complete_project", 2).await;

    let (status, body) = send(&app, Method::GET, "/quests/v1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_quest_is_bad_request() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/quests/v1",
        Some(json!({
            "name": "Broken",
            "xp_reward": 0,
            "action_type": "skill_add",
            "required_count": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Validation error"));
}

#[tokio::test]
async fn assignment_errors_map_to_status_codes() {
    let app = app();
    let employee_id = create_employee(&app, "ada@example.com").await;
    let quest_id = create_quest(&app, "skill_add", 3).await;

    assert_eq!(assign(&app, employee_id, quest_id).await.0, StatusCode::OK);
    assert_eq!(assign(&app, employee_id, quest_id).await.0, StatusCode::CONFLICT);

    let (status, body) = assign(&app, employee_id, 9999).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Quest with identifier '9999' not found");
}

#[tokio::test]
async fn unassigned_progress_is_not_found() {
    let app = app();
    let employee_id = create_employee(&app, "ada@example.com").await;
    let quest_id = create_quest(&app, "skill_add", 3).await;

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/quests/v1/progress/{employee_id}/{quest_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_events_are_rejected() {
    let app = app();
    let employee_id = create_employee(&app, "ada@example.com").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/quests/v1/events",
        Some(json!({ "employee_id": employee_id, "action_type": "skill_add", "count": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/quests/v1/events",
        Some(json!({ "employee_id": employee_id, "action_type": "teleport", "count": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("teleport"));
}

// =========================================================================
// Employees
// =========================================================================

#[tokio::test]
async fn employee_profile_and_completion() {
    let app = app();
    let employee_id = create_employee(&app, "ada@example.com").await;
    let quest_id = create_quest(&app, "profile_completion", 100).await;
    assign(&app, employee_id, quest_id).await;

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/employees/v1/{employee_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["skills"], json!([]));

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/employees/v1/{employee_id}/completion"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completion_percentage"], 80);

    let (_, progress) = send(
        &app,
        Method::GET,
        &format!("/quests/v1/progress/{employee_id}/{quest_id}"),
        None,
    )
    .await;
    assert_eq!(progress["current_count"], 80);
}

#[tokio::test]
async fn employee_updates() {
    let app = app();
    let employee_id = create_employee(&app, "ada@example.com").await;
    let uri = format!("/employees/v1/{employee_id}");

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation error: No data provided for update");

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "rating": 4.5 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 4.5);
    assert_eq!(body["first_name"], "Ada");

    let (status, _) = send(&app, Method::GET, "/employees/v1/4242", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = app();
    create_employee(&app, "ada@example.com").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/employees/v1",
        Some(json!({
            "email": "ada@example.com",
            "first_name": "Other",
            "last_name": "Person"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// =========================================================================
// Skills
// =========================================================================

#[tokio::test]
async fn employee_skill_lifecycle() {
    let app = app();
    let employee_id = create_employee(&app, "ada@example.com").await;
    let (_, skill) = send(
        &app,
        Method::POST,
        "/skills/v1",
        Some(json!({ "name": "SQL", "description": "Queries" })),
    )
    .await;
    let skill_id = skill["id"].as_i64().unwrap();
    let skill_uri = format!("/employees/v1/skills/{employee_id}/{skill_id}");

    send(
        &app,
        Method::POST,
        &format!("/employees/v1/skills/{employee_id}"),
        Some(json!({ "skill_id": skill_id, "proficiency_level": 2 })),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &skill_uri,
        Some(json!({ "proficiency_level": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["proficiency_level"], 5);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/employees/v1/skills/{employee_id}/all"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["skill_description"], "Queries");

    let (status, _) = send(&app, Method::DELETE, &skill_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &skill_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, "/skills/v1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}
