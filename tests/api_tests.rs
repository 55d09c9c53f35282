use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Local};
use serde_json::{json, Value};
use taskflow::{
    routes::create_router,
    state::{AppState, Config, StoreConfig},
    store::MemoryRecordStore,
};
use tower::ServiceExt;

fn app() -> Router {
    let config = Arc::new(Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        store: StoreConfig::Memory,
    });
    let store = Arc::new(MemoryRecordStore::with_default_categories());
    create_router(AppState::new(config, store))
}

fn days_from_now(days: i64) -> String {
    (Local::now().date_naive() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_task(app: &Router, body: Value) -> Value {
    let (status, json) = send(app, Method::POST, "/api/tasks", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json
}

#[tokio::test]
async fn create_then_list_tasks() {
    let app = app();
    let created = create_task(
        &app,
        json!({
            "title": "  Write report  ",
            "description": "Quarterly numbers",
            "category": "Work",
            "priority": "high",
            "dueDate": days_from_now(3),
        }),
    )
    .await;

    assert_eq!(created["task"]["title"], "Write report");
    assert_eq!(created["task"]["category"], "Work");
    assert_eq!(created["task"]["completed"], false);
    assert!(created.get("pattern").is_none());

    let (status, tasks) = send(&app, Method::GET, "/api/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks.as_array().unwrap().len(), 1);

    let (_, board) = send(&app, Method::GET, "/api/board", None).await;
    assert_eq!(board["categories"].as_array().unwrap().len(), 5);
    assert_eq!(board["stats"]["total"], 1);
}

#[tokio::test]
async fn invalid_form_reports_every_field() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/tasks",
        Some(json!({
            "title": " ",
            "category": "",
            "dueDate": days_from_now(-1),
            "isRecurring": "on",
            "recurrence": { "frequency": "Monthly", "startDate": "" }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = &body["fields"];
    assert_eq!(fields["title"], "Task title is required");
    assert_eq!(fields["category"], "Please select a category");
    assert_eq!(fields["dueDate"], "Due date cannot be in the past");
    assert_eq!(
        fields["recurrenceStartDate"],
        "Start date is required for recurring tasks"
    );
    assert!(fields.get("recurrenceMonthly").is_some());

    let (_, tasks) = send(&app, Method::GET, "/api/tasks", None).await;
    assert!(tasks.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn recurring_task_creates_pattern_and_rule() {
    let app = app();
    let created = create_task(
        &app,
        json!({
            "title": "Water plants",
            "category": "Personal",
            "isRecurring": true,
            "recurrence": {
                "frequency": "Monthly",
                "interval": "2",
                "dayOfMonth": "15",
                "startDate": days_from_now(1),
                "endDate": days_from_now(90)
            }
        }),
    )
    .await;

    assert_eq!(created["pattern"]["name"], "Monthly - Water plants");
    assert_eq!(created["pattern"]["interval"], 2);
    assert_eq!(created["pattern"]["dayOfMonth"], 15);
    assert_eq!(created["rule"]["name"], "Rule for Water plants");

    let id = created["task"]["id"].as_i64().unwrap();
    let (_, rules) = send(&app, Method::GET, &format!("/api/tasks/{id}/recurrence"), None).await;
    assert_eq!(rules.as_array().unwrap().len(), 1);
    assert_eq!(rules[0]["patternName"], "Monthly - Water plants");

    let (_, patterns) = send(&app, Method::GET, "/api/recurring-patterns", None).await;
    assert_eq!(patterns.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn partial_update_keeps_untouched_fields() {
    let app = app();
    let created = create_task(
        &app,
        json!({
            "title": "Read book",
            "description": "Chapter 4",
            "category": "Learning",
            "dueDate": days_from_now(5),
        }),
    )
    .await;
    let uri = format!("/api/tasks/{}", created["task"]["id"]);

    let (status, task) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "title": "Read two books", "dueDate": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["title"], "Read two books");
    assert_eq!(task["description"], "Chapter 4");
    assert_eq!(task["category"], "Learning");
    assert_eq!(task["dueDate"], Value::Null);

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "title": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["title"], "Task title is required");
}

#[tokio::test]
async fn complete_filter_and_delete() {
    let app = app();
    let first = create_task(&app, json!({ "title": "One", "category": "Work" })).await;
    create_task(&app, json!({ "title": "Two", "category": "Health" })).await;
    let id = first["task"]["id"].as_i64().unwrap();

    let (_, task) = send(&app, Method::PATCH, &format!("/api/tasks/{id}/complete"), None).await;
    assert_eq!(task["completed"], true);
    assert!(task["completedAt"].is_string());

    let (_, completed) = send(&app, Method::GET, "/api/tasks?status=completed", None).await;
    assert_eq!(completed.as_array().unwrap().len(), 1);
    assert_eq!(completed[0]["title"], "One");

    let (_, found) = send(&app, Method::GET, "/api/tasks?search=health", None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["title"], "Two");

    let (_, stats) = send(&app, Method::GET, "/api/tasks/stats", None).await;
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["completionRate"], 50.0);

    let (status, deleted) = send(&app, Method::DELETE, &format!("/api/tasks/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({ "id": id, "deleted": true }));

    let (status, body) = send(&app, Method::GET, &format!("/api/tasks/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Task not found");
}

#[tokio::test]
async fn timer_toggles_on_and_off() {
    let app = app();
    let created = create_task(&app, json!({ "title": "Deep work", "category": "Work" })).await;
    let id = created["task"]["id"].as_i64().unwrap();

    let (status, timer) =
        send(&app, Method::POST, &format!("/api/tasks/{id}/timer/toggle"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(timer["isRunning"], true);
    assert_eq!(timer["display"], "0:00");

    let (_, timer) = send(&app, Method::GET, &format!("/api/tasks/{id}/timer"), None).await;
    assert_eq!(timer["isRunning"], true);

    let (_, timer) =
        send(&app, Method::POST, &format!("/api/tasks/{id}/timer/toggle"), None).await;
    assert_eq!(timer["isRunning"], false);

    let (status, _) = send(&app, Method::POST, "/api/tasks/999/timer/toggle", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn category_names_are_unique() {
    let app = app();
    let (status, category) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some(json!({ "name": "Garden" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(category["color"], "#6B7280");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some(json!({ "name": "Work" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["name"], "A category with this name already exists");

    let (_, categories) = send(&app, Method::GET, "/api/categories", None).await;
    let names: Vec<&str> = categories
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, ["Garden", "Health", "Learning", "Personal", "Shopping", "Work"]);
}

#[tokio::test]
async fn validate_endpoint_reports_without_writing() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/recurrence/validate",
        Some(json!({
            "frequency": "Weekly",
            "interval": "400",
            "startDate": days_from_now(0)
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["recurrenceInterval"], "Interval must be between 1 and 365");
    assert!(body["fields"].get("recurrenceDayOfWeek").is_some());

    let (_, patterns) = send(&app, Method::GET, "/api/recurring-patterns", None).await;
    assert!(patterns.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app();
    let (status, doc) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"].get("/api/tasks").is_some());
    assert!(doc["paths"].get("/api/tasks/{id}/timer/toggle").is_some());

    let search = doc["paths"]["/api/tasks"]["get"]["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "search")
        .unwrap();
    assert_eq!(
        search["description"],
        "Matches title, description, category or due date"
    );
}
