use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Local;

use super::recurrence_models::{
    RecurrenceRequest, RecurrenceRule, RecurringTaskPattern, UpdatePatternRequest,
    UpdateRuleRequest,
};
use super::recurrence_validator::RecurrencePlan;
use crate::{dto::Deleted, error::Result, state::AppState};

/// Check a recurrence without creating anything
#[utoipa::path(
    post,
    path = "/api/recurrence/validate",
    request_body = RecurrenceRequest,
    responses(
        (status = 200, description = "The schedule the recurrence describes", body = RecurrencePlan),
        (status = 400, description = "Field errors keyed by form field")
    ),
    tag = "recurrence"
)]
pub async fn validate_recurrence(
    State(state): State<AppState>,
    Json(payload): Json<RecurrenceRequest>,
) -> Result<Json<RecurrencePlan>> {
    let today = Local::now().date_naive();
    let plan = state.recurrence_service.validate(&payload, today)?;
    Ok(Json(plan))
}

#[utoipa::path(
    get,
    path = "/api/recurring-patterns",
    responses(
        (status = 200, description = "All patterns, newest first", body = [RecurringTaskPattern]),
        (status = 503, description = "Patterns could not be loaded")
    ),
    tag = "recurrence"
)]
pub async fn list_patterns(State(state): State<AppState>) -> Result<Json<Vec<RecurringTaskPattern>>> {
    let patterns = state
        .recurrence_service
        .list_patterns()
        .await
        .map_err(|e| e.on_load("recurring task patterns"))?;
    Ok(Json(patterns))
}

#[utoipa::path(
    get,
    path = "/api/recurring-patterns/{id}",
    params(("id" = i64, Path, description = "Pattern id")),
    responses(
        (status = 200, description = "The pattern", body = RecurringTaskPattern),
        (status = 404, description = "Pattern not found")
    ),
    tag = "recurrence"
)]
pub async fn get_pattern(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecurringTaskPattern>> {
    let pattern = state
        .recurrence_service
        .get_pattern(id)
        .await
        .map_err(|e| e.on_load("recurring task pattern"))?;
    Ok(Json(pattern))
}

#[utoipa::path(
    put,
    path = "/api/recurring-patterns/{id}",
    params(("id" = i64, Path, description = "Pattern id")),
    request_body = UpdatePatternRequest,
    responses(
        (status = 200, description = "Pattern updated", body = RecurringTaskPattern),
        (status = 400, description = "Out of range values"),
        (status = 404, description = "Pattern not found")
    ),
    tag = "recurrence"
)]
pub async fn update_pattern(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePatternRequest>,
) -> Result<Json<RecurringTaskPattern>> {
    let pattern = state.recurrence_service.update_pattern(id, payload).await?;
    Ok(Json(pattern))
}

#[utoipa::path(
    delete,
    path = "/api/recurring-patterns/{id}",
    params(("id" = i64, Path, description = "Pattern id")),
    responses(
        (status = 200, description = "Pattern deleted", body = Deleted),
        (status = 404, description = "Pattern not found")
    ),
    tag = "recurrence"
)]
pub async fn delete_pattern(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>> {
    state.recurrence_service.delete_pattern(id).await?;
    Ok(Json(Deleted::new(id)))
}

#[utoipa::path(
    get,
    path = "/api/recurrence-rules",
    responses(
        (status = 200, description = "All rules, newest first", body = [RecurrenceRule]),
        (status = 503, description = "Rules could not be loaded")
    ),
    tag = "recurrence"
)]
pub async fn list_rules(State(state): State<AppState>) -> Result<Json<Vec<RecurrenceRule>>> {
    let rules = state
        .recurrence_service
        .list_rules()
        .await
        .map_err(|e| e.on_load("recurrence rules"))?;
    Ok(Json(rules))
}

#[utoipa::path(
    get,
    path = "/api/recurrence-rules/{id}",
    params(("id" = i64, Path, description = "Rule id")),
    responses(
        (status = 200, description = "The rule", body = RecurrenceRule),
        (status = 404, description = "Rule not found")
    ),
    tag = "recurrence"
)]
pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecurrenceRule>> {
    let rule = state
        .recurrence_service
        .get_rule(id)
        .await
        .map_err(|e| e.on_load("recurrence rule"))?;
    Ok(Json(rule))
}

#[utoipa::path(
    put,
    path = "/api/recurrence-rules/{id}",
    params(("id" = i64, Path, description = "Rule id")),
    request_body = UpdateRuleRequest,
    responses(
        (status = 200, description = "Rule updated", body = RecurrenceRule),
        (status = 400, description = "End date not after start date"),
        (status = 404, description = "Rule not found")
    ),
    tag = "recurrence"
)]
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRuleRequest>,
) -> Result<Json<RecurrenceRule>> {
    let rule = state.recurrence_service.update_rule(id, payload).await?;
    Ok(Json(rule))
}

#[utoipa::path(
    delete,
    path = "/api/recurrence-rules/{id}",
    params(("id" = i64, Path, description = "Rule id")),
    responses(
        (status = 200, description = "Rule deleted", body = Deleted),
        (status = 404, description = "Rule not found")
    ),
    tag = "recurrence"
)]
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>> {
    state.recurrence_service.delete_rule(id).await?;
    Ok(Json(Deleted::new(id)))
}
