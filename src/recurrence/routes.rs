use axum::{
    routing::{get, post},
    Router,
};

use super::recurrence_handlers::{
    delete_pattern, delete_rule, get_pattern, get_rule, list_patterns, list_rules,
    update_pattern, update_rule, validate_recurrence,
};
use crate::state::AppState;

pub fn pattern_routes() -> Router<AppState> {
    Router::new().route("/", get(list_patterns)).route(
        "/:id",
        get(get_pattern).put(update_pattern).delete(delete_pattern),
    )
}

pub fn rule_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_rules))
        .route("/:id", get(get_rule).put(update_rule).delete(delete_rule))
}

pub fn recurrence_routes() -> Router<AppState> {
    Router::new().route("/validate", post(validate_recurrence))
}
