use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::category_models::{Category, CreateCategoryRequest, UpdateCategoryRequest};
use crate::{dto::Deleted, error::Result, state::AppState};

/// List categories by name
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "All categories", body = [Category]),
        (status = 503, description = "Categories could not be loaded")
    ),
    tag = "categories"
)]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = state
        .category_service
        .list()
        .await
        .map_err(|e| e.on_load("categories"))?;
    Ok(Json(categories))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "The category", body = Category),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Category>> {
    let category = state
        .category_service
        .get(id)
        .await
        .map_err(|e| e.on_load("category"))?;
    Ok(Json(category))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid name")
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse> {
    let category = state.category_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Invalid name"),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>> {
    let category = state.category_service.update(id, payload).await?;
    Ok(Json(category))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted", body = Deleted),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>> {
    state.category_service.delete(id).await?;
    Ok(Json(Deleted::new(id)))
}
