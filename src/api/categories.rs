//! Category management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::category::{Category, CreateCategory},
};

use super::{AdminCaller, MessageResponse};

/// List all categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    responses(
        (status = 200, description = "List of categories", body = Vec<Category>)
    )
)]
pub async fn list_categories(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Category>>> {
    let categories = state.services.categories.list().await?;
    Ok(Json(categories))
}

/// Get category by ID
#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "categories",
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category details", body = Category),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Category>> {
    let category = state.services.categories.get_by_id(id).await?;
    Ok(Json(category))
}

/// Create a new category
#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    security(("bearer_auth" = [])),
    request_body = CreateCategory,
    responses(
        (status = 200, description = "Category created", body = Category),
        (status = 400, description = "Duplicate name or invalid input"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn create_category(
    State(state): State<crate::AppState>,
    AdminCaller(_caller): AdminCaller,
    Json(category): Json<CreateCategory>,
) -> AppResult<Json<Category>> {
    category
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = state.services.categories.create(category).await?;
    Ok(Json(created))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "categories",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 404, description = "Category not found")
    )
)]
pub async fn delete_category(
    State(state): State<crate::AppState>,
    AdminCaller(_caller): AdminCaller,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    state.services.categories.delete(id).await?;
    Ok(Json(MessageResponse {
        message: "Category deleted successfully".to_string(),
    }))
}
