//! Category management.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use dar_koftan_core::{Category, CategoryCount};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::CategoryRepository;
use crate::db::categories::UNCATEGORIZED;
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/admin/categories",
        get(list).post(create).delete(destroy),
    )
}

#[derive(Debug, Deserialize)]
pub struct NewCategory {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub group: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryName {
    pub name: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[instrument(skip_all)]
pub async fn list(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryCount>>, AppError> {
    let categories = CategoryRepository::new(state.pool())
        .list_with_counts()
        .await?;
    Ok(Json(categories))
}

#[instrument(skip(state))]
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewCategory>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let name = non_empty(Some(&body.name))
        .ok_or_else(|| AppError::BadRequest("Category name is required".to_string()))?;

    let category = CategoryRepository::new(state.pool())
        .create(
            name,
            non_empty(body.description.as_deref()),
            non_empty(body.group.as_deref()),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Delete a category; its products move to `uncategorized`.
#[instrument(skip(state))]
pub async fn destroy(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<CategoryName>,
) -> Result<Json<Value>, AppError> {
    let name = non_empty(query.name.as_deref())
        .ok_or_else(|| AppError::BadRequest("Category name is required".to_string()))?;
    if name == UNCATEGORIZED {
        return Err(AppError::BadRequest(format!(
            "The '{UNCATEGORIZED}' category cannot be deleted"
        )));
    }

    let moved = CategoryRepository::new(state.pool()).delete(name).await?;
    Ok(Json(json!({ "success": true, "movedProducts": moved })))
}
