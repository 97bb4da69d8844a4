//! Category API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{Category, CategoryCreate, CategoryUpdate, SortOrderUpdate};

use crate::api::ApiResult;
use crate::auth::TenantIdentity;
use crate::db::repository::category;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Admin listings include inactive categories unless told otherwise
    #[serde(default = "default_true")]
    pub include_inactive: bool,
}

fn default_true() -> bool {
    true
}

/// GET /api/categories
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Category>> {
    let categories =
        category::list(&state.pool, &identity.tenant_id, query.include_inactive).await?;
    Ok(Json(categories))
}

/// GET /api/categories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Category> {
    Ok(Json(category::get(&state.pool, &identity.tenant_id, id).await?))
}

/// POST /api/categories
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Json(payload): Json<CategoryCreate>,
) -> ApiResult<Category> {
    let created = category::create(&state.pool, &identity.tenant_id, payload).await?;
    tracing::info!(tenant_id = %identity.tenant_id, category_id = created.id, "Category created");
    Ok(Json(created))
}

/// PUT /api/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> ApiResult<Category> {
    Ok(Json(
        category::update(&state.pool, &identity.tenant_id, id, payload).await?,
    ))
}

/// DELETE /api/categories/{id} — removes its items too
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    category::delete(&state.pool, &identity.tenant_id, id).await?;
    tracing::info!(tenant_id = %identity.tenant_id, category_id = id, "Category deleted");
    Ok(Json(true))
}

/// PUT /api/categories/sort-order
pub async fn batch_update_sort_order(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Json(payload): Json<SortOrderUpdate>,
) -> ApiResult<bool> {
    category::reorder(&state.pool, &identity.tenant_id, &payload.ids).await?;
    Ok(Json(true))
}
