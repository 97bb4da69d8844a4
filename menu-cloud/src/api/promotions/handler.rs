//! Promotional Image API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::models::{PromotionCreate, PromotionUpdate, PromotionalImage, SortOrderUpdate};

use crate::api::ApiResult;
use crate::auth::TenantIdentity;
use crate::db::repository::promotion;
use crate::state::AppState;

/// GET /api/promotions — every promotion, scheduled or not
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
) -> ApiResult<Vec<PromotionalImage>> {
    Ok(Json(promotion::list(&state.pool, &identity.tenant_id).await?))
}

/// GET /api/promotions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<PromotionalImage> {
    Ok(Json(promotion::get(&state.pool, &identity.tenant_id, id).await?))
}

/// POST /api/promotions
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Json(payload): Json<PromotionCreate>,
) -> ApiResult<PromotionalImage> {
    let promo = promotion::create(&state.pool, &identity.tenant_id, payload).await?;
    tracing::info!(tenant_id = %identity.tenant_id, promotion_id = promo.id, "Promotion created");
    Ok(Json(promo))
}

/// PUT /api/promotions/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
    Json(payload): Json<PromotionUpdate>,
) -> ApiResult<PromotionalImage> {
    Ok(Json(
        promotion::update(&state.pool, &identity.tenant_id, id, payload).await?,
    ))
}

/// DELETE /api/promotions/{id} — the stored image is removed best-effort
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    let removed = promotion::delete(&state.pool, &identity.tenant_id, id).await?;
    // Only objects this tenant uploaded live under its own folder
    if removed
        .image_url
        .contains(&format!("/{}/", identity.tenant_id))
    {
        if let Err(e) = state.storage.delete(&removed.image_url).await {
            tracing::warn!(
                tenant_id = %identity.tenant_id,
                url = %removed.image_url,
                error = %e,
                "Failed to delete promotion image"
            );
        }
    }
    tracing::info!(tenant_id = %identity.tenant_id, promotion_id = id, "Promotion deleted");
    Ok(Json(true))
}

/// PUT /api/promotions/sort-order
pub async fn batch_update_sort_order(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Json(payload): Json<SortOrderUpdate>,
) -> ApiResult<bool> {
    promotion::reorder(&state.pool, &identity.tenant_id, &payload.ids).await?;
    Ok(Json(true))
}
