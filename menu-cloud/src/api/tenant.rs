//! Tenant profile and branding

use axum::routing::get;
use axum::{Extension, Json, Router, extract::State};
use shared::error::AppError;
use shared::models::{Tenant, TenantUpdate};

use crate::auth::TenantIdentity;
use crate::db::repository::tenant;
use crate::state::AppState;

use super::ApiResult;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/tenant",
        get(get_profile).put(update_profile).delete(close_account),
    )
}

/// GET /api/tenant
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
) -> ApiResult<Tenant> {
    let tenant = tenant::find_by_id(&state.pool, &identity.tenant_id)
        .await?
        .ok_or_else(AppError::tenant_not_found)?;
    Ok(Json(tenant))
}

/// PUT /api/tenant
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Json(req): Json<TenantUpdate>,
) -> ApiResult<Tenant> {
    let tenant = tenant::update_profile(&state.pool, &identity.tenant_id, req).await?;
    tracing::info!(tenant_id = %identity.tenant_id, "Tenant profile updated");
    Ok(Json(tenant))
}

/// DELETE /api/tenant — soft delete; the subdomain stays reserved and
/// existing tokens stop working
pub async fn close_account(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
) -> ApiResult<bool> {
    tenant::soft_delete(&state.pool, &identity.tenant_id).await?;
    tracing::warn!(tenant_id = %identity.tenant_id, "Tenant closed");
    Ok(Json(true))
}
