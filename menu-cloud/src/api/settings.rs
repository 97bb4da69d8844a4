//! Restaurant settings

use axum::routing::get;
use axum::{Extension, Json, Router, extract::State};
use shared::models::{RestaurantSettings, SettingsUpdate};

use crate::auth::TenantIdentity;
use crate::db::repository::settings;
use crate::state::AppState;

use super::ApiResult;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/settings", get(get_settings).put(update_settings))
}

/// GET /api/settings — the default row is created on first read
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
) -> ApiResult<RestaurantSettings> {
    let settings = settings::create_default(&state.pool, &identity.tenant_id).await?;
    Ok(Json(settings))
}

/// PUT /api/settings
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Json(req): Json<SettingsUpdate>,
) -> ApiResult<RestaurantSettings> {
    settings::create_default(&state.pool, &identity.tenant_id).await?;
    let settings = settings::update(&state.pool, &identity.tenant_id, req).await?;
    Ok(Json(settings))
}
