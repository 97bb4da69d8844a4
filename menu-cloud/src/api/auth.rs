//! Owner login

use axum::routing::post;
use axum::{Json, Router, extract::State};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};

use crate::auth::create_token;
use crate::db::repository::{tenant, tenant_user};
use crate::state::AppState;

use super::ApiResult;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth/login", post(login))
}

/// POST /api/auth/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub tenant_id: String,
    pub subdomain: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let account = state
        .auth
        .verify_credentials(&req.email, &req.password)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    // Accounts from an unfinished signup have no tenant to log into yet
    let link = tenant_user::find_by_account(&state.pool, &account.id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::TenantNotFound, "Restaurant setup is not complete")
        })?;
    let tenant = tenant::find_by_id(&state.pool, &link.tenant_id)
        .await?
        .ok_or_else(AppError::tenant_not_found)?;

    let token = create_token(&tenant.id, &account.email, &state.jwt_secret).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    tracing::info!(tenant_id = %tenant.id, "Owner logged in");
    Ok(Json(LoginResponse {
        token,
        tenant_id: tenant.id,
        subdomain: tenant.subdomain,
    }))
}
