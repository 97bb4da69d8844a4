//! Tenant JWT authentication for the admin API

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

use crate::db::repository::tenant;
use crate::state::AppState;

/// JWT claims for tenant authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct TenantClaims {
    /// Tenant ID
    pub sub: String,
    /// Owner email
    pub email: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated tenant identity extracted from JWT
#[derive(Debug, Clone)]
pub struct TenantIdentity {
    pub tenant_id: String,
    pub email: String,
}

const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a JWT token for a tenant owner
pub fn create_token(
    tenant_id: &str,
    email: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = TenantClaims {
        sub: tenant_id.to_string(),
        email: email.to_string(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a token and return its claims
pub fn decode_token(token: &str, secret: &str) -> Result<TenantClaims, AppError> {
    jsonwebtoken::decode::<TenantClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })
}

/// Middleware that verifies the tenant JWT from the Authorization header and
/// inserts a [`TenantIdentity`] for the handlers
pub async fn tenant_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AppError::not_authenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::invalid_token("Invalid Authorization format"))?;

    let claims = decode_token(token, &state.jwt_secret)?;

    // Deleted tenants lose API access even with a live token
    if tenant::find_by_id(&state.pool, &claims.sub).await?.is_none() {
        return Err(AppError::tenant_not_found());
    }

    tracing::debug!(tenant_id = %claims.sub, "Tenant authenticated");
    request.extensions_mut().insert(TenantIdentity {
        tenant_id: claims.sub,
        email: claims.email,
    });

    Ok(next.run(request).await)
}
