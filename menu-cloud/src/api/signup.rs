//! Signup API handlers
//!
//! POST /api/signup/check    — email + subdomain availability
//! POST /api/signup/checkout — payment checkout for a plan
//! POST /api/provision       — verify the paid checkout, provision the tenant

use axum::routing::post;
use axum::{Json, Router, extract::State};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    SubscriptionStatus, Tenant, TenantPlan, normalize_subdomain, validate_subdomain,
};

use crate::auth::create_token;
use crate::db::repository::{tenant, tenant_user};
use crate::provisioning::{ProvisionRequest, ProvisionWarning};
use crate::state::AppState;
use crate::util::{is_valid_email, normalize_email};

use super::ApiResult;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/signup/check", post(check))
        .route("/api/signup/checkout", post(checkout))
        .route("/api/provision", post(provision))
}

// ── Request / Response types ──

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub email: Option<String>,
    pub subdomain: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain_available: Option<bool>,
    /// Naming-rule violation of the requested subdomain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain_error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub email: String,
    pub subdomain: String,
    pub plan: TenantPlan,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ProvisionBody {
    pub session_id: String,
    pub email: String,
    pub password: String,
    pub restaurant_name: String,
    pub subdomain: String,
}

#[derive(Debug, Serialize)]
pub struct ProvisionResponse {
    pub tenant: Tenant,
    pub token: String,
    pub menu_url: String,
    pub resumed: bool,
    pub warnings: Vec<ProvisionWarning>,
}

// ── Helpers ──

/// An email is free unless its account already administers a tenant
async fn email_available(state: &AppState, email: &str) -> Result<bool, AppError> {
    let Some(account) = state.auth.find_by_email(email).await? else {
        return Ok(true);
    };
    Ok(tenant_user::find_by_account(&state.pool, &account.id)
        .await?
        .is_none())
}

fn checked_subdomain(input: &str) -> Result<String, AppError> {
    let subdomain = normalize_subdomain(input);
    validate_subdomain(&subdomain)
        .map_err(|e| AppError::with_message(ErrorCode::SubdomainInvalid, e.to_string()))?;
    Ok(subdomain)
}

fn checked_email(input: &str) -> Result<String, AppError> {
    let email = normalize_email(input);
    if !is_valid_email(&email) {
        return Err(AppError::validation("A valid email is required").with_detail("field", "email"));
    }
    Ok(email)
}

// ── POST /api/signup/check ──

pub async fn check(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> ApiResult<CheckResponse> {
    let mut resp = CheckResponse {
        email_available: None,
        subdomain_available: None,
        subdomain_error: None,
    };

    if let Some(email) = req.email.as_deref() {
        let email = checked_email(email)?;
        resp.email_available = Some(email_available(&state, &email).await?);
    }

    if let Some(input) = req.subdomain.as_deref() {
        let subdomain = normalize_subdomain(input);
        match validate_subdomain(&subdomain) {
            Ok(()) => {
                resp.subdomain_available =
                    Some(!tenant::subdomain_taken(&state.pool, &subdomain).await?);
            }
            Err(e) => {
                resp.subdomain_available = Some(false);
                resp.subdomain_error = Some(e.to_string());
            }
        }
    }

    Ok(Json(resp))
}

// ── POST /api/signup/checkout ──

pub async fn checkout(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> ApiResult<CheckoutResponse> {
    if matches!(req.plan, TenantPlan::Enterprise) {
        return Err(AppError::validation("Enterprise plans are set up by sales")
            .with_detail("field", "plan"));
    }
    let email = checked_email(&req.email)?;
    let subdomain = checked_subdomain(&req.subdomain)?;

    if !email_available(&state, &email).await? {
        return Err(AppError::new(ErrorCode::EmailTaken));
    }
    if tenant::subdomain_taken(&state.pool, &subdomain).await? {
        return Err(AppError::new(ErrorCode::SubdomainTaken));
    }

    let checkout_url = state
        .payments
        .create_checkout_session(&email, req.plan, &subdomain)
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                plan = req.plan.as_str(),
                "Checkout session creation failed"
            );
            AppError::new(ErrorCode::PaymentSetupFailed)
        })?;

    tracing::info!(subdomain = %subdomain, plan = req.plan.as_str(), "Checkout started");
    Ok(Json(CheckoutResponse { checkout_url }))
}

// ── POST /api/provision ──

pub async fn provision(
    State(state): State<AppState>,
    Json(req): Json<ProvisionBody>,
) -> ApiResult<ProvisionResponse> {
    let session = state
        .payments
        .retrieve_session(&req.session_id)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Checkout session lookup failed");
            AppError::new(ErrorCode::PaymentNotCompleted)
        })?;
    if !session.paid {
        return Err(AppError::new(ErrorCode::PaymentNotCompleted));
    }

    // The paid session must belong to this signup
    let email = normalize_email(&req.email);
    let subdomain = normalize_subdomain(&req.subdomain);
    if session
        .customer_email
        .as_deref()
        .is_some_and(|paid_by| normalize_email(paid_by) != email)
    {
        return Err(
            AppError::validation("Email does not match the checkout").with_detail("field", "email"),
        );
    }
    if session
        .subdomain
        .as_deref()
        .is_some_and(|paid_for| paid_for != subdomain)
    {
        return Err(AppError::validation("Subdomain does not match the checkout")
            .with_detail("field", "subdomain"));
    }

    let provisioner = state.provisioner();
    let outcome = provisioner
        .provision(ProvisionRequest {
            email,
            password: req.password,
            restaurant_name: req.restaurant_name,
            subdomain,
            plan: session.plan.unwrap_or(TenantPlan::Basic),
            status: SubscriptionStatus::Active,
        })
        .await?;

    let token = create_token(&outcome.tenant.id, &outcome.tenant.email, &state.jwt_secret)
        .map_err(|e| {
            tracing::error!("JWT creation failed: {e}");
            AppError::new(ErrorCode::InternalError)
        })?;

    Ok(Json(ProvisionResponse {
        menu_url: provisioner.menu_url(&outcome.tenant.subdomain),
        tenant: outcome.tenant,
        token,
        resumed: outcome.resumed,
        warnings: outcome.warnings,
    }))
}
