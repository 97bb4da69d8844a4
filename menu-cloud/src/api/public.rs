//! Public (customer-facing) menu API
//!
//! The tenant comes from the path subdomain or from the `Host` header.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{MenuCategory, MenuView, PromotionalImage, Tenant};

use crate::auth::{resolve_public_tenant, subdomain_from_host};
use crate::db::repository::{RepoError, promotion, settings};
use crate::menu::assemble_menu;
use crate::state::AppState;

use super::ApiResult;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/public/menu", get(menu_by_host))
        .route("/api/public/{subdomain}/menu", get(menu_by_subdomain))
        .route("/api/public/{subdomain}/promotions", get(promotions_by_subdomain))
}

/// Restaurant card shown above the menu
#[derive(Debug, Serialize)]
pub struct PublicRestaurant {
    pub name: String,
    pub subdomain: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub operating_hours: serde_json::Value,
    pub currency: String,
    pub language: String,
    pub show_prices: bool,
    pub ordering_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct PublicMenu {
    pub restaurant: PublicRestaurant,
    pub categories: Vec<MenuCategory>,
}

async fn restaurant_card(state: &AppState, tenant: Tenant) -> Result<PublicRestaurant, AppError> {
    let settings = match settings::get(&state.pool, &tenant.id).await {
        Ok(settings) => Some(settings),
        Err(RepoError::NotFound { .. }) => None,
        Err(e) => return Err(e.into()),
    };
    let (currency, language, show_prices, ordering_enabled) = match settings {
        Some(s) => (s.currency, s.language, s.show_prices, s.ordering_enabled),
        None => (
            shared::models::DEFAULT_CURRENCY.to_string(),
            shared::models::DEFAULT_LANGUAGE.to_string(),
            true,
            false,
        ),
    };
    Ok(PublicRestaurant {
        name: tenant.name,
        subdomain: tenant.subdomain,
        phone: tenant.phone,
        address: tenant.address,
        city: tenant.city,
        country: tenant.country,
        logo_url: tenant.logo_url,
        primary_color: tenant.primary_color,
        secondary_color: tenant.secondary_color,
        operating_hours: tenant.operating_hours,
        currency,
        language,
        show_prices,
        ordering_enabled,
    })
}

async fn public_menu(state: &AppState, subdomain: &str) -> ApiResult<PublicMenu> {
    let tenant = resolve_public_tenant(&state.pool, subdomain).await?;
    let categories = assemble_menu(&state.pool, &tenant.id, MenuView::Public, None).await?;
    Ok(Json(PublicMenu {
        restaurant: restaurant_card(state, tenant).await?,
        categories,
    }))
}

/// GET /api/public/{subdomain}/menu
pub async fn menu_by_subdomain(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> ApiResult<PublicMenu> {
    public_menu(&state, &subdomain).await
}

/// GET /api/public/menu — tenant from `Host: {subdomain}.{BASE_DOMAIN}`
pub async fn menu_by_host(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<PublicMenu> {
    let subdomain = headers
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(|host| subdomain_from_host(host, &state.base_domain))
        .ok_or_else(|| AppError::new(ErrorCode::TenantNotSelected))?;
    public_menu(&state, &subdomain).await
}

/// GET /api/public/{subdomain}/promotions — active banners inside their window
pub async fn promotions_by_subdomain(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> ApiResult<Vec<PromotionalImage>> {
    let tenant = resolve_public_tenant(&state.pool, &subdomain).await?;
    let promotions =
        promotion::list_running(&state.pool, &tenant.id, shared::util::now_millis()).await?;
    Ok(Json(promotions))
}
