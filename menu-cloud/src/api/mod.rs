//! HTTP API routes for menu-cloud
//!
//! Public routes (health, signup, login, public menu) take no auth; every
//! other `/api` route runs behind the tenant JWT middleware.

pub mod auth;
pub mod categories;
pub mod health;
pub mod images;
pub mod menu;
pub mod menu_items;
pub mod modifier_groups;
pub mod promotions;
pub mod public;
pub mod settings;
pub mod signup;
pub mod tenant;

use axum::routing::get;
use axum::{Router, middleware};
use shared::error::AppError;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::tenant_auth_middleware;
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

/// Routes that require a tenant session
fn admin_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(tenant::router())
        .merge(settings::router())
        .merge(categories::router())
        .merge(menu_items::router())
        .merge(modifier_groups::router())
        .merge(promotions::router())
        .merge(menu::router())
        .merge(images::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_auth_middleware,
        ))
}

/// Create the combined router
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(health::health_check))
        .merge(signup::router())
        .merge(auth::router())
        .merge(public::router())
        .merge(admin_router(&state));

    // Local storage objects are served by the API itself
    if let Some(dir) = &state.local_upload_dir {
        app = app.nest_service("/uploads", ServeDir::new(dir));
    }

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
