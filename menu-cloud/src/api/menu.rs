//! Admin menu assembly

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use shared::models::{MenuCategory, MenuView};

use crate::auth::TenantIdentity;
use crate::menu::assemble_menu;
use crate::state::AppState;

use super::ApiResult;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/menu", get(admin_menu))
}

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub category_id: Option<i64>,
}

/// GET /api/menu?category_id= — every category, item and binding
pub async fn admin_menu(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Query(query): Query<MenuQuery>,
) -> ApiResult<Vec<MenuCategory>> {
    let menu = assemble_menu(
        &state.pool,
        &identity.tenant_id,
        MenuView::Admin,
        query.category_id,
    )
    .await?;
    Ok(Json(menu))
}
