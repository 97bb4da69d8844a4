//! Menu Item API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    AvailabilityUpdate, ItemModifierBinding, MenuItem, MenuItemCreate, MenuItemUpdate,
    MenuItemView, SortOrderUpdate,
};
use shared::pricing::{self, LinePrice, PricingError, SizeChoice};

use crate::api::ApiResult;
use crate::auth::TenantIdentity;
use crate::db::repository::{binding, menu_item};
use crate::menu::assemble_item;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AssignGroupsRequest {
    pub group_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct OptionToggle {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub size: Option<SizeChoice>,
    #[serde(default)]
    pub option_ids: Vec<i64>,
    #[serde(default = "one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub item_id: i64,
    #[serde(flatten)]
    pub price: LinePrice,
}

/// GET /api/menu-items?category_id=
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<MenuItem>> {
    let items = menu_item::list(&state.pool, &identity.tenant_id, query.category_id).await?;
    Ok(Json(items))
}

/// GET /api/menu-items/{id} — with ingredients and bound modifier groups
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<MenuItemView> {
    Ok(Json(assemble_item(&state.pool, &identity.tenant_id, id).await?))
}

/// POST /api/menu-items
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Json(payload): Json<MenuItemCreate>,
) -> ApiResult<MenuItemView> {
    let item = menu_item::create(&state.pool, &identity.tenant_id, payload).await?;
    tracing::info!(tenant_id = %identity.tenant_id, item_id = item.id, "Menu item created");
    Ok(Json(
        assemble_item(&state.pool, &identity.tenant_id, item.id).await?,
    ))
}

/// PUT /api/menu-items/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemUpdate>,
) -> ApiResult<MenuItemView> {
    menu_item::update(&state.pool, &identity.tenant_id, id, payload).await?;
    Ok(Json(assemble_item(&state.pool, &identity.tenant_id, id).await?))
}

/// DELETE /api/menu-items/{id}
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    menu_item::delete(&state.pool, &identity.tenant_id, id).await?;
    tracing::info!(tenant_id = %identity.tenant_id, item_id = id, "Menu item deleted");
    Ok(Json(true))
}

/// PUT /api/menu-items/sort-order
pub async fn batch_update_sort_order(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Json(payload): Json<SortOrderUpdate>,
) -> ApiResult<bool> {
    menu_item::reorder(&state.pool, &identity.tenant_id, &payload.ids).await?;
    Ok(Json(true))
}

/// PUT /api/menu-items/{id}/availability
pub async fn set_availability(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
    Json(payload): Json<AvailabilityUpdate>,
) -> ApiResult<MenuItem> {
    let item =
        menu_item::set_availability(&state.pool, &identity.tenant_id, id, payload.is_available)
            .await?;
    Ok(Json(item))
}

/// GET /api/menu-items/{id}/modifier-groups
pub async fn list_modifier_groups(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<ItemModifierBinding>> {
    Ok(Json(
        binding::list_for_item(&state.pool, &identity.tenant_id, id).await?,
    ))
}

/// PUT /api/menu-items/{id}/modifier-groups — replaces the whole binding list
pub async fn assign_modifier_groups(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
    Json(payload): Json<AssignGroupsRequest>,
) -> ApiResult<Vec<ItemModifierBinding>> {
    let bindings =
        binding::assign(&state.pool, &identity.tenant_id, id, &payload.group_ids).await?;
    Ok(Json(bindings))
}

/// PUT /api/menu-items/{id}/modifier-options/{option_id}
pub async fn set_option_enabled(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path((id, option_id)): Path<(i64, i64)>,
    Json(payload): Json<OptionToggle>,
) -> ApiResult<Vec<ItemModifierBinding>> {
    binding::set_option_enabled(
        &state.pool,
        &identity.tenant_id,
        id,
        option_id,
        payload.enabled,
    )
    .await?;
    Ok(Json(
        binding::list_for_item(&state.pool, &identity.tenant_id, id).await?,
    ))
}

/// POST /api/menu-items/{id}/quote — price one order line
pub async fn quote(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<i64>,
    Json(payload): Json<QuoteRequest>,
) -> ApiResult<QuoteResponse> {
    let view = assemble_item(&state.pool, &identity.tenant_id, id).await?;

    pricing::validate_selection(&view.modifier_groups, &payload.option_ids).map_err(
        |violations| {
            AppError::new(ErrorCode::ModifierSelectionInvalid)
                .with_detail("violations", serde_json::json!(violations))
        },
    )?;

    let price = pricing::compose(
        &view.item.pricing,
        &view.modifier_groups,
        payload.size,
        &payload.option_ids,
        payload.quantity,
    )
    .map_err(|e| match e {
        PricingError::InvalidPricingState(msg) => {
            AppError::with_message(ErrorCode::InvalidPricing, msg)
        }
        PricingError::InvalidQuantity => {
            AppError::validation(e.to_string()).with_detail("field", "quantity")
        }
    })?;

    Ok(Json(QuoteResponse { item_id: id, price }))
}
