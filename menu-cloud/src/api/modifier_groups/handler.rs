//! Modifier Group API Handlers
//!
//! Groups are shared across items, so edits and deletes of a bound group
//! need `acknowledge_shared_edit`.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{GroupUsage, ModifierGroup, ModifierGroupCreate, ModifierGroupUpdate};

use crate::api::ApiResult;
use crate::auth::TenantIdentity;
use crate::db::repository::modifier;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub acknowledge_shared_edit: bool,
}

/// 409 listing the bound items unless the caller acknowledged the shared edit
fn ensure_acknowledged(usage: &GroupUsage, acknowledged: bool) -> Result<(), AppError> {
    if usage.bound_item_count == 0 || acknowledged {
        return Ok(());
    }
    Err(AppError::with_message(
        ErrorCode::ModifierGroupInUse,
        format!(
            "Modifier group is used by {} menu item(s)",
            usage.bound_item_count
        ),
    )
    .with_detail("group_id", usage.group_id.clone())
    .with_detail("bound_item_count", usage.bound_item_count)
    .with_detail("bound_item_names", usage.bound_item_names.clone()))
}

/// GET /api/modifier-groups
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
) -> ApiResult<Vec<ModifierGroup>> {
    Ok(Json(modifier::list(&state.pool, &identity.tenant_id).await?))
}

/// GET /api/modifier-groups/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<String>,
) -> ApiResult<ModifierGroup> {
    Ok(Json(modifier::get(&state.pool, &identity.tenant_id, &id).await?))
}

/// GET /api/modifier-groups/{id}/usage
pub async fn usage(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<String>,
) -> ApiResult<GroupUsage> {
    Ok(Json(
        modifier::group_usage(&state.pool, &identity.tenant_id, &id).await?,
    ))
}

/// POST /api/modifier-groups
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Json(payload): Json<ModifierGroupCreate>,
) -> ApiResult<ModifierGroup> {
    let group = modifier::create(&state.pool, &identity.tenant_id, payload).await?;
    tracing::info!(tenant_id = %identity.tenant_id, group_id = %group.id, "Modifier group created");
    Ok(Json(group))
}

/// PUT /api/modifier-groups/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<ModifierGroupUpdate>,
) -> ApiResult<ModifierGroup> {
    let usage = modifier::group_usage(&state.pool, &identity.tenant_id, &id).await?;
    ensure_acknowledged(&usage, payload.acknowledge_shared_edit)?;

    let group = modifier::update_group(&state.pool, &identity.tenant_id, &id, payload).await?;
    tracing::info!(
        tenant_id = %identity.tenant_id,
        group_id = %id,
        bound_items = usage.bound_item_count,
        "Modifier group updated"
    );
    Ok(Json(group))
}

/// DELETE /api/modifier-groups/{id}?acknowledge_shared_edit=true
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<bool> {
    let usage = modifier::group_usage(&state.pool, &identity.tenant_id, &id).await?;
    ensure_acknowledged(&usage, query.acknowledge_shared_edit)?;

    modifier::delete_group(&state.pool, &identity.tenant_id, &id).await?;
    tracing::info!(tenant_id = %identity.tenant_id, group_id = %id, "Modifier group deleted");
    Ok(Json(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(count: usize) -> GroupUsage {
        GroupUsage {
            group_id: "salsas".into(),
            bound_item_count: count,
            bound_item_names: (0..count).map(|i| format!("Item {i}")).collect(),
        }
    }

    #[test]
    fn unbound_group_needs_no_acknowledgement() {
        assert!(ensure_acknowledged(&usage(0), false).is_ok());
    }

    #[test]
    fn bound_group_requires_acknowledgement() {
        let err = ensure_acknowledged(&usage(2), false).unwrap_err();
        assert_eq!(err.code, ErrorCode::ModifierGroupInUse);
        let details = err.details.unwrap();
        assert_eq!(details["bound_item_count"], 2);
        assert_eq!(details["bound_item_names"][1], "Item 1");

        assert!(ensure_acknowledged(&usage(2), true).is_ok());
    }
}
