//! Item ↔ Modifier Group bindings and per-item option enablement
//!
//! An item binds a list of groups (position = list index). Options are
//! enabled by default; `menu_item_disabled_option` stores the ones an item
//! has switched off.

use std::collections::{HashMap, HashSet};

use super::{RepoError, RepoResult, modifier};
use shared::error::ErrorCode;
use shared::models::{BoundModifierOption, ItemModifierBinding};
use sqlx::{SqliteConnection, SqlitePool};

/// One stored binding row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BindingRow {
    pub item_id: i64,
    pub group_id: String,
    pub position: i32,
}

fn item_not_found(id: i64) -> RepoError {
    RepoError::not_found(ErrorCode::MenuItemNotFound, format!("Menu item {id} not found"))
}

async fn ensure_item(conn: &mut SqliteConnection, tenant_id: &str, item_id: i64) -> RepoResult<()> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM menu_item WHERE id = ? AND tenant_id = ?")
            .bind(item_id)
            .bind(tenant_id)
            .fetch_optional(&mut *conn)
            .await?;
    found.map(|_| ()).ok_or_else(|| item_not_found(item_id))
}

/// Replace an item's binding set on an open connection/transaction.
///
/// Duplicates collapse to their first occurrence. Disabled rows survive only
/// for groups that stay bound.
pub(crate) async fn replace_bindings(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    item_id: i64,
    group_ids: &[String],
) -> RepoResult<Vec<String>> {
    let mut seen = HashSet::new();
    let ordered: Vec<String> = group_ids
        .iter()
        .map(|id| id.trim().to_string())
        .filter(|id| seen.insert(id.clone()))
        .collect();

    for group_id in &ordered {
        let found: Option<String> =
            sqlx::query_scalar("SELECT id FROM modifier_group WHERE tenant_id = ? AND id = ?")
                .bind(tenant_id)
                .bind(group_id)
                .fetch_optional(&mut *conn)
                .await?;
        if found.is_none() {
            return Err(modifier::not_found(group_id));
        }
    }

    let current: Vec<String> = sqlx::query_scalar(
        "SELECT group_id FROM menu_item_modifier_group WHERE item_id = ? AND tenant_id = ?",
    )
    .bind(item_id)
    .bind(tenant_id)
    .fetch_all(&mut *conn)
    .await?;
    for dropped in current.iter().filter(|g| !ordered.contains(g)) {
        sqlx::query(
            "DELETE FROM menu_item_disabled_option \
             WHERE item_id = ? AND tenant_id = ? AND group_id = ?",
        )
        .bind(item_id)
        .bind(tenant_id)
        .bind(dropped)
        .execute(&mut *conn)
        .await?;
    }

    sqlx::query("DELETE FROM menu_item_modifier_group WHERE item_id = ? AND tenant_id = ?")
        .bind(item_id)
        .bind(tenant_id)
        .execute(&mut *conn)
        .await?;
    for (position, group_id) in ordered.iter().enumerate() {
        sqlx::query(
            "INSERT INTO menu_item_modifier_group (item_id, tenant_id, group_id, position) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(item_id)
        .bind(tenant_id)
        .bind(group_id)
        .bind(position as i32)
        .execute(&mut *conn)
        .await?;
    }
    Ok(ordered)
}

/// Replace the item's bound groups in one transaction and return the new
/// binding listing. An empty list detaches everything.
pub async fn assign(
    pool: &SqlitePool,
    tenant_id: &str,
    item_id: i64,
    group_ids: &[String],
) -> RepoResult<Vec<ItemModifierBinding>> {
    let mut tx = pool.begin().await?;
    ensure_item(&mut tx, tenant_id, item_id).await?;
    let bound = replace_bindings(&mut tx, tenant_id, item_id, group_ids).await?;
    tx.commit().await?;

    tracing::debug!(
        tenant_id = %tenant_id,
        item_id,
        groups = bound.len(),
        "Modifier groups assigned"
    );
    list_for_item(pool, tenant_id, item_id).await
}

/// Enable or disable one option for one item. The option's group must be
/// bound to the item.
pub async fn set_option_enabled(
    pool: &SqlitePool,
    tenant_id: &str,
    item_id: i64,
    option_id: i64,
    enabled: bool,
) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    ensure_item(&mut tx, tenant_id, item_id).await?;

    let option_not_found = || {
        RepoError::not_found(
            ErrorCode::ModifierOptionNotFound,
            format!("Modifier option {option_id} not found for item {item_id}"),
        )
    };
    let group_id: String = sqlx::query_scalar(
        "SELECT group_id FROM modifier_option WHERE id = ? AND tenant_id = ?",
    )
    .bind(option_id)
    .bind(tenant_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(option_not_found)?;

    let bound: Option<String> = sqlx::query_scalar(
        "SELECT group_id FROM menu_item_modifier_group \
         WHERE item_id = ? AND tenant_id = ? AND group_id = ?",
    )
    .bind(item_id)
    .bind(tenant_id)
    .bind(&group_id)
    .fetch_optional(&mut *tx)
    .await?;
    if bound.is_none() {
        return Err(option_not_found());
    }

    if enabled {
        sqlx::query("DELETE FROM menu_item_disabled_option WHERE item_id = ? AND option_id = ?")
            .bind(item_id)
            .bind(option_id)
            .execute(&mut *tx)
            .await?;
    } else {
        sqlx::query(
            "INSERT INTO menu_item_disabled_option (item_id, option_id, group_id, tenant_id) \
             VALUES (?, ?, ?, ?) ON CONFLICT (item_id, option_id) DO NOTHING",
        )
        .bind(item_id)
        .bind(option_id)
        .bind(&group_id)
        .bind(tenant_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Binding rows of the tenant (or one item), by item then position
pub async fn bindings(
    pool: &SqlitePool,
    tenant_id: &str,
    item_id: Option<i64>,
) -> RepoResult<Vec<BindingRow>> {
    let rows = sqlx::query_as::<_, BindingRow>(
        "SELECT item_id, group_id, position FROM menu_item_modifier_group \
         WHERE tenant_id = ? AND (? IS NULL OR item_id = ?) \
         ORDER BY item_id, position, group_id",
    )
    .bind(tenant_id)
    .bind(item_id)
    .bind(item_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Disabled option ids per item
pub async fn disabled_options(
    pool: &SqlitePool,
    tenant_id: &str,
    item_id: Option<i64>,
) -> RepoResult<HashMap<i64, HashSet<i64>>> {
    let rows: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT item_id, option_id FROM menu_item_disabled_option \
         WHERE tenant_id = ? AND (? IS NULL OR item_id = ?)",
    )
    .bind(tenant_id)
    .bind(item_id)
    .bind(item_id)
    .fetch_all(pool)
    .await?;

    let mut disabled: HashMap<i64, HashSet<i64>> = HashMap::new();
    for (item, option) in rows {
        disabled.entry(item).or_default().insert(option);
    }
    Ok(disabled)
}

/// Bound groups of an item in position order, every option flagged with its
/// enablement. Bindings whose group is gone are skipped.
pub async fn list_for_item(
    pool: &SqlitePool,
    tenant_id: &str,
    item_id: i64,
) -> RepoResult<Vec<ItemModifierBinding>> {
    {
        let mut conn = pool.acquire().await?;
        ensure_item(&mut conn, tenant_id, item_id).await?;
    }

    let rows = bindings(pool, tenant_id, Some(item_id)).await?;
    let disabled = disabled_options(pool, tenant_id, Some(item_id))
        .await?
        .remove(&item_id)
        .unwrap_or_default();
    let groups: HashMap<String, _> = modifier::list(pool, tenant_id)
        .await?
        .into_iter()
        .map(|g| (g.id.clone(), g))
        .collect();

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let group = groups.get(&row.group_id)?;
            Some(ItemModifierBinding {
                group_id: group.id.clone(),
                group_name: group.name.clone(),
                group_type: group.group_type,
                position: row.position,
                options: group
                    .options
                    .iter()
                    .map(|option| BoundModifierOption {
                        enabled: !disabled.contains(&option.id),
                        option: option.clone(),
                    })
                    .collect(),
            })
        })
        .collect())
}
