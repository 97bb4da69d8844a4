//! Modifier Group Repository
//!
//! Groups are tenant-wide. Editing a group's options replaces them for every
//! item bound to it; per-item disabled rows for that group are dropped with
//! the old options.

use std::collections::HashMap;

use super::{RepoError, RepoResult, require_name};
use shared::error::ErrorCode;
use shared::models::{
    GroupUsage, ModifierGroup, ModifierGroupCreate, ModifierGroupType, ModifierGroupUpdate,
    ModifierOption, ModifierOptionInput, SelectionRules,
};
use shared::util::{slugify, to_decimal, to_f64};
use sqlx::{SqliteConnection, SqlitePool};

const GROUP_COLUMNS: &str = "id, tenant_id, name, group_type, required, min_selections, \
     max_selections, position, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct GroupRow {
    id: String,
    tenant_id: String,
    name: String,
    group_type: ModifierGroupType,
    required: bool,
    min_selections: i32,
    max_selections: Option<i32>,
    position: i32,
    created_at: i64,
    updated_at: i64,
}

impl GroupRow {
    fn into_group(self, options: Vec<ModifierOption>) -> ModifierGroup {
        ModifierGroup {
            id: self.id,
            tenant_id: self.tenant_id,
            name: self.name,
            group_type: self.group_type,
            required: self.required,
            min_selections: self.min_selections,
            max_selections: self.max_selections,
            position: self.position,
            options,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OptionRow {
    id: i64,
    group_id: String,
    label: String,
    price_modifier: f64,
    is_default: bool,
    position: i32,
}

impl From<OptionRow> for ModifierOption {
    fn from(row: OptionRow) -> Self {
        ModifierOption {
            id: row.id,
            group_id: row.group_id,
            label: row.label,
            price_modifier: to_decimal(row.price_modifier),
            is_default: row.is_default,
            position: row.position,
        }
    }
}

pub(crate) fn not_found(id: &str) -> RepoError {
    RepoError::not_found(
        ErrorCode::ModifierGroupNotFound,
        format!("Modifier group {id} not found"),
    )
}

/// Options of the tenant's groups (or one group), grouped by group id
pub async fn options_by_group(
    pool: &SqlitePool,
    tenant_id: &str,
    group_id: Option<&str>,
) -> RepoResult<HashMap<String, Vec<ModifierOption>>> {
    let rows = sqlx::query_as::<_, OptionRow>(
        "SELECT id, group_id, label, price_modifier, is_default, position FROM modifier_option \
         WHERE tenant_id = ? AND (? IS NULL OR group_id = ?) \
         ORDER BY group_id, position, id",
    )
    .bind(tenant_id)
    .bind(group_id)
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<String, Vec<ModifierOption>> = HashMap::new();
    for row in rows {
        grouped.entry(row.group_id.clone()).or_default().push(row.into());
    }
    Ok(grouped)
}

/// Groups with their options, in position order
pub async fn list(pool: &SqlitePool, tenant_id: &str) -> RepoResult<Vec<ModifierGroup>> {
    let sql = format!(
        "SELECT {GROUP_COLUMNS} FROM modifier_group WHERE tenant_id = ? \
         ORDER BY position, created_at, id"
    );
    let rows = sqlx::query_as::<_, GroupRow>(&sql)
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;

    let mut options = options_by_group(pool, tenant_id, None).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let group_options = options.remove(&row.id).unwrap_or_default();
            row.into_group(group_options)
        })
        .collect())
}

pub async fn find_by_id(
    pool: &SqlitePool,
    tenant_id: &str,
    id: &str,
) -> RepoResult<Option<ModifierGroup>> {
    let sql = format!("SELECT {GROUP_COLUMNS} FROM modifier_group WHERE tenant_id = ? AND id = ?");
    let Some(row) = sqlx::query_as::<_, GroupRow>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };
    let options = options_by_group(pool, tenant_id, Some(id))
        .await?
        .remove(id)
        .unwrap_or_default();
    Ok(Some(row.into_group(options)))
}

pub async fn get(pool: &SqlitePool, tenant_id: &str, id: &str) -> RepoResult<ModifierGroup> {
    find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| not_found(id))
}

async fn insert_options(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    group_id: &str,
    options: &[ModifierOptionInput],
) -> RepoResult<()> {
    for (position, option) in options.iter().enumerate() {
        let label = option.label.trim();
        if label.is_empty() {
            return Err(RepoError::Validation("Option label is required".into()));
        }
        sqlx::query(
            "INSERT INTO modifier_option \
                (id, tenant_id, group_id, label, price_modifier, is_default, position) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(shared::util::snowflake_id())
        .bind(tenant_id)
        .bind(group_id)
        .bind(label)
        .bind(to_f64(option.price_modifier))
        .bind(option.is_default)
        .bind(position as i32)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Group id from a caller slug, or `slug(name)-<millis>`
fn group_id_for(requested: Option<&str>, name: &str, now: i64) -> RepoResult<String> {
    match requested {
        Some(raw) => {
            let slug = slugify(raw);
            if slug.is_empty() {
                return Err(RepoError::Validation(
                    "Modifier group id must contain letters or digits".into(),
                ));
            }
            Ok(slug)
        }
        None => {
            let base = slugify(name);
            let base = if base.is_empty() { "group".to_string() } else { base };
            Ok(format!("{base}-{now}"))
        }
    }
}

/// Create a group with its options; a taken id is `RepoError::Duplicate`
pub async fn create(
    pool: &SqlitePool,
    tenant_id: &str,
    data: ModifierGroupCreate,
) -> RepoResult<ModifierGroup> {
    let name = require_name(&data.name, "Modifier group")?;
    let rules = SelectionRules::normalize(
        data.group_type,
        data.required,
        data.min_selections,
        data.max_selections,
    )
    .map_err(RepoError::Validation)?;
    let now = shared::util::now_millis();
    let id = group_id_for(data.id.as_deref(), &name, now)?;

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO modifier_group (id, tenant_id, name, group_type, required, min_selections, \
            max_selections, position, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, \
            COALESCE(?8, (SELECT COALESCE(MAX(position), -1) + 1 FROM modifier_group \
                          WHERE tenant_id = ?2)), \
            ?9, ?9)",
    )
    .bind(&id)
    .bind(tenant_id)
    .bind(&name)
    .bind(data.group_type)
    .bind(rules.required)
    .bind(rules.min_selections)
    .bind(rules.max_selections)
    .bind(data.position)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    insert_options(&mut tx, tenant_id, &id, &data.options).await?;
    tx.commit().await?;

    tracing::debug!(tenant_id = %tenant_id, group_id = %id, "Modifier group created");
    get(pool, tenant_id, &id).await
}

/// Edit a group for every item bound to it.
///
/// When `options` is present they are deleted and reinserted with fresh ids,
/// and every item's disabled rows for this group go with them.
pub async fn update_group(
    pool: &SqlitePool,
    tenant_id: &str,
    id: &str,
    data: ModifierGroupUpdate,
) -> RepoResult<ModifierGroup> {
    let current = get(pool, tenant_id, id).await?;
    let name = match data.name.as_deref() {
        Some(name) => require_name(name, "Modifier group")?,
        None => current.name,
    };
    let group_type = data.group_type.unwrap_or(current.group_type);
    let rules = SelectionRules::normalize(
        group_type,
        data.required.unwrap_or(current.required),
        Some(data.min_selections.unwrap_or(current.min_selections)),
        data.max_selections.unwrap_or(current.max_selections),
    )
    .map_err(RepoError::Validation)?;

    let mut tx = pool.begin().await?;
    sqlx::query(
        "UPDATE modifier_group SET name = ?, group_type = ?, required = ?, min_selections = ?, \
            max_selections = ?, position = COALESCE(?, position), updated_at = ? \
         WHERE tenant_id = ? AND id = ?",
    )
    .bind(&name)
    .bind(group_type)
    .bind(rules.required)
    .bind(rules.min_selections)
    .bind(rules.max_selections)
    .bind(data.position)
    .bind(shared::util::now_millis())
    .bind(tenant_id)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if let Some(options) = &data.options {
        let disabled = sqlx::query(
            "DELETE FROM menu_item_disabled_option WHERE tenant_id = ? AND group_id = ?",
        )
        .bind(tenant_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM modifier_option WHERE tenant_id = ? AND group_id = ?")
            .bind(tenant_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_options(&mut tx, tenant_id, id, options).await?;
        tracing::debug!(
            tenant_id = %tenant_id,
            group_id = %id,
            options = options.len(),
            disabled_rows_dropped = disabled.rows_affected(),
            "Modifier options replaced"
        );
    }

    tx.commit().await?;
    get(pool, tenant_id, id).await
}

/// Items bound to a group, for the shared-edit warning
pub async fn group_usage(pool: &SqlitePool, tenant_id: &str, id: &str) -> RepoResult<GroupUsage> {
    let exists: Option<String> =
        sqlx::query_scalar("SELECT id FROM modifier_group WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(pool)
            .await?;
    if exists.is_none() {
        return Err(not_found(id));
    }

    let names: Vec<String> = sqlx::query_scalar(
        "SELECT i.name FROM menu_item_modifier_group b \
         JOIN menu_item i ON i.id = b.item_id AND i.tenant_id = b.tenant_id \
         WHERE b.tenant_id = ? AND b.group_id = ? \
         ORDER BY i.position, i.created_at, i.id",
    )
    .bind(tenant_id)
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(GroupUsage {
        group_id: id.to_string(),
        bound_item_count: names.len(),
        bound_item_names: names,
    })
}

/// Delete a group with its options, bindings and disabled rows
pub async fn delete_group(pool: &SqlitePool, tenant_id: &str, id: &str) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    for table in [
        "menu_item_disabled_option",
        "menu_item_modifier_group",
        "modifier_option",
    ] {
        let sql = format!("DELETE FROM {table} WHERE tenant_id = ? AND group_id = ?");
        sqlx::query(&sql)
            .bind(tenant_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    let rows = sqlx::query("DELETE FROM modifier_group WHERE tenant_id = ? AND id = ?")
        .bind(tenant_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::repository::test_support::{pool, seed_tenant};
    use rust_decimal::Decimal;

    pub(crate) fn option(label: &str, cents: i64) -> ModifierOptionInput {
        ModifierOptionInput {
            label: label.to_string(),
            price_modifier: Decimal::new(cents, 2),
            is_default: false,
        }
    }

    pub(crate) fn group_payload(
        id: &str,
        group_type: ModifierGroupType,
        options: Vec<ModifierOptionInput>,
    ) -> ModifierGroupCreate {
        ModifierGroupCreate {
            id: Some(id.to_string()),
            name: id.to_string(),
            group_type,
            required: false,
            min_selections: None,
            max_selections: None,
            position: None,
            options,
        }
    }

    #[tokio::test]
    async fn create_keeps_option_order_and_prices() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;

        let group = create(
            &pool,
            &tenant,
            group_payload(
                "milk",
                ModifierGroupType::Single,
                vec![option("Entera", 0), option("Avena", 50), option("Soja", 40)],
            ),
        )
        .await
        .unwrap();

        assert_eq!(group.id, "milk");
        assert_eq!(group.max_selections, Some(1));
        let labels: Vec<&str> = group.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Entera", "Avena", "Soja"]);
        assert_eq!(group.options[1].price_modifier, Decimal::new(50, 2));
    }

    #[tokio::test]
    async fn large_option_list_is_stored_whole() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let options: Vec<_> = (0..120).map(|i| option(&format!("Sabor {i}"), i)).collect();

        let group = create(
            &pool,
            &tenant,
            group_payload("flavours", ModifierGroupType::Multiple, options),
        )
        .await
        .unwrap();

        assert_eq!(group.options.len(), 120);
        assert_eq!(group.options[119].label, "Sabor 119");
    }

    #[tokio::test]
    async fn generated_id_is_slug_with_timestamp() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let mut payload = group_payload("x", ModifierGroupType::Multiple, vec![]);
        payload.id = None;
        payload.name = "Extra Toppings".into();

        let group = create(&pool, &tenant, payload).await.unwrap();
        assert!(group.id.starts_with("extra-toppings-"));
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected_but_other_tenant_may_reuse_it() {
        let pool = pool().await;
        let tenant_a = seed_tenant(&pool, "tenant-a").await;
        let tenant_b = seed_tenant(&pool, "tenant-b").await;

        create(&pool, &tenant_a, group_payload("milk", ModifierGroupType::Single, vec![]))
            .await
            .unwrap();
        let err = create(&pool, &tenant_a, group_payload("milk", ModifierGroupType::Single, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        create(&pool, &tenant_b, group_payload("milk", ModifierGroupType::Single, vec![]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn invalid_rules_are_rejected() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let mut payload = group_payload("extras", ModifierGroupType::Multiple, vec![]);
        payload.min_selections = Some(3);
        payload.max_selections = Some(2);

        let err = create(&pool, &tenant, payload).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn option_replace_issues_fresh_ids() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let group = create(
            &pool,
            &tenant,
            group_payload("milk", ModifierGroupType::Single, vec![option("Entera", 0)]),
        )
        .await
        .unwrap();

        let updated = update_group(
            &pool,
            &tenant,
            "milk",
            ModifierGroupUpdate {
                options: Some(vec![option("Entera", 0), option("Avena", 50)]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.options.len(), 2);
        assert!(updated.options.iter().all(|o| o.id != group.options[0].id));
    }

    #[tokio::test]
    async fn update_without_options_keeps_them() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let group = create(
            &pool,
            &tenant,
            group_payload("extras", ModifierGroupType::Multiple, vec![option("Nata", 60)]),
        )
        .await
        .unwrap();

        let updated = update_group(
            &pool,
            &tenant,
            "extras",
            ModifierGroupUpdate {
                name: Some("Extras".into()),
                max_selections: Some(Some(3)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Extras");
        assert_eq!(updated.max_selections, Some(3));
        assert_eq!(updated.options, group.options);

        let cleared = update_group(
            &pool,
            &tenant,
            "extras",
            ModifierGroupUpdate {
                max_selections: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(cleared.max_selections, None);
    }

    #[tokio::test]
    async fn foreign_group_is_not_found() {
        let pool = pool().await;
        let tenant_a = seed_tenant(&pool, "tenant-a").await;
        let tenant_b = seed_tenant(&pool, "tenant-b").await;
        create(&pool, &tenant_b, group_payload("milk", ModifierGroupType::Single, vec![]))
            .await
            .unwrap();

        assert!(find_by_id(&pool, &tenant_a, "milk").await.unwrap().is_none());
        assert!(matches!(
            group_usage(&pool, &tenant_a, "milk").await,
            Err(RepoError::NotFound { .. })
        ));
        assert!(matches!(
            delete_group(&pool, &tenant_a, "milk").await,
            Err(RepoError::NotFound { .. })
        ));
        assert!(find_by_id(&pool, &tenant_b, "milk").await.unwrap().is_some());
    }
}
