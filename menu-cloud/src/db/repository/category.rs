//! Category Repository

use super::{RepoError, RepoResult, require_name};
use shared::error::ErrorCode;
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use sqlx::SqlitePool;

const CATEGORY_COLUMNS: &str =
    "id, tenant_id, name, icon, position, is_active, created_at, updated_at";

/// Categories every new restaurant starts with
pub const DEFAULT_CATEGORIES: &[&str] = &["Entrantes", "Principales", "Postres", "Bebidas"];

fn not_found(id: i64) -> RepoError {
    RepoError::not_found(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
}

/// Categories ordered by position; inactive ones only when `include_inactive`
pub async fn list(
    pool: &SqlitePool,
    tenant_id: &str,
    include_inactive: bool,
) -> RepoResult<Vec<Category>> {
    let sql = format!(
        "SELECT {CATEGORY_COLUMNS} FROM category \
         WHERE tenant_id = ? AND (? OR is_active = 1) \
         ORDER BY position, created_at, id"
    );
    let categories = sqlx::query_as::<_, Category>(&sql)
        .bind(tenant_id)
        .bind(include_inactive)
        .fetch_all(pool)
        .await?;
    Ok(categories)
}

pub async fn find_by_id(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<Category>> {
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM category WHERE id = ? AND tenant_id = ?");
    let category = sqlx::query_as::<_, Category>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?;
    Ok(category)
}

pub async fn get(pool: &SqlitePool, tenant_id: &str, id: i64) -> RepoResult<Category> {
    find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Create a category; without an explicit position it goes last
pub async fn create(
    pool: &SqlitePool,
    tenant_id: &str,
    data: CategoryCreate,
) -> RepoResult<Category> {
    let name = require_name(&data.name, "Category")?;
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    sqlx::query(
        "INSERT INTO category \
            (id, tenant_id, name, icon, position, is_active, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, \
            COALESCE(?5, (SELECT COALESCE(MAX(position), -1) + 1 FROM category \
                          WHERE tenant_id = ?2)), \
            ?6, ?7, ?7)",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(&name)
    .bind(&data.icon)
    .bind(data.position)
    .bind(data.is_active.unwrap_or(true))
    .bind(now)
    .execute(pool)
    .await?;

    get(pool, tenant_id, id).await
}

/// Insert the default category set in order
pub async fn create_defaults(pool: &SqlitePool, tenant_id: &str) -> RepoResult<Vec<Category>> {
    let mut created = Vec::with_capacity(DEFAULT_CATEGORIES.len());
    for (position, name) in DEFAULT_CATEGORIES.iter().enumerate() {
        created.push(
            create(
                pool,
                tenant_id,
                CategoryCreate {
                    name: (*name).to_string(),
                    icon: None,
                    position: Some(position as i32),
                    is_active: Some(true),
                },
            )
            .await?,
        );
    }
    Ok(created)
}

pub async fn update(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    data: CategoryUpdate,
) -> RepoResult<Category> {
    let name = data
        .name
        .as_deref()
        .map(|n| require_name(n, "Category"))
        .transpose()?;

    // `icon: null` clears it; an absent key keeps it
    let rows = sqlx::query(
        "UPDATE category SET \
            name = COALESCE(?1, name), \
            icon = CASE WHEN ?2 THEN ?3 ELSE icon END, \
            position = COALESCE(?4, position), \
            is_active = COALESCE(?5, is_active), \
            updated_at = ?6 \
         WHERE id = ?7 AND tenant_id = ?8",
    )
    .bind(name)
    .bind(data.icon.is_some())
    .bind(data.icon.flatten())
    .bind(data.position)
    .bind(data.is_active)
    .bind(shared::util::now_millis())
    .bind(id)
    .bind(tenant_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    get(pool, tenant_id, id).await
}

/// Delete a category together with its items and their children
pub async fn delete(pool: &SqlitePool, tenant_id: &str, id: i64) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    let exists: Option<i64> =
        sqlx::query_scalar("SELECT id FROM category WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&mut *tx)
            .await?;
    if exists.is_none() {
        return Err(not_found(id));
    }

    for table in [
        "menu_item_disabled_option",
        "menu_item_modifier_group",
        "menu_item_variant",
        "menu_item_ingredient",
    ] {
        let sql = format!(
            "DELETE FROM {table} WHERE tenant_id = ? AND item_id IN \
             (SELECT id FROM menu_item WHERE category_id = ? AND tenant_id = ?)"
        );
        sqlx::query(&sql)
            .bind(tenant_id)
            .bind(id)
            .bind(tenant_id)
            .execute(&mut *tx)
            .await?;
    }
    let items = sqlx::query("DELETE FROM menu_item WHERE category_id = ? AND tenant_id = ?")
        .bind(id)
        .bind(tenant_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM category WHERE id = ? AND tenant_id = ?")
        .bind(id)
        .bind(tenant_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::debug!(
        tenant_id = %tenant_id,
        category_id = id,
        items_removed = items.rows_affected(),
        "Category deleted"
    );
    Ok(())
}

/// Rewrite positions so that `ids[i]` gets position `i`
pub async fn reorder(pool: &SqlitePool, tenant_id: &str, ids: &[i64]) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    let now = shared::util::now_millis();
    for (position, id) in ids.iter().enumerate() {
        let rows = sqlx::query(
            "UPDATE category SET position = ?, updated_at = ? WHERE id = ? AND tenant_id = ?",
        )
        .bind(position as i32)
        .bind(now)
        .bind(id)
        .bind(tenant_id)
        .execute(&mut *tx)
        .await?;
        if rows.rows_affected() == 0 {
            return Err(not_found(*id));
        }
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{pool, seed_tenant};

    fn create_payload(name: &str) -> CategoryCreate {
        CategoryCreate {
            name: name.to_string(),
            icon: None,
            position: None,
            is_active: None,
        }
    }

    #[tokio::test]
    async fn create_appends_positions() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;

        let first = create(&pool, &tenant, create_payload("Cafés")).await.unwrap();
        let second = create(&pool, &tenant, create_payload("Tés")).await.unwrap();
        assert_eq!(first.position, 0);
        assert_eq!(second.position, 1);
        assert!(second.is_active);
    }

    #[tokio::test]
    async fn defaults_are_created_in_order() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        create_defaults(&pool, &tenant).await.unwrap();

        let names: Vec<String> = list(&pool, &tenant, true)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Entrantes", "Principales", "Postres", "Bebidas"]);
    }

    #[tokio::test]
    async fn list_filters_inactive_for_public() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let hidden = create(&pool, &tenant, create_payload("Secret")).await.unwrap();
        create(&pool, &tenant, create_payload("Visible")).await.unwrap();
        update(
            &pool,
            &tenant,
            hidden.id,
            CategoryUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(list(&pool, &tenant, false).await.unwrap().len(), 1);
        assert_eq!(list(&pool, &tenant, true).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn icon_is_kept_unless_cleared() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let mut payload = create_payload("Cafés");
        payload.icon = Some("coffee".into());
        let category = create(&pool, &tenant, payload).await.unwrap();

        let renamed = update(
            &pool,
            &tenant,
            category.id,
            CategoryUpdate {
                name: Some("Café".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.icon.as_deref(), Some("coffee"));

        let cleared = update(
            &pool,
            &tenant,
            category.id,
            CategoryUpdate {
                icon: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(cleared.icon, None);
        assert_eq!(cleared.name, "Café");
    }

    #[tokio::test]
    async fn other_tenants_categories_are_not_found() {
        let pool = pool().await;
        let tenant_a = seed_tenant(&pool, "tenant-a").await;
        let tenant_b = seed_tenant(&pool, "tenant-b").await;
        let b_category = create(&pool, &tenant_b, create_payload("B only")).await.unwrap();

        assert!(find_by_id(&pool, &tenant_a, b_category.id).await.unwrap().is_none());
        let err = update(
            &pool,
            &tenant_a,
            b_category.id,
            CategoryUpdate {
                name: Some("hijacked".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::NotFound { .. }));
        assert!(matches!(
            delete(&pool, &tenant_a, b_category.id).await,
            Err(RepoError::NotFound { .. })
        ));

        let untouched = get(&pool, &tenant_b, b_category.id).await.unwrap();
        assert_eq!(untouched.name, "B only");
    }

    #[tokio::test]
    async fn reorder_rewrites_positions() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let a = create(&pool, &tenant, create_payload("A")).await.unwrap();
        let b = create(&pool, &tenant, create_payload("B")).await.unwrap();
        let c = create(&pool, &tenant, create_payload("C")).await.unwrap();

        reorder(&pool, &tenant, &[c.id, a.id, b.id]).await.unwrap();
        let names: Vec<String> = list(&pool, &tenant, true)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn reorder_with_foreign_id_changes_nothing() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let other = seed_tenant(&pool, "other").await;
        let a = create(&pool, &tenant, create_payload("A")).await.unwrap();
        let b = create(&pool, &tenant, create_payload("B")).await.unwrap();
        let foreign = create(&pool, &other, create_payload("X")).await.unwrap();

        let err = reorder(&pool, &tenant, &[b.id, foreign.id, a.id]).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound { .. }));
        assert_eq!(get(&pool, &tenant, b.id).await.unwrap().position, 1);
    }
}
