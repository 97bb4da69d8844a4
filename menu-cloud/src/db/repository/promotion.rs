//! Promotional Image Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{PromotionCreate, PromotionUpdate, PromotionalImage};
use sqlx::SqlitePool;

const PROMOTION_COLUMNS: &str = "id, tenant_id, image_url, title, description, link, position, \
     is_active, starts_at, ends_at, created_at, updated_at";

fn not_found(id: i64) -> RepoError {
    RepoError::not_found(ErrorCode::PromotionNotFound, format!("Promotion {id} not found"))
}

fn check_schedule(starts_at: Option<i64>, ends_at: Option<i64>) -> RepoResult<()> {
    if let (Some(start), Some(end)) = (starts_at, ends_at) {
        if end < start {
            return Err(RepoError::Rule {
                code: ErrorCode::InvalidSchedule,
                message: "ends_at must not be before starts_at".into(),
            });
        }
    }
    Ok(())
}

/// All promotions in position order (admin)
pub async fn list(pool: &SqlitePool, tenant_id: &str) -> RepoResult<Vec<PromotionalImage>> {
    let sql = format!(
        "SELECT {PROMOTION_COLUMNS} FROM promotional_image WHERE tenant_id = ? \
         ORDER BY position, created_at, id"
    );
    let promotions = sqlx::query_as::<_, PromotionalImage>(&sql)
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;
    Ok(promotions)
}

/// Active promotions whose schedule window contains `now` (inclusive)
pub async fn list_running(
    pool: &SqlitePool,
    tenant_id: &str,
    now: i64,
) -> RepoResult<Vec<PromotionalImage>> {
    let sql = format!(
        "SELECT {PROMOTION_COLUMNS} FROM promotional_image \
         WHERE tenant_id = ?1 AND is_active = 1 \
           AND (starts_at IS NULL OR starts_at <= ?2) \
           AND (ends_at IS NULL OR ends_at >= ?2) \
         ORDER BY position, created_at, id"
    );
    let promotions = sqlx::query_as::<_, PromotionalImage>(&sql)
        .bind(tenant_id)
        .bind(now)
        .fetch_all(pool)
        .await?;
    Ok(promotions)
}

pub async fn get(pool: &SqlitePool, tenant_id: &str, id: i64) -> RepoResult<PromotionalImage> {
    let sql = format!(
        "SELECT {PROMOTION_COLUMNS} FROM promotional_image WHERE id = ? AND tenant_id = ?"
    );
    sqlx::query_as::<_, PromotionalImage>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn create(
    pool: &SqlitePool,
    tenant_id: &str,
    data: PromotionCreate,
) -> RepoResult<PromotionalImage> {
    let image_url = data.image_url.trim();
    if image_url.is_empty() {
        return Err(RepoError::Validation("image_url is required".into()));
    }
    check_schedule(data.starts_at, data.ends_at)?;
    let id = shared::util::snowflake_id();

    sqlx::query(
        "INSERT INTO promotional_image (id, tenant_id, image_url, title, description, link, \
            position, is_active, starts_at, ends_at, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, \
            COALESCE(?7, (SELECT COALESCE(MAX(position), -1) + 1 FROM promotional_image \
                          WHERE tenant_id = ?2)), \
            ?8, ?9, ?10, ?11, ?11)",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(image_url)
    .bind(&data.title)
    .bind(&data.description)
    .bind(&data.link)
    .bind(data.position)
    .bind(data.is_active.unwrap_or(true))
    .bind(data.starts_at)
    .bind(data.ends_at)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;

    get(pool, tenant_id, id).await
}

pub async fn update(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    data: PromotionUpdate,
) -> RepoResult<PromotionalImage> {
    let current = get(pool, tenant_id, id).await?;
    let image_url = match data.image_url {
        Some(url) if url.trim().is_empty() => {
            return Err(RepoError::Validation("image_url is required".into()));
        }
        Some(url) => url.trim().to_string(),
        None => current.image_url,
    };
    // Nullable fields: explicit `null` clears, an absent key keeps
    let starts_at = data.starts_at.unwrap_or(current.starts_at);
    let ends_at = data.ends_at.unwrap_or(current.ends_at);
    check_schedule(starts_at, ends_at)?;

    sqlx::query(
        "UPDATE promotional_image SET \
            image_url = ?1, title = ?2, description = ?3, link = ?4, \
            position = COALESCE(?5, position), \
            is_active = COALESCE(?6, is_active), \
            starts_at = ?7, ends_at = ?8, updated_at = ?9 \
         WHERE id = ?10 AND tenant_id = ?11",
    )
    .bind(image_url)
    .bind(data.title.unwrap_or(current.title))
    .bind(data.description.unwrap_or(current.description))
    .bind(data.link.unwrap_or(current.link))
    .bind(data.position)
    .bind(data.is_active)
    .bind(starts_at)
    .bind(ends_at)
    .bind(shared::util::now_millis())
    .bind(id)
    .bind(tenant_id)
    .execute(pool)
    .await?;

    get(pool, tenant_id, id).await
}

pub async fn delete(pool: &SqlitePool, tenant_id: &str, id: i64) -> RepoResult<PromotionalImage> {
    let promotion = get(pool, tenant_id, id).await?;
    sqlx::query("DELETE FROM promotional_image WHERE id = ? AND tenant_id = ?")
        .bind(id)
        .bind(tenant_id)
        .execute(pool)
        .await?;
    Ok(promotion)
}

/// Rewrite positions so that `ids[i]` gets position `i`
pub async fn reorder(pool: &SqlitePool, tenant_id: &str, ids: &[i64]) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    let now = shared::util::now_millis();
    for (position, id) in ids.iter().enumerate() {
        let rows = sqlx::query(
            "UPDATE promotional_image SET position = ?, updated_at = ? \
             WHERE id = ? AND tenant_id = ?",
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

    fn banner(url: &str, starts_at: Option<i64>, ends_at: Option<i64>) -> PromotionCreate {
        PromotionCreate {
            image_url: url.to_string(),
            title: None,
            description: None,
            link: None,
            position: None,
            is_active: None,
            starts_at,
            ends_at,
        }
    }

    #[tokio::test]
    async fn running_respects_window_and_active_flag() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;

        create(&pool, &tenant, banner("https://cdn/always.png", None, None))
            .await
            .unwrap();
        create(&pool, &tenant, banner("https://cdn/window.png", Some(100), Some(200)))
            .await
            .unwrap();
        let off = create(&pool, &tenant, banner("https://cdn/off.png", None, None))
            .await
            .unwrap();
        update(
            &pool,
            &tenant,
            off.id,
            PromotionUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let urls = |list: Vec<PromotionalImage>| -> Vec<String> {
            list.into_iter().map(|p| p.image_url).collect()
        };
        assert_eq!(
            urls(list_running(&pool, &tenant, 150).await.unwrap()),
            vec!["https://cdn/always.png", "https://cdn/window.png"]
        );
        assert_eq!(
            urls(list_running(&pool, &tenant, 200).await.unwrap()).len(),
            2
        );
        assert_eq!(
            urls(list_running(&pool, &tenant, 201).await.unwrap()),
            vec!["https://cdn/always.png"]
        );
        assert_eq!(list(&pool, &tenant).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn inverted_schedule_is_rejected() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;

        let err = create(&pool, &tenant, banner("https://cdn/a.png", Some(200), Some(100)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Rule {
                code: ErrorCode::InvalidSchedule,
                ..
            }
        ));

        let promo = create(&pool, &tenant, banner("https://cdn/a.png", Some(100), None))
            .await
            .unwrap();
        let err = update(
            &pool,
            &tenant,
            promo.id,
            PromotionUpdate {
                ends_at: Some(Some(50)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Rule { .. }));
    }

    #[tokio::test]
    async fn schedule_end_can_be_removed() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let mut payload = banner("https://cdn/a.png", Some(100), Some(200));
        payload.title = Some("Happy hour".into());
        let promo = create(&pool, &tenant, payload).await.unwrap();

        let open_ended = update(
            &pool,
            &tenant,
            promo.id,
            PromotionUpdate {
                ends_at: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(open_ended.ends_at, None);
        assert_eq!(open_ended.starts_at, Some(100));
        assert_eq!(open_ended.title.as_deref(), Some("Happy hour"));
        assert_eq!(list_running(&pool, &tenant, 5_000).await.unwrap().len(), 1);

        let untitled = update(
            &pool,
            &tenant,
            promo.id,
            PromotionUpdate {
                title: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(untitled.title, None);
        assert_eq!(untitled.image_url, "https://cdn/a.png");
    }

    #[tokio::test]
    async fn foreign_promotion_is_not_found() {
        let pool = pool().await;
        let tenant_a = seed_tenant(&pool, "tenant-a").await;
        let tenant_b = seed_tenant(&pool, "tenant-b").await;
        let promo = create(&pool, &tenant_b, banner("https://cdn/b.png", None, None))
            .await
            .unwrap();

        assert!(matches!(
            delete(&pool, &tenant_a, promo.id).await,
            Err(RepoError::NotFound {
                code: ErrorCode::PromotionNotFound,
                ..
            })
        ));
        assert_eq!(list(&pool, &tenant_b).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reorder_rewrites_positions() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let a = create(&pool, &tenant, banner("a", None, None)).await.unwrap();
        let b = create(&pool, &tenant, banner("b", None, None)).await.unwrap();

        reorder(&pool, &tenant, &[b.id, a.id]).await.unwrap();
        let order: Vec<i64> = list(&pool, &tenant).await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(order, vec![b.id, a.id]);
    }
}
