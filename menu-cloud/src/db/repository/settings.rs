//! Restaurant Settings Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{
    DEFAULT_CURRENCY, DEFAULT_LANGUAGE, DEFAULT_TIMEZONE, RestaurantSettings, SettingsUpdate,
};
use sqlx::SqlitePool;

const SETTINGS_COLUMNS: &str =
    "tenant_id, currency, language, timezone, show_prices, ordering_enabled, updated_at";

/// Insert the default settings row; an existing row is left untouched
pub async fn create_default(pool: &SqlitePool, tenant_id: &str) -> RepoResult<RestaurantSettings> {
    sqlx::query(
        "INSERT INTO restaurant_settings (tenant_id, currency, language, timezone, updated_at) \
         VALUES (?, ?, ?, ?, ?) ON CONFLICT (tenant_id) DO NOTHING",
    )
    .bind(tenant_id)
    .bind(DEFAULT_CURRENCY)
    .bind(DEFAULT_LANGUAGE)
    .bind(DEFAULT_TIMEZONE)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;
    get(pool, tenant_id).await
}

pub async fn get(pool: &SqlitePool, tenant_id: &str) -> RepoResult<RestaurantSettings> {
    let sql = format!("SELECT {SETTINGS_COLUMNS} FROM restaurant_settings WHERE tenant_id = ?");
    sqlx::query_as::<_, RestaurantSettings>(&sql)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::not_found(ErrorCode::NotFound, "Settings not found"))
}

pub async fn update(
    pool: &SqlitePool,
    tenant_id: &str,
    data: SettingsUpdate,
) -> RepoResult<RestaurantSettings> {
    if let Some(currency) = &data.currency {
        if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(RepoError::Validation(
                "Currency must be a 3-letter ISO code".into(),
            ));
        }
    }
    let rows = sqlx::query(
        "UPDATE restaurant_settings SET \
            currency = COALESCE(?1, currency), \
            language = COALESCE(?2, language), \
            timezone = COALESCE(?3, timezone), \
            show_prices = COALESCE(?4, show_prices), \
            ordering_enabled = COALESCE(?5, ordering_enabled), \
            updated_at = ?6 \
         WHERE tenant_id = ?7",
    )
    .bind(&data.currency)
    .bind(&data.language)
    .bind(&data.timezone)
    .bind(data.show_prices)
    .bind(data.ordering_enabled)
    .bind(shared::util::now_millis())
    .bind(tenant_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::not_found(ErrorCode::NotFound, "Settings not found"));
    }
    get(pool, tenant_id).await
}
