//! Tenant Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{SubscriptionStatus, Tenant, TenantPlan, TenantUpdate};
use sqlx::SqlitePool;

const TENANT_COLUMNS: &str = "id, subdomain, name, email, plan, status, phone, address, city, \
     country, logo_url, primary_color, secondary_color, operating_hours, qr_code_url, \
     is_deleted, created_at, updated_at";

/// Fields known at provisioning time
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub id: String,
    pub subdomain: String,
    pub name: String,
    pub email: String,
    pub plan: TenantPlan,
    pub status: SubscriptionStatus,
}

fn not_found(id: &str) -> RepoError {
    RepoError::not_found(ErrorCode::TenantNotFound, format!("Tenant {id} not found"))
}

/// Insert a tenant. A taken subdomain surfaces as `RepoError::Duplicate`.
pub async fn create(pool: &SqlitePool, data: NewTenant) -> RepoResult<Tenant> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO tenant (id, subdomain, name, email, plan, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&data.id)
    .bind(&data.subdomain)
    .bind(&data.name)
    .bind(&data.email)
    .bind(data.plan)
    .bind(data.status)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, &data.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create tenant".into()))
}

/// Live (not deleted) tenant by id
pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Tenant>> {
    let sql = format!("SELECT {TENANT_COLUMNS} FROM tenant WHERE id = ? AND is_deleted = 0");
    let tenant = sqlx::query_as::<_, Tenant>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(tenant)
}

/// Live (not deleted) tenant by subdomain
pub async fn find_by_subdomain(pool: &SqlitePool, subdomain: &str) -> RepoResult<Option<Tenant>> {
    let sql =
        format!("SELECT {TENANT_COLUMNS} FROM tenant WHERE subdomain = ? AND is_deleted = 0");
    let tenant = sqlx::query_as::<_, Tenant>(&sql)
        .bind(subdomain)
        .fetch_optional(pool)
        .await?;
    Ok(tenant)
}

/// Whether any tenant row (deleted ones included) holds the subdomain
pub async fn subdomain_taken(pool: &SqlitePool, subdomain: &str) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tenant WHERE subdomain = ?")
        .bind(subdomain)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn update_profile(pool: &SqlitePool, id: &str, data: TenantUpdate) -> RepoResult<Tenant> {
    if data.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(RepoError::Validation("Restaurant name is required".into()));
    }
    let hours = data
        .operating_hours
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| RepoError::Validation(format!("Invalid operating hours: {e}")))?;

    let rows = sqlx::query(
        "UPDATE tenant SET \
            name = COALESCE(?1, name), \
            phone = COALESCE(?2, phone), \
            address = COALESCE(?3, address), \
            city = COALESCE(?4, city), \
            country = COALESCE(?5, country), \
            logo_url = COALESCE(?6, logo_url), \
            primary_color = COALESCE(?7, primary_color), \
            secondary_color = COALESCE(?8, secondary_color), \
            operating_hours = COALESCE(?9, operating_hours), \
            updated_at = ?10 \
         WHERE id = ?11 AND is_deleted = 0",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.phone)
    .bind(&data.address)
    .bind(&data.city)
    .bind(&data.country)
    .bind(&data.logo_url)
    .bind(&data.primary_color)
    .bind(&data.secondary_color)
    .bind(hours)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

pub async fn set_qr_code_url(pool: &SqlitePool, id: &str, url: &str) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE tenant SET qr_code_url = ?, updated_at = ? WHERE id = ?")
        .bind(url)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

/// Tenants are never hard-deleted
pub async fn soft_delete(pool: &SqlitePool, id: &str) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE tenant SET is_deleted = 1, updated_at = ? WHERE id = ? AND is_deleted = 0",
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}
