//! Tenant user (account ↔ tenant link) Repository

use super::RepoResult;
use shared::models::TenantUser;
use sqlx::SqlitePool;

pub const ROLE_OWNER: &str = "owner";

pub async fn create(
    pool: &SqlitePool,
    tenant_id: &str,
    account_id: &str,
    email: &str,
    role: &str,
) -> RepoResult<TenantUser> {
    let user = sqlx::query_as::<_, TenantUser>(
        "INSERT INTO tenant_user (id, tenant_id, account_id, email, role, created_at) \
         VALUES (?, ?, ?, ?, ?, ?) \
         RETURNING id, tenant_id, account_id, email, role, created_at",
    )
    .bind(shared::util::snowflake_id())
    .bind(tenant_id)
    .bind(account_id)
    .bind(email)
    .bind(role)
    .bind(shared::util::now_millis())
    .fetch_one(pool)
    .await?;
    Ok(user)
}

/// The tenant link of an account whose tenant is not deleted
pub async fn find_by_account(
    pool: &SqlitePool,
    account_id: &str,
) -> RepoResult<Option<TenantUser>> {
    let user = sqlx::query_as::<_, TenantUser>(
        "SELECT u.id, u.tenant_id, u.account_id, u.email, u.role, u.created_at \
         FROM tenant_user u JOIN tenant t ON t.id = u.tenant_id \
         WHERE u.account_id = ? AND t.is_deleted = 0",
    )
    .bind(account_id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}
