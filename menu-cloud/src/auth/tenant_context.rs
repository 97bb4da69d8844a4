//! Public tenant resolution from a subdomain or `Host` header

use shared::error::AppError;
use shared::models::{Tenant, normalize_subdomain, validate_subdomain};
use sqlx::SqlitePool;

use crate::db::repository::tenant;

/// Extract the tenant label from `Host` when it is `{label}.{base_domain}`.
///
/// The port is ignored; nested labels (`a.b.{base_domain}`) do not match.
pub fn subdomain_from_host(host: &str, base_domain: &str) -> Option<String> {
    let host = host.trim().to_ascii_lowercase();
    let host = host.split(':').next().unwrap_or_default();
    let base = base_domain.trim().trim_start_matches('.').to_ascii_lowercase();
    let label = host.strip_suffix(base.as_str())?.strip_suffix('.')?;
    if label.is_empty() || label.contains('.') {
        return None;
    }
    Some(label.to_string())
}

/// Live tenant for a public subdomain. Malformed, unknown and deleted
/// subdomains all answer `TenantNotFound`.
pub async fn resolve_public_tenant(pool: &SqlitePool, subdomain: &str) -> Result<Tenant, AppError> {
    let subdomain = normalize_subdomain(subdomain);
    if validate_subdomain(&subdomain).is_err() {
        return Err(AppError::tenant_not_found());
    }
    tenant::find_by_subdomain(pool, &subdomain)
        .await?
        .ok_or_else(AppError::tenant_not_found)
}
