//! Tenant context: JWT sessions for the admin API, subdomains for the
//! public menu

pub mod tenant_auth;
pub mod tenant_context;

pub use tenant_auth::{TenantClaims, TenantIdentity, create_token, tenant_auth_middleware};
pub use tenant_context::{resolve_public_tenant, subdomain_from_host};
