//! Tenant Model
//!
//! One tenant per restaurant. Tenants are soft-deleted (`is_deleted`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Subdomains that would shadow platform hosts
pub const RESERVED_SUBDOMAINS: &[&str] = &[
    "www", "api", "app", "admin", "dashboard", "mail", "static", "cdn", "assets", "signup",
    "login", "help", "support", "status",
];

pub const MIN_SUBDOMAIN_LEN: usize = 3;
pub const MAX_SUBDOMAIN_LEN: usize = 63;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum TenantPlan {
    Basic,
    Pro,
    Enterprise,
}

impl TenantPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "basic" => Some(Self::Basic),
            "pro" => Some(Self::Pro),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum SubscriptionStatus {
    Pending,
    Active,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
        }
    }
}

/// Tenant entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Tenant {
    pub id: String,
    pub subdomain: String,
    pub name: String,
    pub email: String,
    pub plan: TenantPlan,
    pub status: SubscriptionStatus,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    /// Free-form opening hours, e.g. `{"mon": "09:00-23:00"}`
    #[cfg_attr(feature = "db", sqlx(json))]
    pub operating_hours: serde_json::Value,
    pub qr_code_url: Option<String>,
    pub is_deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Profile / branding update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub operating_hours: Option<serde_json::Value>,
}

/// Link between an auth account and the tenant it administers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TenantUser {
    pub id: i64,
    pub tenant_id: String,
    pub account_id: String,
    pub email: String,
    pub role: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubdomainError {
    #[error("subdomain must be between {MIN_SUBDOMAIN_LEN} and {MAX_SUBDOMAIN_LEN} characters")]
    Length,
    #[error("subdomain may only contain lowercase letters, digits and '-'")]
    Charset,
    #[error("subdomain must not start or end with '-'")]
    Hyphen,
    #[error("subdomain '{0}' is reserved")]
    Reserved(String),
}

/// Check a subdomain against the naming rules (expects already-lowercased input)
pub fn validate_subdomain(subdomain: &str) -> Result<(), SubdomainError> {
    if !(MIN_SUBDOMAIN_LEN..=MAX_SUBDOMAIN_LEN).contains(&subdomain.len()) {
        return Err(SubdomainError::Length);
    }
    if !subdomain
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        return Err(SubdomainError::Charset);
    }
    if subdomain.starts_with('-') || subdomain.ends_with('-') {
        return Err(SubdomainError::Hyphen);
    }
    if RESERVED_SUBDOMAINS.contains(&subdomain) {
        return Err(SubdomainError::Reserved(subdomain.to_string()));
    }
    Ok(())
}

/// Trim + lowercase user input before validation/lookup
pub fn normalize_subdomain(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}
