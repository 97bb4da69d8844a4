//! Restaurant Settings Model

use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "EUR";
pub const DEFAULT_LANGUAGE: &str = "es";
pub const DEFAULT_TIMEZONE: &str = "Europe/Madrid";

/// Per-tenant settings (singleton per tenant)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RestaurantSettings {
    pub tenant_id: String,
    pub currency: String,
    pub language: String,
    pub timezone: String,
    pub show_prices: bool,
    pub ordering_enabled: bool,
    pub updated_at: i64,
}

/// Update settings payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub currency: Option<String>,
    pub language: Option<String>,
    pub timezone: Option<String>,
    pub show_prices: Option<bool>,
    pub ordering_enabled: Option<bool>,
}
