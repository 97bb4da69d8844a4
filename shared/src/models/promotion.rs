//! Promotional Image Model

use serde::{Deserialize, Serialize};

/// Ordered, optionally scheduled promotional banner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PromotionalImage {
    pub id: i64,
    pub tenant_id: String,
    pub image_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub position: i32,
    pub is_active: bool,
    /// Unix millis; `None` = no lower bound
    pub starts_at: Option<i64>,
    /// Unix millis; `None` = no upper bound
    pub ends_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl PromotionalImage {
    /// Active and inside its schedule window at `now` (millis)
    pub fn is_running_at(&self, now: i64) -> bool {
        self.is_active
            && self.starts_at.is_none_or(|start| start <= now)
            && self.ends_at.is_none_or(|end| now <= end)
    }
}

/// Create promotion payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionCreate {
    pub image_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub position: Option<i32>,
    pub is_active: Option<bool>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
}

/// Update promotion payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromotionUpdate {
    pub image_url: Option<String>,
    #[serde(default, with = "super::double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, with = "super::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "super::double_option")]
    pub link: Option<Option<String>>,
    pub position: Option<i32>,
    pub is_active: Option<bool>,
    #[serde(default, with = "super::double_option")]
    pub starts_at: Option<Option<i64>>,
    #[serde(default, with = "super::double_option")]
    pub ends_at: Option<Option<i64>>,
}
