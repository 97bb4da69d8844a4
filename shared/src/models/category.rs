//! Category Model

use serde::{Deserialize, Serialize};

/// Menu category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub tenant_id: String,
    pub name: String,
    pub icon: Option<String>,
    pub position: i32,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub icon: Option<String>,
    pub position: Option<i32>,
    pub is_active: Option<bool>,
}

/// Update category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    #[serde(default, with = "super::double_option")]
    pub icon: Option<Option<String>>,
    pub position: Option<i32>,
    pub is_active: Option<bool>,
}
