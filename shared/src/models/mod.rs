//! Data models
//!
//! Shared between menu-cloud and any Rust client (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`;
//! money-bearing entities carry `Decimal` and are mapped from row structs
//! inside menu-cloud.
//! Entity IDs are snowflake `i64`; tenant and account IDs are UUID strings;
//! modifier group IDs are slugs.

pub mod category;
pub mod menu;
pub mod menu_item;
pub mod modifier;
pub mod promotion;
pub mod settings;
pub mod tenant;

// Re-exports
pub use category::*;
pub use menu::*;
pub use menu_item::*;
pub use modifier::*;
pub use promotion::*;
pub use settings::*;
pub use tenant::*;

use serde::{Deserialize, Serialize};

/// Reorder payload: ids in their new display order (position = index)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortOrderUpdate {
    pub ids: Vec<i64>,
}

/// Serde helper for `Option<Option<T>>` patch fields: an absent key is
/// `None`, an explicit `null` is `Some(None)`.
pub(crate) mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
