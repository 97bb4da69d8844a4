//! Assembled menu read models

use super::{BoundModifierGroup, Category, Ingredient, MenuItem};
use serde::{Deserialize, Serialize};

/// Which audience the menu is assembled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuView {
    /// Customer-facing: inactive categories (and their items) are hidden
    Public,
    /// Admin editor: everything
    Admin,
}

/// Menu item with its children resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemView {
    #[serde(flatten)]
    pub item: MenuItem,
    pub ingredients: Vec<Ingredient>,
    pub modifier_groups: Vec<BoundModifierGroup>,
}

/// Category node of the assembled menu tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCategory {
    #[serde(flatten)]
    pub category: Category,
    pub items: Vec<MenuItemView>,
}
