//! Menu assembly
//!
//! Builds the nested category → item → (ingredients, modifier groups) tree
//! from flat tenant-scoped reads. Every level is ordered by `position`, then
//! creation time and id.

use std::collections::{HashMap, HashSet};

use shared::error::ErrorCode;
use shared::models::{
    BoundModifierGroup, Ingredient, MenuCategory, MenuItem, MenuItemView, MenuView, ModifierGroup,
};
use sqlx::SqlitePool;

use crate::db::repository::binding::{self, BindingRow};
use crate::db::repository::{RepoError, RepoResult, category, menu_item, modifier};

/// Flat reads shared by whole-menu and single-item assembly
struct Lookup {
    ingredients: HashMap<i64, Vec<Ingredient>>,
    bindings: HashMap<i64, Vec<BindingRow>>,
    disabled: HashMap<i64, HashSet<i64>>,
    groups: HashMap<String, ModifierGroup>,
}

impl Lookup {
    async fn load(pool: &SqlitePool, tenant_id: &str, item_id: Option<i64>) -> RepoResult<Self> {
        let ingredients = menu_item::ingredients_by_item(pool, tenant_id, item_id).await?;
        let mut bindings: HashMap<i64, Vec<BindingRow>> = HashMap::new();
        for row in binding::bindings(pool, tenant_id, item_id).await? {
            bindings.entry(row.item_id).or_default().push(row);
        }
        let disabled = binding::disabled_options(pool, tenant_id, item_id).await?;
        let groups = modifier::list(pool, tenant_id)
            .await?
            .into_iter()
            .map(|g| (g.id.clone(), g))
            .collect();
        Ok(Self {
            ingredients,
            bindings,
            disabled,
            groups,
        })
    }

    fn item_view(&mut self, item: MenuItem) -> MenuItemView {
        let ingredients = self.ingredients.remove(&item.id).unwrap_or_default();
        let rows = self.bindings.remove(&item.id).unwrap_or_default();
        let disabled = self.disabled.remove(&item.id).unwrap_or_default();

        let modifier_groups = rows
            .into_iter()
            .filter_map(|row| {
                let Some(group) = self.groups.get(&row.group_id) else {
                    tracing::debug!(
                        item_id = item.id,
                        group_id = %row.group_id,
                        "Skipping binding to missing modifier group"
                    );
                    return None;
                };
                Some(BoundModifierGroup {
                    id: group.id.clone(),
                    name: group.name.clone(),
                    group_type: group.group_type,
                    required: group.required,
                    min_selections: group.min_selections,
                    max_selections: group.max_selections,
                    position: row.position,
                    options: group
                        .options
                        .iter()
                        .filter(|o| !disabled.contains(&o.id))
                        .cloned()
                        .collect(),
                })
            })
            .collect();

        MenuItemView {
            item,
            ingredients,
            modifier_groups,
        }
    }
}

/// Assemble the tenant's menu.
///
/// `Public` drops inactive categories together with their items; `Admin`
/// returns everything. A `category_id` filter that matches nothing visible
/// is `CategoryNotFound`.
pub async fn assemble_menu(
    pool: &SqlitePool,
    tenant_id: &str,
    view: MenuView,
    category_id: Option<i64>,
) -> RepoResult<Vec<MenuCategory>> {
    let mut categories = category::list(pool, tenant_id, view == MenuView::Admin).await?;
    if let Some(id) = category_id {
        categories.retain(|c| c.id == id);
        if categories.is_empty() {
            return Err(RepoError::not_found(
                ErrorCode::CategoryNotFound,
                format!("Category {id} not found"),
            ));
        }
    }

    let items = menu_item::list(pool, tenant_id, category_id).await?;
    let mut lookup = Lookup::load(pool, tenant_id, None).await?;

    let mut by_category: HashMap<i64, Vec<MenuItemView>> = HashMap::new();
    for item in items {
        let category_id = item.category_id;
        by_category
            .entry(category_id)
            .or_default()
            .push(lookup.item_view(item));
    }

    Ok(categories
        .into_iter()
        .map(|category| MenuCategory {
            items: by_category.remove(&category.id).unwrap_or_default(),
            category,
        })
        .collect())
}

/// Assemble one item (admin view)
pub async fn assemble_item(
    pool: &SqlitePool,
    tenant_id: &str,
    item_id: i64,
) -> RepoResult<MenuItemView> {
    let item = menu_item::get(pool, tenant_id, item_id).await?;
    let mut lookup = Lookup::load(pool, tenant_id, Some(item_id)).await?;
    Ok(lookup.item_view(item))
}
