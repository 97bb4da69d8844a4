//! Menu Item Repository
//!
//! Items own their variants and ingredients; both are replaced wholesale
//! (delete + reinsert with fresh ids) inside the item's write transaction.

use std::collections::HashMap;

use super::{RepoError, RepoResult, binding, require_name};
use shared::error::ErrorCode;
use shared::models::{
    Ingredient, IngredientInput, MenuItem, MenuItemCreate, MenuItemUpdate, Pricing, PricingMode,
    Variant, VariantInput, normalize_tags,
};
use shared::util::{to_decimal, to_f64};
use sqlx::{SqliteConnection, SqlitePool};

const ITEM_COLUMNS: &str = "id, tenant_id, category_id, name, description, tags, image_url, \
     is_available, position, pricing_mode, price, price_medium, price_grande, \
     created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct MenuItemRow {
    id: i64,
    tenant_id: String,
    category_id: i64,
    name: String,
    description: Option<String>,
    tags: String,
    image_url: Option<String>,
    is_available: bool,
    position: i32,
    pricing_mode: PricingMode,
    price: Option<f64>,
    price_medium: Option<f64>,
    price_grande: Option<f64>,
    created_at: i64,
    updated_at: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    id: i64,
    item_id: i64,
    name: String,
    price: f64,
    position: i32,
}

impl From<VariantRow> for Variant {
    fn from(row: VariantRow) -> Self {
        Variant {
            id: row.id,
            item_id: row.item_id,
            name: row.name,
            price: to_decimal(row.price),
            position: row.position,
        }
    }
}

impl MenuItemRow {
    fn into_item(self, variants: Vec<Variant>) -> RepoResult<MenuItem> {
        let invalid = |detail: &str| RepoError::InvalidPricingState {
            field: None,
            message: format!("Menu item {} has inconsistent pricing: {detail}", self.id),
        };

        let pricing = match self.pricing_mode {
            PricingMode::Flat => match (self.price, self.price_medium, self.price_grande) {
                (Some(price), None, None) if variants.is_empty() => Pricing::Flat {
                    price: to_decimal(price),
                },
                _ => return Err(invalid("flat mode needs exactly one price")),
            },
            PricingMode::LegacySizes => match (self.price, self.price_medium, self.price_grande) {
                (None, Some(medium), Some(grande)) if variants.is_empty() => {
                    Pricing::LegacySizes {
                        medium: to_decimal(medium),
                        grande: to_decimal(grande),
                    }
                }
                _ => return Err(invalid("legacy sizes need medium and grande only")),
            },
            PricingMode::Variants => {
                if variants.is_empty()
                    || self.price.is_some()
                    || self.price_medium.is_some()
                    || self.price_grande.is_some()
                {
                    return Err(invalid("variants mode needs variants and no fixed prices"));
                }
                Pricing::Variants { variants }
            }
        };

        let tags: Vec<String> = serde_json::from_str(&self.tags)
            .map_err(|e| RepoError::Database(format!("Invalid tags on item {}: {e}", self.id)))?;

        Ok(MenuItem {
            id: self.id,
            tenant_id: self.tenant_id,
            category_id: self.category_id,
            name: self.name,
            description: self.description,
            tags,
            image_url: self.image_url,
            is_available: self.is_available,
            position: self.position,
            pricing,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn not_found(id: i64) -> RepoError {
    RepoError::not_found(ErrorCode::MenuItemNotFound, format!("Menu item {id} not found"))
}

fn category_not_found(id: i64) -> RepoError {
    RepoError::not_found(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
}

/// (mode, price, price_medium, price_grande) with only the active mode's columns set
fn pricing_columns<V>(
    pricing: &Pricing<V>,
) -> (PricingMode, Option<f64>, Option<f64>, Option<f64>) {
    match pricing {
        Pricing::Flat { price } => (PricingMode::Flat, Some(to_f64(*price)), None, None),
        Pricing::LegacySizes { medium, grande } => (
            PricingMode::LegacySizes,
            None,
            Some(to_f64(*medium)),
            Some(to_f64(*grande)),
        ),
        Pricing::Variants { .. } => (PricingMode::Variants, None, None, None),
    }
}

// ── Reads ──

/// Variants of the tenant's items, grouped by item, in position order
async fn variants_by_item(
    pool: &SqlitePool,
    tenant_id: &str,
    item_id: Option<i64>,
) -> RepoResult<HashMap<i64, Vec<Variant>>> {
    let rows = sqlx::query_as::<_, VariantRow>(
        "SELECT id, item_id, name, price, position FROM menu_item_variant \
         WHERE tenant_id = ? AND (? IS NULL OR item_id = ?) \
         ORDER BY item_id, position, id",
    )
    .bind(tenant_id)
    .bind(item_id)
    .bind(item_id)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<i64, Vec<Variant>> = HashMap::new();
    for row in rows {
        grouped.entry(row.item_id).or_default().push(row.into());
    }
    Ok(grouped)
}

/// Items ordered by position, optionally limited to one category
pub async fn list(
    pool: &SqlitePool,
    tenant_id: &str,
    category_id: Option<i64>,
) -> RepoResult<Vec<MenuItem>> {
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM menu_item \
         WHERE tenant_id = ? AND (? IS NULL OR category_id = ?) \
         ORDER BY position, created_at, id"
    );
    let rows = sqlx::query_as::<_, MenuItemRow>(&sql)
        .bind(tenant_id)
        .bind(category_id)
        .bind(category_id)
        .fetch_all(pool)
        .await?;

    let mut variants = variants_by_item(pool, tenant_id, None).await?;
    rows.into_iter()
        .map(|row| {
            let item_variants = variants.remove(&row.id).unwrap_or_default();
            row.into_item(item_variants)
        })
        .collect()
}

pub async fn find_by_id(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<MenuItem>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM menu_item WHERE id = ? AND tenant_id = ?");
    let Some(row) = sqlx::query_as::<_, MenuItemRow>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };
    let variants = variants_by_item(pool, tenant_id, Some(id))
        .await?
        .remove(&id)
        .unwrap_or_default();
    row.into_item(variants).map(Some)
}

pub async fn get(pool: &SqlitePool, tenant_id: &str, id: i64) -> RepoResult<MenuItem> {
    find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Ingredients of the tenant's items (or one item), grouped by item
pub async fn ingredients_by_item(
    pool: &SqlitePool,
    tenant_id: &str,
    item_id: Option<i64>,
) -> RepoResult<HashMap<i64, Vec<Ingredient>>> {
    let rows = sqlx::query_as::<_, Ingredient>(
        "SELECT id, item_id, name, can_exclude, position FROM menu_item_ingredient \
         WHERE tenant_id = ? AND (? IS NULL OR item_id = ?) \
         ORDER BY item_id, position, id",
    )
    .bind(tenant_id)
    .bind(item_id)
    .bind(item_id)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<i64, Vec<Ingredient>> = HashMap::new();
    for row in rows {
        grouped.entry(row.item_id).or_default().push(row);
    }
    Ok(grouped)
}

// ── Writes ──

async fn ensure_category(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    category_id: i64,
) -> RepoResult<()> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM category WHERE id = ? AND tenant_id = ?")
            .bind(category_id)
            .bind(tenant_id)
            .fetch_optional(&mut *conn)
            .await?;
    found.map(|_| ()).ok_or_else(|| category_not_found(category_id))
}

async fn replace_variants(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    item_id: i64,
    variants: &[VariantInput],
) -> RepoResult<()> {
    sqlx::query("DELETE FROM menu_item_variant WHERE item_id = ? AND tenant_id = ?")
        .bind(item_id)
        .bind(tenant_id)
        .execute(&mut *conn)
        .await?;
    for (position, variant) in variants.iter().enumerate() {
        sqlx::query(
            "INSERT INTO menu_item_variant (id, item_id, tenant_id, name, price, position) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(shared::util::snowflake_id())
        .bind(item_id)
        .bind(tenant_id)
        .bind(&variant.name)
        .bind(to_f64(variant.price))
        .bind(position as i32)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn replace_ingredients(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    item_id: i64,
    ingredients: &[IngredientInput],
) -> RepoResult<()> {
    sqlx::query("DELETE FROM menu_item_ingredient WHERE item_id = ? AND tenant_id = ?")
        .bind(item_id)
        .bind(tenant_id)
        .execute(&mut *conn)
        .await?;
    for (position, ingredient) in ingredients.iter().enumerate() {
        let name = require_name(&ingredient.name, "Ingredient")?;
        sqlx::query(
            "INSERT INTO menu_item_ingredient \
                (id, item_id, tenant_id, name, can_exclude, position) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(shared::util::snowflake_id())
        .bind(item_id)
        .bind(tenant_id)
        .bind(name)
        .bind(ingredient.can_exclude)
        .bind(position as i32)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Write the pricing columns of an item and replace its variants
async fn write_pricing(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    item_id: i64,
    pricing: &Pricing<VariantInput>,
) -> RepoResult<()> {
    let (mode, price, medium, grande) = pricing_columns(pricing);
    sqlx::query(
        "UPDATE menu_item SET pricing_mode = ?, price = ?, price_medium = ?, price_grande = ? \
         WHERE id = ? AND tenant_id = ?",
    )
    .bind(mode)
    .bind(price)
    .bind(medium)
    .bind(grande)
    .bind(item_id)
    .bind(tenant_id)
    .execute(&mut *conn)
    .await?;

    let variants: &[VariantInput] = match pricing {
        Pricing::Variants { variants } => variants,
        _ => &[],
    };
    replace_variants(conn, tenant_id, item_id, variants).await
}

/// Create an item with its variants, ingredients and modifier bindings in
/// one transaction
pub async fn create(
    pool: &SqlitePool,
    tenant_id: &str,
    data: MenuItemCreate,
) -> RepoResult<MenuItem> {
    let name = require_name(&data.name, "Menu item")?;
    let pricing = data.pricing.validate()?;
    let tags = serde_json::to_string(&normalize_tags(data.tags))
        .map_err(|e| RepoError::Validation(format!("Invalid tags: {e}")))?;
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let (mode, price, medium, grande) = pricing_columns(&pricing);

    let mut tx = pool.begin().await?;
    ensure_category(&mut tx, tenant_id, data.category_id).await?;

    sqlx::query(
        "INSERT INTO menu_item (id, tenant_id, category_id, name, description, tags, image_url, \
            is_available, position, pricing_mode, price, price_medium, price_grande, \
            created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, \
            COALESCE(?9, (SELECT COALESCE(MAX(position), -1) + 1 FROM menu_item \
                          WHERE tenant_id = ?2 AND category_id = ?3)), \
            ?10, ?11, ?12, ?13, ?14, ?14)",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(data.category_id)
    .bind(&name)
    .bind(&data.description)
    .bind(&tags)
    .bind(&data.image_url)
    .bind(data.is_available.unwrap_or(true))
    .bind(data.position)
    .bind(mode)
    .bind(price)
    .bind(medium)
    .bind(grande)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    if let Pricing::Variants { variants } = &pricing {
        replace_variants(&mut tx, tenant_id, id, variants).await?;
    }
    replace_ingredients(&mut tx, tenant_id, id, &data.ingredients).await?;
    if !data.modifier_group_ids.is_empty() {
        binding::replace_bindings(&mut tx, tenant_id, id, &data.modifier_group_ids).await?;
    }

    tx.commit().await?;
    tracing::debug!(
        tenant_id = %tenant_id,
        item_id = id,
        mode = mode.as_str(),
        "Menu item created"
    );
    get(pool, tenant_id, id).await
}

/// Update an item. `pricing` and `ingredients` replace the current values
/// when present; everything runs in one transaction.
pub async fn update(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    data: MenuItemUpdate,
) -> RepoResult<MenuItem> {
    let name = data
        .name
        .as_deref()
        .map(|n| require_name(n, "Menu item"))
        .transpose()?;
    let pricing = data.pricing.map(|p| p.validate()).transpose()?;
    let tags = data
        .tags
        .map(|t| serde_json::to_string(&normalize_tags(t)))
        .transpose()
        .map_err(|e| RepoError::Validation(format!("Invalid tags: {e}")))?;

    let mut tx = pool.begin().await?;
    if let Some(category_id) = data.category_id {
        ensure_category(&mut tx, tenant_id, category_id).await?;
    }

    // Nullable fields: explicit `null` clears, an absent key keeps
    let rows = sqlx::query(
        "UPDATE menu_item SET \
            category_id = COALESCE(?1, category_id), \
            name = COALESCE(?2, name), \
            description = CASE WHEN ?3 THEN ?4 ELSE description END, \
            tags = COALESCE(?5, tags), \
            image_url = CASE WHEN ?6 THEN ?7 ELSE image_url END, \
            is_available = COALESCE(?8, is_available), \
            position = COALESCE(?9, position), \
            updated_at = ?10 \
         WHERE id = ?11 AND tenant_id = ?12",
    )
    .bind(data.category_id)
    .bind(name)
    .bind(data.description.is_some())
    .bind(data.description.flatten())
    .bind(tags)
    .bind(data.image_url.is_some())
    .bind(data.image_url.flatten())
    .bind(data.is_available)
    .bind(data.position)
    .bind(shared::util::now_millis())
    .bind(id)
    .bind(tenant_id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }

    if let Some(pricing) = &pricing {
        write_pricing(&mut tx, tenant_id, id, pricing).await?;
    }
    if let Some(ingredients) = &data.ingredients {
        replace_ingredients(&mut tx, tenant_id, id, ingredients).await?;
    }

    tx.commit().await?;
    get(pool, tenant_id, id).await
}

pub async fn set_availability(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    is_available: bool,
) -> RepoResult<MenuItem> {
    let rows = sqlx::query(
        "UPDATE menu_item SET is_available = ?, updated_at = ? WHERE id = ? AND tenant_id = ?",
    )
    .bind(is_available)
    .bind(shared::util::now_millis())
    .bind(id)
    .bind(tenant_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    get(pool, tenant_id, id).await
}

/// Delete an item and everything it owns
pub async fn delete(pool: &SqlitePool, tenant_id: &str, id: i64) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    for table in [
        "menu_item_disabled_option",
        "menu_item_modifier_group",
        "menu_item_variant",
        "menu_item_ingredient",
    ] {
        let sql = format!("DELETE FROM {table} WHERE item_id = ? AND tenant_id = ?");
        sqlx::query(&sql)
            .bind(id)
            .bind(tenant_id)
            .execute(&mut *tx)
            .await?;
    }
    let rows = sqlx::query("DELETE FROM menu_item WHERE id = ? AND tenant_id = ?")
        .bind(id)
        .bind(tenant_id)
        .execute(&mut *tx)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    tx.commit().await?;
    Ok(())
}

/// Rewrite positions so that `ids[i]` gets position `i`
pub async fn reorder(pool: &SqlitePool, tenant_id: &str, ids: &[i64]) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    let now = shared::util::now_millis();
    for (position, id) in ids.iter().enumerate() {
        let rows = sqlx::query(
            "UPDATE menu_item SET position = ?, updated_at = ? WHERE id = ? AND tenant_id = ?",
        )
        .bind(position as i32)
        .bind(now)
        .bind(id)
        .bind(tenant_id)
        .execute(&mut *tx)
        .await?;
        if rows.rows_affected() == 0 {
            return Err(not_found(*id));
        }
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::repository::category;
    use crate::db::repository::test_support::{pool, seed_tenant};
    use rust_decimal::Decimal;
    use shared::models::{CategoryCreate, PricingInput};

    pub(crate) async fn seed_category(pool: &SqlitePool, tenant_id: &str, name: &str) -> i64 {
        category::create(
            pool,
            tenant_id,
            CategoryCreate {
                name: name.to_string(),
                icon: None,
                position: None,
                is_active: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    pub(crate) fn item_payload(
        category_id: i64,
        name: &str,
        pricing: PricingInput,
    ) -> MenuItemCreate {
        MenuItemCreate {
            category_id,
            name: name.to_string(),
            description: None,
            tags: vec![],
            image_url: None,
            is_available: None,
            position: None,
            pricing,
            ingredients: vec![],
            modifier_group_ids: vec![],
        }
    }

    fn money(units: i64) -> Decimal {
        Decimal::new(units, 0)
    }

    #[tokio::test]
    async fn flat_item_round_trips_pricing() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let category_id = seed_category(&pool, &tenant, "Cafés").await;

        let mut payload = item_payload(category_id, "Latte", PricingInput::flat(money(65)));
        payload.tags = vec!["hot".into(), "hot".into(), " milk ".into()];
        let item = create(&pool, &tenant, payload).await.unwrap();

        assert_eq!(item.pricing, Pricing::Flat { price: money(65) });
        assert_eq!(item.tags, vec!["hot".to_string(), "milk".to_string()]);
        assert!(item.is_available);
    }

    #[tokio::test]
    async fn two_pricing_modes_never_reach_the_table() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let category_id = seed_category(&pool, &tenant, "Cafés").await;

        let pricing = PricingInput {
            price: Some(money(65)),
            price_medium: Some(money(70)),
            price_grande: Some(money(75)),
            variants: vec![],
        };
        let err = create(&pool, &tenant, item_payload(category_id, "Latte", pricing))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::InvalidPricingState { .. }));
        assert!(list(&pool, &tenant, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn switching_modes_clears_other_columns() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let category_id = seed_category(&pool, &tenant, "Cafés").await;

        let variants = PricingInput::variants(vec![
            VariantInput {
                name: "Medium".into(),
                price: money(80),
            },
            VariantInput {
                name: "Grande".into(),
                price: money(85),
            },
        ]);
        let item = create(&pool, &tenant, item_payload(category_id, "Mocha", variants))
            .await
            .unwrap();
        let Pricing::Variants { variants } = &item.pricing else {
            panic!("expected variants, got {:?}", item.pricing);
        };
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[1].name, "Grande");

        let item = update(
            &pool,
            &tenant,
            item.id,
            MenuItemUpdate {
                pricing: Some(PricingInput::legacy_sizes(money(70), money(75))),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(
            item.pricing,
            Pricing::LegacySizes {
                medium: money(70),
                grande: money(75)
            }
        );

        let (price, variant_count): (Option<f64>, i64) = sqlx::query_as(
            "SELECT price, (SELECT COUNT(*) FROM menu_item_variant WHERE item_id = menu_item.id) \
             FROM menu_item WHERE id = ?",
        )
        .bind(item.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(price, None);
        assert_eq!(variant_count, 0);
    }

    #[tokio::test]
    async fn variant_replace_issues_fresh_ids() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let category_id = seed_category(&pool, &tenant, "Cafés").await;
        let input = || {
            PricingInput::variants(vec![VariantInput {
                name: "Medium".into(),
                price: money(80),
            }])
        };

        let item = create(&pool, &tenant, item_payload(category_id, "Mocha", input()))
            .await
            .unwrap();
        let updated = update(
            &pool,
            &tenant,
            item.id,
            MenuItemUpdate {
                pricing: Some(input()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let (Pricing::Variants { variants: before }, Pricing::Variants { variants: after }) =
            (&item.pricing, &updated.pricing)
        else {
            panic!("expected variants pricing");
        };
        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 1);
        assert_ne!(before[0].id, after[0].id);
    }

    #[tokio::test]
    async fn inconsistent_row_is_reported() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let category_id = seed_category(&pool, &tenant, "Cafés").await;
        let item = create(
            &pool,
            &tenant,
            item_payload(category_id, "Latte", PricingInput::flat(money(65))),
        )
        .await
        .unwrap();

        sqlx::query("UPDATE menu_item SET price_medium = 70 WHERE id = ?")
            .bind(item.id)
            .execute(&pool)
            .await
            .unwrap();

        let err = get(&pool, &tenant, item.id).await.unwrap_err();
        assert!(matches!(err, RepoError::InvalidPricingState { .. }));
    }

    #[tokio::test]
    async fn ingredients_are_replaced_in_order() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let category_id = seed_category(&pool, &tenant, "Bocadillos").await;

        let mut payload = item_payload(category_id, "Mixto", PricingInput::flat(money(5)));
        payload.ingredients = vec![
            IngredientInput {
                name: "Jamón".into(),
                can_exclude: false,
            },
            IngredientInput {
                name: "Queso".into(),
                can_exclude: true,
            },
        ];
        let item = create(&pool, &tenant, payload).await.unwrap();

        update(
            &pool,
            &tenant,
            item.id,
            MenuItemUpdate {
                ingredients: Some(vec![IngredientInput {
                    name: "Tomate".into(),
                    can_exclude: true,
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let ingredients = ingredients_by_item(&pool, &tenant, Some(item.id))
            .await
            .unwrap()
            .remove(&item.id)
            .unwrap();
        assert_eq!(ingredients.len(), 1);
        assert_eq!(ingredients[0].name, "Tomate");
    }

    #[tokio::test]
    async fn photo_and_description_can_be_removed() {
        let pool = pool().await;
        let tenant = seed_tenant(&pool, "cafe-luna").await;
        let category_id = seed_category(&pool, &tenant, "Cafés").await;
        let mut payload = item_payload(category_id, "Latte", PricingInput::flat(money(65)));
        payload.description = Some("Con leche".into());
        payload.image_url = Some("http://localhost/uploads/t/items/a.jpg".into());
        let item = create(&pool, &tenant, payload).await.unwrap();

        let renamed = update(
            &pool,
            &tenant,
            item.id,
            MenuItemUpdate {
                name: Some("Café Latte".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.description.as_deref(), Some("Con leche"));
        assert!(renamed.image_url.is_some());

        let cleared = update(
            &pool,
            &tenant,
            item.id,
            MenuItemUpdate {
                image_url: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(cleared.image_url, None);
        assert_eq!(cleared.description.as_deref(), Some("Con leche"));
    }

    #[tokio::test]
    async fn foreign_item_is_not_found_and_untouched() {
        let pool = pool().await;
        let tenant_a = seed_tenant(&pool, "tenant-a").await;
        let tenant_b = seed_tenant(&pool, "tenant-b").await;
        let b_category = seed_category(&pool, &tenant_b, "B").await;
        let b_item = create(
            &pool,
            &tenant_b,
            item_payload(b_category, "Secret", PricingInput::flat(money(9))),
        )
        .await
        .unwrap();

        assert!(find_by_id(&pool, &tenant_a, b_item.id).await.unwrap().is_none());
        let err = update(
            &pool,
            &tenant_a,
            b_item.id,
            MenuItemUpdate {
                name: Some("Mine now".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            RepoError::NotFound {
                code: ErrorCode::MenuItemNotFound,
                ..
            }
        ));
        assert!(matches!(
            delete(&pool, &tenant_a, b_item.id).await,
            Err(RepoError::NotFound { .. })
        ));
        assert!(matches!(
            set_availability(&pool, &tenant_a, b_item.id, false).await,
            Err(RepoError::NotFound { .. })
        ));

        let still = get(&pool, &tenant_b, b_item.id).await.unwrap();
        assert_eq!(still.name, "Secret");
        assert!(still.is_available);
    }

    #[tokio::test]
    async fn item_cannot_point_at_foreign_category() {
        let pool = pool().await;
        let tenant_a = seed_tenant(&pool, "tenant-a").await;
        let tenant_b = seed_tenant(&pool, "tenant-b").await;
        let b_category = seed_category(&pool, &tenant_b, "B").await;

        let err = create(
            &pool,
            &tenant_a,
            item_payload(b_category, "Sneaky", PricingInput::flat(money(1))),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            RepoError::NotFound {
                code: ErrorCode::CategoryNotFound,
                ..
            }
        ));
    }
}
