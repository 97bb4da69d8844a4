//! Menu Item Model
//!
//! A menu item has exactly one pricing mode. Storage keeps one column per
//! mode field; [`Pricing`] is the in-memory sum type and [`PricingInput`]
//! is the form payload that gets validated into it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discriminator persisted in `menu_item.pricing_mode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PricingMode {
    Flat,
    LegacySizes,
    Variants,
}

impl PricingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::LegacySizes => "legacy_sizes",
            Self::Variants => "variants",
        }
    }
}

/// Named, priced size of an item in variants mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: i64,
    pub item_id: i64,
    pub name: String,
    pub price: Decimal,
    pub position: i32,
}

/// Variant as submitted by a form (no identity yet)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantInput {
    pub name: String,
    pub price: Decimal,
}

/// Item pricing. Exactly one mode by construction.
///
/// `V` is [`Variant`] for stored items and [`VariantInput`] for validated
/// form input that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Pricing<V = Variant> {
    Flat { price: Decimal },
    LegacySizes { medium: Decimal, grande: Decimal },
    Variants { variants: Vec<V> },
}

impl<V> Pricing<V> {
    pub fn mode(&self) -> PricingMode {
        match self {
            Self::Flat { .. } => PricingMode::Flat,
            Self::LegacySizes { .. } => PricingMode::LegacySizes,
            Self::Variants { .. } => PricingMode::Variants,
        }
    }
}

/// Validation failures for [`PricingInput`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingValidationError {
    #[error("a price is required")]
    Missing,
    #[error("only one pricing mode may be set (flat price, medium/grande sizes or variants)")]
    MultipleModes,
    #[error("both medium and grande prices are required")]
    IncompleteLegacySizes,
    #[error("{0} must not be negative")]
    NegativePrice(&'static str),
    #[error("variant name must not be empty")]
    EmptyVariantName,
}

impl PricingValidationError {
    /// Form field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing | Self::MultipleModes => "pricing",
            Self::IncompleteLegacySizes => "price_medium",
            Self::NegativePrice(field) => field,
            Self::EmptyVariantName => "variants",
        }
    }
}

/// Pricing form payload: nullable fields, at most one mode populated
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingInput {
    pub price: Option<Decimal>,
    pub price_medium: Option<Decimal>,
    pub price_grande: Option<Decimal>,
    #[serde(default)]
    pub variants: Vec<VariantInput>,
}

impl PricingInput {
    pub fn flat(price: Decimal) -> Self {
        Self {
            price: Some(price),
            ..Default::default()
        }
    }

    pub fn legacy_sizes(medium: Decimal, grande: Decimal) -> Self {
        Self {
            price_medium: Some(medium),
            price_grande: Some(grande),
            ..Default::default()
        }
    }

    pub fn variants(variants: Vec<VariantInput>) -> Self {
        Self {
            variants,
            ..Default::default()
        }
    }

    /// Validate into a [`Pricing`] value. An empty variant list counts as
    /// "variants not set".
    pub fn validate(self) -> Result<Pricing<VariantInput>, PricingValidationError> {
        let has_flat = self.price.is_some();
        let has_legacy = self.price_medium.is_some() || self.price_grande.is_some();
        let has_variants = !self.variants.is_empty();

        let populated = [has_flat, has_legacy, has_variants]
            .iter()
            .filter(|set| **set)
            .count();
        if populated > 1 {
            return Err(PricingValidationError::MultipleModes);
        }

        if let Some(price) = self.price {
            ensure_non_negative(price, "price")?;
            return Ok(Pricing::Flat { price });
        }

        if has_legacy {
            let (Some(medium), Some(grande)) = (self.price_medium, self.price_grande) else {
                return Err(PricingValidationError::IncompleteLegacySizes);
            };
            ensure_non_negative(medium, "price_medium")?;
            ensure_non_negative(grande, "price_grande")?;
            return Ok(Pricing::LegacySizes { medium, grande });
        }

        if has_variants {
            let mut variants = self.variants;
            for variant in &mut variants {
                variant.name = variant.name.trim().to_string();
                if variant.name.is_empty() {
                    return Err(PricingValidationError::EmptyVariantName);
                }
                ensure_non_negative(variant.price, "variants.price")?;
            }
            return Ok(Pricing::Variants { variants });
        }

        Err(PricingValidationError::Missing)
    }
}

fn ensure_non_negative(value: Decimal, field: &'static str) -> Result<(), PricingValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(PricingValidationError::NegativePrice(field));
    }
    Ok(())
}

/// Ingredient that a customer may be allowed to exclude
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Ingredient {
    pub id: i64,
    pub item_id: i64,
    pub name: String,
    pub can_exclude: bool,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientInput {
    pub name: String,
    #[serde(default = "default_true")]
    pub can_exclude: bool,
}

fn default_true() -> bool {
    true
}

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub tenant_id: String,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub position: i32,
    pub pricing: Pricing,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
    pub position: Option<i32>,
    pub pricing: PricingInput,
    #[serde(default)]
    pub ingredients: Vec<IngredientInput>,
    /// Modifier groups to bind, in display order
    #[serde(default)]
    pub modifier_group_ids: Vec<String>,
}

/// Update menu item payload. `pricing` and `ingredients` replace the
/// existing values wholesale when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    #[serde(default, with = "super::double_option")]
    pub description: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    #[serde(default, with = "super::double_option")]
    pub image_url: Option<Option<String>>,
    pub is_available: Option<bool>,
    pub position: Option<i32>,
    pub pricing: Option<PricingInput>,
    pub ingredients: Option<Vec<IngredientInput>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityUpdate {
    pub is_available: bool,
}

/// Trim, drop empties and deduplicate tags, keeping first-seen order
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(units: i64) -> Decimal {
        Decimal::new(units, 0)
    }

    #[test]
    fn flat_input_validates() {
        let pricing = PricingInput::flat(money(65)).validate().unwrap();
        assert_eq!(pricing, Pricing::Flat { price: money(65) });
        assert_eq!(pricing.mode(), PricingMode::Flat);
    }

    #[test]
    fn two_modes_are_rejected() {
        let input = PricingInput {
            price: Some(money(65)),
            price_medium: Some(money(70)),
            price_grande: Some(money(75)),
            variants: vec![],
        };
        assert_eq!(input.validate(), Err(PricingValidationError::MultipleModes));

        let input = PricingInput {
            price: Some(money(65)),
            variants: vec![VariantInput {
                name: "Medium".into(),
                price: money(80),
            }],
            ..Default::default()
        };
        assert_eq!(input.validate(), Err(PricingValidationError::MultipleModes));
    }

    #[test]
    fn half_legacy_pair_is_rejected() {
        let input = PricingInput {
            price_medium: Some(money(70)),
            ..Default::default()
        };
        assert_eq!(
            input.validate(),
            Err(PricingValidationError::IncompleteLegacySizes)
        );
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(
            PricingInput::default().validate(),
            Err(PricingValidationError::Missing)
        );
        assert_eq!(
            PricingInput::variants(vec![]).validate(),
            Err(PricingValidationError::Missing)
        );
    }

    #[test]
    fn negative_prices_are_rejected() {
        let err = PricingInput::flat(money(-1)).validate().unwrap_err();
        assert_eq!(err, PricingValidationError::NegativePrice("price"));
        assert_eq!(err.field(), "price");

        let err = PricingInput::variants(vec![VariantInput {
            name: "Grande".into(),
            price: money(-5),
        }])
        .validate()
        .unwrap_err();
        assert_eq!(err, PricingValidationError::NegativePrice("variants.price"));
    }

    #[test]
    fn variant_names_are_trimmed_and_required() {
        let pricing = PricingInput::variants(vec![VariantInput {
            name: "  Grande ".into(),
            price: money(85),
        }])
        .validate()
        .unwrap();
        match pricing {
            Pricing::Variants { variants } => assert_eq!(variants[0].name, "Grande"),
            other => panic!("unexpected pricing {other:?}"),
        }

        let err = PricingInput::variants(vec![VariantInput {
            name: " ".into(),
            price: money(1),
        }])
        .validate()
        .unwrap_err();
        assert_eq!(err, PricingValidationError::EmptyVariantName);
    }

    #[test]
    fn pricing_serializes_with_mode_tag() {
        let json = serde_json::to_value(Pricing::<Variant>::LegacySizes {
            medium: money(70),
            grande: money(75),
        })
        .unwrap();
        assert_eq!(json["mode"], "legacy_sizes");
        assert_eq!(json["medium"], 70.0);
    }

    #[test]
    fn tags_are_deduplicated() {
        let tags = normalize_tags(vec![
            "vegan".into(),
            " spicy ".into(),
            "vegan".into(),
            "".into(),
        ]);
        assert_eq!(tags, vec!["vegan".to_string(), "spicy".to_string()]);
    }
}
