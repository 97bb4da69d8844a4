use crate::models::{BoundModifierGroup, Pricing};
use crate::util::round_money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Size / variant picked by the customer. Ignored for flat pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeChoice {
    Medium,
    Grande,
    Variant(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// The pricing mode cannot produce a base price for this choice
    #[error("invalid pricing state: {0}")]
    InvalidPricingState(String),
    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

/// Priced order line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePrice {
    pub base_price: Decimal,
    /// Sum of the selected option deltas (may be negative)
    pub surcharge: Decimal,
    /// `max(0, base_price + surcharge)`
    pub unit_price: Decimal,
    pub quantity: u32,
    /// `unit_price * quantity`
    pub total_price: Decimal,
}

/// Compose the price of `quantity` units of an item.
///
/// `groups` are the item's bound groups as assembled, so they only carry the
/// options enabled for the item. Selected ids outside those options add
/// nothing. A repeated id is charged once per occurrence.
pub fn compose(
    pricing: &Pricing,
    groups: &[BoundModifierGroup],
    choice: Option<SizeChoice>,
    selected_option_ids: &[i64],
    quantity: u32,
) -> Result<LinePrice, PricingError> {
    if quantity == 0 {
        return Err(PricingError::InvalidQuantity);
    }

    let base_price = resolve_base_price(pricing, choice)?;

    let deltas: HashMap<i64, Decimal> = groups
        .iter()
        .flat_map(|group| group.options.iter())
        .map(|option| (option.id, option.price_modifier))
        .collect();
    let surcharge: Decimal = selected_option_ids
        .iter()
        .filter_map(|id| deltas.get(id))
        .sum();

    let unit_price = round_money((base_price + surcharge).max(Decimal::ZERO));
    let total_price = round_money(unit_price * Decimal::from(quantity));

    Ok(LinePrice {
        base_price,
        surcharge,
        unit_price,
        quantity,
        total_price,
    })
}

fn resolve_base_price(
    pricing: &Pricing,
    choice: Option<SizeChoice>,
) -> Result<Decimal, PricingError> {
    match (pricing, choice) {
        (Pricing::Flat { price }, _) => Ok(*price),
        (Pricing::LegacySizes { medium, .. }, Some(SizeChoice::Medium)) => Ok(*medium),
        (Pricing::LegacySizes { grande, .. }, Some(SizeChoice::Grande)) => Ok(*grande),
        (Pricing::LegacySizes { .. }, other) => Err(PricingError::InvalidPricingState(format!(
            "legacy sizes pricing needs medium or grande, got {other:?}"
        ))),
        (Pricing::Variants { variants }, _) if variants.is_empty() => Err(
            PricingError::InvalidPricingState("variants pricing has no variants".to_string()),
        ),
        (Pricing::Variants { variants }, Some(SizeChoice::Variant(id))) => variants
            .iter()
            .find(|v| v.id == id)
            .map(|v| v.price)
            .ok_or_else(|| PricingError::InvalidPricingState(format!("unknown variant {id}"))),
        (Pricing::Variants { .. }, other) => Err(PricingError::InvalidPricingState(format!(
            "variants pricing needs a variant id, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModifierGroupType, ModifierOption, Variant};

    fn money(units: i64) -> Decimal {
        Decimal::new(units, 0)
    }

    fn option(id: i64, group_id: &str, label: &str, delta: Decimal) -> ModifierOption {
        ModifierOption {
            id,
            group_id: group_id.to_string(),
            label: label.to_string(),
            price_modifier: delta,
            is_default: false,
            position: 0,
        }
    }

    fn group(
        id: &str,
        group_type: ModifierGroupType,
        options: Vec<ModifierOption>,
    ) -> BoundModifierGroup {
        BoundModifierGroup {
            id: id.to_string(),
            name: id.to_string(),
            group_type,
            required: false,
            min_selections: 0,
            max_selections: None,
            position: 0,
            options,
        }
    }

    fn milk() -> BoundModifierGroup {
        group(
            "milk",
            ModifierGroupType::Single,
            vec![
                option(1, "milk", "Regular", money(0)),
                option(2, "milk", "Almond", money(3)),
            ],
        )
    }

    fn extras() -> BoundModifierGroup {
        group(
            "extras",
            ModifierGroupType::Multiple,
            vec![
                option(10, "extras", "Shot", Decimal::new(150, 2)),
                option(11, "extras", "Syrup", Decimal::new(75, 2)),
                option(12, "extras", "No cup", money(-1)),
            ],
        )
    }

    fn variant(id: i64, name: &str, price: Decimal) -> Variant {
        Variant {
            id,
            item_id: 1,
            name: name.to_string(),
            price,
            position: 0,
        }
    }

    #[test]
    fn flat_item_with_almond_milk() {
        let pricing = Pricing::Flat { price: money(65) };
        let line = compose(&pricing, &[milk()], None, &[2], 2).unwrap();
        assert_eq!(line.base_price, money(65));
        assert_eq!(line.surcharge, money(3));
        assert_eq!(line.unit_price, money(68));
        assert_eq!(line.total_price, money(136));
    }

    #[test]
    fn variants_item_picks_grande() {
        let pricing = Pricing::Variants {
            variants: vec![variant(7, "Medium", money(80)), variant(8, "Grande", money(85))],
        };
        let line = compose(&pricing, &[], Some(SizeChoice::Variant(8)), &[], 1).unwrap();
        assert_eq!(line.unit_price, money(85));
        assert_eq!(line.total_price, money(85));
    }

    #[test]
    fn legacy_sizes_resolve_by_choice() {
        let pricing = Pricing::LegacySizes {
            medium: money(70),
            grande: money(75),
        };
        let medium = compose(&pricing, &[], Some(SizeChoice::Medium), &[], 1).unwrap();
        let grande = compose(&pricing, &[], Some(SizeChoice::Grande), &[], 1).unwrap();
        assert_eq!(medium.base_price, money(70));
        assert_eq!(grande.base_price, money(75));
    }

    #[test]
    fn flat_pricing_ignores_size_choice() {
        let pricing = Pricing::Flat { price: money(10) };
        let line = compose(&pricing, &[], Some(SizeChoice::Grande), &[], 1).unwrap();
        assert_eq!(line.base_price, money(10));
    }

    #[test]
    fn each_mode_rejects_a_choice_of_the_wrong_kind() {
        let legacy = Pricing::LegacySizes {
            medium: money(70),
            grande: money(75),
        };
        let variants = Pricing::Variants {
            variants: vec![variant(7, "Medium", money(80))],
        };

        for (pricing, choice) in [
            (&legacy, None),
            (&legacy, Some(SizeChoice::Variant(7))),
            (&variants, None),
            (&variants, Some(SizeChoice::Medium)),
            (&variants, Some(SizeChoice::Variant(99))),
        ] {
            let err = compose(pricing, &[], choice, &[], 1).unwrap_err();
            assert!(
                matches!(err, PricingError::InvalidPricingState(_)),
                "{choice:?} should be rejected"
            );
        }
    }

    #[test]
    fn empty_variant_list_is_an_invalid_state() {
        let pricing = Pricing::Variants { variants: vec![] };
        let err = compose(&pricing, &[], Some(SizeChoice::Variant(1)), &[], 1).unwrap_err();
        assert!(matches!(err, PricingError::InvalidPricingState(_)));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let pricing = Pricing::Flat { price: money(5) };
        assert_eq!(
            compose(&pricing, &[], None, &[], 0),
            Err(PricingError::InvalidQuantity)
        );
    }

    #[test]
    fn surcharge_is_additive_and_order_independent() {
        let pricing = Pricing::Flat { price: money(4) };
        let groups = [milk(), extras()];
        let forward = compose(&pricing, &groups, None, &[2, 10, 11], 1).unwrap();
        let reversed = compose(&pricing, &groups, None, &[11, 10, 2], 1).unwrap();

        // 3 + 1.50 + 0.75
        assert_eq!(forward.surcharge, Decimal::new(525, 2));
        assert_eq!(forward.unit_price, Decimal::new(925, 2));
        assert_eq!(forward, reversed);
    }

    #[test]
    fn repeated_option_is_charged_per_occurrence() {
        let pricing = Pricing::Flat { price: money(4) };
        let line = compose(&pricing, &[extras()], None, &[10, 10], 1).unwrap();
        assert_eq!(line.surcharge, money(3));
    }

    #[test]
    fn unbound_option_contributes_nothing() {
        let pricing = Pricing::Flat { price: money(65) };
        let with_unknown = compose(&pricing, &[milk()], None, &[2, 999], 1).unwrap();
        let without = compose(&pricing, &[milk()], None, &[2], 1).unwrap();
        assert_eq!(with_unknown, without);

        // option of a group the item is not bound to
        let extras_option = compose(&pricing, &[milk()], None, &[10], 1).unwrap();
        assert_eq!(extras_option.surcharge, Decimal::ZERO);
    }

    #[test]
    fn negative_surcharge_clamps_per_unit() {
        let pricing = Pricing::Flat {
            price: Decimal::new(50, 2),
        };
        let line = compose(&pricing, &[extras()], None, &[12], 3).unwrap();
        assert_eq!(line.surcharge, money(-1));
        assert_eq!(line.unit_price, Decimal::ZERO);
        assert_eq!(line.total_price, Decimal::ZERO);
    }

    #[test]
    fn totals_are_never_negative() {
        let pricing = Pricing::Flat { price: money(2) };
        let groups = [extras()];
        for selection in [vec![], vec![12], vec![12, 12], vec![12, 12, 12, 10]] {
            for quantity in [1, 2, 7] {
                let line = compose(&pricing, &groups, None, &selection, quantity).unwrap();
                assert!(line.unit_price >= Decimal::ZERO);
                assert!(line.total_price >= Decimal::ZERO);
                assert_eq!(line.total_price, line.unit_price * Decimal::from(quantity));
            }
        }
    }

    #[test]
    fn prices_round_to_cents() {
        let pricing = Pricing::Flat {
            price: Decimal::new(3333, 3),
        };
        let line = compose(&pricing, &[], None, &[], 3).unwrap();
        assert_eq!(line.unit_price, Decimal::new(333, 2));
        assert_eq!(line.total_price, Decimal::new(999, 2));
    }
}
