use std::sync::atomic::{AtomicI64, Ordering};

use rust_decimal::prelude::*;

/// Monetary values are kept at 2 decimal places, half away from zero
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random start, then a sequence within the millisecond
///
/// IDs are strictly increasing within the process, so rows inserted in a
/// tight loop never collide.
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF;
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x800);
    let candidate = (ts << 12) | rand_bits;
    let next = |last: i64| candidate.max(last + 1);
    match LAST_ID.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| Some(next(last))) {
        Ok(last) | Err(last) => next(last),
    }
}

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Convert a stored REAL to Decimal
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Lowercase ASCII slug: alphanumerics kept, everything else collapsed to `-`.
///
/// Non-ASCII letters are dropped (`"Leche Vegetal ñ"` → `"leche-vegetal"`).
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snowflake_ids_are_positive_and_js_safe() {
        for _ in 0..100 {
            let id = snowflake_id();
            assert!(id > 0);
            assert!(id < (1_i64 << 53));
        }
    }

    #[test]
    fn test_snowflake_ids_are_unique_in_a_burst() {
        let ids: Vec<i64> = (0..10_000).map(|_| snowflake_id()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_money_rounding() {
        assert_eq!(round_money(Decimal::new(2345, 3)), Decimal::new(235, 2));
        assert_eq!(round_money(Decimal::new(-2345, 3)), Decimal::new(-235, 2));
        assert_eq!(to_f64(Decimal::new(68004, 3)), 68.0);
        assert_eq!(to_decimal(3.5), Decimal::new(35, 1));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Milk Type"), "milk-type");
        assert_eq!(slugify("  Extra  Shots!! "), "extra-shots");
        assert_eq!(slugify("Salsas (x2)"), "salsas-x2");
        assert_eq!(slugify("¿?"), "");
    }
}
