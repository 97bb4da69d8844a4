//! Pricing Composer
//!
//! Pure price computation for a menu item line: base price from the item's
//! pricing mode plus the sum of selected modifier deltas, times quantity.
//! Selection-count rules are checked separately by [`validate_selection`];
//! the composer prices whatever it is given.

mod composer;
mod selection;

pub use composer::{LinePrice, PricingError, SizeChoice, compose};
pub use selection::{SelectionError, SelectionViolation, validate_selection};
