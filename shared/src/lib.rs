//! Shared types for the menu platform
//!
//! Error taxonomy, domain models, the pricing composer and small utilities
//! used by menu-cloud and by any Rust client of its API.

pub mod error;
pub mod models;
pub mod pricing;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
