//! menu-cloud — multi-tenant restaurant menu service
//!
//! - Tenant admin API (JWT authenticated): catalog, modifier groups,
//!   bindings, promotions, settings, images
//! - Public menu API resolved by subdomain
//! - Signup, checkout and tenant provisioning

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod logger;
pub mod menu;
pub mod provisioning;
pub mod services;
pub mod state;
pub mod util;

pub use config::Config;
pub use state::AppState;
