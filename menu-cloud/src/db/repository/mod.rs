//! Repository Module
//!
//! Free async functions over `&SqlitePool`. Every query that touches tenant
//! data filters by `tenant_id`; a row owned by another tenant is reported
//! exactly like a missing row.

// Tenancy
pub mod account;
pub mod settings;
pub mod tenant;
pub mod tenant_user;

// Catalog
pub mod category;
pub mod menu_item;

// Modifiers
pub mod binding;
pub mod modifier;

// Promotions
pub mod promotion;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {message}")]
    NotFound { code: ErrorCode, message: String },

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Domain rule violation carrying its own error code
    #[error("{message}")]
    Rule { code: ErrorCode, message: String },

    /// Stored pricing columns disagree with the row's pricing mode, or a
    /// pricing form failed validation
    #[error("Invalid pricing: {message}")]
    InvalidPricingState {
        field: Option<&'static str>,
        message: String,
    },
}

impl RepoError {
    pub fn not_found(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::not_found(ErrorCode::NotFound, "Row not found"),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            other => RepoError::Database(other.to_string()),
        }
    }
}

impl From<shared::models::PricingValidationError> for RepoError {
    fn from(err: shared::models::PricingValidationError) -> Self {
        RepoError::InvalidPricingState {
            field: Some(err.field()),
            message: err.to_string(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { code, message } => AppError::with_message(code, message),
            RepoError::Duplicate(msg) => {
                tracing::debug!(error = %msg, "Duplicate row");
                AppError::new(ErrorCode::AlreadyExists)
            }
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::new(ErrorCode::DatabaseError)
            }
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Rule { code, message } => AppError::with_message(code, message),
            RepoError::InvalidPricingState { field, message } => {
                let err = AppError::with_message(ErrorCode::InvalidPricing, message);
                match field {
                    Some(field) => err.with_detail("field", field),
                    None => err,
                }
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Trim a required name; empty is a validation error
pub(crate) fn require_name(value: &str, what: &str) -> RepoResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RepoError::Validation(format!("{what} name is required")));
    }
    Ok(trimmed.to_string())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_keeps_its_code() {
        let app: AppError =
            RepoError::not_found(ErrorCode::MenuItemNotFound, "Menu item 7 not found").into();
        assert_eq!(app.code, ErrorCode::MenuItemNotFound);
        assert_eq!(app.message, "Menu item 7 not found");
    }

    #[test]
    fn database_errors_hide_raw_text() {
        let app: AppError = RepoError::Database("disk I/O error at page 42".into()).into();
        assert_eq!(app.code, ErrorCode::DatabaseError);
        assert!(!app.message.contains("page 42"));
    }

    #[test]
    fn pricing_validation_maps_with_field() {
        let err: RepoError = shared::models::PricingValidationError::MultipleModes.into();
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::InvalidPricing);
        assert_eq!(app.details.unwrap().get("field").unwrap(), "pricing");
    }

    #[test]
    fn require_name_trims() {
        assert_eq!(require_name("  Postres ", "Category").unwrap(), "Postres");
        assert!(matches!(
            require_name("   ", "Category"),
            Err(RepoError::Validation(_))
        ));
    }
}
