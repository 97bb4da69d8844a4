//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Tenant errors
/// - 4xxx: Catalog errors
/// - 5xxx: Modifier errors
/// - 6xxx: Promotion errors
/// - 7xxx: Upload errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Tenant errors (3xxx)
    Tenant,
    /// Catalog errors (4xxx)
    Catalog,
    /// Modifier errors (5xxx)
    Modifier,
    /// Promotion errors (6xxx)
    Promotion,
    /// Upload errors (7xxx)
    Upload,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Tenant,
            4000..5000 => Self::Catalog,
            5000..6000 => Self::Modifier,
            6000..7000 => Self::Promotion,
            7000..8000 => Self::Upload,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Tenant => "tenant",
            Self::Catalog => "catalog",
            Self::Modifier => "modifier",
            Self::Promotion => "promotion",
            Self::Upload => "upload",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Tenant);
        assert_eq!(ErrorCategory::from_code(4101), ErrorCategory::Catalog);
        assert_eq!(ErrorCategory::from_code(5003), ErrorCategory::Modifier);
        assert_eq!(ErrorCategory::from_code(6001), ErrorCategory::Promotion);
        assert_eq!(ErrorCategory::from_code(7005), ErrorCategory::Upload);
        assert_eq!(ErrorCategory::from_code(8000), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::NotAuthenticated.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::SubdomainTaken.category(), ErrorCategory::Tenant);
        assert_eq!(ErrorCode::InvalidPricing.category(), ErrorCategory::Catalog);
        assert_eq!(
            ErrorCode::ModifierGroupInUse.category(),
            ErrorCategory::Modifier
        );
        assert_eq!(ErrorCode::InternalError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Modifier).unwrap();
        assert_eq!(json, "\"modifier\"");
        let category: ErrorCategory = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(category, ErrorCategory::System);
    }
}
