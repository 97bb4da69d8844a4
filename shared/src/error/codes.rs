//! Unified error codes for the menu platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Tenant / signup errors
//! - 4xxx: Catalog errors (categories, items, variants)
//! - 5xxx: Modifier errors (groups, options, bindings)
//! - 6xxx: Promotion errors
//! - 7xxx: Upload errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Tenant ====================
    /// No tenant context could be resolved for the request
    TenantNotSelected = 3001,
    /// Tenant not found
    TenantNotFound = 3002,
    /// Subdomain already taken
    SubdomainTaken = 3003,
    /// Subdomain does not satisfy naming rules
    SubdomainInvalid = 3004,
    /// Email already registered
    EmailTaken = 3005,
    /// Password too short
    PasswordTooShort = 3006,
    /// Checkout session not paid
    PaymentNotCompleted = 3007,
    /// Payment setup failed
    PaymentSetupFailed = 3008,
    /// Provisioning failed part-way
    ProvisioningFailed = 3009,

    // ==================== 4xxx: Catalog ====================
    /// Category not found
    CategoryNotFound = 4001,
    /// Menu item not found
    MenuItemNotFound = 4101,
    /// Menu item pricing is inconsistent or incomplete
    InvalidPricing = 4102,
    /// Variant not found
    VariantNotFound = 4103,

    // ==================== 5xxx: Modifier ====================
    /// Modifier group not found
    ModifierGroupNotFound = 5001,
    /// Modifier option not found
    ModifierOptionNotFound = 5002,
    /// Modifier group is bound to menu items (edit requires acknowledgement)
    ModifierGroupInUse = 5003,
    /// Modifier selection violates group rules
    ModifierSelectionInvalid = 5004,

    // ==================== 6xxx: Promotion ====================
    /// Promotion not found
    PromotionNotFound = 6001,
    /// Promotion schedule is invalid (end before start)
    InvalidSchedule = 6002,

    // ==================== 7xxx: Upload ====================
    /// File too large
    FileTooLarge = 7001,
    /// Unsupported file format
    UnsupportedFileFormat = 7002,
    /// No file provided in request
    NoFileProvided = 7003,
    /// Empty file provided
    EmptyFile = 7004,
    /// Object storage upload/delete failed
    UploadFailed = 7005,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Tenant
            ErrorCode::TenantNotSelected => "No tenant context for this request",
            ErrorCode::TenantNotFound => "Restaurant not found",
            ErrorCode::SubdomainTaken => "Subdomain is already taken",
            ErrorCode::SubdomainInvalid => "Subdomain is not valid",
            ErrorCode::EmailTaken => "Email is already registered",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",
            ErrorCode::PaymentNotCompleted => "Payment has not been completed",
            ErrorCode::PaymentSetupFailed => "Payment setup failed",
            ErrorCode::ProvisioningFailed => "Restaurant setup could not be completed",

            // Catalog
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::InvalidPricing => "Menu item pricing is invalid",
            ErrorCode::VariantNotFound => "Variant not found",

            // Modifier
            ErrorCode::ModifierGroupNotFound => "Modifier group not found",
            ErrorCode::ModifierOptionNotFound => "Modifier option not found",
            ErrorCode::ModifierGroupInUse => {
                "Modifier group is used by other menu items; editing it affects all of them"
            }
            ErrorCode::ModifierSelectionInvalid => "Modifier selection is not valid",

            // Promotion
            ErrorCode::PromotionNotFound => "Promotion not found",
            ErrorCode::InvalidSchedule => "Promotion end date is before its start date",

            // Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::UploadFailed => "File upload failed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Tenant
            3001 => Ok(ErrorCode::TenantNotSelected),
            3002 => Ok(ErrorCode::TenantNotFound),
            3003 => Ok(ErrorCode::SubdomainTaken),
            3004 => Ok(ErrorCode::SubdomainInvalid),
            3005 => Ok(ErrorCode::EmailTaken),
            3006 => Ok(ErrorCode::PasswordTooShort),
            3007 => Ok(ErrorCode::PaymentNotCompleted),
            3008 => Ok(ErrorCode::PaymentSetupFailed),
            3009 => Ok(ErrorCode::ProvisioningFailed),

            // Catalog
            4001 => Ok(ErrorCode::CategoryNotFound),
            4101 => Ok(ErrorCode::MenuItemNotFound),
            4102 => Ok(ErrorCode::InvalidPricing),
            4103 => Ok(ErrorCode::VariantNotFound),

            // Modifier
            5001 => Ok(ErrorCode::ModifierGroupNotFound),
            5002 => Ok(ErrorCode::ModifierOptionNotFound),
            5003 => Ok(ErrorCode::ModifierGroupInUse),
            5004 => Ok(ErrorCode::ModifierSelectionInvalid),

            // Promotion
            6001 => Ok(ErrorCode::PromotionNotFound),
            6002 => Ok(ErrorCode::InvalidSchedule),

            // Upload
            7001 => Ok(ErrorCode::FileTooLarge),
            7002 => Ok(ErrorCode::UnsupportedFileFormat),
            7003 => Ok(ErrorCode::NoFileProvided),
            7004 => Ok(ErrorCode::EmptyFile),
            7005 => Ok(ErrorCode::UploadFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip_through_u16() {
        for code in [
            ErrorCode::Success,
            ErrorCode::NotFound,
            ErrorCode::SubdomainTaken,
            ErrorCode::MenuItemNotFound,
            ErrorCode::ModifierGroupInUse,
            ErrorCode::PromotionNotFound,
            ErrorCode::UploadFailed,
            ErrorCode::InternalError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_invalid_code() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::NotFound.to_string(), "E0003");
        assert_eq!(ErrorCode::ModifierGroupInUse.to_string(), "E5003");
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::CategoryNotFound).unwrap();
        assert_eq!(json, "4001");
        let code: ErrorCode = serde_json::from_str("3003").unwrap();
        assert_eq!(code, ErrorCode::SubdomainTaken);
    }
}
