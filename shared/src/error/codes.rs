//! Unified error codes for the Tally back-office
//!
//! Error codes are shared between the server and API clients and are
//! organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Store errors
//! - 4xxx: Staff / onboarding errors
//! - 5xxx: User errors
//! - 6xxx: Inventory errors
//! - 7xxx: Sales errors
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
    /// Token has been revoked (blacklisted)
    TokenRevoked = 1005,
    /// Password too short
    PasswordTooShort = 1006,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Caller is not a staff member of the store
    NotStoreStaff = 2002,
    /// Staff membership has been deactivated
    StaffNotActive = 2003,
    /// Attempted to act on a different store's resources
    CrossStoreAccess = 2004,

    // ==================== 3xxx: Store ====================
    /// Store not found
    StoreNotFound = 3001,
    /// Store name already exists
    StoreNameExists = 3002,
    /// Role not found
    RoleNotFound = 3101,
    /// Permission (reference data) not found
    PermissionNotFound = 3201,

    // ==================== 4xxx: Staff / Onboarding ====================
    /// Staff not found
    StaffNotFound = 4001,
    /// Staff membership already exists for this user and store
    StaffAlreadyExists = 4002,
    /// Staff exists but is not in pending status
    StaffNotPending = 4003,
    /// Invitation token is invalid
    InvitationInvalid = 4101,
    /// Invitation token has expired
    InvitationExpired = 4102,

    // ==================== 5xxx: User ====================
    /// User not found
    UserNotFound = 5001,
    /// Username already exists
    UsernameExists = 5002,
    /// Email already exists
    EmailExists = 5003,
    /// User account has been deactivated
    UserNotActive = 5004,

    // ==================== 6xxx: Inventory ====================
    /// Inventory item not found
    ItemNotFound = 6001,
    /// SKU already exists
    SkuExists = 6002,
    /// Inventory item has been deactivated
    ItemNotActive = 6003,
    /// Insufficient stock for the requested quantity
    InsufficientStock = 6004,

    // ==================== 65xx: File Upload ====================
    /// File too large
    FileTooLarge = 6501,
    /// Unsupported file format
    UnsupportedFileFormat = 6502,
    /// Invalid/corrupted image file
    InvalidImageFile = 6503,
    /// No file provided in request
    NoFileProvided = 6504,
    /// Empty file provided
    EmptyFile = 6505,
    /// Image processing failed
    ImageProcessingFailed = 6506,
    /// File storage failed
    FileStorageFailed = 6507,

    // ==================== 7xxx: Sales ====================
    /// Sale not found
    SaleNotFound = 7001,
    /// Sale contains no items
    SaleEmpty = 7002,

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
    /// Mail delivery failed after retries
    MailDeliveryFailed = 9101,
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
            ErrorCode::TokenRevoked => "Authentication token has been revoked",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::NotStoreStaff => "Not a staff member of this store",
            ErrorCode::StaffNotActive => "Staff membership is not active",
            ErrorCode::CrossStoreAccess => "Cannot access another store's resources",

            // Store
            ErrorCode::StoreNotFound => "Store not found",
            ErrorCode::StoreNameExists => "Store name already exists",
            ErrorCode::RoleNotFound => "Role not found",
            ErrorCode::PermissionNotFound => "Permission not found",

            // Staff / Onboarding
            ErrorCode::StaffNotFound => "Staff not found",
            ErrorCode::StaffAlreadyExists => "Staff already exists for this user and store",
            ErrorCode::StaffNotPending => "Staff already exists and is not in pending status",
            ErrorCode::InvitationInvalid => "Invitation token is invalid",
            ErrorCode::InvitationExpired => "Invitation token has expired",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::EmailExists => "Email already exists",
            ErrorCode::UserNotActive => "User account is not active",

            // Inventory
            ErrorCode::ItemNotFound => "Inventory item not found",
            ErrorCode::SkuExists => "SKU already exists",
            ErrorCode::ItemNotActive => "Inventory item is not active",
            ErrorCode::InsufficientStock => "Insufficient stock",

            // File Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::ImageProcessingFailed => "Image processing failed",
            ErrorCode::FileStorageFailed => "File storage failed",

            // Sales
            ErrorCode::SaleNotFound => "Sale not found",
            ErrorCode::SaleEmpty => "Sale contains no items",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::MailDeliveryFailed => "Mail delivery failed",
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
            1005 => Ok(ErrorCode::TokenRevoked),
            1006 => Ok(ErrorCode::PasswordTooShort),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::NotStoreStaff),
            2003 => Ok(ErrorCode::StaffNotActive),
            2004 => Ok(ErrorCode::CrossStoreAccess),

            // Store
            3001 => Ok(ErrorCode::StoreNotFound),
            3002 => Ok(ErrorCode::StoreNameExists),
            3101 => Ok(ErrorCode::RoleNotFound),
            3201 => Ok(ErrorCode::PermissionNotFound),

            // Staff / Onboarding
            4001 => Ok(ErrorCode::StaffNotFound),
            4002 => Ok(ErrorCode::StaffAlreadyExists),
            4003 => Ok(ErrorCode::StaffNotPending),
            4101 => Ok(ErrorCode::InvitationInvalid),
            4102 => Ok(ErrorCode::InvitationExpired),

            // User
            5001 => Ok(ErrorCode::UserNotFound),
            5002 => Ok(ErrorCode::UsernameExists),
            5003 => Ok(ErrorCode::EmailExists),
            5004 => Ok(ErrorCode::UserNotActive),

            // Inventory
            6001 => Ok(ErrorCode::ItemNotFound),
            6002 => Ok(ErrorCode::SkuExists),
            6003 => Ok(ErrorCode::ItemNotActive),
            6004 => Ok(ErrorCode::InsufficientStock),

            // File Upload
            6501 => Ok(ErrorCode::FileTooLarge),
            6502 => Ok(ErrorCode::UnsupportedFileFormat),
            6503 => Ok(ErrorCode::InvalidImageFile),
            6504 => Ok(ErrorCode::NoFileProvided),
            6505 => Ok(ErrorCode::EmptyFile),
            6506 => Ok(ErrorCode::ImageProcessingFailed),
            6507 => Ok(ErrorCode::FileStorageFailed),

            // Sales
            7001 => Ok(ErrorCode::SaleNotFound),
            7002 => Ok(ErrorCode::SaleEmpty),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::MailDeliveryFailed),

            other => Err(InvalidErrorCode(other)),
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
    fn test_code_roundtrip() {
        for code in [
            ErrorCode::Success,
            ErrorCode::NotFound,
            ErrorCode::NotAuthenticated,
            ErrorCode::PermissionDenied,
            ErrorCode::StaffAlreadyExists,
            ErrorCode::InvitationExpired,
            ErrorCode::InsufficientStock,
            ErrorCode::DatabaseError,
        ] {
            let value: u16 = code.into();
            assert_eq!(ErrorCode::try_from(value), Ok(code));
        }
    }

    #[test]
    fn test_invalid_code() {
        assert_eq!(ErrorCode::try_from(12345), Err(InvalidErrorCode(12345)));
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::NotFound.to_string(), "E0003");
        assert_eq!(ErrorCode::PermissionDenied.to_string(), "E2001");
    }

    #[test]
    fn test_serde_as_u16() {
        let json = serde_json::to_string(&ErrorCode::StaffNotPending).unwrap();
        assert_eq!(json, "4003");
        let code: ErrorCode = serde_json::from_str("4003").unwrap();
        assert_eq!(code, ErrorCode::StaffNotPending);
    }
}
