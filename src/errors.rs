use thiserror::Error;

/// Unified error type for the inventory service.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Any failure reported by the database driver
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// No chemical record exists for the given serial number
    #[error("Chemical with serial number {serial_no} not found")]
    ChemicalNotFound {
        /// Serial number that was looked up
        serial_no: i64,
    },

    /// No rows carry the given purchase-order number
    #[error("Purchase order '{po_number}' not found")]
    PurchaseOrderNotFound {
        /// PO number that was looked up
        po_number: String,
    },

    /// A caller-supplied serial number is already taken
    #[error("Serial number {serial_no} is already in use")]
    DuplicateSerial {
        /// The conflicting serial number
        serial_no: i64,
    },

    /// Request data failed validation
    #[error("Invalid input: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// Username or password did not match
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Hashing or parsing a stored password hash failed
    #[error("Password hashing error: {message}")]
    PasswordHash {
        /// Underlying hasher message
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl From<argon2::password_hash::Error> for Error {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::PasswordHash {
            message: value.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
