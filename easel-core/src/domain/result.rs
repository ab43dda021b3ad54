//! Result and error types for the core library

use thiserror::Error;

/// Failure reported by the generation delegate
///
/// `NotFound` is the access-denied shape: the configured API key exists but
/// the requested model/capability is not available to it.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Failed(String),
}

/// Core library error type
///
/// The account variants carry the product's user-facing wording so callers
/// can surface them directly.
#[derive(Error, Debug)]
pub enum Error {
    #[error("An account with this email already exists. Please log in.")]
    DuplicateAccount,

    #[error("{0}")]
    NotFound(String),

    #[error("This account does not have a password set. Please sign up again.")]
    NoPasswordSet,

    #[error("Incorrect password. Please try again.")]
    InvalidCredentials,

    #[error("Password cannot be changed for this account.")]
    AccountHasNoPassword,

    #[error("Incorrect current password.")]
    IncorrectCurrentPassword,

    #[error("Not enough credits: this costs {required} but the balance is {available}.")]
    InsufficientCredits { required: i64, available: i64 },

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerateError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an uncategorized error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
