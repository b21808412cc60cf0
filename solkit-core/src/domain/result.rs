//! Result and error types for the core library

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Core library error type
///
/// Every procedure surfaces one of these to the CLI. Variants that come
/// from the RPC node keep the server-provided `data` payload (preflight
/// logs, rate-limit hints) so the operator can see it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {message}")]
    Network {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("Fee unavailable: {0}")]
    FeeUnavailable(String),

    #[error("Insufficient funds: balance {balance} lamports cannot cover {required} lamports")]
    InsufficientFunds { balance: u64, required: u64 },

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Transaction too large: {size} bytes exceeds the {max} byte limit")]
    OversizedTransaction { size: usize, max: usize },

    #[error("Transaction rejected: {message}")]
    Submission {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("Transaction {signature} was not confirmed within {waited_secs}s")]
    ConfirmationTimeout { signature: String, waited_secs: u64 },

    #[error("Malformed key input: {0}")]
    MalformedKeyInput(String),

    #[error("Account {address} is owned by {owner}, expected {expected}")]
    AccountOwnershipConflict {
        address: String,
        owner: String,
        expected: String,
    },

    #[error("Account {0} exists but holds no initialized enrollment data")]
    IncompleteEnrollment(String),

    #[error("Not found: {0}")]
    NotFound(String),

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
    /// Create a network error without server details
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network {
            message: msg.into(),
            details: None,
        }
    }

    /// Create a submission error without server details
    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission {
            message: msg.into(),
            details: None,
        }
    }

    /// Create a malformed key error
    pub fn malformed_key(msg: impl Into<String>) -> Self {
        Self::MalformedKeyInput(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Server-provided context attached to the error, if any
    pub fn details(&self) -> Option<&JsonValue> {
        match self {
            Self::Network { details, .. } | Self::Submission { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
