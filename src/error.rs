//! Custom error types for Tally
//!
//! This module defines the error hierarchy for the ledger using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for Tally operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A referenced account/group/category/party is missing, inactive or
    /// owned by someone else
    #[error("{kind} not available: {identifier}")]
    ReferenceNotFound {
        kind: &'static str,
        identifier: String,
    },

    /// The entity targeted by an edit or delete does not exist for this owner
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Transfer rejected before anything was staged
    #[error("Invalid transfer: {0}")]
    InvalidTransfer(String),

    /// The store refused to commit the staged changes
    #[error("Persistence conflict: {0}")]
    PersistenceConflict(String),

    /// A side effect was written but could neither complete nor be rolled back
    #[error("Partial apply failure at {step}: {reason}")]
    PartialApplyFailure { step: String, reason: String },

    /// A usage counter would have dropped below zero (strict mode)
    #[error("Usage counter underflow on {kind} {identifier}")]
    UsageUnderflow {
        kind: &'static str,
        identifier: String,
    },

    /// Validation errors for input values
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Create a "reference not found" error for a reference entity kind
    pub fn reference_not_found(kind: &'static str, identifier: impl Into<String>) -> Self {
        Self::ReferenceNotFound {
            kind,
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for accounts
    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transfers
    pub fn transfer_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transfer",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a "reference not found" error
    pub fn is_reference_not_found(&self) -> bool {
        matches!(self, Self::ReferenceNotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Tally operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = LedgerError::transaction_not_found("txn-1234abcd");
        assert_eq!(err.to_string(), "Transaction not found: txn-1234abcd");
        assert!(err.is_not_found());
        assert!(!err.is_reference_not_found());
    }

    #[test]
    fn test_reference_not_found_error() {
        let err = LedgerError::reference_not_found("Party", "pty-00000000");
        assert_eq!(err.to_string(), "Party not available: pty-00000000");
        assert!(err.is_reference_not_found());
    }

    #[test]
    fn test_partial_apply_failure_display() {
        let err = LedgerError::PartialApplyFailure {
            step: "accounts.json".into(),
            reason: "disk full".into(),
        };
        assert_eq!(
            err.to_string(),
            "Partial apply failure at accounts.json: disk full"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let ledger_err: LedgerError = io_err.into();
        assert!(matches!(ledger_err, LedgerError::Io(_)));
    }
}
