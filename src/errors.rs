//! Unified error type for the wallet ledger.
//!
//! Every fallible operation returns [`Result`]. Validation errors (`InvalidAmount`,
//! `ReasonShapeMismatch`, `SelfTransfer`) are raised before any I/O; lookup errors
//! (`WalletNotFound`) before any mutation. Storage and contention errors abort the
//! unit of work, which rolls back when dropped.

use crate::core::reason::{Reason, Shape};
use sea_orm::DbErr;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the ledger core.
#[derive(Debug, Error)]
pub enum Error {
    /// Amount was zero, negative, NaN or infinite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A referenced wallet does not exist
    #[error("Wallet not found: {wallet_id}")]
    WalletNotFound {
        /// The missing wallet id
        wallet_id: i64,
    },

    /// The balance changed between read and write; the operation can be retried from scratch
    #[error("Concurrent write detected on wallet {wallet_id}")]
    ConcurrencyConflict {
        /// Wallet whose guarded write affected no rows
        wallet_id: i64,
    },

    /// The per-wallet lock could not be acquired in time
    #[error("Timed out after {waited:?} waiting for wallet {wallet_id}")]
    LockTimeout {
        /// Wallet whose lock was contended
        wallet_id: i64,
        /// How long the caller waited
        waited: Duration,
    },

    /// The reason was passed to an operation of the wrong shape
    #[error("Reason {reason} cannot be used for a {expected} operation")]
    ReasonShapeMismatch {
        /// The offending reason
        reason: Reason,
        /// The shape of the operation that was called
        expected: Shape,
    },

    /// A transfer named the same wallet on both sides
    #[error("Cannot transfer from wallet {wallet_id} to itself")]
    SelfTransfer {
        /// The wallet id used twice
        wallet_id: i64,
    },

    /// Underlying persistence failed (unavailable, constraint violation, acquire timeout)
    #[error("Storage failure: {0}")]
    StorageFailure(#[from] DbErr),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether resubmitting the same operation may succeed.
    ///
    /// The engine never retries on its own; callers use this to decide.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrencyConflict { .. } | Self::LockTimeout { .. } | Self::StorageFailure(_)
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
