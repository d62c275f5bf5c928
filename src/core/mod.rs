//! Ledger core - framework-agnostic wallet, engine and query logic.

/// Ledger engine: atomic credit, debit and transfer
pub mod engine;
/// Read-only queries over the ledger
pub mod history;
/// Per-wallet lock registry
pub mod locks;
/// Named operations, one per business action
pub mod operations;
/// Daily bonus and weekly stipend grants
pub mod payouts;
/// Reason taxonomy and entry shapes
pub mod reason;
/// Wallet store: balance reads and guarded writes
pub mod wallet;

pub use engine::Ledger;
pub use reason::{Reason, Shape};
