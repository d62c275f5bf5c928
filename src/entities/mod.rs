//! Entity module - SeaORM definitions for the two ledger tables.
//! `wallet` holds balances; `transaction` is the append-only ledger.

pub mod ledger_entry;
pub mod wallet;

// Re-export specific types to avoid conflicts
pub use ledger_entry::{
    Column as LedgerEntryColumn, Entity as LedgerEntry, Model as LedgerEntryModel, ReasonKind,
};
pub use wallet::{Column as WalletColumn, Entity as Wallet, Model as WalletModel};
