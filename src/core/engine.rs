//! Ledger engine - the only path that mutates wallet balances.
//!
//! Every operation is one unit of work:
//!
//! 1. validate amount and reason shape (no I/O)
//! 2. lock the touched wallets in ascending id order
//! 3. read the balance(s) and compute the new ones
//! 4. begin a database transaction and write the balances back with a guarded
//!    overwrite, sender first
//! 5. insert exactly one ledger entry
//! 6. commit
//!
//! The guarded write is the first statement of the transaction, so `SQLite` takes its
//! write lock before anything else and concurrent units of work queue on the busy
//! timeout instead of failing. The wallet lock keeps the observed balance current
//! until the write; a writer that bypasses it surfaces as
//! [`Error::ConcurrencyConflict`].
//!
//! Any error before the commit drops the transaction, which rolls it back, so a
//! failed call leaves no balance write and no ledger row behind. The engine never
//! retries; [`Error::is_retryable`] tells the caller whether resubmitting makes sense.

use crate::{
    core::{
        locks::WalletLocks,
        reason::{Reason, Shape},
        wallet,
    },
    entities::ledger_entry,
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, Set, TransactionTrait, prelude::*};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Handle to the ledger: a connection pool plus the per-wallet lock registry.
///
/// Cloning is cheap and clones share the same pool and locks, so one `Ledger` can be
/// handed to every request handler.
#[derive(Clone, Debug)]
pub struct Ledger {
    db: Arc<DatabaseConnection>,
    locks: WalletLocks,
}

/// A balance overwrite planned while the wallet lock is held.
#[derive(Debug, Clone, Copy)]
struct BalanceWrite {
    wallet_id: i64,
    observed: f64,
    new_balance: f64,
}

impl BalanceWrite {
    /// Plans `observed + delta`, rejecting results that overflow to infinity.
    fn plan(wallet_id: i64, observed: f64, delta: f64) -> Result<Self> {
        let new_balance = observed + delta;
        if !new_balance.is_finite() {
            return Err(Error::InvalidAmount {
                amount: delta.abs(),
            });
        }
        Ok(Self {
            wallet_id,
            observed,
            new_balance,
        })
    }
}

impl Ledger {
    /// Creates a ledger with the default lock timeout.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db: Arc::new(db),
            locks: WalletLocks::default(),
        }
    }

    /// Creates a ledger whose wallet lock waits give up after `lock_timeout`.
    #[must_use]
    pub fn with_lock_timeout(db: DatabaseConnection, lock_timeout: Duration) -> Self {
        Self {
            db: Arc::new(db),
            locks: WalletLocks::new(lock_timeout),
        }
    }

    /// The underlying connection, for read-only queries.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Current balance of a wallet.
    pub async fn balance(&self, wallet_id: i64) -> Result<f64> {
        wallet::get_balance(self.connection(), wallet_id).await
    }

    /// Adds `amount` to a wallet and records a recipient-only entry.
    pub async fn credit(
        &self,
        wallet_id: i64,
        amount: f64,
        reason: Reason,
    ) -> Result<ledger_entry::Model> {
        validate(amount, reason, Shape::Credit)?;
        let _guard = self.locks.acquire(&[wallet_id]).await?;

        let balance = self.balance(wallet_id).await?;
        let write = BalanceWrite::plan(wallet_id, balance, amount)?;
        let entry = apply(self.connection(), amount, reason, None, Some(write)).await?;

        info!(
            entry_id = entry.id,
            wallet_id,
            amount,
            %reason,
            "Credited wallet"
        );
        Ok(entry)
    }

    /// Subtracts `amount` from a wallet and records a sender-only entry.
    ///
    /// No floor is enforced; the balance may go negative.
    pub async fn debit(
        &self,
        wallet_id: i64,
        amount: f64,
        reason: Reason,
    ) -> Result<ledger_entry::Model> {
        validate(amount, reason, Shape::Debit)?;
        let _guard = self.locks.acquire(&[wallet_id]).await?;

        let balance = self.balance(wallet_id).await?;
        let write = BalanceWrite::plan(wallet_id, balance, -amount)?;
        let entry = apply(self.connection(), amount, reason, Some(write), None).await?;

        info!(
            entry_id = entry.id,
            wallet_id,
            amount,
            %reason,
            "Debited wallet"
        );
        Ok(entry)
    }

    /// Moves `amount` from one wallet to another and records a single entry
    /// referencing both.
    pub async fn transfer(
        &self,
        from_wallet_id: i64,
        to_wallet_id: i64,
        amount: f64,
        reason: Reason,
    ) -> Result<ledger_entry::Model> {
        validate(amount, reason, Shape::Transfer)?;
        if from_wallet_id == to_wallet_id {
            return Err(Error::SelfTransfer {
                wallet_id: from_wallet_id,
            });
        }
        let _guard = self.locks.acquire(&[from_wallet_id, to_wallet_id]).await?;

        // Both reads happen before either write so a missing wallet mutates nothing.
        let sender_balance = self.balance(from_wallet_id).await?;
        let recipient_balance = self.balance(to_wallet_id).await?;
        let debit = BalanceWrite::plan(from_wallet_id, sender_balance, -amount)?;
        let credit = BalanceWrite::plan(to_wallet_id, recipient_balance, amount)?;
        let entry = apply(self.connection(), amount, reason, Some(debit), Some(credit)).await?;

        info!(
            entry_id = entry.id,
            from_wallet_id,
            to_wallet_id,
            amount,
            %reason,
            "Transferred between wallets"
        );
        Ok(entry)
    }
}

/// Rejects bad amounts and reasons of the wrong shape before any I/O.
fn validate(amount: f64, reason: Reason, expected: Shape) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    if reason.shape() != expected {
        return Err(Error::ReasonShapeMismatch { reason, expected });
    }
    Ok(())
}

/// Runs the write half of a unit of work in one transaction: the guarded balance
/// overwrites (sender, then recipient) followed by the ledger entry.
async fn apply(
    db: &DatabaseConnection,
    amount: f64,
    reason: Reason,
    sender: Option<BalanceWrite>,
    recipient: Option<BalanceWrite>,
) -> Result<ledger_entry::Model> {
    let txn = db.begin().await?;
    for write in [sender, recipient].into_iter().flatten() {
        wallet::set_balance(&txn, write.wallet_id, write.observed, write.new_balance).await?;
    }
    let entry = record(
        &txn,
        amount,
        reason,
        recipient.map(|w| w.wallet_id),
        sender.map(|w| w.wallet_id),
    )
    .await?;
    txn.commit().await?;
    Ok(entry)
}

async fn record<C>(
    db: &C,
    amount: f64,
    reason: Reason,
    recipient_wallet_id: Option<i64>,
    sender_wallet_id: Option<i64>,
) -> Result<ledger_entry::Model>
where
    C: ConnectionTrait,
{
    let entry = ledger_entry::ActiveModel {
        amount: Set(amount),
        reason: Set(reason.kind()),
        role_id: Set(reason.role_id()),
        recipient_wallet_id: Set(recipient_wallet_id),
        sender_wallet_id: Set(sender_wallet_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let entry = entry.insert(db).await?;
    debug!(entry_id = entry.id, "Appended ledger entry");
    Ok(entry)
}
