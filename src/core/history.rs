//! Read-only queries over the ledger.
//!
//! All listings order by entry id, newest first. Ids are assigned in insertion order,
//! so this is a stable proxy for recency even when two entries share a timestamp.
//! Nothing here touches balances or keeps cursor state between calls.

use crate::{
    core::reason::Reason,
    entities::{LedgerEntry, ledger_entry},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{Condition, PaginatorTrait, QueryOrder, QuerySelect, prelude::*};

/// Maximum number of entries returned by [`list_since`]
pub const RECENT_ACTIVITY_LIMIT: u64 = 30;

fn reason_condition(reason: Reason) -> Condition {
    let condition = Condition::all().add(ledger_entry::Column::Reason.eq(reason.kind()));
    match reason.role_id() {
        Some(role_id) => condition.add(ledger_entry::Column::RoleId.eq(role_id)),
        None => condition,
    }
}

fn wallet_condition(wallet_id: i64) -> Condition {
    Condition::any()
        .add(ledger_entry::Column::RecipientWalletId.eq(wallet_id))
        .add(ledger_entry::Column::SenderWalletId.eq(wallet_id))
}

/// Retrieves a single entry by id.
pub async fn get_entry<C>(db: &C, entry_id: i64) -> Result<Option<ledger_entry::Model>>
where
    C: ConnectionTrait,
{
    LedgerEntry::find_by_id(entry_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Entries recorded for `reason`, newest first.
///
/// A weekly credit matches only entries for the same role.
pub async fn list_by_reason<C>(
    db: &C,
    reason: Reason,
    limit: u64,
    offset: u64,
) -> Result<Vec<ledger_entry::Model>>
where
    C: ConnectionTrait,
{
    LedgerEntry::find()
        .filter(reason_condition(reason))
        .order_by_desc(ledger_entry::Column::Id)
        .limit(limit)
        .offset(offset)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Entries where the wallet is sender or recipient, newest first.
pub async fn list_by_wallet<C>(
    db: &C,
    wallet_id: i64,
    limit: u64,
    offset: u64,
) -> Result<Vec<ledger_entry::Model>>
where
    C: ConnectionTrait,
{
    LedgerEntry::find()
        .filter(wallet_condition(wallet_id))
        .order_by_desc(ledger_entry::Column::Id)
        .limit(limit)
        .offset(offset)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Recent activity feed: entries created at or after `since`, newest first,
/// capped at [`RECENT_ACTIVITY_LIMIT`].
pub async fn list_since<C>(db: &C, since: DateTime<Utc>) -> Result<Vec<ledger_entry::Model>>
where
    C: ConnectionTrait,
{
    LedgerEntry::find()
        .filter(ledger_entry::Column::CreatedAt.gte(since))
        .order_by_desc(ledger_entry::Column::Id)
        .limit(RECENT_ACTIVITY_LIMIT)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of entries recorded for `reason`.
pub async fn count_by_reason<C>(db: &C, reason: Reason) -> Result<u64>
where
    C: ConnectionTrait,
{
    LedgerEntry::find()
        .filter(reason_condition(reason))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Number of entries touching the wallet on either side.
pub async fn count_by_wallet<C>(db: &C, wallet_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    LedgerEntry::find()
        .filter(wallet_condition(wallet_id))
        .count(db)
        .await
        .map_err(Into::into)
}
