//! Wallet entity - the balance-holding account owned by one member.
//!
//! Rows are created alongside their member and never deleted. The `balance`
//! column is only written by the ledger engine.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wallet database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet")]
pub struct Model {
    /// Unique identifier for the wallet
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Current balance; no floor is enforced
    pub balance: f64,
    /// When the wallet was opened
    pub created_at: DateTimeUtc,
}

/// Ledger entries reference wallets from two columns, so the relations live on
/// the entry side.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
