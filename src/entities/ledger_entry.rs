//! Ledger entry entity - one immutable record per value movement.
//!
//! A credit sets `recipient_wallet_id` only, a debit sets `sender_wallet_id` only,
//! and a transfer sets both. Rows are never updated; corrections are new offsetting
//! entries.

use crate::core::reason::Reason;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored discriminant of a [`Reason`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ReasonKind {
    /// Daily login bonus
    #[sea_orm(string_value = "daily_credit")]
    DailyCredit,
    /// Home purchase
    #[sea_orm(string_value = "home_purchase")]
    HomePurchase,
    /// Home refund
    #[sea_orm(string_value = "home_refund")]
    HomeRefund,
    /// Role stipend; the role lives in `role_id`
    #[sea_orm(string_value = "weekly_credit")]
    WeeklyCredit,
    /// System grant
    #[sea_orm(string_value = "system_to_member")]
    SystemToMember,
    /// Object upload fee
    #[sea_orm(string_value = "object_upload")]
    ObjectUpload,
    /// Object restock fee
    #[sea_orm(string_value = "object_restock")]
    ObjectRestock,
    /// Object upload refund
    #[sea_orm(string_value = "object_upload_refund")]
    ObjectUploadRefund,
    /// Refund of unsold object instances
    #[sea_orm(string_value = "object_unsold_instances_refund")]
    ObjectUnsoldInstancesRefund,
    /// Object purchase
    #[sea_orm(string_value = "object_purchase")]
    ObjectPurchase,
    /// Object profit
    #[sea_orm(string_value = "object_profit")]
    ObjectProfit,
    /// Marketplace sale
    #[sea_orm(string_value = "object_sell")]
    ObjectSell,
}

impl ReasonKind {
    /// The value stored in the `reason` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DailyCredit => "daily_credit",
            Self::HomePurchase => "home_purchase",
            Self::HomeRefund => "home_refund",
            Self::WeeklyCredit => "weekly_credit",
            Self::SystemToMember => "system_to_member",
            Self::ObjectUpload => "object_upload",
            Self::ObjectRestock => "object_restock",
            Self::ObjectUploadRefund => "object_upload_refund",
            Self::ObjectUnsoldInstancesRefund => "object_unsold_instances_refund",
            Self::ObjectPurchase => "object_purchase",
            Self::ObjectProfit => "object_profit",
            Self::ObjectSell => "object_sell",
        }
    }
}

/// Ledger entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction")]
pub struct Model {
    /// Monotonically increasing id, the natural ordering key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Magnitude moved, always positive
    pub amount: f64,
    /// Why the value moved
    #[sea_orm(indexed)]
    pub reason: ReasonKind,
    /// Role the movement was scoped to, for `weekly_credit`
    pub role_id: Option<i64>,
    /// Credited wallet
    #[sea_orm(indexed)]
    pub recipient_wallet_id: Option<i64>,
    /// Debited wallet
    #[sea_orm(indexed)]
    pub sender_wallet_id: Option<i64>,
    /// When the entry was recorded
    pub created_at: DateTimeUtc,
}

impl Model {
    /// The full reason, including its role id.
    #[must_use]
    pub const fn full_reason(&self) -> Option<Reason> {
        Reason::from_stored(self.reason, self.role_id)
    }

    /// Whether the entry touches the given wallet on either side.
    #[must_use]
    pub fn involves(&self, wallet_id: i64) -> bool {
        self.recipient_wallet_id == Some(wallet_id) || self.sender_wallet_id == Some(wallet_id)
    }
}

/// Each side of an entry belongs to a wallet
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Credited wallet
    #[sea_orm(
        belongs_to = "super::wallet::Entity",
        from = "Column::RecipientWalletId",
        to = "super::wallet::Column::Id",
        fk_name = "fk-transaction-recipient_wallet"
    )]
    Recipient,
    /// Debited wallet
    #[sea_orm(
        belongs_to = "super::wallet::Entity",
        from = "Column::SenderWalletId",
        to = "super::wallet::Column::Id",
        fk_name = "fk-transaction-sender_wallet"
    )]
    Sender,
}

impl ActiveModelBehavior for ActiveModel {}
