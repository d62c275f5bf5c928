//! Reason taxonomy - why value moved, and which shape of movement each reason allows.
//!
//! A [`Reason`] is what callers hand to the engine. It is persisted as a field-less
//! [`ReasonKind`] plus an optional role id, so queries never parse reason text.

use crate::entities::ledger_entry::ReasonKind;
use std::fmt;

/// Which wallet fields an entry populates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Recipient only
    Credit,
    /// Sender only
    Debit,
    /// Sender and recipient
    Transfer,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
            Self::Transfer => "transfer",
        };
        f.write_str(name)
    }
}

/// Closed classification of ledger movements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reason {
    /// Daily login bonus
    DailyCredit,
    /// Member bought a home
    HomePurchase,
    /// Home purchase returned
    HomeRefund,
    /// Weekly stipend paid for holding a role
    WeeklyCredit {
        /// Role the stipend was paid for
        role_id: i64,
    },
    /// Grant issued by the system
    SystemToMember,
    /// Fee for uploading an object to the marketplace
    ObjectUpload,
    /// Fee for restocking object instances
    ObjectRestock,
    /// Upload fee returned
    ObjectUploadRefund,
    /// Refund for instances that never sold
    ObjectUnsoldInstancesRefund,
    /// Buyer paid for an object
    ObjectPurchase,
    /// Seller profit on an object
    ObjectProfit,
    /// Marketplace sale moving value from buyer to seller
    ObjectSell,
}

impl Reason {
    /// The shape of movement this reason requires.
    #[must_use]
    pub const fn shape(self) -> Shape {
        match self {
            Self::DailyCredit
            | Self::HomeRefund
            | Self::WeeklyCredit { .. }
            | Self::SystemToMember
            | Self::ObjectUploadRefund
            | Self::ObjectUnsoldInstancesRefund
            | Self::ObjectProfit => Shape::Credit,
            Self::HomePurchase | Self::ObjectUpload | Self::ObjectRestock | Self::ObjectPurchase => {
                Shape::Debit
            }
            Self::ObjectSell => Shape::Transfer,
        }
    }

    /// The stored discriminant.
    #[must_use]
    pub const fn kind(self) -> ReasonKind {
        match self {
            Self::DailyCredit => ReasonKind::DailyCredit,
            Self::HomePurchase => ReasonKind::HomePurchase,
            Self::HomeRefund => ReasonKind::HomeRefund,
            Self::WeeklyCredit { .. } => ReasonKind::WeeklyCredit,
            Self::SystemToMember => ReasonKind::SystemToMember,
            Self::ObjectUpload => ReasonKind::ObjectUpload,
            Self::ObjectRestock => ReasonKind::ObjectRestock,
            Self::ObjectUploadRefund => ReasonKind::ObjectUploadRefund,
            Self::ObjectUnsoldInstancesRefund => ReasonKind::ObjectUnsoldInstancesRefund,
            Self::ObjectPurchase => ReasonKind::ObjectPurchase,
            Self::ObjectProfit => ReasonKind::ObjectProfit,
            Self::ObjectSell => ReasonKind::ObjectSell,
        }
    }

    /// Role id carried by role-scoped reasons.
    #[must_use]
    pub const fn role_id(self) -> Option<i64> {
        match self {
            Self::WeeklyCredit { role_id } => Some(role_id),
            _ => None,
        }
    }

    /// Rebuilds a reason from its stored columns.
    ///
    /// Returns `None` for a weekly credit row without a role id.
    #[must_use]
    pub const fn from_stored(kind: ReasonKind, role_id: Option<i64>) -> Option<Self> {
        let reason = match kind {
            ReasonKind::DailyCredit => Self::DailyCredit,
            ReasonKind::HomePurchase => Self::HomePurchase,
            ReasonKind::HomeRefund => Self::HomeRefund,
            ReasonKind::WeeklyCredit => match role_id {
                Some(role_id) => Self::WeeklyCredit { role_id },
                None => return None,
            },
            ReasonKind::SystemToMember => Self::SystemToMember,
            ReasonKind::ObjectUpload => Self::ObjectUpload,
            ReasonKind::ObjectRestock => Self::ObjectRestock,
            ReasonKind::ObjectUploadRefund => Self::ObjectUploadRefund,
            ReasonKind::ObjectUnsoldInstancesRefund => Self::ObjectUnsoldInstancesRefund,
            ReasonKind::ObjectPurchase => Self::ObjectPurchase,
            ReasonKind::ObjectProfit => Self::ObjectProfit,
            ReasonKind::ObjectSell => Self::ObjectSell,
        };
        Some(reason)
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind().as_str())?;
        if let Some(role_id) = self.role_id() {
            write!(f, " for role {role_id}")?;
        }
        Ok(())
    }
}
