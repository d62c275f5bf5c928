//! Scheduled and login-triggered grants.
//!
//! The daily login bonus pays more to members holding at least one role. The weekly
//! stipend run pays every role assignment that has a configured amount. Role
//! assignments come from the role tables, which live outside the ledger; this module
//! only sees `(wallet_id, role_id)` pairs.

use crate::{
    config::settings::PayoutSettings,
    core::engine::Ledger,
    entities::ledger_entry,
    errors::{Error, Result},
};
use tracing::{info, warn};

/// A member's wallet paired with one role they hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleAssignment {
    /// Wallet of the role holder
    pub wallet_id: i64,
    /// Opaque role identifier
    pub role_id: i64,
}

/// Outcome of one weekly stipend run.
///
/// Each stipend is its own unit of work, so one failure does not undo the others.
#[derive(Debug, Default)]
pub struct StipendRunResult {
    /// Entries created for stipends that were paid
    pub paid: Vec<ledger_entry::Model>,
    /// Assignments whose role has no configured stipend
    pub skipped: Vec<RoleAssignment>,
    /// Assignments whose credit failed, with the reason
    pub failed: Vec<(RoleAssignment, Error)>,
}

impl StipendRunResult {
    /// Total amount credited in this run.
    #[must_use]
    pub fn total_paid(&self) -> f64 {
        self.paid.iter().map(|e| e.amount).sum()
    }
}

/// Daily bonus for a member, depending on whether they hold any role.
#[must_use]
pub const fn daily_credit_amount(settings: &PayoutSettings, employed: bool) -> f64 {
    if employed {
        settings.daily_credit_employed
    } else {
        settings.daily_credit
    }
}

impl Ledger {
    /// Pays the daily login bonus.
    ///
    /// Whether the member already received it today is the caller's concern.
    pub async fn grant_daily_credit(
        &self,
        wallet_id: i64,
        employed: bool,
        settings: &PayoutSettings,
    ) -> Result<ledger_entry::Model> {
        let amount = daily_credit_amount(settings, employed);
        self.daily_credit(wallet_id, amount).await
    }

    /// Pays the weekly stipend for every assignment with a configured role.
    ///
    /// Failures are collected, not propagated; the caller decides what to resubmit.
    pub async fn pay_weekly_stipends(
        &self,
        assignments: &[RoleAssignment],
        settings: &PayoutSettings,
    ) -> StipendRunResult {
        let mut result = StipendRunResult::default();

        for &assignment in assignments {
            let Some(amount) = settings.stipend_for(assignment.role_id) else {
                result.skipped.push(assignment);
                continue;
            };

            match self
                .weekly_role_credit(assignment.wallet_id, amount, assignment.role_id)
                .await
            {
                Ok(entry) => result.paid.push(entry),
                Err(e) => {
                    warn!(
                        wallet_id = assignment.wallet_id,
                        role_id = assignment.role_id,
                        "Weekly stipend failed: {}",
                        e
                    );
                    result.failed.push((assignment, e));
                }
            }
        }

        info!(
            "Weekly stipends: {} paid ({} total), {} skipped, {} failed",
            result.paid.len(),
            result.total_paid(),
            result.skipped.len(),
            result.failed.len()
        );
        result
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::config::settings::StipendConfig;
    use crate::core::{history, reason::Reason};
    use crate::test_utils::*;

    fn settings() -> PayoutSettings {
        PayoutSettings {
            daily_credit: 50.0,
            daily_credit_employed: 100.0,
            stipends: vec![
                StipendConfig {
                    role_id: 1,
                    amount: 300.0,
                },
                StipendConfig {
                    role_id: 2,
                    amount: 150.0,
                },
            ],
        }
    }

    #[test]
    fn test_daily_credit_amount() {
        let settings = settings();
        assert_eq!(daily_credit_amount(&settings, false), 50.0);
        assert_eq!(daily_credit_amount(&settings, true), 100.0);
    }

    #[tokio::test]
    async fn test_grant_daily_credit_pays_employed_rate() -> Result<()> {
        let ledger = setup_ledger().await?;
        let db = ledger.connection();
        let citizen = create_test_wallet(db, 0.0).await?;
        let mayor = create_test_wallet(db, 0.0).await?;
        let settings = settings();

        ledger.grant_daily_credit(citizen.id, false, &settings).await?;
        ledger.grant_daily_credit(mayor.id, true, &settings).await?;

        assert_eq!(ledger.balance(citizen.id).await?, 50.0);
        assert_eq!(ledger.balance(mayor.id).await?, 100.0);
        assert_eq!(history::count_by_reason(db, Reason::DailyCredit).await?, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_weekly_stipend_run() -> Result<()> {
        init_test_tracing();
        let ledger = setup_ledger().await?;
        let db = ledger.connection();
        let chief = create_test_wallet(db, 0.0).await?;
        let deputy = create_test_wallet(db, 10.0).await?;
        let settings = settings();

        let assignments = [
            RoleAssignment {
                wallet_id: chief.id,
                role_id: 1,
            },
            RoleAssignment {
                wallet_id: chief.id,
                role_id: 2,
            },
            RoleAssignment {
                wallet_id: deputy.id,
                role_id: 2,
            },
            // No stipend configured for role 5
            RoleAssignment {
                wallet_id: deputy.id,
                role_id: 5,
            },
            // Wallet vanished from under the role table
            RoleAssignment {
                wallet_id: 9_999,
                role_id: 1,
            },
        ];

        let result = ledger.pay_weekly_stipends(&assignments, &settings).await;

        assert_eq!(result.paid.len(), 3);
        assert_eq!(result.total_paid(), 600.0);
        assert_eq!(result.skipped, vec![assignments[3]]);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].0, assignments[4]);
        assert!(matches!(
            result.failed[0].1,
            Error::WalletNotFound { wallet_id: 9_999 }
        ));

        assert_eq!(ledger.balance(chief.id).await?, 450.0);
        assert_eq!(ledger.balance(deputy.id).await?, 160.0);
        assert_eq!(
            history::count_by_reason(db, Reason::WeeklyCredit { role_id: 2 }).await?,
            2
        );

        Ok(())
    }
}
