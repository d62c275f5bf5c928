//! Wallet store - point reads and writes of wallet balances.
//!
//! Balance writes are overwrites, not increments. Callers outside the engine only
//! open wallets and read them; [`set_balance`] is reserved for the engine's unit of
//! work, which holds the wallet lock and passes the balance it observed.

use crate::{
    entities::{Wallet, wallet},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*, sea_query::Expr};

/// Opens a wallet with the given starting balance.
///
/// The starting balance must be finite and non-negative.
pub async fn create_wallet<C>(db: &C, initial_balance: f64) -> Result<wallet::Model>
where
    C: ConnectionTrait,
{
    if !initial_balance.is_finite() || initial_balance < 0.0 {
        return Err(Error::InvalidAmount {
            amount: initial_balance,
        });
    }

    let wallet = wallet::ActiveModel {
        balance: Set(initial_balance),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = wallet.insert(db).await?;
    tracing::debug!(wallet_id = result.id, initial_balance, "Opened wallet");
    Ok(result)
}

/// Finds a wallet by id, returning None if it does not exist.
pub async fn get_wallet<C>(db: &C, wallet_id: i64) -> Result<Option<wallet::Model>>
where
    C: ConnectionTrait,
{
    Wallet::find_by_id(wallet_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Reads the current balance of a wallet.
pub async fn get_balance<C>(db: &C, wallet_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    get_wallet(db, wallet_id)
        .await?
        .map(|w| w.balance)
        .ok_or(Error::WalletNotFound { wallet_id })
}

/// Overwrites a wallet balance with a value computed from `observed`.
///
/// The UPDATE only matches while the stored balance still equals `observed`:
/// `UPDATE wallet SET balance = ? WHERE id = ? AND balance = ?`. If another writer
/// got in between, no row matches and the caller gets
/// [`Error::ConcurrencyConflict`]; the surrounding unit of work must then be dropped.
pub async fn set_balance<C>(db: &C, wallet_id: i64, observed: f64, new_balance: f64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Wallet::update_many()
        .col_expr(wallet::Column::Balance, Expr::value(new_balance))
        .filter(wallet::Column::Id.eq(wallet_id))
        .filter(wallet::Column::Balance.eq(observed))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        tracing::warn!(wallet_id, observed, "Balance changed under a guarded write");
        return Err(Error::ConcurrencyConflict { wallet_id });
    }
    Ok(())
}

/// Sum of all wallet balances. Transfers leave it unchanged.
pub async fn total_balance<C>(db: &C) -> Result<f64>
where
    C: ConnectionTrait,
{
    let wallets = Wallet::find().all(db).await?;
    Ok(wallets.iter().map(|w| w.balance).sum())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_wallet_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_wallet(&db, -1.0).await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount }) if amount == -1.0));

        let result = create_wallet(&db, f64::NAN).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        let result = create_wallet(&db, f64::INFINITY).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_read_wallet() -> Result<()> {
        let db = setup_test_db().await?;

        let wallet = create_wallet(&db, 125.0).await?;
        assert_eq!(wallet.balance, 125.0);

        let found = get_wallet(&db, wallet.id).await?.unwrap();
        assert_eq!(found, wallet);
        assert_eq!(get_balance(&db, wallet.id).await?, 125.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_balance_missing_wallet() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(get_wallet(&db, 404).await?.is_none());
        let result = get_balance(&db, 404).await;
        assert!(matches!(result, Err(Error::WalletNotFound { wallet_id: 404 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_balance_overwrites() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, 10.0).await?;

        set_balance(&db, wallet.id, 10.0, 3.5).await?;
        assert_eq!(get_balance(&db, wallet.id).await?, 3.5);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_balance_with_stale_observation_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        let wallet = create_test_wallet(&db, 10.0).await?;

        // Someone else moved the balance after we read 10.0
        set_balance(&db, wallet.id, 10.0, 40.0).await?;

        let result = set_balance(&db, wallet.id, 10.0, 15.0).await;
        assert!(matches!(
            result,
            Err(Error::ConcurrencyConflict { wallet_id }) if wallet_id == wallet.id
        ));
        assert_eq!(get_balance(&db, wallet.id).await?, 40.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_total_balance() -> Result<()> {
        let db = setup_test_db().await?;
        assert_eq!(total_balance(&db).await?, 0.0);

        create_test_wallet(&db, 10.0).await?;
        create_test_wallet(&db, 32.5).await?;
        assert_eq!(total_balance(&db).await?, 42.5);

        Ok(())
    }
}
