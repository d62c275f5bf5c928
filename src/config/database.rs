//! Database configuration module.
//!
//! Opens the `SQLite` connection pool and creates the `wallet` and `transaction`
//! tables from the entity definitions with `Schema::create_table_from_entity`, so the
//! schema always matches the Rust models. Creation is idempotent.

use crate::config::settings::DatabaseSettings;
use crate::entities::{LedgerEntry, Wallet};
use crate::errors::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::time::Duration;

/// Establishes a connection pool from the given settings.
///
/// `DATABASE_URL` in the environment takes precedence over the configured URL.
pub async fn create_connection(settings: &DatabaseSettings) -> Result<DatabaseConnection> {
    let url = settings.resolved_url();
    tracing::info!("Connecting to {}", url);

    Database::connect(connect_options(url, settings))
        .await
        .map_err(Into::into)
}

/// Pool options for `url`.
///
/// Statements that find another connection holding the `SQLite` write lock wait up to
/// the busy timeout before failing with "database is locked".
#[must_use]
pub fn connect_options(url: String, settings: &DatabaseSettings) -> ConnectOptions {
    let busy_timeout = settings.busy_timeout();
    let mut options = ConnectOptions::new(url);
    options
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .sqlx_logging(settings.sqlx_logging)
        .map_sqlx_sqlite_opts(move |opts| opts.busy_timeout(busy_timeout));
    if let Some(max) = settings.max_connections {
        options.max_connections(max);
    }
    options
}

/// Creates the ledger tables and their indexes if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut wallet_table = schema.create_table_from_entity(Wallet);
    let mut entry_table = schema.create_table_from_entity(LedgerEntry);
    wallet_table.if_not_exists();
    entry_table.if_not_exists();
    db.execute(builder.build(&wallet_table)).await?;
    db.execute(builder.build(&entry_table)).await?;

    for mut index in schema.create_index_from_entity(LedgerEntry) {
        index.if_not_exists();
        db.execute(builder.build(&index)).await?;
    }

    Ok(())
}
