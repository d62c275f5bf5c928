//! Shared test utilities.
//!
//! Helpers for setting up an in-memory or file-backed ledger and opening wallets
//! with sensible defaults.

use crate::{
    config::{
        database::{connect_options, create_tables},
        settings::DatabaseSettings,
    },
    core::{engine::Ledger, wallet},
    entities,
    errors::Result,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

static NEXT_DATABASE: AtomicUsize = AtomicUsize::new(0);

/// Routes tracing output through the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
///
/// Pinned to a single pooled connection: every `:memory:` connection is its own database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    create_tables(&db).await?;
    Ok(db)
}

/// A ledger over a fresh in-memory database.
pub async fn setup_ledger() -> Result<Ledger> {
    Ok(Ledger::new(setup_test_db().await?))
}

/// Opens a wallet with the given starting balance.
pub async fn create_test_wallet(
    db: &DatabaseConnection,
    balance: f64,
) -> Result<entities::wallet::Model> {
    wallet::create_wallet(db, balance).await
}

/// Sets up a ledger with one wallet.
/// Returns (ledger, wallet) for common test scenarios.
pub async fn setup_with_wallet(balance: f64) -> Result<(Ledger, entities::wallet::Model)> {
    let ledger = setup_ledger().await?;
    let wallet = create_test_wallet(ledger.connection(), balance).await?;
    Ok((ledger, wallet))
}

/// A `SQLite` file in the system temp dir, deleted on drop.
///
/// Unlike `:memory:`, every pooled connection sees the same database, so tests built
/// on it run units of work on separate connections.
pub struct TempDatabase {
    path: PathBuf,
}

impl TempDatabase {
    /// Picks a fresh path, clearing leftovers from an earlier run.
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!(
            "wallet-ledger-{}-{}.sqlite",
            std::process::id(),
            NEXT_DATABASE.fetch_add(1, Ordering::Relaxed)
        ));
        let database = Self { path };
        database.remove_files();
        database
    }

    /// Connection URL that creates the file on first connect.
    pub fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path.display())
    }

    fn remove_files(&self) {
        for suffix in ["", "-journal", "-wal", "-shm"] {
            let mut name = self.path.clone().into_os_string();
            name.push(suffix);
            let _ = std::fs::remove_file(name);
        }
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        self.remove_files();
    }
}

/// A ledger over a fresh file-backed database with a pool of `max_connections`.
///
/// Keep the returned [`TempDatabase`] alive for as long as the ledger is used.
pub async fn setup_file_ledger(max_connections: u32) -> Result<(Ledger, TempDatabase)> {
    let file = TempDatabase::new();
    let settings = DatabaseSettings {
        max_connections: Some(max_connections),
        ..Default::default()
    };
    let db = Database::connect(connect_options(file.url(), &settings)).await?;
    create_tables(&db).await?;
    Ok((Ledger::new(db), file))
}
