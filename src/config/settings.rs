//! Ledger settings loaded from `ledger.toml`.
//!
//! Every field has a default, so an empty or missing file yields a working
//! configuration. `DATABASE_URL` in the environment overrides `database.url`.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default location of the settings file
pub const DEFAULT_CONFIG_PATH: &str = "ledger.toml";

/// Fallback database when neither the file nor the environment names one
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/wallet_ledger.sqlite?mode=rwc";

/// Configuration structure representing the entire `ledger.toml` file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Connection settings
    #[serde(default)]
    pub database: DatabaseSettings,
    /// Engine settings
    #[serde(default)]
    pub ledger: LedgerSettings,
    /// Daily bonus and weekly stipend amounts
    #[serde(default)]
    pub payouts: PayoutSettings,
}

/// Database connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SeaORM connection URL
    pub url: Option<String>,
    /// Pool size; SeaORM picks one for `SQLite` when unset
    pub max_connections: Option<u32>,
    /// Seconds to wait for a pooled connection before failing
    pub acquire_timeout_secs: u64,
    /// Milliseconds a `SQLite` statement waits on another connection's write lock
    pub busy_timeout_ms: u64,
    /// Log every SQL statement at debug level
    pub sqlx_logging: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: None,
            acquire_timeout_secs: 30,
            busy_timeout_ms: 5_000,
            sqlx_logging: false,
        }
    }
}

impl DatabaseSettings {
    /// Resolves the connection URL: environment, then file, then the built-in default.
    #[must_use]
    pub fn resolved_url(&self) -> String {
        std::env::var("DATABASE_URL")
            .ok()
            .or_else(|| self.url.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
    }

    /// Busy timeout as a [`Duration`]
    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Engine settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    /// Milliseconds to wait for a contended wallet before giving up
    pub lock_timeout_ms: u64,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 5_000,
        }
    }
}

impl LedgerSettings {
    /// Lock timeout as a [`Duration`]
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

/// Amounts paid out by the scheduled and login-triggered grants
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PayoutSettings {
    /// Daily login bonus for members without a role
    pub daily_credit: f64,
    /// Daily login bonus for members holding at least one role
    pub daily_credit_employed: f64,
    /// Weekly stipend per role
    pub stipends: Vec<StipendConfig>,
}

impl Default for PayoutSettings {
    fn default() -> Self {
        Self {
            daily_credit: 50.0,
            daily_credit_employed: 100.0,
            stipends: Vec::new(),
        }
    }
}

impl PayoutSettings {
    /// Weekly stipend configured for a role, if any.
    #[must_use]
    pub fn stipend_for(&self, role_id: i64) -> Option<f64> {
        self.stipends
            .iter()
            .find(|s| s.role_id == role_id)
            .map(|s| s.amount)
    }
}

/// Weekly stipend for a single role
#[derive(Debug, Clone, Deserialize)]
pub struct StipendConfig {
    /// Opaque role identifier from the role tables
    pub role_id: i64,
    /// Amount credited each week
    pub amount: f64,
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading ledger configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {path_ref:?}: {e}"),
    })
}

/// Loads settings from `path` if it exists, otherwise returns the defaults.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    if path_ref.exists() {
        load_config(path_ref)
    } else {
        tracing::info!("No config file at {:?}, using defaults", path_ref);
        Ok(Config::default())
    }
}
