/// Database connection and table creation
pub mod database;

/// Settings loading from ledger.toml
pub mod settings;
