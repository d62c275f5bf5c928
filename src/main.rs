use chrono::{DateTime, TimeDelta, Utc};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wallet_ledger::{
    config::{database, settings},
    core::{Ledger, history, payouts::RoleAssignment, wallet},
    entities::LedgerEntryModel,
    errors::Result,
};

/// Operator tool for the wallet ledger
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML settings file
    #[arg(short, long, default_value = settings::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the ledger tables if they are missing
    Init,
    /// Open a new wallet
    OpenWallet {
        /// Starting balance
        #[arg(long, default_value_t = 0.0)]
        balance: f64,
    },
    /// Print a wallet's balance
    Balance {
        /// Wallet id
        wallet_id: i64,
    },
    /// Credit a wallet with a system grant
    Grant {
        /// Wallet id
        wallet_id: i64,
        /// Amount to credit
        amount: f64,
    },
    /// List a wallet's entries, newest first
    History {
        /// Wallet id
        wallet_id: i64,
        /// Maximum number of entries to show
        #[arg(long, default_value_t = 20)]
        limit: u64,
        /// Number of newest entries to skip
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
    /// Show ledger activity from the last few minutes
    Recent {
        /// How many minutes back to look
        #[arg(long = "minutes", default_value = "60", value_parser = parse_window)]
        window: TimeDelta,
    },
    /// Pay weekly stipends for WALLET:ROLE assignments
    Stipends {
        /// Assignments such as `12:3`
        #[arg(value_parser = parse_assignment, required = true)]
        assignments: Vec<RoleAssignment>,
    },
}

fn parse_assignment(raw: &str) -> std::result::Result<RoleAssignment, String> {
    let (wallet, role) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected WALLET:ROLE, got {raw:?}"))?;
    let wallet_id = wallet
        .trim()
        .parse()
        .map_err(|e| format!("bad wallet id {wallet:?}: {e}"))?;
    let role_id = role
        .trim()
        .parse()
        .map_err(|e| format!("bad role id {role:?}: {e}"))?;
    Ok(RoleAssignment { wallet_id, role_id })
}

/// Parses a positive number of minutes into a look-back window.
fn parse_window(raw: &str) -> std::result::Result<TimeDelta, String> {
    let minutes: i64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("bad minute count {raw:?}: {e}"))?;
    if minutes <= 0 {
        return Err(format!("minutes must be positive, got {minutes}"));
    }
    TimeDelta::try_minutes(minutes)
        .filter(|window| Utc::now().checked_sub_signed(*window).is_some())
        .ok_or_else(|| format!("{minutes} minutes reaches past the earliest timestamp"))
}

fn print_entry(entry: &LedgerEntryModel) {
    let reason = entry
        .full_reason()
        .map_or_else(|| entry.reason.as_str().to_string(), |r| r.to_string());
    let from = entry
        .sender_wallet_id
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    let to = entry
        .recipient_wallet_id
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    println!(
        "#{:<6} {} {:>12.2} {:>6} -> {:<6} {}",
        entry.id,
        entry.created_at.format("%Y-%m-%d %H:%M:%S"),
        entry.amount,
        from,
        to,
        reason
    );
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Load settings
    let config = settings::load_config_or_default(&cli.config)
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and make sure the tables exist
    let db = database::create_connection(&config.database)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    let ledger = Ledger::with_lock_timeout(db, config.ledger.lock_timeout());

    match cli.command {
        Command::Init => {}
        Command::OpenWallet { balance } => {
            let wallet = wallet::create_wallet(ledger.connection(), balance).await?;
            println!("Opened wallet {} with balance {:.2}", wallet.id, wallet.balance);
        }
        Command::Balance { wallet_id } => {
            println!("{:.2}", ledger.balance(wallet_id).await?);
        }
        Command::Grant { wallet_id, amount } => {
            let entry = ledger.system_credit(wallet_id, amount).await?;
            print_entry(&entry);
        }
        Command::History {
            wallet_id,
            limit,
            offset,
        } => {
            let total = history::count_by_wallet(ledger.connection(), wallet_id).await?;
            let entries =
                history::list_by_wallet(ledger.connection(), wallet_id, limit, offset).await?;
            println!("{} of {} entries for wallet {}", entries.len(), total, wallet_id);
            entries.iter().for_each(print_entry);
        }
        Command::Recent { window } => {
            let since = Utc::now()
                .checked_sub_signed(window)
                .unwrap_or(DateTime::<Utc>::MIN_UTC);
            history::list_since(ledger.connection(), since)
                .await?
                .iter()
                .for_each(print_entry);
        }
        Command::Stipends { assignments } => {
            let result = ledger
                .pay_weekly_stipends(&assignments, &config.payouts)
                .await;
            result.paid.iter().for_each(print_entry);
            for assignment in &result.skipped {
                println!(
                    "skipped wallet {} role {}: no stipend configured",
                    assignment.wallet_id, assignment.role_id
                );
            }
            for (assignment, e) in &result.failed {
                println!(
                    "failed wallet {} role {}: {}",
                    assignment.wallet_id, assignment.role_id, e
                );
            }
            if !result.failed.is_empty() {
                error!("{} stipend(s) failed", result.failed.len());
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
