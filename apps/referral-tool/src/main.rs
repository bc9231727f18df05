//! CLI tool for inspecting and committing referral table changes.
//!
//! Provides commands for:
//! - Creating (and seeding) the referral table
//! - Listing the current snapshot
//! - Committing a grid change-set file
//! - Printing the payment mode / TPA partner breakdown

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use referral_core::changeset::ChangeSet;
use referral_core::config::TrackerConfig;
use referral_core::error::ReconcileError;
use referral_core::persistence::{open_snapshot, FileStore};
use referral_core::report::tpa_breakdown;
use referral_core::session::EditSession;
use referral_core::store::Snapshot;

/// Command-line arguments for the referral tool.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Data directory holding the table file
    #[arg(long, default_value = "./data")]
    data_dir: String,

    /// Do not insert sample referrals when creating the table
    #[arg(long)]
    no_seed: bool,

    /// Maximum retry attempts for transient I/O errors
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the table file if it does not exist
    Init,
    /// Print all referrals
    List {
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply a change-set JSON file against the current table
    Commit {
        /// Path to a file shaped like {"edited_rows", "added_rows", "deleted_rows"}
        changes: PathBuf,
    },
    /// Count referrals by payment mode and TPA partner
    Breakdown {
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = TrackerConfig {
        data_dir: PathBuf::from(&args.data_dir),
        seed_on_create: !args.no_seed,
        persistence_max_retries: args.max_retries,
        ..Default::default()
    };

    match args.command {
        Command::Init => {
            let session = open_session(&config)?;
            let verb = if session.store().was_created() {
                "Created"
            } else {
                "Found existing"
            };
            println!(
                "{} {} ({} referrals)",
                verb,
                session.store().path().display(),
                session.snapshot().len()
            );
        }
        Command::List { json } => {
            let snapshot = read_only_snapshot(&config);
            if json {
                println!("{}", serde_json::to_string_pretty(snapshot.rows())?);
            } else {
                print_table(&snapshot);
            }
        }
        Command::Commit { changes } => {
            let text = fs::read_to_string(&changes)
                .with_context(|| format!("Failed to read {}", changes.display()))?;
            let change_set: ChangeSet = serde_json::from_str(&text)
                .with_context(|| format!("Invalid change-set in {}", changes.display()))?;
            if !change_set.has_uncommitted_changes() {
                println!("No changes to commit");
                return Ok(());
            }

            let mut session = open_session(&config)?;
            session.replace_pending(change_set);
            let report = match session.commit() {
                Ok(report) => report,
                Err(e @ ReconcileError::StoreUnavailable { .. }) => {
                    return Err(e)
                        .context("Changes were committed but the table could not be re-read");
                }
                Err(e) => return Err(e).context("Commit failed; no changes were applied"),
            };

            println!(
                "Committed: {} updated, {} inserted, {} deleted",
                report.updated,
                report.inserted.len(),
                report.deleted
            );
            for row in &report.inserted {
                println!("  new id {} ({})", row.id, cell(&row.fields.referral_id));
            }
        }
        Command::Breakdown { json } => {
            let rows = tpa_breakdown(&read_only_snapshot(&config));
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("{:<10}  {:<10}  {:>5}", "payment", "tpa", "count");
                for row in rows {
                    println!(
                        "{:<10}  {:<10}  {:>5}",
                        row.mode_of_payment, row.tpa_partner, row.count
                    );
                }
            }
        }
    }

    Ok(())
}

/// Opens the table for writing; an unreadable table is fatal here.
fn open_session(config: &TrackerConfig) -> Result<EditSession<FileStore>> {
    let store = FileStore::open(config)
        .with_context(|| format!("Failed to open {}", config.table_path().display()))?;
    let session = EditSession::open(store);
    if let Some(warning) = session.warning() {
        tracing::warn!("{}", warning);
    }
    Ok(session)
}

/// Snapshot for display commands; falls back to an empty table with a warning.
fn read_only_snapshot(config: &TrackerConfig) -> Snapshot {
    open_snapshot(config).0
}

fn cell(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn print_table(snapshot: &Snapshot) {
    println!(
        "{:>5}  {:<8}  {:<18}  {:>3}  {:<12}  {:<6}  {:<7}",
        "id", "referral", "patient", "age", "mobile", "tpa", "payment"
    );
    for row in snapshot {
        let fields = &row.fields;
        let age = fields
            .patient_age
            .map(|age| age.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>5}  {:<8}  {:<18}  {:>3}  {:<12}  {:<6}  {:<7}",
            row.id,
            cell(&fields.referral_id),
            cell(&fields.patient_name),
            age,
            cell(&fields.patient_mobile),
            cell(&fields.tpa_partner),
            cell(&fields.mode_of_payment)
        );
    }
    println!("{} referrals", snapshot.len());
}
