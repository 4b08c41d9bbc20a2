//! Command-line entry point.
//!
//! Usage:
//!   wajir-hmis [seed] [--database <path>] [--rng-seed <n>] [--today <YYYY-MM-DD>]
//!   wajir-hmis stats [--database <path>] [--today <YYYY-MM-DD>]

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use wajir_hmis::config::{self, SeedConfig};
use wajir_hmis::db::{fetch_dashboard_stats, open_database, DatabaseError};
use wajir_hmis::seed::{run_seed, SeedError};

#[derive(Parser)]
#[command(name = "wajir-hmis", version, about = "Wajir County HMIS database seeder")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Clone)]
struct CommonArgs {
    /// SQLite database file. Defaults to ~/WajirHMIS/wajir_hmis.db
    #[arg(long, env = "WAJIR_HMIS_DATABASE", global = true)]
    database: Option<PathBuf>,

    /// Seed for the random generator
    #[arg(long, global = true)]
    rng_seed: Option<u64>,

    /// Reference date for all relative dates (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Clear the database and load the full synthetic dataset
    Seed,
    /// Print dashboard statistics as JSON
    Stats,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error("Could not encode statistics: {0}")]
    Json(#[from] serde_json::Error),
}

fn seed(args: &CommonArgs) -> Result<(), CliError> {
    let path = args.database.clone().unwrap_or_else(config::default_database_path);
    let mut seed_config = SeedConfig::default();
    if let Some(rng_seed) = args.rng_seed {
        seed_config.rng_seed = rng_seed;
    }
    if let Some(today) = args.today {
        seed_config.today = today;
    }

    tracing::info!(path = %path.display(), "Seeding {}", config::APP_NAME);
    let conn = open_database(&path)?;
    let summary = run_seed(&conn, &seed_config)?;

    println!("{summary}");
    println!("Database seeded successfully at {}", path.display());
    println!(
        "All seeded accounts use the password '{}'",
        config::DEFAULT_SEED_PASSWORD
    );
    Ok(())
}

fn stats(args: &CommonArgs) -> Result<(), CliError> {
    let path = args.database.clone().unwrap_or_else(config::default_database_path);
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let conn = open_database(&path)?;
    let stats = fetch_dashboard_stats(&conn, today)?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn main() -> ExitCode {
    wajir_hmis::init_tracing();
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Command::Seed) {
        Command::Seed => seed(&cli.common),
        Command::Stats => stats(&cli.common),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
