use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use crate::crypto::PBKDF2_ITERATIONS;

/// Application-level constants
pub const APP_NAME: &str = "Wajir HMIS";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of the SQLite database inside the data directory.
pub const DATABASE_FILE: &str = "wajir_hmis.db";

/// Password shared by every seeded account.
pub const DEFAULT_SEED_PASSWORD: &str = "password123";

/// Fixed RNG seed so that repeated runs produce the same dataset.
pub const DEFAULT_RNG_SEED: u64 = 2019;

/// Get the application data directory.
/// ~/WajirHMIS/ on all platforms; falls back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("WajirHMIS")
}

pub fn default_database_path() -> PathBuf {
    app_data_dir().join(DATABASE_FILE)
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,wajir_hmis=info"
}

/// Inputs to a seed run. Everything random flows from `rng_seed` and
/// everything date-relative from `today`.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub rng_seed: u64,
    pub today: NaiveDate,
    pub password: String,
    pub password_iterations: u32,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            rng_seed: DEFAULT_RNG_SEED,
            today: Local::now().date_naive(),
            password: DEFAULT_SEED_PASSWORD.to_string(),
            password_iterations: PBKDF2_ITERATIONS,
        }
    }
}
