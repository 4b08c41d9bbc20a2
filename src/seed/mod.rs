//! Ordered synthetic-data generator for the county HMIS.
//!
//! A run wipes every data table and repopulates it stage by stage. Later
//! stages draw on the rows produced by earlier ones through
//! [`SeedContext`], so the stage order below is fixed. The whole run is one
//! SQLite transaction: a failing stage leaves the database as it was.

pub mod access;
pub mod activity;
pub mod context;
pub mod derive;
pub mod error;
pub mod facilities;
pub mod geography;
pub mod households;
pub mod lab;
pub mod maternal;
pub mod programs;
pub mod referral;
pub mod staff;
pub mod supply;
pub mod surveillance;

use std::fmt;

use rusqlite::Connection;

use crate::config::SeedConfig;
use crate::db::{clear_all, table_counts, Table};

pub use context::SeedContext;
pub use error::SeedError;

type Stage = fn(&Connection, &mut SeedContext) -> Result<(), SeedError>;

/// Every stage in execution order, with the name used in progress logs.
const STAGES: [(&str, Stage); 29] = [
    ("geography", geography::seed_geography),
    ("roles", access::seed_roles),
    ("users", access::seed_users),
    ("facilities", facilities::seed_facilities),
    ("community units", facilities::seed_community_units),
    ("CHVs", facilities::seed_chvs),
    ("households", households::seed_households),
    ("persons", households::seed_persons),
    ("commodities, suppliers and stock", supply::seed_supply),
    ("programs and indicators", programs::seed_programs),
    ("staff profiles", staff::seed_staff_profiles),
    ("pregnancies", maternal::seed_pregnancies),
    ("ANC visits", maternal::seed_anc_visits),
    ("immunizations", maternal::seed_immunizations),
    ("surveillance reports", surveillance::seed_surveillance_reports),
    ("mortality reports", surveillance::seed_mortality_reports),
    ("trainings", staff::seed_trainings),
    ("household visits", activity::seed_household_visits),
    ("outreach events", activity::seed_outreach_events),
    ("screenings", activity::seed_screenings),
    ("referrals", referral::seed_referrals),
    ("referral follow-ups", referral::seed_referral_follow_ups),
    ("PNC visits", maternal::seed_pnc_visits),
    ("training attendance", staff::seed_training_attendance),
    ("monthly reports", programs::seed_monthly_reports),
    ("campaigns", programs::seed_campaigns),
    ("stock transactions", supply::seed_stock_transactions),
    ("procurement", supply::seed_procurement),
    ("lab orders and results", lab::seed_lab),
];

/// Row counts per table after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub counts: Vec<(Table, i64)>,
}

impl SeedSummary {
    pub fn count(&self, table: Table) -> i64 {
        self.counts
            .iter()
            .find(|(t, _)| *t == table)
            .map_or(0, |(_, n)| *n)
    }

    pub fn total_rows(&self) -> i64 {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (table, rows) in &self.counts {
            writeln!(f, "  {:<28} {rows:>6}", table.name())?;
        }
        write!(f, "  {:<28} {:>6}", "total", self.total_rows())
    }
}

/// Clear all data and run every stage inside a single transaction.
pub fn run_seed(conn: &Connection, config: &SeedConfig) -> Result<SeedSummary, SeedError> {
    let tx = conn.unchecked_transaction()?;
    let mut ctx = SeedContext::new(config)?;

    clear_all(&tx)?;
    for (name, stage) in STAGES {
        tracing::debug!(stage = name, "Seeding");
        stage(&tx, &mut ctx)?;
    }

    let counts = table_counts(&tx)?;
    tx.commit()?;

    let summary = SeedSummary { counts };
    tracing::info!(
        rng_seed = config.rng_seed,
        today = %config.today,
        rows = summary.total_rows(),
        "Seed run complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::open_memory_database;

    fn config() -> SeedConfig {
        SeedConfig {
            rng_seed: 7,
            today: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            password: "password123".into(),
            password_iterations: 1_000,
        }
    }

    #[test]
    fn mandatory_stages_run_first_in_order() {
        let names: Vec<&str> = STAGES.iter().map(|(n, _)| *n).collect();
        let referrals = names.iter().position(|n| *n == "referrals").unwrap();
        assert_eq!(names[0], "geography");
        assert_eq!(names[referrals - 1], "screenings");
        assert!(names.iter().position(|n| *n == "PNC visits").unwrap() > referrals);
    }

    #[test]
    fn run_populates_core_tables() {
        let conn = open_memory_database().unwrap();
        let summary = run_seed(&conn, &config()).unwrap();
        assert_eq!(summary.count(Table::Counties), 1);
        assert_eq!(summary.count(Table::SubCounties), 6);
        assert_eq!(summary.count(Table::Wards), 24);
        assert_eq!(summary.count(Table::Facilities), 25);
        for table in [
            Table::Households,
            Table::Persons,
            Table::Stocks,
            Table::HouseholdVisits,
            Table::StockTransactions,
            Table::LabTestOrders,
        ] {
            assert!(summary.count(table) > 0, "{} is empty", table.name());
        }
    }

    #[test]
    fn failed_stage_rolls_back() {
        let conn = open_memory_database().unwrap();
        let first = run_seed(&conn, &config()).unwrap();

        conn.execute_batch(
            "CREATE TEMP TRIGGER block_referrals BEFORE INSERT ON referrals
             BEGIN SELECT RAISE(ABORT, 'referrals blocked'); END;",
        )
        .unwrap();
        let mut second = config();
        second.rng_seed = 8;
        assert!(matches!(
            run_seed(&conn, &second),
            Err(SeedError::Database(_))
        ));

        assert_eq!(table_counts(&conn).unwrap(), first.counts);
    }

    #[test]
    fn zero_iterations_rejected_before_clearing() {
        let conn = open_memory_database().unwrap();
        let first = run_seed(&conn, &config()).unwrap();
        let mut broken = config();
        broken.password_iterations = 0;
        assert!(matches!(run_seed(&conn, &broken), Err(SeedError::Crypto(_))));
        assert_eq!(table_counts(&conn).unwrap(), first.counts);
    }

    #[test]
    fn summary_lists_totals() {
        let summary = SeedSummary {
            counts: vec![(Table::Counties, 1), (Table::Wards, 24)],
        };
        assert_eq!(summary.total_rows(), 25);
        assert_eq!(summary.count(Table::Roles), 0);
        assert!(summary.to_string().contains("wards"));
    }
}
