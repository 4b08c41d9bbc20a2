//! Seed-specific error types.
//!
//! Every failure aborts the run; the runner rolls the transaction back.

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Password hashing failed: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Nothing to choose from: no {what} have been seeded")]
    EmptyCollection { what: &'static str },

    #[error("Invalid calendar date: {0}")]
    InvalidDate(String),
}

impl From<rusqlite::Error> for SeedError {
    fn from(err: rusqlite::Error) -> Self {
        SeedError::Database(err.into())
    }
}
