pub mod repository;
pub mod schema;
pub mod sqlite;

pub use repository::*;
pub use schema::*;
pub use sqlite::*;

use rusqlite::ffi;
use thiserror::Error;

use crate::models::ValidationError;

/// Which storage-level rule rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    Check,
    PrimaryKey,
    Other,
}

/// SQLite reports an immediate `ON DELETE RESTRICT` rejection under the
/// trigger code; only the message identifies it as a foreign key.
const FOREIGN_KEY_MESSAGE: &str = "FOREIGN KEY constraint failed";

impl ConstraintKind {
    fn classify(code: i32, message: Option<&str>) -> Self {
        match code {
            ffi::SQLITE_CONSTRAINT_UNIQUE => Self::Unique,
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Self::ForeignKey,
            ffi::SQLITE_CONSTRAINT_TRIGGER if message == Some(FOREIGN_KEY_MESSAGE) => {
                Self::ForeignKey
            }
            ffi::SQLITE_CONSTRAINT_NOTNULL => Self::NotNull,
            ffi::SQLITE_CONSTRAINT_CHECK => Self::Check,
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Self::PrimaryKey,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unique => "unique",
            Self::ForeignKey => "foreign key",
            Self::NotNull => "not null",
            Self::Check => "check",
            Self::PrimaryKey => "primary key",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[source] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated ({kind}): {message}")]
    ConstraintViolation { kind: ConstraintKind, message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid stored value in column {column}: {reason}")]
    InvalidColumn { column: String, reason: String },
}

impl DatabaseError {
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            Self::ConstraintViolation { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DatabaseError::ConstraintViolation {
                    kind: ConstraintKind::classify(e.extended_code, msg.as_deref()),
                    message: msg.clone().unwrap_or_else(|| e.to_string()),
                }
            }
            _ => DatabaseError::Sqlite(err),
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        DatabaseError::InvalidColumn {
            column: "json".into(),
            reason: err.to_string(),
        }
    }
}
