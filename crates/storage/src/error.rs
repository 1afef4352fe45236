//! Typed error enum for the storage layer.
//!
//! Step failures keep the [`MigrationError`] they came from as their source so
//! callers can match on the schema-level cause.

use schemalog_core::{LedgerError, MigrationError, MigrationId, SchemaError};
use thiserror::Error;

use crate::Direction;

#[derive(Debug, Error)]
pub enum StorageError {
    /// SQL / connection failure outside of a migration step.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// A migration step failed; its transaction was rolled back.
    #[error("migration {id} ({name}) failed running {direction}: {source}")]
    Step {
        id: MigrationId,
        name: String,
        direction: Direction,
        #[source]
        source: MigrationError,
    },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Target is neither the ledger base nor a registered step.
    #[error("unknown migration target: {0}")]
    UnknownTarget(MigrationId),

    /// The database records a step the ledger does not know about.
    #[error("database records migration {0}, which is not in the ledger")]
    UnknownApplied(MigrationId),

    #[error("database is already initialized: table {0} exists")]
    AlreadyInitialized(String),
}

impl StorageError {
    /// The schema-level cause of a failed step, if any.
    pub fn schema_error(&self) -> Option<&SchemaError> {
        match self {
            Self::Step { source, .. } => source.as_schema(),
            Self::Schema(e) => Some(e),
            _ => None,
        }
    }

    /// Whether this error is a constraint violation raised by an add.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Step { source: MigrationError::ConstraintViolation(_), .. })
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
