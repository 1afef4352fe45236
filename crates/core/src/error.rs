use std::result::Result as StdResult;

use thiserror::Error;

use crate::MigrationId;

/// Structural errors: a table or column is missing, already present, or the
/// backend refused the change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("table already exists: {0}")]
    TableExists(String),

    #[error("column not found: {table}.{column}")]
    ColumnNotFound { table: String, column: String },

    #[error("column already exists: {table}.{column}")]
    ColumnExists { table: String, column: String },

    /// Storage rejected the change, e.g. the column is referenced by an index
    /// or a foreign key.
    #[error("storage rejected change to {table}.{column}: {reason}")]
    Rejected { table: String, column: String, reason: String },

    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),
}

/// Existing rows cannot satisfy the constraints of a column being added.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("constraint violation on {table}.{column}: {reason}")]
pub struct ConstraintViolationError {
    pub table: String,
    pub column: String,
    pub reason: String,
}

/// Failure of a single migration step. Surfaced to the operator unmodified.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    ConstraintViolation(#[from] ConstraintViolationError),

    /// Backend failure not attributable to the schema shape (I/O, locking).
    #[error("storage error: {0}")]
    Storage(String),
}

impl MigrationError {
    /// The underlying schema error, if this is one.
    pub fn as_schema(&self) -> Option<&SchemaError> {
        match self {
            Self::Schema(e) => Some(e),
            _ => None,
        }
    }
}

/// The diff log is malformed.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("migration ids must be strictly increasing: {previous} then {next}")]
    OutOfOrder { previous: MigrationId, next: MigrationId },

    #[error("migration {id} ({name}) does not unwind from the current schema: {source}")]
    Unwind {
        id: MigrationId,
        name: String,
        #[source]
        source: MigrationError,
    },

    #[error("migration {id} ({name}) does not replay onto its base snapshot: {source}")]
    Replay {
        id: MigrationId,
        name: String,
        #[source]
        source: MigrationError,
    },

    #[error("base id {base} must be lower than the first migration id {first}")]
    BaseAfterFirst { base: MigrationId, first: MigrationId },

    #[error("replaying the log up to {head} does not reproduce the current schema")]
    Diverged { head: MigrationId },

    #[error("unknown migration id: {0}")]
    UnknownId(MigrationId),
}

pub type Result<T> = StdResult<T, MigrationError>;
