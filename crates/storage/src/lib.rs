//! Storage layer for schemalog
//!
//! SQLite backend for the schema ledger: a [`SqliteMutator`] that applies
//! column mutations with `ALTER TABLE`, a [`Migrator`] that runs ledger steps
//! transactionally and records applied state, and a pooled [`Storage`]
//! handle with bootstrap and drift checking.

mod ddl;
mod error;
mod runner;
mod storage;
#[cfg(test)]
mod tests;

pub use error::{Result, StorageError};
pub use runner::{
    AppliedMigration, Direction, LiveColumn, MigrationStatus, Migrator, RunReport, SqliteMutator,
    applied_migrations, column_exists, table_columns, table_exists,
};
pub use storage::{Drift, DriftReport, Storage, StorageConfig};
