//! `status`, `migrate` and `rollback`.

use std::path::PathBuf;

use anyhow::Result;
use schemalog_core::{MigrationId, SchemaError};
use schemalog_storage::StorageError;

use super::load_migrator;
use crate::open_storage;

pub(crate) fn run_status(db: Option<PathBuf>) -> Result<()> {
    let storage = open_storage(db)?;
    let migrator = load_migrator()?;
    let status = storage.status(&migrator)?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

pub(crate) fn run_migrate(db: Option<PathBuf>, to: Option<MigrationId>) -> Result<()> {
    let storage = open_storage(db)?;
    let migrator = load_migrator()?;
    let report = storage.migrate(&migrator, to).map_err(explain)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) fn run_rollback(
    db: Option<PathBuf>,
    to: Option<MigrationId>,
    steps: Option<usize>,
) -> Result<()> {
    let storage = open_storage(db)?;
    let migrator = load_migrator()?;
    let report = match to {
        Some(target) => storage.rollback(&migrator, target),
        None => storage.rollback_steps(&migrator, steps.unwrap_or(1)),
    }
    .map_err(explain)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Adds a hint for step failures the operator can act on.
fn explain(err: StorageError) -> anyhow::Error {
    let hint = if err.is_constraint_violation() {
        Some("existing rows cannot satisfy the restored column; fix the data and retry")
    } else {
        match err.schema_error() {
            Some(SchemaError::ColumnNotFound { .. } | SchemaError::ColumnExists { .. }) => {
                Some("live schema disagrees with recorded state; run `schemalog check`")
            },
            _ => None,
        }
    };
    match hint {
        Some(hint) => anyhow::Error::new(err).context(hint),
        None => err.into(),
    }
}
