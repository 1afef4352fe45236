//! `schema` and `check`.

use std::path::PathBuf;

use anyhow::Result;
use schemalog_core::MigrationId;

use super::load_migrator;
use crate::open_storage;

/// Prints a ledger snapshot. Needs no database.
pub(crate) fn run_schema(at: Option<MigrationId>, table: Option<&str>) -> Result<()> {
    let migrator = load_migrator()?;
    let ledger = migrator.ledger();
    let snapshot = ledger.snapshot_at(at.unwrap_or_else(|| ledger.head_id()))?;
    let snapshot = match table {
        Some(name) => {
            let only = snapshot.only(name);
            if only.is_empty() {
                anyhow::bail!("unknown table: {name}");
            }
            only
        },
        None => snapshot,
    };
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

pub(crate) fn run_check(db: Option<PathBuf>) -> Result<()> {
    let storage = open_storage(db)?;
    let migrator = load_migrator()?;
    let report = storage.check(&migrator)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.is_clean() {
        anyhow::bail!("{} schema drift issue(s) found", report.issues.len());
    }
    Ok(())
}
