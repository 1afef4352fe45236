//! Migration runner.
//!
//! Applies ledger steps to a SQLite database one at a time. Each step runs
//! in its own `BEGIN IMMEDIATE` transaction together with its applied-state
//! row, so a step either lands completely or not at all, and SQLite's write
//! lock keeps a second process from applying the same step concurrently.

mod applied;
mod column_helpers;
mod mutator;

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use schemalog_core::{Ledger, Migration, MigrationId};
use serde::Serialize;

pub use applied::{AppliedMigration, applied_migrations};
pub(crate) use applied::{APPLIED_TABLE, ensure_table};
pub use column_helpers::{LiveColumn, column_exists, table_columns, table_exists};
pub use mutator::SqliteMutator;

use crate::{Result, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        })
    }
}

/// One ledger step and whether the database has it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub id: MigrationId,
    pub name: String,
    pub applied_at: Option<DateTime<Utc>>,
}

impl MigrationStatus {
    pub fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }
}

/// Outcome of a `migrate` or `rollback` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub direction: Direction,
    pub from: MigrationId,
    pub to: MigrationId,
    pub steps: Vec<MigrationId>,
}

#[derive(Debug)]
pub struct Migrator {
    ledger: Ledger,
}

impl Migrator {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Ids recorded as applied, all of which must be known to the ledger.
    fn applied_ids(&self, conn: &Connection) -> Result<BTreeSet<MigrationId>> {
        let mut ids = BTreeSet::new();
        for row in applied_migrations(conn)? {
            if self.ledger.get(row.id).is_none() {
                return Err(StorageError::UnknownApplied(row.id));
            }
            ids.insert(row.id);
        }
        Ok(ids)
    }

    /// Highest applied step, or the ledger base when nothing is recorded.
    ///
    /// # Errors
    /// [`StorageError::UnknownApplied`] if the database records a step the
    /// ledger does not contain.
    pub fn current_id(&self, conn: &Connection) -> Result<MigrationId> {
        Ok(self.applied_ids(conn)?.last().copied().unwrap_or_else(|| self.ledger.base_id()))
    }

    /// Every ledger step with its applied state.
    ///
    /// # Errors
    /// Returns error if the applied-state table cannot be read.
    pub fn status(&self, conn: &Connection) -> Result<Vec<MigrationStatus>> {
        let applied = applied_migrations(conn)?;
        if let Some(unknown) = applied.iter().find(|a| self.ledger.get(a.id).is_none()) {
            return Err(StorageError::UnknownApplied(unknown.id));
        }
        Ok(self
            .ledger
            .steps()
            .map(|step| MigrationStatus {
                id: step.id(),
                name: step.name().to_owned(),
                applied_at: applied.iter().find(|a| a.id == step.id()).map(|a| a.applied_at),
            })
            .collect())
    }

    /// Applies every unapplied step up to `target` (default: ledger head).
    ///
    /// # Errors
    /// [`StorageError::UnknownTarget`] for a target outside the ledger;
    /// [`StorageError::Step`] for the first failing step, after which no
    /// further steps run.
    pub fn migrate(&self, conn: &mut Connection, target: Option<MigrationId>) -> Result<RunReport> {
        let target = self.resolve_target(target)?;
        let applied = self.applied_ids(conn)?;
        let from = applied.last().copied().unwrap_or_else(|| self.ledger.base_id());

        tracing::info!("Database migration state: {} (target: {})", from, target);

        let mut steps = Vec::new();
        for step in self.ledger.range(self.ledger.base_id(), target) {
            if applied.contains(&step.id()) {
                continue;
            }
            tracing::info!("Running migration {}: {}", step.id(), step.name());
            if apply(conn, step, Direction::Forward)? {
                steps.push(step.id());
            }
        }

        let to = self.current_id(conn)?;
        tracing::info!(
            "Database schema up to date ({} step(s) applied, now at {})",
            steps.len(),
            to
        );
        Ok(RunReport { direction: Direction::Forward, from, to, steps })
    }

    /// Reverts applied steps above `target`, newest first.
    ///
    /// # Errors
    /// Same as [`Migrator::migrate`].
    pub fn rollback(&self, conn: &mut Connection, target: MigrationId) -> Result<RunReport> {
        let target = self.resolve_target(Some(target))?;
        let applied = self.applied_ids(conn)?;
        let from = applied.last().copied().unwrap_or_else(|| self.ledger.base_id());

        tracing::info!("Rolling back from {} to {}", from, target);

        let mut steps = Vec::new();
        for step in self.ledger.range(target, from).rev() {
            if !applied.contains(&step.id()) {
                continue;
            }
            tracing::info!("Reverting migration {}: {}", step.id(), step.name());
            if apply(conn, step, Direction::Backward)? {
                steps.push(step.id());
            }
        }

        let to = self.current_id(conn)?;
        tracing::info!("Rollback complete ({} step(s) reverted, now at {})", steps.len(), to);
        Ok(RunReport { direction: Direction::Backward, from, to, steps })
    }

    /// Reverts the newest `count` applied steps.
    ///
    /// # Errors
    /// Same as [`Migrator::rollback`].
    pub fn rollback_steps(&self, conn: &mut Connection, count: usize) -> Result<RunReport> {
        let applied = self.applied_ids(conn)?;
        let target = applied
            .iter()
            .rev()
            .nth(count)
            .copied()
            .unwrap_or_else(|| self.ledger.base_id());
        self.rollback(conn, target)
    }

    fn resolve_target(&self, target: Option<MigrationId>) -> Result<MigrationId> {
        match target {
            None => Ok(self.ledger.head_id()),
            Some(id) if self.ledger.contains(id) => Ok(id),
            Some(id) => Err(StorageError::UnknownTarget(id)),
        }
    }
}

/// Runs one step and its bookkeeping in a single immediate transaction.
///
/// Applied state is read again under the write lock: another runner may have
/// landed the step while this one waited. Returns false when the step was
/// already in the requested state and nothing ran.
fn apply(conn: &mut Connection, step: &dyn Migration, direction: Direction) -> Result<bool> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    ensure_table(&tx)?;
    let recorded = applied::is_recorded(&tx, step.id())?;
    if recorded == (direction == Direction::Forward) {
        let state = match direction {
            Direction::Forward => "applied",
            Direction::Backward => "reverted",
        };
        tracing::info!("Migration {} already {} by another runner, skipping", step.id(), state);
        return Ok(false);
    }
    {
        let mut mutator = SqliteMutator::new(&tx);
        let outcome = match direction {
            Direction::Forward => step.forward(&mut mutator),
            Direction::Backward => step.backward(&mut mutator),
        };
        outcome.map_err(|source| StorageError::Step {
            id: step.id(),
            name: step.name().to_owned(),
            direction,
            source,
        })?;
    }
    match direction {
        Direction::Forward => applied::record(&tx, step.id(), step.name())?,
        Direction::Backward => applied::remove(&tx, step.id())?,
    }
    tx.commit()?;
    Ok(true)
}
