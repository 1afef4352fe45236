//! `SQLite` storage handle.
//!
//! Owns the connection pool and exposes the runner, bootstrap and
//! introspection operations over pooled connections.

mod drift;

use std::path::Path;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use schemalog_core::env_config::{
    BUSY_TIMEOUT_VAR, DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_POOL_SIZE, POOL_SIZE_VAR,
    env_parse_with_default,
};
use schemalog_core::{MigrationId, Schema, validate_identifier};

pub use drift::{Drift, DriftReport};

use crate::ddl::{create_table_sql, index_statements};
use crate::runner::{
    APPLIED_TABLE, AppliedMigration, LiveColumn, MigrationStatus, Migrator, RunReport,
    applied_migrations, ensure_table, table_columns, table_exists,
};
use crate::{Result, StorageError};

/// Type alias for pooled connection
pub(crate) type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Connection settings, normally read from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageConfig {
    pub busy_timeout_ms: u32,
    pub pool_size: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS, pool_size: DEFAULT_POOL_SIZE }
    }
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            busy_timeout_ms: env_parse_with_default(BUSY_TIMEOUT_VAR, DEFAULT_BUSY_TIMEOUT_MS),
            pool_size: env_parse_with_default(POOL_SIZE_VAR, DEFAULT_POOL_SIZE).max(1),
        }
    }
}

/// Main storage struct wrapping `SQLite` connection pool
#[derive(Clone, Debug)]
pub struct Storage {
    pool: Pool<SqliteConnectionManager>,
}

impl Storage {
    /// Opens (creating if needed) the database at `db_path` with settings
    /// from the environment.
    ///
    /// # Errors
    /// Returns error if the pool cannot be built.
    pub fn new(db_path: &Path) -> Result<Self> {
        Self::with_config(db_path, StorageConfig::from_env())
    }

    /// # Errors
    /// Returns error if the pool cannot be built.
    pub fn with_config(db_path: &Path, config: StorageConfig) -> Result<Self> {
        let busy_timeout = Duration::from_millis(u64::from(config.busy_timeout_ms));
        let manager = SqliteConnectionManager::file(db_path).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            conn.pragma_update(None, "journal_mode", "WAL")?;
            Ok(())
        });
        let pool = Pool::builder().max_size(config.pool_size).build(manager)?;
        tracing::debug!(path = %db_path.display(), ?config, "opened database");
        Ok(Self { pool })
    }

    /// Get a connection from the pool
    pub(crate) fn conn(&self) -> Result<PooledConn> {
        Ok(self.pool.get()?)
    }

    /// Creates every table of `schema` in an empty database.
    ///
    /// # Errors
    /// [`StorageError::AlreadyInitialized`] if any of the tables exists;
    /// nothing is created in that case.
    pub fn bootstrap(&self, schema: &Schema) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for table in schema.tables() {
            validate_identifier(&table.name)?;
            if table_exists(&tx, &table.name)? {
                return Err(StorageError::AlreadyInitialized(table.name.clone()));
            }
        }
        for table in schema.tables() {
            tracing::info!("Creating table {}", table.name);
            tx.execute_batch(&create_table_sql(table))?;
            for sql in index_statements(table) {
                tx.execute(&sql, [])?;
            }
        }
        ensure_table(&tx)?;
        tx.commit()?;
        Ok(())
    }

    /// Whether any table other than the bookkeeping table exists.
    ///
    /// # Errors
    /// Returns error if the catalog query fails.
    pub fn is_empty(&self) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master
              WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name != ?1",
            [APPLIED_TABLE],
            |row| row.get(0),
        )?;
        Ok(count == 0)
    }

    /// Live columns of `table`, or `None` if it does not exist.
    ///
    /// # Errors
    /// Returns error if the catalog query fails.
    pub fn live_columns(&self, table: &str) -> Result<Option<Vec<LiveColumn>>> {
        let conn = self.conn()?;
        if !table_exists(&conn, table)? {
            return Ok(None);
        }
        Ok(Some(table_columns(&conn, table)?))
    }

    /// # Errors
    /// Returns error if the applied-state table cannot be read.
    pub fn applied(&self) -> Result<Vec<AppliedMigration>> {
        let conn = self.conn()?;
        Ok(applied_migrations(&conn)?)
    }

    /// # Errors
    /// See [`Migrator::status`].
    pub fn status(&self, migrator: &Migrator) -> Result<Vec<MigrationStatus>> {
        let conn = self.conn()?;
        migrator.status(&conn)
    }

    /// # Errors
    /// See [`Migrator::current_id`].
    pub fn current_id(&self, migrator: &Migrator) -> Result<MigrationId> {
        let conn = self.conn()?;
        migrator.current_id(&conn)
    }

    /// # Errors
    /// See [`Migrator::migrate`].
    pub fn migrate(&self, migrator: &Migrator, target: Option<MigrationId>) -> Result<RunReport> {
        let mut conn = self.conn()?;
        migrator.migrate(&mut conn, target)
    }

    /// # Errors
    /// See [`Migrator::rollback`].
    pub fn rollback(&self, migrator: &Migrator, target: MigrationId) -> Result<RunReport> {
        let mut conn = self.conn()?;
        migrator.rollback(&mut conn, target)
    }

    /// # Errors
    /// See [`Migrator::rollback_steps`].
    pub fn rollback_steps(&self, migrator: &Migrator, count: usize) -> Result<RunReport> {
        let mut conn = self.conn()?;
        migrator.rollback_steps(&mut conn, count)
    }

    /// Compares the live database with the ledger snapshot at the last
    /// applied step. Read-only.
    ///
    /// # Errors
    /// Returns error if applied state or the live catalog cannot be read.
    pub fn check(&self, migrator: &Migrator) -> Result<DriftReport> {
        let conn = self.conn()?;
        let at = migrator.current_id(&conn)?;
        let expected = migrator.ledger().snapshot_at(at)?;
        let issues = drift::compare(&conn, &expected)?;
        if !issues.is_empty() {
            tracing::warn!("{} schema drift issue(s) at migration {}", issues.len(), at);
        }
        Ok(DriftReport { at, issues })
    }
}
