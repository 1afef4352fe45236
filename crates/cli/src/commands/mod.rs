pub(crate) mod init;
pub(crate) mod migrate;
pub(crate) mod schema;

use anyhow::Result;
use schemalog_core::migrations;
use schemalog_storage::Migrator;

/// Runner over the registered migrations.
pub(crate) fn load_migrator() -> Result<Migrator> {
    Ok(Migrator::new(migrations::ledger()?))
}
