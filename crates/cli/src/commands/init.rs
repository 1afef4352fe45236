use std::path::PathBuf;

use anyhow::Result;

use super::load_migrator;
use crate::open_storage;

pub(crate) fn run_init(db: Option<PathBuf>) -> Result<()> {
    let storage = open_storage(db)?;
    let migrator = load_migrator()?;
    if !storage.is_empty()? {
        anyhow::bail!("database already has tables; refusing to initialize");
    }
    storage.bootstrap(migrator.ledger().base())?;
    println!("Initialized database at migration {}", migrator.ledger().base_id());
    Ok(())
}
