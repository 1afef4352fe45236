//! Test utilities and module declarations for storage tests.

use crate::{Migrator, Storage};
use schemalog_core::migrations;
use tempfile::TempDir;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let storage = Storage::new(&db_path).unwrap();
    (storage, temp_dir)
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_migrator() -> Migrator {
    Migrator::new(migrations::ledger().unwrap())
}

/// Storage bootstrapped at the ledger base, with its migrator.
#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_storage_at_base() -> (Storage, Migrator, TempDir) {
    let (storage, temp_dir) = create_test_storage();
    let migrator = create_test_migrator();
    storage.bootstrap(migrator.ledger().base()).unwrap();
    (storage, migrator, temp_dir)
}

mod counter_tests;
