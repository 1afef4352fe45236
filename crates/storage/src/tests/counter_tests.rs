//! Dropping and restoring `sentry_organizationmember.counter` on SQLite.

use rusqlite::params;
use schemalog_core::catalog::ORGANIZATION_MEMBER_TABLE;
use schemalog_core::migrations::del_organizationmember_counter;
use schemalog_core::{Migration, SchemaError};

use super::create_storage_at_base;
use crate::SqliteMutator;

#[test]
fn counter_is_nullable_integer_without_default_at_base() {
    let (storage, _migrator, _temp_dir) = create_storage_at_base();
    let columns = storage.live_columns(ORGANIZATION_MEMBER_TABLE).unwrap().unwrap();
    let counter = columns.iter().find(|c| c.name == "counter").unwrap();
    assert_eq!(counter.sql_type, "INTEGER");
    assert!(!counter.not_null);
    assert_eq!(counter.default, None);
    assert!(!counter.primary_key);
}

#[test]
fn forward_drops_and_backward_restores_exact_definition() {
    let (storage, migrator, _temp_dir) = create_storage_at_base();
    let before = storage.live_columns(ORGANIZATION_MEMBER_TABLE).unwrap().unwrap();

    storage.migrate(&migrator, None).unwrap();
    let after_forward = storage.live_columns(ORGANIZATION_MEMBER_TABLE).unwrap().unwrap();
    assert!(after_forward.iter().all(|c| c.name != "counter"));
    assert_eq!(after_forward.len(), before.len() - 1);

    storage.rollback_steps(&migrator, 1).unwrap();
    let after_backward = storage.live_columns(ORGANIZATION_MEMBER_TABLE).unwrap().unwrap();
    assert_eq!(after_backward, before);
}

#[test]
fn restored_counter_is_null_for_existing_rows() {
    let (storage, migrator, _temp_dir) = create_storage_at_base();
    {
        let conn = storage.conn().unwrap();
        conn.execute(
            "INSERT INTO sentry_organizationmember (organization_id, email, counter)
             VALUES (1, 'a@example.com', 7), (1, 'b@example.com', 9)",
            [],
        )
        .unwrap();
    }

    storage.migrate(&migrator, None).unwrap();
    storage.rollback(&migrator, 270).unwrap();

    let conn = storage.conn().unwrap();
    let non_null: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sentry_organizationmember WHERE counter IS NOT NULL",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(non_null, 0);
    let rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sentry_organizationmember WHERE email = ?1",
            params!["a@example.com"],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn forward_twice_fails_with_schema_error() {
    let (storage, _migrator, _temp_dir) = create_storage_at_base();
    let conn = storage.conn().unwrap();
    let step = del_organizationmember_counter();
    let mut mutator = SqliteMutator::new(&conn);

    step.forward(&mut mutator).unwrap();
    let err = step.forward(&mut mutator).unwrap_err();
    assert_eq!(
        err.as_schema(),
        Some(&SchemaError::ColumnNotFound {
            table: ORGANIZATION_MEMBER_TABLE.to_owned(),
            column: "counter".to_owned(),
        })
    );
}

#[test]
fn backward_without_forward_fails_with_schema_error() {
    let (storage, _migrator, _temp_dir) = create_storage_at_base();
    let conn = storage.conn().unwrap();
    let step = del_organizationmember_counter();
    let mut mutator = SqliteMutator::new(&conn);

    let err = step.backward(&mut mutator).unwrap_err();
    assert_eq!(
        err.as_schema(),
        Some(&SchemaError::ColumnExists {
            table: ORGANIZATION_MEMBER_TABLE.to_owned(),
            column: "counter".to_owned(),
        })
    );
}
