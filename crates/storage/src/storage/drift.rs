//! Comparison of the live database against a ledger snapshot.

use rusqlite::Connection;
use schemalog_core::{MigrationId, Schema};
use serde::Serialize;

use crate::runner::{table_columns, table_exists};

/// A single disagreement between snapshot and database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Drift {
    MissingTable { table: String },
    MissingColumn { table: String, column: String },
    UnexpectedColumn { table: String, column: String },
    Nullability { table: String, column: String, expected_null: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    /// Migration the snapshot was taken at
    pub at: MigrationId,
    pub issues: Vec<Drift>,
}

impl DriftReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

pub(super) fn compare(conn: &Connection, expected: &Schema) -> rusqlite::Result<Vec<Drift>> {
    let mut issues = Vec::new();
    for table in expected.tables() {
        if !table_exists(conn, &table.name)? {
            issues.push(Drift::MissingTable { table: table.name.clone() });
            continue;
        }
        let live = table_columns(conn, &table.name)?;

        for column in &table.columns {
            match live.iter().find(|l| l.name == column.name) {
                None => issues.push(Drift::MissingColumn {
                    table: table.name.clone(),
                    column: column.name.clone(),
                }),
                // INTEGER PRIMARY KEY reports notnull = 0
                Some(l) if !column.primary_key && l.not_null == column.null => {
                    issues.push(Drift::Nullability {
                        table: table.name.clone(),
                        column: column.name.clone(),
                        expected_null: column.null,
                    });
                },
                Some(_) => {},
            }
        }

        for l in live.iter().filter(|l| !table.has_column(&l.name)) {
            issues.push(Drift::UnexpectedColumn {
                table: table.name.clone(),
                column: l.name.clone(),
            });
        }
    }
    Ok(issues)
}
