//! [`SchemaMutator`] over a live SQLite connection.

use rusqlite::Connection;
use schemalog_core::{
    ColumnDef, ConstraintViolationError, DefaultValue, MigrationError, SchemaError, SchemaMutator,
    validate_identifier,
};

use super::column_helpers::{column_exists, has_rows, table_exists};
use crate::ddl::{
    column_index_statements, column_sql, default_literal, index_name, quote, unique_index_name,
};

/// Applies column mutations with `ALTER TABLE`.
///
/// Runs on whatever connection it is given; the runner hands it an open
/// transaction so a failing step leaves nothing behind.
#[derive(Debug)]
pub struct SqliteMutator<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteMutator<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn require_table(&self, table: &str) -> Result<(), MigrationError> {
        validate_identifier(table)?;
        if table_exists(self.conn, table).map_err(storage)? {
            Ok(())
        } else {
            Err(SchemaError::TableNotFound(table.to_owned()).into())
        }
    }
}

fn storage(err: rusqlite::Error) -> MigrationError {
    MigrationError::Storage(err.to_string())
}

fn violation(table: &str, column: &str, reason: impl Into<String>) -> MigrationError {
    ConstraintViolationError {
        table: table.to_owned(),
        column: column.to_owned(),
        reason: reason.into(),
    }
    .into()
}

impl SchemaMutator for SqliteMutator<'_> {
    fn add_column(
        &mut self,
        table: &str,
        column: &ColumnDef,
        keep_default: bool,
    ) -> Result<(), MigrationError> {
        self.require_table(table)?;
        validate_identifier(&column.name)?;
        if column_exists(self.conn, table, &column.name).map_err(storage)? {
            return Err(SchemaError::ColumnExists {
                table: table.to_owned(),
                column: column.name.clone(),
            }
            .into());
        }
        if column.primary_key {
            return Err(SchemaError::Rejected {
                table: table.to_owned(),
                column: column.name.clone(),
                reason: "a primary key cannot be added to an existing table".to_owned(),
            }
            .into());
        }

        let populated = has_rows(self.conn, table).map_err(storage)?;
        // SQLite only accepts constant defaults in ADD COLUMN and cannot drop
        // a default afterwards.
        let constant_default =
            column.default.as_ref().filter(|d| !matches!(d, DefaultValue::Now));
        let inline_default =
            constant_default.is_some() && (keep_default || (!column.null && populated));

        if populated && !column.fillable() {
            return Err(violation(
                table,
                &column.name,
                "NOT NULL column without a default cannot be added to a table with rows",
            ));
        }
        if populated && !column.null && !inline_default {
            return Err(violation(
                table,
                &column.name,
                "non-constant default cannot fill existing rows of a NOT NULL column",
            ));
        }
        if inline_default && !keep_default {
            tracing::warn!(
                table,
                column = %column.name,
                "SQLite cannot drop a column default; keeping it to fill existing NOT NULL rows"
            );
        }

        let sql = format!(
            "ALTER TABLE {} ADD COLUMN {}",
            quote(table),
            column_sql(column, inline_default)
        );
        tracing::debug!(%sql, "add column");
        self.conn.execute(&sql, []).map_err(storage)?;

        if populated && !inline_default {
            if let Some(value) = &column.default {
                let sql = format!(
                    "UPDATE {} SET {} = {}",
                    quote(table),
                    quote(&column.name),
                    default_literal(value)
                );
                self.conn.execute(&sql, []).map_err(storage)?;
            }
        }

        for sql in column_index_statements(table, column) {
            self.conn
                .execute(&sql, [])
                .map_err(|e| violation(table, &column.name, e.to_string()))?;
        }
        Ok(())
    }

    fn delete_column(&mut self, table: &str, column: &str) -> Result<(), MigrationError> {
        self.require_table(table)?;
        validate_identifier(column)?;
        if !column_exists(self.conn, table, column).map_err(storage)? {
            return Err(SchemaError::ColumnNotFound {
                table: table.to_owned(),
                column: column.to_owned(),
            }
            .into());
        }

        // Indexes created for the column itself go with it; anything else
        // referencing it makes SQLite refuse the drop.
        for name in [unique_index_name(table, column), index_name(table, column)] {
            let sql = format!("DROP INDEX IF EXISTS {}", quote(&name));
            self.conn.execute(&sql, []).map_err(storage)?;
        }

        let sql = format!("ALTER TABLE {} DROP COLUMN {}", quote(table), quote(column));
        tracing::debug!(%sql, "delete column");
        self.conn.execute(&sql, []).map_err(|e| SchemaError::Rejected {
            table: table.to_owned(),
            column: column.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}
