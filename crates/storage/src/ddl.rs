//! SQLite DDL rendering for logical column and table definitions.
//!
//! Every identifier is double-quoted; callers validate names first.

use schemalog_core::{ColumnDef, ColumnType, DefaultValue, TableSchema};

pub(crate) fn quote(ident: &str) -> String {
    format!("\"{ident}\"")
}

pub(crate) fn storage_type(column_type: &ColumnType) -> &'static str {
    if column_type.is_integral() { "INTEGER" } else { "TEXT" }
}

pub(crate) fn default_literal(value: &DefaultValue) -> String {
    match value {
        DefaultValue::Integer(n) => n.to_string(),
        DefaultValue::Boolean(b) => String::from(if *b { "1" } else { "0" }),
        DefaultValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        DefaultValue::Now => "CURRENT_TIMESTAMP".to_owned(),
    }
}

/// Column clause for `CREATE TABLE` / `ADD COLUMN`.
///
/// Uniqueness and plain indexes are not rendered inline; they become named
/// indexes (see [`index_statements`]) so the column stays droppable.
pub(crate) fn column_sql(column: &ColumnDef, with_default: bool) -> String {
    let mut sql = format!("{} {}", quote(&column.name), storage_type(&column.column_type));
    if column.primary_key {
        sql.push_str(" PRIMARY KEY");
        if column.column_type.is_auto() {
            sql.push_str(" AUTOINCREMENT");
        }
    } else if !column.null {
        sql.push_str(" NOT NULL");
    }
    if with_default {
        if let Some(value) = &column.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&default_literal(value));
        }
    }
    if let ColumnType::ForeignKey { to } = &column.column_type {
        sql.push_str(&format!(" REFERENCES {}(\"id\")", quote(to)));
    }
    sql
}

pub(crate) fn unique_index_name(table: &str, column: &str) -> String {
    format!("{table}_{column}_uniq")
}

pub(crate) fn index_name(table: &str, column: &str) -> String {
    format!("{table}_{column}_idx")
}

/// Index statements a single column needs.
pub(crate) fn column_index_statements(table: &str, column: &ColumnDef) -> Vec<String> {
    let mut out = Vec::new();
    if column.primary_key {
        return out;
    }
    if column.unique {
        out.push(format!(
            "CREATE UNIQUE INDEX {} ON {} ({})",
            quote(&unique_index_name(table, &column.name)),
            quote(table),
            quote(&column.name)
        ));
    }
    if column.db_index {
        out.push(format!(
            "CREATE INDEX {} ON {} ({})",
            quote(&index_name(table, &column.name)),
            quote(table),
            quote(&column.name)
        ));
    }
    out
}

pub(crate) fn create_table_sql(table: &TableSchema) -> String {
    let columns: Vec<String> = table.columns.iter().map(|c| column_sql(c, true)).collect();
    format!("CREATE TABLE {} (\n    {}\n)", quote(&table.name), columns.join(",\n    "))
}

/// All index statements for a table: per-column indexes then composite
/// unique constraints.
pub(crate) fn index_statements(table: &TableSchema) -> Vec<String> {
    let mut out: Vec<String> =
        table.columns.iter().flat_map(|c| column_index_statements(&table.name, c)).collect();
    for group in &table.unique_together {
        let name = format!("{}_{}_uniq", table.name, group.join("_"));
        let cols: Vec<String> = group.iter().map(|c| quote(c)).collect();
        out.push(format!(
            "CREATE UNIQUE INDEX {} ON {} ({})",
            quote(&name),
            quote(&table.name),
            cols.join(", ")
        ));
    }
    out
}
