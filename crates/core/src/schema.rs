//! In-memory schema snapshots.
//!
//! A [`Schema`] is advisory: it describes what the model layer expects the
//! database to look like at some point in history. It also implements
//! [`SchemaMutator`] with the same existence guards a real backend enforces,
//! which is how the ledger derives historical snapshots.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ident::validate_identifier;
use crate::{ColumnDef, Result, SchemaError, SchemaMutator};

/// Columns and composite unique constraints of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique_together: Vec<Vec<String>>,
}

impl TableSchema {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), columns: Vec::new(), unique_together: Vec::new() }
    }

    #[must_use]
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn unique_together(mut self, columns: &[&str]) -> Self {
        self.unique_together.push(columns.iter().map(|c| (*c).to_owned()).collect());
        self
    }

    pub fn get(&self, column: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Why `column` cannot be dropped, if it is pinned by a key or a
    /// composite unique constraint.
    fn drop_blocker(&self, column: &ColumnDef) -> Option<String> {
        if column.primary_key {
            return Some("column is the primary key".to_owned());
        }
        self.unique_together
            .iter()
            .find(|group| group.iter().any(|c| *c == column.name))
            .map(|group| format!("column is part of unique constraint ({})", group.join(", ")))
    }
}

/// Mapping from table name to table definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    tables: BTreeMap<String, TableSchema>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Schema::insert_table`] for static catalogs.
    ///
    /// # Panics
    /// Panics if the table name is duplicated or invalid.
    #[must_use]
    #[expect(clippy::expect_used, reason = "catalog definitions are static")]
    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.insert_table(table).expect("static catalog table must be valid and unique");
        self
    }

    /// Adds a table definition.
    ///
    /// # Errors
    /// Returns [`SchemaError::TableExists`] on duplicates and
    /// [`SchemaError::InvalidIdentifier`] for bad table or column names.
    pub fn insert_table(&mut self, table: TableSchema) -> std::result::Result<(), SchemaError> {
        validate_identifier(&table.name)?;
        for column in &table.columns {
            validate_identifier(&column.name)?;
        }
        if self.tables.contains_key(&table.name) {
            return Err(SchemaError::TableExists(table.name));
        }
        self.tables.insert(table.name.clone(), table);
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }

    pub fn column(&self, table: &str, column: &str) -> Option<&ColumnDef> {
        self.table(table).and_then(|t| t.get(column))
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Keeps only the named table. Unknown names yield an empty schema.
    #[must_use]
    pub fn only(&self, table: &str) -> Self {
        let tables = self
            .tables
            .get(table)
            .map(|t| BTreeMap::from([(t.name.clone(), t.clone())]))
            .unwrap_or_default();
        Self { tables }
    }

    fn table_mut(&mut self, name: &str) -> std::result::Result<&mut TableSchema, SchemaError> {
        self.tables.get_mut(name).ok_or_else(|| SchemaError::TableNotFound(name.to_owned()))
    }
}

impl SchemaMutator for Schema {
    fn add_column(&mut self, table: &str, column: &ColumnDef, _keep_default: bool) -> Result<()> {
        validate_identifier(&column.name)?;
        let target = self.table_mut(table)?;
        if target.has_column(&column.name) {
            return Err(SchemaError::ColumnExists {
                table: table.to_owned(),
                column: column.name.clone(),
            }
            .into());
        }
        target.columns.push(column.clone());
        Ok(())
    }

    fn delete_column(&mut self, table: &str, column: &str) -> Result<()> {
        let target = self.table_mut(table)?;
        let Some(pos) = target.columns.iter().position(|c| c.name == column) else {
            return Err(SchemaError::ColumnNotFound {
                table: table.to_owned(),
                column: column.to_owned(),
            }
            .into());
        };
        if let Some(reason) = target.columns.get(pos).and_then(|c| target.drop_blocker(c)) {
            return Err(SchemaError::Rejected {
                table: table.to_owned(),
                column: column.to_owned(),
                reason,
            }
            .into());
        }
        target.columns.remove(pos);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnType, MigrationError};

    fn members() -> Schema {
        Schema::new().with_table(
            TableSchema::new("members")
                .column(ColumnDef::new("id", ColumnType::AutoField).primary_key())
                .column(ColumnDef::new("org_id", ColumnType::Integer))
                .column(ColumnDef::new("email", ColumnType::Email { max_length: 75 }).nullable())
                .unique_together(&["org_id", "email"]),
        )
    }

    #[test]
    fn add_then_delete_round_trips() {
        let mut schema = members();
        let before = schema.clone();
        let col = ColumnDef::new("counter", ColumnType::BoundedPositiveInteger).nullable();

        schema.add_column("members", &col, false).unwrap();
        assert_eq!(schema.column("members", "counter"), Some(&col));

        schema.delete_column("members", "counter").unwrap();
        assert_eq!(schema, before);
    }

    #[test]
    fn add_existing_column_fails() {
        let mut schema = members();
        let col = ColumnDef::new("email", ColumnType::Text);
        let err = schema.add_column("members", &col, false).unwrap_err();
        assert!(matches!(
            err,
            MigrationError::Schema(SchemaError::ColumnExists { ref column, .. })
                if column == "email"
        ));
    }

    #[test]
    fn delete_missing_column_or_table_fails() {
        let mut schema = members();
        let err = schema.delete_column("members", "counter").unwrap_err();
        assert!(matches!(err.as_schema(), Some(SchemaError::ColumnNotFound { .. })));

        let err = schema.delete_column("nope", "counter").unwrap_err();
        assert_eq!(err.as_schema(), Some(&SchemaError::TableNotFound("nope".to_owned())));
    }

    #[test]
    fn pinned_columns_cannot_be_dropped() {
        let mut schema = members();
        for column in ["id", "email"] {
            let err = schema.delete_column("members", column).unwrap_err();
            assert!(matches!(err.as_schema(), Some(SchemaError::Rejected { .. })), "{column}");
        }
        assert_eq!(schema, members());
    }

    #[test]
    fn duplicate_table_rejected() {
        let mut schema = members();
        let err = schema.insert_table(TableSchema::new("members")).unwrap_err();
        assert_eq!(err, SchemaError::TableExists("members".to_owned()));
    }

    #[test]
    fn invalid_names_rejected() {
        let mut schema = Schema::new();
        assert!(schema.insert_table(TableSchema::new("bad name")).is_err());

        let mut schema = members();
        let col = ColumnDef::new("x; --", ColumnType::Text);
        let err = schema.add_column("members", &col, false).unwrap_err();
        assert!(matches!(err.as_schema(), Some(SchemaError::InvalidIdentifier(_))));
    }

    #[test]
    fn only_filters_tables() {
        let schema = members();
        assert_eq!(schema.only("members").tables().count(), 1);
        assert!(schema.only("other").is_empty());
    }
}
