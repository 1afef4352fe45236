//! Migration steps and the mutation interface they run against.

use std::fmt::Debug;

use crate::{ColumnDef, ColumnMutation, Result};

/// Sequence position of a step in the migration history.
pub type MigrationId = u32;

/// Storage-schema mutation interface supplied by a backend.
///
/// Implementations must refuse to add a column that exists and to delete one
/// that does not; re-running a step must fail rather than silently succeed.
pub trait SchemaMutator {
    /// Adds `column` to `table`.
    ///
    /// When `keep_default` is false the declared default, if any, is used to
    /// fill existing rows and is not retained as a storage default.
    ///
    /// # Errors
    /// [`crate::SchemaError`] if the table is missing or the column exists,
    /// [`crate::ConstraintViolationError`] if existing rows cannot satisfy the
    /// column's constraints.
    fn add_column(&mut self, table: &str, column: &ColumnDef, keep_default: bool) -> Result<()>;

    /// Drops `column` from `table`, discarding its values.
    ///
    /// # Errors
    /// [`crate::SchemaError`] if the table or column is missing or storage
    /// rejects the drop.
    fn delete_column(&mut self, table: &str, column: &str) -> Result<()>;
}

/// One unit of schema change.
///
/// Steps are stateless and immutable once authored.
pub trait Migration: Debug + Send + Sync {
    fn id(&self) -> MigrationId;

    fn name(&self) -> &str;

    /// Applies the change.
    ///
    /// # Errors
    /// Any mutator error aborts the step.
    fn forward(&self, mutator: &mut dyn SchemaMutator) -> Result<()>;

    /// Reverts the change.
    ///
    /// # Errors
    /// Any mutator error aborts the step.
    fn backward(&self, mutator: &mut dyn SchemaMutator) -> Result<()>;
}

/// A step expressed as an ordered list of column diffs.
///
/// `backward` runs the inverse of each diff in reverse order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffMigration {
    id: MigrationId,
    name: String,
    changes: Vec<ColumnMutation>,
}

impl DiffMigration {
    #[must_use]
    pub fn new(id: MigrationId, name: impl Into<String>, changes: Vec<ColumnMutation>) -> Self {
        Self { id, name: name.into(), changes }
    }

    pub fn changes(&self) -> &[ColumnMutation] {
        &self.changes
    }
}

impl Migration for DiffMigration {
    fn id(&self) -> MigrationId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&self, mutator: &mut dyn SchemaMutator) -> Result<()> {
        for change in &self.changes {
            change.apply(mutator)?;
        }
        Ok(())
    }

    fn backward(&self, mutator: &mut dyn SchemaMutator) -> Result<()> {
        for change in self.changes.iter().rev() {
            change.inverse().apply(mutator)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnType, Schema, SchemaError, TableSchema};

    /// Records calls instead of touching any schema.
    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl SchemaMutator for Recorder {
        fn add_column(
            &mut self,
            table: &str,
            column: &ColumnDef,
            keep_default: bool,
        ) -> Result<()> {
            self.0.push(format!("add {table}.{} keep_default={keep_default}", column.name));
            Ok(())
        }

        fn delete_column(&mut self, table: &str, column: &str) -> Result<()> {
            self.0.push(format!("delete {table}.{column}"));
            Ok(())
        }
    }

    fn two_step() -> DiffMigration {
        DiffMigration::new(
            7,
            "0007_swap",
            vec![
                ColumnMutation::delete("t", ColumnDef::new("a", ColumnType::Integer).nullable()),
                ColumnMutation::add("t", ColumnDef::new("b", ColumnType::Text).nullable(), true),
            ],
        )
    }

    #[test]
    fn backward_inverts_in_reverse_order() {
        let step = two_step();
        let mut rec = Recorder::default();
        step.forward(&mut rec).unwrap();
        step.backward(&mut rec).unwrap();
        assert_eq!(
            rec.0,
            vec![
                "delete t.a",
                "add t.b keep_default=true",
                "delete t.b",
                "add t.a keep_default=false",
            ]
        );
    }

    #[test]
    fn failure_stops_at_first_error() {
        let mut schema = Schema::new()
            .with_table(TableSchema::new("t").column(ColumnDef::new("b", ColumnType::Text)));
        let err = two_step().forward(&mut schema).unwrap_err();
        assert!(matches!(err.as_schema(), Some(SchemaError::ColumnNotFound { .. })));
        assert!(schema.column("t", "b").is_some());
    }

    #[test]
    fn identity() {
        let step = two_step();
        assert_eq!(step.id(), 7);
        assert_eq!(step.name(), "0007_swap");
        assert_eq!(step.changes().len(), 2);
    }
}
