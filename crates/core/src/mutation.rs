//! Column-level diffs.

use serde::{Deserialize, Serialize};

use crate::{ColumnDef, Result, SchemaMutator};

/// A single structural change to one (table, column) pair.
///
/// A delete carries the full definition of the column it removes so that it
/// can be inverted without consulting any snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ColumnMutation {
    AddColumn {
        table: String,
        column: ColumnDef,
        /// Keep the declared default at the storage level after the add.
        /// When false, the default only backfills existing rows.
        keep_default: bool,
    },
    DeleteColumn { table: String, column: ColumnDef },
}

impl ColumnMutation {
    pub fn add(table: impl Into<String>, column: ColumnDef, keep_default: bool) -> Self {
        Self::AddColumn { table: table.into(), column, keep_default }
    }

    pub fn delete(table: impl Into<String>, column: ColumnDef) -> Self {
        Self::DeleteColumn { table: table.into(), column }
    }

    /// The change that undoes this one.
    ///
    /// Restoring a deleted column never keeps the default: rows that existed
    /// before the restore get storage null (or a one-off backfill), matching
    /// what the column held when it was first added.
    #[must_use]
    pub fn inverse(&self) -> Self {
        match self {
            Self::AddColumn { table, column, .. } => Self::delete(table.clone(), column.clone()),
            Self::DeleteColumn { table, column } => Self::add(table.clone(), column.clone(), false),
        }
    }

    /// Runs this change against a mutator.
    ///
    /// # Errors
    /// Propagates the mutator's error unchanged.
    pub fn apply(&self, mutator: &mut dyn SchemaMutator) -> Result<()> {
        match self {
            Self::AddColumn { table, column, keep_default } => {
                tracing::debug!(table = %table, column = %column.name, keep_default, "add column");
                mutator.add_column(table, column, *keep_default)
            },
            Self::DeleteColumn { table, column } => {
                tracing::debug!(table = %table, column = %column.name, "delete column");
                mutator.delete_column(table, &column.name)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColumnType;

    #[test]
    fn inverse_of_delete_is_add_without_default() {
        let col = ColumnDef::new("counter", ColumnType::BoundedPositiveInteger).nullable().blank();
        let delete = ColumnMutation::delete("t", col.clone());
        assert_eq!(delete.inverse(), ColumnMutation::add("t", col, false));
    }

    #[test]
    fn double_inverse_of_delete_is_identity() {
        let col = ColumnDef::new("x", ColumnType::Text).nullable();
        let delete = ColumnMutation::delete("t", col);
        assert_eq!(delete.inverse().inverse(), delete);
    }
}
