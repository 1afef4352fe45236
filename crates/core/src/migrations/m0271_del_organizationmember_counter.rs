//! 0271: drop `sentry_organizationmember.counter`.
//!
//! The per-member counter is no longer written anywhere. Rolling back
//! re-creates the column empty; its former values are not recoverable.

use crate::catalog::ORGANIZATION_MEMBER_TABLE;
use crate::{ColumnDef, ColumnMutation, ColumnType, DiffMigration};

/// The column as it existed before this step.
#[must_use]
pub fn counter_column() -> ColumnDef {
    ColumnDef::new("counter", ColumnType::BoundedPositiveInteger).nullable().blank()
}

#[must_use]
pub fn del_organizationmember_counter() -> DiffMigration {
    DiffMigration::new(
        271,
        "0271_del_field_organizationmember_counter",
        vec![ColumnMutation::delete(ORGANIZATION_MEMBER_TABLE, counter_column())],
    )
}
