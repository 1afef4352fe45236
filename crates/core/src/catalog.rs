//! Authoritative current definition of the modelled tables.
//!
//! This is the only place the schema is written out in full. Historical
//! snapshots come from [`crate::Ledger`].

use crate::{ColumnDef, ColumnType, DefaultValue, Schema, TableSchema};

pub const USER_TABLE: &str = "auth_user";
pub const ORGANIZATION_TABLE: &str = "sentry_organization";
pub const ORGANIZATION_MEMBER_TABLE: &str = "sentry_organizationmember";
pub const ORGANIZATION_MEMBER_TEAM_TABLE: &str = "sentry_organizationmember_teams";
pub const TEAM_TABLE: &str = "sentry_team";
pub const PROJECT_TABLE: &str = "sentry_project";

fn fk(name: &str, to: &str) -> ColumnDef {
    ColumnDef::new(name, ColumnType::ForeignKey { to: to.to_owned() })
}

fn created(name: &str) -> ColumnDef {
    ColumnDef::new(name, ColumnType::DateTime).default(DefaultValue::Now)
}

fn flag(name: &str, value: bool) -> ColumnDef {
    ColumnDef::new(name, ColumnType::Boolean).default(DefaultValue::Boolean(value))
}

fn user() -> TableSchema {
    TableSchema::new(USER_TABLE)
        .column(ColumnDef::new("id", ColumnType::AutoField).primary_key())
        .column(ColumnDef::new("password", ColumnType::Char { max_length: 128 }))
        .column(created("last_login"))
        .column(flag("is_superuser", false))
        .column(ColumnDef::new("username", ColumnType::Char { max_length: 128 }).unique())
        .column(ColumnDef::new("first_name", ColumnType::Char { max_length: 200 }).blank())
        .column(ColumnDef::new("email", ColumnType::Email { max_length: 75 }).blank())
        .column(flag("is_staff", false))
        .column(flag("is_active", true))
        .column(created("date_joined"))
        .column(flag("is_managed", false))
        .column(flag("is_password_expired", false))
        .column(ColumnDef::new("last_password_change", ColumnType::DateTime).nullable())
}

fn organization() -> TableSchema {
    TableSchema::new(ORGANIZATION_TABLE)
        .column(ColumnDef::new("id", ColumnType::BigAutoField).primary_key())
        .column(ColumnDef::new("name", ColumnType::Char { max_length: 64 }))
        .column(ColumnDef::new("slug", ColumnType::Slug { max_length: 50 }).unique())
        .column(
            ColumnDef::new("status", ColumnType::BoundedPositiveInteger)
                .default(DefaultValue::Integer(0)),
        )
        .column(created("date_added"))
        .column(
            ColumnDef::new("default_role", ColumnType::Char { max_length: 32 })
                .default(DefaultValue::Text("member".to_owned())),
        )
        .column(ColumnDef::new("flags", ColumnType::BigInteger).default(DefaultValue::Integer(1)))
}

fn organization_member() -> TableSchema {
    TableSchema::new(ORGANIZATION_MEMBER_TABLE)
        .column(ColumnDef::new("id", ColumnType::BigAutoField).primary_key())
        .column(fk("organization_id", ORGANIZATION_TABLE))
        .column(fk("user_id", USER_TABLE).nullable().blank())
        .column(
            ColumnDef::new("type", ColumnType::BoundedPositiveInteger)
                .blank()
                .default(DefaultValue::Integer(50)),
        )
        .column(created("date_added"))
        .column(ColumnDef::new("email", ColumnType::Email { max_length: 75 }).nullable().blank())
        .column(flag("has_global_access", true))
        .column(ColumnDef::new("flags", ColumnType::BigInteger).default(DefaultValue::Integer(0)))
        .column(
            ColumnDef::new("role", ColumnType::Char { max_length: 32 })
                .default(DefaultValue::Text("member".to_owned())),
        )
        .column(
            ColumnDef::new("token", ColumnType::Char { max_length: 64 })
                .nullable()
                .blank()
                .unique(),
        )
        .unique_together(&["organization_id", "user_id"])
        .unique_together(&["organization_id", "email"])
}

fn organization_member_team() -> TableSchema {
    TableSchema::new(ORGANIZATION_MEMBER_TEAM_TABLE)
        .column(ColumnDef::new("id", ColumnType::AutoField).primary_key())
        .column(fk("organizationmember_id", ORGANIZATION_MEMBER_TABLE))
        .column(fk("team_id", TEAM_TABLE))
        .column(flag("is_active", true))
        .unique_together(&["team_id", "organizationmember_id"])
}

fn team() -> TableSchema {
    TableSchema::new(TEAM_TABLE)
        .column(ColumnDef::new("id", ColumnType::BigAutoField).primary_key())
        .column(ColumnDef::new("slug", ColumnType::Slug { max_length: 50 }))
        .column(ColumnDef::new("name", ColumnType::Char { max_length: 64 }))
        .column(
            ColumnDef::new("status", ColumnType::BoundedPositiveInteger)
                .default(DefaultValue::Integer(0)),
        )
        .column(created("date_added").nullable())
        .column(fk("organization_id", ORGANIZATION_TABLE))
        .unique_together(&["organization_id", "slug"])
}

fn project() -> TableSchema {
    TableSchema::new(PROJECT_TABLE)
        .column(ColumnDef::new("id", ColumnType::BigAutoField).primary_key())
        .column(ColumnDef::new("name", ColumnType::Char { max_length: 200 }))
        .column(flag("public", false))
        .column(created("date_added"))
        .column(ColumnDef::new("slug", ColumnType::Slug { max_length: 50 }).nullable())
        .column(fk("team_id", TEAM_TABLE))
        .column(
            ColumnDef::new("status", ColumnType::BoundedPositiveInteger)
                .db_index()
                .default(DefaultValue::Integer(0)),
        )
        .column(ColumnDef::new("first_event", ColumnType::DateTime).nullable())
        .column(fk("organization_id", ORGANIZATION_TABLE))
        .column(
            ColumnDef::new("forced_color", ColumnType::Char { max_length: 6 }).nullable().blank(),
        )
        .unique_together(&["team_id", "slug"])
        .unique_together(&["organization_id", "slug"])
}

/// The schema as of the latest registered migration.
#[must_use]
pub fn current_schema() -> Schema {
    Schema::new()
        .with_table(user())
        .with_table(organization())
        .with_table(organization_member())
        .with_table(organization_member_team())
        .with_table(team())
        .with_table(project())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_builds() {
        let schema = current_schema();
        assert_eq!(schema.tables().count(), 6);
        let member = schema.table(ORGANIZATION_MEMBER_TABLE).unwrap();
        assert!(!member.has_column("counter"));
        assert_eq!(member.unique_together.len(), 2);
    }

    #[test]
    fn every_foreign_key_targets_a_catalog_table() {
        let schema = current_schema();
        for table in schema.tables() {
            for column in &table.columns {
                if let ColumnType::ForeignKey { to } = &column.column_type {
                    assert!(schema.table(to).is_some(), "{}.{} -> {to}", table.name, column.name);
                }
            }
        }
    }
}
