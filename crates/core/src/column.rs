//! Column definitions as declared by the model layer.
//!
//! A [`ColumnDef`] is purely logical: storage backends decide how each
//! [`ColumnType`] is rendered.

use serde::{Deserialize, Serialize};

/// Declared field type of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnType {
    /// 32-bit auto-incrementing primary key
    AutoField,
    /// 64-bit auto-incrementing primary key
    BigAutoField,
    /// Non-negative integer bounded to the 32-bit signed range
    BoundedPositiveInteger,
    /// Integer bounded to the 64-bit signed range
    BoundedBigInteger,
    BigInteger,
    Integer,
    Boolean,
    Char { max_length: u32 },
    Slug { max_length: u32 },
    Email { max_length: u32 },
    DateTime,
    Text,
    Json,
    /// Reference to the primary key of another table
    ForeignKey { to: String },
}

impl ColumnType {
    /// Whether values of this type are stored as integers.
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            Self::AutoField
                | Self::BigAutoField
                | Self::BoundedPositiveInteger
                | Self::BoundedBigInteger
                | Self::BigInteger
                | Self::Integer
                | Self::Boolean
                | Self::ForeignKey { .. }
        )
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Self::AutoField | Self::BigAutoField)
    }
}

/// Declared default of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    Integer(i64),
    Boolean(bool),
    Text(String),
    /// Current timestamp at insert time
    Now,
}

/// One field of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(flatten)]
    pub column_type: ColumnType,
    /// Storage accepts NULL
    #[serde(default)]
    pub null: bool,
    /// Forms accept an empty value; no storage effect
    #[serde(default)]
    pub blank: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub db_index: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
}

impl ColumnDef {
    /// Non-null column with no default and no constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            null: false,
            blank: false,
            unique: false,
            db_index: false,
            primary_key: false,
            default: None,
        }
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.null = true;
        self
    }

    #[must_use]
    pub fn blank(mut self) -> Self {
        self.blank = true;
        self
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub fn db_index(mut self) -> Self {
        self.db_index = true;
        self
    }

    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    #[must_use]
    pub fn default(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Whether a column with this definition can be added to a table that
    /// already holds rows without supplying values.
    pub fn fillable(&self) -> bool {
        self.null || self.default.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_flags() {
        let col = ColumnDef::new("counter", ColumnType::BoundedPositiveInteger).nullable().blank();
        assert!(col.null);
        assert!(col.blank);
        assert!(!col.unique);
        assert!(col.default.is_none());
        assert!(col.fillable());
    }

    #[test]
    fn not_null_without_default_is_not_fillable() {
        let col = ColumnDef::new("role", ColumnType::Char { max_length: 32 });
        assert!(!col.fillable());
        let col = col.default(DefaultValue::Text("member".to_owned()));
        assert!(col.fillable());
    }

    #[test]
    fn serializes_type_inline() {
        let col = ColumnDef::new("email", ColumnType::Email { max_length: 75 }).nullable();
        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(json["type"], "email");
        assert_eq!(json["max_length"], 75);
        assert_eq!(json["null"], true);
        assert!(json.get("default").is_none());
    }

    #[test]
    fn integral_types() {
        assert!(ColumnType::BoundedPositiveInteger.is_integral());
        assert!(ColumnType::ForeignKey { to: "auth_user".to_owned() }.is_integral());
        assert!(!ColumnType::Text.is_integral());
    }
}
