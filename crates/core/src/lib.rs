//! Core types for schemalog
//!
//! Column and schema definitions, column-level diffs, the migration step
//! interface, and the ledger that derives historical snapshots from the
//! current catalog.

pub mod catalog;
mod column;
pub mod env_config;
mod error;
mod ident;
mod ledger;
mod migration;
pub mod migrations;
mod mutation;
mod schema;

pub use column::*;
pub use error::*;
pub use ident::validate_identifier;
pub use ledger::Ledger;
pub use migration::*;
pub use mutation::ColumnMutation;
pub use schema::*;
