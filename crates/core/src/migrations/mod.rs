//! Registered migrations, in application order.
//!
//! Everything up to [`BASE_ID`] is squashed into the base snapshot the
//! ledger derives from [`crate::catalog::current_schema`]. New steps are
//! appended at the end of [`registered`] and the catalog is updated to the
//! post-step shape in the same change.

mod m0271_del_organizationmember_counter;

use crate::{catalog, Ledger, LedgerError, Migration, MigrationId};

pub use m0271_del_organizationmember_counter::{counter_column, del_organizationmember_counter};

/// Last migration folded into the base snapshot.
pub const BASE_ID: MigrationId = 270;

/// All steps after [`BASE_ID`].
#[must_use]
pub fn registered() -> Vec<Box<dyn Migration>> {
    vec![Box::new(del_organizationmember_counter())]
}

/// The ledger for the current catalog and registered steps.
///
/// # Errors
/// Returns [`LedgerError`] if a registered step does not agree with the
/// catalog.
pub fn ledger() -> Result<Ledger, LedgerError> {
    Ledger::new(catalog::current_schema(), BASE_ID, registered())
}
