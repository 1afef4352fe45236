//! Append-only migration log anchored on a single authoritative schema.
//!
//! Only the current schema is written down. The snapshot before any step is
//! derived by unwinding the log from the current schema; the snapshot after
//! step N by replaying steps up to N on that base.

use crate::{LedgerError, Migration, MigrationId, Schema};

#[derive(Debug)]
pub struct Ledger {
    current: Schema,
    base: Schema,
    base_id: MigrationId,
    steps: Vec<Box<dyn Migration>>,
}

impl Ledger {
    /// Builds a ledger and checks that it is consistent.
    ///
    /// `base_id` names the point in history the base snapshot corresponds to;
    /// every step id must be greater than it and strictly increasing.
    ///
    /// # Errors
    /// [`LedgerError::OutOfOrder`] or [`LedgerError::BaseAfterFirst`] for bad
    /// ordering; [`LedgerError::Unwind`] / [`LedgerError::Replay`] if some
    /// step does not apply cleanly to its neighbouring snapshot;
    /// [`LedgerError::Diverged`] if replaying the log from the base does not
    /// reproduce the current schema exactly.
    pub fn new(
        current: Schema,
        base_id: MigrationId,
        steps: Vec<Box<dyn Migration>>,
    ) -> Result<Self, LedgerError> {
        if let Some(first) = steps.first() {
            if first.id() <= base_id {
                return Err(LedgerError::BaseAfterFirst { base: base_id, first: first.id() });
            }
        }
        for pair in steps.windows(2) {
            if let [previous, next] = pair {
                if next.id() <= previous.id() {
                    return Err(LedgerError::OutOfOrder {
                        previous: previous.id(),
                        next: next.id(),
                    });
                }
            }
        }

        let mut base = current.clone();
        for step in steps.iter().rev() {
            step.backward(&mut base).map_err(|source| LedgerError::Unwind {
                id: step.id(),
                name: step.name().to_owned(),
                source,
            })?;
        }

        let ledger = Self { current, base, base_id, steps };
        if ledger.replay_until(ledger.head_id())? != ledger.current {
            return Err(LedgerError::Diverged { head: ledger.head_id() });
        }
        Ok(ledger)
    }

    /// The authoritative current schema.
    pub fn current(&self) -> &Schema {
        &self.current
    }

    /// Snapshot before the first step.
    pub fn base(&self) -> &Schema {
        &self.base
    }

    pub fn base_id(&self) -> MigrationId {
        self.base_id
    }

    /// Id of the last step, or the base id for an empty log.
    pub fn head_id(&self) -> MigrationId {
        self.steps.last().map_or(self.base_id, |s| s.id())
    }

    pub fn steps(&self) -> impl DoubleEndedIterator<Item = &dyn Migration> {
        self.steps.iter().map(|s| &**s)
    }

    pub fn get(&self, id: MigrationId) -> Option<&dyn Migration> {
        self.steps.iter().find(|s| s.id() == id).map(|s| &**s)
    }

    /// Whether `id` is a valid position: the base or one of the steps.
    pub fn contains(&self, id: MigrationId) -> bool {
        id == self.base_id || self.get(id).is_some()
    }

    /// Schema after step `id` has been applied. The base id yields the base
    /// snapshot.
    ///
    /// # Errors
    /// [`LedgerError::UnknownId`] if `id` is neither the base nor a step.
    pub fn snapshot_at(&self, id: MigrationId) -> Result<Schema, LedgerError> {
        if !self.contains(id) {
            return Err(LedgerError::UnknownId(id));
        }
        self.replay_until(id)
    }

    /// Steps with `after < id <= upto`, in application order.
    pub fn range(
        &self,
        after: MigrationId,
        upto: MigrationId,
    ) -> impl DoubleEndedIterator<Item = &dyn Migration> {
        self.steps().filter(move |s| s.id() > after && s.id() <= upto)
    }

    fn replay_until(&self, id: MigrationId) -> Result<Schema, LedgerError> {
        let mut schema = self.base.clone();
        for step in self.steps.iter().take_while(|s| s.id() <= id) {
            step.forward(&mut schema).map_err(|source| LedgerError::Replay {
                id: step.id(),
                name: step.name().to_owned(),
                source,
            })?;
        }
        Ok(schema)
    }
}
