//! Reference service
//!
//! Manages the three tagging dimensions (groups, categories, parties) with
//! one generic service. Usage counters are left to the transaction engine.

use std::marker::PhantomData;

use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Reference, UserId};
use crate::storage::{Storage, Stored};

use super::ranker::sort_by_usage;

/// Service for group, category or party management
pub struct ReferenceService<'a, E> {
    storage: &'a Storage,
    _kind: PhantomData<E>,
}

impl<'a, E: Stored + Reference> ReferenceService<'a, E> {
    /// Create a new reference service
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            _kind: PhantomData,
        }
    }

    fn ensure_unique(&self, owner: UserId, name: &str, exclude: Option<E::Id>) -> LedgerResult<()> {
        let existing = E::table(self.storage).find_by_name(owner, name)?;
        if existing.is_some_and(|row| Some(row.id()) != exclude) {
            return Err(LedgerError::Duplicate {
                entity_type: E::ENTITY,
                identifier: name.to_string(),
            });
        }
        Ok(())
    }

    /// Create a new entry
    pub fn create(&self, name: &str, owner: UserId) -> LedgerResult<E> {
        let row = E::with_name(name.trim(), owner);
        row.check()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        let mut uow = self.storage.begin()?;
        self.ensure_unique(owner, row.name(), None)?;
        uow.insert(row.clone());
        uow.commit()?;

        info!(kind = E::ENTITY, id = %row.id(), name = row.name(), "reference created");
        Ok(row)
    }

    /// Get an entry by ID
    pub fn get(&self, id: E::Id, owner: UserId) -> LedgerResult<Option<E>> {
        E::table(self.storage).get_owned(id, owner)
    }

    /// Find an entry by name (case-insensitive)
    pub fn find(&self, name: &str, owner: UserId) -> LedgerResult<Option<E>> {
        E::table(self.storage).find_by_name(owner, name)
    }

    /// All entries of an owner, inactive included, most used first
    pub fn list(&self, owner: UserId) -> LedgerResult<Vec<E>> {
        let mut rows = E::table(self.storage).list_owned(owner)?;
        sort_by_usage(&mut rows);
        Ok(rows)
    }

    /// Rename an entry
    pub fn rename(&self, id: E::Id, name: &str, owner: UserId) -> LedgerResult<E> {
        let mut uow = self.storage.begin()?;

        let mut row = uow
            .get_owned::<E>(id, owner)?
            .ok_or_else(|| not_found::<E>(id))?;
        row.set_name(name.trim());
        row.check()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;
        self.ensure_unique(owner, row.name(), Some(id))?;

        uow.update(row.clone());
        uow.commit()?;

        info!(kind = E::ENTITY, id = %id, name = row.name(), "reference renamed");
        Ok(row)
    }

    /// Activate or deactivate an entry
    pub fn set_active(&self, id: E::Id, active: bool, owner: UserId) -> LedgerResult<E> {
        let mut uow = self.storage.begin()?;

        let mut row = uow
            .get_owned::<E>(id, owner)?
            .ok_or_else(|| not_found::<E>(id))?;
        row.set_active(active);
        uow.update(row.clone());
        uow.commit()?;

        info!(kind = E::ENTITY, id = %id, active, "reference activation changed");
        Ok(row)
    }
}

fn not_found<E: Stored>(id: E::Id) -> LedgerError {
    LedgerError::NotFound {
        entity_type: E::ENTITY,
        identifier: id.to_string(),
    }
}
