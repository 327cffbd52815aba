//! In-memory, owner-scoped entity table
//!
//! Every repository keeps its rows in one or more `EntityTable`s. Tables are
//! only written through a committed unit of work or while loading from disk.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::LedgerError;
use crate::models::{Rankable, Record, UserId};

/// A lock-protected map of rows keyed by their identifier
pub struct EntityTable<E: Record> {
    rows: RwLock<HashMap<E::Id, E>>,
}

impl<E: Record> Default for EntityTable<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Record> EntityTable<E> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<E::Id, E>>, LedgerError> {
        self.rows
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<E::Id, E>>, LedgerError> {
        self.rows
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Get a row by ID regardless of owner
    pub fn get(&self, id: E::Id) -> Result<Option<E>, LedgerError> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// Get a row by ID only if it belongs to `owner`
    pub fn get_owned(&self, id: E::Id, owner: UserId) -> Result<Option<E>, LedgerError> {
        Ok(self
            .read()?
            .get(&id)
            .filter(|row| row.is_owned_by(owner))
            .cloned())
    }

    /// Check if a row exists
    pub fn contains(&self, id: E::Id) -> Result<bool, LedgerError> {
        Ok(self.read()?.contains_key(&id))
    }

    /// All rows owned by `owner`, in identifier order
    pub fn list_owned(&self, owner: UserId) -> Result<Vec<E>, LedgerError> {
        let mut rows: Vec<_> = self
            .read()?
            .values()
            .filter(|row| row.is_owned_by(owner))
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.id());
        Ok(rows)
    }

    /// All rows, in identifier order
    pub fn all(&self) -> Result<Vec<E>, LedgerError> {
        let mut rows: Vec<_> = self.read()?.values().cloned().collect();
        rows.sort_by_key(|row| row.id());
        Ok(rows)
    }

    /// Count rows
    pub fn count(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.len())
    }

    /// Replace the whole content of the table (used when loading from disk)
    pub(crate) fn replace_all(&self, rows: Vec<E>) -> Result<(), LedgerError> {
        let mut data = self.write()?;
        data.clear();
        for row in rows {
            data.insert(row.id(), row);
        }
        Ok(())
    }

    /// Write rows (`Some`) or remove them (`None`), returning the previous
    /// state of every touched row so the change can be reverted
    pub(crate) fn apply(
        &self,
        changes: Vec<(E::Id, Option<E>)>,
    ) -> Result<Vec<(E::Id, Option<E>)>, LedgerError> {
        let mut data = self.write()?;
        let mut before = Vec::with_capacity(changes.len());
        for (id, change) in changes {
            let previous = match change {
                Some(row) => data.insert(id, row),
                None => data.remove(&id),
            };
            before.push((id, previous));
        }
        Ok(before)
    }
}

impl<E: Rankable> EntityTable<E> {
    /// Find an owner's row by display name (case-insensitive, trimmed)
    pub fn find_by_name(&self, owner: UserId, name: &str) -> Result<Option<E>, LedgerError> {
        let name_lower = name.trim().to_lowercase();
        Ok(self
            .read()?
            .values()
            .find(|row| row.is_owned_by(owner) && row.name().to_lowercase() == name_lower)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Group;

    #[test]
    fn test_get_owned_hides_foreign_rows() {
        let table = EntityTable::<Group>::new();
        let owner = UserId::new();
        let group = Group::new("Food", owner);
        let id = group.id;
        table.apply(vec![(id, Some(group))]).unwrap();

        assert!(table.get_owned(id, owner).unwrap().is_some());
        assert!(table.get_owned(id, UserId::new()).unwrap().is_none());
        assert!(table.get(id).unwrap().is_some());
    }

    #[test]
    fn test_apply_returns_before_images() {
        let table = EntityTable::<Group>::new();
        let owner = UserId::new();
        let mut group = Group::new("Food", owner);
        let id = group.id;
        table.apply(vec![(id, Some(group.clone()))]).unwrap();

        group.set_times_used(7);
        let before = table.apply(vec![(id, Some(group))]).unwrap();
        assert_eq!(before.len(), 1);
        assert_eq!(before[0].1.as_ref().unwrap().times_used, 0);

        // Reverting restores the previous row
        table.apply(before).unwrap();
        assert_eq!(table.get(id).unwrap().unwrap().times_used, 0);
    }

    #[test]
    fn test_list_owned_filters_by_owner() {
        let table = EntityTable::<Group>::new();
        let owner = UserId::new();
        let mine = Group::new("Mine", owner);
        let theirs = Group::new("Theirs", UserId::new());
        table.replace_all(vec![mine, theirs]).unwrap();

        let listed = table.list_owned(owner).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Mine");
        assert_eq!(table.count().unwrap(), 2);
    }
}
