//! Transfer repository for JSON storage
//!
//! Manages loading and saving transfers to transfers.json

use std::path::PathBuf;

use crate::error::LedgerError;
use crate::models::{Transfer, TransferId, UserId};

use super::file_io::{read_json, write_json_atomic};
use super::table::EntityTable;

/// Serializable transfer data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransferData {
    transfers: Vec<Transfer>,
}

/// Repository for transfer persistence
pub struct TransferRepository {
    path: PathBuf,
    rows: EntityTable<Transfer>,
}

impl TransferRepository {
    /// Create a new transfer repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            rows: EntityTable::new(),
        }
    }

    /// Load transfers from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: TransferData = read_json(&self.path)?;
        self.rows.replace_all(file_data.transfers)
    }

    /// Save transfers to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let mut transfers = self.rows.all()?;
        transfers.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

        write_json_atomic(&self.path, &TransferData { transfers })
    }

    /// The underlying table
    pub fn table(&self) -> &EntityTable<Transfer> {
        &self.rows
    }

    /// Get a transfer by ID only if it belongs to `owner`
    pub fn get_owned(&self, id: TransferId, owner: UserId) -> Result<Option<Transfer>, LedgerError> {
        self.rows.get_owned(id, owner)
    }

    /// All transfers of an owner, most recent first
    pub fn get_by_owner(&self, owner: UserId) -> Result<Vec<Transfer>, LedgerError> {
        let mut transfers = self.rows.list_owned(owner)?;
        transfers.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(transfers)
    }

    /// Count transfers
    pub fn count(&self) -> Result<usize, LedgerError> {
        self.rows.count()
    }
}
