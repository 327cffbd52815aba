//! Group, Category and Party repository for JSON storage
//!
//! Manages loading and saving the tagging dimensions to references.json

use std::path::PathBuf;

use crate::error::LedgerError;
use crate::models::{Category, Group, Party};

use super::file_io::{read_json, write_json_atomic};
use super::table::EntityTable;

/// Serializable reference data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub parties: Vec<Party>,
}

/// Repository for group, category and party persistence
pub struct ReferenceRepository {
    path: PathBuf,
    groups: EntityTable<Group>,
    categories: EntityTable<Category>,
    parties: EntityTable<Party>,
}

impl ReferenceRepository {
    /// Create a new reference repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            groups: EntityTable::new(),
            categories: EntityTable::new(),
            parties: EntityTable::new(),
        }
    }

    /// Load references from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: ReferenceData = read_json(&self.path)?;

        self.groups.replace_all(file_data.groups)?;
        self.categories.replace_all(file_data.categories)?;
        self.parties.replace_all(file_data.parties)?;

        Ok(())
    }

    /// Save references to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let mut groups = self.groups.all()?;
        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let mut categories = self.categories.all()?;
        categories.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let mut parties = self.parties.all()?;
        parties.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let file_data = ReferenceData {
            groups,
            categories,
            parties,
        };

        write_json_atomic(&self.path, &file_data)
    }

    /// The group table
    pub fn groups(&self) -> &EntityTable<Group> {
        &self.groups
    }

    /// The category table
    pub fn categories(&self) -> &EntityTable<Category> {
        &self.categories
    }

    /// The party table
    pub fn parties(&self) -> &EntityTable<Party> {
        &self.parties
    }
}
