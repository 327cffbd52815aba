//! Account repository for JSON storage
//!
//! Manages loading and saving accounts and currencies to accounts.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{Account, AccountId, Currency, CurrencyId, UserId};

use super::file_io::{read_json, write_json_atomic};
use super::table::EntityTable;

/// Serializable account data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct AccountData {
    #[serde(default)]
    pub currencies: Vec<Currency>,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

/// Repository for account and currency persistence
pub struct AccountRepository {
    path: PathBuf,
    accounts: EntityTable<Account>,
    currencies: RwLock<HashMap<CurrencyId, Currency>>,
}

impl AccountRepository {
    /// Create a new account repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            accounts: EntityTable::new(),
            currencies: RwLock::new(HashMap::new()),
        }
    }

    /// Load accounts and currencies from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: AccountData = read_json(&self.path)?;

        let mut currencies = self
            .currencies
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        currencies.clear();
        for currency in file_data.currencies {
            currencies.insert(currency.id, currency);
        }

        self.accounts.replace_all(file_data.accounts)
    }

    /// Save accounts and currencies to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let mut accounts = self.accounts.all()?;
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let file_data = AccountData {
            currencies: self.currencies()?,
            accounts,
        };

        write_json_atomic(&self.path, &file_data)
    }

    /// The underlying account table
    pub fn table(&self) -> &EntityTable<Account> {
        &self.accounts
    }

    /// Get an account by ID regardless of owner
    pub fn get(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        self.accounts.get(id)
    }

    /// Get an account by ID only if it belongs to `owner`
    pub fn get_owned(&self, id: AccountId, owner: UserId) -> Result<Option<Account>, LedgerError> {
        self.accounts.get_owned(id, owner)
    }

    /// All accounts of an owner
    pub fn list_owned(&self, owner: UserId) -> Result<Vec<Account>, LedgerError> {
        self.accounts.list_owned(owner)
    }

    /// Get an owner's account by name (case-insensitive)
    pub fn get_by_name(&self, owner: UserId, name: &str) -> Result<Option<Account>, LedgerError> {
        self.accounts.find_by_name(owner, name)
    }

    /// Check if an account name is already taken by this owner
    pub fn name_exists(
        &self,
        owner: UserId,
        name: &str,
        exclude_id: Option<AccountId>,
    ) -> Result<bool, LedgerError> {
        Ok(self
            .get_by_name(owner, name)?
            .is_some_and(|a| Some(a.id) != exclude_id))
    }

    /// Count accounts
    pub fn count(&self) -> Result<usize, LedgerError> {
        self.accounts.count()
    }

    /// Get a currency by ID
    pub fn currency(&self, id: CurrencyId) -> Result<Option<Currency>, LedgerError> {
        let currencies = self
            .currencies
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(currencies.get(&id).cloned())
    }

    /// Get a currency by code (case-insensitive)
    pub fn currency_by_code(&self, code: &str) -> Result<Option<Currency>, LedgerError> {
        let code = code.trim().to_uppercase();
        Ok(self.currencies()?.into_iter().find(|c| c.code == code))
    }

    /// All currencies ordered by code
    pub fn currencies(&self) -> Result<Vec<Currency>, LedgerError> {
        let currencies = self
            .currencies
            .read()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let mut list: Vec<_> = currencies.values().cloned().collect();
        list.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(list)
    }

    /// Insert a currency in memory; the caller persists it
    pub(crate) fn insert_currency(&self, currency: Currency) -> Result<(), LedgerError> {
        let mut currencies = self
            .currencies
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        currencies.insert(currency.id, currency);
        Ok(())
    }

    /// Remove a currency from memory (used to undo a failed registration)
    pub(crate) fn remove_currency(&self, id: CurrencyId) -> Result<(), LedgerError> {
        let mut currencies = self
            .currencies
            .write()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        currencies.remove(&id);
        Ok(())
    }
}
