//! Storage layer for Tally
//!
//! Provides JSON file storage with atomic writes, owner-scoped tables and a
//! single-writer unit of work that makes every ledger mutation all-or-nothing.

pub mod accounts;
pub mod file_io;
pub mod init;
pub mod references;
pub mod table;
pub mod transactions;
pub mod transfers;
pub mod unit_of_work;

pub use accounts::AccountRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use references::ReferenceRepository;
pub use table::EntityTable;
pub use transactions::TransactionRepository;
pub use transfers::TransferRepository;
pub use unit_of_work::{Stored, UnitOfWork};

use std::fmt;
use std::sync::Mutex;

use crate::config::paths::TallyPaths;
use crate::error::LedgerError;
use crate::models::Currency;

/// A persisted file of the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreFile {
    Transactions,
    Transfers,
    Accounts,
    References,
}

impl StoreFile {
    /// Commit order: row files first, then the side-effect files
    pub const COMMIT_ORDER: [StoreFile; 4] = [
        StoreFile::Transactions,
        StoreFile::Transfers,
        StoreFile::Accounts,
        StoreFile::References,
    ];

    /// File name on disk
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Transactions => "transactions.json",
            Self::Transfers => "transfers.json",
            Self::Accounts => "accounts.json",
            Self::References => "references.json",
        }
    }

    /// The adjustment a write of this file carries
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Transactions => "transaction rows",
            Self::Transfers => "transfer rows",
            Self::Accounts => "account balances and usage counters",
            Self::References => "group/category/party usage counters",
        }
    }
}

impl fmt::Display for StoreFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.describe(), self.file_name())
    }
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: TallyPaths,
    pub accounts: AccountRepository,
    pub references: ReferenceRepository,
    pub transactions: TransactionRepository,
    pub transfers: TransferRepository,
    writer: Mutex<()>,
    /// Remaining successful saves per file before every save of it fails
    #[cfg(test)]
    save_faults: Mutex<std::collections::HashMap<StoreFile, usize>>,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: TallyPaths) -> Result<Self, LedgerError> {
        paths.ensure_directories()?;

        Ok(Self {
            accounts: AccountRepository::new(paths.accounts_file()),
            references: ReferenceRepository::new(paths.references_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            transfers: TransferRepository::new(paths.transfers_file()),
            paths,
            writer: Mutex::new(()),
            #[cfg(test)]
            save_faults: Mutex::new(std::collections::HashMap::new()),
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &TallyPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), LedgerError> {
        self.accounts.load()?;
        self.references.load()?;
        self.transactions.load()?;
        self.transfers.load()?;
        Ok(())
    }

    /// Save a single file from the in-memory state
    pub(crate) fn save_file(&self, file: StoreFile) -> Result<(), LedgerError> {
        #[cfg(test)]
        self.check_save_fault(file)?;

        match file {
            StoreFile::Transactions => self.transactions.save(),
            StoreFile::Transfers => self.transfers.save(),
            StoreFile::Accounts => self.accounts.save(),
            StoreFile::References => self.references.save(),
        }
    }

    /// Start a unit of work; blocks until no other writer is active
    pub fn begin(&self) -> Result<UnitOfWork<'_>, LedgerError> {
        UnitOfWork::begin(self)
    }

    /// Register a currency shared by all owners
    pub fn register_currency(&self, code: &str) -> Result<Currency, LedgerError> {
        let _writer = self
            .writer
            .lock()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire writer lock: {}", e)))?;

        let currency = Currency::new(code);
        currency
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        if self.accounts.currency_by_code(&currency.code)?.is_some() {
            return Err(LedgerError::Duplicate {
                entity_type: "Currency",
                identifier: currency.code,
            });
        }

        self.accounts.insert_currency(currency.clone())?;
        if let Err(e) = self.accounts.save() {
            self.accounts.remove_currency(currency.id)?;
            return Err(e);
        }

        Ok(currency)
    }

    pub(crate) fn writer(&self) -> &Mutex<()> {
        &self.writer
    }

    /// Let `file` be saved `successes` more times, then fail every save
    #[cfg(test)]
    pub(crate) fn fail_saves_after(&self, file: StoreFile, successes: usize) {
        if let Ok(mut faults) = self.save_faults.lock() {
            faults.insert(file, successes);
        }
    }

    #[cfg(test)]
    fn check_save_fault(&self, file: StoreFile) -> Result<(), LedgerError> {
        let mut faults = self
            .save_faults
            .lock()
            .map_err(|e| LedgerError::Storage(e.to_string()))?;
        match faults.get_mut(&file) {
            Some(0) => Err(LedgerError::Storage(format!(
                "Failed to write {}: disk full",
                file.file_name()
            ))),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert_eq!(storage.accounts.count().unwrap(), 0);
    }

    #[test]
    fn test_register_currency_rejects_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths.clone()).unwrap();
        storage.load_all().unwrap();

        let gbp = storage.register_currency("gbp").unwrap();
        assert_eq!(gbp.code, "GBP");

        let err = storage.register_currency("GBP").unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate { .. }));

        // Persisted
        let mut reloaded = Storage::new(paths).unwrap();
        reloaded.load_all().unwrap();
        assert!(reloaded.accounts.currency(gbp.id).unwrap().is_some());
    }
}
