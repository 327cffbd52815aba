//! Account service
//!
//! Provides business logic for account management: creation with an opening
//! balance, renaming and activation. Balances are never written here after
//! creation; only the transaction and transfer engines adjust them.

use chrono::Utc;
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::account::MAX_NAME_LEN;
use crate::models::{Account, AccountId, Currency, Rankable, UserId};
use crate::storage::Storage;

use super::ranker::sort_by_usage;

/// Service for account management
pub struct AccountService<'a> {
    storage: &'a Storage,
}

fn validate_name(name: &str) -> LedgerResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::Validation(
            "Account name cannot be empty".into(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(LedgerError::Validation(format!(
            "Account name too long (max {} chars)",
            MAX_NAME_LEN
        )));
    }
    Ok(name)
}

impl<'a> AccountService<'a> {
    /// Create a new account service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new account
    pub fn create(
        &self,
        name: &str,
        currency_code: &str,
        opening_balance: f64,
        owner: UserId,
    ) -> LedgerResult<Account> {
        let name = validate_name(name)?;

        if !opening_balance.is_finite() {
            return Err(LedgerError::Validation(
                "Opening balance must be a number".into(),
            ));
        }

        let currency = self.currency_by_code(currency_code)?;

        let mut uow = self.storage.begin()?;
        if self.storage.accounts.name_exists(owner, name, None)? {
            return Err(LedgerError::Duplicate {
                entity_type: "Account",
                identifier: name.to_string(),
            });
        }

        let account = Account::with_opening_balance(name, currency.id, owner, opening_balance);
        uow.insert(account.clone());
        uow.commit()?;

        info!(id = %account.id, currency = %currency.code, balance = account.balance, "account created");
        Ok(account)
    }

    /// Get an account by ID
    pub fn get(&self, id: AccountId, owner: UserId) -> LedgerResult<Option<Account>> {
        self.storage.accounts.get_owned(id, owner)
    }

    /// Find an account by name or ID string
    pub fn find(&self, identifier: &str, owner: UserId) -> LedgerResult<Option<Account>> {
        if let Some(account) = self.storage.accounts.get_by_name(owner, identifier)? {
            return Ok(Some(account));
        }

        if let Ok(id) = identifier.parse::<AccountId>() {
            return self.get(id, owner);
        }

        Ok(self
            .storage
            .accounts
            .list_owned(owner)?
            .into_iter()
            .find(|a| a.id.matches_short(identifier)))
    }

    /// All accounts of an owner, inactive included, most used first
    pub fn list(&self, owner: UserId) -> LedgerResult<Vec<Account>> {
        let mut accounts = self.storage.accounts.list_owned(owner)?;
        sort_by_usage(&mut accounts);
        Ok(accounts)
    }

    /// Active accounts of an owner ordered by name
    pub fn active_by_name(&self, owner: UserId) -> LedgerResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self
            .storage
            .accounts
            .list_owned(owner)?
            .into_iter()
            .filter(|a| a.is_active)
            .collect();
        accounts.sort_by_cached_key(|a| a.name.to_lowercase());
        Ok(accounts)
    }

    /// Rename an account
    pub fn rename(&self, id: AccountId, name: &str, owner: UserId) -> LedgerResult<Account> {
        let name = validate_name(name)?;

        let mut uow = self.storage.begin()?;
        if self.storage.accounts.name_exists(owner, name, Some(id))? {
            return Err(LedgerError::Duplicate {
                entity_type: "Account",
                identifier: name.to_string(),
            });
        }

        let mut account = uow
            .get_owned::<Account>(id, owner)?
            .ok_or_else(|| LedgerError::account_not_found(id.to_string()))?;
        account.name = name.to_string();
        account.updated_at = Utc::now();
        uow.update(account.clone());
        uow.commit()?;

        info!(id = %id, name = %account.name, "account renamed");
        Ok(account)
    }

    /// Activate or deactivate an account
    ///
    /// Inactive accounts keep their balance and history but are no longer
    /// offered for new transactions.
    pub fn set_active(&self, id: AccountId, active: bool, owner: UserId) -> LedgerResult<Account> {
        let mut uow = self.storage.begin()?;

        let mut account = uow
            .get_owned::<Account>(id, owner)?
            .ok_or_else(|| LedgerError::account_not_found(id.to_string()))?;

        if account.is_active == active {
            return Err(LedgerError::Validation(format!(
                "Account is already {}",
                if active { "active" } else { "inactive" }
            )));
        }

        account.set_active(active);
        uow.update(account.clone());
        uow.commit()?;

        info!(id = %id, active, "account activation changed");
        Ok(account)
    }

    /// Currency an account is denominated in
    pub fn currency_of(&self, account: &Account) -> LedgerResult<Option<Currency>> {
        self.storage.accounts.currency(account.currency_id)
    }

    /// Look up a registered currency by code
    pub fn currency_by_code(&self, code: &str) -> LedgerResult<Currency> {
        self.storage
            .accounts
            .currency_by_code(code)?
            .ok_or_else(|| LedgerError::reference_not_found("Currency", code.trim().to_uppercase()))
    }

    /// All registered currencies
    pub fn currencies(&self) -> LedgerResult<Vec<Currency>> {
        self.storage.accounts.currencies()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::TallyPaths;
    use crate::storage::initialize_storage;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_create_account() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let owner = UserId::new();

        let account = service.create("  Checking ", "eur", 1000.006, owner).unwrap();

        assert_eq!(account.name, "Checking");
        assert_eq!(account.balance, 1000.01);
        assert!(account.is_active);
        assert_eq!(service.currency_of(&account).unwrap().unwrap().code, "EUR");
    }

    #[test]
    fn test_active_by_name() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let owner = UserId::new();

        service.create("savings", "EUR", 0.0, owner).unwrap();
        let closed = service.create("Brokerage", "EUR", 0.0, owner).unwrap();
        service.create("Cash", "USD", 0.0, owner).unwrap();
        service.create("Alien", "EUR", 0.0, UserId::new()).unwrap();
        service.set_active(closed.id, false, owner).unwrap();

        let names: Vec<_> = service
            .active_by_name(owner)
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Cash", "savings"]);
    }

    #[test]
    fn test_create_duplicate_name() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let owner = UserId::new();

        service.create("Checking", "EUR", 0.0, owner).unwrap();

        let result = service.create("checking", "USD", 0.0, owner);
        assert!(matches!(result, Err(LedgerError::Duplicate { .. })));

        // Another owner may reuse the name
        assert!(service.create("Checking", "EUR", 0.0, UserId::new()).is_ok());
    }

    #[test]
    fn test_create_rejects_bad_input() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let owner = UserId::new();

        assert!(service.create("   ", "EUR", 0.0, owner).unwrap_err().is_validation());
        assert!(service
            .create(&"x".repeat(MAX_NAME_LEN + 1), "EUR", 0.0, owner)
            .unwrap_err()
            .is_validation());
        assert!(service
            .create("Cash", "EUR", f64::NAN, owner)
            .unwrap_err()
            .is_validation());
        assert!(service
            .create("Cash", "XYZ", 0.0, owner)
            .unwrap_err()
            .is_reference_not_found());
    }

    #[test]
    fn test_find_account() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let owner = UserId::new();

        let created = service.create("My Checking", "EUR", 0.0, owner).unwrap();

        let found = service.find("my checking", owner).unwrap().unwrap();
        assert_eq!(found.id, created.id);

        let found = service.find(&created.id.to_string(), owner).unwrap().unwrap();
        assert_eq!(found.id, created.id);

        assert!(service.find("My Checking", UserId::new()).unwrap().is_none());
    }

    #[test]
    fn test_rename_and_activation() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let owner = UserId::new();

        let account = service.create("Old Name", "EUR", 10.0, owner).unwrap();
        service.create("Taken", "EUR", 0.0, owner).unwrap();

        let renamed = service.rename(account.id, "New Name", owner).unwrap();
        assert_eq!(renamed.name, "New Name");
        assert_eq!(renamed.balance, 10.0);

        assert!(matches!(
            service.rename(account.id, "taken", owner),
            Err(LedgerError::Duplicate { .. })
        ));

        let inactive = service.set_active(account.id, false, owner).unwrap();
        assert!(!inactive.is_active);
        assert!(service.set_active(account.id, false, owner).unwrap_err().is_validation());

        // Still listed
        assert_eq!(service.list(owner).unwrap().len(), 2);

        assert!(service
            .set_active(account.id, true, UserId::new())
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_list_most_used_first() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let owner = UserId::new();

        service.create("Rare", "EUR", 0.0, owner).unwrap();
        let often = service.create("Often", "EUR", 0.0, owner).unwrap();

        let mut uow = storage.begin().unwrap();
        uow.get_mut::<Account>(often.id).unwrap().unwrap().set_times_used(4);
        uow.commit().unwrap();

        let names: Vec<_> = service.list(owner).unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Often", "Rare"]);
    }
}
