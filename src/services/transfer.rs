//! Transfer service
//!
//! Moves funds between two accounts of the same owner. The source loses
//! `amount`, the destination gains `amount * coef`. Transfers do not touch
//! usage counters.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::error::{LedgerError, LedgerResult};
use crate::models::money::round_amount;
use crate::models::{Account, AccountId, Rankable, Transfer, TransferId, UserId};
use crate::storage::{Storage, UnitOfWork};

use super::balance::{self, Direction};

/// Service for managing transfers between accounts
pub struct TransferService<'a> {
    storage: &'a Storage,
}

/// Values of a transfer as entered by the user
#[derive(Debug, Clone)]
pub struct TransferInput {
    pub date: NaiveDate,
    pub amount: f64,
    pub coef: f64,
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
}

impl TransferInput {
    fn normalized(mut self) -> LedgerResult<Self> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(LedgerError::InvalidTransfer(
                "Transfer amount must be positive".into(),
            ));
        }
        if !self.coef.is_finite() || self.coef <= 0.0 {
            return Err(LedgerError::InvalidTransfer(
                "Conversion coefficient must be positive".into(),
            ));
        }
        if self.from_account_id == self.to_account_id {
            return Err(LedgerError::InvalidTransfer(
                "Cannot transfer to the same account".into(),
            ));
        }

        self.amount = round_amount(self.amount);
        if self.amount <= 0.0 {
            return Err(LedgerError::InvalidTransfer(
                "Transfer amount must be at least 0.01".into(),
            ));
        }
        Ok(self)
    }
}

impl<'a> TransferService<'a> {
    /// Create a new transfer service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a transfer between two accounts
    pub fn create(&self, input: TransferInput, owner: UserId) -> LedgerResult<Transfer> {
        let transfer = self.try_create(input, owner).inspect_err(|e| {
            debug!(owner = %owner, error = %e, "transfer create rejected");
        })?;

        info!(
            id = %transfer.id,
            from = %transfer.from_account_id,
            to = %transfer.to_account_id,
            amount = transfer.amount,
            coef = transfer.coef,
            "transfer created"
        );
        Ok(transfer)
    }

    fn try_create(&self, input: TransferInput, owner: UserId) -> LedgerResult<Transfer> {
        let input = input.normalized()?;
        let mut uow = self.storage.begin()?;

        check_account(&uow, input.from_account_id, owner, None)?;
        check_account(&uow, input.to_account_id, owner, None)?;

        let now = Utc::now();
        let transfer = Transfer {
            id: TransferId::new(),
            date: input.date,
            amount: input.amount,
            coef: input.coef,
            from_account_id: input.from_account_id,
            to_account_id: input.to_account_id,
            owner,
            created_at: now,
            updated_at: now,
        };

        uow.insert(transfer.clone());
        apply_transfer(&mut uow, &transfer, Direction::Forward)?;
        uow.commit()?;

        Ok(transfer)
    }

    /// Edit a transfer, reversing its previous effect and applying the new one
    pub fn edit(
        &self,
        id: TransferId,
        input: TransferInput,
        owner: UserId,
    ) -> LedgerResult<Transfer> {
        let transfer = self.try_edit(id, input, owner).inspect_err(|e| {
            debug!(id = %id, error = %e, "transfer edit rejected");
        })?;

        info!(
            id = %id,
            from = %transfer.from_account_id,
            to = %transfer.to_account_id,
            amount = transfer.amount,
            coef = transfer.coef,
            "transfer edited"
        );
        Ok(transfer)
    }

    fn try_edit(
        &self,
        id: TransferId,
        input: TransferInput,
        owner: UserId,
    ) -> LedgerResult<Transfer> {
        let input = input.normalized()?;
        let mut uow = self.storage.begin()?;

        let previous = uow
            .get_owned::<Transfer>(id, owner)?
            .ok_or_else(|| LedgerError::transfer_not_found(id.to_string()))?;

        let current = [previous.from_account_id, previous.to_account_id];
        check_account(&uow, input.from_account_id, owner, Some(&current))?;
        check_account(&uow, input.to_account_id, owner, Some(&current))?;

        let mut transfer = previous.clone();
        transfer.date = input.date;
        transfer.amount = input.amount;
        transfer.coef = input.coef;
        transfer.from_account_id = input.from_account_id;
        transfer.to_account_id = input.to_account_id;
        transfer.updated_at = Utc::now();
        uow.update(transfer.clone());

        apply_transfer(&mut uow, &previous, Direction::Reverse)?;
        apply_transfer(&mut uow, &transfer, Direction::Forward)?;
        uow.commit()?;

        Ok(transfer)
    }

    /// Delete a transfer, undoing its effect on both accounts
    pub fn delete(&self, id: TransferId, owner: UserId) -> LedgerResult<Transfer> {
        let transfer = self.try_delete(id, owner).inspect_err(|e| {
            debug!(id = %id, error = %e, "transfer delete rejected");
        })?;

        info!(id = %id, amount = transfer.amount, "transfer deleted");
        Ok(transfer)
    }

    fn try_delete(&self, id: TransferId, owner: UserId) -> LedgerResult<Transfer> {
        let mut uow = self.storage.begin()?;

        let transfer = uow
            .get_owned::<Transfer>(id, owner)?
            .ok_or_else(|| LedgerError::transfer_not_found(id.to_string()))?;

        apply_transfer(&mut uow, &transfer, Direction::Reverse)?;
        uow.remove::<Transfer>(id);
        uow.commit()?;

        Ok(transfer)
    }

    /// Get a transfer by ID
    pub fn get(&self, id: TransferId, owner: UserId) -> LedgerResult<Option<Transfer>> {
        self.storage.transfers.get_owned(id, owner)
    }

    /// Find a transfer by full or short ID string
    pub fn find(&self, identifier: &str, owner: UserId) -> LedgerResult<Option<Transfer>> {
        if let Ok(id) = identifier.parse::<TransferId>() {
            return self.get(id, owner);
        }

        Ok(self
            .storage
            .transfers
            .get_by_owner(owner)?
            .into_iter()
            .find(|t| t.id.matches_short(identifier)))
    }

    /// List an owner's transfers, most recent first
    pub fn list(&self, owner: UserId) -> LedgerResult<Vec<Transfer>> {
        self.storage.transfers.get_by_owner(owner)
    }
}

/// The account must be owned by `owner` and active, unless it is one of the
/// accounts the transfer currently uses
fn check_account(
    uow: &UnitOfWork<'_>,
    id: AccountId,
    owner: UserId,
    current: Option<&[AccountId; 2]>,
) -> LedgerResult<()> {
    match uow.get_owned::<Account>(id, owner)? {
        Some(account) if account.is_active() => Ok(()),
        Some(_) if current.is_some_and(|c| c.contains(&id)) => Ok(()),
        Some(_) => Err(LedgerError::InvalidTransfer(format!(
            "Account {} is inactive",
            id
        ))),
        None => Err(LedgerError::InvalidTransfer(format!(
            "Account {} is not available",
            id
        ))),
    }
}

/// Apply or undo both sides of a transfer
fn apply_transfer(
    uow: &mut UnitOfWork<'_>,
    transfer: &Transfer,
    direction: Direction,
) -> LedgerResult<()> {
    let (outgoing, incoming) = match direction {
        Direction::Forward => (-transfer.amount, transfer.destination_amount()),
        Direction::Reverse => (transfer.amount, -transfer.destination_amount()),
    };

    let from = uow
        .get_mut::<Account>(transfer.from_account_id)?
        .ok_or_else(|| LedgerError::account_not_found(transfer.from_account_id.to_string()))?;
    balance::apply_signed(from, outgoing);

    let to = uow
        .get_mut::<Account>(transfer.to_account_id)?
        .ok_or_else(|| LedgerError::account_not_found(transfer.to_account_id.to_string()))?;
    balance::apply_signed(to, incoming);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::TallyPaths;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn add_accounts(storage: &Storage, owner: UserId, balances: &[f64]) -> Vec<AccountId> {
        let currency = match storage.accounts.currency_by_code("EUR").unwrap() {
            Some(currency) => currency.id,
            None => storage.register_currency("EUR").unwrap().id,
        };
        let mut uow = storage.begin().unwrap();
        let ids = balances
            .iter()
            .enumerate()
            .map(|(i, balance)| {
                let account =
                    Account::with_opening_balance(format!("Account {}", i), currency, owner, *balance);
                let id = account.id;
                uow.insert(account);
                id
            })
            .collect();
        uow.commit().unwrap();
        ids
    }

    fn input(from: AccountId, to: AccountId, amount: f64, coef: f64) -> TransferInput {
        TransferInput {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            amount,
            coef,
            from_account_id: from,
            to_account_id: to,
        }
    }

    fn balance(storage: &Storage, id: AccountId) -> f64 {
        storage.accounts.get(id).unwrap().unwrap().balance
    }

    #[test]
    fn test_transfer_with_coefficient() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = UserId::new();
        let ids = add_accounts(&storage, owner, &[1000.0, 0.0]);
        let service = TransferService::new(&storage);

        let transfer = service.create(input(ids[0], ids[1], 100.0, 1.5), owner).unwrap();

        assert_eq!(transfer.destination_amount(), 150.0);
        assert_eq!(balance(&storage, ids[0]), 900.0);
        assert_eq!(balance(&storage, ids[1]), 150.0);

        // No usage counters touched
        for id in &ids {
            assert_eq!(storage.accounts.get(*id).unwrap().unwrap().times_used, 0);
        }
    }

    #[test]
    fn test_invalid_transfers() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = UserId::new();
        let ids = add_accounts(&storage, owner, &[10.0, 10.0]);
        let service = TransferService::new(&storage);

        let cases = [
            input(ids[0], ids[0], 5.0, 1.0),
            input(ids[0], ids[1], 0.0, 1.0),
            input(ids[0], ids[1], -5.0, 1.0),
            input(ids[0], ids[1], 5.0, 0.0),
            input(ids[0], ids[1], 5.0, f64::INFINITY),
            input(ids[0], ids[1], 0.001, 1.0),
        ];
        for case in cases {
            let err = service.create(case, owner).unwrap_err();
            assert!(matches!(err, LedgerError::InvalidTransfer(_)));
        }

        assert_eq!(balance(&storage, ids[0]), 10.0);
        assert_eq!(storage.transfers.count().unwrap(), 0);
    }

    #[test]
    fn test_foreign_or_inactive_accounts_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = UserId::new();
        let mine = add_accounts(&storage, owner, &[10.0, 10.0]);
        let theirs = add_accounts(&storage, UserId::new(), &[10.0]);
        let service = TransferService::new(&storage);

        let err = service.create(input(mine[0], theirs[0], 1.0, 1.0), owner).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransfer(_)));

        let mut uow = storage.begin().unwrap();
        uow.get_mut::<Account>(mine[1]).unwrap().unwrap().set_active(false);
        uow.commit().unwrap();

        let err = service.create(input(mine[0], mine[1], 1.0, 1.0), owner).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransfer(_)));
        assert_eq!(balance(&storage, theirs[0]), 10.0);
    }

    #[test]
    fn test_edit_keeps_deactivated_current_account() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = UserId::new();
        let ids = add_accounts(&storage, owner, &[500.0, 0.0, 0.0]);
        let service = TransferService::new(&storage);

        let transfer = service.create(input(ids[0], ids[1], 100.0, 1.0), owner).unwrap();

        let mut uow = storage.begin().unwrap();
        uow.get_mut::<Account>(ids[0]).unwrap().unwrap().set_active(false);
        uow.commit().unwrap();

        let edited = service
            .edit(transfer.id, input(ids[0], ids[1], 40.0, 1.0), owner)
            .unwrap();
        assert_eq!(edited.amount, 40.0);
        assert_eq!(balance(&storage, ids[0]), 460.0);
        assert_eq!(balance(&storage, ids[1]), 40.0);

        // Moving to the inactive account is only allowed for the accounts
        // the transfer already uses
        let mut uow = storage.begin().unwrap();
        uow.get_mut::<Account>(ids[2]).unwrap().unwrap().set_active(false);
        uow.commit().unwrap();

        let err = service
            .edit(transfer.id, input(ids[0], ids[2], 40.0, 1.0), owner)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransfer(_)));
        assert_eq!(balance(&storage, ids[1]), 40.0);
        assert_eq!(balance(&storage, ids[2]), 0.0);
    }

    #[test]
    fn test_edit_moves_effect() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = UserId::new();
        let ids = add_accounts(&storage, owner, &[100.0, 50.0, 0.0]);
        let service = TransferService::new(&storage);

        let transfer = service.create(input(ids[0], ids[1], 40.0, 1.0), owner).unwrap();
        let edited = service
            .edit(transfer.id, input(ids[0], ids[2], 10.0, 2.0), owner)
            .unwrap();

        assert_eq!(edited.id, transfer.id);
        assert_eq!(balance(&storage, ids[0]), 90.0);
        assert_eq!(balance(&storage, ids[1]), 50.0);
        assert_eq!(balance(&storage, ids[2]), 20.0);
    }

    #[test]
    fn test_edit_round_trip_and_delete() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = UserId::new();
        let ids = add_accounts(&storage, owner, &[100.0, 0.0]);
        let service = TransferService::new(&storage);

        let transfer = service.create(input(ids[0], ids[1], 33.33, 3.0), owner).unwrap();
        assert_eq!(balance(&storage, ids[1]), 99.99);

        service.edit(transfer.id, input(ids[0], ids[1], 1.0, 1.0), owner).unwrap();
        service.edit(transfer.id, input(ids[0], ids[1], 33.33, 3.0), owner).unwrap();
        assert_eq!(balance(&storage, ids[0]), 66.67);
        assert_eq!(balance(&storage, ids[1]), 99.99);

        service.delete(transfer.id, owner).unwrap();
        assert_eq!(balance(&storage, ids[0]), 100.0);
        assert_eq!(balance(&storage, ids[1]), 0.0);
        assert!(service.get(transfer.id, owner).unwrap().is_none());
    }

    #[test]
    fn test_edit_and_delete_are_owner_scoped() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = UserId::new();
        let ids = add_accounts(&storage, owner, &[100.0, 0.0]);
        let service = TransferService::new(&storage);
        let transfer = service.create(input(ids[0], ids[1], 5.0, 1.0), owner).unwrap();

        let stranger = UserId::new();
        assert!(service
            .edit(transfer.id, input(ids[0], ids[1], 1.0, 1.0), stranger)
            .unwrap_err()
            .is_not_found());
        assert!(service.delete(transfer.id, stranger).unwrap_err().is_not_found());
        assert_eq!(balance(&storage, ids[0]), 95.0);
    }

    #[test]
    fn test_list_most_recent_first() {
        let (_temp_dir, storage) = create_test_storage();
        let owner = UserId::new();
        let ids = add_accounts(&storage, owner, &[100.0, 0.0]);
        let service = TransferService::new(&storage);

        let mut old = input(ids[0], ids[1], 1.0, 1.0);
        old.date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let old = service.create(old, owner).unwrap();
        let new = service.create(input(ids[0], ids[1], 2.0, 1.0), owner).unwrap();

        let listed = service.list(owner).unwrap();
        assert_eq!(listed.iter().map(|t| t.id).collect::<Vec<_>>(), vec![new.id, old.id]);
        assert_eq!(
            service.find(&old.id.to_string(), owner).unwrap().unwrap().id,
            old.id
        );
    }
}
