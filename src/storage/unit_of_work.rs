//! Unit of work: the all-or-nothing boundary around a ledger mutation
//!
//! A unit of work holds the store's writer lock from `begin` until it is
//! committed or dropped. Reads go through it so that a row adjusted twice in
//! one mutation (reverse then forward on the same account) sees its own
//! staged value. Nothing reaches the shared tables or the disk before
//! `commit`, and a commit that fails part-way is rolled back.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::MutexGuard;

use tracing::{debug, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, Category, Group, Party, Record, Transaction, Transfer, UserId};

use super::table::EntityTable;
use super::{Storage, StoreFile};

/// A staged change to one row
#[derive(Debug, Clone)]
enum Change<E> {
    Insert(E),
    Update(E),
    Remove,
}

impl<E> Change<E> {
    fn row(&self) -> Option<&E> {
        match self {
            Change::Insert(row) | Change::Update(row) => Some(row),
            Change::Remove => None,
        }
    }

    fn into_row(self) -> Option<E> {
        match self {
            Change::Insert(row) | Change::Update(row) => Some(row),
            Change::Remove => None,
        }
    }
}

/// Staged changes for one entity kind
pub struct Staged<E: Record> {
    changes: HashMap<E::Id, Change<E>>,
}

impl<E: Record> Default for Staged<E> {
    fn default() -> Self {
        Self {
            changes: HashMap::new(),
        }
    }
}

impl<E: Record> Staged<E> {
    fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    fn inserts(&self) -> impl Iterator<Item = &E> {
        self.changes.values().filter_map(|c| match c {
            Change::Insert(row) => Some(row),
            _ => None,
        })
    }

    fn written(&self) -> impl Iterator<Item = &E> {
        self.changes.values().filter_map(Change::row)
    }
}

/// An entity kind the unit of work can stage
pub trait Stored: Record {
    /// File the kind is persisted in
    const FILE: StoreFile;

    /// Shared table holding committed rows
    fn table(storage: &Storage) -> &EntityTable<Self>;

    #[doc(hidden)]
    fn staged<'u>(uow: &'u UnitOfWork<'_>) -> &'u Staged<Self>;

    #[doc(hidden)]
    fn staged_mut<'u>(uow: &'u mut UnitOfWork<'_>) -> &'u mut Staged<Self>;
}

macro_rules! impl_stored {
    ($ty:ty, $field:ident, $file:expr, |$storage:ident| $table:expr) => {
        impl Stored for $ty {
            const FILE: StoreFile = $file;

            fn table($storage: &Storage) -> &EntityTable<Self> {
                $table
            }

            fn staged<'u>(uow: &'u UnitOfWork<'_>) -> &'u Staged<Self> {
                &uow.$field
            }

            fn staged_mut<'u>(uow: &'u mut UnitOfWork<'_>) -> &'u mut Staged<Self> {
                &mut uow.$field
            }
        }
    };
}

impl_stored!(Account, accounts, StoreFile::Accounts, |s| s.accounts.table());
impl_stored!(Group, groups, StoreFile::References, |s| s.references.groups());
impl_stored!(Category, categories, StoreFile::References, |s| s
    .references
    .categories());
impl_stored!(Party, parties, StoreFile::References, |s| s.references.parties());
impl_stored!(Transaction, transactions, StoreFile::Transactions, |s| s
    .transactions
    .table());
impl_stored!(Transfer, transfers, StoreFile::Transfers, |s| s.transfers.table());

/// Reverts one table to the before-images captured when it was written
trait Revert {
    fn revert(self: Box<Self>) -> LedgerResult<()>;
}

struct TableUndo<'s, E: Record> {
    table: &'s EntityTable<E>,
    before: Vec<(E::Id, Option<E>)>,
}

impl<E: Record> Revert for TableUndo<'_, E> {
    fn revert(self: Box<Self>) -> LedgerResult<()> {
        self.table.apply(self.before).map(|_| ())
    }
}

/// A staged, lock-holding set of changes to the ledger
pub struct UnitOfWork<'a> {
    storage: &'a Storage,
    _writer: MutexGuard<'a, ()>,
    accounts: Staged<Account>,
    groups: Staged<Group>,
    categories: Staged<Category>,
    parties: Staged<Party>,
    transactions: Staged<Transaction>,
    transfers: Staged<Transfer>,
}

impl<'a> UnitOfWork<'a> {
    /// Acquire the writer lock and start staging
    pub(crate) fn begin(storage: &'a Storage) -> LedgerResult<Self> {
        let writer = storage
            .writer()
            .lock()
            .map_err(|e| LedgerError::Storage(format!("Failed to acquire writer lock: {}", e)))?;

        Ok(Self {
            storage,
            _writer: writer,
            accounts: Staged::default(),
            groups: Staged::default(),
            categories: Staged::default(),
            parties: Staged::default(),
            transactions: Staged::default(),
            transfers: Staged::default(),
        })
    }

    /// Read a row as it will look after commit
    pub fn get<E: Stored>(&self, id: E::Id) -> LedgerResult<Option<E>> {
        match E::staged(self).changes.get(&id) {
            Some(change) => Ok(change.row().cloned()),
            None => E::table(self.storage).get(id),
        }
    }

    /// Read a row as it will look after commit, only if owned by `owner`
    pub fn get_owned<E: Stored>(&self, id: E::Id, owner: UserId) -> LedgerResult<Option<E>> {
        Ok(self.get::<E>(id)?.filter(|row| row.is_owned_by(owner)))
    }

    /// Borrow a row for modification, staging it as an update
    pub fn get_mut<E: Stored>(&mut self, id: E::Id) -> LedgerResult<Option<&mut E>> {
        let storage = self.storage;
        let change = match E::staged_mut(self).changes.entry(id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => match E::table(storage).get(id)? {
                Some(row) => entry.insert(Change::Update(row)),
                None => return Ok(None),
            },
        };

        Ok(match change {
            Change::Insert(row) | Change::Update(row) => Some(row),
            Change::Remove => None,
        })
    }

    /// Stage a new row
    pub fn insert<E: Stored>(&mut self, row: E) {
        E::staged_mut(self)
            .changes
            .insert(row.id(), Change::Insert(row));
    }

    /// Stage a full replacement of an existing row
    pub fn update<E: Stored>(&mut self, row: E) {
        let changes = &mut E::staged_mut(self).changes;
        let id = row.id();
        let change = match changes.get(&id) {
            Some(Change::Insert(_)) => Change::Insert(row),
            _ => Change::Update(row),
        };
        changes.insert(id, change);
    }

    /// Stage the removal of a row
    pub fn remove<E: Stored>(&mut self, id: E::Id) {
        let changes = &mut E::staged_mut(self).changes;
        if let Some(Change::Insert(_)) = changes.get(&id) {
            changes.remove(&id);
        } else {
            changes.insert(id, Change::Remove);
        }
    }

    /// Whether nothing has been staged
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
            && self.groups.is_empty()
            && self.categories.is_empty()
            && self.parties.is_empty()
            && self.transactions.is_empty()
            && self.transfers.is_empty()
    }

    fn touched_files(&self) -> Vec<StoreFile> {
        StoreFile::COMMIT_ORDER
            .into_iter()
            .filter(|file| match file {
                StoreFile::Transactions => !self.transactions.is_empty(),
                StoreFile::Transfers => !self.transfers.is_empty(),
                StoreFile::Accounts => !self.accounts.is_empty(),
                StoreFile::References => {
                    !(self.groups.is_empty() && self.categories.is_empty() && self.parties.is_empty())
                }
            })
            .collect()
    }

    fn check_inserts<E: Stored>(&self) -> LedgerResult<()> {
        for row in E::staged(self).inserts() {
            if E::table(self.storage).contains(row.id())? {
                return Err(conflict(format!("{} {} already exists", E::ENTITY, row.id())));
            }
        }
        Ok(())
    }

    fn check_reference<E: Stored>(&self, id: E::Id, owner: UserId, from: &str) -> LedgerResult<()> {
        if self.get_owned::<E>(id, owner)?.is_none() {
            return Err(conflict(format!(
                "{} references missing {} {}",
                from,
                E::ENTITY,
                id
            )));
        }
        Ok(())
    }

    /// Store-level constraints, checked before anything is applied
    fn check_constraints(&self) -> LedgerResult<()> {
        self.check_inserts::<Account>()?;
        self.check_inserts::<Group>()?;
        self.check_inserts::<Category>()?;
        self.check_inserts::<Party>()?;
        self.check_inserts::<Transaction>()?;
        self.check_inserts::<Transfer>()?;

        for account in self.accounts.written() {
            account
                .validate()
                .map_err(|e| conflict(format!("Account {}: {}", account.id, e)))?;
            if self.storage.accounts.currency(account.currency_id)?.is_none() {
                return Err(conflict(format!(
                    "Account {} references unknown currency {}",
                    account.id, account.currency_id
                )));
            }
        }

        for group in self.groups.written() {
            group.validate().map_err(|e| conflict(e.to_string()))?;
        }
        for category in self.categories.written() {
            category.validate().map_err(|e| conflict(e.to_string()))?;
        }
        for party in self.parties.written() {
            party.validate().map_err(|e| conflict(e.to_string()))?;
        }

        for txn in self.transactions.written() {
            txn.validate()
                .map_err(|e| conflict(format!("Transaction {}: {}", txn.id, e)))?;
            let from = format!("Transaction {}", txn.id);
            self.check_reference::<Account>(txn.account_id, txn.owner, &from)?;
            self.check_reference::<Group>(txn.group_id, txn.owner, &from)?;
            self.check_reference::<Category>(txn.category_id, txn.owner, &from)?;
            self.check_reference::<Party>(txn.party_id, txn.owner, &from)?;
        }

        for transfer in self.transfers.written() {
            transfer
                .validate()
                .map_err(|e| conflict(format!("Transfer {}: {}", transfer.id, e)))?;
            let from = format!("Transfer {}", transfer.id);
            self.check_reference::<Account>(transfer.from_account_id, transfer.owner, &from)?;
            self.check_reference::<Account>(transfer.to_account_id, transfer.owner, &from)?;
        }

        Ok(())
    }

    /// Apply the staged changes and persist every touched file
    ///
    /// # Errors
    ///
    /// - `PersistenceConflict` when a constraint is violated or a file could
    ///   not be written; in both cases nothing remains applied.
    /// - `PartialApplyFailure` when a file write failed and the files already
    ///   written could not be restored.
    pub fn commit(self) -> LedgerResult<()> {
        if self.is_empty() {
            return Ok(());
        }

        self.check_constraints()?;
        let files = self.touched_files();

        let UnitOfWork {
            storage,
            _writer,
            accounts,
            groups,
            categories,
            parties,
            transactions,
            transfers,
        } = self;

        let mut undo: Vec<Box<dyn Revert + 'a>> = Vec::new();
        let applied = apply_staged(storage.transactions.table(), transactions, &mut undo)
            .and_then(|_| apply_staged(storage.transfers.table(), transfers, &mut undo))
            .and_then(|_| apply_staged(storage.accounts.table(), accounts, &mut undo))
            .and_then(|_| apply_staged(storage.references.groups(), groups, &mut undo))
            .and_then(|_| apply_staged(storage.references.categories(), categories, &mut undo))
            .and_then(|_| apply_staged(storage.references.parties(), parties, &mut undo));

        if let Err(err) = applied {
            revert_all(undo)?;
            return Err(err);
        }

        for (i, file) in files.iter().enumerate() {
            if let Err(err) = storage.save_file(*file) {
                warn!(file = file.file_name(), error = %err, "commit failed, rolling back");
                return Err(rollback(storage, undo, &files[..i], *file, err));
            }
        }

        debug!(files = ?files, "unit of work committed");
        Ok(())
    }
}

fn conflict(message: String) -> LedgerError {
    LedgerError::PersistenceConflict(message)
}

fn apply_staged<'s, E: Record + 's>(
    table: &'s EntityTable<E>,
    staged: Staged<E>,
    undo: &mut Vec<Box<dyn Revert + 's>>,
) -> LedgerResult<()> {
    if staged.is_empty() {
        return Ok(());
    }

    let changes = staged
        .changes
        .into_iter()
        .map(|(id, change)| (id, change.into_row()))
        .collect();
    let before = table.apply(changes)?;
    undo.push(Box::new(TableUndo { table, before }));
    Ok(())
}

fn revert_all(undo: Vec<Box<dyn Revert + '_>>) -> LedgerResult<()> {
    for step in undo.into_iter().rev() {
        step.revert()?;
    }
    Ok(())
}

/// Undo an applied commit after `failed` could not be written
fn rollback(
    storage: &Storage,
    undo: Vec<Box<dyn Revert + '_>>,
    written: &[StoreFile],
    failed: StoreFile,
    err: LedgerError,
) -> LedgerError {
    if let Err(revert_err) = revert_all(undo) {
        return LedgerError::PartialApplyFailure {
            step: failed.to_string(),
            reason: format!("{}; in-memory rollback failed: {}", err, revert_err),
        };
    }

    for file in written {
        if let Err(restore_err) = storage.save_file(*file) {
            warn!(file = file.file_name(), error = %restore_err, "rollback could not restore file");
            return LedgerError::PartialApplyFailure {
                step: failed.to_string(),
                reason: format!(
                    "{}; restoring {} failed: {}",
                    err,
                    file.file_name(),
                    restore_err
                ),
            };
        }
    }

    conflict(format!("{} could not be written: {}", failed, err))
}
