//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::LedgerError;
use crate::models::{AccountId, Transaction, TransactionId, UserId};

use super::file_io::{read_json, write_json_atomic};
use super::table::EntityTable;

/// Serializable transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// Repository for transaction persistence
pub struct TransactionRepository {
    path: PathBuf,
    rows: EntityTable<Transaction>,
}

/// Sort transactions chronologically (date, then creation time)
fn sort_chronologically(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
}

impl TransactionRepository {
    /// Create a new transaction repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            rows: EntityTable::new(),
        }
    }

    /// Load transactions from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: TransactionData = read_json(&self.path)?;
        self.rows.replace_all(file_data.transactions)
    }

    /// Save transactions to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let mut transactions = self.rows.all()?;
        sort_chronologically(&mut transactions);

        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    /// The underlying table
    pub fn table(&self) -> &EntityTable<Transaction> {
        &self.rows
    }

    /// Get a transaction by ID only if it belongs to `owner`
    pub fn get_owned(
        &self,
        id: TransactionId,
        owner: UserId,
    ) -> Result<Option<Transaction>, LedgerError> {
        self.rows.get_owned(id, owner)
    }

    /// All transactions of an owner in chronological order
    pub fn get_by_owner(&self, owner: UserId) -> Result<Vec<Transaction>, LedgerError> {
        let mut transactions = self.rows.list_owned(owner)?;
        sort_chronologically(&mut transactions);
        Ok(transactions)
    }

    /// Transactions booked against an account in chronological order
    pub fn get_by_account(
        &self,
        owner: UserId,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let mut transactions = self.get_by_owner(owner)?;
        transactions.retain(|t| t.account_id == account_id);
        Ok(transactions)
    }

    /// Transactions within an inclusive date range in chronological order
    pub fn get_by_date_range(
        &self,
        owner: UserId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let mut transactions = self.get_by_owner(owner)?;
        transactions.retain(|t| t.date >= start && t.date <= end);
        Ok(transactions)
    }

    /// Count transactions
    pub fn count(&self) -> Result<usize, LedgerError> {
        self.rows.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryId, GroupId, PartyId};
    use chrono::Utc;
    use tempfile::TempDir;

    fn txn(owner: UserId, account_id: AccountId, day: u32) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: TransactionId::new(),
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            amount: 10.0,
            minus: true,
            account_id,
            group_id: GroupId::new(),
            category_id: CategoryId::new(),
            party_id: PartyId::new(),
            comment: None,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_queries_are_owner_scoped_and_chronological() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        repo.load().unwrap();

        let owner = UserId::new();
        let account = AccountId::new();
        let late = txn(owner, account, 20);
        let early = txn(owner, account, 2);
        let foreign = txn(UserId::new(), account, 5);
        repo.table()
            .replace_all(vec![late.clone(), early.clone(), foreign])
            .unwrap();

        let listed = repo.get_by_owner(owner).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, early.id);
        assert_eq!(listed[1].id, late.id);

        let ranged = repo
            .get_by_date_range(
                owner,
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            )
            .unwrap();
        assert_eq!(ranged.len(), 1);
        assert_eq!(repo.get_by_account(owner, AccountId::new()).unwrap().len(), 0);
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("transactions.json");
        let repo = TransactionRepository::new(path.clone());

        let owner = UserId::new();
        let mut row = txn(owner, AccountId::new(), 1);
        row.comment = Some("lunch".into());
        let id = row.id;
        repo.table().replace_all(vec![row]).unwrap();
        repo.save().unwrap();

        let reloaded = TransactionRepository::new(path);
        reloaded.load().unwrap();
        let found = reloaded.get_owned(id, owner).unwrap().unwrap();
        assert_eq!(found.comment.as_deref(), Some("lunch"));
    }
}
