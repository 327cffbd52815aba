//! Transaction service
//!
//! Create, edit and delete income and expense records. Each mutation runs in
//! one unit of work: the previous effect of the transaction is reversed on its
//! account and tags, the new effect is applied, and everything is committed
//! together or not at all.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::error::{LedgerError, LedgerResult};
use crate::models::money::round_amount;
use crate::models::transaction::MAX_COMMENT_LEN;
use crate::models::{
    Account, AccountId, Category, CategoryId, Group, GroupId, Party, PartyId, Rankable,
    Transaction, TransactionEffect, TransactionId, UserId,
};
use crate::storage::{Storage, Stored, UnitOfWork};

use super::balance::{self, Direction};
use super::usage::{self, UsageAnomaly, UsageDelta, UsagePolicy};

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
    policy: UsagePolicy,
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Filter by account
    pub account_id: Option<AccountId>,
    /// Filter by date range start
    pub start_date: Option<NaiveDate>,
    /// Filter by date range end
    pub end_date: Option<NaiveDate>,
    /// Only expenses (`true`) or only incomes (`false`)
    pub is_expense: Option<bool>,
    /// Maximum number of transactions to return
    pub limit: Option<usize>,
}

impl TransactionFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by account
    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Filter by date range
    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Filter by direction
    pub fn expenses(mut self, is_expense: bool) -> Self {
        self.is_expense = Some(is_expense);
        self
    }

    /// Limit results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Values of a transaction as entered by the user
#[derive(Debug, Clone)]
pub struct TransactionInput {
    pub date: NaiveDate,
    pub amount: f64,
    pub is_expense: bool,
    pub account_id: AccountId,
    pub group_id: GroupId,
    pub category_id: CategoryId,
    pub party_id: PartyId,
    pub comment: Option<String>,
}

impl TransactionInput {
    fn normalized(mut self) -> LedgerResult<Self> {
        if !self.amount.is_finite() {
            return Err(LedgerError::Validation("Amount must be a number".into()));
        }
        if self.amount < 0.0 {
            return Err(LedgerError::Validation(
                "Amount cannot be negative; use the expense flag for outflows".into(),
            ));
        }
        self.amount = round_amount(self.amount);

        if let Some(comment) = &self.comment {
            let len = comment.chars().count();
            if len > MAX_COMMENT_LEN {
                return Err(LedgerError::Validation(format!(
                    "Comment too long ({} chars, max {})",
                    len, MAX_COMMENT_LEN
                )));
            }
        }

        Ok(self)
    }

    fn effect(&self) -> TransactionEffect {
        TransactionEffect {
            amount: self.amount,
            is_expense: self.is_expense,
            account_id: self.account_id,
            group_id: self.group_id,
            category_id: self.category_id,
            party_id: self.party_id,
        }
    }
}

/// Result of an edit or delete
#[derive(Debug, Clone)]
pub struct TransactionOutcome {
    /// The transaction after the edit, or as it was before deletion
    pub transaction: Transaction,
    /// Usage counters that were already zero when they had to be decremented
    pub anomalies: Vec<UsageAnomaly>,
}

/// The reference must exist, be owned by `owner` and be active, unless it is
/// the one currently assigned
fn resolve<E: Stored + Rankable>(
    uow: &UnitOfWork<'_>,
    id: E::Id,
    owner: UserId,
    current: Option<E::Id>,
) -> LedgerResult<()> {
    match uow.get_owned::<E>(id, owner)? {
        Some(row) if row.is_active() || current == Some(id) => Ok(()),
        _ => Err(LedgerError::reference_not_found(E::ENTITY, id.to_string())),
    }
}

impl<'a> TransactionService<'a> {
    /// Create a new transaction service
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            policy: UsagePolicy::default(),
        }
    }

    /// Use the given policy for usage counter underflows
    pub fn with_policy(mut self, policy: UsagePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Create a new transaction
    pub fn create(&self, input: TransactionInput, owner: UserId) -> LedgerResult<Transaction> {
        let txn = self.try_create(input, owner).inspect_err(|e| {
            debug!(owner = %owner, error = %e, "transaction create rejected");
        })?;

        info!(
            id = %txn.id,
            account = %txn.account_id,
            amount = txn.amount,
            expense = txn.minus,
            "transaction created"
        );
        Ok(txn)
    }

    fn try_create(&self, input: TransactionInput, owner: UserId) -> LedgerResult<Transaction> {
        let input = input.normalized()?;
        let mut uow = self.storage.begin()?;

        self.check_references(&uow, &input, owner, None)?;

        let now = Utc::now();
        let txn = Transaction {
            id: TransactionId::new(),
            date: input.date,
            amount: input.amount,
            minus: input.is_expense,
            account_id: input.account_id,
            group_id: input.group_id,
            category_id: input.category_id,
            party_id: input.party_id,
            comment: input.comment,
            owner,
            created_at: now,
            updated_at: now,
        };

        uow.insert(txn.clone());
        let mut anomalies = Vec::new();
        self.apply_effect(&mut uow, &txn.effect(), Direction::Forward, &mut anomalies)?;
        uow.commit()?;

        Ok(txn)
    }

    /// Edit a transaction, moving its effect from the old values to the new
    pub fn edit(
        &self,
        id: TransactionId,
        input: TransactionInput,
        owner: UserId,
    ) -> LedgerResult<TransactionOutcome> {
        let outcome = self.try_edit(id, input, owner).inspect_err(|e| {
            debug!(id = %id, error = %e, "transaction edit rejected");
        })?;

        info!(
            id = %id,
            account = %outcome.transaction.account_id,
            amount = outcome.transaction.amount,
            expense = outcome.transaction.minus,
            anomalies = outcome.anomalies.len(),
            "transaction edited"
        );
        Ok(outcome)
    }

    fn try_edit(
        &self,
        id: TransactionId,
        input: TransactionInput,
        owner: UserId,
    ) -> LedgerResult<TransactionOutcome> {
        let input = input.normalized()?;
        let mut uow = self.storage.begin()?;

        let mut txn = uow
            .get_owned::<Transaction>(id, owner)?
            .ok_or_else(|| LedgerError::transaction_not_found(id.to_string()))?;
        let previous = txn.effect();

        self.check_references(&uow, &input, owner, Some(&previous))?;

        txn.date = input.date;
        txn.amount = input.amount;
        txn.minus = input.is_expense;
        txn.account_id = input.account_id;
        txn.group_id = input.group_id;
        txn.category_id = input.category_id;
        txn.party_id = input.party_id;
        txn.comment = input.comment;
        txn.updated_at = Utc::now();
        uow.update(txn.clone());

        let mut anomalies = Vec::new();
        self.apply_effect(&mut uow, &previous, Direction::Reverse, &mut anomalies)?;
        self.apply_effect(&mut uow, &txn.effect(), Direction::Forward, &mut anomalies)?;
        uow.commit()?;

        Ok(TransactionOutcome {
            transaction: txn,
            anomalies,
        })
    }

    /// Delete a transaction, undoing its effect
    pub fn delete(&self, id: TransactionId, owner: UserId) -> LedgerResult<TransactionOutcome> {
        let outcome = self.try_delete(id, owner).inspect_err(|e| {
            debug!(id = %id, error = %e, "transaction delete rejected");
        })?;

        info!(
            id = %id,
            account = %outcome.transaction.account_id,
            amount = outcome.transaction.amount,
            anomalies = outcome.anomalies.len(),
            "transaction deleted"
        );
        Ok(outcome)
    }

    fn try_delete(&self, id: TransactionId, owner: UserId) -> LedgerResult<TransactionOutcome> {
        let mut uow = self.storage.begin()?;

        let txn = uow
            .get_owned::<Transaction>(id, owner)?
            .ok_or_else(|| LedgerError::transaction_not_found(id.to_string()))?;

        let mut anomalies = Vec::new();
        self.apply_effect(&mut uow, &txn.effect(), Direction::Reverse, &mut anomalies)?;
        uow.remove::<Transaction>(id);
        uow.commit()?;

        Ok(TransactionOutcome {
            transaction: txn,
            anomalies,
        })
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId, owner: UserId) -> LedgerResult<Option<Transaction>> {
        self.storage.transactions.get_owned(id, owner)
    }

    /// Find a transaction by full or short ID string
    pub fn find(&self, identifier: &str, owner: UserId) -> LedgerResult<Option<Transaction>> {
        if let Ok(id) = identifier.parse::<TransactionId>() {
            return self.get(id, owner);
        }

        Ok(self
            .storage
            .transactions
            .get_by_owner(owner)?
            .into_iter()
            .find(|t| t.id.matches_short(identifier)))
    }

    /// List an owner's transactions in chronological order
    ///
    /// With a limit, the most recent `limit` matches are kept.
    pub fn list(&self, owner: UserId, filter: TransactionFilter) -> LedgerResult<Vec<Transaction>> {
        let mut transactions = if let Some(account_id) = filter.account_id {
            self.storage.transactions.get_by_account(owner, account_id)?
        } else if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            self.storage
                .transactions
                .get_by_date_range(owner, start, end)?
        } else {
            self.storage.transactions.get_by_owner(owner)?
        };

        if let Some(start) = filter.start_date {
            transactions.retain(|t| t.date >= start);
        }
        if let Some(end) = filter.end_date {
            transactions.retain(|t| t.date <= end);
        }
        if let Some(is_expense) = filter.is_expense {
            transactions.retain(|t| t.minus == is_expense);
        }

        if let Some(limit) = filter.limit {
            let excess = transactions.len().saturating_sub(limit);
            transactions.drain(..excess);
        }

        Ok(transactions)
    }

    /// Total income booked on or after `since`, currencies summed as stored
    pub fn income_since(&self, owner: UserId, since: NaiveDate) -> LedgerResult<f64> {
        let total: f64 = self
            .storage
            .transactions
            .get_by_owner(owner)?
            .iter()
            .filter(|t| !t.minus && t.date >= since)
            .map(|t| t.amount)
            .sum();
        Ok(round_amount(total))
    }

    fn check_references(
        &self,
        uow: &UnitOfWork<'_>,
        input: &TransactionInput,
        owner: UserId,
        current: Option<&TransactionEffect>,
    ) -> LedgerResult<()> {
        resolve::<Account>(uow, input.account_id, owner, current.map(|c| c.account_id))?;
        resolve::<Group>(uow, input.group_id, owner, current.map(|c| c.group_id))?;
        resolve::<Category>(uow, input.category_id, owner, current.map(|c| c.category_id))?;
        resolve::<Party>(uow, input.party_id, owner, current.map(|c| c.party_id))?;
        Ok(())
    }

    /// Apply or undo an effect on the account balance and the four counters
    fn apply_effect(
        &self,
        uow: &mut UnitOfWork<'_>,
        effect: &TransactionEffect,
        direction: Direction,
        anomalies: &mut Vec<UsageAnomaly>,
    ) -> LedgerResult<()> {
        let delta = match direction {
            Direction::Forward => UsageDelta::Increment,
            Direction::Reverse => UsageDelta::Decrement,
        };

        let account = uow
            .get_mut::<Account>(effect.account_id)?
            .ok_or_else(|| LedgerError::account_not_found(effect.account_id.to_string()))?;
        balance::apply(account, effect.amount, effect.is_expense, direction);

        self.bump::<Account>(uow, effect.account_id, delta, anomalies)?;
        self.bump::<Group>(uow, effect.group_id, delta, anomalies)?;
        self.bump::<Category>(uow, effect.category_id, delta, anomalies)?;
        self.bump::<Party>(uow, effect.party_id, delta, anomalies)?;
        Ok(())
    }

    fn bump<E: Stored + Rankable>(
        &self,
        uow: &mut UnitOfWork<'_>,
        id: E::Id,
        delta: UsageDelta,
        anomalies: &mut Vec<UsageAnomaly>,
    ) -> LedgerResult<()> {
        let row = uow
            .get_mut::<E>(id)?
            .ok_or_else(|| LedgerError::reference_not_found(E::ENTITY, id.to_string()))?;

        if let Some(anomaly) = usage::bump(row, delta, self.policy)? {
            anomalies.push(anomaly);
        }
        Ok(())
    }
}
