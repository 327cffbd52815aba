//! Selection ranker
//!
//! Builds the candidate lists offered when a transaction or transfer is
//! entered: active entities, most used first, with the currently assigned
//! entity pinned at the top while editing.

use std::cmp::Ordering;

use crate::error::LedgerResult;
use crate::models::{
    Account, AccountId, Category, CategoryId, Group, GroupId, Party, PartyId, Rankable,
    Transaction, UserId,
};
use crate::storage::{Storage, Stored};

/// One entry of a selection list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice<Id> {
    pub id: Id,
    pub label: String,
}

/// Selection lists for the four references of a transaction
#[derive(Debug, Clone)]
pub struct TransactionChoices {
    pub accounts: Vec<Choice<AccountId>>,
    pub groups: Vec<Choice<GroupId>>,
    pub categories: Vec<Choice<CategoryId>>,
    pub parties: Vec<Choice<PartyId>>,
}

/// Most used first; ties broken by creation time, then id
pub fn usage_order<E: Rankable>(a: &E, b: &E) -> Ordering {
    b.times_used()
        .cmp(&a.times_used())
        .then(a.created_at().cmp(&b.created_at()))
        .then(a.id().cmp(&b.id()))
}

/// Sort entities by [`usage_order`]
pub fn sort_by_usage<E: Rankable>(rows: &mut [E]) {
    rows.sort_by(usage_order::<E>);
}

/// Service producing ranked selection lists
pub struct SelectionRanker<'a> {
    storage: &'a Storage,
}

impl<'a> SelectionRanker<'a> {
    /// Create a new selection ranker
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Active entities of one kind owned by `owner`, most used first
    ///
    /// A `pin` owned by `owner` is placed first whatever its counter or active
    /// flag; a pin owned by someone else is ignored.
    pub fn active_entities<E: Stored + Rankable>(
        &self,
        owner: UserId,
        pin: Option<E::Id>,
    ) -> LedgerResult<Vec<E>> {
        let table = E::table(self.storage);

        let mut rows: Vec<E> = table
            .list_owned(owner)?
            .into_iter()
            .filter(|row| row.is_active())
            .collect();
        sort_by_usage(&mut rows);

        if let Some(pin_id) = pin {
            if let Some(pinned) = table.get_owned(pin_id, owner)? {
                rows.retain(|row| row.id() != pin_id);
                rows.insert(0, pinned);
            }
        }

        Ok(rows)
    }

    /// Ranked `(id, label)` pairs of one kind
    pub fn choices<E: Stored + Rankable>(
        &self,
        owner: UserId,
        pin: Option<E::Id>,
    ) -> LedgerResult<Vec<Choice<E::Id>>> {
        Ok(self
            .active_entities::<E>(owner, pin)?
            .into_iter()
            .map(|row| Choice {
                id: row.id(),
                label: row.label(),
            })
            .collect())
    }

    /// Ranked accounts labelled with their currency (`Cash (EUR)`)
    pub fn account_choices(
        &self,
        owner: UserId,
        pin: Option<AccountId>,
    ) -> LedgerResult<Vec<Choice<AccountId>>> {
        let accounts = self.active_entities::<Account>(owner, pin)?;
        let mut choices = Vec::with_capacity(accounts.len());

        for account in accounts {
            let label = match self.storage.accounts.currency(account.currency_id)? {
                Some(currency) => format!("{} ({})", account.name, currency.code),
                None => account.name.clone(),
            };
            choices.push(Choice {
                id: account.id,
                label,
            });
        }

        Ok(choices)
    }

    /// Selection lists for entering a transaction, or for editing `editing`
    pub fn transaction_choices(
        &self,
        owner: UserId,
        editing: Option<&Transaction>,
    ) -> LedgerResult<TransactionChoices> {
        Ok(TransactionChoices {
            accounts: self.account_choices(owner, editing.map(|t| t.account_id))?,
            groups: self.choices::<Group>(owner, editing.map(|t| t.group_id))?,
            categories: self.choices::<Category>(owner, editing.map(|t| t.category_id))?,
            parties: self.choices::<Party>(owner, editing.map(|t| t.party_id))?,
        })
    }
}
