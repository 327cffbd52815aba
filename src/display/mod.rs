//! Display formatting for terminal output
//!
//! Provides utilities for formatting data models for terminal display:
//! `tabled` tables for lists, aligned key/value blocks for details.

pub mod account;
pub mod reference;
pub mod summary;
pub mod transaction;
pub mod transfer;

pub use account::{format_account_details, format_account_list};
pub use reference::{format_choices, format_reference_list};
pub use summary::format_summary;
pub use transaction::{format_transaction_details, format_transaction_register};
pub use transfer::format_transfer_list;

use std::collections::HashMap;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::LedgerResult;
use crate::models::{AccountId, CategoryId, GroupId, PartyId, UserId};
use crate::storage::Storage;

/// Display names of an owner's accounts and tags, resolved once per command
#[derive(Debug, Default)]
pub struct Names {
    accounts: HashMap<AccountId, String>,
    groups: HashMap<GroupId, String>,
    categories: HashMap<CategoryId, String>,
    parties: HashMap<PartyId, String>,
}

const MISSING: &str = "(missing)";

impl Names {
    /// Load every name the owner can see, inactive entries included
    pub fn load(storage: &Storage, owner: UserId) -> LedgerResult<Self> {
        Ok(Self {
            accounts: storage
                .accounts
                .list_owned(owner)?
                .into_iter()
                .map(|a| (a.id, a.name))
                .collect(),
            groups: storage
                .references
                .groups()
                .list_owned(owner)?
                .into_iter()
                .map(|g| (g.id, g.name))
                .collect(),
            categories: storage
                .references
                .categories()
                .list_owned(owner)?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect(),
            parties: storage
                .references
                .parties()
                .list_owned(owner)?
                .into_iter()
                .map(|p| (p.id, p.name))
                .collect(),
        })
    }

    pub fn account(&self, id: AccountId) -> &str {
        self.accounts.get(&id).map_or(MISSING, String::as_str)
    }

    pub fn group(&self, id: GroupId) -> &str {
        self.groups.get(&id).map_or(MISSING, String::as_str)
    }

    pub fn category(&self, id: CategoryId) -> &str {
        self.categories.get(&id).map_or(MISSING, String::as_str)
    }

    pub fn party(&self, id: PartyId) -> &str {
        self.parties.get(&id).map_or(MISSING, String::as_str)
    }
}

/// Render rows as a psql-style table
pub(crate) fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Truncate a string to a maximum number of characters
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
