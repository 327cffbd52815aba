//! Core data models for Tally
//!
//! This module contains the data structures of the ledger: accounts and
//! currencies, the group/category/party tagging dimensions, transactions and
//! transfers.

pub mod account;
pub mod ids;
pub mod money;
pub mod rankable;
pub mod reference;
pub mod transaction;
pub mod transfer;

pub use account::{Account, Currency};
pub use ids::{
    AccountId, CategoryId, CurrencyId, GroupId, PartyId, TransactionId, TransferId, UserId,
};
pub use rankable::{Rankable, Record};
pub use reference::{Category, Group, Party, Reference};
pub use transaction::{Transaction, TransactionEffect};
pub use transfer::Transfer;
