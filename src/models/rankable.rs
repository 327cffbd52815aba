//! Capabilities shared by stored entities
//!
//! `Record` is implemented by everything the ledger store keeps in an
//! owner-scoped table. `Rankable` is the narrower capability of the four
//! reference kinds (account, group, category, party) that carry a usage
//! counter and an active flag; the usage counter and the selection ranker
//! only ever talk to this trait.

use chrono::{DateTime, Utc};
use std::fmt;
use std::hash::Hash;

use super::ids::UserId;

/// An owner-scoped, identifiable row
pub trait Record: Clone {
    /// Identifier type of the row
    type Id: Copy + Eq + Ord + Hash + fmt::Display + fmt::Debug;

    /// Human readable entity name used in errors and logs
    const ENTITY: &'static str;

    fn id(&self) -> Self::Id;

    fn owner(&self) -> UserId;

    /// Check whether the row belongs to `owner`
    fn is_owned_by(&self, owner: UserId) -> bool {
        self.owner() == owner
    }
}

/// A reference entity that can be selected on a transaction and ranked by use
pub trait Rankable: Record {
    fn name(&self) -> &str;

    fn times_used(&self) -> u32;

    fn set_times_used(&mut self, value: u32);

    fn is_active(&self) -> bool;

    fn set_active(&mut self, active: bool);

    fn created_at(&self) -> DateTime<Utc>;

    /// Label shown in selection lists
    fn label(&self) -> String {
        self.name().to_string()
    }
}
