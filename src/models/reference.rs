//! Group, Category and Party models
//!
//! The three tagging dimensions of a transaction. They are structurally
//! identical but kept as distinct types because each is selected and ranked
//! on its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::account::MAX_NAME_LEN;
use super::ids::{CategoryId, GroupId, PartyId, UserId};
use super::rankable::{Rankable, Record};

/// Construction and renaming shared by the three tagging dimensions, so
/// one service can manage all of them
pub trait Reference: Rankable {
    fn with_name(name: &str, owner: UserId) -> Self;

    fn set_name(&mut self, name: &str);

    fn check(&self) -> Result<(), ReferenceValidationError>;
}

/// Macro to generate the reference entity structs
macro_rules! define_reference {
    ($(#[$meta:meta])* $name:ident, $id:ident, $entity:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize)]
        pub struct $name {
            /// Unique identifier
            pub id: $id,

            /// Display name
            pub name: String,

            /// Owning user
            pub owner: UserId,

            /// Inactive entries are hidden from selection lists
            pub is_active: bool,

            /// Number of live transactions tagged with this entry
            #[serde(default)]
            pub times_used: u32,

            /// When the entry was created
            pub created_at: DateTime<Utc>,

            /// When the entry was last modified
            pub updated_at: DateTime<Utc>,
        }

        impl $name {
            /// Create a new active entry
            pub fn new(name: impl Into<String>, owner: UserId) -> Self {
                let now = Utc::now();
                Self {
                    id: $id::new(),
                    name: name.into(),
                    owner,
                    is_active: true,
                    times_used: 0,
                    created_at: now,
                    updated_at: now,
                }
            }

            /// Rename the entry
            pub fn rename(&mut self, name: impl Into<String>) {
                self.name = name.into();
                self.updated_at = Utc::now();
            }

            /// Validate the entry
            pub fn validate(&self) -> Result<(), ReferenceValidationError> {
                if self.name.trim().is_empty() {
                    return Err(ReferenceValidationError::EmptyName($entity));
                }

                let len = self.name.chars().count();
                if len > MAX_NAME_LEN {
                    return Err(ReferenceValidationError::NameTooLong($entity, len));
                }

                Ok(())
            }
        }

        impl Record for $name {
            type Id = $id;
            const ENTITY: &'static str = $entity;

            fn id(&self) -> $id {
                self.id
            }

            fn owner(&self) -> UserId {
                self.owner
            }
        }

        impl Rankable for $name {
            fn name(&self) -> &str {
                &self.name
            }

            fn times_used(&self) -> u32 {
                self.times_used
            }

            fn set_times_used(&mut self, value: u32) {
                self.times_used = value;
                self.updated_at = Utc::now();
            }

            fn is_active(&self) -> bool {
                self.is_active
            }

            fn set_active(&mut self, active: bool) {
                self.is_active = active;
                self.updated_at = Utc::now();
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }
        }

        impl Reference for $name {
            fn with_name(name: &str, owner: UserId) -> Self {
                Self::new(name, owner)
            }

            fn set_name(&mut self, name: &str) {
                self.rename(name);
            }

            fn check(&self) -> Result<(), ReferenceValidationError> {
                self.validate()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.name)
            }
        }
    };
}

define_reference!(
    /// General name of an income or expense ("Food", "Salary")
    Group,
    GroupId,
    "Group"
);
define_reference!(
    /// Sub-name of an income or expense ("Groceries", "Bonus")
    Category,
    CategoryId,
    "Category"
);
define_reference!(
    /// Counterparty of a transaction (shop, employer, person)
    Party,
    PartyId,
    "Party"
);

/// Validation errors for reference entities
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceValidationError {
    EmptyName(&'static str),
    NameTooLong(&'static str, usize),
}

impl fmt::Display for ReferenceValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName(kind) => write!(f, "{} name cannot be empty", kind),
            Self::NameTooLong(kind, len) => write!(
                f,
                "{} name too long ({} chars, max {})",
                kind, len, MAX_NAME_LEN
            ),
        }
    }
}

impl std::error::Error for ReferenceValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_reference() {
        let owner = UserId::new();
        let party = Party::new("Corner Shop", owner);
        assert_eq!(party.name, "Corner Shop");
        assert!(party.is_active);
        assert_eq!(party.times_used, 0);
        assert_eq!(party.owner(), owner);
    }

    #[test]
    fn test_validation_names_kind() {
        let group = Group::new("  ", UserId::new());
        let err = group.validate().unwrap_err();
        assert_eq!(err, ReferenceValidationError::EmptyName("Group"));
        assert_eq!(err.to_string(), "Group name cannot be empty");

        let category = Category::new("x".repeat(MAX_NAME_LEN + 1), UserId::new());
        assert!(matches!(
            category.validate(),
            Err(ReferenceValidationError::NameTooLong("Category", _))
        ));
    }

    #[test]
    fn test_rename_and_deactivate() {
        let mut category = Category::new("Food", UserId::new());
        category.rename("Groceries");
        category.set_active(false);
        assert_eq!(category.to_string(), "Groceries");
        assert!(!Rankable::is_active(&category));
    }
}
