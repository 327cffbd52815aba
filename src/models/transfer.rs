//! Transfer model
//!
//! Moves funds from one account to another of the same owner. The
//! destination receives `amount * coef`, which covers accounts held in
//! different currencies.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, TransferId, UserId};
use super::money::{format_amount, round_amount};
use super::rankable::Record;

fn default_coef() -> f64 {
    1.0
}

/// A movement of funds between two accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    /// Unique identifier
    pub id: TransferId,

    /// Transfer date
    pub date: NaiveDate,

    /// Amount leaving the source account
    pub amount: f64,

    /// Conversion multiplier applied to the destination amount
    #[serde(default = "default_coef")]
    pub coef: f64,

    pub from_account_id: AccountId,
    pub to_account_id: AccountId,

    /// Owning user
    pub owner: UserId,

    /// When the transfer was created
    pub created_at: DateTime<Utc>,

    /// When the transfer was last modified
    pub updated_at: DateTime<Utc>,
}

impl Transfer {
    /// Amount arriving at the destination account
    pub fn destination_amount(&self) -> f64 {
        round_amount(self.amount * self.coef)
    }

    /// Amount formatted for display (`1,234.50`)
    pub fn formatted_amount(&self) -> String {
        format_amount(self.amount)
    }

    /// Validate the stored shape of the transfer
    pub fn validate(&self) -> Result<(), TransferValidationError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(TransferValidationError::NonPositiveAmount);
        }

        if !self.coef.is_finite() || self.coef <= 0.0 {
            return Err(TransferValidationError::NonPositiveCoef);
        }

        if self.from_account_id == self.to_account_id {
            return Err(TransferValidationError::SameAccount);
        }

        Ok(())
    }
}

impl Record for Transfer {
    type Id = TransferId;
    const ENTITY: &'static str = "Transfer";

    fn id(&self) -> TransferId {
        self.id
    }

    fn owner(&self) -> UserId {
        self.owner
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} x{}",
            self.date.format("%d.%m.%Y"),
            self.formatted_amount(),
            self.coef
        )
    }
}

/// Validation errors for transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferValidationError {
    NonPositiveAmount,
    NonPositiveCoef,
    SameAccount,
}

impl fmt::Display for TransferValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount => write!(f, "Transfer amount must be positive"),
            Self::NonPositiveCoef => write!(f, "Conversion coefficient must be positive"),
            Self::SameAccount => write!(f, "Cannot transfer to the same account"),
        }
    }
}

impl std::error::Error for TransferValidationError {}
