//! Transaction model
//!
//! A transaction is an income or expense against one account, tagged with a
//! group, a category and a party. The amount is always stored non-negative;
//! the direction lives solely in `minus`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, CategoryId, GroupId, PartyId, TransactionId, UserId};
use super::money::format_amount;
use super::rankable::Record;

/// Maximum length of a transaction comment
pub const MAX_COMMENT_LEN: usize = 128;

/// The part of a transaction that drives balance and usage side effects
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransactionEffect {
    pub amount: f64,
    pub is_expense: bool,
    pub account_id: AccountId,
    pub group_id: GroupId,
    pub category_id: CategoryId,
    pub party_id: PartyId,
}

/// An income or expense record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Transaction date
    pub date: NaiveDate,

    /// Non-negative amount, rounded to two decimals
    pub amount: f64,

    /// `true` for an expense, `false` for an income
    pub minus: bool,

    /// Account the amount is booked against
    pub account_id: AccountId,

    /// Tagging dimensions
    pub group_id: GroupId,
    pub category_id: CategoryId,
    pub party_id: PartyId,

    /// Free-form comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Owning user
    pub owner: UserId,

    /// When the transaction was created
    pub created_at: DateTime<Utc>,

    /// When the transaction was last modified
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Whether this is an expense
    pub fn is_expense(&self) -> bool {
        self.minus
    }

    /// Amount with the direction applied (negative for expenses)
    pub fn signed_amount(&self) -> f64 {
        if self.minus {
            -self.amount
        } else {
            self.amount
        }
    }

    /// Snapshot of the fields that carry side effects
    pub fn effect(&self) -> TransactionEffect {
        TransactionEffect {
            amount: self.amount,
            is_expense: self.minus,
            account_id: self.account_id,
            group_id: self.group_id,
            category_id: self.category_id,
            party_id: self.party_id,
        }
    }

    /// Amount formatted for display (`1,234.50`)
    pub fn formatted_amount(&self) -> String {
        format_amount(self.amount)
    }

    /// Validate the stored shape of the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.amount.is_finite() {
            return Err(TransactionValidationError::NonFiniteAmount);
        }

        if self.amount < 0.0 {
            return Err(TransactionValidationError::NegativeAmount(self.amount));
        }

        if let Some(comment) = &self.comment {
            let len = comment.chars().count();
            if len > MAX_COMMENT_LEN {
                return Err(TransactionValidationError::CommentTooLong(len));
            }
        }

        Ok(())
    }
}

impl Record for Transaction {
    type Id = TransactionId;
    const ENTITY: &'static str = "Transaction";

    fn id(&self) -> TransactionId {
        self.id
    }

    fn owner(&self) -> UserId {
        self.owner
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}{}",
            self.date.format("%d.%m.%Y"),
            if self.minus { "-" } else { "+" },
            self.formatted_amount()
        )
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionValidationError {
    NonFiniteAmount,
    NegativeAmount(f64),
    CommentTooLong(usize),
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteAmount => write!(f, "Amount must be a finite number"),
            Self::NegativeAmount(amount) => {
                write!(f, "Amount must not be negative (got {})", amount)
            }
            Self::CommentTooLong(len) => write!(
                f,
                "Comment too long ({} chars, max {})",
                len, MAX_COMMENT_LEN
            ),
        }
    }
}

impl std::error::Error for TransactionValidationError {}
