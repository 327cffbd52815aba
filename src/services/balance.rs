//! Balance adjuster
//!
//! The only code that writes `Account::balance` after the account is created.

use chrono::Utc;

use crate::models::money::round_amount;
use crate::models::Account;

/// Whether an effect is being applied or undone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Apply a transaction amount to an account
///
/// Forward expense and Reverse income subtract; Forward income and Reverse
/// expense add. Forward followed by Reverse with the same inputs leaves the
/// balance unchanged.
pub fn apply(account: &mut Account, amount: f64, is_expense: bool, direction: Direction) {
    let amount = round_amount(amount);
    let delta = match (direction, is_expense) {
        (Direction::Forward, true) | (Direction::Reverse, false) => -amount,
        (Direction::Forward, false) | (Direction::Reverse, true) => amount,
    };
    apply_signed(account, delta);
}

/// Apply an already-signed delta to an account
pub fn apply_signed(account: &mut Account, delta: f64) {
    account.balance = round_amount(account.balance + round_amount(delta));
    account.updated_at = Utc::now();
}
