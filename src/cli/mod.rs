//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.
//! Every handler acts on behalf of the owner stored in the settings.

pub mod account;
pub mod reference;
pub mod summary;
pub mod transaction;
pub mod transfer;

pub use account::{handle_account_command, AccountCommands};
pub use reference::{handle_reference_command, ReferenceCommands};
pub use summary::handle_summary_command;
pub use transaction::{handle_transaction_command, TransactionCommands};
pub use transfer::{handle_transfer_command, TransferCommands};

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};

/// Parse a date given as `YYYY-MM-DD` or in the configured display format
pub fn parse_date(value: &str, date_format: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, date_format))
        .map_err(|_| {
            LedgerError::Validation(format!(
                "Invalid date: '{}'. Use YYYY-MM-DD or {}",
                value, date_format
            ))
        })
}

/// Parse an optional date argument, defaulting to today
pub fn date_or_today(value: Option<&str>, date_format: &str) -> LedgerResult<NaiveDate> {
    match value {
        Some(value) => parse_date(value, date_format),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// Parse an amount such as `12.50`, `1,250.00` or `1250`
pub fn parse_amount(value: &str) -> LedgerResult<f64> {
    let cleaned = value.trim().replace(',', "");
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| {
            LedgerError::Validation(format!(
                "Invalid amount: '{}'. Use format like '100.00' or '100'",
                value
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(parse_date("2025-03-09", "%d.%m.%Y").unwrap(), expected);
        assert_eq!(parse_date("09.03.2025", "%d.%m.%Y").unwrap(), expected);
        assert!(parse_date("March 9th", "%d.%m.%Y").unwrap_err().is_validation());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.50").unwrap(), 12.5);
        assert_eq!(parse_amount("1,250.00").unwrap(), 1250.0);
        assert_eq!(parse_amount(" 7 ").unwrap(), 7.0);
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("inf").is_err());
    }
}
