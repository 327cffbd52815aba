//! Summary CLI command
//!
//! Active accounts by name and the income received this month.

use chrono::Datelike;

use crate::config::Settings;
use crate::display::format_summary;
use crate::error::LedgerResult;
use crate::services::{AccountService, TransactionService};
use crate::storage::Storage;

/// Handle the summary command
pub fn handle_summary_command(storage: &Storage, settings: &Settings) -> LedgerResult<()> {
    let accounts = AccountService::new(storage);
    let owner = settings.owner;

    let today = chrono::Local::now().date_naive();
    let month_start = today.with_day(1).unwrap_or(today);

    let active = accounts.active_by_name(owner)?;
    let income = TransactionService::new(storage).income_since(owner, month_start)?;

    print!(
        "{}",
        format_summary(
            &active,
            &accounts.currencies()?,
            income,
            month_start,
            &settings.date_format
        )
    );

    Ok(())
}
