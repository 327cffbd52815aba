//! Dashboard summary formatting

use chrono::NaiveDate;

use crate::models::money::format_amount;
use crate::models::{Account, Currency};

use super::account::currency_code;

/// Format the active accounts and the income received since `since`
pub fn format_summary(
    accounts: &[Account],
    currencies: &[Currency],
    income: f64,
    since: NaiveDate,
    date_format: &str,
) -> String {
    let mut output = String::from("Accounts:\n");

    if accounts.is_empty() {
        output.push_str("  (none)\n");
    }

    let width = accounts.iter().map(|a| a.name.chars().count()).max().unwrap_or(0);
    for account in accounts {
        output.push_str(&format!(
            "  {:<width$}  {:>14} {}\n",
            account.name,
            account.formatted_balance(),
            currency_code(currencies, account),
            width = width
        ));
    }

    output.push_str(&format!(
        "\nIncome since {}: {}\n",
        since.format(date_format),
        format_amount(income)
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;

    #[test]
    fn test_format_summary() {
        let eur = Currency::new("EUR");
        let owner = UserId::new();
        let accounts = vec![
            Account::with_opening_balance("Card", eur.id, owner, 12.5),
            Account::with_opening_balance("Savings", eur.id, owner, 2500.0),
        ];
        let since = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();

        let formatted = format_summary(&accounts, &[eur], 1310.05, since, "%d.%m.%Y");
        assert!(formatted.contains("Card"));
        assert!(formatted.contains("2,500.00 EUR"));
        assert!(formatted.contains("Income since 01.04.2025: 1,310.05"));
    }

    #[test]
    fn test_format_summary_without_accounts() {
        let since = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let formatted = format_summary(&[], &[], 0.0, since, "%Y-%m-%d");
        assert!(formatted.contains("(none)"));
        assert!(formatted.contains("Income since 2025-04-01: 0.00"));
    }
}
