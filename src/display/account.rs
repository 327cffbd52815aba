//! Account display formatting
//!
//! Formats accounts for terminal output in table and detail views.

use tabled::Tabled;

use crate::models::{Account, Currency};

use super::render_table;

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Used")]
    used: u32,
    #[tabled(rename = "Status")]
    status: &'static str,
}

pub(crate) fn currency_code(currencies: &[Currency], account: &Account) -> String {
    currencies
        .iter()
        .find(|c| c.id == account.currency_id)
        .map_or_else(|| "?".to_string(), |c| c.code.clone())
}

/// Format a list of accounts as a table
pub fn format_account_list(accounts: &[Account], currencies: &[Currency]) -> String {
    if accounts.is_empty() {
        return "No accounts found.\n".to_string();
    }

    let rows = accounts
        .iter()
        .map(|account| AccountRow {
            id: account.id.to_string(),
            name: account.name.clone(),
            balance: account.formatted_balance(),
            currency: currency_code(currencies, account),
            used: account.times_used,
            status: if account.is_active { "active" } else { "inactive" },
        })
        .collect();

    render_table(rows)
}

/// Format a single account's details
pub fn format_account_details(account: &Account, currency: Option<&Currency>) -> String {
    let mut output = String::new();

    output.push_str(&format!("Account: {}\n", account.name));
    output.push_str(&format!("  ID:         {}\n", account.id));
    output.push_str(&format!(
        "  Balance:    {} {}\n",
        account.formatted_balance(),
        currency.map_or("?", |c| c.code.as_str())
    ));
    output.push_str(&format!(
        "  Active:     {}\n",
        if account.is_active { "Yes" } else { "No" }
    ));
    output.push_str(&format!("  Used:       {} transaction(s)\n", account.times_used));

    output
}
