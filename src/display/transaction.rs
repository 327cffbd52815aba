//! Transaction display formatting
//!
//! Provides utilities for formatting transactions for terminal display.

use tabled::Tabled;

use crate::models::Transaction;

use super::{render_table, truncate, Names};

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Party")]
    party: String,
    #[tabled(rename = "Comment")]
    comment: String,
}

/// Amount with its direction (`-50.00` for an expense, `+50.00` for an income)
fn signed_display(txn: &Transaction) -> String {
    format!("{}{}", if txn.minus { "-" } else { "+" }, txn.formatted_amount())
}

/// Format a list of transactions as a register
pub fn format_transaction_register(
    transactions: &[Transaction],
    names: &Names,
    date_format: &str,
) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows = transactions
        .iter()
        .map(|txn| TransactionRow {
            id: txn.id.to_string(),
            date: txn.date.format(date_format).to_string(),
            amount: signed_display(txn),
            account: names.account(txn.account_id).to_string(),
            group: names.group(txn.group_id).to_string(),
            category: names.category(txn.category_id).to_string(),
            party: names.party(txn.party_id).to_string(),
            comment: truncate(txn.comment.as_deref().unwrap_or(""), 30),
        })
        .collect();

    render_table(rows)
}

/// Format transaction details for display
pub fn format_transaction_details(txn: &Transaction, names: &Names, date_format: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("  Date:      {}\n", txn.date.format(date_format)));
    output.push_str(&format!(
        "  Amount:    {} ({})\n",
        signed_display(txn),
        if txn.minus { "expense" } else { "income" }
    ));
    output.push_str(&format!("  Account:   {}\n", names.account(txn.account_id)));
    output.push_str(&format!("  Group:     {}\n", names.group(txn.group_id)));
    output.push_str(&format!("  Category:  {}\n", names.category(txn.category_id)));
    output.push_str(&format!("  Party:     {}\n", names.party(txn.party_id)));

    if let Some(comment) = &txn.comment {
        output.push_str(&format!("  Comment:   {}\n", comment));
    }

    output
}
