//! Transfer display formatting

use tabled::Tabled;

use crate::models::money::format_amount;
use crate::models::Transfer;

use super::{render_table, Names};

#[derive(Tabled)]
struct TransferRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Coef")]
    coef: f64,
    #[tabled(rename = "Received")]
    received: String,
}

/// Format a list of transfers as a table
pub fn format_transfer_list(transfers: &[Transfer], names: &Names, date_format: &str) -> String {
    if transfers.is_empty() {
        return "No transfers found.\n".to_string();
    }

    let rows = transfers
        .iter()
        .map(|transfer| TransferRow {
            id: transfer.id.to_string(),
            date: transfer.date.format(date_format).to_string(),
            from: names.account(transfer.from_account_id).to_string(),
            to: names.account(transfer.to_account_id).to_string(),
            amount: transfer.formatted_amount(),
            coef: transfer.coef,
            received: format_amount(transfer.destination_amount()),
        })
        .collect();

    render_table(rows)
}
