//! CLI commands for transfers between accounts
//!
//! The source account loses the amount, the destination receives the amount
//! times the conversion coefficient.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_transfer_list, Names};
use crate::error::{LedgerError, LedgerResult};
use crate::models::money::format_amount;
use crate::models::{AccountId, Transfer, UserId};
use crate::services::{AccountService, TransferInput, TransferService};
use crate::storage::Storage;

use super::{date_or_today, parse_amount, parse_date};

/// Transfer subcommands
#[derive(Subcommand)]
pub enum TransferCommands {
    /// Move funds from one account to another
    Create {
        /// Source account name or ID
        from: String,
        /// Destination account name or ID
        to: String,
        /// Amount taken from the source account
        amount: String,
        /// Conversion coefficient applied to the destination amount
        #[arg(long, default_value = "1")]
        coef: String,
        /// Transfer date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List transfers, newest first
    List,
    /// Edit a transfer; omitted fields keep their value
    Edit {
        /// Transfer ID
        id: String,
        /// New source account
        #[arg(long)]
        from: Option<String>,
        /// New destination account
        #[arg(long)]
        to: Option<String>,
        /// New amount
        #[arg(long)]
        amount: Option<String>,
        /// New conversion coefficient
        #[arg(long)]
        coef: Option<String>,
        /// New date
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Delete a transfer
    Delete {
        /// Transfer ID
        id: String,
    },
}

fn account_arg(accounts: &AccountService<'_>, identifier: &str, owner: UserId) -> LedgerResult<AccountId> {
    accounts
        .find(identifier, owner)?
        .map(|account| account.id)
        .ok_or_else(|| LedgerError::InvalidTransfer(format!("Unknown account: {}", identifier)))
}

fn find_transfer(
    service: &TransferService<'_>,
    identifier: &str,
    owner: UserId,
) -> LedgerResult<Transfer> {
    service
        .find(identifier, owner)?
        .ok_or_else(|| LedgerError::transfer_not_found(identifier))
}

fn print_transfer(label: &str, transfer: &Transfer, names: &Names) {
    println!("{}:", label);
    println!(
        "  From: {} (-{})",
        names.account(transfer.from_account_id),
        transfer.formatted_amount()
    );
    println!(
        "  To:   {} (+{})",
        names.account(transfer.to_account_id),
        format_amount(transfer.destination_amount())
    );
    println!("  Date: {}", transfer.date);
    println!("  ID:   {}", transfer.id);
}

/// Handle a transfer command
pub fn handle_transfer_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransferCommands,
) -> LedgerResult<()> {
    let service = TransferService::new(storage);
    let accounts = AccountService::new(storage);
    let owner = settings.owner;
    let date_format = settings.date_format.as_str();

    match cmd {
        TransferCommands::Create {
            from,
            to,
            amount,
            coef,
            date,
        } => {
            let input = TransferInput {
                date: date_or_today(date.as_deref(), date_format)?,
                amount: parse_amount(&amount)?,
                coef: parse_amount(&coef)?,
                from_account_id: account_arg(&accounts, &from, owner)?,
                to_account_id: account_arg(&accounts, &to, owner)?,
            };

            let transfer = service.create(input, owner)?;
            print_transfer("Transfer created", &transfer, &Names::load(storage, owner)?);
        }

        TransferCommands::List => {
            let transfers = service.list(owner)?;
            let names = Names::load(storage, owner)?;
            print!("{}", format_transfer_list(&transfers, &names, date_format));
        }

        TransferCommands::Edit {
            id,
            from,
            to,
            amount,
            coef,
            date,
        } => {
            let current = find_transfer(&service, &id, owner)?;

            let mut input = TransferInput {
                date: current.date,
                amount: current.amount,
                coef: current.coef,
                from_account_id: current.from_account_id,
                to_account_id: current.to_account_id,
            };

            if let Some(from) = from {
                input.from_account_id = account_arg(&accounts, &from, owner)?;
            }
            if let Some(to) = to {
                input.to_account_id = account_arg(&accounts, &to, owner)?;
            }
            if let Some(amount) = amount {
                input.amount = parse_amount(&amount)?;
            }
            if let Some(coef) = coef {
                input.coef = parse_amount(&coef)?;
            }
            if let Some(date) = date {
                input.date = parse_date(&date, date_format)?;
            }

            let transfer = service.edit(current.id, input, owner)?;
            print_transfer("Transfer updated", &transfer, &Names::load(storage, owner)?);
        }

        TransferCommands::Delete { id } => {
            let current = find_transfer(&service, &id, owner)?;
            let transfer = service.delete(current.id, owner)?;
            println!("Deleted transfer: {}", transfer.id);
        }
    }

    Ok(())
}
