//! Transaction CLI commands
//!
//! Accounts are given by name or ID, groups, categories and parties by name
//! or ID. Amounts are entered as positive numbers; `--income` flips the
//! direction.

use std::str::FromStr;

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{
    format_choices, format_transaction_details, format_transaction_register, Names,
};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Category, Group, Party, Reference, Transaction, UserId};
use crate::services::{
    AccountService, SelectionRanker, TransactionFilter, TransactionInput, TransactionService,
    UsageAnomaly, UsagePolicy,
};
use crate::storage::{Storage, Stored};

use super::reference::resolve_reference;
use super::{date_or_today, parse_amount, parse_date};

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record an expense (or an income with --income)
    Add {
        /// Amount, always positive (e.g., "42.50")
        amount: String,
        /// Account name or ID
        #[arg(short, long)]
        account: String,
        /// Group name or ID
        #[arg(short, long)]
        group: String,
        /// Category name or ID
        #[arg(short, long)]
        category: String,
        /// Party name or ID
        #[arg(short, long)]
        party: String,
        /// Transaction date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Record as income instead of expense
        #[arg(long)]
        income: bool,
        /// Free-text comment (max 128 characters)
        #[arg(short = 'm', long)]
        comment: Option<String>,
    },
    /// List the most recent transactions in date order
    List {
        /// Filter by account
        #[arg(short, long)]
        account: Option<String>,
        /// Only transactions on or after this date
        #[arg(long)]
        from: Option<String>,
        /// Only transactions on or before this date
        #[arg(long)]
        to: Option<String>,
        /// Only expenses
        #[arg(long, conflicts_with = "incomes")]
        expenses: bool,
        /// Only incomes
        #[arg(long)]
        incomes: bool,
        /// Number of most recent transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show one transaction
    Show {
        /// Transaction ID
        id: String,
    },
    /// Edit a transaction; omitted fields keep their value
    Edit {
        /// Transaction ID
        id: String,
        /// New amount
        #[arg(long)]
        amount: Option<String>,
        /// New account
        #[arg(short, long)]
        account: Option<String>,
        /// New group
        #[arg(short, long)]
        group: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// New party
        #[arg(short, long)]
        party: Option<String>,
        /// New date
        #[arg(short, long)]
        date: Option<String>,
        /// Turn into an income
        #[arg(long, conflicts_with = "expense")]
        income: bool,
        /// Turn into an expense
        #[arg(long)]
        expense: bool,
        /// New comment (empty string clears it)
        #[arg(short = 'm', long)]
        comment: Option<String>,
    },
    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },
    /// Show the ranked selection lists used to enter a transaction
    Choices {
        /// Pin the values of this transaction at the top
        #[arg(long)]
        edit: Option<String>,
    },
}

/// A reference named on the command line that must be selectable
fn reference_arg<E>(storage: &Storage, identifier: &str, owner: UserId) -> LedgerResult<E::Id>
where
    E: Stored + Reference,
    E::Id: FromStr,
{
    resolve_reference::<E>(storage, identifier, owner)
        .map(|row| row.id())
        .map_err(|e| match e {
            LedgerError::NotFound { entity_type, identifier } => {
                LedgerError::reference_not_found(entity_type, identifier)
            }
            other => other,
        })
}

fn find_transaction(
    service: &TransactionService<'_>,
    identifier: &str,
    owner: UserId,
) -> LedgerResult<Transaction> {
    service
        .find(identifier, owner)?
        .ok_or_else(|| LedgerError::transaction_not_found(identifier))
}

fn report_anomalies(anomalies: &[UsageAnomaly]) {
    for anomaly in anomalies {
        eprintln!("Warning: {}", anomaly);
    }
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
) -> LedgerResult<()> {
    let service =
        TransactionService::new(storage).with_policy(UsagePolicy::from_settings(settings));
    let accounts = AccountService::new(storage);
    let owner = settings.owner;
    let date_format = settings.date_format.as_str();

    match cmd {
        TransactionCommands::Add {
            amount,
            account,
            group,
            category,
            party,
            date,
            income,
            comment,
        } => {
            let account_id = accounts
                .find(&account, owner)?
                .ok_or_else(|| LedgerError::reference_not_found("Account", &account))?
                .id;

            let input = TransactionInput {
                date: date_or_today(date.as_deref(), date_format)?,
                amount: parse_amount(&amount)?,
                is_expense: !income,
                account_id,
                group_id: reference_arg::<Group>(storage, &group, owner)?,
                category_id: reference_arg::<Category>(storage, &category, owner)?,
                party_id: reference_arg::<Party>(storage, &party, owner)?,
                comment: comment.filter(|c| !c.is_empty()),
            };

            let txn = service.create(input, owner)?;
            let names = Names::load(storage, owner)?;
            println!("Created transaction:");
            print!("{}", format_transaction_details(&txn, &names, date_format));
        }

        TransactionCommands::List {
            account,
            from,
            to,
            expenses,
            incomes,
            limit,
        } => {
            let mut filter = TransactionFilter::new().limit(limit);

            if let Some(account) = account {
                let found = accounts
                    .find(&account, owner)?
                    .ok_or_else(|| LedgerError::account_not_found(&account))?;
                filter = filter.account(found.id);
            }
            if let Some(from) = from {
                filter.start_date = Some(parse_date(&from, date_format)?);
            }
            if let Some(to) = to {
                filter.end_date = Some(parse_date(&to, date_format)?);
            }
            if expenses {
                filter = filter.expenses(true);
            } else if incomes {
                filter = filter.expenses(false);
            }

            let transactions = service.list(owner, filter)?;
            let names = Names::load(storage, owner)?;
            print!(
                "{}",
                format_transaction_register(&transactions, &names, date_format)
            );
        }

        TransactionCommands::Show { id } => {
            let txn = find_transaction(&service, &id, owner)?;
            let names = Names::load(storage, owner)?;
            print!("{}", format_transaction_details(&txn, &names, date_format));
        }

        TransactionCommands::Edit {
            id,
            amount,
            account,
            group,
            category,
            party,
            date,
            income,
            expense,
            comment,
        } => {
            let current = find_transaction(&service, &id, owner)?;

            let mut input = TransactionInput {
                date: current.date,
                amount: current.amount,
                is_expense: current.minus,
                account_id: current.account_id,
                group_id: current.group_id,
                category_id: current.category_id,
                party_id: current.party_id,
                comment: current.comment.clone(),
            };

            if let Some(amount) = amount {
                input.amount = parse_amount(&amount)?;
            }
            if let Some(account) = account {
                input.account_id = accounts
                    .find(&account, owner)?
                    .ok_or_else(|| LedgerError::reference_not_found("Account", &account))?
                    .id;
            }
            if let Some(group) = group {
                input.group_id = reference_arg::<Group>(storage, &group, owner)?;
            }
            if let Some(category) = category {
                input.category_id = reference_arg::<Category>(storage, &category, owner)?;
            }
            if let Some(party) = party {
                input.party_id = reference_arg::<Party>(storage, &party, owner)?;
            }
            if let Some(date) = date {
                input.date = parse_date(&date, date_format)?;
            }
            if income {
                input.is_expense = false;
            } else if expense {
                input.is_expense = true;
            }
            if let Some(comment) = comment {
                input.comment = Some(comment).filter(|c| !c.is_empty());
            }

            let outcome = service.edit(current.id, input, owner)?;
            report_anomalies(&outcome.anomalies);

            let names = Names::load(storage, owner)?;
            println!("Updated transaction:");
            print!(
                "{}",
                format_transaction_details(&outcome.transaction, &names, date_format)
            );
        }

        TransactionCommands::Delete { id } => {
            let current = find_transaction(&service, &id, owner)?;
            let outcome = service.delete(current.id, owner)?;
            report_anomalies(&outcome.anomalies);
            println!("Deleted transaction: {}", outcome.transaction.id);
        }

        TransactionCommands::Choices { edit } => {
            let editing = match edit {
                Some(id) => Some(find_transaction(&service, &id, owner)?),
                None => None,
            };

            let choices = SelectionRanker::new(storage).transaction_choices(owner, editing.as_ref())?;
            print!("{}", format_choices("Accounts", &choices.accounts));
            print!("{}", format_choices("Groups", &choices.groups));
            print!("{}", format_choices("Categories", &choices.categories));
            print!("{}", format_choices("Parties", &choices.parties));
        }
    }

    Ok(())
}
