//! Account CLI commands
//!
//! Implements CLI commands for account management.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::account::{format_account_details, format_account_list};
use crate::display::format_choices;
use crate::error::{LedgerError, LedgerResult};
use crate::models::Account;
use crate::services::{AccountService, SelectionRanker};
use crate::storage::Storage;

use super::parse_amount;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Account name
        name: String,
        /// Currency code (defaults to the configured currency)
        #[arg(short, long)]
        currency: Option<String>,
        /// Opening balance (e.g., "1000.00" or "-250")
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        balance: String,
    },
    /// List all accounts, most used first
    List,
    /// Show account details
    Show {
        /// Account name or ID
        account: String,
    },
    /// Rename an account
    Edit {
        /// Account name or ID
        account: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Hide an account from selection lists
    Deactivate {
        /// Account name or ID
        account: String,
    },
    /// Make an account selectable again
    Activate {
        /// Account name or ID
        account: String,
    },
    /// Show active accounts in selection order
    Choices,
    /// List known currencies
    Currencies,
    /// Register a new currency code
    AddCurrency {
        /// Currency code (e.g., "GBP")
        code: String,
    },
}

/// Resolve an account by name or ID for the acting owner
pub fn resolve_account(
    service: &AccountService<'_>,
    identifier: &str,
    settings: &Settings,
) -> LedgerResult<Account> {
    service
        .find(identifier, settings.owner)?
        .ok_or_else(|| LedgerError::account_not_found(identifier))
}

/// Handle an account command
pub fn handle_account_command(
    storage: &Storage,
    settings: &Settings,
    cmd: AccountCommands,
) -> LedgerResult<()> {
    let service = AccountService::new(storage);
    let owner = settings.owner;

    match cmd {
        AccountCommands::Create {
            name,
            currency,
            balance,
        } => {
            let opening_balance = parse_amount(&balance)?;
            let code = currency.unwrap_or_else(|| settings.default_currency.clone());
            let account = service.create(&name, &code, opening_balance, owner)?;

            println!("Created account: {}", account.name);
            println!("  Balance: {} {}", account.formatted_balance(), code.to_uppercase());
            println!("  ID: {}", account.id);
        }

        AccountCommands::List => {
            let accounts = service.list(owner)?;
            let currencies = service.currencies()?;
            print!("{}", format_account_list(&accounts, &currencies));
        }

        AccountCommands::Show { account } => {
            let found = resolve_account(&service, &account, settings)?;
            let currency = service.currency_of(&found)?;
            print!("{}", format_account_details(&found, currency.as_ref()));
        }

        AccountCommands::Edit { account, name } => {
            let found = resolve_account(&service, &account, settings)?;

            let Some(name) = name else {
                println!("No changes specified. Use --name to change the account name.");
                return Ok(());
            };

            let updated = service.rename(found.id, &name, owner)?;
            println!("Updated account: {}", updated.name);
        }

        AccountCommands::Deactivate { account } => {
            let found = resolve_account(&service, &account, settings)?;
            let updated = service.set_active(found.id, false, owner)?;
            println!("Deactivated account: {}", updated.name);
        }

        AccountCommands::Activate { account } => {
            let found = resolve_account(&service, &account, settings)?;
            let updated = service.set_active(found.id, true, owner)?;
            println!("Activated account: {}", updated.name);
        }

        AccountCommands::Choices => {
            let choices = SelectionRanker::new(storage).account_choices(owner, None)?;
            print!("{}", format_choices("Accounts", &choices));
        }

        AccountCommands::Currencies => {
            for currency in service.currencies()? {
                println!("{}", currency.code);
            }
        }

        AccountCommands::AddCurrency { code } => {
            let currency = storage.register_currency(&code)?;
            println!("Registered currency: {}", currency.code);
        }
    }

    Ok(())
}
