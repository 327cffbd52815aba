use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use tally::cli::{
    handle_account_command, handle_reference_command, handle_summary_command,
    handle_transaction_command, handle_transfer_command, AccountCommands, ReferenceCommands, TransactionCommands,
    TransferCommands,
};
use tally::config::paths::{TallyPaths, DATA_DIR_ENV};
use tally::config::settings::Settings;
use tally::models::{Category, Group, Party};
use tally::storage::{initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Personal finance ledger for the terminal",
    long_about = "Tally records incomes, expenses and transfers against your accounts. \
                  Balances and usage statistics are kept up to date on every change, \
                  so the accounts and tags you use most are always offered first."
)]
struct Cli {
    /// Ledger directory (defaults to the platform config directory)
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new ledger
    Init,

    /// Show current configuration and paths
    Config,

    /// Active accounts and this month's income
    Summary,

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Group management commands
    #[command(subcommand)]
    Group(ReferenceCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(ReferenceCommands),

    /// Party (payee or payer) management commands
    #[command(subcommand)]
    Party(ReferenceCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Transfers between accounts
    #[command(subcommand)]
    Transfer(TransferCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = match cli.data_dir {
        Some(dir) => TallyPaths::with_base_dir(dir),
        None => TallyPaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;

    tally::init_tracing(&settings.log_filter);

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing Tally at: {}", paths.base_dir().display());
            initialize_storage(&paths)?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Currencies EUR, USD and KZT are available.");
            println!("Run 'tally account create <name>' to add your first account.");
        }
        Some(Commands::Config) => {
            println!("Tally Configuration");
            println!("===================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Settings file:   {}", paths.settings_file().display());
            println!("Initialized:     {}", if paths.is_initialized() { "Yes" } else { "No" });
            println!();
            println!("Settings:");
            println!("  Owner:            {}", settings.owner);
            println!("  Default currency: {}", settings.default_currency);
            println!("  Strict counters:  {}", settings.strict_usage_counters);
            println!("  Log filter:       {}", settings.log_filter);
            println!("  Date format:      {}", settings.date_format);
        }
        Some(Commands::Summary) => {
            handle_summary_command(&open_storage(&paths)?, &settings)?;
        }
        Some(Commands::Account(cmd)) => {
            handle_account_command(&open_storage(&paths)?, &settings, cmd)?;
        }
        Some(Commands::Group(cmd)) => {
            handle_reference_command::<Group>(&open_storage(&paths)?, &settings, cmd)?;
        }
        Some(Commands::Category(cmd)) => {
            handle_reference_command::<Category>(&open_storage(&paths)?, &settings, cmd)?;
        }
        Some(Commands::Party(cmd)) => {
            handle_reference_command::<Party>(&open_storage(&paths)?, &settings, cmd)?;
        }
        Some(Commands::Transaction(cmd)) => {
            handle_transaction_command(&open_storage(&paths)?, &settings, cmd)?;
        }
        Some(Commands::Transfer(cmd)) => {
            handle_transfer_command(&open_storage(&paths)?, &settings, cmd)?;
        }
        None => {
            println!("Tally - personal finance ledger");
            println!();
            println!("Run 'tally --help' for usage information.");
            println!("Run 'tally init' to create a new ledger.");
        }
    }

    Ok(())
}

/// Open and load the ledger; commands other than `init` need an existing one
fn open_storage(paths: &TallyPaths) -> Result<Storage> {
    if !paths.is_initialized() {
        bail!(
            "No ledger found at {}. Run 'tally init' first.",
            paths.base_dir().display()
        );
    }

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;
    Ok(storage)
}
