//! Storage initialization
//!
//! Handles first-run setup and default data creation

use crate::config::paths::TallyPaths;
use crate::error::LedgerError;
use crate::models::Currency;

use super::accounts::AccountData;
use super::file_io::write_json_atomic;

/// Initialize storage for a fresh installation
///
/// Creates the data directory and seeds the default currencies
pub fn initialize_storage(paths: &TallyPaths) -> Result<(), LedgerError> {
    paths.ensure_directories()?;

    if !paths.accounts_file().exists() {
        create_default_currencies(paths)?;
    }

    Ok(())
}

fn create_default_currencies(paths: &TallyPaths) -> Result<(), LedgerError> {
    let data = AccountData {
        currencies: Currency::defaults(),
        accounts: Vec::new(),
    };
    write_json_atomic(paths.accounts_file(), &data)
}
