//! Tally - personal finance ledger
//!
//! This library keeps account balances and usage statistics consistent while
//! transactions and transfers are created, edited and deleted. Every mutation
//! reverses the previous effect before applying the new one, inside a unit of
//! work that is committed to disk all at once.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (accounts, references, transactions, transfers)
//! - `storage`: JSON file storage layer and the unit of work
//! - `services`: Mutation engines, reference management and ranking
//! - `cli`: Command handlers for the `tally` binary
//! - `display`: Table rendering for the command line
//!
//! # Example
//!
//! ```rust,ignore
//! use tally::config::{paths::TallyPaths, settings::Settings};
//! use tally::services::TransactionService;
//! use tally::storage::Storage;
//!
//! let paths = TallyPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//!
//! let txn = TransactionService::new(&storage).create(input, settings.owner)?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

use std::sync::Once;

pub use error::{LedgerError, LedgerResult};

static TRACING_INIT: Once = Once::new();

/// Installs the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (the `log_filter`
/// setting) is used. Logs go to stderr so command output stays clean.
pub fn init_tracing(default_filter: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new("tally=info"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_tracing_is_idempotent() {
        super::init_tracing("tally=debug");
        super::init_tracing("not a [valid filter");
    }
}
