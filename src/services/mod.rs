//! Service layer for Tally
//!
//! The service layer provides business logic on top of the storage layer:
//! validation, ownership checks and the balance and usage side effects of
//! every ledger mutation.

pub mod account;
pub mod balance;
pub mod ranker;
pub mod reference;
pub mod transaction;
pub mod transfer;
pub mod usage;

pub use account::AccountService;
pub use balance::Direction;
pub use ranker::{Choice, SelectionRanker, TransactionChoices};
pub use reference::ReferenceService;
pub use transaction::{TransactionFilter, TransactionInput, TransactionOutcome, TransactionService};
pub use transfer::{TransferInput, TransferService};
pub use usage::{UsageAnomaly, UsageDelta, UsagePolicy};
