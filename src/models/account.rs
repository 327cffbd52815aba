//! Account and currency models
//!
//! An account carries a running balance that only the mutation engines
//! adjust, plus a usage counter used to rank it in selection lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, CurrencyId, UserId};
use super::money::{format_amount, round_amount};
use super::rankable::{Rankable, Record};

/// Maximum length of display names, matching the column width of the schema
pub const MAX_NAME_LEN: usize = 128;

/// Maximum length of a currency code
pub const MAX_CURRENCY_CODE_LEN: usize = 10;

/// A currency an account is denominated in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    /// Unique identifier
    pub id: CurrencyId,

    /// ISO-like code (`EUR`, `USD`, `KZT`)
    pub code: String,

    /// When the currency was registered
    pub created_at: DateTime<Utc>,
}

impl Currency {
    /// Create a new currency with a normalized (upper-case) code
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            id: CurrencyId::new(),
            code: code.into().trim().to_uppercase(),
            created_at: Utc::now(),
        }
    }

    /// Currencies registered on a fresh installation
    pub fn defaults() -> Vec<Self> {
        ["EUR", "USD", "KZT"].into_iter().map(Self::new).collect()
    }

    /// Validate the currency code
    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.code.is_empty() {
            return Err(AccountValidationError::EmptyCurrencyCode);
        }
        if self.code.len() > MAX_CURRENCY_CODE_LEN {
            return Err(AccountValidationError::CurrencyCodeTooLong(self.code.len()));
        }
        Ok(())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// A user's current account (cash, card, savings, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,

    /// Display name
    pub name: String,

    /// Running balance
    pub balance: f64,

    /// Currency the balance is denominated in
    pub currency_id: CurrencyId,

    /// Inactive accounts are hidden from selection lists
    pub is_active: bool,

    /// Number of live transactions referencing this account
    #[serde(default)]
    pub times_used: u32,

    /// Owning user
    pub owner: UserId,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last modified
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new active account with a zero balance
    pub fn new(name: impl Into<String>, currency_id: CurrencyId, owner: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            name: name.into(),
            balance: 0.0,
            currency_id,
            is_active: true,
            times_used: 0,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new account with an opening balance
    pub fn with_opening_balance(
        name: impl Into<String>,
        currency_id: CurrencyId,
        owner: UserId,
        opening_balance: f64,
    ) -> Self {
        let mut account = Self::new(name, currency_id, owner);
        account.balance = round_amount(opening_balance);
        account
    }

    /// Balance formatted for display (`1,234.50`)
    pub fn formatted_balance(&self) -> String {
        format_amount(self.balance)
    }

    /// Validate the account
    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.name.trim().is_empty() {
            return Err(AccountValidationError::EmptyName);
        }

        if self.name.chars().count() > MAX_NAME_LEN {
            return Err(AccountValidationError::NameTooLong(self.name.chars().count()));
        }

        if !self.balance.is_finite() {
            return Err(AccountValidationError::NonFiniteBalance);
        }

        Ok(())
    }
}

impl Record for Account {
    type Id = AccountId;
    const ENTITY: &'static str = "Account";

    fn id(&self) -> AccountId {
        self.id
    }

    fn owner(&self) -> UserId {
        self.owner
    }
}

impl Rankable for Account {
    fn name(&self) -> &str {
        &self.name
    }

    fn times_used(&self) -> u32 {
        self.times_used
    }

    fn set_times_used(&mut self, value: u32) {
        self.times_used = value;
        self.updated_at = Utc::now();
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
        self.updated_at = Utc::now();
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.formatted_balance())
    }
}

/// Validation errors for accounts and currencies
#[derive(Debug, Clone, PartialEq)]
pub enum AccountValidationError {
    EmptyName,
    NameTooLong(usize),
    NonFiniteBalance,
    EmptyCurrencyCode,
    CurrencyCodeTooLong(usize),
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Account name cannot be empty"),
            Self::NameTooLong(len) => write!(
                f,
                "Account name too long ({} chars, max {})",
                len, MAX_NAME_LEN
            ),
            Self::NonFiniteBalance => write!(f, "Account balance must be a finite number"),
            Self::EmptyCurrencyCode => write!(f, "Currency code cannot be empty"),
            Self::CurrencyCodeTooLong(len) => write!(
                f,
                "Currency code too long ({} chars, max {})",
                len, MAX_CURRENCY_CODE_LEN
            ),
        }
    }
}

impl std::error::Error for AccountValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account() {
        let owner = UserId::new();
        let account = Account::new("Wallet", CurrencyId::new(), owner);
        assert_eq!(account.name, "Wallet");
        assert_eq!(account.balance, 0.0);
        assert!(account.is_active);
        assert_eq!(account.times_used, 0);
        assert!(account.is_owned_by(owner));
        assert!(!account.is_owned_by(UserId::new()));
    }

    #[test]
    fn test_opening_balance_is_rounded() {
        let account =
            Account::with_opening_balance("Card", CurrencyId::new(), UserId::new(), 100.456);
        assert_eq!(account.balance, 100.46);
        assert_eq!(account.formatted_balance(), "100.46");
    }

    #[test]
    fn test_validation() {
        let mut account = Account::new("Valid", CurrencyId::new(), UserId::new());
        assert!(account.validate().is_ok());

        account.name = "   ".into();
        assert_eq!(account.validate(), Err(AccountValidationError::EmptyName));

        account.name = "a".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            account.validate(),
            Err(AccountValidationError::NameTooLong(_))
        ));

        account.name = "Ok".into();
        account.balance = f64::NAN;
        assert_eq!(
            account.validate(),
            Err(AccountValidationError::NonFiniteBalance)
        );
    }

    #[test]
    fn test_currency_defaults() {
        let codes: Vec<_> = Currency::defaults().into_iter().map(|c| c.code).collect();
        assert_eq!(codes, vec!["EUR", "USD", "KZT"]);
        assert_eq!(Currency::new(" gbp ").code, "GBP");
    }

    #[test]
    fn test_rankable_capability() {
        let mut account = Account::new("Cash", CurrencyId::new(), UserId::new());
        account.set_times_used(3);
        account.set_active(false);
        assert_eq!(Rankable::times_used(&account), 3);
        assert!(!Rankable::is_active(&account));
        assert_eq!(account.label(), "Cash");
    }
}
