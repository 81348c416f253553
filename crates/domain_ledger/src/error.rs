//! Ledger domain errors

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Account already exists
    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    /// Journal entry not found
    #[error("Journal entry not found: {0}")]
    EntryNotFound(String),

    /// Entry does not balance; indicates a defect in a posting strategy
    #[error("Imbalanced entry: debits={debits}, credits={credits}")]
    ImbalancedEntry { debits: Decimal, credits: Decimal },

    /// Line posted against a parent account
    #[error("Account {0} is not a leaf account; entries post only to leaves")]
    NotALeafAccount(String),

    /// Line posted against a deactivated account
    #[error("Account {0} is inactive")]
    InactiveAccount(String),

    /// Linking the parent would make the account its own ancestor
    #[error("Parent link would create a cycle at account {0}")]
    HierarchyCycle(String),

    /// Bad input on a draft or account
    #[error("Validation error: {0}")]
    Validation(String),

    /// Money arithmetic failure (currency mismatch between lines)
    #[error("Money error: {0}")]
    Money(#[from] core_kernel::MoneyError),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }
}
