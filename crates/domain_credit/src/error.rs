//! Credit domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::PartyId;
use domain_ledger::LedgerError;

/// Errors that can occur in the credit domain
#[derive(Debug, Error)]
pub enum CreditError {
    /// Party not found
    #[error("Party not found: {0}")]
    PartyNotFound(PartyId),

    /// Supplier-side operation on a party not marked as a supplier
    #[error("Party {0} is not marked as a supplier")]
    NotASupplier(PartyId),

    /// Credit tender attempted without approval
    #[error("Party {0} is not approved for credit")]
    NotApprovedForCredit(PartyId),

    /// Credit tender attempted while credit is frozen
    #[error("Credit is frozen for party {0}: unapproved with an outstanding balance")]
    CreditFrozen(PartyId),

    /// Credit tender would exceed the available credit
    #[error("Credit limit exceeded: available={available}, required={required}")]
    CreditLimitExceeded {
        available: Decimal,
        required: Decimal,
    },

    /// Bad input rejected before any write
    #[error("Validation error: {0}")]
    Validation(String),

    /// Underlying ledger failure
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl CreditError {
    pub fn validation(message: impl Into<String>) -> Self {
        CreditError::Validation(message.into())
    }
}
