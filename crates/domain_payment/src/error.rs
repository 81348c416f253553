//! Payment domain errors

use thiserror::Error;

use core_kernel::{ObligationId, PartyId, PortError};
use domain_credit::CreditError;
use domain_ledger::LedgerError;

/// Errors that can occur in the payment domain
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Obligation not found
    #[error("Obligation not found: {0}")]
    ObligationNotFound(ObligationId),

    /// Candidate obligation belongs to a different party
    #[error("Obligation {obligation} does not belong to party {party}")]
    PartyMismatch {
        obligation: ObligationId,
        party: PartyId,
    },

    /// The credit tender cannot settle obligations directly
    #[error("Credit is not a settlement tender; authorize first, then settle with real money")]
    CreditCannotSettle,

    /// A payment was settled that was not in the Authorized state
    #[error("Payment is not awaiting settlement (status: {0})")]
    NotAwaitingSettlement(String),

    /// Bad input rejected before any write
    #[error("Validation error: {0}")]
    Validation(String),

    /// Credit gate refusal
    #[error(transparent)]
    Credit(#[from] CreditError),

    /// Underlying ledger failure
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Obligation-source collaborator failure
    #[error(transparent)]
    Port(#[from] PortError),
}

impl PaymentError {
    pub fn validation(message: impl Into<String>) -> Self {
        PaymentError::Validation(message.into())
    }
}
