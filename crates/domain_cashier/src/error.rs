//! Cashier domain errors

use thiserror::Error;

use core_kernel::{ChannelId, ReconciliationId, SessionId};
use domain_ledger::LedgerError;

/// Errors that can occur in the cashier domain
#[derive(Debug, Error)]
pub enum CashierError {
    /// Channel not found
    #[error("Channel not found: {0}")]
    ChannelNotFound(ChannelId),

    /// Session not found
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// Reconciliation not found
    #[error("Reconciliation not found: {0}")]
    ReconciliationNotFound(ReconciliationId),

    /// A channel may only have one open session at a time
    #[error("Channel {channel} already has an open session: {session}")]
    SessionAlreadyOpen {
        channel: ChannelId,
        session: SessionId,
    },

    /// The session was already closed
    #[error("Session {0} is already closed")]
    SessionClosed(SessionId),

    /// The channel requires a counted opening balance
    #[error("Channel {0} requires a counted opening balance")]
    OpeningCountRequired(ChannelId),

    /// Bad input rejected before any write
    #[error("Validation error: {0}")]
    Validation(String),

    /// Underlying ledger failure
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl CashierError {
    pub fn validation(message: impl Into<String>) -> Self {
        CashierError::Validation(message.into())
    }
}
