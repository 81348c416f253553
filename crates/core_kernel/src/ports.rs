//! Collaborator ports
//!
//! The financial core talks to the rest of the platform through narrow
//! port traits. Adapters on the other side deliver SMS/email, write the
//! audit trail, or expose order/purchase records; this crate only defines
//! the contracts.
//!
//! Two rules apply to every port here:
//!
//! - Side-effect ports (notification, audit) are **best-effort**: callers
//!   swallow and log failures, and a port error never rolls back a
//!   financial write.
//! - Ports are synchronous. Nothing in this core is long-running; the
//!   enclosing operation owns the transaction boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Mutex;
use thiserror::Error;

use crate::identifiers::{AuditEventId, UserId};

/// Error type for port operations
///
/// A unified error type for all collaborator adapters, so domain services
/// can treat "the outside world failed" uniformly.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The operation conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// A notification handed to the dispatcher
///
/// The dispatcher decides channel and formatting (SMS, email, in-app);
/// the core only states what happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// A party's credit standing was approved or revoked
    CreditApprovalChanged { party: String, approved: bool },
    /// A party's ledger-derived balance moved (repayment recorded)
    BalanceChanged { party: String, detail: String },
    /// A cashier session closed outside the variance threshold
    VarianceAlert {
        channel: String,
        account_code: String,
        detail: String,
    },
}

/// Outbound notification delivery
///
/// Implementations deliver out-of-band (SMS gateway, email). Errors are
/// logged by the caller, never propagated into the financial result.
pub trait NotificationDispatcher: Send + Sync {
    fn dispatch(&self, notification: Notification) -> Result<(), PortError>;
}

/// A single audit record for a mutating call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: AuditEventId,
    /// Action name, e.g. "credit.approve" or "cashier.close_session"
    pub action: String,
    /// Identifier of the entity the action touched
    pub entity_id: String,
    /// Acting user, when the identity layer supplied one
    pub actor: Option<UserId>,
    /// Relevant fields before the mutation
    pub before: Value,
    /// Relevant fields after the mutation
    pub after: Value,
}

impl AuditRecord {
    pub fn new(
        action: impl Into<String>,
        entity_id: impl fmt::Display,
        before: Value,
        after: Value,
    ) -> Self {
        Self {
            id: AuditEventId::new_v7(),
            action: action.into(),
            entity_id: entity_id.to_string(),
            actor: None,
            before,
            after,
        }
    }

    pub fn by(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }
}

/// Best-effort audit trail
pub trait AuditLog: Send + Sync {
    fn record(&self, record: AuditRecord) -> Result<(), PortError>;
}

/// Dispatcher that drops every notification
///
/// Default wiring for tests and for deployments without a gateway.
#[derive(Debug, Default)]
pub struct NullDispatcher;

impl NotificationDispatcher for NullDispatcher {
    fn dispatch(&self, _notification: Notification) -> Result<(), PortError> {
        Ok(())
    }
}

/// Audit log that drops every record
#[derive(Debug, Default)]
pub struct NullAuditLog;

impl AuditLog for NullAuditLog {
    fn record(&self, _record: AuditRecord) -> Result<(), PortError> {
        Ok(())
    }
}

/// In-memory dispatcher that records what it was asked to send
///
/// Lets tests assert on fire-and-forget side effects.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("dispatcher mutex poisoned").clone()
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn dispatch(&self, notification: Notification) -> Result<(), PortError> {
        self.sent
            .lock()
            .expect("dispatcher mutex poisoned")
            .push(notification);
        Ok(())
    }
}

/// Dispatcher that always fails, for testing best-effort semantics
#[derive(Debug, Default)]
pub struct FailingDispatcher;

impl NotificationDispatcher for FailingDispatcher {
    fn dispatch(&self, _notification: Notification) -> Result<(), PortError> {
        Err(PortError::connection("notification gateway unreachable"))
    }
}

/// In-memory audit log for tests
#[derive(Debug, Default)]
pub struct RecordingAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl RecordingAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditLog for RecordingAuditLog {
    fn record(&self, record: AuditRecord) -> Result<(), PortError> {
        self.records
            .lock()
            .expect("audit mutex poisoned")
            .push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recording_dispatcher_captures_notifications() {
        let dispatcher = RecordingDispatcher::new();
        dispatcher
            .dispatch(Notification::CreditApprovalChanged {
                party: "PTY-1".into(),
                approved: true,
            })
            .unwrap();

        assert_eq!(dispatcher.sent().len(), 1);
    }

    #[test]
    fn test_failing_dispatcher_errors() {
        let dispatcher = FailingDispatcher;
        let result = dispatcher.dispatch(Notification::BalanceChanged {
            party: "PTY-1".into(),
            detail: "repayment".into(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_audit_record_builder() {
        let record = AuditRecord::new(
            "credit.approve",
            "PTY-1",
            json!({ "approved": false }),
            json!({ "approved": true }),
        )
        .by(UserId::new());

        assert_eq!(record.action, "credit.approve");
        assert!(record.actor.is_some());
    }
}
