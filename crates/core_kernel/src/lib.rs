//! Core Kernel - Foundational types and utilities for the POS backend
//!
//! This crate provides the fundamental building blocks used across all domain
//! modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers
//! - Collaborator port contracts (notification, audit)

pub mod error;
pub mod identifiers;
pub mod money;
pub mod ports;

pub use error::CoreError;
pub use identifiers::{
    AccountId, AuditEventId, ChannelId, JournalEntryId, JournalLineId, ObligationId, PartyId,
    PaymentId, ReconciliationId, SessionId, UserId,
};
pub use money::{Currency, Money, MoneyError};
pub use ports::{
    AuditLog, AuditRecord, FailingDispatcher, Notification, NotificationDispatcher, NullAuditLog,
    NullDispatcher, PortError, RecordingAuditLog, RecordingDispatcher,
};
