//! Credit Domain - Ledger-Derived Credit for Customers and Suppliers
//!
//! Customer and supplier credit share one implementation, parameterized by
//! [`PartyType`]. Outstanding amounts are never persisted; every summary
//! recomputes them from the ledger's party-tagged control-account lines, so
//! a credit decision always sees the balance as of the same consistent
//! snapshot.
//!
//! # Derived state
//!
//! - `outstanding` — live ledger balance of the party's lines
//! - `frozen` — `!is_approved && outstanding != 0`
//! - `available` — `max(credit_limit - |outstanding|, 0)`

pub mod error;
pub mod profile;
pub mod service;
pub mod summary;

pub use error::CreditError;
pub use profile::{CreditParty, CreditProfile, PartyType};
pub use service::{CreditAccounts, CreditService};
pub use summary::{available_credit, CreditSummary};
