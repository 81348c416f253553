//! Payment capture and allocation
//!
//! Obligations (unpaid orders and purchases), payment records, and the
//! allocation engine that applies incoming money to a party's debt
//! oldest-first. Credit tenders pass through an authorize/settle pair
//! instead of settling directly.

pub mod allocation;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod obligation;
pub mod payment;

pub use allocation::{allocate, AllocationLine, AllocationPlan};
pub use core_kernel::ObligationId;
pub use engine::{AllocationEngine, TenderAccounts};
pub use error::PaymentError;
pub use hooks::PostCommitHook;
pub use obligation::{
    InMemoryObligationStore, Obligation, ObligationKind, ObligationSource, ObligationState,
};
pub use payment::{Payment, PaymentMethod, PaymentStatus};
