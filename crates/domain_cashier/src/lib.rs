//! Cashier sessions and reconciliation
//!
//! Shift handling for sales channels: open a shift with counted balances
//! for each cashier-controlled account, derive expected closing balances
//! from the ledger's movement during the shift, and reconcile declared
//! counts against the books.

pub mod error;
pub mod reconciliation;
pub mod service;
pub mod session;

pub use error::CashierError;
pub use reconciliation::{Reconciliation, ReconciliationLine, ReconciliationScope};
pub use service::SessionService;
pub use session::{CashierSession, ChannelConfig, DeclaredBalances, SessionStatus};
