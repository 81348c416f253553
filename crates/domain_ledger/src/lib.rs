//! Ledger Domain - Append-Only Double-Entry Journal
//!
//! This crate is the source of truth for every balance in the POS backend.
//! It enforces strict double-entry bookkeeping over an append-only journal
//! and derives all balances live from journal lines; nothing is cached.
//!
//! # Double-Entry Principles
//!
//! - Every entry's debits equal its credits
//! - Debits increase asset/expense accounts
//! - Credits increase liability/equity/income accounts
//! - Posted entries never change; corrections are reversing entries
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{Ledger, EntryDraft, EntrySource, RetailChartOfAccounts};
//!
//! let ledger = Ledger::with_accounts(
//!     Currency::KES,
//!     RetailChartOfAccounts::create_standard_accounts(),
//! )?;
//!
//! ledger.post(
//!     EntryDraft::new(EntrySource::Sale, "Cash sale")
//!         .debit(RetailChartOfAccounts::CASH_DRAWER, total)
//!         .credit(RetailChartOfAccounts::SALES, total),
//! )?;
//! ```

pub mod account;
pub mod entry;
pub mod error;
pub mod hierarchy;
pub mod ledger;

pub use account::{Account, AccountType, RetailChartOfAccounts};
pub use entry::{meta, EntryDraft, EntrySource, JournalEntry, JournalLine, LineDraft};
pub use error::LedgerError;
pub use hierarchy::{build_hierarchy, AccountNode};
pub use ledger::{AccountBalance, Ledger, TrialBalance, TrialBalanceRow};
