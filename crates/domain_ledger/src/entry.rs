//! Journal entry and line types
//!
//! A journal entry is one balanced accounting transaction; each of its lines
//! posts a debit or credit against a single account code. Entries are built
//! through [`EntryDraft`] and become immutable once the ledger accepts them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use core_kernel::{JournalEntryId, JournalLineId, Money};

/// Well-known metadata tag keys used on journal lines
pub mod meta {
    /// Party the line belongs to (credit outstanding derivation)
    pub const PARTY: &str = "party";
    /// Obligation settled by the line
    pub const OBLIGATION: &str = "obligation";
    /// Entry id this line reverses
    pub const REVERSES: &str = "reverses";
    /// Free-form expense category
    pub const CATEGORY: &str = "category";
}

/// Business source of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    Sale,
    Purchase,
    Payment,
    Transfer,
    Expense,
    Reversal,
    Adjustment,
}

/// A single line (per-account posting) in a journal entry
///
/// Exactly one of `debit` / `credit` is positive; the other is zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLine {
    /// Unique line identifier
    pub id: JournalLineId,
    /// Account code the line posts against
    pub account_code: String,
    /// Debit amount (>= 0)
    pub debit: Money,
    /// Credit amount (>= 0)
    pub credit: Money,
    /// Free-form tags (party, obligation, expense category, ...)
    pub meta: BTreeMap<String, String>,
}

impl JournalLine {
    /// Returns the meta tag value for a key, if present
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }
}

/// A posted journal entry
///
/// Immutable once posted; corrections are new reversing entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique entry identifier
    pub id: JournalEntryId,
    /// Business date of the transaction
    pub entry_date: DateTime<Utc>,
    /// When the ledger accepted the entry
    pub posted_at: DateTime<Utc>,
    /// Business source
    pub source: EntrySource,
    /// Identifier of the source record (order, purchase, payment, ...)
    pub source_id: Option<Uuid>,
    /// Human-readable memo
    pub memo: String,
    /// The entry's lines (1..N)
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    /// Sum of all debit amounts
    pub fn total_debits(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(self.currency()), |acc, l| acc + l.debit)
    }

    /// Sum of all credit amounts
    pub fn total_credits(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(self.currency()), |acc, l| acc + l.credit)
    }

    /// The entry currency (uniform across lines, enforced at post time)
    pub fn currency(&self) -> core_kernel::Currency {
        self.lines
            .first()
            .map(|l| l.debit.currency())
            .expect("posted entries always have at least one line")
    }

    /// Returns true if this entry reverses another
    pub fn is_reversal(&self) -> bool {
        self.source == EntrySource::Reversal
    }
}

/// A draft line inside an [`EntryDraft`]
#[derive(Debug, Clone)]
pub struct LineDraft {
    pub account_code: String,
    pub debit: Money,
    pub credit: Money,
    pub meta: BTreeMap<String, String>,
}

impl LineDraft {
    /// Creates a debit line draft
    pub fn debit(account_code: impl Into<String>, amount: Money) -> Self {
        Self {
            account_code: account_code.into(),
            debit: amount,
            credit: Money::zero(amount.currency()),
            meta: BTreeMap::new(),
        }
    }

    /// Creates a credit line draft
    pub fn credit(account_code: impl Into<String>, amount: Money) -> Self {
        Self {
            account_code: account_code.into(),
            debit: Money::zero(amount.currency()),
            credit: amount,
            meta: BTreeMap::new(),
        }
    }

    /// Adds a meta tag to the line
    pub fn tagged(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// Builder for a journal entry awaiting posting
///
/// ```rust,ignore
/// let draft = EntryDraft::new(EntrySource::Sale, "Credit sale")
///     .debit(RetailChartOfAccounts::RECEIVABLES, total)
///     .credit(RetailChartOfAccounts::SALES, total);
/// ledger.post(draft)?;
/// ```
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub source: EntrySource,
    pub source_id: Option<Uuid>,
    pub memo: String,
    /// Business date override; defaults to the posting instant
    pub entry_date: Option<DateTime<Utc>>,
    pub lines: Vec<LineDraft>,
}

impl EntryDraft {
    /// Creates a new draft
    pub fn new(source: EntrySource, memo: impl Into<String>) -> Self {
        Self {
            source,
            source_id: None,
            memo: memo.into(),
            entry_date: None,
            lines: Vec::new(),
        }
    }

    /// Sets the source record identifier
    pub fn with_source_id(mut self, source_id: Uuid) -> Self {
        self.source_id = Some(source_id);
        self
    }

    /// Overrides the business date
    pub fn dated(mut self, date: DateTime<Utc>) -> Self {
        self.entry_date = Some(date);
        self
    }

    /// Adds a debit line
    pub fn debit(mut self, account_code: impl Into<String>, amount: Money) -> Self {
        self.lines.push(LineDraft::debit(account_code, amount));
        self
    }

    /// Adds a credit line
    pub fn credit(mut self, account_code: impl Into<String>, amount: Money) -> Self {
        self.lines.push(LineDraft::credit(account_code, amount));
        self
    }

    /// Adds a prepared line
    pub fn line(mut self, line: LineDraft) -> Self {
        self.lines.push(line);
        self
    }

    /// Checks whether total debits equal total credits
    pub fn is_balanced(&self) -> bool {
        let mut debits = rust_decimal::Decimal::ZERO;
        let mut credits = rust_decimal::Decimal::ZERO;

        for line in &self.lines {
            debits += line.debit.amount();
            credits += line.credit.amount();
        }

        debits == credits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn kes(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::KES)
    }

    #[test]
    fn test_draft_builder_balances() {
        let draft = EntryDraft::new(EntrySource::Sale, "Cash sale")
            .debit("1010", kes(dec!(250)))
            .credit("4000", kes(dec!(250)));

        assert!(draft.is_balanced());
        assert_eq!(draft.lines.len(), 2);
    }

    #[test]
    fn test_unbalanced_draft_detected() {
        let draft = EntryDraft::new(EntrySource::Sale, "Bad entry")
            .debit("1010", kes(dec!(250)))
            .credit("4000", kes(dec!(200)));

        assert!(!draft.is_balanced());
    }

    #[test]
    fn test_line_tags() {
        let line = LineDraft::credit("1200", kes(dec!(100)))
            .tagged(meta::PARTY, "PTY-1")
            .tagged(meta::OBLIGATION, "OBL-1");

        assert_eq!(line.meta.len(), 2);
        assert_eq!(line.meta.get(meta::PARTY).map(String::as_str), Some("PTY-1"));
    }
}
