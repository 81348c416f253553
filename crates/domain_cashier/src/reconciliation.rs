//! Reconciliation records
//!
//! A reconciliation compares declared balances against the ledger's balances
//! account by account at a point in time. Session closes produce one
//! automatically for the channel's tender account; manual reconciliations
//! can cover any set of accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, ReconciliationId, SessionId, UserId};

/// What a reconciliation covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconciliationScope {
    /// Produced automatically when a session closes
    Session(SessionId),
    /// Requested outside any session, e.g. a spot count
    Manual,
}

/// One account's declared-vs-expected comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationLine {
    pub account_code: String,
    /// What was physically counted or externally confirmed
    pub declared: Money,
    /// The ledger balance as of the reconciliation point
    pub expected: Money,
    /// `declared - expected`
    pub variance: Money,
}

/// A persisted declared-vs-ledger comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconciliation {
    pub id: ReconciliationId,
    pub scope: ReconciliationScope,
    pub performed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    /// Point in time the expected balances were read at
    pub as_of: DateTime<Utc>,
    pub lines: Vec<ReconciliationLine>,
    pub total_declared: Money,
    pub total_expected: Money,
    pub total_variance: Money,
}

impl Reconciliation {
    /// Builds a reconciliation from per-account lines
    ///
    /// Totals are sums over the lines; an empty reconciliation totals zero.
    pub fn from_lines(
        scope: ReconciliationScope,
        performed_by: Option<UserId>,
        as_of: DateTime<Utc>,
        lines: Vec<ReconciliationLine>,
        currency: Currency,
    ) -> Self {
        let zero = Money::zero(currency);
        let total_declared = lines.iter().fold(zero, |acc, l| acc + l.declared);
        let total_expected = lines.iter().fold(zero, |acc, l| acc + l.expected);
        let total_variance = lines.iter().fold(zero, |acc, l| acc + l.variance);
        Self {
            id: ReconciliationId::new_v7(),
            scope,
            performed_by,
            created_at: Utc::now(),
            as_of,
            lines,
            total_declared,
            total_expected,
            total_variance,
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.total_variance.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn kes(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::KES)
    }

    fn line(code: &str, declared: Money, expected: Money) -> ReconciliationLine {
        ReconciliationLine {
            account_code: code.to_string(),
            declared,
            expected,
            variance: declared - expected,
        }
    }

    #[test]
    fn test_totals_sum_over_lines() {
        let rec = Reconciliation::from_lines(
            ReconciliationScope::Manual,
            None,
            Utc::now(),
            vec![
                line("1010", kes(dec!(6400)), kes(dec!(6500))),
                line("1020", kes(dec!(2000)), kes(dec!(2000))),
            ],
            Currency::KES,
        );

        assert_eq!(rec.total_declared, kes(dec!(8400)));
        assert_eq!(rec.total_expected, kes(dec!(8500)));
        assert_eq!(rec.total_variance, kes(dec!(-100)));
        assert!(!rec.is_balanced());
    }

    #[test]
    fn test_empty_reconciliation_is_balanced() {
        let rec = Reconciliation::from_lines(
            ReconciliationScope::Manual,
            None,
            Utc::now(),
            Vec::new(),
            Currency::KES,
        );
        assert!(rec.is_balanced());
        assert!(rec.total_declared.is_zero());
    }
}
