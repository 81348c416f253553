//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_ledger::{JournalEntry, Ledger};
use rust_decimal::Decimal;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than
/// `tolerance`
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(
        money.is_positive(),
        "Expected positive money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a journal entry's debits equal its credits
pub fn assert_entry_balanced(entry: &JournalEntry) {
    let debits = entry.total_debits();
    let credits = entry.total_credits();
    assert_eq!(
        debits, credits,
        "Entry {} is imbalanced: debits={}, credits={}",
        entry.id, debits, credits
    );
}

/// Asserts that the whole ledger still balances
///
/// Sums every entry's debits against its credits through the trial balance.
pub fn assert_ledger_balanced(ledger: &Ledger) {
    let trial = ledger
        .trial_balance(None)
        .expect("trial balance computes on a consistent ledger");
    assert!(
        trial.is_balanced,
        "Ledger out of balance: debits={}, credits={}",
        trial.total_debits,
        trial.total_credits
    );
}
