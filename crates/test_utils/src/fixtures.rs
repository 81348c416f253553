//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the POS
//! system. These fixtures are designed to be consistent and predictable
//! for unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{Currency, Money, ObligationId, PartyId, SessionId};
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;

use domain_ledger::{Account, RetailChartOfAccounts};

/// The standard retail chart, built once per test binary
static STANDARD_CHART: Lazy<Vec<Account>> =
    Lazy::new(RetailChartOfAccounts::create_standard_accounts);

/// Fixture for ledger account test data
pub struct ChartFixtures;

impl ChartFixtures {
    /// A clone of the standard retail chart of accounts
    pub fn standard_chart() -> Vec<Account> {
        STANDARD_CHART.clone()
    }
}

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A standard shilling amount for testing
    pub fn kes_100() -> Money {
        Money::new(dec!(100.00), Currency::KES)
    }

    /// A typical credit limit
    pub fn kes_limit() -> Money {
        Money::new(dec!(50000.00), Currency::KES)
    }

    /// A typical obligation total
    pub fn kes_order() -> Money {
        Money::new(dec!(1500.00), Currency::KES)
    }

    /// A zero shilling amount
    pub fn kes_zero() -> Money {
        Money::zero(Currency::KES)
    }

    /// A EUR amount for currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }

    /// A TZS amount (zero decimal places)
    pub fn tzs_10000() -> Money {
        Money::new(dec!(10000), Currency::TZS)
    }

    /// A negative amount for refund scenarios
    pub fn kes_refund() -> Money {
        Money::new(dec!(-50.00), Currency::KES)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard shift open (Jan 15, 2024, 08:00 UTC)
    pub fn shift_open() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()
    }

    /// Standard shift close (Jan 15, 2024, 18:00 UTC)
    pub fn shift_close() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 18, 0, 0).unwrap()
    }

    /// A moment `minutes` before now, for backdating obligations
    pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
        Utc::now() - Duration::minutes(minutes)
    }

    /// A moment `days` before now
    pub fn days_ago(days: i64) -> DateTime<Utc> {
        Utc::now() - Duration::days(days)
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    /// A customer trading name
    pub fn customer_name() -> &'static str {
        "Wanjiku General Stores"
    }

    /// A supplier trading name
    pub fn supplier_name() -> &'static str {
        "Kilimani Wholesale Ltd"
    }

    /// A sales channel name
    pub fn channel_name() -> &'static str {
        "Main till"
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    pub fn party_id() -> PartyId {
        PartyId::new()
    }

    pub fn obligation_id() -> ObligationId {
        ObligationId::new()
    }

    pub fn session_id() -> SessionId {
        SessionId::new()
    }
}
