//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use chrono::{DateTime, Duration, Utc};
use core_kernel::{Currency, Money, PartyId};
use proptest::prelude::*;

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::KES),
        Just(Currency::TZS),
        Just(Currency::UGX),
        Just(Currency::NGN),
        Just(Currency::ZAR),
        Just(Currency::INR),
    ]
}

/// Strategy for generating valid positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating valid amount ranges
pub fn amount_minor_strategy() -> impl Strategy<Value = i64> {
    -1_000_000_000i64..1_000_000_000i64
}

/// Strategy for generating valid Money values with positive amounts
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for generating valid Money values (can be negative)
pub fn money_strategy() -> impl Strategy<Value = Money> {
    (amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for generating valid KES Money values
pub fn kes_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|amount| Money::from_minor(amount, Currency::KES))
}

/// Strategy for generating party ids
pub fn party_id_strategy() -> impl Strategy<Value = PartyId> {
    any::<u128>().prop_map(|n| PartyId::from_uuid(uuid::Uuid::from_u128(n)))
}

/// Strategy for generating recent timestamps (within the last year)
pub fn recent_timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..525_600i64).prop_map(|minutes| Utc::now() - Duration::minutes(minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn positive_money_is_positive(money in positive_money_strategy()) {
            prop_assert!(money.is_positive());
        }

        #[test]
        fn kes_money_keeps_its_currency(money in kes_money_strategy()) {
            prop_assert_eq!(money.currency(), Currency::KES);
        }

        #[test]
        fn recent_timestamps_are_in_the_past(ts in recent_timestamp_strategy()) {
            prop_assert!(ts <= Utc::now());
        }
    }
}
