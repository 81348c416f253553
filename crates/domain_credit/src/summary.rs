//! Derived credit summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, PartyId};

use crate::profile::{CreditProfile, PartyType};

/// A party's live credit standing
///
/// Everything derived here is recomputed per read: `outstanding` from the
/// ledger, `frozen` and `available` from the formulae below. None of these
/// fields is ever persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditSummary {
    pub party_id: PartyId,
    pub party_type: PartyType,
    pub is_approved: bool,
    /// `!is_approved && outstanding != 0` — blocks new credit while still
    /// permitting repayment
    pub frozen: bool,
    pub credit_limit: Money,
    /// Live ledger balance of the party's control-account lines
    pub outstanding: Money,
    /// `max(credit_limit - |outstanding|, 0)`
    pub available: Money,
    pub credit_duration_days: u32,
    pub last_repayment_date: Option<DateTime<Utc>>,
    pub last_repayment_amount: Option<Money>,
}

impl CreditSummary {
    /// Derives the summary from a profile and a live outstanding balance
    pub fn derive(
        party_id: PartyId,
        party_type: PartyType,
        profile: &CreditProfile,
        outstanding: Money,
    ) -> Self {
        Self {
            party_id,
            party_type,
            is_approved: profile.is_approved,
            frozen: !profile.is_approved && !outstanding.is_zero(),
            credit_limit: profile.credit_limit,
            outstanding,
            available: available_credit(profile.credit_limit, outstanding),
            credit_duration_days: profile.credit_duration_days,
            last_repayment_date: profile.last_repayment_date,
            last_repayment_amount: profile.last_repayment_amount,
        }
    }
}

/// `max(limit - |outstanding|, 0)` — never negative
pub fn available_credit(limit: Money, outstanding: Money) -> Money {
    let available = limit - outstanding.abs();
    if available.is_negative() {
        Money::zero(limit.currency())
    } else {
        available
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
    fn test_available_credit_basics() {
        assert_eq!(available_credit(kes(dec!(1000)), kes(dec!(0))), kes(dec!(1000)));
        assert_eq!(available_credit(kes(dec!(1000)), kes(dec!(200))), kes(dec!(800)));
        // Outstanding above the limit clamps to zero
        assert_eq!(available_credit(kes(dec!(1000)), kes(dec!(1500))), kes(dec!(0)));
        // Sign of outstanding does not matter
        assert_eq!(available_credit(kes(dec!(1000)), kes(dec!(-200))), kes(dec!(800)));
    }

    #[test]
    fn test_frozen_derivation() {
        let mut profile = CreditProfile::new(kes(dec!(0)));
        let party = PartyId::new();

        // Unapproved with debt -> frozen
        let s = CreditSummary::derive(party, PartyType::Customer, &profile, kes(dec!(50)));
        assert!(s.frozen);

        // Unapproved with nothing outstanding -> not frozen
        let s = CreditSummary::derive(party, PartyType::Customer, &profile, kes(dec!(0)));
        assert!(!s.frozen);

        // Approved with debt -> not frozen, even above the limit
        profile.is_approved = true;
        let s = CreditSummary::derive(party, PartyType::Customer, &profile, kes(dec!(5000)));
        assert!(!s.frozen);
        assert!(s.available.is_zero());
    }

    #[cfg(test)]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// available is always >= 0 and equals max(limit - |outstanding|, 0)
            #[test]
            fn available_credit_is_clamped(
                limit in 0i64..1_000_000_000i64,
                outstanding in -1_000_000_000i64..1_000_000_000i64
            ) {
                let limit = Money::from_minor(limit, Currency::KES);
                let outstanding = Money::from_minor(outstanding, Currency::KES);

                let available = available_credit(limit, outstanding);
                prop_assert!(!available.is_negative());

                let expected = limit - outstanding.abs();
                if expected.is_negative() {
                    prop_assert!(available.is_zero());
                } else {
                    prop_assert_eq!(available, expected);
                }
            }
        }
    }
}
