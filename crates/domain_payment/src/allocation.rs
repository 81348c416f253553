//! Deterministic greedy allocation
//!
//! Pure planning step of the engine: given a payment and an ordered list of
//! obligations, decide how much goes to each. No I/O, no locking; the engine
//! applies the plan afterwards.

use serde::{Deserialize, Serialize};

use core_kernel::{Money, ObligationId};

use crate::obligation::Obligation;

/// One obligation's share of a payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationLine {
    pub obligation_id: ObligationId,
    pub amount_paid: Money,
    /// True when the allocation covered the full outstanding
    pub settled: bool,
}

/// The outcome of allocating one payment
///
/// Conservation holds by construction:
/// `total_allocated + excess_payment == payment`, and
/// `remaining_balance` is the debt left across the candidates afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub lines: Vec<AllocationLine>,
    pub total_allocated: Money,
    /// Payment left over once every candidate is satisfied; never silently
    /// discarded — the caller decides its disposition
    pub excess_payment: Money,
    /// Outstanding debt remaining on the candidates after the allocation
    pub remaining_balance: Money,
}

/// Greedily allocates `payment` across `obligations` in the order given
///
/// For each obligation the allocation is `min(remaining, outstanding)`;
/// the walk stops when the payment is exhausted. Obligations with nothing
/// outstanding are skipped. The caller owns the ordering (FIFO for the
/// default path, caller-supplied otherwise).
pub fn allocate(payment: Money, obligations: &[Obligation]) -> AllocationPlan {
    let zero = Money::zero(payment.currency());
    let mut remaining = if payment.is_negative() { zero } else { payment };
    let mut lines = Vec::new();
    let mut total_allocated = zero;
    let mut remaining_balance = zero;

    for obligation in obligations {
        if !obligation.outstanding.is_positive() {
            continue;
        }

        let paid = remaining.min(&obligation.outstanding);
        if paid.is_positive() {
            lines.push(AllocationLine {
                obligation_id: obligation.id,
                amount_paid: paid,
                settled: paid == obligation.outstanding,
            });
            total_allocated = total_allocated + paid;
            remaining = remaining - paid;
        }
        remaining_balance = remaining_balance + (obligation.outstanding - paid);
    }

    AllocationPlan {
        lines,
        total_allocated,
        excess_payment: remaining,
        remaining_balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obligation::ObligationKind;
    use chrono::Utc;
    use core_kernel::{Currency, PartyId};
    use rust_decimal_macros::dec;

    fn kes(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::KES)
    }

    fn obligation(total: rust_decimal::Decimal) -> Obligation {
        Obligation::new(PartyId::new(), ObligationKind::Order, kes(total), Utc::now())
    }

    #[test]
    fn test_exact_split_across_two_obligations() {
        let obligations = vec![obligation(dec!(300)), obligation(dec!(400))];
        let plan = allocate(kes(dec!(500)), &obligations);

        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.lines[0].amount_paid, kes(dec!(300)));
        assert!(plan.lines[0].settled);
        assert_eq!(plan.lines[1].amount_paid, kes(dec!(200)));
        assert!(!plan.lines[1].settled);
        assert_eq!(plan.total_allocated, kes(dec!(500)));
        assert!(plan.excess_payment.is_zero());
        assert_eq!(plan.remaining_balance, kes(dec!(200)));
    }

    #[test]
    fn test_overpayment_becomes_excess() {
        let obligations = vec![obligation(dec!(700))];
        let plan = allocate(kes(dec!(1000)), &obligations);

        assert_eq!(plan.lines[0].amount_paid, kes(dec!(700)));
        assert!(plan.lines[0].settled);
        assert_eq!(plan.excess_payment, kes(dec!(300)));
        assert!(plan.remaining_balance.is_zero());
    }

    #[test]
    fn test_payment_smaller_than_first_obligation() {
        let obligations = vec![obligation(dec!(300)), obligation(dec!(400))];
        let plan = allocate(kes(dec!(100)), &obligations);

        assert_eq!(plan.lines.len(), 1);
        assert_eq!(plan.lines[0].amount_paid, kes(dec!(100)));
        assert!(!plan.lines[0].settled);
        assert_eq!(plan.remaining_balance, kes(dec!(600)));
    }

    #[test]
    fn test_no_obligations_all_excess() {
        let plan = allocate(kes(dec!(250)), &[]);
        assert!(plan.lines.is_empty());
        assert_eq!(plan.excess_payment, kes(dec!(250)));
        assert!(plan.total_allocated.is_zero());
    }

    #[test]
    fn test_settled_obligations_are_skipped() {
        let mut settled = obligation(dec!(100));
        settled.apply_payment(kes(dec!(100)));
        let open = obligation(dec!(200));
        let open_id = open.id;

        let plan = allocate(kes(dec!(150)), &[settled, open]);
        assert_eq!(plan.lines.len(), 1);
        assert_eq!(plan.lines[0].obligation_id, open_id);
    }

    #[test]
    fn test_negative_payment_allocates_nothing() {
        let obligations = vec![obligation(dec!(300))];
        let plan = allocate(kes(dec!(-50)), &obligations);

        assert!(plan.lines.is_empty());
        assert!(plan.total_allocated.is_zero());
        assert!(plan.excess_payment.is_zero());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// For any payment and obligation set,
            /// total_allocated + excess == payment.
            #[test]
            fn allocation_conserves_the_payment(
                payment in 0i64..2_000_000i64,
                totals in proptest::collection::vec(1i64..500_000i64, 0..10)
            ) {
                let payment = Money::from_minor(payment, Currency::KES);
                let obligations: Vec<Obligation> =
                    totals.iter().map(|t| obligation(Money::from_minor(*t, Currency::KES).amount())).collect();

                let plan = allocate(payment, &obligations);

                let paid_sum = plan
                    .lines
                    .iter()
                    .fold(Money::zero(Currency::KES), |acc, l| acc + l.amount_paid);
                prop_assert_eq!(paid_sum, plan.total_allocated);
                prop_assert_eq!(plan.total_allocated + plan.excess_payment, payment);

                let before: Money = obligations
                    .iter()
                    .fold(Money::zero(Currency::KES), |acc, o| acc + o.outstanding);
                prop_assert_eq!(before - plan.total_allocated, plan.remaining_balance);
            }

            /// No line ever pays more than the obligation's outstanding.
            #[test]
            fn no_line_exceeds_outstanding(
                payment in 0i64..2_000_000i64,
                totals in proptest::collection::vec(1i64..500_000i64, 1..10)
            ) {
                let payment = Money::from_minor(payment, Currency::KES);
                let obligations: Vec<Obligation> =
                    totals.iter().map(|t| obligation(Money::from_minor(*t, Currency::KES).amount())).collect();

                let plan = allocate(payment, &obligations);
                for line in &plan.lines {
                    let obligation = obligations
                        .iter()
                        .find(|o| o.id == line.obligation_id)
                        .unwrap();
                    prop_assert!(line.amount_paid <= obligation.outstanding);
                    prop_assert!(line.amount_paid.is_positive());
                }
            }
        }
    }
}
