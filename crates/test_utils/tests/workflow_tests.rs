//! Integration Tests for DukaPOS Core
//!
//! These tests verify cross-domain workflows and end-to-end scenarios
//! that involve multiple crates working together.

use std::sync::Arc;

use chrono::Utc;
use core_kernel::{Currency, Money, UserId};
use rust_decimal_macros::dec;

use domain_credit::PartyType;
use domain_ledger::{meta, EntryDraft, EntrySource, LineDraft, RetailChartOfAccounts};
use domain_payment::{
    AllocationEngine, InMemoryObligationStore, ObligationSource, PaymentMethod,
};
use test_utils::{assert_ledger_balanced, ObligationBuilder, TestBackend};

fn kes(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, Currency::KES)
}

mod credit_sale_to_repayment_workflow {
    use super::*;

    /// A credit sale raises an obligation and a receivable; the customer's
    /// later payment settles both, oldest debt first, and leaves the books
    /// balanced with the credit summary reflecting the live ledger.
    #[test]
    fn test_credit_sale_then_bulk_repayment() {
        let backend = TestBackend::new();
        let store = Arc::new(InMemoryObligationStore::new());
        let party = backend.approved_customer(kes(dec!(10000)));

        // Two credit sales on different days.
        for (amount, minutes_ago) in [(dec!(3000), 2880), (dec!(1500), 1440)] {
            let obligation = ObligationBuilder::new()
                .for_party(party)
                .with_total(kes(amount))
                .created_minutes_ago(minutes_ago)
                .build();
            backend
                .ledger
                .post(
                    EntryDraft::new(EntrySource::Sale, "Credit sale")
                        .dated(obligation.created_at)
                        .line(
                            LineDraft::debit(RetailChartOfAccounts::RECEIVABLES, kes(amount))
                                .tagged(meta::PARTY, party.to_string()),
                        )
                        .credit(RetailChartOfAccounts::SALES, kes(amount)),
                )
                .unwrap();
            store.insert(obligation);
        }

        let summary = backend
            .credit
            .credit_summary(party, PartyType::Customer)
            .unwrap();
        assert_eq!(summary.outstanding, kes(dec!(4500)));
        assert_eq!(summary.available, kes(dec!(5500)));

        // Customer brings 4000 in cash.
        let mut engine = AllocationEngine::new(
            Arc::clone(&backend.ledger),
            Arc::clone(&store) as Arc<dyn ObligationSource>,
            Arc::clone(&backend.credit),
        );
        engine.register_hook(Arc::clone(&backend.credit) as Arc<dyn domain_payment::PostCommitHook>);
        let plan = engine
            .allocate_bulk_payment(party, PartyType::Customer, kes(dec!(4000)), PaymentMethod::Cash, None)
            .unwrap();

        // Older 3000 settled in full, newer 1500 down to 500.
        assert_eq!(plan.lines.len(), 2);
        assert!(plan.lines[0].settled);
        assert_eq!(plan.lines[1].amount_paid, kes(dec!(1000)));
        assert!(plan.excess_payment.is_zero());

        let summary = backend
            .credit
            .credit_summary(party, PartyType::Customer)
            .unwrap();
        assert_eq!(summary.outstanding, kes(dec!(500)));
        assert_eq!(summary.available, kes(dec!(9500)));
        assert_eq!(summary.last_repayment_amount, Some(kes(dec!(4000))));

        assert_ledger_balanced(&backend.ledger);
    }
}

mod shift_workflow {
    use super::*;
    use domain_cashier::ChannelConfig;

    /// A cashier's shift sees cash sales and a credit repayment; the
    /// expected closing balance reflects both, and the declared count's
    /// shortfall shows up as a negative variance.
    #[test]
    fn test_shift_with_sales_and_repayments() {
        let backend = TestBackend::new();
        let store = Arc::new(InMemoryObligationStore::new());
        let sessions = backend.session_service();
        let party = backend.approved_customer(kes(dec!(10000)));

        let channel = sessions
            .register_channel(
                ChannelConfig::new("Main till").with_account(RetailChartOfAccounts::CASH_DRAWER),
            )
            .unwrap();
        let session = sessions
            .open_session(
                channel,
                UserId::new(),
                &[(RetailChartOfAccounts::CASH_DRAWER.to_string(), kes(dec!(5000)))],
            )
            .unwrap();

        // One cash sale during the shift.
        backend
            .ledger
            .post(
                EntryDraft::new(EntrySource::Sale, "Cash sale")
                    .debit(RetailChartOfAccounts::CASH_DRAWER, kes(dec!(1200)))
                    .credit(RetailChartOfAccounts::SALES, kes(dec!(1200))),
            )
            .unwrap();

        // A credit customer repays 300 in cash at the same till.
        let obligation = ObligationBuilder::new()
            .for_party(party)
            .with_total(kes(dec!(300)))
            .build();
        backend
            .ledger
            .post(
                EntryDraft::new(EntrySource::Sale, "Credit sale")
                    .dated(obligation.created_at)
                    .line(
                        LineDraft::debit(RetailChartOfAccounts::RECEIVABLES, kes(dec!(300)))
                            .tagged(meta::PARTY, party.to_string()),
                    )
                    .credit(RetailChartOfAccounts::SALES, kes(dec!(300))),
            )
            .unwrap();
        let engine = AllocationEngine::new(
            Arc::clone(&backend.ledger),
            Arc::clone(&store) as Arc<dyn ObligationSource>,
            Arc::clone(&backend.credit),
        );
        store.insert(obligation);
        engine
            .allocate_bulk_payment(party, PartyType::Customer, kes(dec!(300)), PaymentMethod::Cash, None)
            .unwrap();

        let expected = sessions
            .expected_closing_balance(session.id, RetailChartOfAccounts::CASH_DRAWER, Utc::now())
            .unwrap();
        assert_eq!(expected, kes(dec!(6500)));

        // The drawer count comes up 100 short.
        let closed = sessions
            .close_session(
                session.id,
                &[(RetailChartOfAccounts::CASH_DRAWER.to_string(), kes(dec!(6400)))],
            )
            .unwrap();
        let variance = closed.variance.as_ref().unwrap();
        assert_eq!(variance[RetailChartOfAccounts::CASH_DRAWER], kes(dec!(-100)));

        assert_ledger_balanced(&backend.ledger);
    }
}
