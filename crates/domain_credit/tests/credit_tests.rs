//! Comprehensive tests for domain_credit

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use core_kernel::{
    Currency, Money, NullAuditLog, NullDispatcher, PartyId, RecordingAuditLog,
    RecordingDispatcher,
};
use domain_credit::{CreditError, CreditParty, CreditService, PartyType};
use domain_ledger::{
    meta, EntryDraft, EntrySource, Ledger, LineDraft, RetailChartOfAccounts,
};

fn kes(amount: Decimal) -> Money {
    Money::new(amount, Currency::KES)
}

fn zero() -> Money {
    Money::zero(Currency::KES)
}

fn ledger() -> Arc<Ledger> {
    Arc::new(
        Ledger::with_accounts(
            Currency::KES,
            RetailChartOfAccounts::create_standard_accounts(),
        )
        .unwrap(),
    )
}

fn service(ledger: Arc<Ledger>) -> CreditService {
    CreditService::new(ledger, Arc::new(NullDispatcher), Arc::new(NullAuditLog))
}

/// Posts a credit sale so the party owes `amount` on the receivables control
fn post_credit_sale(ledger: &Ledger, party: PartyId, amount: Money) {
    ledger
        .post(
            EntryDraft::new(EntrySource::Sale, "Credit sale")
                .line(
                    LineDraft::debit(RetailChartOfAccounts::RECEIVABLES, amount)
                        .tagged(meta::PARTY, party.to_string()),
                )
                .credit(RetailChartOfAccounts::SALES, amount),
        )
        .unwrap();
}

mod summaries {
    use super::*;

    #[test]
    fn test_scenario_a_no_outstanding_full_limit_available() {
        let ledger = ledger();
        let service = service(ledger);
        let party = service.register_party(CreditParty::new("Asha", zero()));

        service
            .approve_credit(party, PartyType::Customer, true, Some(kes(dec!(1000))), None)
            .unwrap();

        let summary = service.credit_summary(party, PartyType::Customer).unwrap();
        assert_eq!(summary.available, kes(dec!(1000)));
        assert!(summary.outstanding.is_zero());
        assert!(!summary.frozen);
    }

    #[test]
    fn test_scenario_b_outstanding_reduces_available() {
        let ledger = ledger();
        let service = service(ledger.clone());
        let party = service.register_party(CreditParty::new("Asha", zero()));

        service
            .approve_credit(party, PartyType::Customer, true, Some(kes(dec!(1000))), None)
            .unwrap();
        post_credit_sale(&ledger, party, kes(dec!(200)));

        let summary = service.credit_summary(party, PartyType::Customer).unwrap();
        assert_eq!(summary.outstanding, kes(dec!(200)));
        assert_eq!(summary.available, kes(dec!(800)));
    }

    #[test]
    fn test_outstanding_is_never_cached() {
        let ledger = ledger();
        let service = service(ledger.clone());
        let party = service.register_party(CreditParty::new("Asha", zero()));

        let before = service.credit_summary(party, PartyType::Customer).unwrap();
        assert!(before.outstanding.is_zero());

        // The ledger moves underneath the service; the next read sees it.
        post_credit_sale(&ledger, party, kes(dec!(450)));
        let after = service.credit_summary(party, PartyType::Customer).unwrap();
        assert_eq!(after.outstanding, kes(dec!(450)));
    }

    #[test]
    fn test_supplier_summary_requires_supplier_flag() {
        let service = service(ledger());
        let party = service.register_party(CreditParty::new("Asha", zero()));

        let result = service.credit_summary(party, PartyType::Supplier);
        assert!(matches!(result, Err(CreditError::NotASupplier(_))));
    }

    #[test]
    fn test_supplier_outstanding_reads_payables_control() {
        let ledger = ledger();
        let service = service(ledger.clone());
        let party =
            service.register_party(CreditParty::new("Wholesale", zero()).as_supplier(zero()));

        // Stock received on supplier credit
        ledger
            .post(
                EntryDraft::new(EntrySource::Purchase, "Stock on credit")
                    .debit(RetailChartOfAccounts::INVENTORY, kes(dec!(3000)))
                    .line(
                        LineDraft::credit(RetailChartOfAccounts::PAYABLES, kes(dec!(3000)))
                            .tagged(meta::PARTY, party.to_string()),
                    ),
            )
            .unwrap();

        let summary = service.credit_summary(party, PartyType::Supplier).unwrap();
        assert_eq!(summary.outstanding, kes(dec!(3000)));
    }

    #[test]
    fn test_unknown_party_not_found() {
        let service = service(ledger());
        let result = service.credit_summary(PartyId::new(), PartyType::Customer);
        assert!(matches!(result, Err(CreditError::PartyNotFound(_))));
    }
}

mod mutations {
    use super::*;

    #[test]
    fn test_negative_limit_rejected_before_write() {
        let service = service(ledger());
        let party = service.register_party(CreditParty::new("Asha", zero()));

        let result = service.update_credit_limit(
            party,
            PartyType::Customer,
            kes(dec!(-100)),
            None,
        );
        assert!(matches!(result, Err(CreditError::Validation(_))));

        // Nothing was written
        let summary = service.credit_summary(party, PartyType::Customer).unwrap();
        assert!(summary.credit_limit.is_zero());
    }

    #[test]
    fn test_zero_duration_rejected() {
        let service = service(ledger());
        let party = service.register_party(CreditParty::new("Asha", zero()));

        let result = service.update_credit_duration(party, PartyType::Customer, 0);
        assert!(matches!(result, Err(CreditError::Validation(_))));
    }

    #[test]
    fn test_approve_returns_fresh_summary() {
        let ledger = ledger();
        let service = service(ledger.clone());
        let party = service.register_party(CreditParty::new("Asha", zero()));
        post_credit_sale(&ledger, party, kes(dec!(150)));

        let summary = service
            .approve_credit(party, PartyType::Customer, true, Some(kes(dec!(500))), Some(14))
            .unwrap();

        assert!(summary.is_approved);
        assert_eq!(summary.credit_limit, kes(dec!(500)));
        assert_eq!(summary.outstanding, kes(dec!(150)));
        assert_eq!(summary.available, kes(dec!(350)));
        assert_eq!(summary.credit_duration_days, 14);
    }

    #[test]
    fn test_record_repayment_ignores_non_positive_amounts() {
        let service = service(ledger());
        let party = service.register_party(CreditParty::new("Asha", zero()));

        service
            .record_repayment(party, PartyType::Customer, kes(dec!(0)))
            .unwrap();
        service
            .record_repayment(party, PartyType::Customer, kes(dec!(-50)))
            .unwrap();

        let summary = service.credit_summary(party, PartyType::Customer).unwrap();
        assert!(summary.last_repayment_date.is_none());
        assert!(summary.last_repayment_amount.is_none());
    }

    #[test]
    fn test_record_repayment_updates_tracking_only() {
        let ledger = ledger();
        let service = service(ledger.clone());
        let party = service.register_party(CreditParty::new("Asha", zero()));
        post_credit_sale(&ledger, party, kes(dec!(400)));

        service
            .record_repayment(party, PartyType::Customer, kes(dec!(100)))
            .unwrap();

        let summary = service.credit_summary(party, PartyType::Customer).unwrap();
        assert_eq!(summary.last_repayment_amount, Some(kes(dec!(100))));
        // No ledger posting happened here; outstanding is unchanged.
        assert_eq!(summary.outstanding, kes(dec!(400)));
    }
}

mod authorization {
    use super::*;

    fn approved_party(service: &CreditService, limit: Money) -> PartyId {
        let party = service.register_party(CreditParty::new("Asha", zero()));
        service
            .approve_credit(party, PartyType::Customer, true, Some(limit), None)
            .unwrap();
        party
    }

    #[test]
    fn test_authorize_within_available_succeeds() {
        let service = service(ledger());
        let party = approved_party(&service, kes(dec!(1000)));

        assert!(service
            .authorize(party, PartyType::Customer, kes(dec!(1000)))
            .is_ok());
    }

    #[test]
    fn test_authorize_over_available_carries_numbers() {
        let ledger = ledger();
        let service = service(ledger.clone());
        let party = approved_party(&service, kes(dec!(1000)));
        post_credit_sale(&ledger, party, kes(dec!(700)));

        let result = service.authorize(party, PartyType::Customer, kes(dec!(500)));
        match result {
            Err(CreditError::CreditLimitExceeded {
                available,
                required,
            }) => {
                assert_eq!(available, dec!(300));
                assert_eq!(required, dec!(500));
            }
            other => panic!("expected CreditLimitExceeded, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_unapproved_party_is_refused() {
        let service = service(ledger());
        let party = service.register_party(CreditParty::new("Asha", zero()));

        let result = service.authorize(party, PartyType::Customer, kes(dec!(10)));
        assert!(matches!(result, Err(CreditError::NotApprovedForCredit(_))));
    }

    #[test]
    fn test_frozen_party_is_refused() {
        let ledger = ledger();
        let service = service(ledger.clone());
        let party = service.register_party(CreditParty::new("Asha", zero()));
        // Approve, let them borrow, then revoke while they still owe.
        service
            .approve_credit(party, PartyType::Customer, true, Some(kes(dec!(1000))), None)
            .unwrap();
        post_credit_sale(&ledger, party, kes(dec!(200)));
        service
            .approve_credit(party, PartyType::Customer, false, None, None)
            .unwrap();

        let summary = service.credit_summary(party, PartyType::Customer).unwrap();
        assert!(summary.frozen);

        let result = service.authorize(party, PartyType::Customer, kes(dec!(10)));
        assert!(matches!(result, Err(CreditError::CreditFrozen(_))));
    }
}

mod side_effects {
    use super::*;

    #[test]
    fn test_approval_sends_notification() {
        let dispatcher = Arc::new(RecordingDispatcher::new());
        let service = CreditService::new(ledger(), dispatcher.clone(), Arc::new(NullAuditLog));
        let party = service.register_party(CreditParty::new("Asha", zero()));

        service
            .approve_credit(party, PartyType::Customer, true, None, None)
            .unwrap();

        assert_eq!(dispatcher.sent().len(), 1);
    }

    #[test]
    fn test_failed_notification_never_fails_the_mutation() {
        let service = CreditService::new(
            ledger(),
            Arc::new(core_kernel::ports::FailingDispatcher),
            Arc::new(NullAuditLog),
        );
        let party = service.register_party(CreditParty::new("Asha", zero()));

        let summary = service
            .approve_credit(party, PartyType::Customer, true, Some(kes(dec!(100))), None)
            .unwrap();
        assert!(summary.is_approved);
    }

    #[test]
    fn test_each_mutation_is_audited() {
        let audit = Arc::new(RecordingAuditLog::new());
        let service = CreditService::new(ledger(), Arc::new(NullDispatcher), audit.clone());
        let party = service.register_party(CreditParty::new("Asha", zero()));

        service
            .approve_credit(party, PartyType::Customer, true, None, None)
            .unwrap();
        service
            .update_credit_limit(party, PartyType::Customer, kes(dec!(500)), None)
            .unwrap();
        service
            .update_credit_duration(party, PartyType::Customer, 7)
            .unwrap();

        let actions: Vec<_> = audit.records().iter().map(|r| r.action.clone()).collect();
        assert_eq!(
            actions,
            vec![
                "credit.approve",
                "credit.update_limit",
                "credit.update_duration"
            ]
        );
    }
}
