//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. These builders allow tests to specify only the relevant fields
//! while using defaults for everything else.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use core_kernel::{Currency, Money, NullAuditLog, NullDispatcher, PartyId};
use fake::faker::company::en::CompanyName;
use fake::Fake;

use domain_cashier::SessionService;
use domain_credit::{CreditParty, CreditService, PartyType};
use domain_ledger::Ledger;
use domain_payment::{Obligation, ObligationKind};

use crate::fixtures::{ChartFixtures, MoneyFixtures, StringFixtures, TemporalFixtures};

/// Builder for constructing test obligations
pub struct ObligationBuilder {
    party_id: PartyId,
    kind: ObligationKind,
    total: Money,
    created_at: DateTime<Utc>,
}

impl Default for ObligationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ObligationBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            party_id: PartyId::new(),
            kind: ObligationKind::Order,
            total: MoneyFixtures::kes_order(),
            created_at: Utc::now(),
        }
    }

    /// Sets the owing party
    pub fn for_party(mut self, party_id: PartyId) -> Self {
        self.party_id = party_id;
        self
    }

    /// Sets the obligation kind
    pub fn with_kind(mut self, kind: ObligationKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the total amount owed
    pub fn with_total(mut self, total: Money) -> Self {
        self.total = total;
        self
    }

    /// Backdates the obligation for FIFO ordering tests
    pub fn created_minutes_ago(mut self, minutes: i64) -> Self {
        self.created_at = TemporalFixtures::minutes_ago(minutes);
        self
    }

    /// Builds the obligation
    pub fn build(self) -> Obligation {
        Obligation::new(self.party_id, self.kind, self.total, self.created_at)
    }
}

/// Builder for constructing test credit parties
pub struct CreditPartyBuilder {
    name: String,
    currency: Currency,
    supplier: bool,
}

impl Default for CreditPartyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CreditPartyBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            name: StringFixtures::customer_name().to_string(),
            currency: Currency::KES,
            supplier: false,
        }
    }

    /// Sets the trading name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Uses a random trading name
    pub fn with_random_name(mut self) -> Self {
        self.name = CompanyName().fake();
        self
    }

    /// Sets the party's currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Also flags the party as a supplier
    pub fn as_supplier(mut self) -> Self {
        self.supplier = true;
        self
    }

    /// Builds the party
    pub fn build(self) -> CreditParty {
        let zero = Money::zero(self.currency);
        let party = CreditParty::new(self.name, zero);
        if self.supplier {
            party.as_supplier(zero)
        } else {
            party
        }
    }
}

/// A wired-up ledger and credit service for integration tests
pub struct TestBackend {
    pub ledger: Arc<Ledger>,
    pub credit: Arc<CreditService>,
}

impl TestBackend {
    /// Ledger with the standard retail chart plus a credit service on null
    /// ports
    pub fn new() -> Self {
        let ledger = Arc::new(
            Ledger::with_accounts(Currency::KES, ChartFixtures::standard_chart())
                .expect("standard chart registers cleanly"),
        );
        let credit = Arc::new(CreditService::new(
            Arc::clone(&ledger),
            Arc::new(NullDispatcher),
            Arc::new(NullAuditLog),
        ));
        Self { ledger, credit }
    }

    /// A session service on the same ledger, wired to null ports
    pub fn session_service(&self) -> SessionService {
        SessionService::new(
            Arc::clone(&self.ledger),
            Arc::new(NullDispatcher),
            Arc::new(NullAuditLog),
        )
    }

    /// Registers a customer approved for credit up to `limit`
    pub fn approved_customer(&self, limit: Money) -> PartyId {
        let party = self.credit.register_party(CreditPartyBuilder::new().build());
        self.credit
            .approve_credit(party, PartyType::Customer, true, Some(limit), None)
            .expect("approval of a fresh party succeeds");
        party
    }
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}
