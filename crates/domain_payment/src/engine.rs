//! Payment allocation engine
//!
//! Consumes a party's outstanding obligations, applies a greedy allocation
//! plan, posts one balanced settlement entry to the ledger, and then settles
//! each obligation through the obligation port. Allocation for a party is
//! serialized through a per-party critical section so two concurrent bulk
//! payments can never both spend the same outstanding balance.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

use core_kernel::{JournalEntryId, Money, ObligationId, PartyId};
use domain_credit::{CreditService, PartyType};
use domain_ledger::{
    meta, EntryDraft, EntrySource, JournalEntry, Ledger, LineDraft, RetailChartOfAccounts,
};

use crate::allocation::{allocate, AllocationLine, AllocationPlan};
use crate::error::PaymentError;
use crate::hooks::PostCommitHook;
use crate::obligation::{Obligation, ObligationSource};
use crate::payment::{Payment, PaymentMethod, PaymentStatus};

/// Ledger accounts the engine posts settlements against
#[derive(Debug, Clone)]
pub struct TenderAccounts {
    pub cash: String,
    pub mobile_money: String,
    pub bank: String,
    pub receivables: String,
    pub payables: String,
}

impl Default for TenderAccounts {
    fn default() -> Self {
        Self {
            cash: RetailChartOfAccounts::CASH_DRAWER.to_string(),
            mobile_money: RetailChartOfAccounts::MOBILE_MONEY.to_string(),
            bank: RetailChartOfAccounts::BANK.to_string(),
            receivables: RetailChartOfAccounts::RECEIVABLES.to_string(),
            payables: RetailChartOfAccounts::PAYABLES.to_string(),
        }
    }
}

impl TenderAccounts {
    /// The tender account for a method; credit has none
    pub fn tender_account(&self, method: PaymentMethod) -> Option<&str> {
        match method {
            PaymentMethod::Cash => Some(&self.cash),
            PaymentMethod::MobileMoney => Some(&self.mobile_money),
            PaymentMethod::BankTransfer => Some(&self.bank),
            PaymentMethod::Credit => None,
        }
    }

    /// The control account obligations of one party side live on
    pub fn control_account(&self, party_type: PartyType) -> &str {
        match party_type {
            PartyType::Customer => &self.receivables,
            PartyType::Supplier => &self.payables,
        }
    }
}

/// Allocates incoming payments across a party's outstanding obligations
pub struct AllocationEngine {
    ledger: Arc<Ledger>,
    obligations: Arc<dyn ObligationSource>,
    credit: Arc<CreditService>,
    accounts: TenderAccounts,
    hooks: Vec<Arc<dyn PostCommitHook>>,
    party_locks: Mutex<HashMap<PartyId, Arc<Mutex<()>>>>,
}

impl AllocationEngine {
    pub fn new(
        ledger: Arc<Ledger>,
        obligations: Arc<dyn ObligationSource>,
        credit: Arc<CreditService>,
    ) -> Self {
        Self::with_accounts(ledger, obligations, credit, TenderAccounts::default())
    }

    pub fn with_accounts(
        ledger: Arc<Ledger>,
        obligations: Arc<dyn ObligationSource>,
        credit: Arc<CreditService>,
        accounts: TenderAccounts,
    ) -> Self {
        Self {
            ledger,
            obligations,
            credit,
            accounts,
            hooks: Vec::new(),
            party_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a post-commit hook; call during wiring, before sharing
    pub fn register_hook(&mut self, hook: Arc<dyn PostCommitHook>) {
        self.hooks.push(hook);
    }

    /// Allocates one payment across a party's outstanding obligations
    ///
    /// With no candidate list the obligations are taken oldest-first (FIFO
    /// by creation date); an explicit candidate list is honored in the
    /// caller's order. The greedy plan posts one balanced entry and then
    /// settles each obligation through the obligation port; any amount left
    /// after all candidates are satisfied comes back as `excess_payment`
    /// for the caller to dispose of.
    pub fn allocate_bulk_payment(
        &self,
        party: PartyId,
        party_type: PartyType,
        payment: Money,
        tender: PaymentMethod,
        candidates: Option<&[ObligationId]>,
    ) -> Result<AllocationPlan, PaymentError> {
        if !payment.is_positive() {
            return Err(PaymentError::validation(format!(
                "payment amount must be positive, got {}",
                payment.amount()
            )));
        }
        if payment.currency() != self.ledger.currency() {
            return Err(PaymentError::validation(format!(
                "payment currency {} does not match ledger currency {}",
                payment.currency(),
                self.ledger.currency()
            )));
        }
        let tender_account = self
            .accounts
            .tender_account(tender)
            .ok_or(PaymentError::CreditCannotSettle)?
            .to_string();

        // Per-party critical section: no second allocation may read these
        // obligations until this one has settled and posted.
        let lock = self.party_lock(party);
        let _guard = lock.lock().expect("party lock poisoned");

        let obligations = self.load_candidates(party, candidates)?;
        for obligation in &obligations {
            if obligation.outstanding.currency() != payment.currency() {
                return Err(PaymentError::validation(format!(
                    "obligation {} is denominated in {}, payment in {}",
                    obligation.id,
                    obligation.outstanding.currency(),
                    payment.currency()
                )));
            }
        }
        let plan = allocate(payment, &obligations);

        if plan.total_allocated.is_positive() {
            // The balanced journal entry commits first; settlements follow
            // and are backed out of the ledger if one fails mid-plan.
            let entry = self.post_settlement(
                party,
                party_type,
                &tender_account,
                &plan.lines,
                plan.total_allocated,
            )?;
            self.apply_settlements(party, party_type, &tender_account, entry.id, &plan.lines)?;
        }

        info!(
            %party,
            %party_type,
            payment = %payment,
            allocated = %plan.total_allocated,
            excess = %plan.excess_payment,
            obligations = plan.lines.len(),
            "bulk payment allocated"
        );

        if plan.total_allocated.is_positive() {
            self.run_hooks(party, party_type, plan.total_allocated);
        }

        Ok(plan)
    }

    /// Pays one obligation with an explicit amount
    ///
    /// The effective amount is clamped to `[0, outstanding]`; it is never
    /// allowed to exceed the obligation's outstanding balance.
    pub fn pay_obligation(
        &self,
        obligation_id: ObligationId,
        party_type: PartyType,
        tender: PaymentMethod,
        amount: Money,
    ) -> Result<AllocationPlan, PaymentError> {
        let obligation = self.fetch_obligation(obligation_id)?;
        if amount.currency() != obligation.outstanding.currency() {
            return Err(PaymentError::validation(format!(
                "payment currency {} does not match obligation currency {}",
                amount.currency(),
                obligation.outstanding.currency()
            )));
        }

        let zero = Money::zero(amount.currency());
        let effective = if amount.is_negative() {
            zero
        } else {
            amount.min(&obligation.outstanding)
        };

        if !effective.is_positive() {
            // Nothing to move; report the unchanged state.
            return Ok(AllocationPlan {
                lines: Vec::new(),
                total_allocated: zero,
                excess_payment: zero,
                remaining_balance: obligation.outstanding,
            });
        }

        self.allocate_bulk_payment(
            obligation.party_id,
            party_type,
            effective,
            tender,
            Some(&[obligation_id]),
        )
    }

    /// Pays an obligation's full live outstanding balance
    pub fn pay_obligation_in_full(
        &self,
        obligation_id: ObligationId,
        party_type: PartyType,
        tender: PaymentMethod,
    ) -> Result<AllocationPlan, PaymentError> {
        let obligation = self.fetch_obligation(obligation_id)?;
        self.pay_obligation(obligation_id, party_type, tender, obligation.outstanding)
    }

    /// Creates a payment record for a tender
    ///
    /// Cash-like methods settle immediately and bypass allocation. The
    /// credit method is authorized against the party's available credit and
    /// stays unsettled until real money arrives through this engine.
    pub fn create_payment(
        &self,
        party: PartyId,
        party_type: PartyType,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<Payment, PaymentError> {
        if !amount.is_positive() {
            return Err(PaymentError::validation(format!(
                "payment amount must be positive, got {}",
                amount.amount()
            )));
        }

        if method.settles_immediately() {
            return Ok(Payment::settled(party, amount, method));
        }

        self.credit.authorize(party, party_type, amount)?;
        Ok(Payment::authorized(party, amount))
    }

    /// Settles an authorized credit payment with incoming real money
    pub fn settle_authorized(
        &self,
        payment: &mut Payment,
        party_type: PartyType,
        tender: PaymentMethod,
        candidates: Option<&[ObligationId]>,
    ) -> Result<AllocationPlan, PaymentError> {
        if payment.status != PaymentStatus::Authorized {
            return Err(PaymentError::NotAwaitingSettlement(
                payment.status.to_string(),
            ));
        }

        let plan = self.allocate_bulk_payment(
            payment.party_id,
            party_type,
            payment.amount,
            tender,
            candidates,
        )?;
        payment.mark_settled();
        Ok(plan)
    }

    fn fetch_obligation(&self, id: ObligationId) -> Result<Obligation, PaymentError> {
        self.obligations.get(id).map_err(|err| {
            if err.is_not_found() {
                PaymentError::ObligationNotFound(id)
            } else {
                PaymentError::Port(err)
            }
        })
    }

    fn load_candidates(
        &self,
        party: PartyId,
        candidates: Option<&[ObligationId]>,
    ) -> Result<Vec<Obligation>, PaymentError> {
        match candidates {
            Some(ids) => {
                let mut obligations = Vec::with_capacity(ids.len());
                for id in ids {
                    let obligation = self.fetch_obligation(*id)?;
                    if obligation.party_id != party {
                        return Err(PaymentError::PartyMismatch {
                            obligation: *id,
                            party,
                        });
                    }
                    obligations.push(obligation);
                }
                Ok(obligations)
            }
            None => {
                let mut obligations = self.obligations.outstanding_for_party(party)?;
                // Oldest first; id breaks creation-date ties deterministically
                obligations.sort_by(|a, b| {
                    a.created_at
                        .cmp(&b.created_at)
                        .then_with(|| a.id.cmp(&b.id))
                });
                Ok(obligations)
            }
        }
    }

    /// Applies a plan's settlements through the obligation port
    ///
    /// The journal entry is already posted. If a settlement fails mid-plan
    /// the entry is reversed and a fresh entry covering only the applied
    /// lines is posted, so the ledger always reflects exactly the
    /// settlements that reached the collaborator.
    fn apply_settlements(
        &self,
        party: PartyId,
        party_type: PartyType,
        tender_account: &str,
        entry_id: JournalEntryId,
        lines: &[AllocationLine],
    ) -> Result<(), PaymentError> {
        for (applied, line) in lines.iter().enumerate() {
            if let Err(err) = self.obligations.settle(line.obligation_id, line.amount_paid) {
                error!(
                    %party,
                    obligation = %line.obligation_id,
                    applied,
                    error = %err,
                    "settlement failed mid-plan; backing the entry out of the ledger"
                );
                self.back_out(party, party_type, tender_account, entry_id, &lines[..applied]);
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Rewrites the ledger to match the settlements that actually landed
    ///
    /// Reverses the full settlement entry and, when some lines did settle,
    /// posts a new entry covering just those. Failures here are invariant
    /// violations and can only be logged.
    fn back_out(
        &self,
        party: PartyId,
        party_type: PartyType,
        tender_account: &str,
        entry_id: JournalEntryId,
        applied: &[AllocationLine],
    ) {
        if let Err(err) = self
            .ledger
            .reverse(entry_id, "Obligation settlement failed mid-plan")
        {
            error!(entry = %entry_id, error = %err, "could not reverse settlement entry");
            return;
        }
        if applied.is_empty() {
            return;
        }
        let total = applied.iter().fold(
            Money::zero(applied[0].amount_paid.currency()),
            |acc, line| acc + line.amount_paid,
        );
        if let Err(err) = self.post_settlement(party, party_type, tender_account, applied, total) {
            error!(%party, error = %err, "could not re-post entry for applied settlements");
        }
    }

    /// Posts one balanced settlement entry for a set of allocation lines
    ///
    /// Customer settlement is money in: debit the tender, credit the
    /// receivables control per obligation. Supplier settlement is money
    /// out: debit the payables control per obligation, credit the tender.
    fn post_settlement(
        &self,
        party: PartyId,
        party_type: PartyType,
        tender_account: &str,
        lines: &[AllocationLine],
        total: Money,
    ) -> Result<JournalEntry, PaymentError> {
        let control = self.accounts.control_account(party_type).to_string();
        let mut draft = EntryDraft::new(EntrySource::Payment, "Payment settlement");

        match party_type {
            PartyType::Customer => {
                draft = draft.debit(tender_account, total);
                for line in lines {
                    draft = draft.line(
                        LineDraft::credit(&control, line.amount_paid)
                            .tagged(meta::PARTY, party.to_string())
                            .tagged(meta::OBLIGATION, line.obligation_id.to_string()),
                    );
                }
            }
            PartyType::Supplier => {
                for line in lines {
                    draft = draft.line(
                        LineDraft::debit(&control, line.amount_paid)
                            .tagged(meta::PARTY, party.to_string())
                            .tagged(meta::OBLIGATION, line.obligation_id.to_string()),
                    );
                }
                draft = draft.credit(tender_account, total);
            }
        }

        Ok(self.ledger.post(draft)?)
    }

    fn run_hooks(&self, party: PartyId, party_type: PartyType, amount: Money) {
        for hook in &self.hooks {
            if let Err(err) = hook.on_allocation_settled(party, party_type, amount) {
                warn!(%party, error = %err, "post-commit hook failed; continuing");
            }
        }
    }

    fn party_lock(&self, party: PartyId) -> Arc<Mutex<()>> {
        let mut locks = self.party_locks.lock().expect("lock registry poisoned");
        locks
            .entry(party)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
