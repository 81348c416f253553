//! Credit service
//!
//! Derives live credit summaries from the ledger and manages the approval /
//! limit / duration state machine. The outstanding amount is recomputed from
//! journal lines on every read; the service never stores it.
//!
//! Notification and audit side effects run after the state change,
//! best-effort: a failed dispatch is logged and swallowed.

use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use core_kernel::{
    AuditLog, AuditRecord, Money, Notification, NotificationDispatcher, PartyId,
};
use domain_ledger::{Ledger, RetailChartOfAccounts};

use crate::error::CreditError;
use crate::profile::{CreditParty, CreditProfile, PartyType};
use crate::summary::CreditSummary;

/// Control accounts the credit service reads outstanding balances from
#[derive(Debug, Clone)]
pub struct CreditAccounts {
    /// Customer receivables control account code
    pub receivables: String,
    /// Supplier payables control account code
    pub payables: String,
}

impl Default for CreditAccounts {
    fn default() -> Self {
        Self {
            receivables: RetailChartOfAccounts::RECEIVABLES.to_string(),
            payables: RetailChartOfAccounts::PAYABLES.to_string(),
        }
    }
}

impl CreditAccounts {
    /// The control account for one party side
    pub fn control_account(&self, party_type: PartyType) -> &str {
        match party_type {
            PartyType::Customer => &self.receivables,
            PartyType::Supplier => &self.payables,
        }
    }
}

/// Ledger-backed credit service for customers and suppliers
///
/// One implementation serves both party sides, parameterized by
/// [`PartyType`] -> profile accessor and control account.
pub struct CreditService {
    ledger: Arc<Ledger>,
    parties: RwLock<HashMap<PartyId, CreditParty>>,
    accounts: CreditAccounts,
    dispatcher: Arc<dyn NotificationDispatcher>,
    audit: Arc<dyn AuditLog>,
}

impl CreditService {
    pub fn new(
        ledger: Arc<Ledger>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self::with_accounts(ledger, CreditAccounts::default(), dispatcher, audit)
    }

    pub fn with_accounts(
        ledger: Arc<Ledger>,
        accounts: CreditAccounts,
        dispatcher: Arc<dyn NotificationDispatcher>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            ledger,
            parties: RwLock::new(HashMap::new()),
            accounts,
            dispatcher,
            audit,
        }
    }

    /// Registers a party with the service
    pub fn register_party(&self, party: CreditParty) -> PartyId {
        let id = party.id;
        self.parties
            .write()
            .expect("party store lock poisoned")
            .insert(id, party);
        id
    }

    /// Returns a snapshot of a party record
    pub fn party(&self, party_id: PartyId) -> Result<CreditParty, CreditError> {
        self.parties
            .read()
            .expect("party store lock poisoned")
            .get(&party_id)
            .cloned()
            .ok_or(CreditError::PartyNotFound(party_id))
    }

    /// Live credit summary for one party side
    ///
    /// Outstanding comes straight from the ledger's party-tagged lines on
    /// the side's control account; frozen and available are derived, never
    /// stored.
    pub fn credit_summary(
        &self,
        party_id: PartyId,
        party_type: PartyType,
    ) -> Result<CreditSummary, CreditError> {
        let party = self.party(party_id)?;
        let profile = party.profile(party_type)?;

        let outstanding = self.ledger.party_balance(
            self.accounts.control_account(party_type),
            party_id,
            None,
        )?;

        Ok(CreditSummary::derive(
            party_id,
            party_type,
            profile,
            outstanding,
        ))
    }

    /// Approves (or revokes) credit, optionally setting limit and duration
    ///
    /// Validates before any write; each call is independently audited and a
    /// best-effort approval notification goes out afterwards.
    pub fn approve_credit(
        &self,
        party_id: PartyId,
        party_type: PartyType,
        approved: bool,
        limit: Option<Money>,
        duration_days: Option<u32>,
    ) -> Result<CreditSummary, CreditError> {
        if let Some(limit) = &limit {
            CreditProfile::validate_limit(limit)?;
        }
        if let Some(duration) = duration_days {
            CreditProfile::validate_duration(duration)?;
        }

        let before = self.mutate_profile(party_id, party_type, |profile| {
            profile.is_approved = approved;
            if let Some(limit) = limit {
                profile.credit_limit = limit;
            }
            if let Some(duration) = duration_days {
                profile.credit_duration_days = duration;
            }
        })?;

        info!(party = %party_id, %party_type, approved, "credit approval updated");
        self.audit_profile_change("credit.approve", party_id, party_type, before)?;
        self.notify(Notification::CreditApprovalChanged {
            party: party_id.to_string(),
            approved,
        });

        self.credit_summary(party_id, party_type)
    }

    /// Updates the credit limit (and optionally the duration)
    pub fn update_credit_limit(
        &self,
        party_id: PartyId,
        party_type: PartyType,
        limit: Money,
        duration_days: Option<u32>,
    ) -> Result<CreditSummary, CreditError> {
        CreditProfile::validate_limit(&limit)?;
        if let Some(duration) = duration_days {
            CreditProfile::validate_duration(duration)?;
        }

        let before = self.mutate_profile(party_id, party_type, |profile| {
            profile.credit_limit = limit;
            if let Some(duration) = duration_days {
                profile.credit_duration_days = duration;
            }
        })?;

        self.audit_profile_change("credit.update_limit", party_id, party_type, before)?;
        self.credit_summary(party_id, party_type)
    }

    /// Updates the repayment duration
    pub fn update_credit_duration(
        &self,
        party_id: PartyId,
        party_type: PartyType,
        duration_days: u32,
    ) -> Result<CreditSummary, CreditError> {
        CreditProfile::validate_duration(duration_days)?;

        let before = self.mutate_profile(party_id, party_type, |profile| {
            profile.credit_duration_days = duration_days;
        })?;

        self.audit_profile_change("credit.update_duration", party_id, party_type, before)?;
        self.credit_summary(party_id, party_type)
    }

    /// Records a repayment's tracking fields
    ///
    /// A no-op for non-positive amounts. This updates last-repayment
    /// tracking only; the corresponding ledger posting happens in the
    /// allocation engine.
    pub fn record_repayment(
        &self,
        party_id: PartyId,
        party_type: PartyType,
        amount: Money,
    ) -> Result<(), CreditError> {
        if !amount.is_positive() {
            return Ok(());
        }

        let before = self.mutate_profile(party_id, party_type, |profile| {
            profile.last_repayment_date = Some(Utc::now());
            profile.last_repayment_amount = Some(amount);
        })?;

        info!(party = %party_id, %party_type, amount = %amount, "repayment recorded");
        self.audit_profile_change("credit.record_repayment", party_id, party_type, before)?;
        self.notify(Notification::BalanceChanged {
            party: party_id.to_string(),
            detail: format!("repayment of {}", amount),
        });
        Ok(())
    }

    /// Gate for the credit tender
    ///
    /// Requires an approved, unfrozen profile with enough available credit.
    /// Errors carry the available-vs-required numbers for UI messaging.
    ///
    /// Note: an *approved* party over its limit is not frozen; new credit is
    /// refused here instead, and repayment stays possible.
    pub fn authorize(
        &self,
        party_id: PartyId,
        party_type: PartyType,
        required: Money,
    ) -> Result<(), CreditError> {
        let summary = self.credit_summary(party_id, party_type)?;

        if !summary.is_approved {
            return Err(CreditError::NotApprovedForCredit(party_id));
        }
        if summary.frozen {
            return Err(CreditError::CreditFrozen(party_id));
        }
        if required > summary.available {
            return Err(CreditError::CreditLimitExceeded {
                available: summary.available.amount(),
                required: required.amount(),
            });
        }
        Ok(())
    }

    fn mutate_profile(
        &self,
        party_id: PartyId,
        party_type: PartyType,
        mutate: impl FnOnce(&mut CreditProfile),
    ) -> Result<CreditProfile, CreditError> {
        let mut parties = self.parties.write().expect("party store lock poisoned");
        let party = parties
            .get_mut(&party_id)
            .ok_or(CreditError::PartyNotFound(party_id))?;
        let profile = party.profile_mut(party_type)?;
        let before = profile.clone();
        mutate(profile);
        Ok(before)
    }

    fn audit_profile_change(
        &self,
        action: &str,
        party_id: PartyId,
        party_type: PartyType,
        before: CreditProfile,
    ) -> Result<(), CreditError> {
        let after = self.party(party_id)?.profile(party_type)?.clone();
        let record = AuditRecord::new(
            action,
            party_id,
            serde_json::to_value(&before).unwrap_or(Value::Null),
            serde_json::to_value(&after).unwrap_or(Value::Null),
        );
        if let Err(err) = self.audit.record(record) {
            warn!(%action, party = %party_id, error = %err, "audit write failed; continuing");
        }
        Ok(())
    }

    fn notify(&self, notification: Notification) {
        if let Err(err) = self.dispatcher.dispatch(notification) {
            warn!(error = %err, "notification dispatch failed; continuing");
        }
    }
}
