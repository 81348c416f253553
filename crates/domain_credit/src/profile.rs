//! Credit parties and their per-side profiles
//!
//! A party may trade with the store as a customer, a supplier, or both.
//! Each side carries its own typed [`CreditProfile`]; the side is selected
//! with [`PartyType`] rather than string-prefixed field lookups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Money, PartyId};

use crate::error::CreditError;

/// Which side of the counter a credit relationship sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyType {
    Customer,
    Supplier,
}

impl fmt::Display for PartyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartyType::Customer => write!(f, "customer"),
            PartyType::Supplier => write!(f, "supplier"),
        }
    }
}

/// Credit terms and repayment tracking for one party side
///
/// Outstanding amount is deliberately absent: it is always derived live
/// from the ledger, never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditProfile {
    /// Whether the party is approved for credit on this side
    pub is_approved: bool,
    /// Maximum outstanding the store will extend (>= 0)
    pub credit_limit: Money,
    /// Repayment window in days (>= 1)
    pub credit_duration_days: u32,
    /// When the party last repaid
    pub last_repayment_date: Option<DateTime<Utc>>,
    /// How much the party last repaid
    pub last_repayment_amount: Option<Money>,
}

impl CreditProfile {
    pub const DEFAULT_DURATION_DAYS: u32 = 30;

    /// Creates an unapproved profile with a zero limit
    pub fn new(zero: Money) -> Self {
        Self {
            is_approved: false,
            credit_limit: zero,
            credit_duration_days: Self::DEFAULT_DURATION_DAYS,
            last_repayment_date: None,
            last_repayment_amount: None,
        }
    }

    /// Validates a limit before it is written
    pub fn validate_limit(limit: &Money) -> Result<(), CreditError> {
        if limit.is_negative() {
            return Err(CreditError::validation(format!(
                "credit limit must not be negative, got {}",
                limit.amount()
            )));
        }
        Ok(())
    }

    /// Validates a duration before it is written
    pub fn validate_duration(duration_days: u32) -> Result<(), CreditError> {
        if duration_days < 1 {
            return Err(CreditError::validation(
                "credit duration must be at least 1 day",
            ));
        }
        Ok(())
    }
}

/// A customer/supplier considered as a credit-bearing counterparty
///
/// Every party has a customer profile; the supplier profile exists only for
/// parties explicitly marked as suppliers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditParty {
    pub id: PartyId,
    pub name: String,
    customer: CreditProfile,
    supplier: Option<CreditProfile>,
}

impl CreditParty {
    /// Creates a customer party with default (unapproved) credit terms
    pub fn new(name: impl Into<String>, zero: Money) -> Self {
        Self {
            id: PartyId::new(),
            name: name.into(),
            customer: CreditProfile::new(zero),
            supplier: None,
        }
    }

    /// Marks the party as a supplier with default terms
    pub fn as_supplier(mut self, zero: Money) -> Self {
        self.supplier = Some(CreditProfile::new(zero));
        self
    }

    /// Returns true if the party is marked as a supplier
    pub fn is_supplier(&self) -> bool {
        self.supplier.is_some()
    }

    /// The profile for one side, failing the supplier side when the party
    /// is not marked as one
    pub fn profile(&self, party_type: PartyType) -> Result<&CreditProfile, CreditError> {
        match party_type {
            PartyType::Customer => Ok(&self.customer),
            PartyType::Supplier => self
                .supplier
                .as_ref()
                .ok_or(CreditError::NotASupplier(self.id)),
        }
    }

    /// Mutable access to one side's profile
    pub fn profile_mut(
        &mut self,
        party_type: PartyType,
    ) -> Result<&mut CreditProfile, CreditError> {
        match party_type {
            PartyType::Customer => Ok(&mut self.customer),
            PartyType::Supplier => self
                .supplier
                .as_mut()
                .ok_or(CreditError::NotASupplier(self.id)),
        }
    }
}
