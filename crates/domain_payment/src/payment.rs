//! Payment records and tender methods

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Money, PartyId, PaymentId};

/// How money arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    MobileMoney,
    BankTransfer,
    /// Store credit — authorized against available credit, settled later
    Credit,
}

impl PaymentMethod {
    /// True for methods that move real money at creation time
    pub fn settles_immediately(&self) -> bool {
        !matches!(self, PaymentMethod::Credit)
    }
}

/// Lifecycle of a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Credit authorized, no money moved yet
    Authorized,
    /// Money moved; terminal
    Settled,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Authorized => write!(f, "authorized"),
            PaymentStatus::Settled => write!(f, "settled"),
        }
    }
}

/// A payment record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub party_id: PartyId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Creates a settled payment (cash-like tenders)
    pub fn settled(party_id: PartyId, amount: Money, method: PaymentMethod) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::new_v7(),
            party_id,
            amount,
            method,
            status: PaymentStatus::Settled,
            created_at: now,
            settled_at: Some(now),
        }
    }

    /// Creates an authorized, unsettled credit payment
    pub fn authorized(party_id: PartyId, amount: Money) -> Self {
        Self {
            id: PaymentId::new_v7(),
            party_id,
            amount,
            method: PaymentMethod::Credit,
            status: PaymentStatus::Authorized,
            created_at: Utc::now(),
            settled_at: None,
        }
    }

    /// Flips the payment to settled
    pub fn mark_settled(&mut self) {
        self.status = PaymentStatus::Settled;
        self.settled_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cash_settles_immediately() {
        assert!(PaymentMethod::Cash.settles_immediately());
        assert!(PaymentMethod::MobileMoney.settles_immediately());
        assert!(!PaymentMethod::Credit.settles_immediately());
    }

    #[test]
    fn test_settled_constructor() {
        let p = Payment::settled(
            PartyId::new(),
            Money::new(dec!(100), Currency::KES),
            PaymentMethod::Cash,
        );
        assert_eq!(p.status, PaymentStatus::Settled);
        assert!(p.settled_at.is_some());
    }

    #[test]
    fn test_authorized_constructor() {
        let p = Payment::authorized(PartyId::new(), Money::new(dec!(100), Currency::KES));
        assert_eq!(p.status, PaymentStatus::Authorized);
        assert!(p.settled_at.is_none());
    }
}
