//! Cashier sessions
//!
//! A session brackets one cashier's shift on one sales channel. For each
//! cashier-controlled account, the opening declared balance plus the
//! ledger's movement on that account during the shift gives the expected
//! closing balance; the difference against what the cashier actually counts
//! is the variance.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ChannelId, Money, SessionId, UserId};

/// Per-account declared amounts, keyed by ledger account code
pub type DeclaredBalances = BTreeMap<String, Money>;

/// A sales channel a session can be opened against
///
/// Each channel owns a set of cashier-controlled ledger accounts (drawer,
/// mobile-money float, ...); sessions declare and reconcile balances for
/// exactly those accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub id: ChannelId,
    pub name: String,
    /// Leaf ledger accounts this channel's cashiers control
    pub accounts: Vec<String>,
    /// When set, a session cannot open without a counted balance for every
    /// cashier-controlled account
    pub require_opening_count: bool,
    /// Variances at or above this trigger an alert; `None` alerts on any
    /// nonzero variance
    pub variance_threshold: Option<Money>,
}

impl ChannelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ChannelId::new_v7(),
            name: name.into(),
            accounts: Vec::new(),
            require_opening_count: false,
            variance_threshold: None,
        }
    }

    /// Adds a cashier-controlled account
    pub fn with_account(mut self, code: impl Into<String>) -> Self {
        self.accounts.push(code.into());
        self
    }

    pub fn with_opening_count_required(mut self) -> Self {
        self.require_opening_count = true;
        self
    }

    pub fn with_variance_threshold(mut self, threshold: Money) -> Self {
        self.variance_threshold = Some(threshold);
        self
    }

    pub fn controls(&self, code: &str) -> bool {
        self.accounts.iter().any(|a| a == code)
    }

    /// Whether a closing variance is worth alerting on
    pub fn variance_alerts(&self, variance: &Money) -> bool {
        let magnitude = variance.abs();
        match &self.variance_threshold {
            Some(threshold) => magnitude >= *threshold,
            None => !magnitude.is_zero(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Open,
    Closed,
}

/// One cashier shift on one channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashierSession {
    pub id: SessionId,
    pub channel: ChannelId,
    pub cashier: UserId,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Balances the cashier counted at open, per account
    pub opening_declared: DeclaredBalances,
    /// Balances the cashier counted at close, per account
    pub closing_declared: Option<DeclaredBalances>,
    /// Opening declared plus ledger movement during the shift, per account;
    /// derived at close, never stored while open
    pub expected_closing: Option<DeclaredBalances>,
    /// Per-account `closing_declared - expected_closing`; negative means a
    /// shortage
    pub variance: Option<DeclaredBalances>,
    pub status: SessionStatus,
}

impl CashierSession {
    pub fn open(channel: ChannelId, cashier: UserId, opening_declared: DeclaredBalances) -> Self {
        Self {
            id: SessionId::new_v7(),
            channel,
            cashier,
            opened_at: Utc::now(),
            closed_at: None,
            opening_declared,
            closing_declared: None,
            expected_closing: None,
            variance: None,
            status: SessionStatus::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    /// Total variance across all accounts, zero while the session is open
    pub fn total_variance(&self, zero: Money) -> Money {
        match &self.variance {
            Some(map) => map.values().fold(zero, |acc, v| acc + *v),
            None => zero,
        }
    }
}
