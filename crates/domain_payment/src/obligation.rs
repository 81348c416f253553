//! Obligations and the obligation-source port
//!
//! An obligation is an order or purchase with money still owed on it. The
//! records themselves are owned by the order/purchase collaborator; this
//! core consumes them through the [`ObligationSource`] port and hands
//! settlements back through it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use core_kernel::{Money, ObligationId, PartyId, PortError};

/// Whether the obligation came from a sale or a purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationKind {
    Order,
    Purchase,
}

/// Settlement state of an obligation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationState {
    Outstanding,
    PartiallyPaid,
    Settled,
}

/// An order or purchase with an outstanding balance owed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obligation {
    pub id: ObligationId,
    pub party_id: PartyId,
    pub kind: ObligationKind,
    pub total: Money,
    pub outstanding: Money,
    pub created_at: DateTime<Utc>,
    pub state: ObligationState,
}

impl Obligation {
    pub fn new(
        party_id: PartyId,
        kind: ObligationKind,
        total: Money,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ObligationId::new_v7(),
            party_id,
            kind,
            total,
            outstanding: total,
            created_at,
            state: ObligationState::Outstanding,
        }
    }

    /// Applies a payment, clamped to `[0, outstanding]`
    ///
    /// Returns the amount actually applied and updates the state.
    pub fn apply_payment(&mut self, amount: Money) -> Money {
        let zero = Money::zero(self.outstanding.currency());
        let applied = if amount.is_negative() {
            zero
        } else {
            amount.min(&self.outstanding)
        };

        self.outstanding = self.outstanding - applied;
        self.state = if self.outstanding.is_zero() {
            ObligationState::Settled
        } else if self.outstanding < self.total {
            ObligationState::PartiallyPaid
        } else {
            ObligationState::Outstanding
        };
        applied
    }

    pub fn is_settled(&self) -> bool {
        self.state == ObligationState::Settled
    }
}

/// Port to the order/purchase collaborator that owns obligation records
pub trait ObligationSource: Send + Sync {
    /// All obligations with outstanding > 0 for a party, in no particular
    /// order; the engine applies its own FIFO sort
    fn outstanding_for_party(&self, party: PartyId) -> Result<Vec<Obligation>, PortError>;

    /// One obligation by id
    fn get(&self, id: ObligationId) -> Result<Obligation, PortError>;

    /// Applies a settlement and returns the updated record
    fn settle(&self, id: ObligationId, amount_paid: Money) -> Result<Obligation, PortError>;
}

/// In-memory obligation store
///
/// Stands in for the order/purchase collaborator in tests and single-node
/// deployments.
#[derive(Default)]
pub struct InMemoryObligationStore {
    obligations: RwLock<HashMap<ObligationId, Obligation>>,
}

impl InMemoryObligationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an obligation and returns its id
    pub fn insert(&self, obligation: Obligation) -> ObligationId {
        let id = obligation.id;
        self.obligations
            .write()
            .expect("obligation store lock poisoned")
            .insert(id, obligation);
        id
    }
}

impl ObligationSource for InMemoryObligationStore {
    fn outstanding_for_party(&self, party: PartyId) -> Result<Vec<Obligation>, PortError> {
        let obligations = self
            .obligations
            .read()
            .expect("obligation store lock poisoned");
        Ok(obligations
            .values()
            .filter(|o| o.party_id == party && o.outstanding.is_positive())
            .cloned()
            .collect())
    }

    fn get(&self, id: ObligationId) -> Result<Obligation, PortError> {
        self.obligations
            .read()
            .expect("obligation store lock poisoned")
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("obligation", id))
    }

    fn settle(&self, id: ObligationId, amount_paid: Money) -> Result<Obligation, PortError> {
        let mut obligations = self
            .obligations
            .write()
            .expect("obligation store lock poisoned");
        let obligation = obligations
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("obligation", id))?;
        obligation.apply_payment(amount_paid);
        Ok(obligation.clone())
    }
}
