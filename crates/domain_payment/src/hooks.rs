//! Post-commit hooks
//!
//! Side effects of a settled allocation are declared here rather than
//! discovered through event subscriptions: the engine calls each registered
//! hook once, after the ledger write commits. Hook failures are logged and
//! never unwind the financial result.

use core_kernel::{Money, PartyId, PortError};
use domain_credit::{CreditService, PartyType};

/// Invoked after an allocation's ledger entry has been posted
pub trait PostCommitHook: Send + Sync {
    fn on_allocation_settled(
        &self,
        party: PartyId,
        party_type: PartyType,
        amount: Money,
    ) -> Result<(), PortError>;
}

/// Settled allocations record a repayment on the party's credit profile
impl PostCommitHook for CreditService {
    fn on_allocation_settled(
        &self,
        party: PartyId,
        party_type: PartyType,
        amount: Money,
    ) -> Result<(), PortError> {
        self.record_repayment(party, party_type, amount)
            .map_err(|err| PortError::internal(err.to_string()))
    }
}
