//! Session and reconciliation service

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};

use core_kernel::{
    AuditLog, AuditRecord, ChannelId, Money, Notification, NotificationDispatcher,
    ReconciliationId, SessionId, UserId,
};
use domain_ledger::{Ledger, LedgerError};

use crate::error::CashierError;
use crate::reconciliation::{Reconciliation, ReconciliationLine, ReconciliationScope};
use crate::session::{CashierSession, ChannelConfig, DeclaredBalances, SessionStatus};

#[derive(Default)]
struct CashierState {
    channels: HashMap<ChannelId, ChannelConfig>,
    sessions: HashMap<SessionId, CashierSession>,
    /// One open session per channel; this map is the claim
    open_sessions: HashMap<ChannelId, SessionId>,
    reconciliations: HashMap<ReconciliationId, Reconciliation>,
}

/// Manages cashier sessions against the ledger
///
/// The single write lock makes open-session claiming atomic: a channel's
/// slot in `open_sessions` is checked and taken under the same guard, so
/// two cashiers can never both open a shift on one till.
pub struct SessionService {
    ledger: Arc<Ledger>,
    state: RwLock<CashierState>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    audit: Arc<dyn AuditLog>,
}

impl SessionService {
    pub fn new(
        ledger: Arc<Ledger>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            ledger,
            state: RwLock::new(CashierState::default()),
            dispatcher,
            audit,
        }
    }

    /// Registers a sales channel and returns its id
    pub fn register_channel(&self, channel: ChannelConfig) -> Result<ChannelId, CashierError> {
        if channel.accounts.is_empty() {
            return Err(CashierError::validation(
                "a channel needs at least one cashier-controlled account",
            ));
        }
        // Every cashier account must exist before sessions can reconcile
        // against it.
        for code in &channel.accounts {
            if self.ledger.account(code).is_none() {
                return Err(LedgerError::AccountNotFound(code.clone()).into());
            }
        }
        let id = channel.id;
        self.state
            .write()
            .expect("cashier state lock poisoned")
            .channels
            .insert(id, channel);
        Ok(id)
    }

    pub fn channel(&self, id: ChannelId) -> Result<ChannelConfig, CashierError> {
        self.state
            .read()
            .expect("cashier state lock poisoned")
            .channels
            .get(&id)
            .cloned()
            .ok_or(CashierError::ChannelNotFound(id))
    }

    pub fn session(&self, id: SessionId) -> Result<CashierSession, CashierError> {
        self.state
            .read()
            .expect("cashier state lock poisoned")
            .sessions
            .get(&id)
            .cloned()
            .ok_or(CashierError::SessionNotFound(id))
    }

    /// The open session on a channel, if any
    pub fn open_session_for_channel(
        &self,
        channel: ChannelId,
    ) -> Result<Option<CashierSession>, CashierError> {
        let state = self.state.read().expect("cashier state lock poisoned");
        if !state.channels.contains_key(&channel) {
            return Err(CashierError::ChannelNotFound(channel));
        }
        Ok(state
            .open_sessions
            .get(&channel)
            .and_then(|id| state.sessions.get(id))
            .cloned())
    }

    /// Opens a shift on a channel with the cashier's counted balances
    ///
    /// Fails when the channel already has an open session. When the channel
    /// requires an opening count, every cashier-controlled account needs a
    /// declared amount; otherwise missing accounts default to zero. Declared
    /// codes outside the channel's accounts are rejected.
    pub fn open_session(
        &self,
        channel_id: ChannelId,
        cashier: UserId,
        opening: &[(String, Money)],
    ) -> Result<CashierSession, CashierError> {
        let mut state = self.state.write().expect("cashier state lock poisoned");
        let channel = state
            .channels
            .get(&channel_id)
            .ok_or(CashierError::ChannelNotFound(channel_id))?;

        if let Some(existing) = state.open_sessions.get(&channel_id) {
            return Err(CashierError::SessionAlreadyOpen {
                channel: channel_id,
                session: *existing,
            });
        }

        let opening_declared =
            self.collect_declarations(channel, opening, channel.require_opening_count)?;

        let session = CashierSession::open(channel_id, cashier, opening_declared.clone());
        state.open_sessions.insert(channel_id, session.id);
        state.sessions.insert(session.id, session.clone());
        drop(state);

        info!(
            session = %session.id,
            channel = %channel_id,
            %cashier,
            accounts = opening_declared.len(),
            "session opened"
        );
        self.audit_best_effort(
            AuditRecord::new(
                "cashier.open_session",
                session.id,
                json!(null),
                json!({
                    "channel": channel_id.to_string(),
                    "opening_declared": opening_declared,
                }),
            )
            .by(cashier),
        );

        Ok(session)
    }

    /// Expected balance of one cashier account for an open session
    ///
    /// Opening declared balance plus the ledger's normal-side movement on
    /// the account since the shift opened. Always derived from the journal
    /// at call time, never the account's raw running balance.
    pub fn expected_closing_balance(
        &self,
        session_id: SessionId,
        code: &str,
        until: DateTime<Utc>,
    ) -> Result<Money, CashierError> {
        let session = self.session(session_id)?;
        if !session.is_open() {
            return Err(CashierError::SessionClosed(session_id));
        }
        let channel = self.channel(session.channel)?;
        if !channel.controls(code) {
            return Err(CashierError::validation(format!(
                "account {code} is not controlled by channel {}",
                channel.name
            )));
        }
        self.expected_for(&session, code, until)
    }

    /// Closes a shift with the cashier's counted balances
    ///
    /// Derives the expected closing balance per account, records the
    /// variances on the session, files a session-scoped reconciliation, and
    /// alerts on every account whose variance clears the channel's
    /// threshold. Alert and audit delivery are best-effort; the close itself
    /// never rolls back for them.
    pub fn close_session(
        &self,
        session_id: SessionId,
        closing: &[(String, Money)],
    ) -> Result<CashierSession, CashierError> {
        let closed_at = Utc::now();
        let mut state = self.state.write().expect("cashier state lock poisoned");
        let session = state
            .sessions
            .get(&session_id)
            .ok_or(CashierError::SessionNotFound(session_id))?
            .clone();
        if !session.is_open() {
            return Err(CashierError::SessionClosed(session_id));
        }
        let channel = state
            .channels
            .get(&session.channel)
            .ok_or(CashierError::ChannelNotFound(session.channel))?
            .clone();

        // Closing always covers every cashier account; uncounted ones are
        // declared zero.
        let closing_declared = self.collect_declarations(&channel, closing, false)?;

        let mut expected_closing = DeclaredBalances::new();
        let mut variances = DeclaredBalances::new();
        let mut lines = Vec::with_capacity(channel.accounts.len());
        for code in &channel.accounts {
            let declared = closing_declared[code];
            let expected = self.expected_for(&session, code, closed_at)?;
            let variance = declared - expected;
            expected_closing.insert(code.clone(), expected);
            variances.insert(code.clone(), variance);
            lines.push(ReconciliationLine {
                account_code: code.clone(),
                declared,
                expected,
                variance,
            });
        }

        let stored = state
            .sessions
            .get_mut(&session_id)
            .ok_or(CashierError::SessionNotFound(session_id))?;
        stored.status = SessionStatus::Closed;
        stored.closed_at = Some(closed_at);
        stored.closing_declared = Some(closing_declared.clone());
        stored.expected_closing = Some(expected_closing);
        stored.variance = Some(variances.clone());
        let closed = stored.clone();
        state.open_sessions.remove(&closed.channel);

        let reconciliation = Reconciliation::from_lines(
            ReconciliationScope::Session(session_id),
            Some(closed.cashier),
            closed_at,
            lines,
            self.ledger.currency(),
        );
        let total_variance = reconciliation.total_variance;
        state
            .reconciliations
            .insert(reconciliation.id, reconciliation);
        drop(state);

        info!(
            session = %session_id,
            variance = %total_variance,
            "session closed"
        );

        self.audit_best_effort(
            AuditRecord::new(
                "cashier.close_session",
                session_id,
                json!({ "status": "Open" }),
                json!({
                    "status": "Closed",
                    "closing_declared": closing_declared,
                    "variance": variances,
                }),
            )
            .by(closed.cashier),
        );

        for (code, variance) in &variances {
            if channel.variance_alerts(variance) {
                let declared = closing_declared[code];
                let notification = Notification::VarianceAlert {
                    channel: channel.name.clone(),
                    account_code: code.clone(),
                    detail: format!(
                        "declared {} against expected {} (variance {})",
                        declared,
                        declared - *variance,
                        variance
                    ),
                };
                if let Err(err) = self.dispatcher.dispatch(notification) {
                    warn!(session = %session_id, error = %err, "variance alert failed; continuing");
                }
            }
        }

        Ok(closed)
    }

    /// Files a manual reconciliation against the ledger
    ///
    /// Each `(account_code, declared)` pair is compared to the account's
    /// ledger balance as of `as_of`.
    pub fn create_reconciliation(
        &self,
        performed_by: Option<UserId>,
        declared: &[(String, Money)],
        as_of: DateTime<Utc>,
    ) -> Result<Reconciliation, CashierError> {
        if declared.is_empty() {
            return Err(CashierError::validation(
                "a reconciliation needs at least one account",
            ));
        }

        let mut lines = Vec::with_capacity(declared.len());
        for (code, counted) in declared {
            let expected = self.ledger.balance(code, Some(as_of))?;
            lines.push(ReconciliationLine {
                account_code: code.clone(),
                declared: *counted,
                expected,
                variance: *counted - expected,
            });
        }

        let reconciliation = Reconciliation::from_lines(
            ReconciliationScope::Manual,
            performed_by,
            as_of,
            lines,
            self.ledger.currency(),
        );
        self.state
            .write()
            .expect("cashier state lock poisoned")
            .reconciliations
            .insert(reconciliation.id, reconciliation.clone());

        info!(
            reconciliation = %reconciliation.id,
            accounts = reconciliation.lines.len(),
            variance = %reconciliation.total_variance,
            "manual reconciliation filed"
        );
        Ok(reconciliation)
    }

    pub fn reconciliation(&self, id: ReconciliationId) -> Result<Reconciliation, CashierError> {
        self.state
            .read()
            .expect("cashier state lock poisoned")
            .reconciliations
            .get(&id)
            .cloned()
            .ok_or(CashierError::ReconciliationNotFound(id))
    }

    /// Reconciliations filed for one session
    pub fn reconciliations_for_session(&self, session_id: SessionId) -> Vec<Reconciliation> {
        self.state
            .read()
            .expect("cashier state lock poisoned")
            .reconciliations
            .values()
            .filter(|r| r.scope == ReconciliationScope::Session(session_id))
            .cloned()
            .collect()
    }

    /// Validates declared amounts against a channel and fills the gaps
    ///
    /// Rejects codes the channel does not control and negative amounts.
    /// With `count_required` every channel account must be declared;
    /// otherwise missing accounts default to zero.
    fn collect_declarations(
        &self,
        channel: &ChannelConfig,
        declared: &[(String, Money)],
        count_required: bool,
    ) -> Result<DeclaredBalances, CashierError> {
        let mut balances = DeclaredBalances::new();
        for (code, amount) in declared {
            if !channel.controls(code) {
                return Err(CashierError::validation(format!(
                    "account {code} is not controlled by channel {}",
                    channel.name
                )));
            }
            if amount.is_negative() {
                return Err(CashierError::validation(format!(
                    "declared balance for {code} cannot be negative, got {}",
                    amount.amount()
                )));
            }
            balances.insert(code.clone(), *amount);
        }
        for code in &channel.accounts {
            if balances.contains_key(code) {
                continue;
            }
            if count_required {
                return Err(CashierError::OpeningCountRequired(channel.id));
            }
            balances.insert(code.clone(), Money::zero(self.ledger.currency()));
        }
        Ok(balances)
    }

    fn expected_for(
        &self,
        session: &CashierSession,
        code: &str,
        until: DateTime<Utc>,
    ) -> Result<Money, CashierError> {
        let activity = self.ledger.net_activity(code, session.opened_at, until)?;
        let opening = session
            .opening_declared
            .get(code)
            .copied()
            .unwrap_or_else(|| Money::zero(activity.currency()));
        Ok(opening + activity)
    }

    fn audit_best_effort(&self, record: AuditRecord) {
        if let Err(err) = self.audit.record(record) {
            warn!(error = %err, "audit write failed; continuing");
        }
    }
}
