//! Append-only double-entry journal
//!
//! The ledger is the sole source of truth for balances. Nothing here caches
//! a balance: every read recomputes the signed sum of journal lines inside a
//! single lock acquisition, so a concurrent posting is either fully included
//! or fully excluded, never half-seen.
//!
//! # Invariants
//!
//! - Every posted entry balances: sum of debits equals sum of credits.
//! - Entries are append-only; corrections are new reversing entries.
//! - Lines post only against leaf, active accounts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::RwLock;
use tracing::{debug, error};

use core_kernel::{Currency, JournalEntryId, JournalLineId, Money, PartyId};

use crate::account::Account;
use crate::entry::{meta, EntryDraft, EntrySource, JournalEntry, JournalLine};
use crate::error::LedgerError;
use crate::hierarchy::{validate_no_cycle, AccountNode};

/// Balance of one account at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalance {
    pub code: String,
    pub name: String,
    pub balance: Money,
}

/// One row of a trial balance report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub code: String,
    pub name: String,
    pub debit: Money,
    pub credit: Money,
}

/// Trial balance report over all leaf accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalance {
    pub rows: Vec<TrialBalanceRow>,
    pub total_debits: Money,
    pub total_credits: Money,
    pub is_balanced: bool,
}

struct LedgerState {
    accounts: BTreeMap<String, Account>,
    entries: Vec<JournalEntry>,
}

/// The append-only double-entry ledger
///
/// Thread-safe: postings take the write lock, balance reads take the read
/// lock, and each logical operation completes under one lock acquisition.
pub struct Ledger {
    state: RwLock<LedgerState>,
    currency: Currency,
}

impl Ledger {
    /// Creates an empty ledger in the given currency
    pub fn new(currency: Currency) -> Self {
        Self {
            state: RwLock::new(LedgerState {
                accounts: BTreeMap::new(),
                entries: Vec::new(),
            }),
            currency,
        }
    }

    /// Creates a ledger pre-loaded with a chart of accounts
    pub fn with_accounts(
        currency: Currency,
        accounts: Vec<Account>,
    ) -> Result<Self, LedgerError> {
        let ledger = Self::new(currency);
        for account in accounts {
            ledger.register_account(account)?;
        }
        Ok(ledger)
    }

    /// Returns the ledger currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Adds an account to the chart of accounts
    ///
    /// Rejects duplicate codes, links to unknown parents, and parent links
    /// that would make the account its own ancestor.
    pub fn register_account(&self, account: Account) -> Result<(), LedgerError> {
        let mut state = self.state.write().expect("ledger lock poisoned");

        if account.code.trim().is_empty() {
            return Err(LedgerError::validation("account code must not be empty"));
        }
        if state.accounts.contains_key(&account.code) {
            return Err(LedgerError::AccountAlreadyExists(account.code));
        }
        if let Some(parent) = &account.parent_code {
            if !state.accounts.contains_key(parent) {
                return Err(LedgerError::AccountNotFound(parent.clone()));
            }
            validate_no_cycle(&state.accounts, &account.code, parent)?;
        }

        state.accounts.insert(account.code.clone(), account);
        Ok(())
    }

    /// Re-parents an existing account, rejecting cycles
    pub fn set_parent(
        &self,
        code: &str,
        parent_code: Option<&str>,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.write().expect("ledger lock poisoned");

        if !state.accounts.contains_key(code) {
            return Err(LedgerError::AccountNotFound(code.to_string()));
        }
        if let Some(parent) = parent_code {
            if !state.accounts.contains_key(parent) {
                return Err(LedgerError::AccountNotFound(parent.to_string()));
            }
            validate_no_cycle(&state.accounts, code, parent)?;
        }

        let account = state.accounts.get_mut(code).expect("checked above");
        account.parent_code = parent_code.map(str::to_string);
        Ok(())
    }

    /// Gets an account by code
    pub fn account(&self, code: &str) -> Option<Account> {
        let state = self.state.read().expect("ledger lock poisoned");
        state.accounts.get(code).cloned()
    }

    /// Returns all accounts, sorted by code
    pub fn accounts(&self) -> Vec<Account> {
        let state = self.state.read().expect("ledger lock poisoned");
        state.accounts.values().cloned().collect()
    }

    /// Posts a balanced entry to the journal
    ///
    /// Validates line amounts, account existence/leaf-ness/activity, and the
    /// double-entry balance; writes the entry and its lines atomically under
    /// the write lock. The entry is immutable afterwards.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::ImbalancedEntry`] when debits do not equal credits;
    ///   logged at error severity, nothing is written.
    /// - [`LedgerError::NotALeafAccount`] / [`LedgerError::InactiveAccount`] /
    ///   [`LedgerError::AccountNotFound`] for bad target accounts.
    pub fn post(&self, draft: EntryDraft) -> Result<JournalEntry, LedgerError> {
        let mut state = self.state.write().expect("ledger lock poisoned");
        let entry = Self::validate_and_build(&state, draft, self.currency)?;
        debug!(entry = %entry.id, source = ?entry.source, "posted journal entry");
        state.entries.push(entry.clone());
        Ok(entry)
    }

    /// Posts a new entry with every line's debit and credit swapped
    ///
    /// The original entry is untouched. Each reversal is an independent new
    /// entry tagged with the original's id, so reversing twice produces two
    /// reversals rather than a no-op.
    pub fn reverse(
        &self,
        entry_id: JournalEntryId,
        reason: &str,
    ) -> Result<JournalEntry, LedgerError> {
        let mut state = self.state.write().expect("ledger lock poisoned");

        let original = state
            .entries
            .iter()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| LedgerError::EntryNotFound(entry_id.to_string()))?
            .clone();

        let mut draft = EntryDraft::new(
            EntrySource::Reversal,
            format!("Reversal of {}: {}", entry_id, reason),
        )
        .with_source_id(*entry_id.as_uuid());

        for line in &original.lines {
            let mut meta_tags = line.meta.clone();
            meta_tags.insert(meta::REVERSES.to_string(), entry_id.to_string());
            draft.lines.push(crate::entry::LineDraft {
                account_code: line.account_code.clone(),
                // Swapped on purpose
                debit: line.credit,
                credit: line.debit,
                meta: meta_tags,
            });
        }

        let entry = Self::validate_and_build(&state, draft, self.currency)?;
        debug!(entry = %entry.id, reverses = %entry_id, "posted reversal entry");
        state.entries.push(entry.clone());
        Ok(entry)
    }

    /// Gets a posted entry by id
    pub fn entry(&self, entry_id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        let state = self.state.read().expect("ledger lock poisoned");
        state
            .entries
            .iter()
            .find(|e| e.id == entry_id)
            .cloned()
            .ok_or_else(|| LedgerError::EntryNotFound(entry_id.to_string()))
    }

    /// Returns all posted entries in posting order
    pub fn entries(&self) -> Vec<JournalEntry> {
        let state = self.state.read().expect("ledger lock poisoned");
        state.entries.clone()
    }

    /// Normal-side-adjusted balance of an account, optionally as of a point
    /// in time
    ///
    /// Computed fresh from the journal on every call, inside one read lock.
    /// For a debit-normal account the balance is sum(debit) - sum(credit);
    /// for credit-normal the reverse.
    pub fn balance(
        &self,
        code: &str,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Money, LedgerError> {
        let state = self.state.read().expect("ledger lock poisoned");
        Self::signed_sum(&state, code, as_of, None, None, self.currency)
    }

    /// Balance of a single party's lines on a control account
    ///
    /// Sums only lines tagged with the party's id. This is the live source
    /// for a credit party's outstanding amount; it is never cached.
    pub fn party_balance(
        &self,
        code: &str,
        party: PartyId,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Money, LedgerError> {
        let state = self.state.read().expect("ledger lock poisoned");
        Self::signed_sum(&state, code, as_of, None, Some(party), self.currency)
    }

    /// Normal-side-adjusted movement on an account inside a window
    ///
    /// Includes entries dated within `[from, until]`. This is the cashier
    /// session's "ledger movement during the shift" input.
    pub fn net_activity(
        &self,
        code: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Money, LedgerError> {
        let state = self.state.read().expect("ledger lock poisoned");
        Self::signed_sum(&state, code, Some(until), Some(from), None, self.currency)
    }

    /// Snapshot of every leaf account's balance as of a point in time
    ///
    /// All balances come from the same lock acquisition, so the snapshot is
    /// internally consistent.
    pub fn balances_as_of(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<AccountBalance>, LedgerError> {
        let state = self.state.read().expect("ledger lock poisoned");

        let mut balances = Vec::new();
        for account in state.accounts.values() {
            if !Self::is_leaf(&state, &account.code) {
                continue;
            }
            let balance = Self::signed_sum(
                &state,
                &account.code,
                Some(as_of),
                None,
                None,
                self.currency,
            )?;
            balances.push(AccountBalance {
                code: account.code.clone(),
                name: account.name.clone(),
                balance,
            });
        }
        Ok(balances)
    }

    /// Builds the chart-of-accounts tree with rolled-up balances
    ///
    /// Leaf balances come from the journal; every parent's calculated
    /// balance is the sum of its children, recursively. Siblings are sorted
    /// by code for deterministic display.
    pub fn hierarchy(
        &self,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Vec<AccountNode>, LedgerError> {
        let state = self.state.read().expect("ledger lock poisoned");

        let mut leaf_balances: BTreeMap<String, Money> = BTreeMap::new();
        for account in state.accounts.values() {
            if Self::is_leaf(&state, &account.code) {
                let balance = Self::signed_sum(
                    &state,
                    &account.code,
                    as_of,
                    None,
                    None,
                    self.currency,
                )?;
                leaf_balances.insert(account.code.clone(), balance);
            }
        }

        let accounts: Vec<Account> = state.accounts.values().cloned().collect();
        Ok(crate::hierarchy::build_hierarchy(
            &accounts,
            &leaf_balances,
            self.currency,
        ))
    }

    /// Trial balance over all leaf accounts
    pub fn trial_balance(
        &self,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<TrialBalance, LedgerError> {
        let state = self.state.read().expect("ledger lock poisoned");

        let zero = Money::zero(self.currency);
        let mut rows = Vec::new();
        let mut total_debits = zero;
        let mut total_credits = zero;

        for account in state.accounts.values() {
            if !Self::is_leaf(&state, &account.code) {
                continue;
            }
            let balance =
                Self::signed_sum(&state, &account.code, as_of, None, None, self.currency)?;
            if balance.is_zero() {
                continue;
            }

            // A positive normal-side balance sits on the account's normal
            // side; a negative one flips to the other column.
            let debit_normal = account.account_type.is_debit_normal();
            let (debit, credit) = match (debit_normal, balance.is_negative()) {
                (true, false) => (balance, zero),
                (true, true) => (zero, balance.abs()),
                (false, false) => (zero, balance),
                (false, true) => (balance.abs(), zero),
            };

            total_debits = total_debits + debit;
            total_credits = total_credits + credit;
            rows.push(TrialBalanceRow {
                code: account.code.clone(),
                name: account.name.clone(),
                debit,
                credit,
            });
        }

        Ok(TrialBalance {
            rows,
            total_debits,
            total_credits,
            is_balanced: total_debits == total_credits,
        })
    }

    fn is_leaf(state: &LedgerState, code: &str) -> bool {
        !state
            .accounts
            .values()
            .any(|a| a.parent_code.as_deref() == Some(code))
    }

    fn signed_sum(
        state: &LedgerState,
        code: &str,
        as_of: Option<DateTime<Utc>>,
        from: Option<DateTime<Utc>>,
        party: Option<PartyId>,
        currency: Currency,
    ) -> Result<Money, LedgerError> {
        let account = state
            .accounts
            .get(code)
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))?;
        let debit_normal = account.account_type.is_debit_normal();
        let party_tag = party.map(|p| p.to_string());

        let mut sum = Money::zero(currency);
        for entry in &state.entries {
            if let Some(until) = as_of {
                if entry.entry_date > until {
                    continue;
                }
            }
            if let Some(from) = from {
                if entry.entry_date < from {
                    continue;
                }
            }
            for line in &entry.lines {
                if line.account_code != code {
                    continue;
                }
                if let Some(tag) = &party_tag {
                    if line.tag(meta::PARTY) != Some(tag.as_str()) {
                        continue;
                    }
                }
                let delta = if debit_normal {
                    line.debit.checked_sub(&line.credit)?
                } else {
                    line.credit.checked_sub(&line.debit)?
                };
                sum = sum.checked_add(&delta)?;
            }
        }
        Ok(sum)
    }

    fn validate_and_build(
        state: &LedgerState,
        draft: EntryDraft,
        currency: Currency,
    ) -> Result<JournalEntry, LedgerError> {
        if draft.lines.is_empty() {
            return Err(LedgerError::validation("entry must have at least one line"));
        }

        let mut debits = Decimal::ZERO;
        let mut credits = Decimal::ZERO;

        for line in &draft.lines {
            if line.debit.currency() != currency || line.credit.currency() != currency {
                return Err(LedgerError::validation(format!(
                    "line on {} is not in ledger currency {}",
                    line.account_code, currency
                )));
            }
            if line.debit.is_negative() || line.credit.is_negative() {
                return Err(LedgerError::validation(format!(
                    "negative amount on account {}",
                    line.account_code
                )));
            }
            if line.debit.is_positive() == line.credit.is_positive() {
                return Err(LedgerError::validation(format!(
                    "line on {} must have exactly one of debit/credit set",
                    line.account_code
                )));
            }

            let account = state
                .accounts
                .get(&line.account_code)
                .ok_or_else(|| LedgerError::AccountNotFound(line.account_code.clone()))?;
            if !account.is_active {
                return Err(LedgerError::InactiveAccount(line.account_code.clone()));
            }
            if !Self::is_leaf(state, &line.account_code) {
                return Err(LedgerError::NotALeafAccount(line.account_code.clone()));
            }

            debits += line.debit.amount();
            credits += line.credit.amount();
        }

        if debits != credits {
            // An imbalanced draft is a defect in the calling posting
            // strategy, not a user error.
            error!(
                %debits,
                %credits,
                source = ?draft.source,
                "invariant violation: imbalanced journal entry rejected"
            );
            return Err(LedgerError::ImbalancedEntry { debits, credits });
        }

        let now = Utc::now();
        let lines = draft
            .lines
            .into_iter()
            .map(|l| JournalLine {
                id: JournalLineId::new_v7(),
                account_code: l.account_code,
                debit: l.debit,
                credit: l.credit,
                meta: l.meta,
            })
            .collect();

        Ok(JournalEntry {
            id: JournalEntryId::new_v7(),
            entry_date: draft.entry_date.unwrap_or(now),
            posted_at: now,
            source: draft.source,
            source_id: draft.source_id,
            memo: draft.memo,
            lines,
        })
    }
}
