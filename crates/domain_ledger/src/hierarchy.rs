//! Chart-of-accounts hierarchy
//!
//! Links accounts into a tree by parent code and rolls balances up from the
//! leaves: a parent's calculated balance is the sum of its children's,
//! recursively. Siblings are sorted by code so display order is
//! deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{Currency, Money};

use crate::account::Account;
use crate::error::LedgerError;

/// One node of the rolled-up account tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountNode {
    pub account: Account,
    /// Leaf: the ledger balance. Parent: sum of children, recursively.
    pub calculated_balance: Money,
    pub children: Vec<AccountNode>,
}

impl AccountNode {
    /// Finds a node by account code in this subtree
    pub fn find(&self, code: &str) -> Option<&AccountNode> {
        if self.account.code == code {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(code))
    }
}

/// Builds the account tree from a flat account list and leaf balances
///
/// Accounts whose parent is missing from the list surface as roots rather
/// than disappearing. Roots and siblings are sorted by code.
pub fn build_hierarchy(
    accounts: &[Account],
    leaf_balances: &BTreeMap<String, Money>,
    currency: Currency,
) -> Vec<AccountNode> {
    let known: BTreeMap<&str, &Account> =
        accounts.iter().map(|a| (a.code.as_str(), a)).collect();

    let mut children_of: BTreeMap<&str, Vec<&Account>> = BTreeMap::new();
    let mut roots: Vec<&Account> = Vec::new();

    for account in accounts {
        match account.parent_code.as_deref().filter(|p| known.contains_key(p)) {
            Some(parent) => children_of.entry(parent).or_default().push(account),
            None => roots.push(account),
        }
    }

    roots.sort_by(|a, b| a.code.cmp(&b.code));
    roots
        .into_iter()
        .map(|a| build_node(a, &children_of, leaf_balances, currency))
        .collect()
}

fn build_node(
    account: &Account,
    children_of: &BTreeMap<&str, Vec<&Account>>,
    leaf_balances: &BTreeMap<String, Money>,
    currency: Currency,
) -> AccountNode {
    let mut child_accounts: Vec<&Account> = children_of
        .get(account.code.as_str())
        .cloned()
        .unwrap_or_default();
    child_accounts.sort_by(|a, b| a.code.cmp(&b.code));

    let children: Vec<AccountNode> = child_accounts
        .into_iter()
        .map(|c| build_node(c, children_of, leaf_balances, currency))
        .collect();

    let calculated_balance = if children.is_empty() {
        leaf_balances
            .get(&account.code)
            .copied()
            .unwrap_or_else(|| Money::zero(currency))
    } else {
        children
            .iter()
            .fold(Money::zero(currency), |acc, c| acc + c.calculated_balance)
    };

    AccountNode {
        account: account.clone(),
        calculated_balance,
        children,
    }
}

/// Rejects a parent link that would make `code` its own ancestor
pub(crate) fn validate_no_cycle(
    accounts: &BTreeMap<String, Account>,
    code: &str,
    new_parent: &str,
) -> Result<(), LedgerError> {
    if new_parent == code {
        return Err(LedgerError::HierarchyCycle(code.to_string()));
    }

    let mut cursor = Some(new_parent.to_string());
    while let Some(current) = cursor {
        if current == code {
            return Err(LedgerError::HierarchyCycle(code.to_string()));
        }
        cursor = accounts
            .get(&current)
            .and_then(|a| a.parent_code.clone());
    }
    Ok(())
}
