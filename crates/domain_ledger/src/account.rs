//! Account types for the chart of accounts
//!
//! This module defines the account structure for double-entry bookkeeping.

use serde::{Deserialize, Serialize};

use core_kernel::AccountId;

/// Types of accounts in the chart of accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// Asset accounts (debit normal balance)
    Asset,
    /// Liability accounts (credit normal balance)
    Liability,
    /// Equity accounts (credit normal balance)
    Equity,
    /// Income accounts (credit normal balance)
    Income,
    /// Expense accounts (debit normal balance)
    Expense,
}

impl AccountType {
    /// Returns true if this account type has a debit normal balance
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Expense)
    }
}

/// An account in the chart of accounts
///
/// Accounts form a tree through `parent_code`. Journal lines may only be
/// posted against leaf accounts; parents exist for roll-up reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,
    /// Account code (e.g., "1000"), unique within the chart
    pub code: String,
    /// Account name
    pub name: String,
    /// Account type
    pub account_type: AccountType,
    /// Parent account code (for hierarchical charts)
    pub parent_code: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Whether account is active
    pub is_active: bool,
}

impl Account {
    /// Creates a new account
    pub fn new(code: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            id: AccountId::new(),
            code: code.into(),
            name: name.into(),
            account_type,
            parent_code: None,
            description: None,
            is_active: true,
        }
    }

    /// Sets the parent account by code
    pub fn with_parent(mut self, parent_code: impl Into<String>) -> Self {
        self.parent_code = Some(parent_code.into());
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the account inactive
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Standard chart of accounts for a retail POS deployment
///
/// Mirrors the layout the backend seeds for a new store: tender accounts
/// under a cash-on-hand parent, control accounts for customer receivables
/// and supplier payables, and the usual income/expense heads.
pub struct RetailChartOfAccounts;

impl RetailChartOfAccounts {
    /// Customer receivables control account code
    pub const RECEIVABLES: &'static str = "1200";
    /// Supplier payables control account code
    pub const PAYABLES: &'static str = "2100";
    /// Cash drawer account code
    pub const CASH_DRAWER: &'static str = "1010";
    /// Mobile money float account code
    pub const MOBILE_MONEY: &'static str = "1020";
    /// Bank account code
    pub const BANK: &'static str = "1030";
    /// Sales revenue account code
    pub const SALES: &'static str = "4000";
    /// Inventory account code
    pub const INVENTORY: &'static str = "1300";
    /// Cost of goods sold account code
    pub const COGS: &'static str = "5000";

    /// Creates the standard retail accounts
    pub fn create_standard_accounts() -> Vec<Account> {
        vec![
            // Assets
            Account::new("1000", "Cash on Hand", AccountType::Asset),
            Account::new(Self::CASH_DRAWER, "Cash Drawer", AccountType::Asset)
                .with_parent("1000"),
            Account::new(Self::MOBILE_MONEY, "Mobile Money Float", AccountType::Asset)
                .with_parent("1000"),
            Account::new(Self::BANK, "Bank", AccountType::Asset).with_parent("1000"),
            Account::new(Self::RECEIVABLES, "Customer Receivables", AccountType::Asset),
            Account::new(Self::INVENTORY, "Inventory", AccountType::Asset),
            // Liabilities
            Account::new(Self::PAYABLES, "Supplier Payables", AccountType::Liability),
            Account::new("2200", "Taxes Payable", AccountType::Liability),
            // Equity
            Account::new("3000", "Owner Equity", AccountType::Equity),
            // Income
            Account::new(Self::SALES, "Sales Revenue", AccountType::Income),
            Account::new("4100", "Other Income", AccountType::Income),
            // Expenses
            Account::new(Self::COGS, "Cost of Goods Sold", AccountType::Expense),
            Account::new("5100", "Operating Expense", AccountType::Expense),
        ]
    }
}
