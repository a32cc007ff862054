//! Accounts and the debit/credit sign convention.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bahikhata_core::{AccountCode, Money};

use crate::error::LedgerError;

/// High-level account type (determines normal balance side).
///
/// Fixed at creation: changing it would invalidate the meaning of every
/// historical balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

/// Which side of an entry line an amount sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Debit,
    Credit,
}

impl AccountType {
    /// The side that increases an account of this type.
    ///
    /// Assets and expenses grow on the debit side; liabilities, equity and
    /// revenue grow on the credit side.
    pub fn normal_side(self) -> Side {
        match self {
            AccountType::Asset | AccountType::Expense => Side::Debit,
            AccountType::Liability | AccountType::Equity | AccountType::Revenue => Side::Credit,
        }
    }
}

/// An account in the chart of accounts.
///
/// `current_balance` is stored normal-side-positive: a debit increases the
/// balance of asset/expense accounts, a credit increases the balance of
/// liability/equity/revenue accounts. Only the journal engine writes it,
/// inside a posting transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub code: AccountCode,
    pub name: String,
    pub account_type: AccountType,
    /// Hierarchy edge: code of the parent account, absent for roots.
    pub parent_code: Option<AccountCode>,
    /// Set once at creation.
    pub opening_balance: Money,
    pub current_balance: Money,
    /// Inactive accounts reject new postings but stay queryable.
    pub is_active: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Signed effect of an amount on this account's balance.
    ///
    /// Positive when the amount sits on the account's normal side.
    pub fn signed_delta(&self, side: Side, amount: Money) -> i128 {
        if side == self.account_type.normal_side() {
            amount.minor() as i128
        } else {
            -(amount.minor() as i128)
        }
    }

    /// Apply a single line's effect to `current_balance`.
    ///
    /// Internal to the posting transaction; callers must already hold the
    /// store transaction covering this account.
    pub(crate) fn apply_delta(&mut self, side: Side, amount: Money) -> Result<(), LedgerError> {
        if !self.is_active {
            return Err(LedgerError::InactiveAccount(self.code.clone()));
        }
        let delta = Money::from_minor(if side == self.account_type.normal_side() {
            amount.minor()
        } else {
            amount
                .checked_neg()
                .map_err(|_| LedgerError::Validation("amount overflow".to_string()))?
                .minor()
        });
        self.current_balance = self.current_balance.checked_add(delta)?;
        Ok(())
    }

    /// Whether the account has seen any posting since creation.
    pub fn has_activity(&self) -> bool {
        self.current_balance != self.opening_balance
    }
}

/// Arguments for account creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub code: AccountCode,
    pub name: String,
    pub account_type: AccountType,
    pub parent_code: Option<AccountCode>,
    pub opening_balance: Money,
    pub description: Option<String>,
}
