//! Chart of accounts: account identity, hierarchy integrity, balance storage.
//!
//! Accounts form a forest keyed by code; the hierarchy is a flat mapping of
//! `code -> account` with `parent_code` edges, never live object references.
//! Because a parent must already exist at creation time and `parent_code` is
//! immutable afterwards, a chain of parents always terminates at a root and
//! an account can never become its own ancestor.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use bahikhata_core::AccountCode;

use crate::account::{Account, AccountType, NewAccount};
use crate::error::{LedgerError, LedgerResult};
use crate::store::LedgerStore;

/// Policy knobs for the chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPolicy {
    /// When set, a child account must share its parent's type.
    ///
    /// Off by default: the books observed in the wild mix types freely under
    /// grouping accounts.
    #[serde(default)]
    pub require_child_type_match: bool,
}

/// Filter for [`ChartOfAccounts::list_accounts`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFilter {
    pub account_type: Option<AccountType>,
    #[serde(default)]
    pub active_only: bool,
    /// Case-insensitive substring match over code and name.
    pub search: Option<String>,
}

/// Chart of accounts service over an injected store.
#[derive(Debug)]
pub struct ChartOfAccounts<S> {
    store: S,
    policy: ChartPolicy,
}

impl<S: LedgerStore> ChartOfAccounts<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: ChartPolicy::default(),
        }
    }

    pub fn with_policy(store: S, policy: ChartPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> ChartPolicy {
        self.policy
    }

    /// Create an account.
    ///
    /// Fails with `DuplicateCode` if the code is taken, `UnknownParent` if
    /// the parent does not resolve, `InactiveAccount` if the parent is
    /// deactivated, and `TypeMismatch` when the policy demands matching
    /// types. `current_balance` starts at `opening_balance`.
    pub fn create_account(&self, new: NewAccount) -> LedgerResult<Account> {
        if new.name.trim().is_empty() {
            return Err(LedgerError::Validation(
                "account name must not be empty".to_string(),
            ));
        }

        let policy = self.policy;
        let account = self.store.with_transaction(&mut |tx| {
            if tx.load_account(&new.code)?.is_some() {
                return Err(LedgerError::DuplicateCode(new.code.clone()));
            }

            if let Some(parent_code) = &new.parent_code {
                let parent = tx
                    .load_account(parent_code)?
                    .ok_or_else(|| LedgerError::UnknownParent(parent_code.clone()))?;
                if !parent.is_active {
                    return Err(LedgerError::InactiveAccount(parent.code));
                }
                if policy.require_child_type_match && parent.account_type != new.account_type {
                    return Err(LedgerError::TypeMismatch {
                        child: new.account_type,
                        parent: parent.account_type,
                    });
                }
            }

            let account = Account {
                code: new.code.clone(),
                name: new.name.trim().to_string(),
                account_type: new.account_type,
                parent_code: new.parent_code.clone(),
                opening_balance: new.opening_balance,
                current_balance: new.opening_balance,
                is_active: true,
                description: new.description.clone(),
                created_at: Utc::now(),
            };
            tx.save_account(account.clone())?;
            Ok(account)
        })?;

        info!(code = %account.code, account_type = ?account.account_type, "account created");
        Ok(account)
    }

    pub fn get_account(&self, code: &AccountCode) -> LedgerResult<Account> {
        self.store
            .load_account(code)?
            .ok_or_else(|| LedgerError::NotFound(code.to_string()))
    }

    /// List accounts matching `filter`, sorted by code.
    ///
    /// Sorting keeps the order stable across repeated calls with unchanged
    /// data, regardless of how the store iterates.
    pub fn list_accounts(&self, filter: &AccountFilter) -> LedgerResult<Vec<Account>> {
        let needle = filter.search.as_ref().map(|s| s.to_lowercase());

        let mut accounts: Vec<Account> = self
            .store
            .list_accounts()?
            .into_iter()
            .filter(|a| {
                if let Some(wanted) = filter.account_type {
                    if a.account_type != wanted {
                        return false;
                    }
                }
                if filter.active_only && !a.is_active {
                    return false;
                }
                if let Some(needle) = &needle {
                    let code = a.code.as_str().to_lowercase();
                    let name = a.name.to_lowercase();
                    if !code.contains(needle) && !name.contains(needle) {
                        return false;
                    }
                }
                true
            })
            .collect();

        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    /// Deactivate an account (idempotent).
    ///
    /// Fails with `HasChildren` while active child accounts exist; the
    /// account stays queryable for historical reports.
    pub fn deactivate_account(&self, code: &AccountCode) -> LedgerResult<Account> {
        let account = self.store.with_transaction(&mut |tx| {
            let mut account = tx
                .load_account(code)?
                .ok_or_else(|| LedgerError::NotFound(code.to_string()))?;

            let has_active_children = tx
                .list_accounts()?
                .iter()
                .any(|a| a.is_active && a.parent_code.as_ref() == Some(code));
            if has_active_children {
                return Err(LedgerError::HasChildren(code.clone()));
            }

            if account.is_active {
                account.is_active = false;
                tx.save_account(account.clone())?;
            }
            Ok(account)
        })?;

        info!(code = %code, "account deactivated");
        Ok(account)
    }

    /// Physically delete an account.
    ///
    /// Only permitted for accounts with no children, no balance activity and
    /// no journal entries referencing them; anything else must go through
    /// [`Self::deactivate_account`] so the audit trail survives.
    pub fn delete_account(&self, code: &AccountCode) -> LedgerResult<()> {
        self.store.with_transaction(&mut |tx| {
            let account = tx
                .load_account(code)?
                .ok_or_else(|| LedgerError::NotFound(code.to_string()))?;

            let has_children = tx
                .list_accounts()?
                .iter()
                .any(|a| a.parent_code.as_ref() == Some(code));
            if has_children {
                return Err(LedgerError::HasChildren(code.clone()));
            }

            let referenced = tx
                .list_entries()?
                .iter()
                .any(|e| e.lines.iter().any(|l| &l.account_code == code));
            if account.has_activity() || referenced {
                return Err(LedgerError::HasPostings(code.clone()));
            }

            tx.delete_account(code)?;
            Ok(())
        })?;

        info!(code = %code, "account deleted");
        Ok(())
    }
}
