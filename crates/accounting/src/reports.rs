//! Read-side projections: trial balance and account statement.
//!
//! Pure folds over the chart and the recorded entries; nothing here mutates
//! state. A report taken concurrently with an in-flight post sees either the
//! pre- or post-posting state (store snapshots are commit-atomic), never a
//! partially applied one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use bahikhata_core::{AccountCode, EntryNumber, Money};

use crate::account::{Account, AccountType, Side};
use crate::error::{LedgerError, LedgerResult};
use crate::journal::{JournalEngine, JournalEntry};
use crate::store::LedgerStore;

/// One row of a trial balance: the account's balance placed on its normal
/// side (a negative balance flips to the opposite column).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub account_code: AccountCode,
    pub account_name: String,
    pub account_type: AccountType,
    pub debit: Money,
    pub credit: Money,
}

/// Inclusive date window; `None` bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// One statement line: a posted line affecting the account, with the running
/// balance after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    pub entry_number: EntryNumber,
    pub date: NaiveDate,
    pub description: String,
    pub debit: Money,
    pub credit: Money,
    pub running_balance: Money,
}

/// Ledger of a single account over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatement {
    pub account_code: AccountCode,
    pub account_name: String,
    pub account_type: AccountType,
    pub range: DateRange,
    /// Balance entering the range (opening balance plus prior activity).
    pub opening_balance: Money,
    pub lines: Vec<StatementLine>,
    pub closing_balance: Money,
}

impl<S: LedgerStore> JournalEngine<S> {
    /// Trial balance over all active accounts, sorted by code.
    ///
    /// With `as_of = None` this reads `current_balance` directly; with a
    /// date it replays recorded entries dated on or before it over opening
    /// balances. For a consistent ledger the debit and credit columns total
    /// to the same amount.
    pub fn get_trial_balance(
        &self,
        as_of: Option<NaiveDate>,
    ) -> LedgerResult<Vec<TrialBalanceRow>> {
        let mut accounts: Vec<Account> = self
            .store
            .list_accounts()?
            .into_iter()
            .filter(|a| a.is_active)
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));

        let entries = match as_of {
            Some(_) => self.store.list_entries()?,
            None => Vec::new(),
        };

        accounts
            .into_iter()
            .map(|account| {
                let balance = match as_of {
                    None => account.current_balance,
                    Some(date) => balance_as_of(&account, &entries, date)?,
                };
                let (debit, credit) = split_normal_side(account.account_type, balance);
                Ok(TrialBalanceRow {
                    account_code: account.code,
                    account_name: account.name,
                    account_type: account.account_type,
                    debit,
                    credit,
                })
            })
            .collect()
    }

    /// Statement for one account: its posted lines in `range`, ordered by
    /// entry date then entry number, each with a running balance.
    pub fn get_account_statement(
        &self,
        code: &AccountCode,
        range: DateRange,
    ) -> LedgerResult<AccountStatement> {
        let account = self
            .store
            .load_account(code)?
            .ok_or_else(|| LedgerError::NotFound(code.to_string()))?;

        let mut entries: Vec<JournalEntry> = self
            .store
            .list_entries()?
            .into_iter()
            .filter(|e| e.affects_balances())
            .filter(|e| e.lines.iter().any(|l| &l.account_code == code))
            .collect();
        entries.sort_by(|a, b| (a.date, &a.entry_number).cmp(&(b.date, &b.entry_number)));

        let mut running = account.opening_balance.minor() as i128;
        for entry in entries.iter().filter(|e| before_range(&range, e.date)) {
            for line in entry.lines.iter().filter(|l| &l.account_code == code) {
                running += account.signed_delta(line.side(), line.amount());
            }
        }
        let opening_balance = narrow(running)?;

        let mut lines = Vec::new();
        for entry in entries.iter().filter(|e| range.contains(e.date)) {
            for line in entry.lines.iter().filter(|l| &l.account_code == code) {
                running += account.signed_delta(line.side(), line.amount());
                lines.push(StatementLine {
                    entry_number: entry.entry_number.clone(),
                    date: entry.date,
                    description: line
                        .description
                        .clone()
                        .unwrap_or_else(|| entry.description.clone()),
                    debit: line.debit,
                    credit: line.credit,
                    running_balance: narrow(running)?,
                });
            }
        }

        Ok(AccountStatement {
            account_code: account.code,
            account_name: account.name,
            account_type: account.account_type,
            range,
            opening_balance,
            closing_balance: narrow(running)?,
            lines,
        })
    }
}

fn before_range(range: &DateRange, date: NaiveDate) -> bool {
    match range.from {
        Some(from) => date < from,
        None => false,
    }
}

fn balance_as_of(
    account: &Account,
    entries: &[JournalEntry],
    as_of: NaiveDate,
) -> LedgerResult<Money> {
    let mut balance = account.opening_balance.minor() as i128;
    for entry in entries
        .iter()
        .filter(|e| e.affects_balances() && e.date <= as_of)
    {
        for line in entry.lines.iter().filter(|l| l.account_code == account.code) {
            balance += account.signed_delta(line.side(), line.amount());
        }
    }
    narrow(balance)
}

fn split_normal_side(account_type: AccountType, balance: Money) -> (Money, Money) {
    let (own_side, flipped) = if balance.minor() >= 0 {
        (balance, Money::ZERO)
    } else {
        (Money::ZERO, Money::from_minor(-balance.minor()))
    };
    match account_type.normal_side() {
        Side::Debit => (own_side, flipped),
        Side::Credit => (flipped, own_side),
    }
}

fn narrow(total: i128) -> LedgerResult<Money> {
    i64::try_from(total)
        .map(Money::from_minor)
        .map_err(|_| LedgerError::Validation("balance overflows minor units".to_string()))
}
