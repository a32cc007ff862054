//! Journal entries and the posting engine.
//!
//! This is the double-entry enforcement point: an entry's balance deltas are
//! applied to accounts only inside [`JournalEngine::post`], all-or-nothing,
//! under a store transaction. Entries move `draft -> posted -> reversed`;
//! posted entries are never edited, a reversal is a new offsetting entry.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use bahikhata_core::{AccountCode, EntryNumber, Money};

use crate::account::Side;
use crate::error::{LedgerError, LedgerResult};
use crate::store::{LedgerStore, LedgerTx};

/// Entry lifecycle state.
///
/// `Draft` has not touched balances; `Posted` is the only state with balance
/// side effects; `Reversed` is terminal, reached when the offsetting entry
/// posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Draft,
    Posted,
    Reversed,
}

/// One line of a journal entry.
///
/// A well-formed line carries exactly one of `debit` or `credit`, strictly
/// positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    pub account_code: AccountCode,
    pub debit: Money,
    pub credit: Money,
    pub description: Option<String>,
}

impl JournalLine {
    pub fn debit(account_code: AccountCode, amount: Money) -> Self {
        Self {
            account_code,
            debit: amount,
            credit: Money::ZERO,
            description: None,
        }
    }

    pub fn credit(account_code: AccountCode, amount: Money) -> Self {
        Self {
            account_code,
            debit: Money::ZERO,
            credit: amount,
            description: None,
        }
    }

    /// The side this line's amount sits on. Only meaningful for valid lines.
    pub fn side(&self) -> Side {
        if self.debit.is_positive() {
            Side::Debit
        } else {
            Side::Credit
        }
    }

    pub fn amount(&self) -> Money {
        match self.side() {
            Side::Debit => self.debit,
            Side::Credit => self.credit,
        }
    }

    fn validate(&self, index: usize) -> LedgerResult<()> {
        let reason = if self.debit.minor() < 0 || self.credit.minor() < 0 {
            Some("amounts must not be negative")
        } else if self.debit.is_positive() && self.credit.is_positive() {
            Some("a line must not carry both a debit and a credit")
        } else if self.debit.is_zero() && self.credit.is_zero() {
            Some("a line must carry a debit or a credit")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(LedgerError::InvalidLine {
                index,
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// A journal entry.
///
/// Keyed by `entry_number` (human-assigned); `entry_id` is internal
/// identity for audit correlation. Totals are derived from lines and
/// recomputed at validation time, never trusted from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub entry_id: Uuid,
    pub entry_number: EntryNumber,
    /// Calendar date of the transaction (distinct from `created_at`).
    pub date: NaiveDate,
    pub description: String,
    pub lines: Vec<JournalLine>,
    pub total_debit: Money,
    pub total_credit: Money,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
    pub posted_at: Option<DateTime<Utc>>,
    /// Audit link: the posted entry this one reverses.
    pub reverses: Option<EntryNumber>,
    /// Audit link: the reversing entry that cancelled this one.
    pub reversed_by: Option<EntryNumber>,
}

impl JournalEntry {
    /// Whether this entry's deltas are reflected in account balances.
    ///
    /// True for `Posted` entries and for `Reversed` ones: a reversed entry
    /// was posted and its effect stays on the books, offset by its reversing
    /// entry. Read-side projections must fold both.
    pub fn affects_balances(&self) -> bool {
        matches!(self.status, EntryStatus::Posted | EntryStatus::Reversed)
    }
}

/// Arguments for draft creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub entry_number: EntryNumber,
    pub date: NaiveDate,
    pub description: String,
    pub lines: Vec<JournalLine>,
}

/// Journal engine over an injected store.
#[derive(Debug)]
pub struct JournalEngine<S> {
    pub(crate) store: S,
}

impl<S: LedgerStore> JournalEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create a draft entry.
    ///
    /// Lines must be individually valid and at least two, but the entry does
    /// not have to balance yet: drafts are work in progress.
    pub fn create_draft(&self, new: NewEntry) -> LedgerResult<JournalEntry> {
        validate_lines(&new.lines)?;
        let (total_debit, total_credit) = totals(&new.lines)?;

        let entry = self.store.with_transaction(&mut |tx| {
            if tx.load_entry(&new.entry_number)?.is_some() {
                return Err(LedgerError::DuplicateEntryNumber(new.entry_number.clone()));
            }

            let entry = JournalEntry {
                entry_id: Uuid::now_v7(),
                entry_number: new.entry_number.clone(),
                date: new.date,
                description: new.description.clone(),
                lines: new.lines.clone(),
                total_debit,
                total_credit,
                status: EntryStatus::Draft,
                created_at: Utc::now(),
                posted_at: None,
                reverses: None,
                reversed_by: None,
            };
            tx.save_entry(entry.clone())?;
            Ok(entry)
        })?;

        Ok(entry)
    }

    /// Post a draft entry, applying its balance deltas atomically.
    ///
    /// The whole algorithm runs inside one store transaction: a failure at
    /// any step leaves the entry in `draft` and every balance unchanged.
    pub fn post(&self, number: &EntryNumber) -> LedgerResult<JournalEntry> {
        let entry = self.store.with_transaction(&mut |tx| {
            let mut entry = load_draft(tx, number)?;
            apply_posting(tx, &mut entry)?;
            tx.save_entry(entry.clone())?;
            Ok(entry)
        })?;

        info!(
            entry = %entry.entry_number,
            total_debit = entry.total_debit.minor(),
            "journal entry posted"
        );
        Ok(entry)
    }

    /// Reverse a posted entry.
    ///
    /// Creates a new entry numbered `<original>-R` with debits and credits
    /// swapped, posts it, and marks the original `reversed` — all in one
    /// transaction. The original's lines are never edited.
    pub fn reverse(&self, number: &EntryNumber) -> LedgerResult<JournalEntry> {
        let reversing = self.store.with_transaction(&mut |tx| {
            let mut original = tx
                .load_entry(number)?
                .ok_or_else(|| LedgerError::NotFound(number.to_string()))?;
            match original.status {
                EntryStatus::Posted => {}
                EntryStatus::Reversed => {
                    return Err(LedgerError::AlreadyReversed(number.clone()));
                }
                EntryStatus::Draft => return Err(LedgerError::NotPosted(number.clone())),
            }

            let reversal_number = number.reversal();
            if tx.load_entry(&reversal_number)?.is_some() {
                return Err(LedgerError::DuplicateEntryNumber(reversal_number));
            }

            let lines = original
                .lines
                .iter()
                .map(|l| JournalLine {
                    account_code: l.account_code.clone(),
                    debit: l.credit,
                    credit: l.debit,
                    description: l.description.clone(),
                })
                .collect::<Vec<_>>();

            let mut reversing = JournalEntry {
                entry_id: Uuid::now_v7(),
                entry_number: reversal_number.clone(),
                // Dated on the day the books are corrected, so as-of reports
                // keep showing the original effect before that day.
                date: Utc::now().date_naive(),
                description: format!("Reversal of {number}"),
                lines,
                total_debit: Money::ZERO,
                total_credit: Money::ZERO,
                status: EntryStatus::Draft,
                created_at: Utc::now(),
                posted_at: None,
                reverses: Some(number.clone()),
                reversed_by: None,
            };
            apply_posting(tx, &mut reversing)?;
            tx.save_entry(reversing.clone())?;

            original.status = EntryStatus::Reversed;
            original.reversed_by = Some(reversal_number);
            tx.save_entry(original)?;

            Ok(reversing)
        })?;

        info!(entry = %number, reversing = %reversing.entry_number, "journal entry reversed");
        Ok(reversing)
    }

    pub fn get_entry(&self, number: &EntryNumber) -> LedgerResult<JournalEntry> {
        self.store
            .load_entry(number)?
            .ok_or_else(|| LedgerError::NotFound(number.to_string()))
    }
}

fn load_draft(tx: &mut dyn LedgerTx, number: &EntryNumber) -> LedgerResult<JournalEntry> {
    let entry = tx
        .load_entry(number)?
        .ok_or_else(|| LedgerError::NotFound(number.to_string()))?;
    match entry.status {
        EntryStatus::Draft => Ok(entry),
        EntryStatus::Posted => Err(LedgerError::AlreadyPosted(number.clone())),
        EntryStatus::Reversed => Err(LedgerError::AlreadyReversed(number.clone())),
    }
}

/// Validate, balance-check and apply a draft's deltas inside a transaction.
///
/// Accounts are resolved and updated in sorted, deduplicated code order so
/// stores with per-account locking see one deterministic acquisition order
/// across all callers.
fn apply_posting(tx: &mut dyn LedgerTx, entry: &mut JournalEntry) -> LedgerResult<()> {
    validate_lines(&entry.lines)?;
    let (total_debit, total_credit) = totals(&entry.lines)?;
    if total_debit != total_credit {
        return Err(LedgerError::UnbalancedEntry {
            debit: total_debit.minor() as i128,
            credit: total_credit.minor() as i128,
        });
    }

    let mut codes: Vec<&AccountCode> = entry.lines.iter().map(|l| &l.account_code).collect();
    codes.sort();
    codes.dedup();

    for code in codes {
        let mut account = tx
            .load_account(code)?
            .ok_or_else(|| LedgerError::UnknownAccount(code.clone()))?;
        if !account.is_active {
            return Err(LedgerError::InactiveAccount(code.clone()));
        }
        for line in entry.lines.iter().filter(|l| &l.account_code == code) {
            account.apply_delta(line.side(), line.amount())?;
        }
        tx.save_account(account)?;
    }

    entry.total_debit = total_debit;
    entry.total_credit = total_credit;
    entry.status = EntryStatus::Posted;
    entry.posted_at = Some(Utc::now());
    Ok(())
}

fn validate_lines(lines: &[JournalLine]) -> LedgerResult<()> {
    if lines.len() < 2 {
        return Err(LedgerError::TooFewLines(lines.len()));
    }
    for (index, line) in lines.iter().enumerate() {
        line.validate(index)?;
    }
    Ok(())
}

/// Recompute totals over lines; sums run in `i128` and must fit minor units.
fn totals(lines: &[JournalLine]) -> LedgerResult<(Money, Money)> {
    let debit: i128 = lines.iter().map(|l| l.debit).sum();
    let credit: i128 = lines.iter().map(|l| l.credit).sum();

    let narrow = |total: i128| -> LedgerResult<Money> {
        i64::try_from(total)
            .map(Money::from_minor)
            .map_err(|_| LedgerError::Validation("entry total overflows minor units".to_string()))
    };
    Ok((narrow(debit)?, narrow(credit)?))
}
