//! Persistence contract for the ledger engine.
//!
//! The engine performs no I/O of its own; accounts and journal entries live
//! behind this trait, injected at construction. An in-memory implementation
//! (tests/dev) lives in `bahikhata-infra`; a database-backed one slots in
//! without touching the engine.

use std::sync::Arc;

use thiserror::Error;

use bahikhata_core::{AccountCode, EntryNumber};

use crate::account::Account;
use crate::error::LedgerError;
use crate::journal::JournalEntry;

/// Infrastructure failure inside the store (never a business-rule failure).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Mutation view handed to a transaction closure.
///
/// Writes made through this trait become visible only when the closure
/// returns `Ok`; on `Err` every write is discarded.
pub trait LedgerTx {
    fn load_account(&self, code: &AccountCode) -> Result<Option<Account>, StoreError>;
    fn save_account(&mut self, account: Account) -> Result<(), StoreError>;
    fn load_entry(&self, number: &EntryNumber) -> Result<Option<JournalEntry>, StoreError>;
    fn save_entry(&mut self, entry: JournalEntry) -> Result<(), StoreError>;
    fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;
    fn list_entries(&self) -> Result<Vec<JournalEntry>, StoreError>;
    /// Physically remove an account. The chart checks preconditions first.
    fn delete_account(&mut self, code: &AccountCode) -> Result<(), StoreError>;
}

/// Transactional account/entry store.
///
/// ## Implementation requirements
///
/// - `with_transaction` must be atomic: all writes from one closure commit
///   together or not at all, durably with each other.
/// - Transactions that touch overlapping accounts must be serialized, never
///   interleaved (lost-update hazard). A single coarse lock qualifies; so do
///   per-account locks taken in sorted code order (the engine resolves
///   accounts in that order).
/// - Reads outside a transaction must observe either the pre- or post-commit
///   state of any transaction, never a partial one.
pub trait LedgerStore: Send + Sync {
    fn load_account(&self, code: &AccountCode) -> Result<Option<Account>, StoreError>;
    fn load_entry(&self, number: &EntryNumber) -> Result<Option<JournalEntry>, StoreError>;
    fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;
    fn list_entries(&self) -> Result<Vec<JournalEntry>, StoreError>;

    /// Run `f` inside a transaction; commit on `Ok`, discard on `Err`.
    fn with_transaction<T>(
        &self,
        f: &mut dyn FnMut(&mut dyn LedgerTx) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError>;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn load_account(&self, code: &AccountCode) -> Result<Option<Account>, StoreError> {
        (**self).load_account(code)
    }

    fn load_entry(&self, number: &EntryNumber) -> Result<Option<JournalEntry>, StoreError> {
        (**self).load_entry(number)
    }

    fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        (**self).list_accounts()
    }

    fn list_entries(&self) -> Result<Vec<JournalEntry>, StoreError> {
        (**self).list_entries()
    }

    fn with_transaction<T>(
        &self,
        f: &mut dyn FnMut(&mut dyn LedgerTx) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        (**self).with_transaction(f)
    }
}
