//! Minimal in-memory store for unit tests in this crate.
//!
//! The full-featured implementation lives in `bahikhata-infra`; this one
//! exists so chart/journal tests do not need a cross-crate dependency.

use std::collections::BTreeMap;
use std::sync::Mutex;

use bahikhata_core::{AccountCode, EntryNumber};

use crate::account::Account;
use crate::error::LedgerError;
use crate::journal::JournalEntry;
use crate::store::{LedgerStore, LedgerTx, StoreError};

#[derive(Debug, Default, Clone)]
struct State {
    accounts: BTreeMap<AccountCode, Account>,
    entries: BTreeMap<EntryNumber, JournalEntry>,
}

#[derive(Debug, Default)]
pub(crate) struct MemStore {
    state: Mutex<State>,
}

impl MemStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

struct MemTx {
    staged: State,
}

impl LedgerTx for MemTx {
    fn load_account(&self, code: &AccountCode) -> Result<Option<Account>, StoreError> {
        Ok(self.staged.accounts.get(code).cloned())
    }

    fn save_account(&mut self, account: Account) -> Result<(), StoreError> {
        self.staged.accounts.insert(account.code.clone(), account);
        Ok(())
    }

    fn load_entry(&self, number: &EntryNumber) -> Result<Option<JournalEntry>, StoreError> {
        Ok(self.staged.entries.get(number).cloned())
    }

    fn save_entry(&mut self, entry: JournalEntry) -> Result<(), StoreError> {
        self.staged.entries.insert(entry.entry_number.clone(), entry);
        Ok(())
    }

    fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.staged.accounts.values().cloned().collect())
    }

    fn list_entries(&self) -> Result<Vec<JournalEntry>, StoreError> {
        Ok(self.staged.entries.values().cloned().collect())
    }

    fn delete_account(&mut self, code: &AccountCode) -> Result<(), StoreError> {
        self.staged.accounts.remove(code);
        Ok(())
    }
}

impl LedgerStore for MemStore {
    fn load_account(&self, code: &AccountCode) -> Result<Option<Account>, StoreError> {
        let state = self.lock()?;
        Ok(state.accounts.get(code).cloned())
    }

    fn load_entry(&self, number: &EntryNumber) -> Result<Option<JournalEntry>, StoreError> {
        let state = self.lock()?;
        Ok(state.entries.get(number).cloned())
    }

    fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let state = self.lock()?;
        Ok(state.accounts.values().cloned().collect())
    }

    fn list_entries(&self) -> Result<Vec<JournalEntry>, StoreError> {
        let state = self.lock()?;
        Ok(state.entries.values().cloned().collect())
    }

    fn with_transaction<T>(
        &self,
        f: &mut dyn FnMut(&mut dyn LedgerTx) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let mut state = self.lock().map_err(LedgerError::from)?;
        let mut tx = MemTx {
            staged: state.clone(),
        };
        let value = f(&mut tx)?;
        *state = tx.staged;
        Ok(value)
    }
}

impl MemStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}
