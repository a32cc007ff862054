use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use bahikhata_core::{AccountCode, EntryNumber};

use bahikhata_accounting::{
    Account, JournalEntry, LedgerError, LedgerStore, LedgerTx, StoreError,
};

/// In-memory ledger store.
///
/// Intended for tests/dev. Not optimized for performance.
///
/// Transactions stage their writes in a copy of the state under the write
/// lock and swap it in on commit, so a failed closure leaves nothing behind
/// and readers never see a half-applied posting. Holding one lock for the
/// whole transaction trivially serializes postings that touch overlapping
/// accounts.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<State>,
}

#[derive(Debug, Default, Clone)]
struct State {
    accounts: HashMap<AccountCode, Account>,
    entries: HashMap<EntryNumber, JournalEntry>,
}

struct StagedTx {
    staged: State,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

impl LedgerTx for StagedTx {
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

impl LedgerStore for InMemoryLedgerStore {
    fn load_account(&self, code: &AccountCode) -> Result<Option<Account>, StoreError> {
        Ok(self.read()?.accounts.get(code).cloned())
    }

    fn load_entry(&self, number: &EntryNumber) -> Result<Option<JournalEntry>, StoreError> {
        Ok(self.read()?.entries.get(number).cloned())
    }

    fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.read()?.accounts.values().cloned().collect())
    }

    fn list_entries(&self) -> Result<Vec<JournalEntry>, StoreError> {
        Ok(self.read()?.entries.values().cloned().collect())
    }

    fn with_transaction<T>(
        &self,
        f: &mut dyn FnMut(&mut dyn LedgerTx) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let mut state = self.write().map_err(LedgerError::from)?;
        let mut tx = StagedTx {
            staged: state.clone(),
        };
        let value = f(&mut tx)?;
        *state = tx.staged;
        Ok(value)
    }
}
