//! `bahikhata-accounting` — the double-entry ledger engine.
//!
//! Two cooperating components: the chart of accounts (account identity,
//! hierarchy, balance storage) and the journal engine (entry validation,
//! posting, reversal, reports). Persistence is an injected collaborator
//! behind [`store::LedgerStore`]; this crate performs no I/O of its own.

pub mod account;
pub mod chart;
pub mod error;
pub mod journal;
pub mod reports;
pub mod store;

pub use account::{Account, AccountType, NewAccount, Side};
pub use chart::{AccountFilter, ChartOfAccounts, ChartPolicy};
pub use error::{LedgerError, LedgerResult};
pub use journal::{EntryStatus, JournalEngine, JournalEntry, JournalLine, NewEntry};
pub use reports::{AccountStatement, DateRange, StatementLine, TrialBalanceRow};
pub use store::{LedgerStore, LedgerTx, StoreError};

#[cfg(test)]
pub(crate) mod test_support;
