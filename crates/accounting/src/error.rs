//! Ledger error taxonomy.
//!
//! Every failure here is caller-recoverable and scoped to one operation;
//! validation always runs before any mutation is committed.

use thiserror::Error;

use bahikhata_core::{AccountCode, DomainError, EntryNumber};

use crate::account::AccountType;
use crate::store::StoreError;

/// Result type used across the ledger engine.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Direct lookup of an account or entry failed.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate account code: {0}")]
    DuplicateCode(AccountCode),

    #[error("duplicate entry number: {0}")]
    DuplicateEntryNumber(EntryNumber),

    /// `parent_code` does not resolve to an existing account.
    #[error("unknown parent account: {0}")]
    UnknownParent(AccountCode),

    /// An entry line references an account that does not exist.
    #[error("unknown account: {0}")]
    UnknownAccount(AccountCode),

    #[error("account {0} is inactive")]
    InactiveAccount(AccountCode),

    #[error("account {0} has active child accounts")]
    HasChildren(AccountCode),

    /// Physical deletion refused: the account has been posted to.
    #[error("account {0} has postings")]
    HasPostings(AccountCode),

    /// Child account type must match the parent's (policy-controlled).
    #[error("account type {child:?} does not match parent type {parent:?}")]
    TypeMismatch {
        child: AccountType,
        parent: AccountType,
    },

    /// A line must carry exactly one of debit or credit, strictly positive.
    #[error("invalid line {index}: {reason}")]
    InvalidLine { index: usize, reason: String },

    #[error("journal entry must have at least two lines, got {0}")]
    TooFewLines(usize),

    #[error("unbalanced entry: total debit {debit} != total credit {credit}")]
    UnbalancedEntry { debit: i128, credit: i128 },

    #[error("entry {0} is already posted")]
    AlreadyPosted(EntryNumber),

    #[error("entry {0} is already reversed")]
    AlreadyReversed(EntryNumber),

    /// Reversal target must be in the posted state.
    #[error("entry {0} is not posted")]
    NotPosted(EntryNumber),

    /// Malformed input (empty codes/names, amount overflow).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Failure reported by the persistence collaborator.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<DomainError> for LedgerError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => LedgerError::Validation(msg),
            DomainError::AmountOverflow => LedgerError::Validation("amount overflow".to_string()),
        }
    }
}
