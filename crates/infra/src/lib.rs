//! Infrastructure layer: ledger store implementations.
//!
//! The engine in `bahikhata-accounting` is storage-agnostic; this crate
//! provides the concrete [`store::InMemoryLedgerStore`] used by tests, dev
//! setups and the benchmarks. A database-backed store implements the same
//! `LedgerStore` trait.

pub mod store;

pub use store::InMemoryLedgerStore;

#[cfg(test)]
mod integration_tests;
