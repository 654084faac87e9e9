//! # Vaults
//!
//! Share accounting for `(term, curve)` pairs. See [`book`] for the balance
//! invariants the book enforces.

pub mod book;

pub use book::{Vault, VaultBook, VaultError, VaultKey};
