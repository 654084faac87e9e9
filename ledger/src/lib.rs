// Copyright (c) 2026 Trellis Contributors. MIT License.
// See LICENSE for details.

//! # Trellis Ledger — Share-Based Vault Accounting
//!
//! The accounting core of the Trellis token-curation protocol: a registry of
//! content-addressed *terms* (atoms and subject–predicate–object triples),
//! a book of share-issuing vaults keyed by `(term, curve)`, and the fee
//! engine that routes value between them. Stake on a term signals belief in
//! it; stake on a counter-triple signals disbelief; fees reward the people
//! who curated a term before it was popular.
//!
//! This crate is deliberately self-contained and deterministic: no clocks,
//! no I/O, no global state. Epoch numbers and wallet addresses come in
//! through small traits, every mutation either fully applies or fully rolls
//! back, and identical call sequences produce identical books and event
//! logs — which is what makes the node's replay command possible at all.
//!
//! ## Architecture
//!
//! Modules mirror the concerns of the ledger:
//!
//! - **terms** — Content-addressed term identity: atoms, triples, counters.
//! - **vaults** — Share/asset books per `(term, curve)` pair.
//! - **curves** — Pluggable bonding-curve pricing behind a registry.
//! - **fees** — The fee schedule and the accrual books it feeds.
//! - **utilization** — Signed per-epoch activity tracking with a bounded
//!   recent-epoch ring per account.
//! - **approvals** — Receiver-granted sender permissions.
//! - **multivault** — The engine that composes all of the above.
//! - **accounts / epochs / wallets** — Identity and the external-source
//!   seams.
//! - **config / math / events** — Tunables, checked arithmetic, the event
//!   log.
//!
//! ## Design Philosophy
//!
//! 1. Money math is checked math — every add, mul, and div can refuse.
//! 2. Fees round up, payouts round down; dust stays where the books can
//!    account for it.
//! 3. Validation before mutation, and a snapshot behind every mutation
//!    anyway.
//! 4. If it moves value, it emits an event and it has tests.

pub mod accounts;
pub mod approvals;
pub mod config;
pub mod curves;
pub mod epochs;
pub mod events;
pub mod fees;
pub mod math;
pub mod multivault;
pub mod terms;
pub mod utilization;
pub mod vaults;
pub mod wallets;
