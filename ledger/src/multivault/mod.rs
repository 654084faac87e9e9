//! # MultiVault — The Vault Accounting & Fee Engine
//!
//! The [`MultiVault`] is the single entry point for everything that moves
//! value: term creation, deposits, redemptions, approvals, fee claims, and
//! the admin surface. It composes the bookkeeping modules — terms, vaults,
//! fees, utilization, approvals — behind one `&mut self` API with strict
//! all-or-nothing semantics per call.
//!
//! ```text
//!                        ┌────────────────────────────┐
//!   create_atom ───────► │         MultiVault         │
//!   create_triple ─────► │                            │
//!   deposit ───────────► │  TermRegistry   VaultBook  │ ──► LedgerEvent log
//!   redeem ────────────► │  FeeBook        Approvals  │
//!   approve ───────────► │  UtilizationTracker        │
//!   claim / sweep ─────► │                            │
//!   admin ops ─────────► │  CurveRegistry  (pricing)  │
//!                        └────────────────────────────┘
//! ```
//!
//! Operations are organized by file: `create.rs` registers terms and
//! bootstraps their vaults, `deposit.rs` runs the entry waterfall,
//! `redeem.rs` the exit waterfall, `admin.rs` the privileged surface, and
//! `engine.rs` holds state, the transactional boundary, and reads.
//!
//! ## Why a single engine object
//!
//! Fee routing makes the stores inseparable: one deposit can touch the
//! target vault, the term's default-curve vault, three component vaults,
//! an epoch bucket, a wallet accrual, and the utilization ring. Splitting
//! those behind separate APIs would force every caller to re-implement the
//! atomicity this module guarantees once, internally, with a state
//! snapshot per mutating call. Single-threaded ownership (`&mut self`)
//! keeps the whole engine free of locks; callers that want concurrency put
//! the engine behind their own synchronization, as the node does.

mod admin;
mod create;
mod deposit;
mod engine;
mod error;
mod redeem;

pub use deposit::DepositQuote;
pub use engine::MultiVault;
pub use error::{Error, Result};
pub use redeem::RedeemQuote;
