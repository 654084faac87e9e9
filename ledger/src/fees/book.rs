//! # Fee Book — Accrual Buckets
//!
//! Collected fees that are *not* routed into a vault land here, in one of
//! three places:
//!
//! - **Protocol buckets**, keyed by the epoch in which the fee was charged.
//!   Sweeping an epoch drains its bucket to the treasury.
//! - **Atom wallet accruals**, keyed by the wallet address derived from the
//!   atom. Claiming drains the accrual to that wallet.
//! - **Dust**, the undividable remainder of three-way deposit-fraction
//!   splits. Dust is retained by the protocol and only ever grows.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::accounts::AccountId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from fee accrual.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeeError {
    /// An accrual bucket would exceed `u128::MAX`.
    #[error("fee bucket overflow: current {current}, delta {delta}")]
    Overflow {
        /// The bucket's value before the failed accrual.
        current: u128,
        /// The amount that caused the overflow.
        delta: u128,
    },
}

// ---------------------------------------------------------------------------
// FeeBook
// ---------------------------------------------------------------------------

/// All fee accruals awaiting a sweep or a claim.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBook {
    /// Protocol fees by the epoch they were charged in.
    protocol_by_epoch: HashMap<u64, u128>,

    /// Unclaimed atom wallet fees by wallet address.
    wallet_accruals: HashMap<AccountId, u128>,

    /// Remainders from deposit-fraction splits, retained by the protocol.
    dust: u128,
}

impl FeeBook {
    /// An empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a protocol fee to `epoch`'s bucket. Returns the bucket's new
    /// total. A zero amount leaves the book untouched.
    pub fn accrue_protocol(&mut self, epoch: u64, amount: u128) -> Result<u128, FeeError> {
        if amount == 0 {
            return Ok(self.protocol_accrued(epoch));
        }
        let bucket = self.protocol_by_epoch.entry(epoch).or_insert(0);
        *bucket = bucket.checked_add(amount).ok_or(FeeError::Overflow {
            current: *bucket,
            delta: amount,
        })?;
        Ok(*bucket)
    }

    /// Drains and returns `epoch`'s protocol bucket. Zero if nothing was
    /// ever accrued there.
    pub fn sweep_protocol(&mut self, epoch: u64) -> u128 {
        self.protocol_by_epoch.remove(&epoch).unwrap_or(0)
    }

    /// Protocol fees currently accrued for `epoch`.
    pub fn protocol_accrued(&self, epoch: u64) -> u128 {
        self.protocol_by_epoch.get(&epoch).copied().unwrap_or(0)
    }

    /// Adds an atom wallet fee to `wallet`'s accrual. Returns the new
    /// accrual. A zero amount leaves the book untouched.
    pub fn accrue_wallet(&mut self, wallet: &AccountId, amount: u128) -> Result<u128, FeeError> {
        if amount == 0 {
            return Ok(self.wallet_accrued(wallet));
        }
        let accrual = self.wallet_accruals.entry(wallet.clone()).or_insert(0);
        *accrual = accrual.checked_add(amount).ok_or(FeeError::Overflow {
            current: *accrual,
            delta: amount,
        })?;
        Ok(*accrual)
    }

    /// Drains and returns `wallet`'s accrual. Zero if nothing was ever
    /// accrued.
    pub fn claim_wallet(&mut self, wallet: &AccountId) -> u128 {
        self.wallet_accruals.remove(wallet).unwrap_or(0)
    }

    /// Atom wallet fees currently accrued for `wallet`.
    pub fn wallet_accrued(&self, wallet: &AccountId) -> u128 {
        self.wallet_accruals.get(wallet).copied().unwrap_or(0)
    }

    /// Adds split remainders to the retained dust. Returns the new dust
    /// total.
    pub fn add_dust(&mut self, amount: u128) -> Result<u128, FeeError> {
        self.dust = self.dust.checked_add(amount).ok_or(FeeError::Overflow {
            current: self.dust,
            delta: amount,
        })?;
        Ok(self.dust)
    }

    /// Dust retained so far.
    pub fn dust(&self) -> u128 {
        self.dust
    }

    /// Everything the book holds: protocol buckets, wallet accruals, and
    /// dust. Saturates rather than failing; this is a display aggregate,
    /// not a balance.
    pub fn outstanding(&self) -> u128 {
        let protocol: u128 = self
            .protocol_by_epoch
            .values()
            .fold(0u128, |acc, v| acc.saturating_add(*v));
        let wallets: u128 = self
            .wallet_accruals
            .values()
            .fold(0u128, |acc, v| acc.saturating_add(*v));
        protocol.saturating_add(wallets).saturating_add(self.dust)
    }

    /// Iterates over nonempty protocol buckets. Order is unspecified.
    pub fn iter_protocol(&self) -> impl Iterator<Item = (u64, u128)> + '_ {
        self.protocol_by_epoch.iter().map(|(e, v)| (*e, *v))
    }

    /// Iterates over nonempty wallet accruals. Order is unspecified.
    pub fn iter_wallets(&self) -> impl Iterator<Item = (&AccountId, u128)> {
        self.wallet_accruals.iter().map(|(w, v)| (w, *v))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_accrual_buckets_by_epoch() {
        let mut book = FeeBook::new();
        book.accrue_protocol(3, 100).unwrap();
        book.accrue_protocol(3, 50).unwrap();
        book.accrue_protocol(4, 7).unwrap();
        assert_eq!(book.protocol_accrued(3), 150);
        assert_eq!(book.protocol_accrued(4), 7);
        assert_eq!(book.protocol_accrued(5), 0);
    }

    #[test]
    fn sweep_drains_exactly_one_epoch() {
        let mut book = FeeBook::new();
        book.accrue_protocol(1, 80).unwrap();
        book.accrue_protocol(2, 20).unwrap();
        assert_eq!(book.sweep_protocol(1), 80);
        assert_eq!(book.protocol_accrued(1), 0);
        assert_eq!(book.protocol_accrued(2), 20);
        // A second sweep finds nothing.
        assert_eq!(book.sweep_protocol(1), 0);
    }

    #[test]
    fn wallet_accrual_and_claim() {
        let mut book = FeeBook::new();
        let wallet = AccountId::from("trell1example");
        book.accrue_wallet(&wallet, 30).unwrap();
        book.accrue_wallet(&wallet, 12).unwrap();
        assert_eq!(book.wallet_accrued(&wallet), 42);
        assert_eq!(book.claim_wallet(&wallet), 42);
        assert_eq!(book.wallet_accrued(&wallet), 0);
        assert_eq!(book.claim_wallet(&wallet), 0);
    }

    #[test]
    fn zero_accruals_create_no_buckets() {
        let mut book = FeeBook::new();
        let wallet = AccountId::from("trell1example");
        book.accrue_protocol(9, 0).unwrap();
        book.accrue_wallet(&wallet, 0).unwrap();
        assert_eq!(book.iter_protocol().count(), 0);
        assert_eq!(book.iter_wallets().count(), 0);
    }

    #[test]
    fn dust_only_grows() {
        let mut book = FeeBook::new();
        book.add_dust(2).unwrap();
        book.add_dust(1).unwrap();
        assert_eq!(book.dust(), 3);
    }

    #[test]
    fn overflow_reported_with_context() {
        let mut book = FeeBook::new();
        book.accrue_protocol(0, u128::MAX).unwrap();
        assert_eq!(
            book.accrue_protocol(0, 1),
            Err(FeeError::Overflow {
                current: u128::MAX,
                delta: 1
            })
        );
    }

    #[test]
    fn outstanding_sums_all_holdings() {
        let mut book = FeeBook::new();
        let wallet = AccountId::from("trell1example");
        book.accrue_protocol(1, 100).unwrap();
        book.accrue_protocol(2, 200).unwrap();
        book.accrue_wallet(&wallet, 50).unwrap();
        book.add_dust(5).unwrap();
        assert_eq!(book.outstanding(), 355);
    }

    #[test]
    fn serde_roundtrip() {
        let mut book = FeeBook::new();
        book.accrue_protocol(7, 11).unwrap();
        book.accrue_wallet(&AccountId::from("trell1w"), 13).unwrap();
        book.add_dust(1).unwrap();

        let json = serde_json::to_string(&book).unwrap();
        let back: FeeBook = serde_json::from_str(&json).unwrap();
        assert_eq!(back, book);
    }
}
