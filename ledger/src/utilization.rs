//! # Utilization Tracker
//!
//! Signed, epoch-scoped net-stake accounting: deposits push an account's
//! utilization up, redemptions push it down, and an external rewards
//! component reads the result per epoch. Tracked at two levels:
//!
//! - a **global** total per epoch, and
//! - a **personal** total per `(account, epoch)`, paired with a three-slot
//!   most-recent-first ring of the epochs the account was active in.
//!
//! ## Rollover
//!
//! Utilization is a running net position, so crossing an epoch boundary
//! must not reset it. The first write in a new epoch copies the previous
//! total forward before applying its delta:
//!
//! ```text
//!   epoch:      4          5          6
//!   global:   +700   →   (copy 700) +50 = 750        gap epochs copy
//!   personal: +700   →      —       →  (copy 700) -100 = 600
//!                                       ^ ring head was 4, not 5
//! ```
//!
//! The global copy looks exactly one epoch back; the personal copy follows
//! the account's ring head, however far back that is. A copy never lands on
//! a slot that already holds a nonzero value.
//!
//! ## Why a three-slot ring
//!
//! "Utilization as of epoch E" must be answerable without scanning
//! unbounded history. The ring records the account's three most recent
//! active epochs, newest first, and the query walks those three slots for
//! the newest one at or before E. Anything older than the ring is
//! unanswerable and reported as such.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::accounts::AccountId;

/// Slots in each account's recent-epoch ring.
pub const EPOCH_RING_SLOTS: usize = 3;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from utilization recording and queries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UtilizationError {
    /// Queried an epoch beyond the current one.
    #[error("epoch {requested} is in the future (current epoch {current})")]
    FutureEpoch {
        /// The epoch the query asked about.
        requested: u64,
        /// The epoch the ledger is currently in.
        current: u64,
    },

    /// The account has no tracked epoch at or before the queried one.
    #[error("no tracked utilization epoch at or before {epoch}")]
    EpochNotTracked {
        /// The epoch the query asked about.
        epoch: u64,
    },

    /// A signed accumulator would leave the `i128` range.
    #[error("utilization overflow: current {current}, delta {delta}")]
    Overflow {
        /// The accumulator value before the failed update.
        current: i128,
        /// The delta that caused the overflow.
        delta: i128,
    },
}

// ---------------------------------------------------------------------------
// EpochRing
// ---------------------------------------------------------------------------

/// Fixed ring of an account's most recent active epochs, newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochRing {
    slots: [u64; EPOCH_RING_SLOTS],
    len: usize,
}

impl EpochRing {
    /// The most recent tracked epoch, if any.
    pub fn head(&self) -> Option<u64> {
        (self.len > 0).then(|| self.slots[0])
    }

    /// The tracked epochs, newest first.
    pub fn epochs(&self) -> &[u64] {
        &self.slots[..self.len]
    }

    /// Makes `epoch` the head, shifting older entries down and dropping the
    /// oldest once the ring is full. No-op if `epoch` is already the head.
    fn note(&mut self, epoch: u64) {
        if self.head() == Some(epoch) {
            return;
        }
        for i in (1..EPOCH_RING_SLOTS).rev() {
            self.slots[i] = self.slots[i - 1];
        }
        self.slots[0] = epoch;
        self.len = (self.len + 1).min(EPOCH_RING_SLOTS);
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// One account's utilization state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct AccountUtilization {
    ring: EpochRing,
    by_epoch: BTreeMap<u64, i128>,
}

/// Global and per-account utilization accumulators.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilizationTracker {
    total_by_epoch: BTreeMap<u64, i128>,
    accounts: HashMap<AccountId, AccountUtilization>,
}

impl UtilizationTracker {
    /// An empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a signed net-stake delta for `account` in `epoch`, running
    /// rollover first if this is the first write of the epoch. All values
    /// are computed before anything is written, so a failed update leaves
    /// the tracker untouched.
    pub fn record(
        &mut self,
        account: &AccountId,
        epoch: u64,
        delta: i128,
    ) -> Result<(), UtilizationError> {
        // Global: copy the adjacent previous epoch forward into a still-zero
        // slot, then apply the delta.
        let global_current = self.total_at(epoch);
        let global_base = if global_current == 0 && epoch > 0 {
            self.total_at(epoch - 1)
        } else {
            global_current
        };
        let new_global = global_base.checked_add(delta).ok_or(UtilizationError::Overflow {
            current: global_base,
            delta,
        })?;

        // Personal: copy forward from the ring head when the head is an
        // older epoch and this epoch's slot is still zero.
        let state = self.accounts.get(account);
        let head = state.and_then(|s| s.ring.head());
        let personal_current = state
            .and_then(|s| s.by_epoch.get(&epoch).copied())
            .unwrap_or(0);
        let personal_base = if head != Some(epoch) && personal_current == 0 {
            head.and_then(|h| state.and_then(|s| s.by_epoch.get(&h).copied()))
                .unwrap_or(0)
        } else {
            personal_current
        };
        let new_personal = personal_base
            .checked_add(delta)
            .ok_or(UtilizationError::Overflow {
                current: personal_base,
                delta,
            })?;

        self.total_by_epoch.insert(epoch, new_global);
        let state = self.accounts.entry(account.clone()).or_default();
        state.by_epoch.insert(epoch, new_personal);
        state.ring.note(epoch);
        Ok(())
    }

    /// The global utilization total for `epoch`, zero if never written.
    pub fn total_at(&self, epoch: u64) -> i128 {
        self.total_by_epoch.get(&epoch).copied().unwrap_or(0)
    }

    /// An account's raw per-epoch value, zero if never written. Does not
    /// consult the ring; see [`as_of`](Self::as_of) for the bounded query.
    pub fn personal_at(&self, account: &AccountId, epoch: u64) -> i128 {
        self.accounts
            .get(account)
            .and_then(|s| s.by_epoch.get(&epoch).copied())
            .unwrap_or(0)
    }

    /// An account's utilization as of `epoch`: the value at the newest
    /// ring-tracked epoch at or before the queried one.
    ///
    /// # Errors
    ///
    /// [`UtilizationError::FutureEpoch`] if `epoch > current_epoch`;
    /// [`UtilizationError::EpochNotTracked`] if every ring slot is newer
    /// than the query, or the account has never acted.
    pub fn as_of(
        &self,
        account: &AccountId,
        epoch: u64,
        current_epoch: u64,
    ) -> Result<i128, UtilizationError> {
        if epoch > current_epoch {
            return Err(UtilizationError::FutureEpoch {
                requested: epoch,
                current: current_epoch,
            });
        }
        let state = self
            .accounts
            .get(account)
            .ok_or(UtilizationError::EpochNotTracked { epoch })?;
        for &tracked in state.ring.epochs() {
            if tracked <= epoch {
                return Ok(state.by_epoch.get(&tracked).copied().unwrap_or(0));
            }
        }
        Err(UtilizationError::EpochNotTracked { epoch })
    }

    /// An account's recent-epoch ring, newest first. Empty if the account
    /// has never acted.
    pub fn ring_of(&self, account: &AccountId) -> &[u64] {
        self.accounts
            .get(account)
            .map(|s| s.ring.epochs())
            .unwrap_or(&[])
    }

    /// Iterates over global totals in epoch order.
    pub fn iter_totals(&self) -> impl Iterator<Item = (u64, i128)> + '_ {
        self.total_by_epoch.iter().map(|(e, v)| (*e, *v))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountId {
        AccountId::from("alice")
    }

    fn bob() -> AccountId {
        AccountId::from("bob")
    }

    #[test]
    fn first_record_sets_value_and_ring() {
        let mut tracker = UtilizationTracker::new();
        tracker.record(&alice(), 0, 100).unwrap();
        assert_eq!(tracker.total_at(0), 100);
        assert_eq!(tracker.personal_at(&alice(), 0), 100);
        assert_eq!(tracker.ring_of(&alice()), &[0]);
    }

    #[test]
    fn global_rollover_copies_adjacent_epoch() {
        let mut tracker = UtilizationTracker::new();
        tracker.record(&alice(), 4, 700).unwrap();
        tracker.record(&alice(), 5, 50).unwrap();
        assert_eq!(tracker.total_at(5), 750);
        // The old epoch keeps its value.
        assert_eq!(tracker.total_at(4), 700);
    }

    #[test]
    fn global_rollover_does_not_bridge_idle_epochs() {
        let mut tracker = UtilizationTracker::new();
        tracker.record(&alice(), 4, 700).unwrap();
        // Nothing happened in epoch 5, so epoch 6 starts from zero globally.
        tracker.record(&alice(), 6, 50).unwrap();
        assert_eq!(tracker.total_at(6), 50);
    }

    #[test]
    fn personal_rollover_follows_ring_head_across_gaps() {
        let mut tracker = UtilizationTracker::new();
        tracker.record(&alice(), 4, 700).unwrap();
        tracker.record(&alice(), 6, -100).unwrap();
        // Personal copy comes from the ring head (epoch 4), not epoch 5.
        assert_eq!(tracker.personal_at(&alice(), 6), 600);
        assert_eq!(tracker.ring_of(&alice()), &[6, 4]);
    }

    #[test]
    fn second_record_in_epoch_does_not_roll_again() {
        let mut tracker = UtilizationTracker::new();
        tracker.record(&alice(), 0, 100).unwrap();
        tracker.record(&alice(), 1, 10).unwrap();
        tracker.record(&alice(), 1, 10).unwrap();
        assert_eq!(tracker.total_at(1), 120);
        assert_eq!(tracker.personal_at(&alice(), 1), 120);
        assert_eq!(tracker.ring_of(&alice()), &[1, 0]);
    }

    #[test]
    fn accounts_roll_independently() {
        let mut tracker = UtilizationTracker::new();
        tracker.record(&alice(), 0, 100).unwrap();
        tracker.record(&bob(), 0, 40).unwrap();
        tracker.record(&alice(), 1, 1).unwrap();
        // Global rolled 140 forward; only alice's personal value rolled.
        assert_eq!(tracker.total_at(1), 141);
        assert_eq!(tracker.personal_at(&alice(), 1), 101);
        assert_eq!(tracker.personal_at(&bob(), 1), 0);
    }

    #[test]
    fn ring_keeps_three_most_recent() {
        let mut tracker = UtilizationTracker::new();
        for epoch in [1, 2, 3, 4] {
            tracker.record(&alice(), epoch, 10).unwrap();
        }
        assert_eq!(tracker.ring_of(&alice()), &[4, 3, 2]);
    }

    #[test]
    fn as_of_returns_newest_tracked_at_or_before() {
        let mut tracker = UtilizationTracker::new();
        tracker.record(&alice(), 1, 100).unwrap();
        tracker.record(&alice(), 3, 25).unwrap();
        tracker.record(&alice(), 5, -5).unwrap();

        assert_eq!(tracker.as_of(&alice(), 5, 5).unwrap(), 120);
        assert_eq!(tracker.as_of(&alice(), 4, 5).unwrap(), 125);
        assert_eq!(tracker.as_of(&alice(), 1, 5).unwrap(), 100);
    }

    #[test]
    fn as_of_rejects_future_and_untracked() {
        let mut tracker = UtilizationTracker::new();
        tracker.record(&alice(), 3, 10).unwrap();

        assert_eq!(
            tracker.as_of(&alice(), 6, 5),
            Err(UtilizationError::FutureEpoch {
                requested: 6,
                current: 5
            })
        );
        assert_eq!(
            tracker.as_of(&alice(), 2, 5),
            Err(UtilizationError::EpochNotTracked { epoch: 2 })
        );
        assert_eq!(
            tracker.as_of(&bob(), 3, 5),
            Err(UtilizationError::EpochNotTracked { epoch: 3 })
        );
    }

    #[test]
    fn negative_net_positions_are_representable() {
        let mut tracker = UtilizationTracker::new();
        tracker.record(&alice(), 0, 100).unwrap();
        tracker.record(&alice(), 0, -300).unwrap();
        assert_eq!(tracker.total_at(0), -200);
        assert_eq!(tracker.personal_at(&alice(), 0), -200);
    }

    #[test]
    fn overflow_leaves_tracker_untouched() {
        let mut tracker = UtilizationTracker::new();
        tracker.record(&alice(), 0, i128::MAX).unwrap();
        let result = tracker.record(&alice(), 0, 1);
        assert!(matches!(result, Err(UtilizationError::Overflow { .. })));
        assert_eq!(tracker.total_at(0), i128::MAX);
        assert_eq!(tracker.ring_of(&alice()), &[0]);
    }

    #[test]
    fn zero_delta_still_rolls_and_tracks() {
        let mut tracker = UtilizationTracker::new();
        tracker.record(&alice(), 2, 500).unwrap();
        tracker.record(&alice(), 3, 0).unwrap();
        assert_eq!(tracker.total_at(3), 500);
        assert_eq!(tracker.personal_at(&alice(), 3), 500);
        assert_eq!(tracker.ring_of(&alice()), &[3, 2]);
    }

    #[test]
    fn serde_roundtrip() {
        let mut tracker = UtilizationTracker::new();
        tracker.record(&alice(), 1, 100).unwrap();
        tracker.record(&alice(), 2, -30).unwrap();

        let json = serde_json::to_string(&tracker).unwrap();
        let back: UtilizationTracker = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tracker);
    }
}
