//! # Epoch Source
//!
//! Epochs are externally-advanced time buckets: protocol fees accrue into
//! the epoch they were charged in, and utilization is tracked per epoch.
//! The ledger never decides when an epoch ends — it asks an [`EpochSource`]
//! at operation time and trusts the answer to be monotone.
//!
//! Two implementations ship with the crate: [`ManualEpochSource`], advanced
//! explicitly (tests, scripted replays), and [`IntervalEpochSource`], which
//! derives the epoch from wall-clock time against a genesis instant.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Errors from epoch source construction.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EpochError {
    /// An interval of zero seconds would make every instant its own epoch.
    #[error("epoch interval must be nonzero")]
    ZeroInterval,
}

/// Supplies the current epoch number.
///
/// Contract: the returned value is monotone non-decreasing across calls.
/// The ledger reads it once per operation, so a bump between two operations
/// is fine; a decrease is not.
pub trait EpochSource: Send + Sync {
    /// The current epoch.
    fn current_epoch(&self) -> u64;
}

// ---------------------------------------------------------------------------
// ManualEpochSource
// ---------------------------------------------------------------------------

/// An explicitly-driven epoch counter.
///
/// Interior mutability lets a test or replay harness keep a handle to the
/// source while the engine holds another, advancing epochs between
/// operations without threading `&mut` access through the engine.
#[derive(Debug, Default)]
pub struct ManualEpochSource {
    epoch: AtomicU64,
}

impl ManualEpochSource {
    /// Starts at the given epoch.
    pub fn starting_at(epoch: u64) -> Self {
        Self {
            epoch: AtomicU64::new(epoch),
        }
    }

    /// Moves to the given epoch. Attempts to move backwards are ignored —
    /// the trait contract is monotone.
    pub fn set(&self, epoch: u64) {
        self.epoch.fetch_max(epoch, Ordering::SeqCst);
    }

    /// Advances by one epoch and returns the new value.
    pub fn advance(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl EpochSource for ManualEpochSource {
    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// IntervalEpochSource
// ---------------------------------------------------------------------------

/// Wall-clock epochs: epoch `n` covers `[genesis + n·interval, genesis +
/// (n+1)·interval)`. Instants before genesis report epoch 0.
#[derive(Debug, Clone)]
pub struct IntervalEpochSource {
    genesis: DateTime<Utc>,
    interval_secs: u64,
}

impl IntervalEpochSource {
    /// Creates a source with the given genesis instant and interval.
    ///
    /// # Errors
    ///
    /// [`EpochError::ZeroInterval`] if `interval_secs == 0`.
    pub fn new(genesis: DateTime<Utc>, interval_secs: u64) -> Result<Self, EpochError> {
        if interval_secs == 0 {
            return Err(EpochError::ZeroInterval);
        }
        Ok(Self {
            genesis,
            interval_secs,
        })
    }

    /// The epoch containing `instant`.
    pub fn epoch_at(&self, instant: DateTime<Utc>) -> u64 {
        let elapsed = instant.signed_duration_since(self.genesis).num_seconds();
        if elapsed <= 0 {
            return 0;
        }
        elapsed as u64 / self.interval_secs
    }
}

impl EpochSource for IntervalEpochSource {
    fn current_epoch(&self) -> u64 {
        self.epoch_at(Utc::now())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
