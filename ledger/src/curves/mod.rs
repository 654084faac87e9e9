//! # Bonding Curves — Pluggable Share Pricing
//!
//! A bonding curve decides how assets convert to shares and back for a
//! vault. The ledger never assumes a particular curve shape: it holds only a
//! [`CurveId`] per vault and dispatches through the [`CurveRegistry`] at
//! operation time, so pricing strategies can be added without touching vault
//! state.
//!
//! What the ledger *does* require of every implementation:
//!
//! - **Monotonicity** — more assets in never means fewer shares out, and
//!   vice versa.
//! - **Approximate inversion** — `preview_deposit` and `preview_redeem`
//!   round against the caller (down), so a deposit/redeem round trip at an
//!   unchanged vault state never produces more assets than went in.
//! - **Declared capacity** — each curve exposes the maximum total assets and
//!   shares a vault priced by it may hold; deposits that would cross either
//!   cap are rejected before any state changes.
//!
//! ```text
//! linear.rs — pro-rata pricing: share price follows assets/shares exactly
//! ```

pub mod linear;

pub use linear::LinearCurve;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::math::MathError;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from curve lookup and pricing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurveError {
    /// No curve is registered under the given id.
    #[error("no curve registered under id {curve}")]
    UnknownCurve {
        /// The id that failed to resolve.
        curve: CurveId,
    },

    /// Attempted to register a second curve under an id already in use.
    #[error("curve id {curve} is already registered")]
    AlreadyRegistered {
        /// The contested id.
        curve: CurveId,
    },

    /// Arithmetic failure inside a pricing computation.
    #[error(transparent)]
    Math(#[from] MathError),
}

// ---------------------------------------------------------------------------
// CurveId
// ---------------------------------------------------------------------------

/// Identifier of a registered bonding curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurveId(u64);

impl CurveId {
    /// Wraps a raw curve number.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw curve number.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CurveId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// BondingCurve
// ---------------------------------------------------------------------------

/// A pluggable pricing strategy.
///
/// All methods take the vault's current totals explicitly — curve
/// implementations are stateless with respect to individual vaults, which is
/// what lets one curve instance price every vault that references its id.
pub trait BondingCurve: Send + Sync {
    /// Short human-readable strategy name for logs and the explorer.
    fn name(&self) -> &'static str;

    /// Shares minted for depositing `assets` into a vault at the given
    /// totals. Rounds down.
    fn preview_deposit(
        &self,
        assets: u128,
        total_assets: u128,
        total_shares: u128,
    ) -> Result<u128, CurveError>;

    /// Assets returned for burning `shares` at the given totals. Rounds
    /// down.
    fn preview_redeem(
        &self,
        shares: u128,
        total_assets: u128,
        total_shares: u128,
    ) -> Result<u128, CurveError>;

    /// Assets required to mint exactly `shares` at the given totals. Rounds
    /// up — the inverse direction of [`preview_deposit`](Self::preview_deposit).
    fn preview_mint(
        &self,
        shares: u128,
        total_assets: u128,
        total_shares: u128,
    ) -> Result<u128, CurveError>;

    /// Current price in asset motes per [`SHARE_PRICE_SCALE`] shares.
    ///
    /// [`SHARE_PRICE_SCALE`]: crate::config::SHARE_PRICE_SCALE
    fn current_price(&self, total_assets: u128, total_shares: u128) -> Result<u128, CurveError>;

    /// Maximum total assets a vault priced by this curve may hold.
    fn max_assets(&self) -> u128;

    /// Maximum total shares a vault priced by this curve may issue.
    fn max_shares(&self) -> u128;
}

// ---------------------------------------------------------------------------
// CurveRegistry
// ---------------------------------------------------------------------------

/// The id → strategy table consulted on every priced operation.
///
/// Kept outside the snapshot-able ledger state: user operations never mutate
/// it, only the admin surface does.
#[derive(Default)]
pub struct CurveRegistry {
    curves: BTreeMap<CurveId, Box<dyn BondingCurve>>,
}

impl CurveRegistry {
    /// An empty registry. Useless until at least one curve is registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard registry: a [`LinearCurve`] without caps under
    /// [`DEFAULT_CURVE_ID`](crate::config::DEFAULT_CURVE_ID).
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register(
                CurveId::new(crate::config::DEFAULT_CURVE_ID),
                Box::new(LinearCurve::uncapped()),
            )
            .expect("empty registry accepts the first curve");
        registry
    }

    /// Registers a curve under an unused id.
    ///
    /// # Errors
    ///
    /// [`CurveError::AlreadyRegistered`] if the id is taken. Replacing a
    /// live curve out from under existing vaults is never allowed — swap the
    /// whole registry instead.
    pub fn register(
        &mut self,
        id: CurveId,
        curve: Box<dyn BondingCurve>,
    ) -> Result<(), CurveError> {
        if self.curves.contains_key(&id) {
            return Err(CurveError::AlreadyRegistered { curve: id });
        }
        self.curves.insert(id, curve);
        Ok(())
    }

    /// Resolves a curve by id.
    pub fn get(&self, id: CurveId) -> Result<&dyn BondingCurve, CurveError> {
        self.curves
            .get(&id)
            .map(|c| c.as_ref())
            .ok_or(CurveError::UnknownCurve { curve: id })
    }

    /// Whether an id resolves.
    pub fn contains(&self, id: CurveId) -> bool {
        self.curves.contains_key(&id)
    }

    /// All registered ids, ascending.
    pub fn ids(&self) -> Vec<CurveId> {
        self.curves.keys().copied().collect()
    }

    /// Number of registered curves.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

impl fmt::Debug for CurveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .curves
            .iter()
            .map(|(id, c)| format!("{} => {}", id, c.name()))
            .collect();
        write!(f, "CurveRegistry({})", entries.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
