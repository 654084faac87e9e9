//! Orchestrator error type.
//!
//! Three categories, checked in a fixed order: authorization first, then
//! input validation, then economic validation. Component errors pass through
//! transparently so callers can match on the precise failure.

use thiserror::Error;

use crate::accounts::AccountId;
use crate::approvals::ApprovalError;
use crate::config::ConfigError;
use crate::curves::CurveError;
use crate::fees::FeeError;
use crate::math::MathError;
use crate::terms::{TermError, TermId};
use crate::utilization::UtilizationError;
use crate::vaults::VaultError;

/// Shorthand for orchestrator results.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything a vault operation can fail with.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // -- authorization ------------------------------------------------------
    /// The ledger is paused; mutating entry points are closed.
    #[error("ledger is paused")]
    Paused,

    /// The caller lacks the capability this operation requires.
    #[error("account {account} is not authorized for this operation")]
    Unauthorized {
        /// The rejected caller.
        account: AccountId,
    },

    /// The sender holds no grant covering this operation on the receiver's
    /// positions.
    #[error("sender {sender} is not approved to act for {receiver}")]
    SenderNotApproved {
        /// The principal whose positions would change.
        receiver: AccountId,
        /// The rejected delegate.
        sender: AccountId,
    },

    // -- input validation ---------------------------------------------------
    /// Parallel batch arrays differ in length.
    #[error("batch arrays differ in length: {left} vs {right}")]
    ArrayLengthMismatch {
        /// Length of the first array.
        left: usize,
        /// Length of the mismatched array.
        right: usize,
    },

    /// A batch is empty or larger than the batch cap.
    #[error("batch of {len} elements is outside the allowed 1..={max}")]
    ArraySizeOutOfBounds {
        /// The offending batch length.
        len: usize,
        /// The configured cap.
        max: usize,
    },

    /// A redeem of zero shares.
    #[error("cannot redeem zero shares")]
    ZeroShares,

    /// The amount does not fit the signed utilization range.
    #[error("amount {amount} exceeds the signed accounting range")]
    AmountTooLarge {
        /// The offending amount.
        amount: u128,
    },

    // -- economic validation ------------------------------------------------
    /// The payment does not cover the fixed creation cost.
    #[error("assets {provided} do not cover the creation cost {required}")]
    InsufficientAssets {
        /// What the caller paid.
        provided: u128,
        /// The fixed cost of the term being created.
        required: u128,
    },

    /// Bare deposits may not bootstrap a default-curve vault; only the
    /// creation path may, so the fixed creation cost cannot be bypassed.
    #[error("default-curve vault for {term} must be bootstrapped via create")]
    DefaultCurveMustBootstrapViaCreate {
        /// The term whose default-curve vault is uninitialized.
        term: TermId,
    },

    /// The deposit is too small to fund the ghost-share floor of a new
    /// vault with anything left over.
    #[error("deposit of {provided} does not exceed the {floor_cost} floor cost")]
    DepositBelowFloor {
        /// What the caller offered.
        provided: u128,
        /// The floor cost for this vault type.
        floor_cost: u128,
    },

    /// The deposit is below the configured minimum.
    #[error("deposit of {provided} is below the {min} minimum")]
    DepositBelowMinimum {
        /// What the caller offered.
        provided: u128,
        /// The configured minimum deposit.
        min: u128,
    },

    /// The receiver already holds shares on the opposite side of this
    /// triple on the same curve.
    #[error("{receiver} already stakes the opposite side ({opposite}) on this curve")]
    HasCounterStake {
        /// The principal with the conflicting position.
        receiver: AccountId,
        /// The opposing triple-family term they hold.
        opposite: TermId,
    },

    /// The burn would leave the vault's total shares under the floor.
    #[error("redeem would leave {remaining} total shares, below the {floor} floor")]
    RemainingBelowFloor {
        /// Total shares that would remain after the burn.
        remaining: u128,
        /// The floor that remainder violates.
        floor: u128,
    },

    /// The operation produced less than the caller's stated minimum.
    #[error("output {actual} is below the requested minimum {min}")]
    SlippageExceeded {
        /// Shares minted (deposit) or net assets (redeem).
        actual: u128,
        /// The caller's minimum.
        min: u128,
    },

    /// The deposit would push the vault past the curve's asset capacity.
    #[error("vault assets would reach {resulting}, above the curve cap {max}")]
    ExceedsMaxAssets {
        /// Post-deposit total assets.
        resulting: u128,
        /// The curve's cap.
        max: u128,
    },

    /// The deposit would push the vault past the curve's share capacity.
    #[error("vault shares would reach {resulting}, above the curve cap {max}")]
    ExceedsMaxShares {
        /// Post-deposit total shares.
        resulting: u128,
        /// The curve's cap.
        max: u128,
    },

    // -- component passthrough ----------------------------------------------
    /// Term registry failure.
    #[error(transparent)]
    Term(#[from] TermError),

    /// Vault book failure.
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// Curve resolution or pricing failure.
    #[error(transparent)]
    Curve(#[from] CurveError),

    /// Fixed-point arithmetic failure.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Fee accrual failure.
    #[error(transparent)]
    Fee(#[from] FeeError),

    /// Utilization recording or query failure.
    #[error(transparent)]
    Utilization(#[from] UtilizationError),

    /// Approval registry failure.
    #[error(transparent)]
    Approval(#[from] ApprovalError),

    /// Configuration validation failure.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
