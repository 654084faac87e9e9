//! # Ledger Configuration & Constants
//!
//! Every magic number in Trellis lives here. If you are hardcoding a
//! constant somewhere else, you are doing it wrong.
//!
//! Two kinds of values coexist in this module:
//!
//! - **Protocol constants** — compile-time facts of the ledger (the fee
//!   denominator, the fee cap, batch limits). These are not tunable; changing
//!   them changes the protocol.
//! - **[`LedgerConfig`]** — deployment-time tunables (fee rates, floors,
//!   thresholds, the admin and treasury accounts). Admin operations may
//!   adjust most of these at runtime, always within the caps enforced by
//!   [`LedgerConfig::validate`].
//!
//! Past epochs are never reinterpreted when a tunable changes: fee accruals
//! and utilization records are keyed by the epoch they happened in, so a
//! parameter change affects only operations from that point forward.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::accounts::AccountId;
use crate::curves::CurveId;
use crate::fees::FeeSchedule;

// ---------------------------------------------------------------------------
// Protocol Identity
// ---------------------------------------------------------------------------

/// Protocol family name, used in log lines and the explorer banner.
pub const PROTOCOL_NAME: &str = "trellis";

/// Ledger semantic version.
pub const LEDGER_VERSION: &str = "0.1.0";

/// Bech32 human-readable prefix for derived atom-wallet addresses.
pub const WALLET_HRP: &str = "trell";

// ---------------------------------------------------------------------------
// Denominations
// ---------------------------------------------------------------------------

/// Smallest-unit scale: 1 TRL = 10^18 motes. All `u128` amounts in the
/// ledger are motes. The protocol never divides for display purposes.
pub const ONE_TRL: u128 = 1_000_000_000_000_000_000;

/// Share prices are expressed as motes per 10^18 shares.
pub const SHARE_PRICE_SCALE: u128 = 1_000_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Fee Parameters
// ---------------------------------------------------------------------------

/// Basis-point denominator: a rate of 10_000 bps is 100%.
pub const FEE_DENOMINATOR: u128 = 10_000;

/// Hard cap on every individual fee rate: 1_000 bps = 10%. Admin setters
/// reject anything above this, so no parameter change can confiscate a
/// deposit outright.
pub const MAX_FEE_BPS: u64 = 1_000;

/// Default entry fee: 0.5%.
pub const DEFAULT_ENTRY_FEE_BPS: u64 = 50;

/// Default exit fee: 0.5%.
pub const DEFAULT_EXIT_FEE_BPS: u64 = 50;

/// Default protocol fee: 1%.
pub const DEFAULT_PROTOCOL_FEE_BPS: u64 = 100;

/// Default atom-wallet deposit fee: 0.25%.
pub const DEFAULT_ATOM_WALLET_FEE_BPS: u64 = 25;

/// Default atom-deposit-fraction rate for triple deposits: 3%.
pub const DEFAULT_ATOM_DEPOSIT_FRACTION_BPS: u64 = 300;

// ---------------------------------------------------------------------------
// Vault Parameters
// ---------------------------------------------------------------------------

/// The curve id every term gets a vault for at creation time.
pub const DEFAULT_CURVE_ID: u64 = 1;

/// Default ghost-share floor: the asset amount locked under the burn holder
/// when a vault bootstraps. Small enough to be economic dust, large enough
/// that share math near the floor stays well-conditioned.
pub const DEFAULT_MIN_SHARE: u128 = 1_000_000;

/// Default minimum deposit accepted by the deposit entry points.
/// Creation-path excess is exempt — the fixed creation cost is the gate there.
pub const DEFAULT_MIN_DEPOSIT: u128 = 1_000_000;

/// Default static fee charged on atom creation, accrued to the current
/// epoch's protocol bucket.
pub const DEFAULT_ATOM_STATIC_FEE: u128 = 2_000_000;

/// Default static fee charged on triple creation.
pub const DEFAULT_TRIPLE_STATIC_FEE: u128 = 3_000_000;

/// Default share threshold (on a term's default-curve vault) below which
/// entry/exit fees are waived and above which atom-deposit-fraction fees
/// activate.
pub const DEFAULT_FEE_THRESHOLD: u128 = ONE_TRL;

/// Default cap on atom payload length in bytes.
pub const DEFAULT_MAX_ATOM_PAYLOAD: usize = 250;

// ---------------------------------------------------------------------------
// Batch Limits
// ---------------------------------------------------------------------------

/// Maximum number of elements accepted by any batch entry point.
pub const MAX_BATCH_SIZE: usize = 256;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from configuration validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A fee rate exceeds [`MAX_FEE_BPS`].
    #[error("{name} fee of {bps} bps exceeds the {max} bps cap")]
    FeeAboveCap {
        /// Which fee knob was out of range.
        name: &'static str,
        /// The offending rate.
        bps: u64,
        /// The cap it violated.
        max: u64,
    },

    /// The ghost-share floor must be nonzero or vaults could be drained out
    /// of existence.
    #[error("min_share must be nonzero")]
    ZeroMinShare,

    /// A zero payload cap would make every atom creation fail.
    #[error("max_atom_payload_len must be nonzero")]
    ZeroPayloadCap,

    /// The configured static fees and floor are so large their sum does not
    /// fit in a u128.
    #[error("creation cost overflows u128")]
    CostOverflow,
}

// ---------------------------------------------------------------------------
// LedgerConfig
// ---------------------------------------------------------------------------

/// Deployment-time tunables for a [`MultiVault`](crate::MultiVault) instance.
///
/// Constructed once at engine creation and mutated only through the admin
/// surface, which re-checks the same bounds [`validate`](Self::validate)
/// enforces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Holder of the administrative capability. The only account allowed to
    /// pause, tune fees, or sweep protocol accruals.
    pub admin: AccountId,

    /// Destination of swept protocol fees.
    pub treasury: AccountId,

    /// The curve every term gets a vault for at creation time, and the vault
    /// fee routing and threshold checks are keyed against.
    pub default_curve_id: CurveId,

    /// Ghost-share floor in asset motes. Locked under the burn holder at
    /// every vault bootstrap; no redemption may take a vault's total shares
    /// below the share equivalent of this amount.
    pub min_share: u128,

    /// Minimum amount accepted by the deposit entry points.
    pub min_deposit: u128,

    /// Share threshold on a term's default-curve vault that gates the
    /// entry/exit fee waiver and the atom-deposit-fraction fee.
    pub fee_threshold: u128,

    /// Fixed fee charged on atom creation (protocol accrual).
    pub atom_static_fee: u128,

    /// Fixed fee charged on triple creation (protocol accrual).
    pub triple_static_fee: u128,

    /// Maximum accepted atom payload length in bytes.
    pub max_atom_payload_len: usize,

    /// The five basis-point fee rates.
    pub fees: FeeSchedule,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            admin: AccountId::from("sys:admin"),
            treasury: AccountId::from("sys:treasury"),
            default_curve_id: CurveId::new(DEFAULT_CURVE_ID),
            min_share: DEFAULT_MIN_SHARE,
            min_deposit: DEFAULT_MIN_DEPOSIT,
            fee_threshold: DEFAULT_FEE_THRESHOLD,
            atom_static_fee: DEFAULT_ATOM_STATIC_FEE,
            triple_static_fee: DEFAULT_TRIPLE_STATIC_FEE,
            max_atom_payload_len: DEFAULT_MAX_ATOM_PAYLOAD,
            fees: FeeSchedule::default(),
        }
    }
}

impl LedgerConfig {
    /// Checks every tunable against its protocol bound.
    ///
    /// # Errors
    ///
    /// See [`ConfigError`] — fee caps, nonzero floor, nonzero payload cap,
    /// and creation costs that fit in a u128.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fees.validate()?;
        if self.min_share == 0 {
            return Err(ConfigError::ZeroMinShare);
        }
        if self.max_atom_payload_len == 0 {
            return Err(ConfigError::ZeroPayloadCap);
        }
        if self.atom_static_fee.checked_add(self.min_share).is_none() {
            return Err(ConfigError::CostOverflow);
        }
        let double_floor = self
            .min_share
            .checked_mul(2)
            .ok_or(ConfigError::CostOverflow)?;
        if self.triple_static_fee.checked_add(double_floor).is_none() {
            return Err(ConfigError::CostOverflow);
        }
        Ok(())
    }

    /// The fixed cost of creating an atom: the static fee plus one
    /// ghost-share floor for the default-curve vault.
    pub fn atom_cost(&self) -> u128 {
        self.atom_static_fee.saturating_add(self.min_share)
    }

    /// The fixed cost of creating a triple: the static fee plus two
    /// ghost-share floors — the counter-triple's default-curve vault is
    /// bootstrapped in the same call.
    pub fn triple_cost(&self) -> u128 {
        self.triple_static_fee
            .saturating_add(self.min_share.saturating_mul(2))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        LedgerConfig::default().validate().expect("defaults valid");
    }

    #[test]
    fn default_rates_are_below_cap() {
        assert!(DEFAULT_ENTRY_FEE_BPS <= MAX_FEE_BPS);
        assert!(DEFAULT_EXIT_FEE_BPS <= MAX_FEE_BPS);
        assert!(DEFAULT_PROTOCOL_FEE_BPS <= MAX_FEE_BPS);
        assert!(DEFAULT_ATOM_WALLET_FEE_BPS <= MAX_FEE_BPS);
        assert!(DEFAULT_ATOM_DEPOSIT_FRACTION_BPS <= MAX_FEE_BPS);
    }

    #[test]
    fn zero_min_share_rejected() {
        let config = LedgerConfig {
            min_share: 0,
            ..LedgerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMinShare));
    }

    #[test]
    fn zero_payload_cap_rejected() {
        let config = LedgerConfig {
            max_atom_payload_len: 0,
            ..LedgerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPayloadCap));
    }

    #[test]
    fn creation_costs_include_floors() {
        let config = LedgerConfig::default();
        assert_eq!(
            config.atom_cost(),
            DEFAULT_ATOM_STATIC_FEE + DEFAULT_MIN_SHARE
        );
        assert_eq!(
            config.triple_cost(),
            DEFAULT_TRIPLE_STATIC_FEE + 2 * DEFAULT_MIN_SHARE
        );
    }

    #[test]
    fn absurd_costs_rejected() {
        let config = LedgerConfig {
            atom_static_fee: u128::MAX,
            min_share: 1,
            ..LedgerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::CostOverflow));
    }

    #[test]
    fn max_fee_is_ten_percent() {
        assert_eq!(MAX_FEE_BPS as u128 * 10, FEE_DENOMINATOR);
    }
}
