//! # Fee Schedule
//!
//! The five protocol fee rates, each expressed in basis points of the raw
//! deposit or redemption amount. Every fee is computed on the *same* base —
//! fees never compound on each other — and every fee rounds up, so the
//! protocol never undercollects by a fractional mote.

use serde::{Deserialize, Serialize};

use crate::config::{
    ConfigError, DEFAULT_ATOM_DEPOSIT_FRACTION_BPS, DEFAULT_ATOM_WALLET_FEE_BPS,
    DEFAULT_ENTRY_FEE_BPS, DEFAULT_EXIT_FEE_BPS, DEFAULT_PROTOCOL_FEE_BPS, FEE_DENOMINATOR,
    MAX_FEE_BPS,
};
use crate::math::{mul_div_ceil, MathError};

/// Basis-point rates for every fee the ledger charges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Charged on deposits, routed into the term's default-curve vault as
    /// assets with no shares minted.
    pub entry_bps: u64,

    /// Charged on redemptions, routed the same way as the entry fee.
    pub exit_bps: u64,

    /// Charged on both deposits and redemptions, accrued to the current
    /// epoch's protocol bucket.
    pub protocol_bps: u64,

    /// Charged on deposits into atom vaults, accrued to the atom's wallet.
    pub atom_wallet_bps: u64,

    /// Carved out of deposits into triple vaults and split across the three
    /// constituent atoms' vaults on the same curve.
    pub deposit_fraction_bps: u64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            entry_bps: DEFAULT_ENTRY_FEE_BPS,
            exit_bps: DEFAULT_EXIT_FEE_BPS,
            protocol_bps: DEFAULT_PROTOCOL_FEE_BPS,
            atom_wallet_bps: DEFAULT_ATOM_WALLET_FEE_BPS,
            deposit_fraction_bps: DEFAULT_ATOM_DEPOSIT_FRACTION_BPS,
        }
    }
}

impl FeeSchedule {
    /// Checks every rate against [`MAX_FEE_BPS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, bps) in [
            ("entry", self.entry_bps),
            ("exit", self.exit_bps),
            ("protocol", self.protocol_bps),
            ("atom_wallet", self.atom_wallet_bps),
            ("deposit_fraction", self.deposit_fraction_bps),
        ] {
            if bps > MAX_FEE_BPS {
                return Err(ConfigError::FeeAboveCap {
                    name,
                    bps,
                    max: MAX_FEE_BPS,
                });
            }
        }
        Ok(())
    }

    /// Entry fee on a deposit of `assets`, rounded up.
    pub fn entry_fee(&self, assets: u128) -> Result<u128, MathError> {
        fee_on(assets, self.entry_bps)
    }

    /// Exit fee on a redemption worth `assets`, rounded up.
    pub fn exit_fee(&self, assets: u128) -> Result<u128, MathError> {
        fee_on(assets, self.exit_bps)
    }

    /// Protocol fee on a flow of `assets`, rounded up.
    pub fn protocol_fee(&self, assets: u128) -> Result<u128, MathError> {
        fee_on(assets, self.protocol_bps)
    }

    /// Atom wallet fee on a deposit of `assets`, rounded up.
    pub fn atom_wallet_fee(&self, assets: u128) -> Result<u128, MathError> {
        fee_on(assets, self.atom_wallet_bps)
    }

    /// Atom deposit fraction carved out of a triple deposit of `assets`,
    /// rounded up. The three-way split happens at routing time, not here.
    pub fn deposit_fraction(&self, assets: u128) -> Result<u128, MathError> {
        fee_on(assets, self.deposit_fraction_bps)
    }
}

fn fee_on(assets: u128, bps: u64) -> Result<u128, MathError> {
    if bps == 0 {
        return Ok(0);
    }
    mul_div_ceil(assets, bps as u128, FEE_DENOMINATOR)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
