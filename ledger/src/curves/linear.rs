//! # Linear Curve — Pro-Rata Pricing
//!
//! The workhorse strategy and the one every term's default-curve vault uses:
//! share price tracks the vault's assets-to-shares ratio exactly. An empty
//! vault prices one share per asset mote; afterwards each depositor gets
//! shares in proportion to the assets they add, and each redeemer gets
//! assets in proportion to the shares they burn.
//!
//! Because entry/exit fees are routed into default-curve vaults as assets
//! *without* minting shares, the ratio — and thus the price existing holders
//! redeem at — drifts upward as fee flow accumulates. That drift is the
//! mechanism by which early stakers of a popular term are rewarded.
//!
//! Rounding follows the module-wide convention: deposit and redeem previews
//! round down (dust stays in the vault), mint previews round up (an exact
//! share count never costs less than its pro-rata value).

use crate::config::SHARE_PRICE_SCALE;
use crate::math::{mul_div_ceil, mul_div_floor};

use super::{BondingCurve, CurveError};

/// Pro-rata pricing with optional capacity caps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinearCurve {
    max_assets: u128,
    max_shares: u128,
}

impl LinearCurve {
    /// A linear curve with explicit capacity caps.
    pub fn new(max_assets: u128, max_shares: u128) -> Self {
        Self {
            max_assets,
            max_shares,
        }
    }

    /// A linear curve with no practical capacity limit.
    pub fn uncapped() -> Self {
        Self::new(u128::MAX, u128::MAX)
    }
}

impl BondingCurve for LinearCurve {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn preview_deposit(
        &self,
        assets: u128,
        total_assets: u128,
        total_shares: u128,
    ) -> Result<u128, CurveError> {
        if total_shares == 0 {
            // Empty vault: one share per mote.
            return Ok(assets);
        }
        Ok(mul_div_floor(assets, total_shares, total_assets)?)
    }

    fn preview_redeem(
        &self,
        shares: u128,
        total_assets: u128,
        total_shares: u128,
    ) -> Result<u128, CurveError> {
        if total_shares == 0 {
            return Ok(0);
        }
        Ok(mul_div_floor(shares, total_assets, total_shares)?)
    }

    fn preview_mint(
        &self,
        shares: u128,
        total_assets: u128,
        total_shares: u128,
    ) -> Result<u128, CurveError> {
        if total_shares == 0 {
            return Ok(shares);
        }
        Ok(mul_div_ceil(shares, total_assets, total_shares)?)
    }

    fn current_price(&self, total_assets: u128, total_shares: u128) -> Result<u128, CurveError> {
        if total_shares == 0 {
            return Ok(SHARE_PRICE_SCALE);
        }
        Ok(mul_div_floor(total_assets, SHARE_PRICE_SCALE, total_shares)?)
    }

    fn max_assets(&self) -> u128 {
        self.max_assets
    }

    fn max_shares(&self) -> u128 {
        self.max_shares
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_vault_prices_one_to_one() {
        let curve = LinearCurve::uncapped();
        assert_eq!(curve.preview_deposit(1_000, 0, 0).unwrap(), 1_000);
        assert_eq!(curve.preview_mint(1_000, 0, 0).unwrap(), 1_000);
        assert_eq!(curve.current_price(0, 0).unwrap(), SHARE_PRICE_SCALE);
    }

    #[test]
    fn deposit_is_pro_rata() {
        let curve = LinearCurve::uncapped();
        // Vault at 2 motes per share: 1000 assets -> 500 shares.
        assert_eq!(curve.preview_deposit(1_000, 2_000, 1_000).unwrap(), 500);
    }

    #[test]
    fn redeem_is_pro_rata() {
        let curve = LinearCurve::uncapped();
        assert_eq!(curve.preview_redeem(500, 2_000, 1_000).unwrap(), 1_000);
        assert_eq!(curve.preview_redeem(1, 0, 1_000).unwrap(), 0);
    }

    #[test]
    fn deposit_preview_rounds_down() {
        let curve = LinearCurve::uncapped();
        // 10 * 3 / 7 = 4.28.. -> 4
        assert_eq!(curve.preview_deposit(10, 7, 3).unwrap(), 4);
    }

    #[test]
    fn mint_preview_rounds_up() {
        let curve = LinearCurve::uncapped();
        // 4 shares at 7/3 motes each: ceil(4 * 7 / 3) = 10
        assert_eq!(curve.preview_mint(4, 7, 3).unwrap(), 10);
    }

    #[test]
    fn round_trip_never_gains() {
        let curve = LinearCurve::uncapped();
        for (ta, ts) in [(1, 1), (7, 3), (1_000, 333), (5, 9)] {
            for assets in [1u128, 2, 10, 99, 1_234] {
                let shares = curve.preview_deposit(assets, ta, ts).unwrap();
                // Redeem against the post-deposit state, as a real round
                // trip would see it.
                let back = curve
                    .preview_redeem(shares, ta + assets, ts + shares)
                    .unwrap();
                assert!(
                    back <= assets,
                    "round trip gained: {} in, {} out (vault {}/{})",
                    assets,
                    back,
                    ta,
                    ts
                );
            }
        }
    }

    #[test]
    fn previews_are_monotone() {
        let curve = LinearCurve::uncapped();
        let (ta, ts) = (10_000, 3_333);
        let mut prev = 0;
        for assets in 0..500u128 {
            let shares = curve.preview_deposit(assets, ta, ts).unwrap();
            assert!(shares >= prev);
            prev = shares;
        }
    }

    #[test]
    fn price_tracks_ratio() {
        let curve = LinearCurve::uncapped();
        let price = curve.current_price(3_000, 1_000).unwrap();
        assert_eq!(price, 3 * SHARE_PRICE_SCALE);
    }

    #[test]
    fn caps_are_reported() {
        let curve = LinearCurve::new(1_000, 2_000);
        assert_eq!(curve.max_assets(), 1_000);
        assert_eq!(curve.max_shares(), 2_000);
    }
}
