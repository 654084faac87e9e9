//! The administrative surface: pause control, parameter tuning, curve
//! registration, and protocol-fee sweeps.
//!
//! Every operation here requires the configured admin account and takes
//! effect immediately for operations from that point forward; accruals
//! already keyed to past epochs are never reinterpreted. Admin calls are
//! deliberately *not* pause-gated — unpausing a paused ledger has to work.
//!
//! Parameter changes pass through the same bounds as
//! [`LedgerConfig::validate`], so the engine can never be steered into a
//! configuration it would have refused at construction.

use tracing::{info, warn};

use crate::accounts::AccountId;
use crate::config::{ConfigError, MAX_FEE_BPS};
use crate::curves::{BondingCurve, CurveError, CurveId, CurveRegistry};
use crate::events::LedgerEvent;

use super::engine::MultiVault;
use super::error::Result;

impl MultiVault {
    fn check_bps(name: &'static str, bps: u64) -> Result<()> {
        if bps > MAX_FEE_BPS {
            return Err(ConfigError::FeeAboveCap {
                name,
                bps,
                max: MAX_FEE_BPS,
            }
            .into());
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Pause control
    // -----------------------------------------------------------------------

    /// Halts every user-facing mutator. Idempotent; the event fires only on
    /// an actual transition.
    pub fn pause(&mut self, caller: &AccountId) -> Result<()> {
        self.ensure_admin(caller)?;
        if !self.paused {
            self.paused = true;
            self.events.push(LedgerEvent::PauseChanged { paused: true });
            warn!("ledger paused");
        }
        Ok(())
    }

    /// Lifts the pause. Idempotent.
    pub fn unpause(&mut self, caller: &AccountId) -> Result<()> {
        self.ensure_admin(caller)?;
        if self.paused {
            self.paused = false;
            self.events.push(LedgerEvent::PauseChanged { paused: false });
            info!("ledger unpaused");
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Fee rates
    // -----------------------------------------------------------------------

    /// Sets the entry fee rate.
    pub fn set_entry_fee_bps(&mut self, caller: &AccountId, bps: u64) -> Result<()> {
        self.ensure_admin(caller)?;
        Self::check_bps("entry", bps)?;
        let old = self.config.fees.entry_bps;
        self.config.fees.entry_bps = bps;
        info!(old, new = bps, "entry fee updated");
        Ok(())
    }

    /// Sets the exit fee rate.
    pub fn set_exit_fee_bps(&mut self, caller: &AccountId, bps: u64) -> Result<()> {
        self.ensure_admin(caller)?;
        Self::check_bps("exit", bps)?;
        let old = self.config.fees.exit_bps;
        self.config.fees.exit_bps = bps;
        info!(old, new = bps, "exit fee updated");
        Ok(())
    }

    /// Sets the protocol fee rate.
    pub fn set_protocol_fee_bps(&mut self, caller: &AccountId, bps: u64) -> Result<()> {
        self.ensure_admin(caller)?;
        Self::check_bps("protocol", bps)?;
        let old = self.config.fees.protocol_bps;
        self.config.fees.protocol_bps = bps;
        info!(old, new = bps, "protocol fee updated");
        Ok(())
    }

    /// Sets the atom wallet fee rate.
    pub fn set_atom_wallet_fee_bps(&mut self, caller: &AccountId, bps: u64) -> Result<()> {
        self.ensure_admin(caller)?;
        Self::check_bps("atom_wallet", bps)?;
        let old = self.config.fees.atom_wallet_bps;
        self.config.fees.atom_wallet_bps = bps;
        info!(old, new = bps, "atom wallet fee updated");
        Ok(())
    }

    /// Sets the atom-deposit-fraction rate charged on triple deposits.
    pub fn set_deposit_fraction_bps(&mut self, caller: &AccountId, bps: u64) -> Result<()> {
        self.ensure_admin(caller)?;
        Self::check_bps("deposit_fraction", bps)?;
        let old = self.config.fees.deposit_fraction_bps;
        self.config.fees.deposit_fraction_bps = bps;
        info!(old, new = bps, "deposit fraction updated");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Thresholds and floors
    // -----------------------------------------------------------------------

    /// Sets the default-curve share threshold that gates the entry/exit
    /// waiver and the deposit-fraction fee.
    pub fn set_fee_threshold(&mut self, caller: &AccountId, threshold: u128) -> Result<()> {
        self.ensure_admin(caller)?;
        let old = self.config.fee_threshold;
        self.config.fee_threshold = threshold;
        info!(old, new = threshold, "fee threshold updated");
        Ok(())
    }

    /// Sets the minimum deposit amount.
    pub fn set_min_deposit(&mut self, caller: &AccountId, amount: u128) -> Result<()> {
        self.ensure_admin(caller)?;
        let old = self.config.min_deposit;
        self.config.min_deposit = amount;
        info!(old, new = amount, "min deposit updated");
        Ok(())
    }

    /// Sets the ghost-share floor used by future bootstraps and floor
    /// checks. Must be nonzero.
    pub fn set_min_share(&mut self, caller: &AccountId, amount: u128) -> Result<()> {
        self.ensure_admin(caller)?;
        if amount == 0 {
            return Err(ConfigError::ZeroMinShare.into());
        }
        let old = self.config.min_share;
        self.config.min_share = amount;
        info!(old, new = amount, "min share updated");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Curves
    // -----------------------------------------------------------------------

    /// Points fee routing and threshold checks at a different registered
    /// curve.
    pub fn set_default_curve_id(&mut self, caller: &AccountId, curve: CurveId) -> Result<()> {
        self.ensure_admin(caller)?;
        if !self.curves.contains(curve) {
            return Err(CurveError::UnknownCurve { curve }.into());
        }
        let old = self.config.default_curve_id;
        self.config.default_curve_id = curve;
        info!(old = old.value(), new = curve.value(), "default curve updated");
        Ok(())
    }

    /// Registers a new pricing strategy under an unused id.
    pub fn register_curve(
        &mut self,
        caller: &AccountId,
        id: CurveId,
        curve: Box<dyn BondingCurve>,
    ) -> Result<()> {
        self.ensure_admin(caller)?;
        let name = curve.name();
        self.curves.register(id, curve)?;
        info!(id = id.value(), name, "curve registered");
        Ok(())
    }

    /// Replaces the whole curve registry. The incoming registry must still
    /// resolve the configured default curve id.
    pub fn set_curve_registry(&mut self, caller: &AccountId, registry: CurveRegistry) -> Result<()> {
        self.ensure_admin(caller)?;
        let default = self.config.default_curve_id;
        if !registry.contains(default) {
            return Err(CurveError::UnknownCurve { curve: default }.into());
        }
        let count = registry.len();
        self.curves = registry;
        info!(curves = count, "curve registry replaced");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Sweeps
    // -----------------------------------------------------------------------

    /// Drains one epoch's protocol bucket to the treasury. Sweeping an
    /// epoch with nothing accrued is a no-op returning zero.
    pub fn sweep_protocol_fees(&mut self, caller: &AccountId, epoch: u64) -> Result<u128> {
        self.ensure_admin(caller)?;
        let amount = self.state.fees.sweep_protocol(epoch);
        if amount > 0 {
            let treasury = self.config.treasury.clone();
            info!(epoch, amount, treasury = %treasury, "protocol fees swept");
            self.events.push(LedgerEvent::ProtocolFeesSwept {
                epoch,
                amount,
                treasury,
            });
        }
        Ok(amount)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::curves::LinearCurve;
    use crate::multivault::Error;

    fn engine() -> MultiVault {
        MultiVault::standard(LedgerConfig::default()).unwrap()
    }

    fn admin() -> AccountId {
        AccountId::from("sys:admin")
    }

    fn alice() -> AccountId {
        AccountId::from("alice")
    }

    #[test]
    fn non_admin_rejected_everywhere() {
        let mut vault = engine();
        let outsider = alice();
        assert!(matches!(
            vault.pause(&outsider),
            Err(Error::Unauthorized { .. })
        ));
        assert!(matches!(
            vault.set_entry_fee_bps(&outsider, 10),
            Err(Error::Unauthorized { .. })
        ));
        assert!(matches!(
            vault.sweep_protocol_fees(&outsider, 0),
            Err(Error::Unauthorized { .. })
        ));
    }

    #[test]
    fn pause_blocks_users_but_not_admin() {
        let mut vault = engine();
        vault.pause(&admin()).unwrap();

        let cost = vault.atom_cost();
        assert_eq!(
            vault.create_atom(&alice(), b"x".to_vec(), cost),
            Err(Error::Paused)
        );
        assert_eq!(
            vault.approve(&alice(), &AccountId::from("bob"), crate::approvals::ApprovalLevel::Both),
            Err(Error::Paused)
        );

        // Admin ops still work while paused.
        vault.set_entry_fee_bps(&admin(), 10).unwrap();
        vault.unpause(&admin()).unwrap();
        vault.create_atom(&alice(), b"x".to_vec(), cost).unwrap();
    }

    #[test]
    fn pause_event_fires_only_on_transition() {
        let mut vault = engine();
        vault.pause(&admin()).unwrap();
        vault.pause(&admin()).unwrap();
        vault.unpause(&admin()).unwrap();
        vault.unpause(&admin()).unwrap();

        let transitions = vault
            .events()
            .iter()
            .filter(|e| matches!(e, LedgerEvent::PauseChanged { .. }))
            .count();
        assert_eq!(transitions, 2);
    }

    #[test]
    fn fee_setters_enforce_the_cap() {
        let mut vault = engine();
        let result = vault.set_exit_fee_bps(&admin(), MAX_FEE_BPS + 1);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::FeeAboveCap { name: "exit", .. }))
        ));
        // The rate is untouched after a rejected update.
        assert_eq!(
            vault.config().fees.exit_bps,
            crate::config::DEFAULT_EXIT_FEE_BPS
        );

        vault.set_exit_fee_bps(&admin(), MAX_FEE_BPS).unwrap();
        assert_eq!(vault.config().fees.exit_bps, MAX_FEE_BPS);
    }

    #[test]
    fn zero_min_share_rejected() {
        let mut vault = engine();
        assert!(matches!(
            vault.set_min_share(&admin(), 0),
            Err(Error::Config(ConfigError::ZeroMinShare))
        ));
        vault.set_min_share(&admin(), 5).unwrap();
        assert_eq!(vault.config().min_share, 5);
    }

    #[test]
    fn default_curve_must_be_registered() {
        let mut vault = engine();
        assert!(matches!(
            vault.set_default_curve_id(&admin(), CurveId::new(9)),
            Err(Error::Curve(CurveError::UnknownCurve { .. }))
        ));

        vault
            .register_curve(&admin(), CurveId::new(9), Box::new(LinearCurve::uncapped()))
            .unwrap();
        vault.set_default_curve_id(&admin(), CurveId::new(9)).unwrap();
        assert_eq!(vault.config().default_curve_id, CurveId::new(9));
    }

    #[test]
    fn duplicate_curve_id_rejected() {
        let mut vault = engine();
        let result = vault.register_curve(
            &admin(),
            CurveId::new(crate::config::DEFAULT_CURVE_ID),
            Box::new(LinearCurve::uncapped()),
        );
        assert!(matches!(
            result,
            Err(Error::Curve(CurveError::AlreadyRegistered { .. }))
        ));
    }

    #[test]
    fn registry_swap_must_keep_the_default_curve() {
        let mut vault = engine();
        let mut incomplete = CurveRegistry::new();
        incomplete
            .register(CurveId::new(7), Box::new(LinearCurve::uncapped()))
            .unwrap();
        assert!(matches!(
            vault.set_curve_registry(&admin(), incomplete),
            Err(Error::Curve(CurveError::UnknownCurve { .. }))
        ));

        vault.set_curve_registry(&admin(), CurveRegistry::standard()).unwrap();
    }

    #[test]
    fn sweep_drains_the_bucket_once() {
        let mut vault = engine();
        let cost = vault.atom_cost();
        vault.create_atom(&alice(), b"x".to_vec(), cost).unwrap();
        let accrued = vault.protocol_fees_accrued(0);
        assert!(accrued > 0);

        let swept = vault.sweep_protocol_fees(&admin(), 0).unwrap();
        assert_eq!(swept, accrued);
        assert_eq!(vault.protocol_fees_accrued(0), 0);
        assert_eq!(vault.sweep_protocol_fees(&admin(), 0).unwrap(), 0);
        assert!(vault
            .events()
            .iter()
            .any(|e| matches!(e, LedgerEvent::ProtocolFeesSwept { amount, .. } if *amount == accrued)));
    }

    #[test]
    fn sweeping_an_untouched_epoch_is_a_quiet_noop() {
        let mut vault = engine();
        let events_before = vault.events().len();
        assert_eq!(vault.sweep_protocol_fees(&admin(), 99).unwrap(), 0);
        assert_eq!(vault.events().len(), events_before);
    }
}
