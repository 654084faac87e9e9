//! Redemption planning and application.
//!
//! A redeem burns shares, values them at the vault's current ratio, and
//! pays out what remains after the exit legs of the waterfall:
//!
//! ```text
//!   gross ──┬── protocol fee ──────────► epoch bucket
//!           ├── exit fee (waivable) ───► term's default-curve vault
//!           └── net ────────────────────► receiver
//! ```
//!
//! Both fees are computed on the gross value of the burned shares, before
//! either is subtracted. The vault floor is enforced on the share total
//! that remains after the burn: the ghost shares seeded at bootstrap can
//! never be withdrawn, so an initialized vault stays initialized.

use serde::Serialize;
use tracing::debug;

use crate::accounts::AccountId;
use crate::curves::CurveId;
use crate::events::{FeeDestination, FeeKind, LedgerEvent};
use crate::terms::{TermError, TermId};
use crate::vaults::{VaultError, VaultKey};

use super::engine::MultiVault;
use super::error::{Error, Result};

// ---------------------------------------------------------------------------
// Quote
// ---------------------------------------------------------------------------

/// The full economics of one redemption, as a preview or a receipt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RedeemQuote {
    /// The vault being redeemed from.
    pub term: TermId,
    /// The curve pricing that vault.
    pub curve: CurveId,
    /// Shares to burn.
    pub shares: u128,
    /// Raw value of the burned shares at the current ratio.
    pub assets_gross: u128,
    /// Protocol fee, accrued to the current epoch.
    pub protocol_fee: u128,
    /// Exit fee, zero when waived.
    pub exit_fee: u128,
    /// What the receiver is actually paid.
    pub assets_net: u128,
}

impl MultiVault {
    // -----------------------------------------------------------------------
    // Planning
    // -----------------------------------------------------------------------

    /// Values a burn of `shares` against the vault's current state without
    /// touching it. Does not check the receiver's balance — callers that
    /// execute do that first.
    fn plan_redeem(&self, term: TermId, curve_id: CurveId, shares: u128) -> Result<RedeemQuote> {
        if !self.state.terms.is_created(&term) {
            return Err(TermError::TermNotFound { term }.into());
        }
        let curve = self.curves.get(curve_id)?;
        let key = VaultKey::new(term, curve_id);
        let (total_assets, total_shares) = self.state.vaults.totals(&key);

        // The floor binds the post-burn share total. A burn larger than the
        // vault is the degenerate case of the same rule.
        let floor = self.config.min_share;
        let remaining = total_shares.saturating_sub(shares);
        if shares > total_shares || remaining < floor {
            return Err(Error::RemainingBelowFloor { remaining, floor });
        }

        let assets_gross = curve.preview_redeem(shares, total_assets, total_shares)?;

        let exit_waived = self.default_curve_shares(term) < self.config.fee_threshold;
        let schedule = &self.config.fees;
        let protocol_fee = schedule.protocol_fee(assets_gross)?.min(assets_gross);
        let exit_fee = if exit_waived {
            0
        } else {
            schedule
                .exit_fee(assets_gross)?
                .min(assets_gross - protocol_fee)
        };
        let assets_net = assets_gross - protocol_fee - exit_fee;

        Ok(RedeemQuote {
            term,
            curve: curve_id,
            shares,
            assets_gross,
            protocol_fee,
            exit_fee,
            assets_net,
        })
    }

    // -----------------------------------------------------------------------
    // Application
    // -----------------------------------------------------------------------

    /// Writes a planned redemption into the books. Runs inside a
    /// transactional scope.
    fn apply_redeem(
        &mut self,
        sender: &AccountId,
        receiver: &AccountId,
        quote: RedeemQuote,
    ) -> Result<u128> {
        let epoch = self.current_epoch();
        let key = VaultKey::new(quote.term, quote.curve);

        let receiver_shares = self.state.vaults.burn(&key, receiver, quote.shares)?;
        self.state.vaults.debit_assets(&key, quote.assets_gross)?;

        if quote.protocol_fee > 0 {
            self.state.fees.accrue_protocol(epoch, quote.protocol_fee)?;
            self.events.push(LedgerEvent::FeeAccrued {
                kind: FeeKind::Protocol,
                amount: quote.protocol_fee,
                destination: FeeDestination::ProtocolEpoch { epoch },
            });
        }
        let mut exit_vault = None;
        if quote.exit_fee > 0 {
            let default_key = self.default_key(quote.term);
            self.state.vaults.credit_assets(&default_key, quote.exit_fee)?;
            self.events.push(LedgerEvent::FeeAccrued {
                kind: FeeKind::Exit,
                amount: quote.exit_fee,
                destination: FeeDestination::Vault {
                    term: default_key.term,
                    curve: default_key.curve,
                },
            });
            if default_key != key {
                exit_vault = Some(default_key);
            }
        }

        // Utilization moves by the full gross value, not the net payout.
        let delta = Self::signed_amount(quote.assets_gross)?
            .checked_neg()
            .ok_or(Error::AmountTooLarge {
                amount: quote.assets_gross,
            })?;
        self.state.utilization.record(receiver, epoch, delta)?;

        let (_, total_shares) = self.state.vaults.totals(&key);
        self.events.push(LedgerEvent::Redeemed {
            sender: sender.clone(),
            receiver: receiver.clone(),
            term: quote.term,
            curve: quote.curve,
            shares_burned: quote.shares,
            assets_gross: quote.assets_gross,
            assets_paid: quote.assets_net,
            receiver_shares,
            total_shares,
        });
        self.emit_share_price(key)?;
        if let Some(default_key) = exit_vault {
            self.emit_share_price(default_key)?;
        }
        Ok(quote.assets_net)
    }

    /// One fully validated redemption: the shared body behind [`redeem`]
    /// (Self::redeem) and each batch element.
    fn redeem_element(
        &mut self,
        sender: &AccountId,
        receiver: &AccountId,
        term: &TermId,
        curve: CurveId,
        shares: u128,
        min_assets: u128,
    ) -> Result<u128> {
        if !self.state.approvals.can_redeem(receiver, sender) {
            return Err(Error::SenderNotApproved {
                receiver: receiver.clone(),
                sender: sender.clone(),
            });
        }
        if shares == 0 {
            return Err(Error::ZeroShares);
        }
        if !self.state.terms.is_created(term) {
            return Err(TermError::TermNotFound { term: *term }.into());
        }
        self.curves.get(curve)?;

        let held = self
            .state
            .vaults
            .balance_of(&VaultKey::new(*term, curve), receiver);
        if held < shares {
            return Err(VaultError::InsufficientShares {
                held,
                requested: shares,
            }
            .into());
        }

        let quote = self.plan_redeem(*term, curve, shares)?;
        if quote.assets_net < min_assets {
            return Err(Error::SlippageExceeded {
                actual: quote.assets_net,
                min: min_assets,
            });
        }
        self.apply_redeem(sender, receiver, quote)
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Burns `shares` of `receiver`'s position in `(term, curve)` and pays
    /// out at least `min_assets` or fails.
    ///
    /// The sender must be the receiver or hold a redeem grant from them.
    pub fn redeem(
        &mut self,
        sender: &AccountId,
        receiver: &AccountId,
        term: &TermId,
        curve: CurveId,
        shares: u128,
        min_assets: u128,
    ) -> Result<u128> {
        self.ensure_active()?;
        let term = *term;
        let paid = self.transactional(move |lg| {
            lg.redeem_element(sender, receiver, &term, curve, shares, min_assets)
        })?;
        debug!(%term, curve = curve.value(), shares, paid, "redeem applied");
        Ok(paid)
    }

    /// Redemptions over parallel arrays, all-or-nothing.
    pub fn redeem_batch(
        &mut self,
        sender: &AccountId,
        receivers: &[AccountId],
        terms: &[TermId],
        curves: &[CurveId],
        shares: &[u128],
        min_assets: &[u128],
    ) -> Result<Vec<u128>> {
        self.ensure_active()?;
        Self::check_batch_size(receivers.len())?;
        Self::check_same_length(receivers.len(), terms.len())?;
        Self::check_same_length(receivers.len(), curves.len())?;
        Self::check_same_length(receivers.len(), shares.len())?;
        Self::check_same_length(receivers.len(), min_assets.len())?;

        let paid = self.transactional(|lg| {
            let mut paid = Vec::with_capacity(receivers.len());
            for i in 0..receivers.len() {
                paid.push(lg.redeem_element(
                    sender,
                    &receivers[i],
                    &terms[i],
                    curves[i],
                    shares[i],
                    min_assets[i],
                )?);
            }
            Ok(paid)
        })?;
        debug!(count = paid.len(), "redeem batch applied");
        Ok(paid)
    }

    /// Prices a redemption without executing it. Balance is not checked —
    /// the quote answers what burning `shares` would pay anyone who held
    /// them.
    pub fn preview_redeem(
        &self,
        term: &TermId,
        curve: CurveId,
        shares: u128,
    ) -> Result<RedeemQuote> {
        if shares == 0 {
            return Err(Error::ZeroShares);
        }
        self.plan_redeem(*term, curve, shares)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LedgerConfig, ONE_TRL};

    fn engine() -> MultiVault {
        MultiVault::standard(LedgerConfig::default()).unwrap()
    }

    fn alice() -> AccountId {
        AccountId::from("alice")
    }

    fn default_curve() -> CurveId {
        CurveId::new(crate::config::DEFAULT_CURVE_ID)
    }

    /// An atom with `excess` staked for alice beyond the creation cost.
    fn staked_atom(vault: &mut MultiVault, excess: u128) -> TermId {
        let cost = vault.atom_cost();
        vault
            .create_atom(&alice(), b"staked".to_vec(), cost + excess)
            .unwrap()
    }

    #[test]
    fn zero_share_redeem_rejected() {
        let mut vault = engine();
        let atom = staked_atom(&mut vault, ONE_TRL);
        let result = vault.redeem(&alice(), &alice(), &atom, default_curve(), 0, 0);
        assert_eq!(result, Err(Error::ZeroShares));
    }

    #[test]
    fn cannot_redeem_more_than_held() {
        let mut vault = engine();
        let atom = staked_atom(&mut vault, ONE_TRL);
        let held = vault.get_shares(&alice(), &atom, default_curve());
        let result = vault.redeem(&alice(), &alice(), &atom, default_curve(), held + 1, 0);
        assert!(matches!(
            result,
            Err(Error::Vault(VaultError::InsufficientShares { .. }))
        ));
    }

    #[test]
    fn ghost_floor_is_unredeemable() {
        let mut vault = engine();
        let atom = staked_atom(&mut vault, ONE_TRL);
        let held = vault.get_shares(&alice(), &atom, default_curve());
        // Alice can burn her whole position: the ghost shares keep the
        // vault at the floor.
        let paid = vault
            .redeem(&alice(), &alice(), &atom, default_curve(), held, 0)
            .unwrap();
        assert!(paid > 0);
        let (_, total_shares) = vault.vault_totals(&atom, default_curve());
        assert_eq!(total_shares, vault.config().min_share);

        // Burning even one more share would take the vault below floor,
        // and the error reports the exact remainder it computed.
        let floor = vault.config().min_share;
        let quote = vault.preview_redeem(&atom, default_curve(), 1);
        assert!(matches!(
            quote,
            Err(Error::RemainingBelowFloor { remaining, floor: f })
                if remaining == floor - 1 && f == floor
        ));
    }

    #[test]
    fn fees_come_off_the_gross_value() {
        let mut vault = engine();
        let atom = staked_atom(&mut vault, ONE_TRL);
        let held = vault.get_shares(&alice(), &atom, default_curve());
        let quote = vault.preview_redeem(&atom, default_curve(), held).unwrap();

        let schedule = vault.config().fees;
        assert_eq!(
            quote.protocol_fee,
            schedule.protocol_fee(quote.assets_gross).unwrap()
        );
        // Default vault is far below the fee threshold, so exit is waived.
        assert_eq!(quote.exit_fee, 0);
        assert_eq!(
            quote.assets_net,
            quote.assets_gross - quote.protocol_fee
        );

        let paid = vault
            .redeem(&alice(), &alice(), &atom, default_curve(), held, 0)
            .unwrap();
        assert_eq!(paid, quote.assets_net);
    }

    #[test]
    fn slippage_guard_rejects_low_payouts() {
        let mut vault = engine();
        let atom = staked_atom(&mut vault, ONE_TRL);
        let held = vault.get_shares(&alice(), &atom, default_curve());
        let quote = vault.preview_redeem(&atom, default_curve(), held).unwrap();
        let result = vault.redeem(
            &alice(),
            &alice(),
            &atom,
            default_curve(),
            held,
            quote.assets_net + 1,
        );
        assert!(matches!(result, Err(Error::SlippageExceeded { .. })));
        // Rejected redeems leave the position intact.
        assert_eq!(vault.get_shares(&alice(), &atom, default_curve()), held);
    }

    #[test]
    fn redeem_moves_utilization_down_by_gross() {
        let mut vault = engine();
        let excess = ONE_TRL;
        let atom = staked_atom(&mut vault, excess);
        let held = vault.get_shares(&alice(), &atom, default_curve());
        let quote = vault.preview_redeem(&atom, default_curve(), held).unwrap();

        vault
            .redeem(&alice(), &alice(), &atom, default_curve(), held, 0)
            .unwrap();
        assert_eq!(
            vault.personal_utilization(&alice(), 0),
            excess as i128 - quote.assets_gross as i128
        );
    }

    #[test]
    fn unapproved_sender_cannot_redeem() {
        let mut vault = engine();
        let atom = staked_atom(&mut vault, ONE_TRL);
        let bob = AccountId::from("bob");
        let result = vault.redeem(&bob, &alice(), &atom, default_curve(), 1, 0);
        assert!(matches!(result, Err(Error::SenderNotApproved { .. })));
    }

    #[test]
    fn approved_sender_redeems_to_receiver() {
        let mut vault = engine();
        let atom = staked_atom(&mut vault, ONE_TRL);
        let bob = AccountId::from("bob");
        vault
            .approve(&alice(), &bob, crate::approvals::ApprovalLevel::Redeem)
            .unwrap();

        let held = vault.get_shares(&alice(), &atom, default_curve());
        let paid = vault
            .redeem(&bob, &alice(), &atom, default_curve(), held / 2, 0)
            .unwrap();
        assert!(paid > 0);
        assert_eq!(
            vault.get_shares(&alice(), &atom, default_curve()),
            held - held / 2
        );
    }

    #[test]
    fn batch_unwinds_on_any_failure() {
        let mut vault = engine();
        let atom = staked_atom(&mut vault, ONE_TRL);
        let held = vault.get_shares(&alice(), &atom, default_curve());

        let result = vault.redeem_batch(
            &alice(),
            &[alice(), alice()],
            &[atom, atom],
            &[default_curve(), default_curve()],
            &[held / 2, held],
            &[0, 0],
        );
        // Second element over-burns after the first halved the position.
        assert!(matches!(
            result,
            Err(Error::Vault(VaultError::InsufficientShares { .. }))
        ));
        assert_eq!(vault.get_shares(&alice(), &atom, default_curve()), held);
    }

    #[test]
    fn preview_redeem_on_missing_term_rejected() {
        let vault = engine();
        let missing = crate::terms::atom_id(b"missing");
        let result = vault.preview_redeem(&missing, default_curve(), 1);
        assert!(matches!(
            result,
            Err(Error::Term(TermError::TermNotFound { .. }))
        ));
    }
}
