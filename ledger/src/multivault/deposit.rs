//! Deposit planning and application.
//!
//! Every deposit runs in two halves. Planning is pure: resolve the vault,
//! decide whether this call bootstraps it, run the fee waterfall, and price
//! the depositor's shares. Application writes the plan into the books. The
//! public preview returns the plan's quote directly, so previews and
//! executions can never disagree on the arithmetic.
//!
//! The fee waterfall computes every fee on the same base and rounds each
//! one up:
//!
//! ```text
//!   base ──┬── protocol fee ──────────► epoch bucket
//!          ├── entry fee (waivable) ──► term's default-curve vault
//!          ├── atom wallet fee ───────► wallet accrual        (atoms)
//!          ├── deposit fraction ──────► component vaults ÷ 3  (triples)
//!          └── remainder ─────────────► staked for the receiver
//! ```
//!
//! Each fee is clamped to what the previous legs left behind, so the
//! waterfall can never underflow on amounts small enough that the rounded
//! fees would overlap.

use serde::Serialize;
use tracing::debug;

use crate::accounts::AccountId;
use crate::config::MAX_BATCH_SIZE;
use crate::curves::CurveId;
use crate::events::{FeeDestination, FeeKind, LedgerEvent};
use crate::terms::{TermError, TermId, TermKind};
use crate::vaults::{VaultError, VaultKey};

use super::engine::MultiVault;
use super::error::{Error, Result};

// ---------------------------------------------------------------------------
// Quote and plan
// ---------------------------------------------------------------------------

/// The full economics of one deposit, as a preview or a receipt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DepositQuote {
    /// The vault being deposited into.
    pub term: TermId,
    /// The curve pricing that vault.
    pub curve: CurveId,
    /// The deposit amount the quote covers. For creation flows this is the
    /// excess above the fixed creation cost.
    pub assets_gross: u128,
    /// The fee base: `assets_gross` minus any floor cost funded by this
    /// call.
    pub base: u128,
    /// Protocol fee, accrued to the current epoch.
    pub protocol_fee: u128,
    /// Entry fee, zero when waived.
    pub entry_fee: u128,
    /// Atom wallet fee, zero for triple-family targets.
    pub atom_wallet_fee: u128,
    /// Total deposit fraction carved out, zero when the gate is closed or
    /// the target is an atom.
    pub deposit_fraction: u128,
    /// What remains staked for the receiver after all fees.
    pub assets_staked: u128,
    /// Shares the receiver would be minted.
    pub shares: u128,
    /// Whether this call bootstraps the vault.
    pub bootstraps_vault: bool,
    /// Ghost shares minted to the burn holder when bootstrapping.
    pub ghost_shares: u128,
}

/// A bootstrapped opposite-side vault (triple family only).
pub(super) struct OppositeBootstrap {
    pub(super) key: VaultKey,
    pub(super) ghost_shares: u128,
    pub(super) floor_assets: u128,
}

/// The three-way deposit-fraction split.
pub(super) struct FractionSplit {
    pub(super) vaults: [VaultKey; 3],
    pub(super) per_vault: u128,
    pub(super) dust: u128,
}

/// Everything application needs that the public quote does not carry.
pub(super) struct DepositPlan {
    pub(super) quote: DepositQuote,
    pub(super) key: VaultKey,
    /// Floor assets credited to the target vault when bootstrapping.
    pub(super) floor_assets: u128,
    pub(super) opposite: Option<OppositeBootstrap>,
    pub(super) wallet: Option<AccountId>,
    pub(super) fraction: Option<FractionSplit>,
    pub(super) post_assets: u128,
    pub(super) post_shares: u128,
}

/// Which entry point is asking for the plan.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(super) enum DepositMode {
    /// Term creation: the vault is fresh by construction and the floor is
    /// funded out of the fixed creation cost, not out of `assets`.
    Create,
    /// A bare deposit, which must fund the floor itself if the vault is
    /// uninitialized.
    Deposit,
}

fn note_touched(touched: &mut Vec<VaultKey>, key: VaultKey) {
    if !touched.contains(&key) {
        touched.push(key);
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

impl MultiVault {
    /// Computes the complete effect of depositing `assets` into
    /// `(term, curve_id)` without touching any state.
    pub(super) fn plan_deposit(
        &self,
        term: TermId,
        curve_id: CurveId,
        assets: u128,
        mode: DepositMode,
    ) -> Result<DepositPlan> {
        let kind = self
            .state
            .terms
            .kind(&term)
            .ok_or(TermError::TermNotFound { term })?;
        let curve = self.curves.get(curve_id)?;
        let key = VaultKey::new(term, curve_id);
        let (total_assets, total_shares) = self.state.vaults.totals(&key);
        let min_share = self.config.min_share;

        // Resolve the bootstrap question: what state the share preview runs
        // against, and how much of `assets` is left as the fee base.
        let bootstraps = mode == DepositMode::Create || total_shares == 0;
        let (base, floor_assets, ghost_shares, state_assets, state_shares) = if bootstraps {
            if mode == DepositMode::Deposit {
                if curve_id == self.config.default_curve_id {
                    return Err(Error::DefaultCurveMustBootstrapViaCreate { term });
                }
                let floor_cost = min_share.saturating_mul(kind.floor_units());
                if assets <= floor_cost {
                    return Err(Error::DepositBelowFloor {
                        provided: assets,
                        floor_cost,
                    });
                }
                let ghost = curve.preview_deposit(min_share, 0, 0)?;
                (assets - floor_cost, min_share, ghost, min_share, ghost)
            } else {
                // Creation: the fixed cost already paid for the floor, so
                // the whole excess is the fee base.
                let ghost = curve.preview_deposit(min_share, 0, 0)?;
                (assets, min_share, ghost, min_share, ghost)
            }
        } else {
            (assets, 0, 0, total_assets, total_shares)
        };

        // The opposite side of a triple-family pair bootstraps in the same
        // call, so neither side can ever exist without its floor.
        let opposite = if bootstraps && kind.is_triple_family() {
            self.state
                .terms
                .opposite_of(&term)
                .map(|opp| VaultKey::new(opp, curve_id))
                .filter(|okey| !self.state.vaults.is_initialized(okey))
                .map(|okey| {
                    Ok::<_, Error>(OppositeBootstrap {
                        key: okey,
                        ghost_shares: curve.preview_deposit(min_share, 0, 0)?,
                        floor_assets: min_share,
                    })
                })
                .transpose()?
        } else {
            None
        };

        // Fee waterfall: every fee on `base`, rounded up, clamped to what
        // the earlier legs left.
        let schedule = &self.config.fees;
        let entry_waived =
            bootstraps || self.default_curve_shares(term) < self.config.fee_threshold;

        let protocol_fee = schedule.protocol_fee(base)?.min(base);
        let mut remaining = base - protocol_fee;

        let entry_fee = if entry_waived {
            0
        } else {
            schedule.entry_fee(base)?.min(remaining)
        };
        remaining -= entry_fee;

        let atom_wallet_fee = if kind == TermKind::Atom {
            schedule.atom_wallet_fee(base)?.min(remaining)
        } else {
            0
        };
        remaining -= atom_wallet_fee;

        let (deposit_fraction, fraction) = if kind.is_triple_family() {
            self.plan_fraction(term, base, remaining)?
        } else {
            (0, None)
        };
        remaining -= deposit_fraction;

        let assets_staked = remaining;
        let shares = curve.preview_deposit(assets_staked, state_assets, state_shares)?;

        // Post-deposit totals for the cap checks. The entry fee lands in
        // this same vault when the target curve is the default one.
        let own_entry = if curve_id == self.config.default_curve_id {
            entry_fee
        } else {
            0
        };
        let post_assets = state_assets
            .checked_add(assets_staked)
            .and_then(|v| v.checked_add(own_entry))
            .ok_or(VaultError::Overflow {
                current: state_assets,
                delta: assets_staked,
            })?;
        let post_shares = state_shares
            .checked_add(shares)
            .ok_or(VaultError::Overflow {
                current: state_shares,
                delta: shares,
            })?;

        let wallet = (atom_wallet_fee > 0).then(|| self.wallets.wallet_address(&term));

        Ok(DepositPlan {
            quote: DepositQuote {
                term,
                curve: curve_id,
                assets_gross: assets,
                base,
                protocol_fee,
                entry_fee,
                atom_wallet_fee,
                deposit_fraction,
                assets_staked,
                shares,
                bootstraps_vault: bootstraps,
                ghost_shares,
            },
            key,
            floor_assets,
            opposite,
            wallet,
            fraction,
            post_assets,
            post_shares,
        })
    }

    /// The deposit-fraction leg: open only once all three component terms'
    /// default-curve vaults have crossed the fee threshold. Split three
    /// ways by integer division; the remainder is retained as dust.
    fn plan_fraction(
        &self,
        term: TermId,
        base: u128,
        remaining: u128,
    ) -> Result<(u128, Option<FractionSplit>)> {
        let Some((subject, predicate, object)) = self.state.terms.components(&term) else {
            return Ok((0, None));
        };
        let threshold = self.config.fee_threshold;
        let gate_open = [subject, predicate, object]
            .iter()
            .all(|component| self.default_curve_shares(*component) >= threshold);
        if !gate_open {
            return Ok((0, None));
        }

        let total = self.config.fees.deposit_fraction(base)?.min(remaining);
        let per_vault = total / 3;
        let dust = total - per_vault * 3;
        Ok((
            total,
            Some(FractionSplit {
                vaults: [
                    self.default_key(subject),
                    self.default_key(predicate),
                    self.default_key(object),
                ],
                per_vault,
                dust,
            }),
        ))
    }

    /// Checks the plan's post-deposit totals against the curve's declared
    /// capacity.
    pub(super) fn check_deposit_caps(&self, plan: &DepositPlan) -> Result<()> {
        let curve = self.curves.get(plan.key.curve)?;
        if plan.post_assets > curve.max_assets() {
            return Err(Error::ExceedsMaxAssets {
                resulting: plan.post_assets,
                max: curve.max_assets(),
            });
        }
        if plan.post_shares > curve.max_shares() {
            return Err(Error::ExceedsMaxShares {
                resulting: plan.post_shares,
                max: curve.max_shares(),
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Application
    // -----------------------------------------------------------------------

    /// Writes a planned deposit into the books. Runs inside a transactional
    /// scope; any failure here rolls the whole operation back.
    pub(super) fn apply_deposit(
        &mut self,
        sender: &AccountId,
        receiver: &AccountId,
        plan: DepositPlan,
    ) -> Result<u128> {
        let epoch = self.current_epoch();
        let quote = &plan.quote;
        let mut touched: Vec<VaultKey> = Vec::new();

        if quote.bootstraps_vault {
            self.state
                .vaults
                .mint(&plan.key, &AccountId::burn(), quote.ghost_shares)?;
            self.state.vaults.credit_assets(&plan.key, plan.floor_assets)?;
        }
        if let Some(opposite) = &plan.opposite {
            self.state
                .vaults
                .mint(&opposite.key, &AccountId::burn(), opposite.ghost_shares)?;
            self.state
                .vaults
                .credit_assets(&opposite.key, opposite.floor_assets)?;
            note_touched(&mut touched, opposite.key);
        }

        let receiver_shares = self.state.vaults.mint(&plan.key, receiver, quote.shares)?;
        self.state
            .vaults
            .credit_assets(&plan.key, quote.assets_staked)?;
        note_touched(&mut touched, plan.key);

        if quote.protocol_fee > 0 {
            self.state.fees.accrue_protocol(epoch, quote.protocol_fee)?;
            self.events.push(LedgerEvent::FeeAccrued {
                kind: FeeKind::Protocol,
                amount: quote.protocol_fee,
                destination: FeeDestination::ProtocolEpoch { epoch },
            });
        }
        if quote.entry_fee > 0 {
            let default_key = self.default_key(quote.term);
            self.state
                .vaults
                .credit_assets(&default_key, quote.entry_fee)?;
            self.events.push(LedgerEvent::FeeAccrued {
                kind: FeeKind::Entry,
                amount: quote.entry_fee,
                destination: FeeDestination::Vault {
                    term: default_key.term,
                    curve: default_key.curve,
                },
            });
            note_touched(&mut touched, default_key);
        }
        if quote.atom_wallet_fee > 0 {
            if let Some(wallet) = &plan.wallet {
                self.state.fees.accrue_wallet(wallet, quote.atom_wallet_fee)?;
                self.events.push(LedgerEvent::FeeAccrued {
                    kind: FeeKind::AtomWallet,
                    amount: quote.atom_wallet_fee,
                    destination: FeeDestination::AtomWallet {
                        wallet: wallet.clone(),
                    },
                });
            }
        }
        if let Some(split) = &plan.fraction {
            if split.per_vault > 0 {
                for vault_key in split.vaults {
                    self.state.vaults.credit_assets(&vault_key, split.per_vault)?;
                    self.events.push(LedgerEvent::FeeAccrued {
                        kind: FeeKind::DepositFraction,
                        amount: split.per_vault,
                        destination: FeeDestination::Vault {
                            term: vault_key.term,
                            curve: vault_key.curve,
                        },
                    });
                    note_touched(&mut touched, vault_key);
                }
            }
            if split.dust > 0 {
                self.state.fees.add_dust(split.dust)?;
                self.events.push(LedgerEvent::FeeAccrued {
                    kind: FeeKind::DepositFraction,
                    amount: split.dust,
                    destination: FeeDestination::Dust,
                });
            }
        }

        self.state.utilization.record(
            receiver,
            epoch,
            Self::signed_amount(quote.assets_gross)?,
        )?;

        let (_, total_shares) = self.state.vaults.totals(&plan.key);
        self.events.push(LedgerEvent::Deposited {
            sender: sender.clone(),
            receiver: receiver.clone(),
            term: quote.term,
            curve: quote.curve,
            assets_gross: quote.assets_gross,
            assets_staked: quote.assets_staked,
            shares_minted: quote.shares,
            receiver_shares,
            total_shares,
        });
        for key in touched {
            self.emit_share_price(key)?;
        }
        Ok(quote.shares)
    }

    /// One fully validated deposit: the shared body behind [`deposit`]
    /// (Self::deposit) and each batch element. Assumes the pause flag was
    /// already checked and that a transactional scope is active.
    fn deposit_element(
        &mut self,
        sender: &AccountId,
        receiver: &AccountId,
        term: &TermId,
        curve: CurveId,
        assets: u128,
        min_shares: u128,
    ) -> Result<u128> {
        if !self.state.approvals.can_deposit(receiver, sender) {
            return Err(Error::SenderNotApproved {
                receiver: receiver.clone(),
                sender: sender.clone(),
            });
        }
        if assets < self.config.min_deposit {
            return Err(Error::DepositBelowMinimum {
                provided: assets,
                min: self.config.min_deposit,
            });
        }
        let kind = self
            .state
            .terms
            .kind(term)
            .ok_or(TermError::TermNotFound { term: *term })?;

        let plan = self.plan_deposit(*term, curve, assets, DepositMode::Deposit)?;

        if kind.is_triple_family() {
            if let Some(opposite) = self.state.terms.opposite_of(term) {
                let held = self
                    .state
                    .vaults
                    .balance_of(&VaultKey::new(opposite, curve), receiver);
                if held > 0 {
                    return Err(Error::HasCounterStake {
                        receiver: receiver.clone(),
                        opposite,
                    });
                }
            }
        }
        if plan.quote.shares < min_shares {
            return Err(Error::SlippageExceeded {
                actual: plan.quote.shares,
                min: min_shares,
            });
        }
        self.check_deposit_caps(&plan)?;

        self.apply_deposit(sender, receiver, plan)
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Deposits `assets` into `(term, curve)` for `receiver`, minting at
    /// least `min_shares` or failing.
    ///
    /// The sender must be the receiver or hold a deposit grant from them.
    pub fn deposit(
        &mut self,
        sender: &AccountId,
        receiver: &AccountId,
        term: &TermId,
        curve: CurveId,
        assets: u128,
        min_shares: u128,
    ) -> Result<u128> {
        self.ensure_active()?;
        let term = *term;
        let shares = self.transactional(move |lg| {
            lg.deposit_element(sender, receiver, &term, curve, assets, min_shares)
        })?;
        debug!(%term, curve = curve.value(), assets, shares, "deposit applied");
        Ok(shares)
    }

    /// Deposits over parallel arrays, all-or-nothing. Array shape problems
    /// reject the batch before any element runs, and the first failing
    /// element unwinds every earlier one.
    pub fn deposit_batch(
        &mut self,
        sender: &AccountId,
        receivers: &[AccountId],
        terms: &[TermId],
        curves: &[CurveId],
        amounts: &[u128],
        min_shares: &[u128],
    ) -> Result<Vec<u128>> {
        self.ensure_active()?;
        Self::check_batch_size(receivers.len())?;
        Self::check_same_length(receivers.len(), terms.len())?;
        Self::check_same_length(receivers.len(), curves.len())?;
        Self::check_same_length(receivers.len(), amounts.len())?;
        Self::check_same_length(receivers.len(), min_shares.len())?;

        let minted = self.transactional(|lg| {
            let mut minted = Vec::with_capacity(receivers.len());
            for i in 0..receivers.len() {
                minted.push(lg.deposit_element(
                    sender,
                    &receivers[i],
                    &terms[i],
                    curves[i],
                    amounts[i],
                    min_shares[i],
                )?);
            }
            Ok(minted)
        })?;
        debug!(count = minted.len(), "deposit batch applied");
        Ok(minted)
    }

    /// Prices a deposit without executing it. The returned quote is exactly
    /// what [`deposit`](Self::deposit) would apply for the same arguments.
    pub fn preview_deposit(
        &self,
        term: &TermId,
        curve: CurveId,
        assets: u128,
    ) -> Result<DepositQuote> {
        if assets < self.config.min_deposit {
            return Err(Error::DepositBelowMinimum {
                provided: assets,
                min: self.config.min_deposit,
            });
        }
        let plan = self.plan_deposit(*term, curve, assets, DepositMode::Deposit)?;
        self.check_deposit_caps(&plan)?;
        Ok(plan.quote)
    }

    pub(super) fn check_batch_size(len: usize) -> Result<()> {
        if len == 0 || len > MAX_BATCH_SIZE {
            return Err(Error::ArraySizeOutOfBounds {
                len,
                max: MAX_BATCH_SIZE,
            });
        }
        Ok(())
    }

    pub(super) fn check_same_length(left: usize, right: usize) -> Result<()> {
        if left != right {
            return Err(Error::ArrayLengthMismatch { left, right });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::curves::{CurveRegistry, LinearCurve};
    use crate::epochs::ManualEpochSource;
    use crate::wallets::HashWalletResolver;
    use std::sync::Arc;

    fn engine() -> MultiVault {
        let mut curves = CurveRegistry::standard();
        curves
            .register(CurveId::new(2), Box::new(LinearCurve::uncapped()))
            .unwrap();
        MultiVault::new(
            LedgerConfig::default(),
            curves,
            Arc::new(ManualEpochSource::starting_at(0)),
            Arc::new(HashWalletResolver::default()),
        )
        .unwrap()
    }

    fn alice() -> AccountId {
        AccountId::from("alice")
    }

    fn created_atom(vault: &mut MultiVault) -> TermId {
        let cost = vault.atom_cost();
        vault
            .create_atom(&alice(), b"test atom".to_vec(), cost)
            .unwrap()
    }

    #[test]
    fn deposit_on_missing_term_rejected() {
        let mut vault = engine();
        let missing = crate::terms::atom_id(b"missing");
        let result = vault.deposit(&alice(), &alice(), &missing, CurveId::new(1), 10_000_000, 0);
        assert!(matches!(
            result,
            Err(Error::Term(TermError::TermNotFound { .. }))
        ));
    }

    #[test]
    fn bare_deposit_cannot_bootstrap_default_curve() {
        let mut vault = engine();
        // Register a term directly, sidestepping the creation flow, so its
        // default-curve vault has no floor yet.
        let orphan = vault
            .state
            .terms
            .create_atom(b"orphan".to_vec(), 250)
            .unwrap();
        let result = vault.deposit(&alice(), &alice(), &orphan, CurveId::new(1), 10_000_000, 0);
        assert!(matches!(
            result,
            Err(Error::DefaultCurveMustBootstrapViaCreate { term }) if term == orphan
        ));
    }

    #[test]
    fn non_default_bootstrap_must_clear_the_floor() {
        let mut vault = engine();
        let atom = created_atom(&mut vault);
        let floor = vault.config().min_share;
        let result = vault.deposit(&alice(), &alice(), &atom, CurveId::new(2), floor, 0);
        assert!(matches!(result, Err(Error::DepositBelowFloor { .. })));
    }

    #[test]
    fn bootstrap_deposit_prices_as_if_floor_existed() {
        let mut vault = engine();
        let atom = created_atom(&mut vault);
        let floor = vault.config().min_share;
        let assets = 10 * crate::config::ONE_TRL;

        let quote = vault.preview_deposit(&atom, CurveId::new(2), assets).unwrap();
        assert!(quote.bootstraps_vault);
        assert_eq!(quote.ghost_shares, floor);
        assert_eq!(quote.base, assets - floor);
        // Entry fee waived on bootstrap.
        assert_eq!(quote.entry_fee, 0);
        assert!(quote.shares > 0);

        let shares = vault
            .deposit(&alice(), &alice(), &atom, CurveId::new(2), assets, quote.shares)
            .unwrap();
        assert_eq!(shares, quote.shares);
        // Ghost shares live with the burn holder.
        assert_eq!(
            vault.get_shares(&AccountId::burn(), &atom, CurveId::new(2)),
            floor
        );
    }

    #[test]
    fn deposit_batch_rejects_bad_shapes_before_running() {
        let mut vault = engine();
        let atom = created_atom(&mut vault);
        let result = vault.deposit_batch(
            &alice(),
            &[alice(), alice()],
            &[atom],
            &[CurveId::new(1), CurveId::new(1)],
            &[10_000_000, 10_000_000],
            &[0, 0],
        );
        assert_eq!(
            result,
            Err(Error::ArrayLengthMismatch { left: 2, right: 1 })
        );

        let empty: Vec<AccountId> = Vec::new();
        let result = vault.deposit_batch(&alice(), &empty, &[], &[], &[], &[]);
        assert!(matches!(result, Err(Error::ArraySizeOutOfBounds { .. })));
    }

    #[test]
    fn failed_batch_leaves_no_trace() {
        let mut vault = engine();
        let atom = created_atom(&mut vault);
        let good = 10_000_000u128;
        let events_before = vault.events().len();
        let shares_before = vault.get_shares(&alice(), &atom, CurveId::new(1));

        // Second element requests impossible slippage.
        let result = vault.deposit_batch(
            &alice(),
            &[alice(), alice()],
            &[atom, atom],
            &[CurveId::new(1), CurveId::new(1)],
            &[good, good],
            &[0, u128::MAX],
        );
        assert!(matches!(result, Err(Error::SlippageExceeded { .. })));
        assert_eq!(vault.events().len(), events_before);
        assert_eq!(vault.get_shares(&alice(), &atom, CurveId::new(1)), shares_before);
    }

    #[test]
    fn unapproved_sender_rejected() {
        let mut vault = engine();
        let atom = created_atom(&mut vault);
        let bob = AccountId::from("bob");
        let result = vault.deposit(&bob, &alice(), &atom, CurveId::new(1), 10_000_000, 0);
        assert!(matches!(result, Err(Error::SenderNotApproved { .. })));
    }

    #[test]
    fn preview_matches_execution() {
        let mut vault = engine();
        let atom = created_atom(&mut vault);
        let assets = 3 * crate::config::ONE_TRL;

        let quote = vault.preview_deposit(&atom, CurveId::new(1), assets).unwrap();
        let shares = vault
            .deposit(&alice(), &alice(), &atom, CurveId::new(1), assets, 0)
            .unwrap();
        assert_eq!(shares, quote.shares);

        let (total_assets, _) = vault.vault_totals(&atom, CurveId::new(1));
        // Floor + staked; entry fee was waived below threshold, wallet and
        // protocol fees leave the vault.
        assert_eq!(
            total_assets,
            vault.config().min_share + quote.assets_staked
        );
    }

    #[test]
    fn fees_computed_on_gross_base() {
        let mut vault = engine();
        let atom = created_atom(&mut vault);
        let assets = crate::config::ONE_TRL;
        let quote = vault.preview_deposit(&atom, CurveId::new(1), assets).unwrap();

        let schedule = &vault.config().fees;
        assert_eq!(quote.protocol_fee, schedule.protocol_fee(assets).unwrap());
        assert_eq!(
            quote.atom_wallet_fee,
            schedule.atom_wallet_fee(assets).unwrap()
        );
        assert_eq!(
            quote.assets_staked,
            assets - quote.protocol_fee - quote.atom_wallet_fee
        );
    }
}
