//! Engine state, atomicity, and the read-only surface.
//!
//! [`MultiVault`] owns every store the ledger mutates. The mutable stores
//! that user operations touch live together in one cloneable `LedgerState`,
//! which is what makes all-or-nothing semantics cheap to provide: a mutating
//! operation snapshots the state, runs, and restores the snapshot if any
//! step fails. Curves, config, and the external sources sit outside the
//! snapshot — user operations never write to them.

use std::sync::Arc;

use tracing::info;

use crate::accounts::AccountId;
use crate::approvals::{ApprovalLevel, ApprovalRegistry};
use crate::config::LedgerConfig;
use crate::curves::{CurveId, CurveRegistry};
use crate::epochs::{EpochSource, ManualEpochSource};
use crate::events::LedgerEvent;
use crate::fees::FeeBook;
use crate::terms::{TermId, TermKind, TermRegistry};
use crate::utilization::UtilizationTracker;
use crate::vaults::{VaultBook, VaultKey};
use crate::wallets::{HashWalletResolver, WalletResolver};

use super::error::{Error, Result};

// ---------------------------------------------------------------------------
// LedgerState
// ---------------------------------------------------------------------------

/// The stores user operations mutate, grouped so one clone checkpoints all
/// of them.
#[derive(Clone, Debug, Default)]
pub(super) struct LedgerState {
    pub(super) terms: TermRegistry,
    pub(super) vaults: VaultBook,
    pub(super) fees: FeeBook,
    pub(super) utilization: UtilizationTracker,
    pub(super) approvals: ApprovalRegistry,
}

// ---------------------------------------------------------------------------
// MultiVault
// ---------------------------------------------------------------------------

/// The vault accounting and fee-distribution engine.
///
/// Operations are strictly serialized through `&mut self`; no two can
/// interleave. Every mutating entry point either fully applies or leaves
/// the engine byte-identical to before the call.
pub struct MultiVault {
    pub(super) config: LedgerConfig,
    pub(super) state: LedgerState,
    pub(super) curves: CurveRegistry,
    pub(super) epochs: Arc<dyn EpochSource>,
    pub(super) wallets: Arc<dyn WalletResolver>,
    pub(super) paused: bool,
    pub(super) events: Vec<LedgerEvent>,
}

impl MultiVault {
    /// Builds an engine from explicit collaborators.
    ///
    /// # Errors
    ///
    /// Config validation failures, or an unknown
    /// [`default_curve_id`](LedgerConfig::default_curve_id).
    pub fn new(
        config: LedgerConfig,
        curves: CurveRegistry,
        epochs: Arc<dyn EpochSource>,
        wallets: Arc<dyn WalletResolver>,
    ) -> Result<Self> {
        config.validate()?;
        curves.get(config.default_curve_id)?;
        Ok(Self {
            config,
            state: LedgerState::default(),
            curves,
            epochs,
            wallets,
            paused: false,
            events: Vec::new(),
        })
    }

    /// Builds an engine with the standard curve registry, a manual epoch
    /// source pinned at epoch zero, and the hash-based wallet resolver.
    pub fn standard(config: LedgerConfig) -> Result<Self> {
        Self::new(
            config,
            CurveRegistry::standard(),
            Arc::new(ManualEpochSource::starting_at(0)),
            Arc::new(HashWalletResolver::default()),
        )
    }

    // -- internal plumbing --------------------------------------------------

    /// Rejects the call if the pause flag is set. Runs before any other
    /// validation on every user-facing mutator.
    pub(super) fn ensure_active(&self) -> Result<()> {
        if self.paused {
            return Err(Error::Paused);
        }
        Ok(())
    }

    /// Rejects callers other than the configured admin.
    pub(super) fn ensure_admin(&self, caller: &AccountId) -> Result<()> {
        if caller != &self.config.admin {
            return Err(Error::Unauthorized {
                account: caller.clone(),
            });
        }
        Ok(())
    }

    /// Runs `f` against the live state, restoring the pre-call state and
    /// event log if it fails. This is the all-or-nothing boundary for every
    /// mutating operation, batches included.
    pub(super) fn transactional<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let checkpoint = self.state.clone();
        let event_mark = self.events.len();
        match f(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                self.state = checkpoint;
                self.events.truncate(event_mark);
                Err(e)
            }
        }
    }

    /// Converts an asset amount into the signed utilization domain.
    pub(super) fn signed_amount(amount: u128) -> Result<i128> {
        i128::try_from(amount).map_err(|_| Error::AmountTooLarge { amount })
    }

    /// The term's default-curve vault key, where entry/exit fees and the
    /// deposit fraction are routed.
    pub(super) fn default_key(&self, term: TermId) -> VaultKey {
        VaultKey::new(term, self.config.default_curve_id)
    }

    /// Shares outstanding in the term's default-curve vault. Drives the
    /// entry/exit fee waiver and the deposit-fraction gate.
    pub(super) fn default_curve_shares(&self, term: TermId) -> u128 {
        self.state.vaults.totals(&self.default_key(term)).1
    }

    /// Records the vault's post-mutation price point.
    pub(super) fn emit_share_price(&mut self, key: VaultKey) -> Result<()> {
        let (total_assets, total_shares) = self.state.vaults.totals(&key);
        let price = self
            .curves
            .get(key.curve)?
            .current_price(total_assets, total_shares)?;
        self.events.push(LedgerEvent::SharePriceChanged {
            term: key.term,
            curve: key.curve,
            price,
            total_assets,
            total_shares,
        });
        Ok(())
    }

    // -- approvals ----------------------------------------------------------

    /// Sets the caller's grant for `sender`, returning the level it
    /// replaces. [`ApprovalLevel::None`] revokes.
    pub fn approve(
        &mut self,
        caller: &AccountId,
        sender: &AccountId,
        level: ApprovalLevel,
    ) -> Result<ApprovalLevel> {
        self.ensure_active()?;
        let previous = self.state.approvals.set(caller, sender, level)?;
        self.events.push(LedgerEvent::ApprovalSet {
            receiver: caller.clone(),
            sender: sender.clone(),
            level,
        });
        Ok(previous)
    }

    // -- wallet fee claims --------------------------------------------------

    /// Pays out the accrued wallet fees for `atom` to its wallet address.
    /// Only the wallet address itself may claim. A claim with nothing
    /// accrued returns zero without recording anything.
    pub fn claim_atom_wallet_fees(&mut self, caller: &AccountId, atom: &TermId) -> Result<u128> {
        self.ensure_active()?;
        match self.state.terms.kind(atom) {
            Some(TermKind::Atom) => {}
            Some(_) => {
                // Only atoms have wallets, so nobody is the rightful
                // claimant of a triple-family term.
                return Err(Error::Unauthorized {
                    account: caller.clone(),
                });
            }
            None => return Err(crate::terms::TermError::TermNotFound { term: *atom }.into()),
        }
        let wallet = self.wallets.wallet_address(atom);
        if caller != &wallet {
            return Err(Error::Unauthorized {
                account: caller.clone(),
            });
        }
        let amount = self.state.fees.claim_wallet(&wallet);
        if amount > 0 {
            info!(%atom, %wallet, amount, "atom wallet fees claimed");
            self.events.push(LedgerEvent::AtomWalletFeesClaimed {
                wallet: wallet.clone(),
                amount,
            });
        }
        Ok(amount)
    }

    // -- read-only surface --------------------------------------------------

    /// The active configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Whether the pause flag is set.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The epoch the engine is currently accruing into.
    pub fn current_epoch(&self) -> u64 {
        self.epochs.current_epoch()
    }

    /// The event log, oldest first.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Takes the event log, leaving it empty. Lets an embedding process
    /// ship the journal elsewhere without re-reading from the start.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    /// The term registry.
    pub fn terms(&self) -> &TermRegistry {
        &self.state.terms
    }

    /// The vault book.
    pub fn vaults(&self) -> &VaultBook {
        &self.state.vaults
    }

    /// The fee accrual book.
    pub fn fee_book(&self) -> &FeeBook {
        &self.state.fees
    }

    /// The utilization tracker.
    pub fn utilization(&self) -> &UtilizationTracker {
        &self.state.utilization
    }

    /// The approval registry.
    pub fn approvals(&self) -> &ApprovalRegistry {
        &self.state.approvals
    }

    /// The registered curve ids, ascending.
    pub fn curve_ids(&self) -> Vec<CurveId> {
        self.curves.ids()
    }

    /// A curve's display name.
    pub fn curve_name(&self, curve: CurveId) -> Result<&'static str> {
        Ok(self.curves.get(curve)?.name())
    }

    /// The fixed cost of creating an atom.
    pub fn atom_cost(&self) -> u128 {
        self.config.atom_cost()
    }

    /// The fixed cost of creating a triple.
    pub fn triple_cost(&self) -> u128 {
        self.config.triple_cost()
    }

    /// Whether the id names a created term.
    pub fn is_term_created(&self, term: &TermId) -> bool {
        self.state.terms.is_created(term)
    }

    /// The kind of a created term.
    pub fn term_kind(&self, term: &TermId) -> Option<TermKind> {
        self.state.terms.kind(term)
    }

    /// A triple's counter-triple id.
    pub fn counter_id_of(&self, triple: &TermId) -> Option<TermId> {
        self.state.terms.counter_of(triple)
    }

    /// A counter-triple's positive triple id.
    pub fn triple_id_of(&self, counter: &TermId) -> Option<TermId> {
        self.state.terms.triple_of(counter)
    }

    /// An account's share balance in `(term, curve)`.
    pub fn get_shares(&self, account: &AccountId, term: &TermId, curve: CurveId) -> u128 {
        self.state
            .vaults
            .balance_of(&VaultKey::new(*term, curve), account)
    }

    /// A vault's `(total_assets, total_shares)`.
    pub fn vault_totals(&self, term: &TermId, curve: CurveId) -> (u128, u128) {
        self.state.vaults.totals(&VaultKey::new(*term, curve))
    }

    /// A vault's current share price under its curve.
    pub fn current_share_price(&self, term: &TermId, curve: CurveId) -> Result<u128> {
        let (total_assets, total_shares) = self.vault_totals(term, curve);
        Ok(self
            .curves
            .get(curve)?
            .current_price(total_assets, total_shares)?)
    }

    /// An account's utilization as of `epoch`, answered from its bounded
    /// recent-epoch ring.
    pub fn utilization_as_of(&self, account: &AccountId, epoch: u64) -> Result<i128> {
        Ok(self
            .state
            .utilization
            .as_of(account, epoch, self.current_epoch())?)
    }

    /// The global utilization total for `epoch`.
    pub fn total_utilization(&self, epoch: u64) -> i128 {
        self.state.utilization.total_at(epoch)
    }

    /// An account's raw per-epoch utilization value.
    pub fn personal_utilization(&self, account: &AccountId, epoch: u64) -> i128 {
        self.state.utilization.personal_at(account, epoch)
    }

    /// The stored grant from `receiver` to `sender`.
    pub fn approval_between(&self, receiver: &AccountId, sender: &AccountId) -> ApprovalLevel {
        self.state.approvals.level(receiver, sender)
    }

    /// Protocol fees accrued for `epoch` and not yet swept.
    pub fn protocol_fees_accrued(&self, epoch: u64) -> u128 {
        self.state.fees.protocol_accrued(epoch)
    }

    /// The wallet address fees accrue to for a created atom.
    pub fn wallet_address_of(&self, atom: &TermId) -> Option<AccountId> {
        match self.state.terms.kind(atom) {
            Some(TermKind::Atom) => Some(self.wallets.wallet_address(atom)),
            _ => None,
        }
    }

    /// Unclaimed fees accrued to a wallet address.
    pub fn wallet_fees_accrued(&self, wallet: &AccountId) -> u128 {
        self.state.fees.wallet_accrued(wallet)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
