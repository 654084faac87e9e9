//! Term creation: atoms, triples, and their batch forms.
//!
//! Creation is a registry insert plus a deposit. The caller pays a fixed
//! cost — a static protocol fee and one floor unit per vault being
//! bootstrapped — and anything above it flows through the ordinary deposit
//! waterfall into the term's fresh default-curve vault:
//!
//! ```text
//!   atom cost   = atom_static_fee   + min_share
//!   triple cost = triple_static_fee + 2 × min_share   (both sides floored)
//!
//!   assets − cost  ──►  fee waterfall  ──►  creator's opening stake
//! ```
//!
//! A triple and its counter-triple are inseparable: one call registers both
//! ids and floors both default-curve vaults, so neither side can be staked
//! before the other exists. The creator's excess lands in the positive
//! vault only.

use tracing::info;

use crate::accounts::AccountId;
use crate::events::{FeeDestination, FeeKind, LedgerEvent};
use crate::terms::TermId;

use super::deposit::DepositMode;
use super::engine::MultiVault;
use super::error::{Error, Result};

impl MultiVault {
    // -----------------------------------------------------------------------
    // Elements
    // -----------------------------------------------------------------------

    /// Accrues a fixed creation fee into the current epoch's protocol
    /// bucket.
    fn accrue_static_fee(&mut self, amount: u128) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let epoch = self.current_epoch();
        self.state.fees.accrue_protocol(epoch, amount)?;
        self.events.push(LedgerEvent::FeeAccrued {
            kind: FeeKind::Protocol,
            amount,
            destination: FeeDestination::ProtocolEpoch { epoch },
        });
        Ok(())
    }

    /// One atom creation inside an open transactional scope.
    fn create_atom_element(
        &mut self,
        creator: &AccountId,
        payload: Vec<u8>,
        assets: u128,
    ) -> Result<TermId> {
        let term = self
            .state
            .terms
            .create_atom(payload.clone(), self.config.max_atom_payload_len)?;

        let cost = self.config.atom_cost();
        if assets < cost {
            return Err(Error::InsufficientAssets {
                provided: assets,
                required: cost,
            });
        }
        let excess = assets - cost;

        let plan = self.plan_deposit(
            term,
            self.config.default_curve_id,
            excess,
            DepositMode::Create,
        )?;
        self.check_deposit_caps(&plan)?;

        let wallet = self.wallets.wallet_address(&term);
        self.events.push(LedgerEvent::AtomCreated {
            creator: creator.clone(),
            term,
            wallet,
            payload,
        });
        self.accrue_static_fee(self.config.atom_static_fee)?;
        self.apply_deposit(creator, creator, plan)?;
        Ok(term)
    }

    /// One triple creation inside an open transactional scope.
    fn create_triple_element(
        &mut self,
        creator: &AccountId,
        subject: TermId,
        predicate: TermId,
        object: TermId,
        assets: u128,
    ) -> Result<TermId> {
        let (triple, counter) = self.state.terms.create_triple(subject, predicate, object)?;

        let cost = self.config.triple_cost();
        if assets < cost {
            return Err(Error::InsufficientAssets {
                provided: assets,
                required: cost,
            });
        }
        let excess = assets - cost;

        // The plan also floors the counter-triple's vault; triple_cost
        // funded both sides.
        let plan = self.plan_deposit(
            triple,
            self.config.default_curve_id,
            excess,
            DepositMode::Create,
        )?;
        self.check_deposit_caps(&plan)?;

        self.events.push(LedgerEvent::TripleCreated {
            creator: creator.clone(),
            term: triple,
            counter_term: counter,
            subject,
            predicate,
            object,
        });
        self.accrue_static_fee(self.config.triple_static_fee)?;
        self.apply_deposit(creator, creator, plan)?;
        Ok(triple)
    }

    // -----------------------------------------------------------------------
    // Entry points
    // -----------------------------------------------------------------------

    /// Creates an atom from `payload`, charging [`atom_cost`]
    /// (Self::atom_cost) out of `assets` and staking the excess for the
    /// creator.
    ///
    /// Returns the new atom's id.
    pub fn create_atom(
        &mut self,
        creator: &AccountId,
        payload: Vec<u8>,
        assets: u128,
    ) -> Result<TermId> {
        self.ensure_active()?;
        let term =
            self.transactional(move |lg| lg.create_atom_element(creator, payload, assets))?;
        info!(%term, creator = %creator, "atom created");
        Ok(term)
    }

    /// Creates several atoms in one all-or-nothing unit. Each payload pays
    /// the full atom cost out of its paired assets entry.
    pub fn create_atoms(
        &mut self,
        creator: &AccountId,
        payloads: &[Vec<u8>],
        assets: &[u128],
    ) -> Result<Vec<TermId>> {
        self.ensure_active()?;
        Self::check_batch_size(payloads.len())?;
        Self::check_same_length(payloads.len(), assets.len())?;

        let terms = self.transactional(|lg| {
            let mut terms = Vec::with_capacity(payloads.len());
            for (payload, amount) in payloads.iter().zip(assets) {
                terms.push(lg.create_atom_element(creator, payload.clone(), *amount)?);
            }
            Ok(terms)
        })?;
        info!(count = terms.len(), creator = %creator, "atom batch created");
        Ok(terms)
    }

    /// Creates a triple over three existing terms, registering its
    /// counter-triple and flooring both default-curve vaults.
    ///
    /// Returns the positive triple's id; the counter id is reachable via
    /// [`counter_id_of`](Self::counter_id_of).
    pub fn create_triple(
        &mut self,
        creator: &AccountId,
        subject: TermId,
        predicate: TermId,
        object: TermId,
        assets: u128,
    ) -> Result<TermId> {
        self.ensure_active()?;
        let term = self.transactional(move |lg| {
            lg.create_triple_element(creator, subject, predicate, object, assets)
        })?;
        info!(%term, creator = %creator, "triple created");
        Ok(term)
    }

    /// Creates several triples in one all-or-nothing unit over parallel
    /// component arrays.
    pub fn create_triples(
        &mut self,
        creator: &AccountId,
        subjects: &[TermId],
        predicates: &[TermId],
        objects: &[TermId],
        assets: &[u128],
    ) -> Result<Vec<TermId>> {
        self.ensure_active()?;
        Self::check_batch_size(subjects.len())?;
        Self::check_same_length(subjects.len(), predicates.len())?;
        Self::check_same_length(subjects.len(), objects.len())?;
        Self::check_same_length(subjects.len(), assets.len())?;

        let terms = self.transactional(|lg| {
            let mut terms = Vec::with_capacity(subjects.len());
            for i in 0..subjects.len() {
                terms.push(lg.create_triple_element(
                    creator,
                    subjects[i],
                    predicates[i],
                    objects[i],
                    assets[i],
                )?);
            }
            Ok(terms)
        })?;
        info!(count = terms.len(), creator = %creator, "triple batch created");
        Ok(terms)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LedgerConfig, ONE_TRL};
    use crate::curves::CurveId;
    use crate::terms::{TermError, TermKind};

    fn engine() -> MultiVault {
        MultiVault::standard(LedgerConfig::default()).unwrap()
    }

    fn alice() -> AccountId {
        AccountId::from("alice")
    }

    fn default_curve() -> CurveId {
        CurveId::new(crate::config::DEFAULT_CURVE_ID)
    }

    #[test]
    fn underfunded_atom_leaves_no_trace() {
        let mut vault = engine();
        let cost = vault.atom_cost();
        let result = vault.create_atom(&alice(), b"hello".to_vec(), cost - 1);
        assert!(matches!(
            result,
            Err(Error::InsufficientAssets { provided, required })
                if provided == cost - 1 && required == cost
        ));
        assert_eq!(vault.terms().term_count(), 0);
        assert_eq!(vault.events().len(), 0);
    }

    #[test]
    fn exact_cost_creates_floored_vault_with_no_creator_stake() {
        let mut vault = engine();
        let min_share = vault.config().min_share;
        let static_fee = vault.config().atom_static_fee;
        let cost = vault.atom_cost();

        let atom = vault.create_atom(&alice(), b"hello".to_vec(), cost).unwrap();

        assert_eq!(vault.term_kind(&atom), Some(TermKind::Atom));
        let (total_assets, total_shares) = vault.vault_totals(&atom, default_curve());
        assert_eq!(total_assets, min_share);
        assert_eq!(total_shares, min_share);
        assert_eq!(
            vault.get_shares(&AccountId::burn(), &atom, default_curve()),
            min_share
        );
        assert_eq!(vault.get_shares(&alice(), &atom, default_curve()), 0);
        assert_eq!(vault.protocol_fees_accrued(0), static_fee);
        assert_eq!(vault.personal_utilization(&alice(), 0), 0);
    }

    #[test]
    fn excess_is_staked_through_the_waterfall() {
        let mut vault = engine();
        let cost = vault.atom_cost();
        let excess = ONE_TRL;

        let atom = vault
            .create_atom(&alice(), b"hello".to_vec(), cost + excess)
            .unwrap();

        let schedule = vault.config().fees;
        let protocol = schedule.protocol_fee(excess).unwrap();
        let wallet_fee = schedule.atom_wallet_fee(excess).unwrap();
        let staked = excess - protocol - wallet_fee;

        // Entry fee is waived on a bootstrapping vault, so only the
        // protocol and wallet legs fire.
        assert_eq!(
            vault.get_shares(&alice(), &atom, default_curve()),
            staked,
            "fresh linear vault mints one share per staked mote"
        );
        assert_eq!(
            vault.protocol_fees_accrued(0),
            vault.config().atom_static_fee + protocol
        );
        let wallet = vault.wallet_address_of(&atom).unwrap();
        assert_eq!(vault.wallet_fees_accrued(&wallet), wallet_fee);
        assert_eq!(vault.personal_utilization(&alice(), 0), excess as i128);
    }

    #[test]
    fn duplicate_atom_rejected() {
        let mut vault = engine();
        let cost = vault.atom_cost();
        vault.create_atom(&alice(), b"same".to_vec(), cost).unwrap();
        let result = vault.create_atom(&alice(), b"same".to_vec(), cost);
        assert!(matches!(
            result,
            Err(Error::Term(TermError::AlreadyExists { .. }))
        ));
    }

    #[test]
    fn creation_event_order_is_stable() {
        let mut vault = engine();
        let cost = vault.atom_cost();
        vault.create_atom(&alice(), b"hello".to_vec(), cost).unwrap();

        let kinds: Vec<&str> = vault
            .events()
            .iter()
            .map(|e| match e {
                LedgerEvent::AtomCreated { .. } => "atom_created",
                LedgerEvent::FeeAccrued { .. } => "fee_accrued",
                LedgerEvent::Deposited { .. } => "deposited",
                LedgerEvent::SharePriceChanged { .. } => "share_price_changed",
                _ => "other",
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "atom_created",
                "fee_accrued",
                "deposited",
                "share_price_changed"
            ]
        );
    }

    #[test]
    fn triple_floors_both_sides() {
        let mut vault = engine();
        let cost = vault.atom_cost();
        let s = vault.create_atom(&alice(), b"s".to_vec(), cost).unwrap();
        let p = vault.create_atom(&alice(), b"p".to_vec(), cost).unwrap();
        let o = vault.create_atom(&alice(), b"o".to_vec(), cost).unwrap();

        let min_share = vault.config().min_share;
        let excess = ONE_TRL;
        let triple = vault
            .create_triple(&alice(), s, p, o, vault.triple_cost() + excess)
            .unwrap();
        let counter = vault.counter_id_of(&triple).unwrap();

        assert_eq!(vault.term_kind(&triple), Some(TermKind::Triple));
        assert_eq!(vault.term_kind(&counter), Some(TermKind::CounterTriple));
        assert_eq!(vault.triple_id_of(&counter), Some(triple));

        // Both defaults floored; excess staked on the positive side only.
        let (counter_assets, counter_shares) = vault.vault_totals(&counter, default_curve());
        assert_eq!((counter_assets, counter_shares), (min_share, min_share));
        let (triple_assets, _) = vault.vault_totals(&triple, default_curve());
        assert!(triple_assets > min_share);
        assert!(vault.get_shares(&alice(), &triple, default_curve()) > 0);
        assert_eq!(vault.get_shares(&alice(), &counter, default_curve()), 0);
    }

    #[test]
    fn triple_over_missing_component_rejected() {
        let mut vault = engine();
        let cost = vault.atom_cost();
        let s = vault.create_atom(&alice(), b"s".to_vec(), cost).unwrap();
        let missing = crate::terms::atom_id(b"missing");
        let result = vault.create_triple(&alice(), s, missing, s, vault.triple_cost());
        assert!(matches!(
            result,
            Err(Error::Term(TermError::TermNotFound { .. }))
        ));
    }

    #[test]
    fn nested_triple_accepted_as_component() {
        let mut vault = engine();
        let cost = vault.atom_cost();
        let s = vault.create_atom(&alice(), b"s".to_vec(), cost).unwrap();
        let p = vault.create_atom(&alice(), b"p".to_vec(), cost).unwrap();
        let o = vault.create_atom(&alice(), b"o".to_vec(), cost).unwrap();
        let inner = vault
            .create_triple(&alice(), s, p, o, vault.triple_cost())
            .unwrap();

        let outer = vault
            .create_triple(&alice(), inner, p, o, vault.triple_cost())
            .unwrap();
        assert_eq!(vault.term_kind(&outer), Some(TermKind::Triple));
    }

    #[test]
    fn counter_triple_rejected_as_component() {
        let mut vault = engine();
        let cost = vault.atom_cost();
        let s = vault.create_atom(&alice(), b"s".to_vec(), cost).unwrap();
        let p = vault.create_atom(&alice(), b"p".to_vec(), cost).unwrap();
        let o = vault.create_atom(&alice(), b"o".to_vec(), cost).unwrap();
        let triple = vault
            .create_triple(&alice(), s, p, o, vault.triple_cost())
            .unwrap();
        let counter = vault.counter_id_of(&triple).unwrap();

        let result = vault.create_triple(&alice(), counter, p, o, vault.triple_cost());
        assert!(matches!(
            result,
            Err(Error::Term(TermError::TermNotFound { .. }))
        ));
    }

    #[test]
    fn atom_batch_is_all_or_nothing() {
        let mut vault = engine();
        let cost = vault.atom_cost();
        let result = vault.create_atoms(
            &alice(),
            &[b"one".to_vec(), b"two".to_vec()],
            &[cost, cost - 1],
        );
        assert!(matches!(result, Err(Error::InsufficientAssets { .. })));
        assert_eq!(vault.terms().term_count(), 0);
        assert_eq!(vault.events().len(), 0);
    }

    #[test]
    fn atom_batch_creates_in_order() {
        let mut vault = engine();
        let cost = vault.atom_cost();
        let terms = vault
            .create_atoms(
                &alice(),
                &[b"one".to_vec(), b"two".to_vec(), b"three".to_vec()],
                &[cost, cost, cost],
            )
            .unwrap();
        assert_eq!(terms.len(), 3);
        assert_eq!(terms[0], crate::terms::atom_id(b"one"));
        assert_eq!(vault.terms().term_count(), 3);
    }

    #[test]
    fn triple_batch_shape_checked_up_front() {
        let mut vault = engine();
        let cost = vault.atom_cost();
        let s = vault.create_atom(&alice(), b"s".to_vec(), cost).unwrap();
        let result = vault.create_triples(&alice(), &[s, s], &[s], &[s, s], &[0, 0]);
        assert_eq!(result, Err(Error::ArrayLengthMismatch { left: 2, right: 1 }));
        // Shape errors precede economic ones: no triple was attempted.
        assert_eq!(vault.terms().term_count(), 1);
    }
}
