//! # Scenarios
//!
//! Declarative scripts that drive a ledger through a sequence of
//! operations. A scenario is a JSON file: a name, a description, and an
//! ordered list of steps. Replaying the same scenario against a fresh
//! ledger always yields the same event log, which makes scenario files
//! the node's seeding mechanism, its demo content, and its regression
//! fixtures all at once.
//!
//! Terms are referenced three ways: by atom payload (the id is derived,
//! so no bookkeeping is needed), by a `label` bound on an earlier
//! creation step, or by literal hex id. `counter_of` wraps any of these
//! to reach the negative side of a triple.
//!
//! ```json
//! {
//!   "name": "smoke",
//!   "description": "one atom, one stake",
//!   "steps": [
//!     { "op": "create_atom", "creator": "alice", "payload": "city:lisbon",
//!       "assets": 2000001000000, "label": "lisbon" },
//!     { "op": "deposit", "receiver": "bob", "term": { "ref": "lisbon" },
//!       "assets": 5000000000 }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use trellis_ledger::accounts::AccountId;
use trellis_ledger::approvals::ApprovalLevel;
use trellis_ledger::config::{LedgerConfig, ONE_TRL};
use trellis_ledger::curves::CurveId;
use trellis_ledger::epochs::ManualEpochSource;
use trellis_ledger::multivault::MultiVault;
use trellis_ledger::terms::{atom_id, TermId};

// ---------------------------------------------------------------------------
// Scenario format
// ---------------------------------------------------------------------------

/// A named, ordered list of ledger operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Short identifier, echoed in summaries and logs.
    pub name: String,
    /// One-line description of what the scenario demonstrates.
    #[serde(default)]
    pub description: String,
    /// Steps applied in order. The run stops at the first failure.
    pub steps: Vec<Step>,
}

/// A reference to a term from inside a scenario file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermRef {
    /// An atom named by its payload string; the id is derived from it.
    Atom { atom: String },
    /// A label bound by an earlier creation step in the same scenario.
    Label {
        #[serde(rename = "ref")]
        label: String,
    },
    /// The counter-triple of whatever the inner reference resolves to.
    CounterOf { counter_of: Box<TermRef> },
    /// A literal 64-character hex term id.
    Id { id: String },
}

impl TermRef {
    /// Resolves the reference against the label table and the ledger.
    fn resolve(&self, labels: &BTreeMap<String, TermId>, vault: &MultiVault) -> Result<TermId> {
        match self {
            TermRef::Atom { atom } => Ok(atom_id(atom.as_bytes())),
            TermRef::Label { label } => labels
                .get(label)
                .copied()
                .with_context(|| format!("label {label:?} is not bound by any earlier step")),
            TermRef::CounterOf { counter_of } => {
                let inner = counter_of.resolve(labels, vault)?;
                vault
                    .counter_id_of(&inner)
                    .with_context(|| format!("term {inner} has no counter side"))
            }
            TermRef::Id { id } => {
                TermId::from_hex(id).with_context(|| format!("invalid term id {id:?}"))
            }
        }
    }
}

fn default_curve() -> u64 {
    trellis_ledger::config::DEFAULT_CURVE_ID
}

fn one() -> u64 {
    1
}

/// A single ledger operation.
///
/// Amounts are motes. `curve` defaults to the default curve, slippage
/// bounds default to "accept anything", and `sender` defaults to the
/// receiver acting for themselves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Register an atom and bootstrap its default-curve vault.
    CreateAtom {
        /// Binds the new term id to a name later steps can `ref`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        creator: String,
        /// Payload string; the term id is derived from its bytes.
        payload: String,
        assets: u128,
    },
    /// Register a triple (and its counter) over three existing terms.
    CreateTriple {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        creator: String,
        subject: TermRef,
        predicate: TermRef,
        object: TermRef,
        assets: u128,
    },
    /// Stake assets into a vault for the receiver.
    Deposit {
        /// Acting account; defaults to the receiver.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender: Option<String>,
        receiver: String,
        term: TermRef,
        #[serde(default = "default_curve")]
        curve: u64,
        assets: u128,
        #[serde(default)]
        min_shares: u128,
    },
    /// Burn shares from the receiver's position and pay out assets.
    Redeem {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender: Option<String>,
        receiver: String,
        term: TermRef,
        #[serde(default = "default_curve")]
        curve: u64,
        /// Shares to burn; omitted means the receiver's full position.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        shares: Option<u128>,
        #[serde(default)]
        min_assets: u128,
    },
    /// Receiver grants (or revokes, via `none`) an operating level to sender.
    Approve {
        receiver: String,
        sender: String,
        level: ApprovalLevel,
    },
    /// Pay out an atom wallet's accrued fees.
    ClaimWalletFees {
        atom: TermRef,
        /// Defaults to the atom's own wallet address.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caller: Option<String>,
    },
    /// Sweep one epoch's protocol bucket to the treasury (admin only).
    SweepProtocolFees { epoch: u64 },
    /// Advance the node's manual epoch source.
    AdvanceEpoch {
        #[serde(default = "one")]
        by: u64,
    },
    /// Set the pause flag (admin only).
    Pause,
    /// Clear the pause flag (admin only).
    Unpause,
}

impl Step {
    /// The wire name of the operation, for error context and logs.
    pub fn op_name(&self) -> &'static str {
        match self {
            Step::CreateAtom { .. } => "create_atom",
            Step::CreateTriple { .. } => "create_triple",
            Step::Deposit { .. } => "deposit",
            Step::Redeem { .. } => "redeem",
            Step::Approve { .. } => "approve",
            Step::ClaimWalletFees { .. } => "claim_wallet_fees",
            Step::SweepProtocolFees { .. } => "sweep_protocol_fees",
            Step::AdvanceEpoch { .. } => "advance_epoch",
            Step::Pause => "pause",
            Step::Unpause => "unpause",
        }
    }
}

// ---------------------------------------------------------------------------
// Loading and running
// ---------------------------------------------------------------------------

impl Scenario {
    /// Reads and parses a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario file {}", path.display()))?;
        let scenario: Scenario = serde_json::from_str(&raw)
            .with_context(|| format!("parsing scenario file {}", path.display()))?;
        Ok(scenario)
    }

    /// The built-in demo: three atoms, a triple claimed over them, stakes
    /// from three accounts on both sides, an epoch boundary, and the full
    /// fee lifecycle through claim and sweep.
    pub fn demo(config: &LedgerConfig) -> Scenario {
        let atom_assets = config.atom_cost().saturating_add(2 * ONE_TRL);
        let triple_assets = config.triple_cost().saturating_add(ONE_TRL);
        let atom = |label: &str, payload: &str| Step::CreateAtom {
            label: Some(label.to_string()),
            creator: "alice".to_string(),
            payload: payload.to_string(),
            assets: atom_assets,
        };
        let claim = || TermRef::Label {
            label: "claim".to_string(),
        };
        Scenario {
            name: "demo".to_string(),
            description: "lisbon is the capital of portugal, says alice".to_string(),
            steps: vec![
                atom("lisbon", "city:lisbon"),
                atom("capital-of", "relation:capital-of"),
                atom("portugal", "country:portugal"),
                Step::CreateTriple {
                    label: Some("claim".to_string()),
                    creator: "alice".to_string(),
                    subject: TermRef::Label {
                        label: "lisbon".to_string(),
                    },
                    predicate: TermRef::Label {
                        label: "capital-of".to_string(),
                    },
                    object: TermRef::Label {
                        label: "portugal".to_string(),
                    },
                    assets: triple_assets,
                },
                Step::Approve {
                    receiver: "alice".to_string(),
                    sender: "bob".to_string(),
                    level: ApprovalLevel::Deposit,
                },
                Step::Deposit {
                    sender: Some("bob".to_string()),
                    receiver: "alice".to_string(),
                    term: claim(),
                    curve: default_curve(),
                    assets: ONE_TRL,
                    min_shares: 0,
                },
                Step::Deposit {
                    sender: None,
                    receiver: "bob".to_string(),
                    term: claim(),
                    curve: default_curve(),
                    assets: 3 * ONE_TRL,
                    min_shares: 0,
                },
                Step::AdvanceEpoch { by: 1 },
                Step::Deposit {
                    sender: None,
                    receiver: "bob".to_string(),
                    term: claim(),
                    curve: default_curve(),
                    assets: ONE_TRL,
                    min_shares: 0,
                },
                Step::Deposit {
                    sender: None,
                    receiver: "carol".to_string(),
                    term: TermRef::CounterOf {
                        counter_of: Box::new(claim()),
                    },
                    curve: default_curve(),
                    assets: ONE_TRL,
                    min_shares: 0,
                },
                Step::Redeem {
                    sender: None,
                    receiver: "bob".to_string(),
                    term: claim(),
                    curve: default_curve(),
                    shares: None,
                    min_assets: 0,
                },
                Step::ClaimWalletFees {
                    atom: TermRef::Label {
                        label: "lisbon".to_string(),
                    },
                    caller: None,
                },
                Step::SweepProtocolFees { epoch: 0 },
                Step::SweepProtocolFees { epoch: 1 },
            ],
        }
    }
}

/// What a completed run looked like.
#[derive(Clone, Debug, Serialize)]
pub struct ScenarioSummary {
    pub scenario: String,
    pub steps_applied: usize,
    pub terms: u64,
    pub vaults: usize,
    pub events: usize,
    pub epoch: u64,
    /// Labels bound during the run, as hex term ids.
    pub labels: BTreeMap<String, String>,
}

/// Applies every step of a scenario to the ledger, stopping at the first
/// failure.
///
/// The epoch source must be the one the vault reads, otherwise
/// `advance_epoch` steps would be invisible to it. A failed step leaves
/// the ledger as the previous step left it; the failing operation itself
/// rolled back.
pub fn run(
    vault: &mut MultiVault,
    epochs: &ManualEpochSource,
    scenario: &Scenario,
) -> Result<ScenarioSummary> {
    let mut labels: BTreeMap<String, TermId> = BTreeMap::new();
    for (index, step) in scenario.steps.iter().enumerate() {
        apply_step(vault, epochs, &mut labels, step)
            .with_context(|| format!("step {} ({}) failed", index + 1, step.op_name()))?;
        tracing::debug!(step = index + 1, op = step.op_name(), "scenario step applied");
    }
    Ok(ScenarioSummary {
        scenario: scenario.name.clone(),
        steps_applied: scenario.steps.len(),
        terms: vault.terms().term_count(),
        vaults: vault.vaults().len(),
        events: vault.events().len(),
        epoch: vault.current_epoch(),
        labels: labels
            .iter()
            .map(|(name, id)| (name.clone(), id.to_hex()))
            .collect(),
    })
}

fn apply_step(
    vault: &mut MultiVault,
    epochs: &ManualEpochSource,
    labels: &mut BTreeMap<String, TermId>,
    step: &Step,
) -> Result<()> {
    match step {
        Step::CreateAtom {
            label,
            creator,
            payload,
            assets,
        } => {
            let creator = AccountId::from(creator.as_str());
            let term = vault.create_atom(&creator, payload.clone().into_bytes(), *assets)?;
            if let Some(label) = label {
                labels.insert(label.clone(), term);
            }
        }
        Step::CreateTriple {
            label,
            creator,
            subject,
            predicate,
            object,
            assets,
        } => {
            let creator = AccountId::from(creator.as_str());
            let subject = subject.resolve(labels, vault)?;
            let predicate = predicate.resolve(labels, vault)?;
            let object = object.resolve(labels, vault)?;
            let term = vault.create_triple(&creator, subject, predicate, object, *assets)?;
            if let Some(label) = label {
                labels.insert(label.clone(), term);
            }
        }
        Step::Deposit {
            sender,
            receiver,
            term,
            curve,
            assets,
            min_shares,
        } => {
            let receiver = AccountId::from(receiver.as_str());
            let sender = sender
                .as_deref()
                .map(AccountId::from)
                .unwrap_or_else(|| receiver.clone());
            let term = term.resolve(labels, vault)?;
            vault.deposit(
                &sender,
                &receiver,
                &term,
                CurveId::new(*curve),
                *assets,
                *min_shares,
            )?;
        }
        Step::Redeem {
            sender,
            receiver,
            term,
            curve,
            shares,
            min_assets,
        } => {
            let receiver = AccountId::from(receiver.as_str());
            let sender = sender
                .as_deref()
                .map(AccountId::from)
                .unwrap_or_else(|| receiver.clone());
            let term = term.resolve(labels, vault)?;
            let curve = CurveId::new(*curve);
            let shares = shares.unwrap_or_else(|| vault.get_shares(&receiver, &term, curve));
            vault.redeem(&sender, &receiver, &term, curve, shares, *min_assets)?;
        }
        Step::Approve {
            receiver,
            sender,
            level,
        } => {
            let receiver = AccountId::from(receiver.as_str());
            let sender = AccountId::from(sender.as_str());
            vault.approve(&receiver, &sender, *level)?;
        }
        Step::ClaimWalletFees { atom, caller } => {
            let atom = atom.resolve(labels, vault)?;
            let caller = match caller {
                Some(caller) => AccountId::from(caller.as_str()),
                None => vault
                    .wallet_address_of(&atom)
                    .with_context(|| format!("term {atom} is not an atom"))?,
            };
            vault.claim_atom_wallet_fees(&caller, &atom)?;
        }
        Step::SweepProtocolFees { epoch } => {
            let admin = vault.config().admin.clone();
            vault.sweep_protocol_fees(&admin, *epoch)?;
        }
        Step::AdvanceEpoch { by } => {
            for _ in 0..*by {
                epochs.advance();
            }
        }
        Step::Pause => {
            let admin = vault.config().admin.clone();
            vault.pause(&admin)?;
        }
        Step::Unpause => {
            let admin = vault.config().admin.clone();
            vault.unpause(&admin)?;
        }
    }
    Ok(())
}
