//! # Events
//!
//! Structured records of every state change, written in the order the
//! changes were applied. Indexers and the node's explorer read these
//! instead of diffing ledger state. Events carry no timestamps; replaying
//! the same operations yields byte-identical logs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::accounts::AccountId;
use crate::approvals::ApprovalLevel;
use crate::curves::CurveId;
use crate::terms::TermId;

/// The fee families the waterfall can charge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeKind {
    Protocol,
    Entry,
    Exit,
    AtomWallet,
    DepositFraction,
}

impl fmt::Display for FeeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Protocol => "protocol",
            Self::Entry => "entry",
            Self::Exit => "exit",
            Self::AtomWallet => "atom_wallet",
            Self::DepositFraction => "deposit_fraction",
        };
        f.write_str(name)
    }
}

/// Where a collected fee landed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "to", rename_all = "snake_case")]
pub enum FeeDestination {
    /// The current epoch's protocol bucket.
    ProtocolEpoch { epoch: u64 },
    /// An atom wallet's accrual.
    AtomWallet { wallet: AccountId },
    /// Credited to a vault's assets without minting shares.
    Vault { term: TermId, curve: CurveId },
    /// Retained split remainder.
    Dust,
}

/// One entry in the ledger's event log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// An atom was registered and its default-curve vault bootstrapped.
    AtomCreated {
        creator: AccountId,
        term: TermId,
        /// The wallet address that accrues this atom's wallet fees.
        wallet: AccountId,
        /// The atom payload, hex-encoded.
        #[serde(with = "hex")]
        payload: Vec<u8>,
    },

    /// A triple and its counter-triple were registered.
    TripleCreated {
        creator: AccountId,
        term: TermId,
        counter_term: TermId,
        subject: TermId,
        predicate: TermId,
        object: TermId,
    },

    /// Assets entered a vault and shares were minted.
    Deposited {
        sender: AccountId,
        receiver: AccountId,
        term: TermId,
        curve: CurveId,
        /// What the sender paid, before any fee.
        assets_gross: u128,
        /// What actually entered the vault's stake for the receiver.
        assets_staked: u128,
        shares_minted: u128,
        /// The receiver's balance after the mint.
        receiver_shares: u128,
        /// The vault's share total after the mint.
        total_shares: u128,
    },

    /// Shares were burned and assets left a vault.
    Redeemed {
        sender: AccountId,
        receiver: AccountId,
        term: TermId,
        curve: CurveId,
        shares_burned: u128,
        /// The raw value of the burned shares, before any fee.
        assets_gross: u128,
        /// What the receiver was actually paid.
        assets_paid: u128,
        /// The receiver's balance after the burn.
        receiver_shares: u128,
        /// The vault's share total after the burn.
        total_shares: u128,
    },

    /// A fee was charged and routed.
    FeeAccrued {
        kind: FeeKind,
        amount: u128,
        destination: FeeDestination,
    },

    /// A vault's assets or shares changed, moving its implied share price.
    SharePriceChanged {
        term: TermId,
        curve: CurveId,
        /// Assets per share, scaled by the price scale.
        price: u128,
        total_assets: u128,
        total_shares: u128,
    },

    /// A receiver changed a sender's grant.
    ApprovalSet {
        receiver: AccountId,
        sender: AccountId,
        level: ApprovalLevel,
    },

    /// An epoch's protocol bucket was drained to the treasury.
    ProtocolFeesSwept {
        epoch: u64,
        amount: u128,
        treasury: AccountId,
    },

    /// An atom wallet drained its fee accrual.
    AtomWalletFeesClaimed { wallet: AccountId, amount: u128 },

    /// The pause flag flipped.
    PauseChanged { paused: bool },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
