//! # Atom Wallet Resolver
//!
//! Every atom has an associated wallet account whose address is a pure
//! function of the atom's id:
//!
//! ```text
//! atom_id (32 bytes)
//!     -> BLAKE3_derive("…atom-wallet", atom_id) -> 32 bytes
//!     -> Bech32("trell", hash) -> trell1qw508d6qe…
//! ```
//!
//! Atom-wallet deposit fees accrue against this derived address, and only a
//! caller presenting exactly this address may claim them. The ledger does
//! not create or manage the wallet itself — how the address gets keys is the
//! wallet factory's business, outside this crate. Determinism is the whole
//! contract: anyone can derive the address for any atom, before or after
//! fees ever accrue, and two deployments agree without coordination.

use bech32::{Bech32, Hrp};
use thiserror::Error;

use crate::accounts::AccountId;
use crate::config::WALLET_HRP;
use crate::terms::TermId;

/// Domain-separation context for wallet address derivation.
const WALLET_CONTEXT: &str = "trellis v1 atom-wallet";

/// Errors from wallet resolver construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The human-readable prefix is not valid Bech32.
    #[error("invalid bech32 prefix {hrp:?}: {reason}")]
    InvalidHrp {
        /// The rejected prefix.
        hrp: String,
        /// What the Bech32 parser objected to.
        reason: String,
    },
}

/// Maps an atom id to its wallet account address.
///
/// Implementations must be pure: the same term id always resolves to the
/// same address, with no dependence on ledger state.
pub trait WalletResolver: Send + Sync {
    /// The wallet account for an atom.
    fn wallet_address(&self, term: &TermId) -> AccountId;
}

// ---------------------------------------------------------------------------
// HashWalletResolver
// ---------------------------------------------------------------------------

/// The standard resolver: domain-separated BLAKE3 of the atom id, rendered
/// as a Bech32 address. Bech32's checksum catches up to four transcription
/// errors, which matters once these addresses appear in claim requests.
#[derive(Debug, Clone)]
pub struct HashWalletResolver {
    hrp: Hrp,
}

impl HashWalletResolver {
    /// A resolver using a custom address prefix.
    ///
    /// # Errors
    ///
    /// [`WalletError::InvalidHrp`] if the prefix violates Bech32 rules.
    pub fn with_prefix(hrp: &str) -> Result<Self, WalletError> {
        let hrp = Hrp::parse(hrp).map_err(|e| WalletError::InvalidHrp {
            hrp: hrp.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { hrp })
    }
}

impl Default for HashWalletResolver {
    fn default() -> Self {
        Self::with_prefix(WALLET_HRP).expect("static HRP is valid")
    }
}

impl WalletResolver for HashWalletResolver {
    fn wallet_address(&self, term: &TermId) -> AccountId {
        let mut hasher = blake3::Hasher::new_derive_key(WALLET_CONTEXT);
        hasher.update(term.as_bytes());
        let digest = hasher.finalize();
        let address = bech32::encode::<Bech32>(self.hrp, digest.as_bytes())
            .expect("encoding a 32-byte payload should never fail");
        AccountId::from(address)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
