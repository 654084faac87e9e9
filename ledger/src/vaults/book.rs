//! # Vault Book — Balances and Totals
//!
//! The vault book is the only component allowed to mutate share balances or
//! vault totals. Everything above it (fee routing, floor checks, previews)
//! computes *what* should change; the book is where the change lands, under
//! two invariants it maintains unconditionally:
//!
//! - **Conservation** — `sum(balances) == total_shares` for every vault,
//!   after every call. Only [`mint`](VaultBook::mint) and
//!   [`burn`](VaultBook::burn) touch balances, and each adjusts the total by
//!   exactly the amount it adjusts one balance.
//! - **No wraparound** — every addition is checked; every subtraction is
//!   preceded by a sufficiency check.
//!
//! Asset totals move independently of share totals
//! ([`credit_assets`](VaultBook::credit_assets) /
//! [`debit_assets`](VaultBook::debit_assets)): routing a fee into a vault
//! credits assets without minting shares, which is precisely how fee flow
//! raises the share price for existing holders.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::accounts::AccountId;
use crate::curves::CurveId;
use crate::terms::{TermId, TermIdError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from vault balance operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// Attempted to burn more shares than the holder owns.
    #[error("insufficient shares: held {held}, requested {requested}")]
    InsufficientShares {
        /// The holder's current balance.
        held: u128,
        /// The amount the burn asked for.
        requested: u128,
    },

    /// Attempted to debit more assets than the vault holds.
    #[error("vault assets underflow: available {available}, requested {requested}")]
    AssetsUnderflow {
        /// The vault's current asset total.
        available: u128,
        /// The amount the debit asked for.
        requested: u128,
    },

    /// Arithmetic overflow on a credit or mint.
    #[error("vault arithmetic overflow: current {current}, delta {delta}")]
    Overflow {
        /// The value before the failed operation.
        current: u128,
        /// The delta that caused the overflow.
        delta: u128,
    },
}

// ---------------------------------------------------------------------------
// VaultKey
// ---------------------------------------------------------------------------

/// The composite key a vault lives under: one term priced by one curve.
///
/// Deliberately a single flat key rather than nested maps — every vault
/// lookup in the ledger is by the full pair, and a flat key keeps the
/// storage layout and its serialization obvious.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VaultKey {
    /// The term staked on.
    pub term: TermId,
    /// The curve pricing this vault.
    pub curve: CurveId,
}

impl VaultKey {
    /// Pairs a term with a curve.
    pub fn new(term: TermId, curve: CurveId) -> Self {
        Self { term, curve }
    }
}

impl fmt::Display for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.term, self.curve)
    }
}

impl FromStr for VaultKey {
    type Err = TermIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The term hex never contains ':', so the last colon splits the pair.
        let (term, curve) = s.rsplit_once(':').ok_or_else(|| {
            TermIdError::InvalidHex(format!("vault key {s:?} is missing a curve suffix"))
        })?;
        let term = TermId::from_hex(term)?;
        let curve = curve
            .parse::<u64>()
            .map_err(|e| TermIdError::InvalidHex(format!("bad curve id in vault key: {e}")))?;
        Ok(Self::new(term, CurveId::new(curve)))
    }
}

/// Serde adapter for maps keyed by [`VaultKey`].
///
/// JSON object keys must be strings, so the key is rendered through its
/// `Display`/`FromStr` pair. Usage:
///
/// ```ignore
/// #[serde(with = "crate::vaults::book::vault_map")]
/// vaults: HashMap<VaultKey, Vault>,
/// ```
pub mod vault_map {
    use super::VaultKey;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::HashMap;

    pub fn serialize<V, S>(map: &HashMap<VaultKey, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        V: Serialize,
        S: Serializer,
    {
        use serde::ser::SerializeMap;
        let mut ser_map = serializer.serialize_map(Some(map.len()))?;
        for (key, value) in map {
            ser_map.serialize_entry(&key.to_string(), value)?;
        }
        ser_map.end()
    }

    pub fn deserialize<'de, V, D>(deserializer: D) -> Result<HashMap<VaultKey, V>, D::Error>
    where
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let string_map: HashMap<String, V> = HashMap::deserialize(deserializer)?;
        string_map
            .into_iter()
            .map(|(key, value)| {
                key.parse::<VaultKey>()
                    .map(|k| (k, value))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// A single vault: staked assets, issued shares, and who holds them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    /// Total asset motes staked in (and fee-routed into) this vault.
    pub total_assets: u128,

    /// Total shares issued against those assets.
    pub total_shares: u128,

    /// Per-holder share balances. Zero-balance entries may linger after a
    /// full redemption; they carry no economic weight.
    balances: HashMap<AccountId, u128>,
}

impl Vault {
    /// A holder's share balance, zero if they never held any.
    pub fn balance_of(&self, holder: &AccountId) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Whether this vault has bootstrapped. A vault never returns to the
    /// uninitialized state: ghost shares cannot be redeemed, so the total
    /// stays above zero forever once set.
    pub fn is_initialized(&self) -> bool {
        self.total_shares > 0
    }

    /// All holders with a nonzero balance.
    pub fn holders(&self) -> impl Iterator<Item = (&AccountId, u128)> {
        self.balances
            .iter()
            .filter(|(_, shares)| **shares > 0)
            .map(|(holder, shares)| (holder, *shares))
    }

    /// Sum of all holder balances. Equals `total_shares` by construction;
    /// exposed so tests and audits can check, not trust.
    pub fn balance_sum(&self) -> u128 {
        self.balances.values().sum()
    }
}

// ---------------------------------------------------------------------------
// VaultBook
// ---------------------------------------------------------------------------

/// All vaults, keyed by `(term, curve)`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultBook {
    #[serde(with = "vault_map")]
    vaults: HashMap<VaultKey, Vault>,
}

impl VaultBook {
    /// An empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a vault.
    pub fn vault(&self, key: &VaultKey) -> Option<&Vault> {
        self.vaults.get(key)
    }

    /// A vault's `(total_assets, total_shares)`, both zero if the vault has
    /// never been touched.
    pub fn totals(&self, key: &VaultKey) -> (u128, u128) {
        self.vaults
            .get(key)
            .map(|v| (v.total_assets, v.total_shares))
            .unwrap_or((0, 0))
    }

    /// A holder's balance in a vault.
    pub fn balance_of(&self, key: &VaultKey, holder: &AccountId) -> u128 {
        self.vaults
            .get(key)
            .map(|v| v.balance_of(holder))
            .unwrap_or(0)
    }

    /// Whether the vault under `key` has bootstrapped.
    pub fn is_initialized(&self, key: &VaultKey) -> bool {
        self.vaults
            .get(key)
            .map(Vault::is_initialized)
            .unwrap_or(false)
    }

    /// Mints `shares` to `holder`, growing the vault's share total by the
    /// same amount. Returns the holder's new balance.
    ///
    /// # Errors
    ///
    /// [`VaultError::Overflow`] if either the balance or the total would
    /// exceed `u128::MAX`. Nothing is written on error.
    pub fn mint(
        &mut self,
        key: &VaultKey,
        holder: &AccountId,
        shares: u128,
    ) -> Result<u128, VaultError> {
        let vault = self.vaults.entry(*key).or_default();
        let balance = vault.balance_of(holder);

        let new_balance = balance.checked_add(shares).ok_or(VaultError::Overflow {
            current: balance,
            delta: shares,
        })?;
        let new_total = vault
            .total_shares
            .checked_add(shares)
            .ok_or(VaultError::Overflow {
                current: vault.total_shares,
                delta: shares,
            })?;

        vault.balances.insert(holder.clone(), new_balance);
        vault.total_shares = new_total;
        Ok(new_balance)
    }

    /// Burns `shares` from `holder`, shrinking the vault's share total by
    /// the same amount. Returns the holder's new balance.
    ///
    /// # Errors
    ///
    /// [`VaultError::InsufficientShares`] if the holder owns less than
    /// `shares`. Nothing is written on error.
    pub fn burn(
        &mut self,
        key: &VaultKey,
        holder: &AccountId,
        shares: u128,
    ) -> Result<u128, VaultError> {
        let vault = self.vaults.entry(*key).or_default();
        let balance = vault.balance_of(holder);
        if balance < shares {
            return Err(VaultError::InsufficientShares {
                held: balance,
                requested: shares,
            });
        }

        let new_balance = balance - shares;
        // balance <= total_shares by conservation, so this cannot wrap.
        vault.total_shares -= shares;
        vault.balances.insert(holder.clone(), new_balance);
        Ok(new_balance)
    }

    /// Adds assets to a vault without minting shares. Returns the new asset
    /// total.
    pub fn credit_assets(&mut self, key: &VaultKey, amount: u128) -> Result<u128, VaultError> {
        let vault = self.vaults.entry(*key).or_default();
        let new_total = vault
            .total_assets
            .checked_add(amount)
            .ok_or(VaultError::Overflow {
                current: vault.total_assets,
                delta: amount,
            })?;
        vault.total_assets = new_total;
        Ok(new_total)
    }

    /// Removes assets from a vault without burning shares. Returns the new
    /// asset total.
    ///
    /// # Errors
    ///
    /// [`VaultError::AssetsUnderflow`] if the vault holds less than
    /// `amount`.
    pub fn debit_assets(&mut self, key: &VaultKey, amount: u128) -> Result<u128, VaultError> {
        let vault = self.vaults.entry(*key).or_default();
        if vault.total_assets < amount {
            return Err(VaultError::AssetsUnderflow {
                available: vault.total_assets,
                requested: amount,
            });
        }
        vault.total_assets -= amount;
        Ok(vault.total_assets)
    }

    /// Iterates over every vault. Order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (&VaultKey, &Vault)> {
        self.vaults.iter()
    }

    /// Number of vaults that have ever been touched.
    pub fn len(&self) -> usize {
        self.vaults.len()
    }

    /// Whether no vault has ever been touched.
    pub fn is_empty(&self) -> bool {
        self.vaults.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::atom_id;

    fn key() -> VaultKey {
        VaultKey::new(atom_id(b"test"), CurveId::new(1))
    }

    fn alice() -> AccountId {
        AccountId::from("alice")
    }

    #[test]
    fn mint_grows_balance_and_total() {
        let mut book = VaultBook::new();
        let new_balance = book.mint(&key(), &alice(), 100).unwrap();
        assert_eq!(new_balance, 100);
        assert_eq!(book.balance_of(&key(), &alice()), 100);
        assert_eq!(book.totals(&key()), (0, 100));
    }

    #[test]
    fn burn_shrinks_balance_and_total() {
        let mut book = VaultBook::new();
        book.mint(&key(), &alice(), 100).unwrap();
        let remaining = book.burn(&key(), &alice(), 40).unwrap();
        assert_eq!(remaining, 60);
        assert_eq!(book.totals(&key()).1, 60);
    }

    #[test]
    fn burn_more_than_held_rejected() {
        let mut book = VaultBook::new();
        book.mint(&key(), &alice(), 10).unwrap();
        let result = book.burn(&key(), &alice(), 11);
        assert_eq!(
            result,
            Err(VaultError::InsufficientShares {
                held: 10,
                requested: 11
            })
        );
        // Nothing changed.
        assert_eq!(book.balance_of(&key(), &alice()), 10);
        assert_eq!(book.totals(&key()).1, 10);
    }

    #[test]
    fn conservation_holds_across_operations() {
        let mut book = VaultBook::new();
        let bob = AccountId::from("bob");
        book.mint(&key(), &alice(), 100).unwrap();
        book.mint(&key(), &bob, 250).unwrap();
        book.burn(&key(), &alice(), 30).unwrap();
        book.burn(&key(), &bob, 250).unwrap();

        let vault = book.vault(&key()).unwrap();
        assert_eq!(vault.balance_sum(), vault.total_shares);
        assert_eq!(vault.total_shares, 70);
    }

    #[test]
    fn assets_move_independently_of_shares() {
        let mut book = VaultBook::new();
        book.mint(&key(), &alice(), 100).unwrap();
        book.credit_assets(&key(), 500).unwrap();
        assert_eq!(book.totals(&key()), (500, 100));
        book.debit_assets(&key(), 200).unwrap();
        assert_eq!(book.totals(&key()), (300, 100));
    }

    #[test]
    fn debit_beyond_assets_rejected() {
        let mut book = VaultBook::new();
        book.credit_assets(&key(), 100).unwrap();
        assert_eq!(
            book.debit_assets(&key(), 101),
            Err(VaultError::AssetsUnderflow {
                available: 100,
                requested: 101
            })
        );
    }

    #[test]
    fn mint_overflow_rejected_atomically() {
        let mut book = VaultBook::new();
        let bob = AccountId::from("bob");
        book.mint(&key(), &alice(), u128::MAX).unwrap();
        // The total would overflow even though bob's balance would not.
        let result = book.mint(&key(), &bob, 1);
        assert!(matches!(result, Err(VaultError::Overflow { .. })));
        assert_eq!(book.balance_of(&key(), &bob), 0);
        let vault = book.vault(&key()).unwrap();
        assert_eq!(vault.balance_sum(), vault.total_shares);
    }

    #[test]
    fn untouched_vault_reads_as_zero() {
        let book = VaultBook::new();
        assert_eq!(book.totals(&key()), (0, 0));
        assert_eq!(book.balance_of(&key(), &alice()), 0);
        assert!(!book.is_initialized(&key()));
    }

    #[test]
    fn vault_key_display_parses_back() {
        let k = key();
        let parsed: VaultKey = k.to_string().parse().unwrap();
        assert_eq!(parsed, k);
    }

    #[test]
    fn book_serde_roundtrip() {
        let mut book = VaultBook::new();
        book.mint(&key(), &alice(), 42).unwrap();
        book.credit_assets(&key(), 1_000).unwrap();

        let json = serde_json::to_string(&book).unwrap();
        let back: VaultBook = serde_json::from_str(&json).unwrap();
        assert_eq!(back, book);
    }
}
