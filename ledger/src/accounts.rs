//! # Account Identifiers
//!
//! An [`AccountId`] names a principal in the ledger: a depositor, a fee
//! treasury, an atom wallet, or the designated burn holder. The ledger does
//! not verify signatures or manage keys — authentication happens in the host
//! environment, and by the time an operation reaches the ledger the caller's
//! identity is already established. All the ledger needs is a stable,
//! hashable name to key balances and accruals by.
//!
//! The one special account is the **burn holder** ([`AccountId::burn`]):
//! it permanently owns every vault's ghost shares and never initiates an
//! operation. Its name lives in a reserved `sys:` namespace so that no
//! ordinary principal can collide with it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved name of the burn holder that owns all ghost shares.
const BURN_ACCOUNT: &str = "sys:burn";

/// A principal identifier.
///
/// Thin wrapper over a string so the type system keeps accounts, term ids,
/// and curve ids from being confused for one another. Comparison and hashing
/// are byte-exact on the underlying name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Creates an account id from any string-like name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The designated burn holder.
    ///
    /// Ghost shares are minted to this account at vault bootstrap and can
    /// never be redeemed: the burn holder has no key material anywhere and
    /// the ledger never accepts it as a redemption principal.
    pub fn burn() -> Self {
        Self(BURN_ACCOUNT.to_string())
    }

    /// Returns `true` if this is the burn holder.
    pub fn is_burn(&self) -> bool {
        self.0 == BURN_ACCOUNT
    }

    /// The underlying name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
