//! # Approvals
//!
//! Who may move funds on whose behalf. A receiver grants a sender the right
//! to deposit into the receiver's positions, redeem out of them, or both.
//! Acting on your own positions never needs a grant, and granting yourself
//! one is rejected so the registry never carries a redundant self edge.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::accounts::AccountId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from approval management.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApprovalError {
    /// An account tried to grant itself an approval.
    #[error("cannot set an approval for yourself")]
    SelfApproval,
}

// ---------------------------------------------------------------------------
// ApprovalLevel
// ---------------------------------------------------------------------------

/// What a sender is allowed to do with a receiver's positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalLevel {
    /// No grant. Setting this level removes any existing grant.
    #[default]
    None,
    /// The sender may deposit into the receiver's positions.
    Deposit,
    /// The sender may redeem out of the receiver's positions.
    Redeem,
    /// Both deposit and redeem.
    Both,
}

impl ApprovalLevel {
    /// Whether this level permits deposits.
    pub fn allows_deposit(self) -> bool {
        matches!(self, Self::Deposit | Self::Both)
    }

    /// Whether this level permits redemptions.
    pub fn allows_redeem(self) -> bool {
        matches!(self, Self::Redeem | Self::Both)
    }
}

// ---------------------------------------------------------------------------
// ApprovalRegistry
// ---------------------------------------------------------------------------

/// Grants keyed by receiver, then sender.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRegistry {
    grants: HashMap<AccountId, HashMap<AccountId, ApprovalLevel>>,
}

impl ApprovalRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `receiver`'s grant for `sender`, returning the level it
    /// replaces. [`ApprovalLevel::None`] removes the grant outright, so the
    /// registry only ever stores live edges.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::SelfApproval`] if `receiver == sender`.
    pub fn set(
        &mut self,
        receiver: &AccountId,
        sender: &AccountId,
        level: ApprovalLevel,
    ) -> Result<ApprovalLevel, ApprovalError> {
        if receiver == sender {
            return Err(ApprovalError::SelfApproval);
        }
        let previous = if level == ApprovalLevel::None {
            let mut removed = None;
            if let Some(senders) = self.grants.get_mut(receiver) {
                removed = senders.remove(sender);
                if senders.is_empty() {
                    self.grants.remove(receiver);
                }
            }
            removed
        } else {
            self.grants
                .entry(receiver.clone())
                .or_default()
                .insert(sender.clone(), level)
        };
        Ok(previous.unwrap_or(ApprovalLevel::None))
    }

    /// The stored grant from `receiver` to `sender`.
    /// [`ApprovalLevel::None`] if no edge exists. Self pairs always read as
    /// `None` here; use [`can_deposit`](Self::can_deposit) and
    /// [`can_redeem`](Self::can_redeem) for permission checks.
    pub fn level(&self, receiver: &AccountId, sender: &AccountId) -> ApprovalLevel {
        self.grants
            .get(receiver)
            .and_then(|senders| senders.get(sender))
            .copied()
            .unwrap_or(ApprovalLevel::None)
    }

    /// Whether `sender` may deposit into `receiver`'s positions.
    pub fn can_deposit(&self, receiver: &AccountId, sender: &AccountId) -> bool {
        sender == receiver || self.level(receiver, sender).allows_deposit()
    }

    /// Whether `sender` may redeem out of `receiver`'s positions.
    pub fn can_redeem(&self, receiver: &AccountId, sender: &AccountId) -> bool {
        sender == receiver || self.level(receiver, sender).allows_redeem()
    }

    /// Number of live grant edges.
    pub fn len(&self) -> usize {
        self.grants.values().map(HashMap::len).sum()
    }

    /// Whether no grants exist.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountId {
        AccountId::from("alice")
    }

    fn bob() -> AccountId {
        AccountId::from("bob")
    }

    #[test]
    fn grant_and_read_back() {
        let mut registry = ApprovalRegistry::new();
        let previous = registry.set(&alice(), &bob(), ApprovalLevel::Deposit).unwrap();
        assert_eq!(previous, ApprovalLevel::None);
        assert_eq!(registry.level(&alice(), &bob()), ApprovalLevel::Deposit);
        // The grant is directional.
        assert_eq!(registry.level(&bob(), &alice()), ApprovalLevel::None);
    }

    #[test]
    fn none_removes_the_edge() {
        let mut registry = ApprovalRegistry::new();
        registry.set(&alice(), &bob(), ApprovalLevel::Both).unwrap();
        let previous = registry.set(&alice(), &bob(), ApprovalLevel::None).unwrap();
        assert_eq!(previous, ApprovalLevel::Both);
        assert!(registry.is_empty());
    }

    #[test]
    fn self_approval_rejected() {
        let mut registry = ApprovalRegistry::new();
        assert_eq!(
            registry.set(&alice(), &alice(), ApprovalLevel::Both),
            Err(ApprovalError::SelfApproval)
        );
    }

    #[test]
    fn acting_for_yourself_needs_no_grant() {
        let registry = ApprovalRegistry::new();
        assert!(registry.can_deposit(&alice(), &alice()));
        assert!(registry.can_redeem(&alice(), &alice()));
    }

    #[test]
    fn levels_gate_the_right_operations() {
        let mut registry = ApprovalRegistry::new();
        registry.set(&alice(), &bob(), ApprovalLevel::Deposit).unwrap();
        assert!(registry.can_deposit(&alice(), &bob()));
        assert!(!registry.can_redeem(&alice(), &bob()));

        registry.set(&alice(), &bob(), ApprovalLevel::Redeem).unwrap();
        assert!(!registry.can_deposit(&alice(), &bob()));
        assert!(registry.can_redeem(&alice(), &bob()));

        registry.set(&alice(), &bob(), ApprovalLevel::Both).unwrap();
        assert!(registry.can_deposit(&alice(), &bob()));
        assert!(registry.can_redeem(&alice(), &bob()));
    }

    #[test]
    fn serde_roundtrip() {
        let mut registry = ApprovalRegistry::new();
        registry.set(&alice(), &bob(), ApprovalLevel::Redeem).unwrap();

        let json = serde_json::to_string(&registry).unwrap();
        let back: ApprovalRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, registry);
    }
}
