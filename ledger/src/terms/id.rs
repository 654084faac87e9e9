//! # Term Identifiers
//!
//! Every term in Trellis — atom, triple, or counter-triple — is named by a
//! 32-byte content-derived id. The derivation is a pure function of the
//! term's content, so submitting identical data twice always yields the same
//! id. That determinism is what makes duplicate detection well-defined and
//! lets independent deployments agree on ids without coordination.
//!
//! ```text
//! atom_id    = BLAKE3_derive("…atom",    payload)
//! triple_id  = BLAKE3_derive("…triple",  subject ‖ predicate ‖ object)
//! counter_id = BLAKE3_derive("…counter", triple_id)
//! ```
//!
//! Each variant hashes under its own BLAKE3 `derive_key` context, so an atom
//! whose payload happens to be 96 bytes of term ids can never collide with a
//! triple, and a triple id can never collide with its own counter id. Don't
//! prepend tags manually — `derive_key` gives cross-context separation by
//! construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Domain-separation context for atom ids.
const ATOM_ID_CONTEXT: &str = "trellis v1 term-id atom";

/// Domain-separation context for triple ids.
const TRIPLE_ID_CONTEXT: &str = "trellis v1 term-id triple";

/// Domain-separation context for counter-triple ids.
const COUNTER_ID_CONTEXT: &str = "trellis v1 term-id counter";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from parsing a [`TermId`] out of its hex form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TermIdError {
    /// The string contained non-hex characters.
    #[error("invalid hex in term id: {0}")]
    InvalidHex(String),

    /// The decoded byte length was not 32.
    #[error("invalid term id length: expected 32 bytes, got {got}")]
    InvalidLength {
        /// The decoded length.
        got: usize,
    },
}

// ---------------------------------------------------------------------------
// TermId
// ---------------------------------------------------------------------------

/// A 32-byte content-derived term identifier.
///
/// Displayed and serialized (in human-readable formats) as 64 lowercase hex
/// characters; binary formats carry the raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId([u8; 32]);

impl TermId {
    /// Wraps raw bytes as a term id. Callers normally go through
    /// [`atom_id`], [`triple_id`], or [`counter_id`] instead.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a term id from its 64-character hex rendering.
    pub fn from_hex(s: &str) -> Result<Self, TermIdError> {
        let bytes = hex::decode(s).map_err(|e| TermIdError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TermIdError::InvalidLength { got: bytes.len() });
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TermId({})", self.to_hex())
    }
}

impl FromStr for TermId {
    type Err = TermIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for TermId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for TermId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            TermId::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            if bytes.len() != 32 {
                return Err(serde::de::Error::custom(format!(
                    "expected 32-byte term id, got {}",
                    bytes.len()
                )));
            }
            let mut out = [0u8; 32];
            out.copy_from_slice(&bytes);
            Ok(TermId(out))
        }
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derives the id of an atom from its payload.
///
/// Pure and deterministic: the same payload always maps to the same id,
/// which is exactly what makes re-submission detectable as a duplicate.
pub fn atom_id(payload: &[u8]) -> TermId {
    let mut hasher = blake3::Hasher::new_derive_key(ATOM_ID_CONTEXT);
    hasher.update(payload);
    TermId(*hasher.finalize().as_bytes())
}

/// Derives the id of a triple from its ordered component ids.
///
/// Order matters: `(s, p, o)` and `(o, p, s)` are different triples with
/// different ids.
pub fn triple_id(subject: &TermId, predicate: &TermId, object: &TermId) -> TermId {
    let mut hasher = blake3::Hasher::new_derive_key(TRIPLE_ID_CONTEXT);
    hasher.update(subject.as_bytes());
    hasher.update(predicate.as_bytes());
    hasher.update(object.as_bytes());
    TermId(*hasher.finalize().as_bytes())
}

/// Derives the id of a triple's counter-triple.
///
/// The mapping is injective over triple ids, giving every triple exactly one
/// counter id; the registry stores the link in both directions so lookups
/// never re-derive.
pub fn counter_id(triple: &TermId) -> TermId {
    let mut hasher = blake3::Hasher::new_derive_key(COUNTER_ID_CONTEXT);
    hasher.update(triple.as_bytes());
    TermId(*hasher.finalize().as_bytes())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_id_is_deterministic() {
        assert_eq!(atom_id(b"water"), atom_id(b"water"));
        assert_ne!(atom_id(b"water"), atom_id(b"Water"));
    }

    #[test]
    fn triple_id_depends_on_order() {
        let s = atom_id(b"alice");
        let p = atom_id(b"knows");
        let o = atom_id(b"bob");
        assert_ne!(triple_id(&s, &p, &o), triple_id(&o, &p, &s));
    }

    #[test]
    fn contexts_do_not_collide() {
        // A triple over (x, x, x) must not collide with an atom whose
        // payload is those same 96 bytes.
        let x = atom_id(b"x");
        let mut payload = Vec::new();
        payload.extend_from_slice(x.as_bytes());
        payload.extend_from_slice(x.as_bytes());
        payload.extend_from_slice(x.as_bytes());
        assert_ne!(triple_id(&x, &x, &x), atom_id(&payload));
    }

    #[test]
    fn counter_differs_from_triple() {
        let t = triple_id(&atom_id(b"a"), &atom_id(b"b"), &atom_id(b"c"));
        let c = counter_id(&t);
        assert_ne!(t, c);
        // Countering the counter does not come back to the triple; the
        // registry's stored link is the only inverse.
        assert_ne!(counter_id(&c), t);
    }

    #[test]
    fn hex_roundtrip() {
        let id = atom_id(b"roundtrip");
        let parsed = TermId::from_hex(&id.to_hex()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn hex_rejects_bad_input() {
        assert!(matches!(
            TermId::from_hex("zzzz"),
            Err(TermIdError::InvalidHex(_))
        ));
        assert!(matches!(
            TermId::from_hex("abcd"),
            Err(TermIdError::InvalidLength { got: 2 })
        ));
    }

    #[test]
    fn serde_json_uses_hex_strings() {
        let id = atom_id(b"serde");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_hex()));
        let back: TermId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
