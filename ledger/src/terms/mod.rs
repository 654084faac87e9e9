//! # Terms Module — Content-Addressed Claims
//!
//! A *term* is the unit a vault is created against: an atom (a leaf claim
//! with opaque content), a triple (a subject/predicate/object claim over
//! existing terms), or a counter-triple (a triple's implicit negation).
//!
//! ```text
//! id.rs        — 32-byte content-derived ids and their derivation rules
//! registry.rs  — the append-only store of terms and the triple ↔ counter link
//! ```
//!
//! Ids are pure functions of content, so the registry can detect duplicate
//! submissions exactly and two deployments fed the same data agree on every
//! id without coordination.

pub mod id;
pub mod registry;

pub use id::{atom_id, counter_id, triple_id, TermId, TermIdError};
pub use registry::{Term, TermError, TermKind, TermRegistry};
