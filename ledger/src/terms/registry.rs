//! # Term Registry
//!
//! The registry is the source of truth for what terms exist: atom payloads,
//! triple linkage, and the bidirectional triple ↔ counter-triple mapping.
//! Terms are created once and never deleted — the registry only grows.
//!
//! Creating a triple registers *two* terms in one step: the triple itself
//! and its counter-triple. Both share the same component atoms; they differ
//! only in polarity, and the vault layer enforces that no holder stakes both
//! sides of the pair on the same curve.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use super::id::{atom_id, counter_id, triple_id, TermId};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from term creation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TermError {
    /// Zero-length atom payloads are rejected outright.
    #[error("atom payload is empty")]
    EmptyPayload,

    /// The atom payload exceeds the configured maximum.
    #[error("atom payload of {got} bytes exceeds the {max} byte cap")]
    PayloadTooLong {
        /// The configured cap.
        max: usize,
        /// The offending payload length.
        got: usize,
    },

    /// The derived id is already registered. Identical content always
    /// derives the identical id, so this is how duplicates surface.
    #[error("term {term} already exists")]
    AlreadyExists {
        /// The id that was already registered.
        term: TermId,
    },

    /// A referenced term does not exist, or is a counter-triple (which
    /// cannot anchor further triples).
    #[error("term {term} not found")]
    TermNotFound {
        /// The missing or ineligible component id.
        term: TermId,
    },
}

// ---------------------------------------------------------------------------
// Term
// ---------------------------------------------------------------------------

/// The three kinds of term a vault can be created against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    /// A leaf term identified by opaque content.
    Atom,
    /// A claim composed of three existing terms.
    Triple,
    /// The implicit logical negation of a triple.
    CounterTriple,
}

impl TermKind {
    /// Number of ghost floors funded when a vault for this term bootstraps
    /// outside the creation path. A triple-family vault bootstraps its
    /// opposite side in the same call, so it needs two.
    pub fn floor_units(&self) -> u128 {
        match self {
            TermKind::Atom => 1,
            TermKind::Triple | TermKind::CounterTriple => 2,
        }
    }

    /// Whether this term is a triple or counter-triple.
    pub fn is_triple_family(&self) -> bool {
        !matches!(self, TermKind::Atom)
    }
}

/// A registered term.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Term {
    /// A leaf term and its immutable payload.
    Atom {
        /// The opaque content the id was derived from.
        #[serde(with = "hex")]
        payload: Vec<u8>,
    },
    /// A positive claim over three existing terms.
    Triple {
        /// Subject component.
        subject: TermId,
        /// Predicate component.
        predicate: TermId,
        /// Object component.
        object: TermId,
        /// The counter-triple registered alongside this triple.
        counter: TermId,
    },
    /// The negation side of a triple.
    CounterTriple {
        /// The positive triple this term negates.
        triple: TermId,
    },
}

impl Term {
    /// This term's kind.
    pub fn kind(&self) -> TermKind {
        match self {
            Term::Atom { .. } => TermKind::Atom,
            Term::Triple { .. } => TermKind::Triple,
            Term::CounterTriple { .. } => TermKind::CounterTriple,
        }
    }
}

// ---------------------------------------------------------------------------
// TermRegistry
// ---------------------------------------------------------------------------

/// The append-only store of all registered terms.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TermRegistry {
    /// All terms by id.
    terms: HashMap<TermId, Term>,

    /// Running count of registered terms. Triples count as two (the triple
    /// and its counter).
    created: u64,
}

impl TermRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an atom and returns its derived id.
    ///
    /// # Errors
    ///
    /// [`TermError::EmptyPayload`] for a zero-length payload,
    /// [`TermError::PayloadTooLong`] above `max_len`, and
    /// [`TermError::AlreadyExists`] if the payload was registered before.
    pub fn create_atom(&mut self, payload: Vec<u8>, max_len: usize) -> Result<TermId, TermError> {
        if payload.is_empty() {
            return Err(TermError::EmptyPayload);
        }
        if payload.len() > max_len {
            return Err(TermError::PayloadTooLong {
                max: max_len,
                got: payload.len(),
            });
        }
        let id = atom_id(&payload);
        if self.terms.contains_key(&id) {
            return Err(TermError::AlreadyExists { term: id });
        }
        self.terms.insert(id, Term::Atom { payload });
        self.created += 1;
        Ok(id)
    }

    /// Registers a triple and its counter-triple, returning both ids as
    /// `(triple, counter)`.
    ///
    /// Components must be existing atoms or triples; counter-triples cannot
    /// anchor further triples.
    ///
    /// # Errors
    ///
    /// [`TermError::TermNotFound`] naming the first ineligible component,
    /// or [`TermError::AlreadyExists`] if the triple was registered before.
    pub fn create_triple(
        &mut self,
        subject: TermId,
        predicate: TermId,
        object: TermId,
    ) -> Result<(TermId, TermId), TermError> {
        for component in [subject, predicate, object] {
            match self.terms.get(&component).map(Term::kind) {
                Some(TermKind::Atom) | Some(TermKind::Triple) => {}
                _ => return Err(TermError::TermNotFound { term: component }),
            }
        }

        let id = triple_id(&subject, &predicate, &object);
        if self.terms.contains_key(&id) {
            return Err(TermError::AlreadyExists { term: id });
        }
        let counter = counter_id(&id);

        self.terms.insert(
            id,
            Term::Triple {
                subject,
                predicate,
                object,
                counter,
            },
        );
        self.terms.insert(counter, Term::CounterTriple { triple: id });
        self.created += 2;
        Ok((id, counter))
    }

    /// Looks up a term.
    pub fn get(&self, id: &TermId) -> Option<&Term> {
        self.terms.get(id)
    }

    /// The kind of a registered term, if any.
    pub fn kind(&self, id: &TermId) -> Option<TermKind> {
        self.terms.get(id).map(Term::kind)
    }

    /// Whether the id names a registered term.
    pub fn is_created(&self, id: &TermId) -> bool {
        self.terms.contains_key(id)
    }

    /// An atom's payload.
    pub fn atom_payload(&self, id: &TermId) -> Option<&[u8]> {
        match self.terms.get(id)? {
            Term::Atom { payload } => Some(payload),
            _ => None,
        }
    }

    /// The `(subject, predicate, object)` of a triple-family term.
    ///
    /// Counter-triples resolve through their positive side — both sides of
    /// a pair share the same component atoms.
    pub fn components(&self, id: &TermId) -> Option<(TermId, TermId, TermId)> {
        match self.terms.get(id)? {
            Term::Triple {
                subject,
                predicate,
                object,
                ..
            } => Some((*subject, *predicate, *object)),
            Term::CounterTriple { triple } => self.components(triple),
            Term::Atom { .. } => None,
        }
    }

    /// The opposite side of a triple-family pair: a triple's counter, or a
    /// counter's triple. `None` for atoms.
    pub fn opposite_of(&self, id: &TermId) -> Option<TermId> {
        match self.terms.get(id)? {
            Term::Triple { counter, .. } => Some(*counter),
            Term::CounterTriple { triple } => Some(*triple),
            Term::Atom { .. } => None,
        }
    }

    /// A triple's counter-triple id.
    pub fn counter_of(&self, triple: &TermId) -> Option<TermId> {
        match self.terms.get(triple)? {
            Term::Triple { counter, .. } => Some(*counter),
            _ => None,
        }
    }

    /// A counter-triple's positive triple id.
    pub fn triple_of(&self, counter: &TermId) -> Option<TermId> {
        match self.terms.get(counter)? {
            Term::CounterTriple { triple } => Some(*triple),
            _ => None,
        }
    }

    /// Total number of registered terms.
    pub fn term_count(&self) -> u64 {
        self.created
    }

    /// Iterates over every registered term. Order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (&TermId, &Term)> {
        self.terms.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
