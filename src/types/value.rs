//! Derived values produced by execution and evaluation.
//!
//! Values never enter the hypergraph's identity space; they are owned by
//! whoever requested them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::atom::Handle;
use super::atom_type::AtomType;

/// Strength/confidence pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruthValue {
    /// Strength (mean) in `[0, 1]` by convention.
    pub strength: f64,
    /// Confidence in `[0, 1]` by convention.
    pub confidence: f64,
}

impl TruthValue {
    /// Truth value assigned to atoms that never had one set.
    pub const DEFAULT: TruthValue = TruthValue {
        strength: 1.0,
        confidence: 0.0,
    };

    /// Create a truth value.
    pub fn new(strength: f64, confidence: f64) -> Self {
        Self {
            strength,
            confidence,
        }
    }

    /// As a two-element numeric vector `[strength, confidence]`.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.strength, self.confidence]
    }
}

impl Default for TruthValue {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(TruthValue {} {})", self.strength, self.confidence)
    }
}

/// Result of executing or evaluating an atom.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A graph node, when a computation returns an existing atom.
    Atom(Handle),
    /// Generic floating-point sequence.
    Float(Vec<f64>),
    /// Ordered sequence of atom references.
    Link(Vec<Handle>),
    /// Strength/confidence pair.
    Truth(TruthValue),
}

/// Whether a numeric payload came from a `Number` atom or a computed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    /// Payload of a `Number` atom.
    Literal,
    /// Computed floating sequence.
    Float,
}

impl Value {
    /// Is a graph node.
    pub fn is_atom(&self) -> bool {
        matches!(self, Self::Atom(_))
    }

    /// The atom, if this is one.
    pub fn as_atom(&self) -> Option<&Handle> {
        match self {
            Self::Atom(h) => Some(h),
            _ => None,
        }
    }

    /// Consume into the atom, if this is one.
    pub fn into_atom(self) -> Option<Handle> {
        match self {
            Self::Atom(h) => Some(h),
            _ => None,
        }
    }

    /// Numeric payload and its kind, if this value is numeric.
    ///
    /// Empty sequences do not count as numeric.
    pub fn numeric(&self) -> Option<(&[f64], NumericKind)> {
        let (values, kind) = match self {
            Self::Atom(h) if h.atom_type() == AtomType::Number => {
                (h.numbers()?, NumericKind::Literal)
            }
            Self::Float(v) => (v.as_slice(), NumericKind::Float),
            _ => return None,
        };
        if values.is_empty() {
            None
        } else {
            Some((values, kind))
        }
    }

    /// Short description of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Atom(h) => h.atom_type().name(),
            Self::Float(_) => "FloatValue",
            Self::Link(_) => "LinkValue",
            Self::Truth(_) => "TruthValue",
        }
    }
}

impl From<Handle> for Value {
    fn from(h: Handle) -> Self {
        Self::Atom(h)
    }
}

impl From<TruthValue> for Value {
    fn from(tv: TruthValue) -> Self {
        Self::Truth(tv)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(h) => write!(f, "{h}"),
            Self::Float(v) => {
                f.write_str("(FloatValue")?;
                for x in v {
                    write!(f, " {x}")?;
                }
                f.write_str(")")
            }
            Self::Link(hs) => {
                f.write_str("(LinkValue")?;
                for h in hs {
                    write!(f, " {h}")?;
                }
                f.write_str(")")
            }
            Self::Truth(tv) => write!(f, "{tv}"),
        }
    }
}
