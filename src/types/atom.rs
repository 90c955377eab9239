//! Immutable atoms and shared handles.
//!
//! An [`Atom`] is either a leaf (type + name) or a compound (type + ordered
//! children). Atoms are only created by [`crate::AtomSpace`], which interns
//! them, so children always exist (and are hashed) before their parent and
//! no construction path can produce a cycle.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::canonical::{link_hash, node_hash, INVALID_HASH};
use super::atom_type::{AtomType, TypeRegistry};

/// A graph node. Type and children never change after construction.
pub struct Atom {
    atom_type: AtomType,
    name: Option<String>,
    numbers: Option<Vec<f64>>,
    outgoing: Vec<Handle>,
    /// Memoized content hash; [`INVALID_HASH`] until first computed.
    hash: AtomicU64,
}

impl Atom {
    pub(crate) fn new_node(atom_type: AtomType, name: String, numbers: Option<Vec<f64>>) -> Self {
        Self {
            atom_type,
            name: Some(name),
            numbers,
            outgoing: Vec::new(),
            hash: AtomicU64::new(INVALID_HASH),
        }
    }

    pub(crate) fn new_link(atom_type: AtomType, outgoing: Vec<Handle>) -> Self {
        Self {
            atom_type,
            name: None,
            numbers: None,
            outgoing,
            hash: AtomicU64::new(INVALID_HASH),
        }
    }

    /// Type tag.
    pub fn atom_type(&self) -> AtomType {
        self.atom_type
    }

    /// Name, for leaves.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Numeric payload, for `Number` leaves.
    pub fn numbers(&self) -> Option<&[f64]> {
        self.numbers.as_deref()
    }

    /// Ordered children (empty for leaves).
    pub fn outgoing(&self) -> &[Handle] {
        &self.outgoing
    }

    /// Child at `i`, if any.
    pub fn child(&self, i: usize) -> Option<&Handle> {
        self.outgoing.get(i)
    }

    /// Number of children.
    pub fn arity(&self) -> usize {
        self.outgoing.len()
    }

    /// Leaf atom.
    pub fn is_node(&self) -> bool {
        self.name.is_some()
    }

    /// Compound atom.
    pub fn is_link(&self) -> bool {
        self.name.is_none()
    }

    /// Produces a value via execution.
    pub fn is_executable(&self) -> bool {
        self.atom_type.is_executable()
    }

    /// Produces a truth value via evaluation.
    pub fn is_evaluatable(&self) -> bool {
        self.atom_type.is_evaluatable()
    }

    /// Content hash, computed at most once per instance.
    ///
    /// Concurrent first calls may both compute; they store the same value.
    pub fn content_hash(&self) -> u64 {
        let cached = self.hash.load(Ordering::Relaxed);
        if cached != INVALID_HASH {
            return cached;
        }
        let h = self.compute_hash();
        self.hash.store(h, Ordering::Relaxed);
        h
    }

    fn compute_hash(&self) -> u64 {
        let type_hash = TypeRegistry::global().type_hash(self.atom_type);
        if let Some(name) = &self.name {
            return node_hash(type_hash, name);
        }
        if self.atom_type.is_unique() {
            // Bindings are identified by their key child alone.
            return link_hash(type_hash, self.outgoing.first().map(|h| h.content_hash()));
        }
        link_hash(type_hash, self.outgoing.iter().map(|h| h.content_hash()))
    }

    /// Content equality, honoring the binding override (key child only).
    pub fn content_eq(&self, other: &Atom) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.content_hash() != other.content_hash() || self.atom_type != other.atom_type {
            return false;
        }
        match (&self.name, &other.name) {
            (Some(a), Some(b)) => return a == b,
            (None, None) => {}
            _ => return false,
        }
        if self.atom_type.is_unique() {
            return match (self.outgoing.first(), other.outgoing.first()) {
                (Some(a), Some(b)) => a == b,
                (None, None) => true,
                _ => false,
            };
        }
        self.outgoing.len() == other.outgoing.len()
            && self.outgoing.iter().zip(&other.outgoing).all(|(a, b)| a == b)
    }

    /// Full structural equality over every child, with no override.
    ///
    /// Distinguishes two bindings that share a key but differ in definition.
    pub fn structurally_eq(&self, other: &Atom) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.atom_type == other.atom_type
            && self.name == other.name
            && self.outgoing.len() == other.outgoing.len()
            && self
                .outgoing
                .iter()
                .zip(&other.outgoing)
                .all(|(a, b)| a.structurally_eq(b))
    }

    /// Multi-line rendering with two-space indentation.
    pub fn to_pretty_string(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0);
        out
    }

    fn write_pretty(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        match &self.name {
            Some(name) => {
                out.push_str(&pad);
                out.push('(');
                out.push_str(self.atom_type.name());
                out.push_str(" \"");
                out.push_str(&escape(name));
                out.push_str("\")");
            }
            None => {
                out.push_str(&pad);
                out.push('(');
                out.push_str(self.atom_type.name());
                for child in &self.outgoing {
                    out.push('\n');
                    child.write_pretty(out, depth + 1);
                }
                out.push(')');
            }
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "({} \"{}\")", self.atom_type, escape(name)),
            None => {
                write!(f, "({}", self.atom_type)?;
                for child in &self.outgoing {
                    write!(f, " {}", child)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

fn escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Shared reference to an interned atom.
///
/// Equality and hashing are by content (see [`Atom::content_eq`]); use
/// [`Handle::ptr_eq`] for instance identity.
#[derive(Clone)]
pub struct Handle(Arc<Atom>);

impl Handle {
    pub(crate) fn new(atom: Atom) -> Self {
        Self(Arc::new(atom))
    }

    /// Same instance.
    pub fn ptr_eq(a: &Handle, b: &Handle) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl Deref for Handle {
    type Target = Atom;

    fn deref(&self) -> &Atom {
        &self.0
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.content_eq(&other.0)
    }
}

impl Eq for Handle {}

impl Hash for Handle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.content_hash());
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

/// Canonical name of a numeric vector: space-separated shortest decimal forms.
pub(crate) fn format_numbers(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a whitespace-separated numeric vector; `None` if empty or invalid.
pub(crate) fn parse_numbers(name: &str) -> Option<Vec<f64>> {
    let values: Vec<f64> = name
        .split_whitespace()
        .map(|tok| tok.parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}
