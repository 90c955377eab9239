//! Core types: the type hierarchy, atoms and derived values.

pub mod atom_type;
pub mod atom;
pub mod value;

pub use atom_type::{AtomType, TypeRegistry};
pub use atom::{Atom, Handle};
pub use value::{NumericKind, TruthValue, Value};
