//! Closed type hierarchy for atoms.
//!
//! ## Hierarchy
//!
//! ```text
//! Atom
//! ├── Node*      Concept, Predicate, Variable, Number, Type, Schema
//! └── Link       List, Set, FormulaPredicate
//!     ├── Unique*    Define, Grant
//!     └── Function*
//!         ├── Fold* ── Arithmetic*   Add, Multiply, Subtract, Divide
//!         ├── Power, Sqrt, Log, Exp
//!         └── Concatenate, FloatColumn, ValueOf,
//!             StrengthOf, ConfidenceOf, TruthValueOf
//! ```
//!
//! (`*` marks abstract types that cannot be instantiated.)
//!
//! The subtype relation is precomputed once into a transitive-closure
//! bitset held by [`TypeRegistry`]. Type hashes are xxh64 of the type name,
//! so they do not depend on declaration order.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh64::xxh64;

/// Every atom type known to the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AtomType {
    /// Root of the hierarchy.
    Atom,
    /// Abstract leaf family.
    Node,
    /// Plain compound; also the root of the link family.
    Link,
    /// Named concept.
    Concept,
    /// Named predicate.
    Predicate,
    /// Free variable reference.
    Variable,
    /// Literal numeric vector.
    Number,
    /// Names an atom type (used as a type specifier).
    Type,
    /// Named schema, dereferenced through a `Define` binding.
    Schema,
    /// Ordered list.
    List,
    /// Result-set wrapper.
    Set,
    /// Abstract uniqueness-bearing binding.
    Unique,
    /// `{key, definition}` binding.
    Define,
    /// `{key, grant}` binding.
    Grant,
    /// Predicate whose children compute strength and confidence.
    FormulaPredicate,
    /// Abstract executable family.
    Function,
    /// Abstract fold family.
    Fold,
    /// Abstract arithmetic fold family.
    Arithmetic,
    /// Sum.
    Add,
    /// Product.
    Multiply,
    /// Left-fold difference.
    Subtract,
    /// Left-fold quotient.
    Divide,
    /// Binary exponentiation.
    Power,
    /// Pointwise square root.
    Sqrt,
    /// Pointwise natural log.
    Log,
    /// Pointwise exponential.
    Exp,
    /// Flattens one level of nesting.
    Concatenate,
    /// Collects numeric atoms into one floating sequence.
    FloatColumn,
    /// Reads a value attached to `(atom, key)`.
    ValueOf,
    /// Strength of an attached truth value.
    StrengthOf,
    /// Confidence of an attached truth value.
    ConfidenceOf,
    /// Attached truth value itself.
    TruthValueOf,
}

impl AtomType {
    /// All types, in declaration order.
    pub const ALL: [AtomType; 32] = [
        Self::Atom,
        Self::Node,
        Self::Link,
        Self::Concept,
        Self::Predicate,
        Self::Variable,
        Self::Number,
        Self::Type,
        Self::Schema,
        Self::List,
        Self::Set,
        Self::Unique,
        Self::Define,
        Self::Grant,
        Self::FormulaPredicate,
        Self::Function,
        Self::Fold,
        Self::Arithmetic,
        Self::Add,
        Self::Multiply,
        Self::Subtract,
        Self::Divide,
        Self::Power,
        Self::Sqrt,
        Self::Log,
        Self::Exp,
        Self::Concatenate,
        Self::FloatColumn,
        Self::ValueOf,
        Self::StrengthOf,
        Self::ConfidenceOf,
        Self::TruthValueOf,
    ];

    /// Number of types.
    pub const COUNT: usize = Self::ALL.len();

    /// Immediate supertype (`None` for the root).
    pub fn parent(self) -> Option<AtomType> {
        use AtomType::*;
        match self {
            Atom => None,
            Node | Link => Some(Atom),
            Concept | Predicate | Variable | Number | Type | Schema => Some(Node),
            List | Set | Unique | FormulaPredicate | Function => Some(Link),
            Define | Grant => Some(Unique),
            Fold | Power | Sqrt | Log | Exp | Concatenate | FloatColumn | ValueOf
            | StrengthOf | ConfidenceOf | TruthValueOf => Some(Function),
            Arithmetic => Some(Fold),
            Add | Multiply | Subtract | Divide => Some(Arithmetic),
        }
    }

    /// Type name as used in the textual representation.
    pub fn name(self) -> &'static str {
        use AtomType::*;
        match self {
            Atom => "Atom",
            Node => "Node",
            Link => "Link",
            Concept => "Concept",
            Predicate => "Predicate",
            Variable => "Variable",
            Number => "Number",
            Type => "Type",
            Schema => "Schema",
            List => "List",
            Set => "Set",
            Unique => "Unique",
            Define => "Define",
            Grant => "Grant",
            FormulaPredicate => "FormulaPredicate",
            Function => "Function",
            Fold => "Fold",
            Arithmetic => "Arithmetic",
            Add => "Add",
            Multiply => "Multiply",
            Subtract => "Subtract",
            Divide => "Divide",
            Power => "Power",
            Sqrt => "Sqrt",
            Log => "Log",
            Exp => "Exp",
            Concatenate => "Concatenate",
            FloatColumn => "FloatColumn",
            ValueOf => "ValueOf",
            StrengthOf => "StrengthOf",
            ConfidenceOf => "ConfidenceOf",
            TruthValueOf => "TruthValueOf",
        }
    }

    /// Abstract types exist only to group families.
    pub fn is_abstract(self) -> bool {
        matches!(
            self,
            Self::Atom | Self::Node | Self::Unique | Self::Function | Self::Fold | Self::Arithmetic
        )
    }

    /// Subtype test against the global registry.
    pub fn is_a(self, other: AtomType) -> bool {
        TypeRegistry::global().is_a(self, other)
    }

    /// Leaf family.
    pub fn is_node(self) -> bool {
        self.is_a(Self::Node)
    }

    /// Compound family.
    pub fn is_link(self) -> bool {
        self.is_a(Self::Link)
    }

    /// Binding family whose identity depends on the key child only.
    pub fn is_unique(self) -> bool {
        self.is_a(Self::Unique)
    }

    /// Whether atoms of this type produce a value when executed.
    pub fn is_executable(self) -> bool {
        use AtomType::*;
        self.is_a(Function) || self == Schema
    }

    /// Whether atoms of this type produce a truth value when evaluated.
    pub fn is_evaluatable(self) -> bool {
        matches!(self, Self::FormulaPredicate | Self::TruthValueOf)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read-only oracle over the type hierarchy.
///
/// The hierarchy is closed, so there is exactly one registry per process:
/// [`TypeRegistry::global`] builds it on first use and hands out a
/// `&'static` reference. Atom hashing, binding keys, [`AtomType::is_a`] and
/// every [`crate::AtomSpace`] consult that instance.
#[derive(Debug)]
pub struct TypeRegistry {
    /// Bit `j` of `ancestors[i]` is set iff type `i` is-a type `j`.
    ancestors: [u64; AtomType::COUNT],
    hashes: [u64; AtomType::COUNT],
    by_name: HashMap<&'static str, AtomType>,
}

static TYPE_REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();

impl TypeRegistry {
    /// Build the registry from the static hierarchy.
    pub fn build() -> Self {
        let mut ancestors = [0u64; AtomType::COUNT];
        let mut hashes = [0u64; AtomType::COUNT];
        let mut by_name = HashMap::with_capacity(AtomType::COUNT);

        for t in AtomType::ALL {
            let mut bits = 0u64;
            let mut cur = Some(t);
            while let Some(c) = cur {
                bits |= 1u64 << c.index();
                cur = c.parent();
            }
            ancestors[t.index()] = bits;
            hashes[t.index()] = xxh64(t.name().as_bytes(), 0);
            by_name.insert(t.name(), t);
        }

        Self {
            ancestors,
            hashes,
            by_name,
        }
    }

    /// Process-wide registry, built on first use.
    pub fn global() -> &'static TypeRegistry {
        TYPE_REGISTRY.get_or_init(Self::build)
    }

    /// Whether `sub` is `sup` or a descendant of it.
    pub fn is_a(&self, sub: AtomType, sup: AtomType) -> bool {
        self.ancestors[sub.index()] & (1u64 << sup.index()) != 0
    }

    /// Stable hash of the type name.
    pub fn type_hash(&self, t: AtomType) -> u64 {
        self.hashes[t.index()]
    }

    /// Look a type up by its name.
    pub fn from_name(&self, name: &str) -> Option<AtomType> {
        self.by_name.get(name).copied()
    }

    /// Name of a type.
    pub fn name(&self, t: AtomType) -> &'static str {
        t.name()
    }
}
