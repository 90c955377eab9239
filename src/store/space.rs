//! In-memory atom space.
//!
//! Interns atoms (one shared instance per distinct content), validates
//! construction against the type registry, owns the uniqueness index, and
//! holds the mutable state attached to atoms: truth values and keyed values.
//! Attached state is never part of an atom's identity.

use std::collections::{HashMap, HashSet};
use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::KernelConfig;
use crate::error::{KernelError, KernelResult};
use crate::types::atom::{format_numbers, parse_numbers};
use crate::types::{Atom, AtomType, Handle, TruthValue, TypeRegistry, Value};
use super::unique::{Registration, UniqueIndex};

/// Identifier of an atom space, used in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpaceId(Uuid);

impl SpaceId {
    /// Fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SpaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owning graph store for atoms built by this crate.
pub struct AtomSpace {
    id: SpaceId,
    registry: &'static TypeRegistry,
    config: KernelConfig,
    atoms: RwLock<HashSet<Handle>>,
    unique: UniqueIndex,
    truth_values: RwLock<HashMap<Handle, TruthValue>>,
    values: RwLock<HashMap<(Handle, Handle), Value>>,
}

impl AtomSpace {
    /// Empty space with default configuration.
    pub fn new() -> Self {
        Self::with_config(KernelConfig::default())
    }

    /// Empty space with the given configuration.
    ///
    /// Every space consults the process-wide [`TypeRegistry::global`], the
    /// same instance atom hashing and binding keys use.
    pub fn with_config(config: KernelConfig) -> Self {
        let unique = UniqueIndex::new(config.effective_shards());
        Self {
            id: SpaceId::new(),
            registry: TypeRegistry::global(),
            config,
            atoms: RwLock::new(HashSet::new()),
            unique,
            truth_values: RwLock::new(HashMap::new()),
            values: RwLock::new(HashMap::new()),
        }
    }

    /// This space's identifier.
    pub fn id(&self) -> SpaceId {
        self.id
    }

    /// Configuration the space was built with.
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Type registry consulted at construction (always the global one).
    pub fn registry(&self) -> &'static TypeRegistry {
        self.registry
    }

    // ─────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────

    /// Add (or find) a leaf atom.
    pub fn add_node(&self, atom_type: AtomType, name: impl Into<String>) -> KernelResult<Handle> {
        let name = name.into();
        self.check_concrete(atom_type, true)?;

        let atom = match atom_type {
            AtomType::Number => {
                let values = parse_numbers(&name).ok_or_else(|| {
                    KernelError::construction("Number", format!("not a numeric vector: {name:?}"))
                })?;
                Atom::new_node(AtomType::Number, format_numbers(&values), Some(values))
            }
            AtomType::Type => {
                if self.registry.from_name(&name).is_none() {
                    return Err(KernelError::construction(
                        "Type",
                        format!("unknown type name {name:?}"),
                    ));
                }
                Atom::new_node(AtomType::Type, name, None)
            }
            _ => Atom::new_node(atom_type, name, None),
        };
        Ok(self.intern(atom))
    }

    /// Add (or find) a `Number` atom holding `values`.
    pub fn add_number(&self, values: &[f64]) -> KernelResult<Handle> {
        if values.is_empty() {
            return Err(KernelError::construction("Number", "empty numeric vector"));
        }
        Ok(self.intern(Atom::new_node(
            AtomType::Number,
            format_numbers(values),
            Some(values.to_vec()),
        )))
    }

    /// Add (or find) a compound atom.
    ///
    /// Binding types are registered in the uniqueness index; a different
    /// definition under an already bound key fails with
    /// [`KernelError::UniquenessViolation`].
    pub fn add_link(&self, atom_type: AtomType, outgoing: Vec<Handle>) -> KernelResult<Handle> {
        self.add_link_tracked(atom_type, outgoing).map(|(h, _)| h)
    }

    /// [`AtomSpace::add_link`], also reporting whether this call inserted a
    /// new binding.
    pub(crate) fn add_link_tracked(
        &self,
        atom_type: AtomType,
        outgoing: Vec<Handle>,
    ) -> KernelResult<(Handle, bool)> {
        self.check_concrete(atom_type, false)?;
        self.check_shape(atom_type, &outgoing)?;

        let candidate = Handle::new(Atom::new_link(atom_type, outgoing));
        if atom_type.is_unique() {
            return self.register(candidate);
        }
        Ok((self.intern_handle(candidate), false))
    }

    fn check_concrete(&self, atom_type: AtomType, want_node: bool) -> KernelResult<()> {
        if atom_type.is_abstract() {
            return Err(KernelError::construction(
                atom_type.name(),
                "abstract type cannot be instantiated",
            ));
        }
        let is_node = self.registry.is_a(atom_type, AtomType::Node);
        if want_node && !is_node {
            return Err(KernelError::construction(atom_type.name(), "not a node type"));
        }
        if !want_node && is_node {
            return Err(KernelError::construction(atom_type.name(), "not a link type"));
        }
        Ok(())
    }

    fn check_shape(&self, atom_type: AtomType, outgoing: &[Handle]) -> KernelResult<()> {
        use AtomType::*;
        let n = outgoing.len();
        let arity_err = |expected: &str| {
            Err(KernelError::construction(
                atom_type.name(),
                format!("expected {expected} children, got {n}"),
            ))
        };

        match atom_type {
            Define | Grant | Power | ValueOf if n != 2 => return arity_err("2"),
            Sqrt | Log | Exp | FloatColumn | StrengthOf | ConfidenceOf | TruthValueOf if n != 1 => {
                return arity_err("1")
            }
            Subtract | Divide if n < 2 => return arity_err("at least 2"),
            Concatenate | FormulaPredicate if !(1..=2).contains(&n) => {
                return arity_err("1 or 2")
            }
            _ => {}
        }

        if atom_type == Define && !outgoing[0].is_node() {
            return Err(KernelError::construction(
                "Define",
                format!("key must be a node, got {}", outgoing[0]),
            ));
        }

        if atom_type == Concatenate && n == 2 {
            let type_node = &outgoing[0];
            let declared = (type_node.atom_type() == Type)
                .then(|| type_node.name().and_then(|name| self.registry.from_name(name)))
                .flatten();
            match declared {
                Some(t) if t.is_link() && !t.is_abstract() => {}
                _ => {
                    return Err(KernelError::construction(
                        "Concatenate",
                        format!("first of two children must name a concrete link type, got {type_node}"),
                    ))
                }
            }
        }
        Ok(())
    }

    fn intern(&self, atom: Atom) -> Handle {
        self.intern_handle(Handle::new(atom))
    }

    fn intern_handle(&self, candidate: Handle) -> Handle {
        // Hash outside the lock; children are already hashed.
        candidate.content_hash();
        if let Some(existing) = self.atoms.read().get(&candidate) {
            return existing.clone();
        }
        let mut atoms = self.atoms.write();
        if let Some(existing) = atoms.get(&candidate) {
            return existing.clone();
        }
        atoms.insert(candidate.clone());
        candidate
    }

    fn register(&self, binding: Handle) -> KernelResult<(Handle, bool)> {
        match self.unique.register(&binding) {
            Ok(Registration::Inserted(h)) => {
                tracing::debug!(
                    space = %self.id,
                    binding_type = %h.atom_type(),
                    key = %binding.outgoing()[0],
                    "registered binding"
                );
                self.atoms.write().insert(h.clone());
                Ok((h, true))
            }
            Ok(Registration::Existing(h)) => Ok((h, false)),
            Err(e) => {
                tracing::warn!(space = %self.id, error = %e, "rejected binding");
                Err(e)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────

    /// The interned instance content-equal to `h`, if present.
    pub fn get_atom(&self, h: &Handle) -> Option<Handle> {
        self.atoms.read().get(h).cloned()
    }

    /// Whether a content-equal atom is interned here.
    pub fn contains(&self, h: &Handle) -> bool {
        self.atoms.read().contains(h)
    }

    /// Number of interned atoms.
    pub fn len(&self) -> usize {
        self.atoms.read().len()
    }

    /// No atoms interned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The unique binding of `binding_type` for `key`.
    ///
    /// Returns `Ok(None)` when absent and not `required`.
    pub fn get_unique(
        &self,
        key: &Handle,
        binding_type: AtomType,
        required: bool,
    ) -> KernelResult<Option<Handle>> {
        if !binding_type.is_unique() || binding_type.is_abstract() {
            return Err(KernelError::type_mismatch("binding type", binding_type.name()));
        }
        match self.unique.lookup(binding_type, key) {
            Some(b) => Ok(Some(b)),
            None if required => Err(KernelError::NotFound {
                binding_type: binding_type.name().to_string(),
                key: key.to_string(),
            }),
            None => Ok(None),
        }
    }

    /// The definition child of the unique binding for `key`.
    pub fn get_definition(
        &self,
        key: &Handle,
        binding_type: AtomType,
        required: bool,
    ) -> KernelResult<Option<Handle>> {
        Ok(self
            .get_unique(key, binding_type, required)?
            .and_then(|b| b.child(1).cloned()))
    }

    /// Remove a binding (key and definition must both match).
    pub fn remove_binding(&self, binding: &Handle) -> bool {
        if !binding.atom_type().is_unique() {
            return false;
        }
        if !self.unique.remove(binding) {
            return false;
        }
        let mut atoms = self.atoms.write();
        if atoms.get(binding).is_some_and(|h| h.structurally_eq(binding)) {
            atoms.remove(binding);
        }
        tracing::debug!(space = %self.id, binding = %binding, "removed binding");
        true
    }

    /// Number of registered bindings.
    pub fn num_bindings(&self) -> usize {
        self.unique.len()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Attached state
    // ─────────────────────────────────────────────────────────────────────

    /// Attach a truth value to `atom`.
    pub fn set_truth_value(&self, atom: &Handle, tv: TruthValue) {
        self.truth_values.write().insert(atom.clone(), tv);
    }

    /// Truth value attached to `atom` ([`TruthValue::DEFAULT`] if none).
    pub fn truth_value(&self, atom: &Handle) -> TruthValue {
        self.truth_values
            .read()
            .get(atom)
            .copied()
            .unwrap_or_default()
    }

    /// Attach `value` to `atom` under `key`, replacing any previous value.
    pub fn set_value(&self, atom: &Handle, key: &Handle, value: Value) {
        self.values
            .write()
            .insert((atom.clone(), key.clone()), value);
    }

    /// Value attached to `atom` under `key`.
    pub fn get_value(&self, atom: &Handle, key: &Handle) -> Option<Value> {
        self.values
            .read()
            .get(&(atom.clone(), key.clone()))
            .cloned()
    }
}

impl Default for AtomSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AtomSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomSpace")
            .field("id", &self.id)
            .field("atoms", &self.len())
            .field("bindings", &self.num_bindings())
            .finish()
    }
}
