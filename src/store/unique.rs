//! Uniqueness index: at most one binding per `(binding type, key)` in a scope.
//!
//! Bindings hash on their type and key child only, so the binding hash is
//! also the index key. The index is split into shards, each behind its own
//! mutex; the check and the insert for one key always happen under the same
//! shard lock, so two racing registrations of the same key cannot both
//! succeed.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::canonical::link_hash;
use crate::error::{KernelError, KernelResult};
use crate::types::{AtomType, Handle, TypeRegistry};

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub enum Registration {
    /// The binding was not present and has been inserted.
    Inserted(Handle),
    /// An identical binding (same key and same definition) already existed.
    Existing(Handle),
}

impl Registration {
    /// The surviving binding.
    pub fn handle(&self) -> &Handle {
        match self {
            Self::Inserted(h) | Self::Existing(h) => h,
        }
    }
}

/// Sharded key → binding index.
pub struct UniqueIndex {
    shards: Box<[Mutex<HashMap<u64, Vec<Handle>>>]>,
}

/// Hash a binding of type `binding_type` would have for `key`.
pub fn binding_hash(binding_type: AtomType, key: &Handle) -> u64 {
    link_hash(
        TypeRegistry::global().type_hash(binding_type),
        [key.content_hash()],
    )
}

impl UniqueIndex {
    /// Create an index with `shards` independently locked partitions.
    pub fn new(shards: usize) -> Self {
        let shards = (0..shards.max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self { shards }
    }

    fn shard(&self, hash: u64) -> &Mutex<HashMap<u64, Vec<Handle>>> {
        &self.shards[(hash % self.shards.len() as u64) as usize]
    }

    /// Insert `binding` unless its key is already bound.
    ///
    /// Re-registering an identical binding is not a violation; registering a
    /// different definition under a bound key is.
    pub fn register(&self, binding: &Handle) -> KernelResult<Registration> {
        let hash = binding.content_hash();
        let mut shard = self.shard(hash).lock();
        let bucket = shard.entry(hash).or_default();

        // Content equality on bindings compares type and key only.
        if let Some(existing) = bucket.iter().find(|b| *b == binding) {
            if existing.structurally_eq(binding) {
                return Ok(Registration::Existing(existing.clone()));
            }
            return Err(KernelError::UniquenessViolation {
                binding_type: binding.atom_type().name().to_string(),
                key: render_child(existing, 0),
                existing: render_child(existing, 1),
            });
        }

        bucket.push(binding.clone());
        Ok(Registration::Inserted(binding.clone()))
    }

    /// The binding of `binding_type` whose key is content-equal to `key`.
    pub fn lookup(&self, binding_type: AtomType, key: &Handle) -> Option<Handle> {
        let hash = binding_hash(binding_type, key);
        let shard = self.shard(hash).lock();
        shard.get(&hash).and_then(|bucket| {
            bucket
                .iter()
                .find(|b| b.atom_type() == binding_type && b.child(0) == Some(key))
                .cloned()
        })
    }

    /// Remove exactly this binding (key and definition must both match).
    pub fn remove(&self, binding: &Handle) -> bool {
        let hash = binding.content_hash();
        let mut shard = self.shard(hash).lock();
        let Some(bucket) = shard.get_mut(&hash) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|b| !b.structurally_eq(binding));
        let removed = bucket.len() != before;
        if bucket.is_empty() {
            shard.remove(&hash);
        }
        removed
    }

    /// Number of registered bindings.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().values().map(Vec::len).sum::<usize>())
            .sum()
    }

    /// No bindings registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of shards.
    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }
}

fn render_child(binding: &Handle, i: usize) -> String {
    binding
        .child(i)
        .map(|h| h.to_string())
        .unwrap_or_else(|| "<none>".to_string())
}
