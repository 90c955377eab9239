//! Content hashing for atoms.
//!
//! ## Algorithm
//!
//! 1. `seed = LARGE_ODD_PRIME * type_hash(type)`
//! 2. for each child, in order: `seed += (seed << 5) ^ (SMALL_PRIME * child_hash)`
//! 3. murmur3 64-bit finalizer (three xor-shift rounds, two multiplies)
//! 4. links get the top bit forced on, nodes get it forced off; a result
//!    equal to [`INVALID_HASH`] is decremented by one
//!
//! Leaves fold a single xxh64 of their name in place of child hashes.
//!
//! ## Determinism Guarantees
//!
//! - Type hashes are xxh64 of the type name, so reordering the type
//!   enumeration does not change any content hash.
//! - All arithmetic wraps; results are identical across platforms and
//!   processes.

use xxhash_rust::xxh64::xxh64;

/// Reserved sentinel; no atom ever hashes to this value.
pub const INVALID_HASH: u64 = u64::MAX;

/// `2^44 - 377`, prime.
pub const LARGE_ODD_PRIME: u64 = (1u64 << 44) - 377;

/// Multiplier applied to each child hash.
pub const SMALL_PRIME: u64 = 353;

const MIX_C1: u64 = 0xff51_afd7_ed55_8ccd;
const MIX_C2: u64 = 0xc4ce_b9fe_1a85_ec53;

/// Top bit, set on every link hash.
pub const LINK_MASK: u64 = 1u64 << 63;

/// Three-round avalanche mix.
#[inline]
pub fn mix64(mut h: u64) -> u64 {
    h ^= h >> 33;
    h = h.wrapping_mul(MIX_C1);
    h ^= h >> 33;
    h = h.wrapping_mul(MIX_C2);
    h ^= h >> 33;
    h
}

#[inline]
fn fold_seed(type_hash: u64, parts: impl IntoIterator<Item = u64>) -> u64 {
    let mut seed = LARGE_ODD_PRIME.wrapping_mul(type_hash);
    for part in parts {
        seed = seed.wrapping_add((seed << 5) ^ SMALL_PRIME.wrapping_mul(part));
    }
    seed
}

#[inline]
fn avoid_sentinel(h: u64) -> u64 {
    if h == INVALID_HASH {
        h - 1
    } else {
        h
    }
}

/// Hash of a compound atom from its type hash and ordered child hashes.
pub fn link_hash(type_hash: u64, child_hashes: impl IntoIterator<Item = u64>) -> u64 {
    let h = mix64(fold_seed(type_hash, child_hashes)) | LINK_MASK;
    avoid_sentinel(h)
}

/// Hash of a leaf atom from its type hash and name.
pub fn node_hash(type_hash: u64, name: &str) -> u64 {
    let h = mix64(fold_seed(type_hash, [xxh64(name.as_bytes(), 0)])) & !LINK_MASK;
    avoid_sentinel(h)
}

/// Render a hash the way logs print it.
pub fn hash_hex(h: u64) -> String {
    format!("{:016x}", h)
}
