//! Owning graph store: interning, uniqueness index and attached state.

pub mod space;
pub mod unique;

pub use space::{AtomSpace, SpaceId};
pub use unique::{binding_hash, Registration, UniqueIndex};
