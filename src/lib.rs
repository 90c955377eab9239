//! # hypergraph-kernel
//!
//! Computational core of a content-addressed hypergraph store.
//!
//! Atoms are immutable, interned graph nodes with a canonical 64-bit content
//! hash. Some atoms are computations: executing them produces a derived
//! [`Value`], evaluating them produces a [`TruthValue`]. Arithmetic
//! expressions are simplified by a clear-box reduction engine that folds
//! known numbers and leaves canonical symbolic residue.
//!
//! ## Architecture
//!
//! ```text
//! sexpr::parse ─┐
//!               ▼
//!          AtomSpace ── UniqueIndex (Define / Grant bindings)
//!               │
//!               ▼
//!     exec::execute / exec::evaluate ──► reduct (delta reduction, maps)
//!               │
//!               ▼
//!        exec::get_value ◄── LazyTruthValue (re-sampled on every read)
//! ```
//!
//! ## Guarantees
//!
//! - Identical structure gives an identical content hash, across runs.
//! - At most one `Define`/`Grant` binding per key per space, also under
//!   concurrent registration.
//! - Self-referential expressions fail with a recursion error instead of
//!   overflowing the stack.
//!
//! ## Example
//!
//! ```
//! use hypergraph_kernel::{AtomSpace, AtomType, Value};
//!
//! let space = AtomSpace::new();
//! let x = space.add_node(AtomType::Variable, "$x").unwrap();
//! let zero = space.add_number(&[0.0]).unwrap();
//! let sum = space.add_link(AtomType::Add, vec![x.clone(), zero]).unwrap();
//!
//! assert_eq!(space.execute(&sum).unwrap(), Some(Value::Atom(x)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod canonical;
pub mod config;
pub mod error;
pub mod exec;
pub mod lazy;
pub mod reduct;
pub mod sexpr;
pub mod store;
pub mod types;

// Re-exports
pub use canonical::{hash_hex, link_hash, node_hash, INVALID_HASH};
pub use config::KernelConfig;
pub use error::{KernelError, KernelResult};
pub use exec::{evaluate, execute, get_value, ExecContext};
pub use lazy::LazyTruthValue;
pub use reduct::{delta_reduce, reorder, ArithOp, Reduct};
pub use sexpr::{parse, parse_one};
pub use store::{AtomSpace, Registration, SpaceId, UniqueIndex};
pub use types::{Atom, AtomType, Handle, NumericKind, TruthValue, TypeRegistry, Value};
