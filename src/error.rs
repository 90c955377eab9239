//! Error taxonomy for the kernel.
//!
//! Every fallible operation returns [`KernelError`]. Errors carry rendered
//! atoms rather than live handles so they can cross threads and outlive the
//! scope that produced them.
//!
//! "Not reducible" is not an error; see [`crate::reduct::Reduct`].

/// Errors raised by construction, execution and binding registration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    /// Wrong arity, abstract type or wrong child shape at build time.
    /// No atom is created when this is returned.
    #[error("Construction error for {atom_type}: {reason}")]
    Construction {
        /// Type name that was being built.
        atom_type: String,
        /// What was wrong.
        reason: String,
    },

    /// Execution or evaluation produced a value of an unexpected shape.
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Shape the caller required.
        expected: String,
        /// Rendering of what was actually produced.
        got: String,
    },

    /// A second, different binding was registered under an existing key.
    #[error("Uniqueness violation: {binding_type} already binds {key} to {existing}")]
    UniquenessViolation {
        /// Binding type name (`Define`, `Grant`).
        binding_type: String,
        /// Rendering of the key child.
        key: String,
        /// Rendering of the surviving definition.
        existing: String,
    },

    /// A required binding does not exist.
    #[error("Not found: no {binding_type} binding for {key}")]
    NotFound {
        /// Binding type name.
        binding_type: String,
        /// Rendering of the key that was looked up.
        key: String,
    },

    /// Textual input could not be parsed.
    #[error("Malformed input at byte {offset}: {reason}")]
    MalformedInput {
        /// Byte offset into the input.
        offset: usize,
        /// What the reader expected.
        reason: String,
    },

    /// Nested execution went deeper than the configured bound, which is how
    /// self-referential expressions are caught.
    #[error("Recursion limit of {limit} exceeded while executing {atom}")]
    RecursionLimit {
        /// Configured bound.
        limit: usize,
        /// Atom being executed when the bound tripped.
        atom: String,
    },
}

impl KernelError {
    /// Create a construction error.
    pub fn construction(atom_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Construction {
            atom_type: atom_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Create a malformed input error.
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            offset,
            reason: reason.into(),
        }
    }

    /// Whether this is a uniqueness violation.
    pub fn is_uniqueness_violation(&self) -> bool {
        matches!(self, Self::UniquenessViolation { .. })
    }
}

/// Result alias used throughout the crate.
pub type KernelResult<T> = Result<T, KernelError>;
