//! Kernel configuration.
//!
//! ## Sources
//!
//! - `KernelConfig::default()`
//! - `KernelConfig::from_json(..)` for a JSON document
//! - `KernelConfig::from_env()` for environment overrides:
//!   - `HGK_MAX_EXEC_DEPTH`: nesting bound for execute/evaluate (default: 64)
//!   - `HGK_MAX_VALUE_STEPS`: iteration bound when resolving a value (default: 1024)
//!   - `HGK_UNIQUE_SHARDS`: lock shards in the uniqueness index (default: 16)

use serde::{Deserialize, Serialize};

use crate::error::{KernelError, KernelResult};

/// Default nesting bound for execution.
///
/// Each level costs several stack frames (execute, reduce, resolve), so
/// the bound must trip well inside a 2 MiB thread stack in debug builds.
pub const DEFAULT_MAX_EXEC_DEPTH: usize = 64;

/// Default iteration bound for resolve-to-value.
pub const DEFAULT_MAX_VALUE_STEPS: usize = 1024;

/// Default number of uniqueness index shards.
pub const DEFAULT_UNIQUE_SHARDS: usize = 16;

/// Runtime bounds for an [`crate::AtomSpace`] and the executions run in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Maximum nesting of execute/evaluate calls before
    /// [`KernelError::RecursionLimit`] is returned.
    pub max_exec_depth: usize,
    /// Maximum number of execute steps while resolving one value.
    pub max_value_steps: usize,
    /// Number of independently locked shards in the uniqueness index.
    pub unique_shards: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            max_exec_depth: DEFAULT_MAX_EXEC_DEPTH,
            max_value_steps: DEFAULT_MAX_VALUE_STEPS,
            unique_shards: DEFAULT_UNIQUE_SHARDS,
        }
    }
}

impl KernelConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> KernelResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            KernelError::malformed(e.column().saturating_sub(1), e.to_string())
        })
    }

    /// Defaults overridden by `HGK_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env_usize("HGK_MAX_EXEC_DEPTH") {
            config.max_exec_depth = v;
        }
        if let Some(v) = env_usize("HGK_MAX_VALUE_STEPS") {
            config.max_value_steps = v;
        }
        if let Some(v) = env_usize("HGK_UNIQUE_SHARDS") {
            config.unique_shards = v;
        }
        config
    }

    /// Shard count actually used (never zero).
    pub fn effective_shards(&self) -> usize {
        self.unique_shards.max(1)
    }
}

fn env_usize(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(variable = name, value = %raw, error = %e, "ignoring invalid config override");
            None
        }
    }
}
