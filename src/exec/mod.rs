//! Execution and evaluation protocol.
//!
//! Two capabilities, decided by type:
//!
//! | Capability | Produces | Types |
//! |------------|----------|-------|
//! | executable | [`Value`] | arithmetic family, `Power`, `Sqrt`, `Log`, `Exp`, `Concatenate`, `FloatColumn`, `ValueOf`, `StrengthOf`, `ConfidenceOf`, `TruthValueOf`, `Schema` |
//! | evaluatable | [`TruthValue`] | `FormulaPredicate`, `TruthValueOf` |
//!
//! Atoms with neither capability denote themselves.
//!
//! ## Recursion
//!
//! Expressions may reach themselves through `Define` bindings. Every nested
//! execute/evaluate goes through [`ExecContext::enter`], which fails with
//! [`KernelError::RecursionLimit`] once the configured depth is exceeded.

pub mod flow;
pub mod truth;

use std::cell::Cell;

use crate::error::{KernelError, KernelResult};
use crate::reduct;
use crate::store::AtomSpace;
use crate::types::{AtomType, Handle, TruthValue, Value};

/// Per-call-chain execution state.
pub struct ExecContext<'a> {
    space: &'a AtomSpace,
    silent: bool,
    depth: Cell<usize>,
    max_depth: usize,
    max_steps: usize,
}

impl<'a> ExecContext<'a> {
    /// Context bound to `space`, using its configured limits.
    pub fn new(space: &'a AtomSpace) -> Self {
        let config = space.config();
        Self {
            space,
            silent: false,
            depth: Cell::new(0),
            max_depth: config.max_exec_depth,
            max_steps: config.max_value_steps,
        }
    }

    /// Suppress warning logs for failures (errors are still returned).
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Scope executions run against.
    pub fn space(&self) -> &'a AtomSpace {
        self.space
    }

    /// Whether warnings are suppressed.
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Enter one level of nested execution for `atom`.
    pub fn enter(&self, atom: &Handle) -> KernelResult<DepthGuard<'_>> {
        let depth = self.depth.get();
        if depth >= self.max_depth {
            if !self.silent {
                tracing::warn!(
                    space = %self.space.id(),
                    limit = self.max_depth,
                    atom = %atom,
                    "execution depth limit reached"
                );
            }
            return Err(KernelError::RecursionLimit {
                limit: self.max_depth,
                atom: atom.to_string(),
            });
        }
        self.depth.set(depth + 1);
        Ok(DepthGuard { depth: &self.depth })
    }
}

/// Decrements the context depth when dropped.
pub struct DepthGuard<'c> {
    depth: &'c Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

/// Execute `atom`.
///
/// Returns `Ok(None)` for a null result (e.g. reading an unset value).
/// Non-executable atoms return themselves.
pub fn execute(ctx: &ExecContext<'_>, atom: &Handle) -> KernelResult<Option<Value>> {
    if !atom.is_executable() {
        return Ok(Some(Value::Atom(atom.clone())));
    }
    let _guard = ctx.enter(atom)?;
    tracing::trace!(atom = %atom, depth = ctx.depth(), "execute");

    use AtomType::*;
    match atom.atom_type() {
        Add | Multiply | Subtract | Divide => reduct::delta_reduce(ctx, atom).map(Some),
        Power | Sqrt | Log | Exp => reduct::execute_map(ctx, atom).map(Some),
        Concatenate => flow::concatenate(ctx, atom),
        FloatColumn => flow::float_column(ctx, atom),
        ValueOf => Ok(flow::value_of(ctx, atom)),
        StrengthOf | ConfidenceOf => Ok(Some(truth::component_of(ctx, atom))),
        TruthValueOf => Ok(Some(Value::Truth(truth::attached(ctx, atom)))),
        Schema => Ok(ctx
            .space()
            .get_definition(atom, Define, true)?
            .map(Value::Atom)),
        _ => Ok(Some(Value::Atom(atom.clone()))),
    }
}

/// Evaluate `atom` to a truth value.
pub fn evaluate(ctx: &ExecContext<'_>, atom: &Handle) -> KernelResult<TruthValue> {
    match atom.atom_type() {
        AtomType::FormulaPredicate => {
            let _guard = ctx.enter(atom)?;
            truth::evaluate_formula(ctx, atom)
        }
        AtomType::TruthValueOf => {
            let _guard = ctx.enter(atom)?;
            Ok(truth::attached(ctx, atom))
        }
        _ if atom.is_executable() => match execute(ctx, atom)? {
            Some(Value::Truth(tv)) => Ok(tv),
            Some(other) => Err(KernelError::type_mismatch("TruthValue", other.to_string())),
            None => Err(KernelError::type_mismatch("TruthValue", "null")),
        },
        _ => Err(KernelError::type_mismatch("evaluatable atom", atom.to_string())),
    }
}

/// Resolve a possibly-lazy value to a concrete one.
///
/// Executes repeatedly while the current value is an executable atom.
/// Stops on a non-atom, a non-executable atom, a null result (keeping the
/// last good value) or a fixpoint. A terminal single-element `Set` or
/// single-element node sequence is unwrapped to its element.
pub fn get_value(ctx: &ExecContext<'_>, value: Value) -> KernelResult<Value> {
    let mut current = value;
    let mut steps = 0usize;

    loop {
        let atom = match &current {
            Value::Atom(h) if h.is_executable() => h.clone(),
            _ => break,
        };
        if steps >= ctx.max_steps {
            return Err(KernelError::RecursionLimit {
                limit: ctx.max_steps,
                atom: atom.to_string(),
            });
        }
        steps += 1;

        match execute(ctx, &atom)? {
            None => return Ok(current),
            Some(next) if next == current => break,
            Some(next) => current = next,
        }
    }

    Ok(match current {
        Value::Atom(h) if h.atom_type() == AtomType::Set && h.arity() == 1 => {
            Value::Atom(h.outgoing()[0].clone())
        }
        Value::Link(mut seq) if seq.len() == 1 => Value::Atom(seq.remove(0)),
        other => other,
    })
}

impl AtomSpace {
    /// Execute `atom` in this space with a fresh context.
    pub fn execute(&self, atom: &Handle) -> KernelResult<Option<Value>> {
        execute(&ExecContext::new(self), atom)
    }

    /// Evaluate `atom` in this space with a fresh context.
    pub fn evaluate(&self, atom: &Handle) -> KernelResult<TruthValue> {
        evaluate(&ExecContext::new(self), atom)
    }

    /// Resolve `atom` to a concrete value with a fresh context.
    pub fn resolve(&self, atom: &Handle) -> KernelResult<Value> {
        get_value(&ExecContext::new(self), Value::Atom(atom.clone()))
    }
}
