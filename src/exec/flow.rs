//! Structural executables: `Concatenate`, `FloatColumn`, `ValueOf`.

use crate::error::{KernelError, KernelResult};
use crate::types::{AtomType, Handle, Value};

use super::{execute, get_value, ExecContext};

/// Flatten one level of nesting in the result of the base expression.
///
/// With two children the first is a `Type` node naming the output link
/// type; otherwise the base's own type is kept (or `List` when the base
/// produced a bare sequence).
pub fn concatenate(ctx: &ExecContext<'_>, atom: &Handle) -> KernelResult<Option<Value>> {
    let (declared, base) = match atom.outgoing() {
        [type_node, base] => (declared_type(ctx, type_node)?, base),
        [base] => (None, base),
        _ => {
            return Err(KernelError::construction(
                "Concatenate",
                format!("expected 1 or 2 children, got {}", atom.arity()),
            ))
        }
    };

    if !base.is_executable() {
        return flatten(ctx, declared, base).map(Some);
    }

    match execute(ctx, base)? {
        None => Ok(None),
        Some(Value::Atom(h)) => flatten(ctx, declared, &h).map(Some),
        Some(Value::Link(seq)) => {
            let link = ctx
                .space()
                .add_link(declared.unwrap_or(AtomType::List), seq)?;
            Ok(Some(Value::Atom(link)))
        }
        Some(other) => Err(KernelError::type_mismatch(
            "atom or atom sequence",
            other.to_string(),
        )),
    }
}

fn declared_type(ctx: &ExecContext<'_>, type_node: &Handle) -> KernelResult<Option<AtomType>> {
    type_node.name()
        .and_then(|name| ctx.space().registry().from_name(name))
        .map(Some)
        .ok_or_else(|| KernelError::type_mismatch("Type node", type_node.to_string()))
}

/// Splice each compound child's children into the parent's position.
///
/// Leaves are returned unchanged.
pub fn flatten(
    ctx: &ExecContext<'_>,
    declared: Option<AtomType>,
    base: &Handle,
) -> KernelResult<Value> {
    if !base.is_link() {
        return Ok(Value::Atom(base.clone()));
    }

    let mut flat = Vec::with_capacity(base.arity());
    for child in base.outgoing() {
        if child.is_link() {
            flat.extend(child.outgoing().iter().cloned());
        } else {
            flat.push(child.clone());
        }
    }

    let out_type = declared.unwrap_or(base.atom_type());
    tracing::trace!(base = %base, out_type = %out_type, arity = flat.len(), "flatten");
    Ok(Value::Atom(ctx.space().add_link(out_type, flat)?))
}

/// Collect the numeric payloads of a sequence of atoms into one float
/// sequence.
pub fn float_column(ctx: &ExecContext<'_>, atom: &Handle) -> KernelResult<Option<Value>> {
    let Some(base) = atom.child(0) else {
        return Err(KernelError::construction("FloatColumn", "missing child"));
    };

    let items: Vec<Handle> = if base.is_executable() {
        match execute(ctx, base)? {
            None => return Ok(None),
            Some(Value::Float(column)) => return Ok(Some(Value::Float(column))),
            Some(Value::Atom(h)) if h.is_link() => h.outgoing().to_vec(),
            Some(Value::Atom(h)) => vec![h],
            Some(Value::Link(seq)) => seq,
            Some(other) => {
                return Err(KernelError::type_mismatch(
                    "atom sequence",
                    other.to_string(),
                ))
            }
        }
    } else if base.is_link() {
        base.outgoing().to_vec()
    } else {
        vec![base.clone()]
    };

    let mut column = Vec::with_capacity(items.len());
    for item in items {
        let value = get_value(ctx, Value::Atom(item))?;
        match value.numeric() {
            Some((xs, _)) => column.extend_from_slice(xs),
            None => return Err(KernelError::type_mismatch("numeric", value.to_string())),
        }
    }
    Ok(Some(Value::Float(column)))
}

/// Read the value attached to child 0 under key child 1.
pub fn value_of(ctx: &ExecContext<'_>, atom: &Handle) -> Option<Value> {
    match atom.outgoing() {
        [target, key] => ctx.space().get_value(target, key),
        _ => None,
    }
}
