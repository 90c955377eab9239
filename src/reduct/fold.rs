//! Delta reduction of folded arithmetic expressions.
//!
//! `Add`, `Multiply`, `Subtract` and `Divide` fold over any number of
//! arguments. Reduction resolves every argument, combines the numeric ones
//! and leaves a canonical symbolic expression over the rest:
//!
//! ```text
//! (Add (Variable "$x") (Number "2") (Add (Variable "$y") (Number "3")))
//!   => (Add (Variable "$x") (Variable "$y") (Number "5"))
//! ```
//!
//! ## Canonical order
//!
//! Commutative operators are reordered before and after folding:
//! variables first, then other expressions, then numbers, each group in
//! original order. `Set` arguments are expanded in place, nested sets
//! included, both here and for sets an argument resolves to while folding.
//!
//! ## Annihilation
//!
//! A literal scalar `0` anywhere in a `Multiply` makes the whole product
//! the `Number` 0, even next to symbolic terms.

use crate::error::KernelResult;
use crate::exec::{get_value, ExecContext};
use crate::types::{AtomType, Handle, NumericKind, Value};

use super::ops::{broadcast, ArithOp};

/// A resolved argument.
enum Term {
    /// Payload of a `Number` atom.
    Literal(Vec<f64>),
    /// Computed float sequence; `source` is the argument that produced it.
    Live { values: Vec<f64>, source: Handle },
    /// Anything non-numeric.
    Symbolic(Handle),
}

fn classify(ctx: &ExecContext<'_>, arg: &Handle) -> KernelResult<Term> {
    let value = get_value(ctx, Value::Atom(arg.clone()))?;
    Ok(match value.numeric() {
        Some((xs, NumericKind::Literal)) => Term::Literal(xs.to_vec()),
        Some((xs, NumericKind::Float)) => Term::Live {
            values: xs.to_vec(),
            source: arg.clone(),
        },
        None => match value {
            Value::Atom(h) => Term::Symbolic(h),
            _ => Term::Symbolic(arg.clone()),
        },
    })
}

fn is_scalar(xs: &[f64], element: Option<f64>) -> bool {
    matches!((xs, element), ([x], Some(e)) if *x == e)
}

fn combine(acc: Option<Vec<f64>>, xs: &[f64], f: fn(f64, f64) -> f64) -> Option<Vec<f64>> {
    Some(match acc {
        None => xs.to_vec(),
        Some(a) => broadcast(&a, xs, f),
    })
}

/// Put a commutative expression's arguments in canonical order.
///
/// Returns `atom` itself when it is already canonical or not commutative.
pub fn reorder(ctx: &ExecContext<'_>, atom: &Handle) -> KernelResult<Handle> {
    match ArithOp::from_type(atom.atom_type()) {
        Some(op) if op.is_commutative() => {}
        _ => return Ok(atom.clone()),
    }

    let mut vars = Vec::new();
    let mut exprs = Vec::new();
    let mut numbers = Vec::new();
    let mut place = |h: &Handle| match h.atom_type() {
        AtomType::Variable => vars.push(h.clone()),
        AtomType::Number => numbers.push(h.clone()),
        _ => exprs.push(h.clone()),
    };
    let mut pending: Vec<&Handle> = atom.outgoing().iter().rev().collect();
    while let Some(child) = pending.pop() {
        if child.atom_type() == AtomType::Set {
            pending.extend(child.outgoing().iter().rev());
        } else {
            place(child);
        }
    }

    let ordered: Vec<Handle> = vars.into_iter().chain(exprs).chain(numbers).collect();
    if ordered.as_slice() == atom.outgoing() {
        return Ok(atom.clone());
    }
    ctx.space().add_link(atom.atom_type(), ordered)
}

/// Reduce a folded arithmetic expression as far as possible.
///
/// Non-arithmetic input is returned unchanged.
pub fn delta_reduce(ctx: &ExecContext<'_>, atom: &Handle) -> KernelResult<Value> {
    let op = match ArithOp::from_type(atom.atom_type()) {
        Some(op) if op.is_fold() => op,
        _ => return Ok(Value::Atom(atom.clone())),
    };

    let road = reorder(ctx, atom)?;
    let reduced = if op.is_commutative() {
        fold_commutative(ctx, &road, op)?
    } else {
        fold_ordered(ctx, &road, op)?
    };

    let result = match reduced {
        Value::Atom(h) if ArithOp::from_type(h.atom_type()).is_some_and(ArithOp::is_fold) => {
            Value::Atom(reorder(ctx, &h)?)
        }
        other => other,
    };
    tracing::trace!(expr = %atom, result = %result, "delta reduction");
    Ok(result)
}

fn fold_commutative(ctx: &ExecContext<'_>, atom: &Handle, op: ArithOp) -> KernelResult<Value> {
    let Some(f) = op.binary_fn() else {
        return Ok(Value::Atom(atom.clone()));
    };
    let space = ctx.space();

    let mut symbolic: Vec<Handle> = Vec::new();
    let mut live: Vec<Handle> = Vec::new();
    let mut literal: Option<Vec<f64>> = None;
    let mut all: Option<Vec<f64>> = None;

    // Work stack; same-operator symbolic arguments splice their children in.
    let mut pending: Vec<Handle> = atom.outgoing().iter().rev().cloned().collect();
    while let Some(arg) = pending.pop() {
        match classify(ctx, &arg)? {
            Term::Literal(xs) => {
                if is_scalar(&xs, op.annihilator()) {
                    return Ok(Value::Atom(space.add_number(&xs)?));
                }
                literal = combine(literal, &xs, f);
                all = combine(all, &xs, f);
            }
            Term::Live { values, source } => {
                all = combine(all, &values, f);
                live.push(source);
            }
            Term::Symbolic(h)
                if h.atom_type() == atom.atom_type() || h.atom_type() == AtomType::Set =>
            {
                pending.extend(h.outgoing().iter().rev().cloned());
            }
            Term::Symbolic(h) => symbolic.push(h),
        }
    }

    finish_commutative(ctx, atom.atom_type(), op, symbolic, live, literal, all)
}

/// Assemble the folded parts; kept out of the recursive frame above.
#[inline(never)]
fn finish_commutative(
    ctx: &ExecContext<'_>,
    atom_type: AtomType,
    op: ArithOp,
    symbolic: Vec<Handle>,
    live: Vec<Handle>,
    literal: Option<Vec<f64>>,
    all: Option<Vec<f64>>,
) -> KernelResult<Value> {
    let space = ctx.space();
    if symbolic.is_empty() {
        return match all {
            None => {
                let identity = op.identity().unwrap_or(0.0);
                Ok(Value::Atom(space.add_number(&[identity])?))
            }
            Some(values) if live.is_empty() => Ok(Value::Atom(space.add_number(&values)?)),
            Some(values) => Ok(Value::Float(values)),
        };
    }

    let mut out = symbolic;
    out.extend(live);
    if let Some(lits) = literal {
        if !is_scalar(&lits, op.identity()) {
            out.push(space.add_number(&lits)?);
        }
    }
    rebuild(ctx, atom_type, out)
}

fn fold_ordered(ctx: &ExecContext<'_>, atom: &Handle, op: ArithOp) -> KernelResult<Value> {
    let Some(f) = op.binary_fn() else {
        return Ok(Value::Atom(atom.clone()));
    };
    let space = ctx.space();

    let terms = atom
        .outgoing()
        .iter()
        .map(|arg| classify(ctx, arg))
        .collect::<KernelResult<Vec<_>>>()?;

    if terms.iter().all(|t| !matches!(t, Term::Symbolic(_))) {
        let mut acc: Option<Vec<f64>> = None;
        let mut literal = true;
        for term in &terms {
            match term {
                Term::Literal(xs) => acc = combine(acc, xs, f),
                Term::Live { values, .. } => {
                    literal = false;
                    acc = combine(acc, values, f);
                }
                Term::Symbolic(_) => {}
            }
        }
        return match acc {
            None => Ok(Value::Atom(atom.clone())),
            Some(values) if literal => Ok(Value::Atom(space.add_number(&values)?)),
            Some(values) => Ok(Value::Float(values)),
        };
    }

    // Mixed: only a leading run of literals folds; later literals stay in
    // place except right identities.
    let mut terms = terms.into_iter().peekable();
    let mut lead: Option<Vec<f64>> = None;
    while let Some(Term::Literal(xs)) = terms.next_if(|t| matches!(t, Term::Literal(_))) {
        lead = combine(lead, &xs, f);
    }

    let mut out = Vec::new();
    if let Some(xs) = lead {
        out.push(space.add_number(&xs)?);
    }
    for term in terms {
        match term {
            Term::Literal(xs) if !out.is_empty() && is_scalar(&xs, op.identity()) => {}
            Term::Literal(xs) => out.push(space.add_number(&xs)?),
            Term::Live { source, .. } => out.push(source),
            Term::Symbolic(h) => out.push(h),
        }
    }
    rebuild(ctx, atom.atom_type(), out)
}

fn rebuild(ctx: &ExecContext<'_>, atom_type: AtomType, mut out: Vec<Handle>) -> KernelResult<Value> {
    if out.len() == 1 {
        if let Some(only) = out.pop() {
            return Ok(Value::Atom(only));
        }
    }
    Ok(Value::Atom(ctx.space().add_link(atom_type, out)?))
}
