//! Numeric application of operators to resolved arguments.

use crate::error::{KernelError, KernelResult};
use crate::exec::{get_value, ExecContext};
use crate::types::{Handle, NumericKind, Value};

use super::ops::{broadcast, map_unary, ArithOp};

/// Outcome of applying an operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Reduct {
    /// All arguments were numeric.
    Done(Value),
    /// Some argument resolved to something non-numeric; carries the
    /// resolved arguments so the caller can rebuild symbolically.
    Irreducible(Vec<Value>),
}

impl Reduct {
    /// Whether a numeric result was produced.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// The numeric result, if any.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Done(v) => Some(v),
            Self::Irreducible(_) => None,
        }
    }
}

/// Numeric result as a `Number` atom when literal, a float sequence
/// otherwise.
pub(crate) fn numeric_value(
    ctx: &ExecContext<'_>,
    values: Vec<f64>,
    kind: NumericKind,
) -> KernelResult<Value> {
    match kind {
        NumericKind::Literal => Ok(Value::Atom(ctx.space().add_number(&values)?)),
        NumericKind::Float => Ok(Value::Float(values)),
    }
}

/// Apply a unary operator element-wise to the resolved value of `arg`.
pub fn apply_unary(ctx: &ExecContext<'_>, arg: &Handle, op: ArithOp) -> KernelResult<Reduct> {
    let f = op
        .unary_fn()
        .ok_or_else(|| KernelError::type_mismatch("unary operator", op.atom_type().name()))?;

    let vx = get_value(ctx, Value::Atom(arg.clone()))?;
    let Some((xs, kind)) = vx.numeric().map(|(xs, k)| (xs.to_vec(), k)) else {
        return Ok(Reduct::Irreducible(vec![vx]));
    };
    let out = map_unary(&xs, f);
    numeric_value(ctx, out, kind).map(Reduct::Done)
}

/// Apply a binary operator element-wise, broadcasting a length-1 operand.
///
/// The result is a `Number` only when both operands were `Number` atoms.
pub fn apply_binary(
    ctx: &ExecContext<'_>,
    x: &Handle,
    y: &Handle,
    op: ArithOp,
) -> KernelResult<Reduct> {
    let f = op
        .binary_fn()
        .ok_or_else(|| KernelError::type_mismatch("binary operator", op.atom_type().name()))?;

    let vx = get_value(ctx, Value::Atom(x.clone()))?;
    let vy = get_value(ctx, Value::Atom(y.clone()))?;
    let owned = |v: &Value| v.numeric().map(|(xs, k)| (xs.to_vec(), k));
    let (Some((xs, kx)), Some((ys, ky))) = (owned(&vx), owned(&vy)) else {
        return Ok(Reduct::Irreducible(vec![vx, vy]));
    };

    let kind = if kx == NumericKind::Literal && ky == NumericKind::Literal {
        NumericKind::Literal
    } else {
        NumericKind::Float
    };
    let out = broadcast(&xs, &ys, f);
    numeric_value(ctx, out, kind).map(Reduct::Done)
}

/// Execute an element-wise map operator (`Power`, `Sqrt`, `Log`, `Exp`).
///
/// Non-numeric arguments rebuild the operator over the resolved arguments.
pub fn execute_map(ctx: &ExecContext<'_>, atom: &Handle) -> KernelResult<Value> {
    let op = ArithOp::from_type(atom.atom_type())
        .filter(|op| !op.is_fold())
        .ok_or_else(|| KernelError::type_mismatch("map operator", atom.atom_type().name()))?;

    let reduct = match (op.is_unary(), atom.outgoing()) {
        (true, [x]) => apply_unary(ctx, x, op)?,
        (false, [x, y]) => apply_binary(ctx, x, y, op)?,
        _ => {
            return Err(KernelError::construction(
                op.atom_type().name(),
                format!("wrong number of arguments: {}", atom.arity()),
            ))
        }
    };

    match reduct {
        Reduct::Done(v) => Ok(v),
        Reduct::Irreducible(args) => {
            let rebuilt: Option<Vec<Handle>> = args.into_iter().map(Value::into_atom).collect();
            match rebuilt {
                Some(children) => Ok(Value::Atom(
                    ctx.space().add_link(atom.atom_type(), children)?,
                )),
                None => Ok(Value::Atom(atom.clone())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AtomSpace;
    use crate::types::AtomType;

    #[test]
    fn test_sqrt_vector() {
        let space = AtomSpace::new();
        let xs = space.add_number(&[4.0, 9.0, 16.0]).unwrap();
        let ctx = ExecContext::new(&space);

        let r = apply_unary(&ctx, &xs, ArithOp::Sqrt).unwrap();
        let expected = space.add_number(&[2.0, 3.0, 4.0]).unwrap();
        assert_eq!(r, Reduct::Done(Value::Atom(expected)));
    }

    #[test]
    fn test_unary_irreducible() {
        let space = AtomSpace::new();
        let x = space.add_node(AtomType::Variable, "$x").unwrap();
        let ctx = ExecContext::new(&space);

        let r = apply_unary(&ctx, &x, ArithOp::Log).unwrap();
        assert_eq!(r, Reduct::Irreducible(vec![Value::Atom(x)]));
        assert!(apply_unary(&ctx, &space.add_number(&[1.0]).unwrap(), ArithOp::Add).is_err());
    }

    #[test]
    fn test_binary_kind_follows_inputs() {
        let space = AtomSpace::new();
        let a = space.add_node(AtomType::Concept, "a").unwrap();
        let k = space.add_node(AtomType::Predicate, "k").unwrap();
        space.set_value(&a, &k, Value::Float(vec![2.0, 3.0]));
        let live = space.add_link(AtomType::ValueOf, vec![a, k]).unwrap();
        let two = space.add_number(&[2.0]).unwrap();
        let ctx = ExecContext::new(&space);

        let r = apply_binary(&ctx, &live, &two, ArithOp::Power).unwrap();
        assert_eq!(r, Reduct::Done(Value::Float(vec![4.0, 9.0])));

        let r = apply_binary(&ctx, &two, &two, ArithOp::Power).unwrap();
        let four = space.add_number(&[4.0]).unwrap();
        assert_eq!(r, Reduct::Done(Value::Atom(four)));
    }

    #[test]
    fn test_map_rebuilds_symbolically() {
        let space = AtomSpace::new();
        let f = space.add_node(AtomType::Schema, "f").unwrap();
        let x = space.add_node(AtomType::Variable, "$x").unwrap();
        space.add_link(AtomType::Define, vec![f.clone(), x.clone()]).unwrap();
        let two = space.add_number(&[2.0]).unwrap();
        let pow = space.add_link(AtomType::Power, vec![f, two.clone()]).unwrap();

        let expected = space.add_link(AtomType::Power, vec![x, two]).unwrap();
        assert_eq!(space.execute(&pow).unwrap(), Some(Value::Atom(expected)));
    }
}
