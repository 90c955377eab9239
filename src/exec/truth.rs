//! Truth-valued atoms: formula predicates and truth-value accessors.

use crate::error::{KernelError, KernelResult};
use crate::types::{AtomType, Handle, TruthValue, Value};

use super::{get_value, ExecContext};

/// Confidence a formula predicate reports when it has no confidence
/// expression.
pub const DEFAULT_FORMULA_CONFIDENCE: f64 = 1.0;

/// Evaluate a `FormulaPredicate`: child 0 gives the strength, the optional
/// child 1 the confidence. Each is the first element of the child's
/// resolved numeric value.
pub fn evaluate_formula(ctx: &ExecContext<'_>, atom: &Handle) -> KernelResult<TruthValue> {
    let component = |i: usize| -> KernelResult<Option<f64>> {
        let Some(child) = atom.child(i) else {
            return Ok(None);
        };
        let value = get_value(ctx, Value::Atom(child.clone()))?;
        match value.numeric() {
            Some((xs, _)) => Ok(Some(xs[0])),
            None => Err(KernelError::type_mismatch("numeric", value.to_string())),
        }
    };

    let strength = component(0)?.ok_or_else(|| {
        KernelError::construction("FormulaPredicate", "missing strength expression")
    })?;
    let confidence = component(1)?.unwrap_or(DEFAULT_FORMULA_CONFIDENCE);
    Ok(TruthValue::new(strength, confidence))
}

/// Truth value attached to child 0.
pub fn attached(ctx: &ExecContext<'_>, atom: &Handle) -> TruthValue {
    atom.child(0)
        .map(|target| ctx.space().truth_value(target))
        .unwrap_or_default()
}

/// `StrengthOf` / `ConfidenceOf`: one component of child 0's truth value as
/// a single-element float sequence.
pub fn component_of(ctx: &ExecContext<'_>, atom: &Handle) -> Value {
    let tv = attached(ctx, atom);
    let x = match atom.atom_type() {
        AtomType::ConfidenceOf => tv.confidence,
        _ => tv.strength,
    };
    Value::Float(vec![x])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AtomSpace;

    #[test]
    fn test_formula_constant() {
        let space = AtomSpace::new();
        let s = space.add_number(&[0.25]).unwrap();
        let c = space.add_number(&[0.5]).unwrap();
        let pred = space
            .add_link(AtomType::FormulaPredicate, vec![s.clone(), c])
            .unwrap();
        assert_eq!(space.evaluate(&pred).unwrap(), TruthValue::new(0.25, 0.5));

        let bare = space.add_link(AtomType::FormulaPredicate, vec![s]).unwrap();
        assert_eq!(
            space.evaluate(&bare).unwrap(),
            TruthValue::new(0.25, DEFAULT_FORMULA_CONFIDENCE)
        );
    }

    #[test]
    fn test_formula_reads_other_truth_values() {
        let space = AtomSpace::new();
        let a = space.add_node(AtomType::Concept, "a").unwrap();
        let b = space.add_node(AtomType::Concept, "b").unwrap();
        space.set_truth_value(&a, TruthValue::new(0.5, 0.8));
        space.set_truth_value(&b, TruthValue::new(0.4, 0.6));

        let sa = space.add_link(AtomType::StrengthOf, vec![a.clone()]).unwrap();
        let sb = space.add_link(AtomType::StrengthOf, vec![b.clone()]).unwrap();
        let strength = space.add_link(AtomType::Multiply, vec![sa, sb]).unwrap();
        let ca = space.add_link(AtomType::ConfidenceOf, vec![a]).unwrap();
        let pred = space
            .add_link(AtomType::FormulaPredicate, vec![strength, ca])
            .unwrap();

        let tv = space.evaluate(&pred).unwrap();
        assert!((tv.strength - 0.2).abs() < 1e-12);
        assert_eq!(tv.confidence, 0.8);
    }

    #[test]
    fn test_formula_rejects_symbolic() {
        let space = AtomSpace::new();
        let x = space.add_node(AtomType::Variable, "$x").unwrap();
        let pred = space.add_link(AtomType::FormulaPredicate, vec![x]).unwrap();
        assert!(matches!(
            space.evaluate(&pred),
            Err(KernelError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_truth_value_of() {
        let space = AtomSpace::new();
        let a = space.add_node(AtomType::Concept, "a").unwrap();
        let tvo = space.add_link(AtomType::TruthValueOf, vec![a.clone()]).unwrap();

        assert_eq!(space.evaluate(&tvo).unwrap(), TruthValue::DEFAULT);
        space.set_truth_value(&a, TruthValue::new(0.1, 0.2));
        assert_eq!(
            space.execute(&tvo).unwrap(),
            Some(Value::Truth(TruthValue::new(0.1, 0.2)))
        );
    }
}
