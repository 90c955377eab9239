//! Lazily recomputed truth value.
//!
//! A [`LazyTruthValue`] wraps a source expression and re-derives its
//! numeric payload from it on every read. The cached sample only serves
//! [`LazyTruthValue::current`]; accessors such as [`LazyTruthValue::mean`]
//! always refresh first, so a change in the source's underlying state is
//! visible on the next read.
//!
//! ## Refresh order
//!
//! 1. `FormulaPredicate` source: evaluated as a predicate.
//! 2. Other evaluatable source: evaluated.
//! 3. Executable source: executed; the result must be numeric.
//! 4. Anything else: the source's attached truth value.
//!
//! ## Equality
//!
//! Two lazy values are equal when their sources are the same expression.
//! Samples and sample times are ignored.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::{KernelError, KernelResult};
use crate::exec::{self, truth, ExecContext};
use crate::store::AtomSpace;
use crate::types::{AtomType, Handle, TruthValue, Value};

/// Confidence reported for a one-element sample.
pub const SINGLE_SAMPLE_CONFIDENCE: f64 = 1.0;

#[derive(Debug, Default)]
struct Sample {
    values: Vec<f64>,
    taken_at: Option<DateTime<Utc>>,
}

/// Truth value recomputed from a live expression on every read.
pub struct LazyTruthValue {
    source: Handle,
    space: Arc<AtomSpace>,
    sample: Mutex<Sample>,
}

impl LazyTruthValue {
    /// Wrap `source`, evaluated against `space`.
    pub fn new(space: Arc<AtomSpace>, source: Handle) -> Self {
        Self {
            source,
            space,
            sample: Mutex::new(Sample::default()),
        }
    }

    /// Source expression.
    pub fn source(&self) -> &Handle {
        &self.source
    }

    /// Re-derive the payload from the source and cache it.
    pub fn update(&self) -> KernelResult<Vec<f64>> {
        let ctx = ExecContext::new(&self.space);
        let source = &self.source;

        let values = if source.atom_type() == AtomType::FormulaPredicate {
            let _guard = ctx.enter(source)?;
            truth::evaluate_formula(&ctx, source)?.to_vec()
        } else if source.is_evaluatable() {
            exec::evaluate(&ctx, source)?.to_vec()
        } else if source.is_executable() {
            match exec::execute(&ctx, source)? {
                Some(Value::Truth(tv)) => tv.to_vec(),
                Some(value) => match value.numeric() {
                    Some((xs, _)) => xs.to_vec(),
                    None => {
                        return Err(KernelError::type_mismatch(
                            "numeric sequence",
                            value.to_string(),
                        ))
                    }
                },
                None => return Err(KernelError::type_mismatch("numeric sequence", "null")),
            }
        } else {
            self.space.truth_value(source).to_vec()
        };

        let now = Utc::now();
        tracing::trace!(source = %source, sample = ?values, "lazy value refreshed");
        let mut sample = self.sample.lock();
        sample.values = values.clone();
        sample.taken_at = Some(now);
        Ok(values)
    }

    /// Fresh sample.
    pub fn sample(&self) -> KernelResult<Vec<f64>> {
        self.update()
    }

    /// Fresh strength (first element of the sample).
    pub fn mean(&self) -> KernelResult<f64> {
        let values = self.update()?;
        values
            .first()
            .copied()
            .ok_or_else(|| KernelError::type_mismatch("non-empty sample", "empty"))
    }

    /// Fresh confidence (second element of the sample).
    ///
    /// A one-element sample reports [`SINGLE_SAMPLE_CONFIDENCE`].
    pub fn confidence(&self) -> KernelResult<f64> {
        let values = self.update()?;
        match values.as_slice() {
            [] => Err(KernelError::type_mismatch("non-empty sample", "empty")),
            [_] => Ok(SINGLE_SAMPLE_CONFIDENCE),
            [_, c, ..] => Ok(*c),
        }
    }

    /// Fresh sample as a truth value.
    pub fn truth_value(&self) -> KernelResult<TruthValue> {
        Ok(TruthValue::new(self.mean()?, self.confidence()?))
    }

    /// Last cached sample, without refreshing.
    pub fn current(&self) -> Vec<f64> {
        self.sample.lock().values.clone()
    }

    /// When the last sample was taken.
    pub fn last_sampled(&self) -> Option<DateTime<Utc>> {
        self.sample.lock().taken_at
    }

    /// Refresh, then render the source together with the new sample.
    pub fn render(&self) -> KernelResult<String> {
        let values = self.update()?;
        let sample = values
            .iter()
            .map(f64::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        Ok(format!("(LazyTruthValue {} ({sample}))", self.source))
    }
}

impl PartialEq for LazyTruthValue {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for LazyTruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sample = self.sample.lock();
        f.debug_struct("LazyTruthValue")
            .field("source", &self.source.to_string())
            .field("sample", &sample.values)
            .field("taken_at", &sample.taken_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_source(space: &AtomSpace) -> (Handle, Handle, Handle) {
        let a = space.add_node(AtomType::Concept, "sensor").unwrap();
        let k = space.add_node(AtomType::Predicate, "reading").unwrap();
        let read = space
            .add_link(AtomType::ValueOf, vec![a.clone(), k.clone()])
            .unwrap();
        (a, k, read)
    }

    #[test]
    fn test_reads_are_fresh() {
        let space = Arc::new(AtomSpace::new());
        let (a, k, read) = live_source(&space);
        let lazy = LazyTruthValue::new(space.clone(), read);

        space.set_value(&a, &k, Value::Float(vec![0.2, 0.9]));
        assert_eq!(lazy.mean().unwrap(), 0.2);
        space.set_value(&a, &k, Value::Float(vec![0.7, 0.9]));
        assert_eq!(lazy.mean().unwrap(), 0.7);
        assert_eq!(lazy.confidence().unwrap(), 0.9);
        assert_eq!(lazy.current(), vec![0.7, 0.9]);
        assert!(lazy.last_sampled().is_some());
    }

    #[test]
    fn test_equality_ignores_sample() {
        let space = Arc::new(AtomSpace::new());
        let (a, k, read) = live_source(&space);
        let first = LazyTruthValue::new(space.clone(), read.clone());
        let second = LazyTruthValue::new(space.clone(), read);

        space.set_value(&a, &k, Value::Float(vec![0.1]));
        first.update().unwrap();
        space.set_value(&a, &k, Value::Float(vec![0.5]));
        second.update().unwrap();

        assert_ne!(first.current(), second.current());
        assert_eq!(first, second);
    }

    #[test]
    fn test_static_truth_value_fallback() {
        let space = Arc::new(AtomSpace::new());
        let c = space.add_node(AtomType::Concept, "c").unwrap();
        space.set_truth_value(&c, TruthValue::new(0.3, 0.4));
        let lazy = LazyTruthValue::new(space.clone(), c);

        assert_eq!(lazy.truth_value().unwrap(), TruthValue::new(0.3, 0.4));
    }

    #[test]
    fn test_formula_source() {
        let space = Arc::new(AtomSpace::new());
        let c = space.add_node(AtomType::Concept, "c").unwrap();
        let strength = space.add_link(AtomType::StrengthOf, vec![c.clone()]).unwrap();
        let pred = space
            .add_link(AtomType::FormulaPredicate, vec![strength])
            .unwrap();
        let lazy = LazyTruthValue::new(space.clone(), pred);

        space.set_truth_value(&c, TruthValue::new(0.25, 0.0));
        assert_eq!(lazy.sample().unwrap(), vec![0.25, 1.0]);
        space.set_truth_value(&c, TruthValue::new(0.75, 0.0));
        assert_eq!(lazy.mean().unwrap(), 0.75);
    }

    #[test]
    fn test_non_numeric_execution_rejected() {
        let space = Arc::new(AtomSpace::new());
        let a = space.add_node(AtomType::Concept, "a").unwrap();
        let l = space.add_link(AtomType::List, vec![a.clone(), a]).unwrap();
        let cat = space.add_link(AtomType::Concatenate, vec![l]).unwrap();
        let lazy = LazyTruthValue::new(space.clone(), cat);

        assert!(matches!(
            lazy.update(),
            Err(KernelError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_render() {
        let space = Arc::new(AtomSpace::new());
        let two = space.add_number(&[2.0]).unwrap();
        let sum = space.add_link(AtomType::Add, vec![two.clone(), two]).unwrap();
        let lazy = LazyTruthValue::new(space.clone(), sum);

        let text = lazy.render().unwrap();
        assert!(text.starts_with("(LazyTruthValue (Add"));
        assert!(text.ends_with("(4))"));
    }
}
