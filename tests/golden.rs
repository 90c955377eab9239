//! Golden tests for the hypergraph kernel.
//!
//! These pin down hashing determinism, binding uniqueness, reduction
//! results and lazy-value freshness end to end, through the public API.

use std::sync::Arc;

use hypergraph_kernel::{
    delta_reduce, get_value, hash_hex, parse_one, AtomSpace, AtomType, ExecContext, Handle,
    KernelConfig, KernelError, LazyTruthValue, TruthValue, Value, INVALID_HASH,
};
use tracing_subscriber::EnvFilter;

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn num(space: &AtomSpace, xs: &[f64]) -> Handle {
    space.add_number(xs).unwrap()
}

fn var(space: &AtomSpace, name: &str) -> Handle {
    space.add_node(AtomType::Variable, name).unwrap()
}

fn concept(space: &AtomSpace, name: &str) -> Handle {
    space.add_node(AtomType::Concept, name).unwrap()
}

fn link(space: &AtomSpace, t: AtomType, children: Vec<Handle>) -> Handle {
    space.add_link(t, children).unwrap()
}

fn reduce(space: &AtomSpace, h: &Handle) -> Value {
    delta_reduce(&ExecContext::new(space), h).unwrap()
}

fn floats(space: &AtomSpace, h: &Handle) -> Vec<f64> {
    let value = space.resolve(h).unwrap();
    value.numeric().unwrap().0.to_vec()
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity & Hashing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_identical_structure_identical_hash_across_spaces() {
    init_tracing();
    let a = AtomSpace::new();
    let b = AtomSpace::new();

    let build = |space: &AtomSpace| {
        let x = var(space, "$x");
        let two = num(space, &[2.0]);
        let inner = link(space, AtomType::Multiply, vec![x, two]);
        link(space, AtomType::List, vec![inner, concept(space, "c")])
    };

    let ha = build(&a);
    let hb = build(&b);
    assert_eq!(ha.content_hash(), hb.content_hash());
    assert_eq!(hash_hex(ha.content_hash()), hash_hex(hb.content_hash()));
    assert_ne!(ha.content_hash(), INVALID_HASH);
}

#[test]
fn test_child_order_changes_hash() {
    let space = AtomSpace::new();
    let a = concept(&space, "a");
    let b = concept(&space, "b");
    let ab = link(&space, AtomType::List, vec![a.clone(), b.clone()]);
    let ba = link(&space, AtomType::List, vec![b, a]);
    assert_ne!(ab.content_hash(), ba.content_hash());
}

#[test]
fn test_node_and_link_hash_bits() {
    let space = AtomSpace::new();
    let leaf = concept(&space, "leaf");
    let compound = link(&space, AtomType::List, vec![leaf.clone()]);
    assert_eq!(leaf.content_hash() >> 63, 0);
    assert_eq!(compound.content_hash() >> 63, 1);
}

#[test]
fn test_parsed_and_built_atoms_coincide() {
    let space = AtomSpace::new();
    let built = link(
        &space,
        AtomType::Add,
        vec![var(&space, "$x"), num(&space, &[1.0])],
    );
    let parsed = parse_one(&space, r#"(Add (Variable "$x") (Number "1"))"#).unwrap();
    assert!(Handle::ptr_eq(&built, &parsed));
}

// ─────────────────────────────────────────────────────────────────────────────
// Uniqueness
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_second_definition_is_violation() {
    init_tracing();
    let space = AtomSpace::new();
    let key = space.add_node(AtomType::Schema, "f").unwrap();
    let d1 = num(&space, &[1.0]);
    let d2 = num(&space, &[2.0]);

    link(&space, AtomType::Define, vec![key.clone(), d1.clone()]);
    let err = space
        .add_link(AtomType::Define, vec![key.clone(), d2])
        .unwrap_err();
    assert!(matches!(err, KernelError::UniquenessViolation { .. }));

    assert_eq!(
        space.get_definition(&key, AtomType::Define, true).unwrap(),
        Some(d1)
    );
    assert_eq!(space.num_bindings(), 1);
}

#[test]
fn test_define_and_grant_are_independent() {
    let space = AtomSpace::new();
    let key = space.add_node(AtomType::Schema, "f").unwrap();
    let one = num(&space, &[1.0]);
    let two = num(&space, &[2.0]);

    link(&space, AtomType::Define, vec![key.clone(), one.clone()]);
    link(&space, AtomType::Grant, vec![key.clone(), two.clone()]);

    assert_eq!(
        space.get_definition(&key, AtomType::Define, true).unwrap(),
        Some(one)
    );
    assert_eq!(
        space.get_definition(&key, AtomType::Grant, true).unwrap(),
        Some(two)
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Reduction Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_two_plus_two() {
    let space = AtomSpace::new();
    let two = num(&space, &[2.0]);
    let e = link(&space, AtomType::Add, vec![two.clone(), two]);
    assert_eq!(reduce(&space, &e), Value::Atom(num(&space, &[4.0])));
}

#[test]
fn test_add_zero_is_identity() {
    let space = AtomSpace::new();
    let x = var(&space, "$x");
    let e = link(&space, AtomType::Add, vec![x.clone(), num(&space, &[0.0])]);
    assert_eq!(reduce(&space, &e), Value::Atom(x));
}

#[test]
fn test_concatenate_flattens_one_level() {
    let space = AtomSpace::new();
    let foo = concept(&space, "foo");
    let bar = concept(&space, "bar");
    let inner = link(&space, AtomType::Link, vec![foo.clone(), bar.clone()]);
    let base = link(&space, AtomType::Link, vec![inner]);
    let cat = link(&space, AtomType::Concatenate, vec![base]);

    let expected = link(&space, AtomType::Link, vec![foo, bar]);
    assert_eq!(space.execute(&cat).unwrap(), Some(Value::Atom(expected)));
}

#[test]
fn test_sqrt_vector() {
    let space = AtomSpace::new();
    let e = link(&space, AtomType::Sqrt, vec![num(&space, &[4.0, 9.0, 16.0])]);
    assert_eq!(
        space.execute(&e).unwrap(),
        Some(Value::Atom(num(&space, &[2.0, 3.0, 4.0])))
    );
}

#[test]
fn test_broadcasting() {
    let space = AtomSpace::new();
    let vector = num(&space, &[1.0, 2.0, 3.0]);

    let e = link(&space, AtomType::Add, vec![vector.clone(), num(&space, &[10.0])]);
    assert_eq!(floats(&space, &e), vec![11.0, 12.0, 13.0]);

    let e = link(&space, AtomType::Add, vec![vector, num(&space, &[10.0, 20.0])]);
    assert_eq!(floats(&space, &e), vec![11.0, 22.0]);
}

#[test]
fn test_mixed_expression_canonical_form() {
    let space = AtomSpace::new();
    let x = var(&space, "$x");
    let y = var(&space, "$y");
    let c = concept(&space, "c");
    let e = link(
        &space,
        AtomType::Multiply,
        vec![
            num(&space, &[2.0]),
            c.clone(),
            link(&space, AtomType::Multiply, vec![y.clone(), num(&space, &[3.0])]),
            x.clone(),
        ],
    );

    let expected = link(
        &space,
        AtomType::Multiply,
        vec![x, y, c, num(&space, &[6.0])],
    );
    assert_eq!(reduce(&space, &e), Value::Atom(expected));
}

#[test]
fn test_definition_substituted_during_reduction() {
    let space = AtomSpace::new();
    let f = space.add_node(AtomType::Schema, "three").unwrap();
    link(&space, AtomType::Define, vec![f.clone(), num(&space, &[3.0])]);

    let e = link(&space, AtomType::Multiply, vec![f, num(&space, &[2.0])]);
    assert_eq!(reduce(&space, &e), Value::Atom(num(&space, &[6.0])));
}

// ─────────────────────────────────────────────────────────────────────────────
// Recursion
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_self_referential_definition_fails_cleanly() {
    init_tracing();
    let space = AtomSpace::with_config(KernelConfig {
        max_exec_depth: 64,
        ..Default::default()
    });
    let f = space.add_node(AtomType::Schema, "f").unwrap();
    let body = link(&space, AtomType::Add, vec![f.clone(), num(&space, &[1.0])]);
    link(&space, AtomType::Define, vec![f.clone(), body]);

    let ctx = ExecContext::new(&space).silent(true);
    let err = get_value(&ctx, Value::Atom(f)).unwrap_err();
    assert!(matches!(err, KernelError::RecursionLimit { limit: 64, .. }));
}

#[test]
fn test_self_reference_with_default_config_on_small_stack() {
    init_tracing();
    let err = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let space = AtomSpace::new();
            let f = space.add_node(AtomType::Schema, "f").unwrap();
            let body = link(&space, AtomType::Add, vec![f.clone(), num(&space, &[1.0])]);
            link(&space, AtomType::Define, vec![f.clone(), body]);

            let ctx = ExecContext::new(&space).silent(true);
            get_value(&ctx, Value::Atom(f)).unwrap_err()
        })
        .unwrap()
        .join()
        .unwrap();

    assert!(matches!(
        err,
        KernelError::RecursionLimit { limit, .. } if limit == KernelConfig::default().max_exec_depth
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Lazy Values
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_lazy_reads_track_source_state() {
    init_tracing();
    let space = Arc::new(AtomSpace::new());
    let sensor = concept(&space, "sensor");
    let key = space.add_node(AtomType::Predicate, "reading").unwrap();
    let read = link(&space, AtomType::ValueOf, vec![sensor.clone(), key.clone()]);
    let scaled = link(&space, AtomType::Multiply, vec![read, num(&space, &[0.5])]);

    let lazy = LazyTruthValue::new(space.clone(), scaled.clone());
    space.set_value(&sensor, &key, Value::Float(vec![0.8]));
    let first = lazy.mean().unwrap();
    space.set_value(&sensor, &key, Value::Float(vec![0.2]));
    let second = lazy.mean().unwrap();

    assert_eq!(first, 0.4);
    assert_eq!(second, 0.1);

    let other = LazyTruthValue::new(space.clone(), scaled);
    assert_eq!(lazy, other);
}

#[test]
fn test_lazy_over_truth_value_of() {
    let space = Arc::new(AtomSpace::new());
    let c = concept(&space, "c");
    let tvo = link(&space, AtomType::TruthValueOf, vec![c.clone()]);
    let lazy = LazyTruthValue::new(space.clone(), tvo);

    assert_eq!(lazy.truth_value().unwrap(), TruthValue::DEFAULT);
    space.set_truth_value(&c, TruthValue::new(0.9, 0.6));
    assert_eq!(lazy.truth_value().unwrap(), TruthValue::new(0.9, 0.6));
}
