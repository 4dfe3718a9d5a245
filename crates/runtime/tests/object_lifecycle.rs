//! §8 scenarios 1 and 2, exercised through the public `runtime` surface
//! against the process-wide singleton `runtime::start` installs. Each test
//! works under its own randomly-named child of root so concurrently running
//! tests in this binary never collide on a name.

use metamodel::{Primitive, Type, Value};
use std::sync::Arc;
use store::{Error as StoreError, State};

fn ensure_started() {
    let code = runtime::start("object-lifecycle-test");
    assert_eq!(code, 0);
}

fn int32() -> Arc<Type> {
    Arc::new(Type::primitive("int32", Primitive::Int32))
}

fn string_type() -> Arc<Type> {
    Arc::new(Type::primitive("string", Primitive::String))
}

/// §8 scenario 1: `declare(/, "a", int32)` then `update_end` with value `42`
/// then `lookup(/, "a")` returns an object in `VALID` with payload `42`.
#[test]
fn declare_update_then_lookup_returns_valid_object_with_payload() {
    ensure_started();
    let store = runtime::current().store();
    let root = store.root();
    let name = runtime::random_id(12);

    let object = store.declare(&root, Some(name.clone()), int32()).unwrap();
    store.define(&object).unwrap();

    let guard = store.update_begin(&object);
    object.with_payload_mut(|v| *v = Value::Int(42));
    store.update_end(&object, guard).unwrap();

    let looked_up = store.lookup(&root, &name).unwrap();
    assert_eq!(looked_up.id, object.id);
    assert_eq!(looked_up.state(), State::Valid);
    looked_up.with_payload(|v| assert!(matches!(v, Value::Int(42))));
}

/// §8 scenario 2: redeclaring the same name with a different type fails
/// with `TypeMismatch`, and the first object is left untouched.
#[test]
fn redeclare_with_different_type_is_rejected() {
    ensure_started();
    let store = runtime::current().store();
    let root = store.root();
    let name = runtime::random_id(12);

    let first = store.declare(&root, Some(name.clone()), int32()).unwrap();
    store.define(&first).unwrap();

    let result = store.declare(&root, Some(name.clone()), string_type());
    assert!(matches!(result, Err(StoreError::TypeMismatch { .. })));

    let still_there = store.lookup(&root, &name).unwrap();
    assert_eq!(still_there.id, first.id);
    assert_eq!(still_there.ty.name, "int32");
}
