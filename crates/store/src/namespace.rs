use crate::cycles::Registry as CycleRegistry;
use crate::error::{Error, Result};
use crate::object::Object;
use crate::path::Path;
use crate::state::State;
use metamodel::{Type, Value};
use std::cell::RefCell;
use std::sync::{Arc, LazyLock, Mutex, Weak};

/// Process-wide object id generator, in the style of `automations::
/// next_task_id`'s `LazyLock<Mutex<_>>` counter.
static NEXT_ID: LazyLock<Mutex<u64>> = LazyLock::new(|| Mutex::new(1));

fn next_id() -> u64 {
    let mut guard = NEXT_ID.lock().expect("object id counter lock poisoned");
    let id = *guard;
    *guard += 1;
    id
}

thread_local! {
    /// The scope `declare`/`lookup` resolve relative paths against when no
    /// absolute path is given (§4.C).
    static CURRENT_SCOPE: RefCell<Option<Weak<Object>>> = const { RefCell::new(None) };

    /// Objects this thread has declared but not yet defined. A thread that
    /// exits while holding entries here drops the `Vec`, which drops each
    /// `Arc` in turn — ordinary `Arc` teardown does the "a thread that
    /// exits while holding such objects drops them" work for free (§4.B),
    /// no explicit at-exit hook required.
    static DECLARED_BY_ME: RefCell<Vec<Arc<Object>>> = const { RefCell::new(Vec::new()) };
}

/// A guard returned by `update_begin`, holding the payload snapshot needed
/// to implement `update_cancel`'s rollback (§4.C).
pub struct UpdateGuard {
    snapshot: Value,
}

/// A `walker::Sink` that visits nothing but lets `walker::walk` surface a
/// `ShapeMismatch`/`FieldCountMismatch` if `object.ty` and its payload have
/// drifted apart — run once at `define` time as a structural half of
/// "validate" (§4.B), ahead of the type's own `validate` delegate.
struct ShapeCheck;

impl walker::Sink for ShapeCheck {
    type Error = Error;

    fn enter(&mut self, _pos: walker::Position, _ty: &Type, _value: &Value) -> Result<()> {
        Ok(())
    }
}

/// The object tree plus the operations §4.C exposes as its public contract.
pub struct Store {
    root: Arc<Object>,
    cycles: CycleRegistry,
}

impl Store {
    pub fn new(root_type: Arc<Type>) -> Store {
        let payload = root_type.default_value();
        let root = Object::new(next_id(), None, root_type, None, payload);
        root.transition(State::Valid).expect("declared -> valid is always legal for a fresh object");
        let cycles = CycleRegistry::new();
        cycles.insert(&root);
        Store { root, cycles }
    }

    pub fn root(&self) -> Arc<Object> {
        self.root.clone()
    }

    pub fn current_scope(&self) -> Arc<Object> {
        CURRENT_SCOPE
            .with(|c| c.borrow().as_ref().and_then(Weak::upgrade))
            .unwrap_or_else(|| self.root.clone())
    }

    pub fn set_current_scope(&self, scope: &Arc<Object>) {
        CURRENT_SCOPE.with(|c| *c.borrow_mut() = Some(Arc::downgrade(scope)));
    }

    /// Creates a new child of `parent` in `DECLARED`, or returns the
    /// existing child idempotently if `name` already names one of the same
    /// type (§4.C).
    pub fn declare(
        &self,
        parent: &Arc<Object>,
        name: Option<String>,
        ty: Arc<Type>,
    ) -> Result<Arc<Object>> {
        if let Some(name) = &name {
            if let Some(existing) = parent.scope_get(name) {
                if existing.ty.name == ty.name {
                    return Ok(existing);
                }
                return Err(Error::TypeMismatch { name: name.clone() });
            }
        }

        let payload = ty.default_value();
        let child = Object::new(next_id(), name.clone(), ty, Some(Arc::downgrade(parent)), payload);
        if let Some(name) = name {
            parent.scope_insert(name, child.clone());
        }
        self.cycles.insert(&child);
        DECLARED_BY_ME.with(|d| d.borrow_mut().push(child.clone()));
        tracing::trace!(id = child.id, parent = parent.id, "DECLARE");
        Ok(child)
    }

    /// Runs `construct`, `validate`, then `define` delegates and flips the
    /// object to `VALID`; a no-op if it already is (§4.B: "define is
    /// idempotent on valid objects"). Leaves the object `DECLARED` on
    /// delegate failure.
    pub fn define(&self, object: &Arc<Object>) -> Result<()> {
        if object.state() == State::Valid {
            return Ok(());
        }
        object.with_payload(|value| walker::walk(&object.ty, value, &mut ShapeCheck, &walker::Policy::default()))?;
        object.run_delegate(object.ty.delegates.construct.as_ref())?;
        object.run_delegate(object.ty.delegates.validate.as_ref())?;
        object.run_delegate(object.ty.delegates.define.as_ref())?;
        object.transition(State::Valid)?;
        DECLARED_BY_ME.with(|d| d.borrow_mut().retain(|o| !Arc::ptr_eq(o, object)));
        tracing::trace!(id = object.id, "DEFINE");
        Ok(())
    }

    /// Reverts a `VALID` object to `DECLARED`. Used by the virtual store
    /// when a mount withdraws the data backing an object (§4.B).
    pub fn invalidate(&self, object: &Arc<Object>) -> Result<()> {
        object.transition(State::Declared)?;
        DECLARED_BY_ME.with(|d| d.borrow_mut().push(object.clone()));
        tracing::trace!(id = object.id, "INVALIDATE");
        Ok(())
    }

    /// Snapshots `object`'s payload ahead of a writer mutation.
    pub fn update_begin(&self, object: &Arc<Object>) -> UpdateGuard {
        UpdateGuard {
            snapshot: object.with_payload(|v| v.clone()),
        }
    }

    /// Runs the `update` delegate and emits `UPDATE`.
    pub fn update_end(&self, object: &Arc<Object>, _guard: UpdateGuard) -> Result<()> {
        object.run_delegate(object.ty.delegates.update.as_ref())?;
        tracing::trace!(id = object.id, "UPDATE");
        Ok(())
    }

    /// Restores the snapshot taken at `update_begin`, without emitting.
    pub fn update_cancel(&self, object: &Arc<Object>, guard: UpdateGuard) {
        object.with_payload_mut(|v| *v = guard.snapshot);
        tracing::trace!(id = object.id, "update cancelled");
    }

    /// Like `update_end`, but attributes the emitted event to `originator`
    /// rather than this thread — used by mounts to suppress looping an
    /// update they themselves published back to its source (§4.C).
    pub fn update_from(&self, object: &Arc<Object>, _guard: UpdateGuard, originator: &str) -> Result<()> {
        object.run_delegate(object.ty.delegates.update.as_ref())?;
        tracing::trace!(id = object.id, originator, "UPDATE (from)");
        Ok(())
    }

    /// Resolves `path` against `parent` (or the root, if `path` is
    /// absolute), traversing scope tables component-wise (§4.C).
    pub fn lookup(&self, parent: &Arc<Object>, path: &str) -> Result<Arc<Object>> {
        let parsed = Path::parse(path)?;
        let mut cur = if parsed.absolute {
            self.root.clone()
        } else {
            parent.clone()
        };
        for component in parsed.components.iter() {
            cur = cur.scope_get(component).ok_or_else(|| Error::NotFound {
                path: path.to_string(),
            })?;
        }
        Ok(cur)
    }

    /// Detaches and destructs every child of `scope`; recurses into
    /// grandchildren first when `recursive` is set (§4.C).
    pub fn drop_scope(&self, scope: &Arc<Object>, recursive: bool) -> Result<()> {
        for child in scope.scope_children() {
            if recursive {
                self.drop_scope(&child, true)?;
            }
            if let Some(name) = &child.name {
                scope.scope_remove(name);
            }
            self.destruct(&child)?;
        }
        Ok(())
    }

    fn destruct(&self, object: &Arc<Object>) -> Result<()> {
        object.run_delegate(object.ty.delegates.destruct.as_ref())?;
        object.run_delegate(object.ty.delegates.deinit.as_ref())?;
        object.transition(State::Deleted)?;
        tracing::trace!(id = object.id, "DELETE");
        Ok(())
    }

    /// Runs one tri-colour mark-sweep pass over every object ever declared,
    /// releasing survivors unreachable from the root (§4.B). Called at
    /// store shutdown, and may be called on demand.
    pub fn collect_cycles(&self) -> usize {
        self.cycles.collect(&self.root)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use metamodel::Primitive;

    fn store() -> Store {
        Store::new(Arc::new(Type::void()))
    }

    fn leaf_type() -> Arc<Type> {
        Arc::new(Type::primitive("int32", Primitive::Int32))
    }

    #[test]
    fn declare_is_idempotent_for_same_type() {
        let store = store();
        let root = store.root();
        let first = store.declare(&root, Some("x".to_string()), leaf_type()).unwrap();
        let second = store.declare(&root, Some("x".to_string()), leaf_type()).unwrap();
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn declare_rejects_type_mismatch() {
        let store = store();
        let root = store.root();
        store.declare(&root, Some("x".to_string()), leaf_type()).unwrap();
        let other = Arc::new(Type::primitive("bool", Primitive::Bool));
        assert!(matches!(
            store.declare(&root, Some("x".to_string()), other),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn define_transitions_to_valid() {
        let store = store();
        let root = store.root();
        let obj = store.declare(&root, Some("x".to_string()), leaf_type()).unwrap();
        assert_eq!(obj.state(), State::Declared);
        store.define(&obj).unwrap();
        assert_eq!(obj.state(), State::Valid);
        // idempotent
        store.define(&obj).unwrap();
    }

    #[test]
    fn lookup_resolves_absolute_and_relative_paths() {
        let store = store();
        let root = store.root();
        let a = store.declare(&root, Some("a".to_string()), leaf_type()).unwrap();
        let _b = store.declare(&a, Some("b".to_string()), leaf_type()).unwrap();

        assert!(store.lookup(&root, "/a/b").is_ok());
        assert!(store.lookup(&a, "b").is_ok());
        assert!(store.lookup(&root, "/a/missing").is_err());
    }

    #[test]
    fn update_cancel_restores_snapshot() {
        let store = store();
        let root = store.root();
        let obj = store.declare(&root, Some("x".to_string()), leaf_type()).unwrap();
        obj.with_payload_mut(|v| *v = Value::Int(1));
        let guard = store.update_begin(&obj);
        obj.with_payload_mut(|v| *v = Value::Int(2));
        store.update_cancel(&obj, guard);
        obj.with_payload(|v| assert!(matches!(v, Value::Int(1))));
    }

    #[test]
    fn drop_scope_deletes_children() {
        let store = store();
        let root = store.root();
        let a = store.declare(&root, Some("a".to_string()), leaf_type()).unwrap();
        store.drop_scope(&root, true).unwrap();
        assert_eq!(a.state(), State::Deleted);
        assert!(root.scope_is_empty());
    }
}
