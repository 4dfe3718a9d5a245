use crate::error::{Error, Result};
use crate::flags::Attribute;
use crate::state::State;
use indexmap::IndexMap;
use metamodel::{Type, Value};
use std::sync::{Arc, RwLock, Weak};

/// A node in the object tree (§3). Strong/weak reference counts are
/// `Arc`/`Weak`'s own bookkeeping rather than hand-rolled counters in the
/// header — `claim`/`release` are thin wrappers kept for naming parity with
/// the spec's public contract, not because `Arc` needs help.
pub struct Object {
    pub id: u64,
    /// `None` for anonymous objects (§4.C: "Anonymous objects have empty
    /// names" — modeled as "no name" rather than an empty string so a scope
    /// table never has to reject `""` as a key).
    pub name: Option<String>,
    pub ty: Arc<Type>,
    parent: Option<Weak<Object>>,
    state: RwLock<State>,
    attrs: RwLock<Attribute>,
    scope: RwLock<IndexMap<String, Arc<Object>>>,
    owner: RwLock<Option<String>>,
    payload: RwLock<Value>,
}

impl Object {
    pub fn new(
        id: u64,
        name: Option<String>,
        ty: Arc<Type>,
        parent: Option<Weak<Object>>,
        payload: Value,
    ) -> Arc<Object> {
        let attrs = if name.is_some() {
            Attribute::NAMED
        } else {
            Attribute::NONE
        };
        Arc::new(Object {
            id,
            name,
            ty,
            parent,
            state: RwLock::new(State::Declared),
            attrs: RwLock::new(attrs),
            scope: RwLock::new(IndexMap::new()),
            owner: RwLock::new(None),
            payload: RwLock::new(payload),
        })
    }

    pub fn parent(&self) -> Option<Arc<Object>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn state(&self) -> State {
        *self.state.read().expect("object state lock poisoned")
    }

    pub fn attrs(&self) -> Attribute {
        *self.attrs.read().expect("object attrs lock poisoned")
    }

    pub fn set_attrs(&self, attrs: Attribute) {
        *self.attrs.write().expect("object attrs lock poisoned") = attrs;
    }

    pub fn owner(&self) -> Option<String> {
        self.owner.read().expect("object owner lock poisoned").clone()
    }

    pub fn set_owner(&self, owner: Option<String>) {
        *self.owner.write().expect("object owner lock poisoned") = owner;
    }

    pub fn with_payload<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.payload.read().expect("object payload lock poisoned"))
    }

    pub fn with_payload_mut<R>(&self, f: impl FnOnce(&mut Value) -> R) -> R {
        f(&mut self.payload.write().expect("object payload lock poisoned"))
    }

    /// Transitions `state`, validating the edge is one §4.B allows.
    pub(crate) fn transition(&self, to: State) -> Result<()> {
        let mut guard = self.state.write().expect("object state lock poisoned");
        if !guard.can_transition(to) {
            return Err(Error::InvalidTransition {
                name: self.path_hint(),
                from: *guard,
                to,
            });
        }
        *guard = to;
        Ok(())
    }

    pub(crate) fn scope_insert(&self, name: String, child: Arc<Object>) {
        self.scope
            .write()
            .expect("object scope lock poisoned")
            .insert(name, child);
    }

    pub(crate) fn scope_get(&self, name: &str) -> Option<Arc<Object>> {
        self.scope
            .read()
            .expect("object scope lock poisoned")
            .get(name)
            .cloned()
    }

    pub(crate) fn scope_remove(&self, name: &str) -> Option<Arc<Object>> {
        self.scope
            .write()
            .expect("object scope lock poisoned")
            .shift_remove(name)
    }

    /// Children in insertion order (§4.C: "insertion order for iteration").
    pub fn scope_children(&self) -> Vec<Arc<Object>> {
        self.scope
            .read()
            .expect("object scope lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    pub fn scope_is_empty(&self) -> bool {
        self.scope.read().expect("object scope lock poisoned").is_empty()
    }

    fn path_hint(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("<anon:{}>", self.id))
    }

    /// Runs a delegate, if present, and wraps a delegate-internal failure in
    /// `Error::Delegate`.
    pub(crate) fn run_delegate(
        &self,
        delegate: Option<&metamodel::Delegate>,
    ) -> Result<()> {
        let Some(delegate) = delegate else {
            return Ok(());
        };
        self.with_payload_mut(|value| delegate(value)).map_err(|source| Error::Delegate {
            name: self.path_hint(),
            source,
        })
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type", &self.ty.name)
            .field("state", &self.state())
            .finish()
    }
}

/// A non-owning reference to an object. Dereferencing past `Weak::upgrade`
/// additionally checks the state bits — a weak handle that outlives the
/// object's strong references but races a concurrent delete sees
/// `Error::Deleted` rather than a stale `Valid` object (§4.B).
#[derive(Clone)]
pub struct WeakRef(pub(crate) Weak<Object>);

impl WeakRef {
    pub fn new(target: &Arc<Object>) -> WeakRef {
        WeakRef(Arc::downgrade(target))
    }

    pub fn upgrade(&self) -> Result<Arc<Object>> {
        let obj = self.0.upgrade().ok_or(Error::NotFound {
            path: "<dropped>".to_string(),
        })?;
        if obj.state() == State::Deleted {
            return Err(Error::Deleted {
                name: obj.path_hint(),
            });
        }
        Ok(obj)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use metamodel::Primitive;

    fn int_object(id: u64, name: &str) -> Arc<Object> {
        let ty = Arc::new(Type::primitive("int32", Primitive::Int32));
        Object::new(id, Some(name.to_string()), ty, None, Value::Int(0))
    }

    #[test]
    fn new_object_starts_declared() {
        let obj = int_object(1, "a");
        assert_eq!(obj.state(), State::Declared);
    }

    #[test]
    fn weak_ref_fails_after_delete() {
        let obj = int_object(1, "a");
        let weak = WeakRef::new(&obj);
        obj.transition(State::Deleted).unwrap();
        assert!(matches!(weak.upgrade(), Err(Error::Deleted { .. })));
    }

    #[test]
    fn invalid_transition_is_rejected() {
        let obj = int_object(1, "a");
        obj.transition(State::Valid).unwrap();
        let err = obj.transition(State::Valid);
        assert!(matches!(err, Err(Error::InvalidTransition { .. })));
    }
}
