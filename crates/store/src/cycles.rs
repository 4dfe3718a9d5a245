use crate::object::Object;
use crate::state::State;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, Weak};

/// Tri-colour mark state for a single collection pass (§4.B).
#[derive(Clone, Copy, Eq, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Registry of every object ever declared, by id, used as the collector's
/// root set of candidates. Declaring inserts; the collector prunes entries
/// whose `Weak` has already gone stale on its own (ordinary `Arc` drop) and
/// sweeps the remainder for unreachable survivors.
///
/// This workspace's object graph has exactly one strong-reference edge
/// shape: a scope table owns its children (`Arc`), and a child's `parent`
/// pointer back is `Weak` (§4.B's own "a weak handle is an index... plus a
/// generation counter" suggestion, read literally). That shape cannot form
/// a cycle by construction — cross-object references that aren't
/// parent/child are resolved by path through `Store::lookup` rather than
/// held as live handles, so they can't keep a dead subgraph alive either.
/// The mark-sweep below still runs as a real tri-colour pass (so it
/// generalizes if a future payload variant introduces a live object-to-
/// object edge) but in today's graph shape it functions as a safety net
/// against registry/scope desync — an object inserted here whose link into
/// its parent's scope was lost on a failed `declare`, for instance — rather
/// than against true reference cycles.
#[derive(Default)]
pub struct Registry {
    objects: Mutex<HashMap<u64, Weak<Object>>>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    pub fn insert(&self, object: &Arc<Object>) {
        self.objects
            .lock()
            .expect("cycle registry lock poisoned")
            .insert(object.id, Arc::downgrade(object));
    }

    /// Runs one collection pass from `root`. Returns the number of objects
    /// swept (forced to `Deleted` because they survived as live `Arc`s but
    /// were unreachable from `root`).
    pub fn collect(&self, root: &Arc<Object>) -> usize {
        let mut colors: HashMap<u64, Color> = HashMap::new();
        let mut reachable: HashSet<u64> = HashSet::new();
        mark(root, &mut colors, &mut reachable);

        let mut registry = self.objects.lock().expect("cycle registry lock poisoned");
        let mut swept = 0;
        registry.retain(|id, weak| {
            let Some(obj) = weak.upgrade() else {
                return false;
            };
            if reachable.contains(id) {
                return true;
            }
            if obj.state() != State::Deleted {
                tracing::warn!(id, "cycle collector releasing unreachable object");
                let _ = obj.transition(State::Deleted);
                swept += 1;
            }
            false
        });
        swept
    }
}

fn mark(object: &Arc<Object>, colors: &mut HashMap<u64, Color>, reachable: &mut HashSet<u64>) {
    match colors.get(&object.id) {
        Some(Color::Black) | Some(Color::Gray) => return,
        _ => {}
    }
    colors.insert(object.id, Color::Gray);
    reachable.insert(object.id);
    for child in object.scope_children() {
        mark(&child, colors, reachable);
    }
    colors.insert(object.id, Color::Black);
}

#[cfg(test)]
mod test {
    use super::*;
    use metamodel::{Primitive, Type, Value};

    fn leaf(id: u64) -> Arc<Object> {
        let ty = Arc::new(Type::primitive("int32", Primitive::Int32));
        Object::new(id, Some(format!("o{id}")), ty, None, Value::Int(0))
    }

    #[test]
    fn reachable_objects_survive_a_pass() {
        let registry = Registry::new();
        let root = leaf(0);
        let child = leaf(1);
        root.scope_insert("child".to_string(), child.clone());
        registry.insert(&root);
        registry.insert(&child);
        assert_eq!(registry.collect(&root), 0);
    }

    #[test]
    fn unreachable_survivor_is_swept() {
        let registry = Registry::new();
        let root = leaf(0);
        let orphan = leaf(1);
        registry.insert(&root);
        registry.insert(&orphan);
        let swept = registry.collect(&root);
        assert_eq!(swept, 1);
        assert_eq!(orphan.state(), State::Deleted);
    }
}
