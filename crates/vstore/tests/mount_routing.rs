//! Scenario coverage for the router (§4.F / §8): overlapping mounts
//! de-duplicating by id, and `publish` against an id that doesn't resolve
//! locally.

use metamodel::{Primitive, Type};
use observer::Event;
use std::sync::{Arc, Mutex};
use store::Store;
use vstore::{Dispatcher, Mount, MountPolicy, MountSink, Ownership, Query, QueryResult};

fn leaf_type() -> Arc<Type> {
    Arc::new(Type::primitive("int32", Primitive::Int32))
}

fn root_dispatcher() -> Dispatcher {
    let store = Arc::new(Store::new(Arc::new(Type::void())));
    Dispatcher::new(store)
}

fn row(id: u64, leaf: &str) -> QueryResult {
    QueryResult {
        id,
        path: leaf.to_string(),
        ty: leaf_type(),
        value: Some(metamodel::Value::Int(id as i64)),
    }
}

struct FixedMount {
    rows: Vec<QueryResult>,
    ownership: Ownership,
}

impl Mount for FixedMount {
    fn policy(&self) -> MountPolicy {
        MountPolicy {
            ownership: self.ownership,
        }
    }

    fn on_query(&self, _query: &Query) -> anyhow::Result<Vec<QueryResult>> {
        Ok(self.rows.clone())
    }

    fn on_subscribe(&self, _query: &Query, _sink: MountSink) -> anyhow::Result<u64> {
        Ok(0)
    }
}

/// §8 scenario 4: two mounts rooted at the same scope, one returning `[a,
/// b, c]` and the other `[b, d]` by id — the router yields exactly `{a, b,
/// c, d}`, keeping the first mount's row for the shared id `b`.
#[test]
fn overlapping_mounts_dedup_by_id() {
    let dispatcher = root_dispatcher();
    let first = Arc::new(FixedMount {
        rows: vec![row(1, "a"), row(2, "b"), row(3, "c")],
        ownership: Ownership::LocalSource,
    });
    let second = Arc::new(FixedMount {
        rows: vec![row(2, "b-from-second"), row(4, "d")],
        ownership: Ownership::LocalSource,
    });
    dispatcher.register_mount("/m", first).unwrap();
    dispatcher.register_mount("/m", second).unwrap();

    let mut ids: Vec<u64> = dispatcher
        .select_from(dispatcher.store().root(), ".*")
        .from("/m")
        .iter()
        .unwrap()
        .map(|r| r.id)
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    let b = dispatcher
        .select_from(dispatcher.store().root(), ".*")
        .from("/m")
        .iter()
        .unwrap()
        .find(|r| r.id == 2)
        .unwrap();
    assert_eq!(b.path, "/m/b");
}

/// §4.F query field `type_filter`: only rows of the named type survive
/// composition.
#[test]
fn select_type_filter_excludes_non_matching_rows() {
    let dispatcher = root_dispatcher();
    let bool_row = QueryResult {
        id: 9,
        path: "flag".to_string(),
        ty: Arc::new(Type::primitive("bool", Primitive::Bool)),
        value: Some(metamodel::Value::Bool(true)),
    };
    let mount = Arc::new(FixedMount {
        rows: vec![row(1, "a"), bool_row],
        ownership: Ownership::LocalSource,
    });
    dispatcher.register_mount("/m", mount).unwrap();

    let rows: Vec<_> = dispatcher
        .select_from(dispatcher.store().root(), ".*")
        .from("/m")
        .type_filter("bool")
        .iter()
        .unwrap()
        .collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 9);
}

/// §4.F: `publish` against an id that doesn't resolve locally hands the
/// event straight to subscribers on the scope rather than erroring or
/// fabricating an object.
#[test]
fn publish_to_unresolved_id_notifies_scope_without_materializing() {
    let dispatcher = root_dispatcher();
    let root = dispatcher.store().root();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let _subscription = dispatcher
        .select_from(root.clone(), ".*")
        .subscribe(
            Event::UPDATE,
            Arc::new(move |n| seen_clone.lock().unwrap().push(n.event)),
        )
        .unwrap();

    dispatcher
        .publish(Event::UPDATE, "does/not/exist", "application/json", b"1")
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![Event::UPDATE]);
    assert!(dispatcher.store().lookup(&root, "does/not/exist").is_err());
}

/// Grounds the dispatcher-level `declare`/`define` wiring this session
/// added: a subscriber on the parent scope sees one `DECLARE` and one
/// `DEFINE`, not a duplicate for the already-declared idempotent path.
#[test]
fn declare_then_define_notifies_exactly_once_each() {
    let dispatcher = root_dispatcher();
    let root = dispatcher.store().root();

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    let _subscription = dispatcher
        .select_from(root.clone(), ".*")
        .subscribe(
            Event::DECLARE | Event::DEFINE,
            Arc::new(move |n| events_clone.lock().unwrap().push(n.event)),
        )
        .unwrap();

    let child = dispatcher.declare(&root, Some("x".to_string()), leaf_type()).unwrap();
    // Idempotent re-declare of the same name/type: no extra notification.
    dispatcher.declare(&root, Some("x".to_string()), leaf_type()).unwrap();
    dispatcher.define(&child).unwrap();
    // Idempotent re-define of an already-valid object: no extra notification.
    dispatcher.define(&child).unwrap();

    assert_eq!(*events.lock().unwrap(), vec![Event::DECLARE, Event::DEFINE]);
}
