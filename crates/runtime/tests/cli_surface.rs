//! Exercises the exposed CLI surface (§6) end to end: `start`, `random_id`,
//! a mount registered directly on the dispatcher, then `select`/`publish`
//! through the top-level `runtime` functions rather than reaching into
//! `store`/`vstore` directly.

use metamodel::{Primitive, Type, Value};
use std::sync::Arc;
use vstore::{Mount, MountPolicy, MountSink, Ownership, Query, QueryResult};

struct StaticMount {
    id: u64,
    name: &'static str,
}

impl Mount for StaticMount {
    fn policy(&self) -> MountPolicy {
        MountPolicy {
            ownership: Ownership::LocalSource,
        }
    }

    fn on_query(&self, _query: &Query) -> anyhow::Result<Vec<QueryResult>> {
        Ok(vec![QueryResult {
            id: self.id,
            path: self.name.to_string(),
            ty: Arc::new(Type::primitive("string", Primitive::String)),
            value: Some(Value::String(self.name.to_string())),
        }])
    }

    fn on_subscribe(&self, _query: &Query, _sink: MountSink) -> anyhow::Result<u64> {
        Ok(0)
    }
}

#[test]
fn random_id_is_stable_length_across_calls() {
    assert_eq!(runtime::start("cli-surface-test"), 0);
    for n in [0, 1, 8, 32] {
        assert_eq!(runtime::random_id(n).len(), n);
    }
}

#[test]
fn select_routes_through_a_registered_mount() {
    assert_eq!(runtime::start("cli-surface-test"), 0);
    let scope = format!("/{}", runtime::random_id(10));
    let leaf = runtime::random_id(6);
    let mount = Arc::new(StaticMount { id: 424242, name: Box::leak(leaf.clone().into_boxed_str()) });
    runtime::current().dispatcher().register_mount(&scope, mount).unwrap();

    let rows: Vec<_> = runtime::select(".*").from(scope.as_str()).iter().unwrap().collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 424242);
    assert_eq!(rows[0].path, format!("{scope}/{leaf}"));
}

#[test]
fn publish_to_unresolved_id_succeeds_without_a_stored_object() {
    assert_eq!(runtime::start("cli-surface-test"), 0);
    let id = format!("{}/{}", runtime::random_id(8), runtime::random_id(8));
    runtime::publish(observer::Event::UPDATE, &id, "application/json", b"1").unwrap();
}
