//! §8 scenarios 3 and 6: a subscriber registered ahead of the object it
//! watches, and a subscriber disabled at creation time that replays events
//! it missed once re-enabled.

use metamodel::{Primitive, Type, Value};
use observer::Event;
use std::sync::{Arc, Mutex};
use store::Store;
use vstore::Dispatcher;

fn leaf_type() -> Arc<Type> {
    Arc::new(Type::primitive("int32", Primitive::Int32))
}

fn root_dispatcher() -> Dispatcher {
    let store = Arc::new(Store::new(Arc::new(Type::void())));
    Dispatcher::new(store)
}

/// §8 scenario 3: `subscribe("a", from="/")` before `declare(/, "a",
/// int32)` — the subscriber receives exactly one `DEFINE` once the
/// declare+define sequence runs, not a synthetic one from alignment (there
/// is nothing to align against yet: no mounts, no existing object).
#[test]
fn subscribe_before_declare_receives_single_define() {
    let dispatcher = root_dispatcher();
    let root = dispatcher.store().root();

    let defines = Arc::new(Mutex::new(0));
    let defines_clone = defines.clone();
    let _subscription = dispatcher
        .select_from(root.clone(), "a")
        .subscribe(Event::DEFINE, Arc::new(move |n| {
            if n.event.contains(Event::DEFINE) {
                *defines_clone.lock().unwrap() += 1;
            }
        }))
        .unwrap();
    assert_eq!(*defines.lock().unwrap(), 0);

    let a = dispatcher.declare(&root, Some("a".to_string()), leaf_type()).unwrap();
    dispatcher.define(&a).unwrap();

    assert_eq!(*defines.lock().unwrap(), 1);
}

/// §8 scenario 6: a subscriber created disabled, three updates published
/// while it's disabled, then enabled — exactly the three events are
/// observed, in publication order, once enabled.
#[test]
fn disabled_subscriber_replays_missed_updates_on_enable() {
    let dispatcher = root_dispatcher();
    let root = dispatcher.store().root();
    let x = dispatcher.declare(&root, Some("x".to_string()), leaf_type()).unwrap();
    dispatcher.define(&x).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let subscription = dispatcher
        .select_from(root.clone(), "x")
        .subscribe(Event::UPDATE, Arc::new(move |n| seen_clone.lock().unwrap().push(n.object_id)))
        .unwrap();
    subscription.set_enabled(false);

    dispatcher.update(&x, |v| *v = Value::Int(1)).unwrap();
    dispatcher.update(&x, |v| *v = Value::Int(2)).unwrap();
    dispatcher.update(&x, |v| *v = Value::Int(3)).unwrap();
    assert!(seen.lock().unwrap().is_empty());

    subscription.set_enabled(true);
    assert_eq!(*seen.lock().unwrap(), vec![x.id, x.id, x.id]);
}
