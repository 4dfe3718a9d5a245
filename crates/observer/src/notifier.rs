use crate::dispatcher::Dispatcher;
use crate::flags::{Event, Scope};
use crate::subscription::{Callback, Notification, Observer};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Owns every object's observer list, keyed by the watched object's id.
/// `store::Object` itself carries no notifier hooks — `Notifier` is a
/// side table a `vstore`/`runtime`-level caller consults after a `store`
/// operation succeeds, keeping `store` ignorant of observation the way
/// `gazette`'s journal store is ignorant of its own subscribers (§4.E is
/// grounded on `gazette/src/journal/list/subscriber.rs`'s snapshot-then-
/// deliver-without-lock shape).
#[derive(Default)]
pub struct Notifier {
    tables: RwLock<HashMap<u64, Vec<Arc<Observer>>>>,
}

impl Notifier {
    pub fn new() -> Notifier {
        Notifier::default()
    }

    /// Registers a new observer on `instance`'s table.
    pub fn listen(
        &self,
        instance: u64,
        events: Event,
        scope: Scope,
        dispatcher: Option<Arc<dyn Dispatcher>>,
        callback: Callback,
    ) -> Arc<Observer> {
        let observer = Observer::new(instance, events, scope, dispatcher, callback);
        self.tables
            .write()
            .expect("observer table lock poisoned")
            .entry(instance)
            .or_default()
            .push(observer.clone());
        observer
    }

    /// Removes the `(observer, instance)` pair. Marks the observer deleted
    /// first, so a copy already snapshotted by an in-flight `notify` still
    /// sees the liveness check fail before its callback runs (§4.E).
    pub fn silence(&self, instance: u64, observer: &Arc<Observer>) {
        observer.mark_deleted();
        if let Some(list) = self.tables.write().expect("observer table lock poisoned").get_mut(&instance) {
            list.retain(|o| o.id != observer.id);
        }
    }

    /// Notifies every observer matching `event` along `path` (root-to-
    /// object id chain, the changed object last): the object's own table
    /// for `ON_SELF`, its parent's for `ON_SCOPE`, and every remaining
    /// ancestor's for `ON_TREE` (§4.E).
    pub fn notify(&self, path: &[u64], event: Event, originator: u64) {
        let Some((&object_id, ancestors)) = path.split_last() else {
            return;
        };
        self.notify_table(object_id, Scope::ON_SELF, object_id, event, originator);

        if let Some((&parent_id, rest)) = ancestors.split_last() {
            self.notify_table(parent_id, Scope::ON_SCOPE, object_id, event, originator);
            for &ancestor_id in rest {
                self.notify_table(ancestor_id, Scope::ON_TREE, object_id, event, originator);
            }
        }
    }

    fn notify_table(&self, table_owner: u64, scope: Scope, object_id: u64, event: Event, originator: u64) {
        let observers = {
            let tables = self.tables.read().expect("observer table lock poisoned");
            tables.get(&table_owner).cloned().unwrap_or_default()
        };
        for observer in observers {
            if observer.is_deleted() {
                continue;
            }
            if observer.instance == originator {
                continue;
            }
            if !observer.events.overlaps(event) || !observer.scope.overlaps(scope) {
                continue;
            }
            observer.deliver(Notification {
                event,
                object_id,
                originator,
            });
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn matching_observer_is_notified() {
        let notifier = Notifier::new();
        let seen: Arc<Mutex<Vec<Notification>>> = Arc::new(Mutex::new(Vec::new()));
        let seen2 = seen.clone();
        notifier.listen(
            1,
            Event::DEFINE,
            Scope::ON_SELF,
            None,
            Arc::new(move |n| seen2.lock().unwrap().push(n)),
        );
        notifier.notify(&[0, 1], Event::DEFINE, 99);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn event_mask_mismatch_is_not_delivered() {
        let notifier = Notifier::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        notifier.listen(
            1,
            Event::DELETE,
            Scope::ON_SELF,
            None,
            Arc::new(move |_| {
                count2.fetch_add(1, Ordering::SeqCst);
            }),
        );
        notifier.notify(&[0, 1], Event::DEFINE, 99);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn self_notification_is_suppressed() {
        let notifier = Notifier::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        notifier.listen(
            1,
            Event::UPDATE,
            Scope::ON_SELF,
            None,
            Arc::new(move |_| {
                count2.fetch_add(1, Ordering::SeqCst);
            }),
        );
        notifier.notify(&[0, 1], Event::UPDATE, 1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn silence_stops_future_delivery() {
        let notifier = Notifier::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        let observer = notifier.listen(
            1,
            Event::UPDATE,
            Scope::ON_SELF,
            None,
            Arc::new(move |_| {
                count2.fetch_add(1, Ordering::SeqCst);
            }),
        );
        notifier.silence(1, &observer);
        notifier.notify(&[0, 1], Event::UPDATE, 99);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn on_tree_observer_sees_descendant_events() {
        let notifier = Notifier::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        notifier.listen(
            0,
            Event::UPDATE,
            Scope::ON_TREE,
            None,
            Arc::new(move |_| {
                count2.fetch_add(1, Ordering::SeqCst);
            }),
        );
        notifier.notify(&[0, 1, 2], Event::UPDATE, 99);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
