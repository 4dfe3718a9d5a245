use crate::dispatcher::Dispatcher;
use crate::flags::{Event, Scope};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// The event delivered to a matching observer's callback.
#[derive(Clone, Copy, Debug)]
pub struct Notification {
    pub event: Event,
    pub object_id: u64,
    pub originator: u64,
}

pub type Callback = Arc<dyn Fn(Notification) + Send + Sync>;

/// One (observer, instance) registration (§3's `Subscription` tuple,
/// specialized to the plain callback case `vstore`'s query subscriptions
/// build on). `id` is stable for the registration's lifetime so `silence`
/// can address it without relying on pointer identity.
pub struct Observer {
    pub id: u64,
    pub instance: u64,
    pub events: Event,
    pub scope: Scope,
    dispatcher: RwLock<Option<Arc<dyn Dispatcher>>>,
    callback: Callback,
    enabled: AtomicBool,
    /// Checked by a dispatcher before running an already-enqueued job, so an
    /// observer silenced after an event was queued but before it ran is a
    /// no-op rather than a use-after-silence callback (§4.E: "in-flight
    /// events still in a dispatcher queue carry a liveness check").
    deleted: AtomicBool,
    /// Notifications that arrived while `enabled` was false (§2's
    /// subscription lifecycle: "created → (optionally disabled) →
    /// subscribed"), replayed in arrival order the moment the subscriber is
    /// re-enabled rather than dropped.
    pending: Mutex<Vec<Notification>>,
}

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

impl Observer {
    pub fn new(
        instance: u64,
        events: Event,
        scope: Scope,
        dispatcher: Option<Arc<dyn Dispatcher>>,
        callback: Callback,
    ) -> Arc<Observer> {
        Arc::new(Observer {
            id: NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed),
            instance,
            events,
            scope,
            dispatcher: RwLock::new(dispatcher),
            callback,
            enabled: AtomicBool::new(true),
            deleted: AtomicBool::new(false),
            pending: Mutex::new(Vec::new()),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Toggles delivery. Transitioning `false -> true` replays, in arrival
    /// order, every notification that was held while disabled (§8 scenario
    /// 6: "publish three updates; enable subscriber; exactly the three
    /// events are observed in publication order").
    pub fn set_enabled(self: &Arc<Self>, enabled: bool) {
        let was_disabled = !self.is_enabled();
        self.enabled.store(enabled, Ordering::Release);
        if enabled && was_disabled {
            let queued = std::mem::take(&mut *self.pending.lock().expect("observer pending queue lock poisoned"));
            for notification in queued {
                self.dispatch(notification);
            }
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::Acquire)
    }

    pub(crate) fn mark_deleted(&self) {
        self.deleted.store(true, Ordering::Release);
    }

    /// `setDispatcher` (§4.E supplement): installs or clears this
    /// observer's dispatcher after construction.
    pub fn set_dispatcher(&self, dispatcher: Option<Arc<dyn Dispatcher>>) {
        *self.dispatcher.write().expect("observer dispatcher lock poisoned") = dispatcher;
    }

    /// Delivers `notification` — held in `pending` while the subscriber is
    /// disabled, otherwise dispatched immediately.
    pub(crate) fn deliver(self: &Arc<Self>, notification: Notification) {
        if !self.is_enabled() {
            self.pending.lock().expect("observer pending queue lock poisoned").push(notification);
            return;
        }
        self.dispatch(notification);
    }

    /// Enqueues through the dispatcher if one is set, otherwise runs
    /// synchronously on the calling thread.
    fn dispatch(self: &Arc<Self>, notification: Notification) {
        let dispatcher = self.dispatcher.read().expect("observer dispatcher lock poisoned").clone();
        let this = self.clone();
        let job = move || {
            if this.is_deleted() {
                return;
            }
            (this.callback)(notification);
        };
        match dispatcher {
            Some(d) => d.enqueue(Box::new(job)),
            None => job(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::flags::{Event, Scope};
    use std::sync::Mutex as StdMutex;

    fn note(id: u64) -> Notification {
        Notification {
            event: Event::UPDATE,
            object_id: id,
            originator: 0,
        }
    }

    #[test]
    fn notifications_while_disabled_are_replayed_in_order_on_enable() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen2 = seen.clone();
        let observer = Observer::new(
            1,
            Event::UPDATE,
            Scope::ON_SELF,
            None,
            Arc::new(move |n| seen2.lock().unwrap().push(n.object_id)),
        );
        observer.set_enabled(false);
        observer.deliver(note(1));
        observer.deliver(note(2));
        observer.deliver(note(3));
        assert!(seen.lock().unwrap().is_empty());
        observer.set_enabled(true);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn deliver_while_enabled_runs_immediately() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen2 = seen.clone();
        let observer = Observer::new(
            1,
            Event::UPDATE,
            Scope::ON_SELF,
            None,
            Arc::new(move |n| seen2.lock().unwrap().push(n.object_id)),
        );
        observer.deliver(note(1));
        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }
}
