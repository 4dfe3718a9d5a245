use crate::align::AlignGuard;
use crate::error::Result;
use crate::mount::Mount;
use crate::publish::{self, ancestor_chain};
use crate::query::Query;
use crate::registry::Registry;
use crate::routing;
use crate::select::Select;
use observer::{Callback, Event, Notifier, Observer, Scope};
use metamodel::Type;
use std::sync::Arc;
use store::{Object, Store};

/// A live `subscribe` registration, returned so the caller can later
/// `unsubscribe` (§4.F/§5: "subscribers are cancelled by `unsubscribe` or by
/// deletion of the subscriber object").
pub struct Subscription {
    observer: Arc<Observer>,
    scope_id: u64,
}

impl Subscription {
    pub fn observer_id(&self) -> u64 {
        self.observer.id
    }

    /// Disables or re-enables delivery (§2's lifecycle: "created →
    /// (optionally disabled) → subscribed"). Events that land while
    /// disabled are replayed, in arrival order, the moment the subscriber
    /// is re-enabled (§8 scenario 6).
    pub fn set_enabled(&self, enabled: bool) {
        self.observer.set_enabled(enabled);
    }
}

/// The virtual store dispatcher (§4.F, component F): owns the mount
/// registry and ties `store`, `codec`, and `observer` together behind the
/// fluent `select`/`publish`/`subscribe` surface.
pub struct Dispatcher {
    pub(crate) store: Arc<Store>,
    pub(crate) mounts: Registry,
    codecs: codec::Registry,
    notifier: Notifier,
}

impl Dispatcher {
    pub fn new(store: Arc<Store>) -> Dispatcher {
        Dispatcher {
            store,
            mounts: Registry::new(),
            codecs: codec::Registry::new(),
            notifier: Notifier::new(),
        }
    }

    /// The object tree this dispatcher routes against, for callers (tests,
    /// an embedder wiring up its own root scope) that need it without going
    /// through a `select`.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn register_mount(&self, from: &str, mount: Arc<dyn Mount>) -> Result<u64> {
        self.mounts.register(from, mount)
    }

    pub fn unregister_mount(&self, id: u64) {
        self.mounts.unregister(id);
    }

    pub fn register_codec(&mut self, codec: Arc<dyn codec::ContentCodec>) {
        self.codecs.register(codec);
    }

    /// Starts a fluent query rooted at the store's current scope, matching
    /// `expr` against each candidate's child id (§4.F `Query::expr`).
    pub fn select(&self, expr: impl Into<String>) -> Select<'_> {
        Select::new(self, self.store.current_scope(), expr)
    }

    /// Starts a fluent query rooted at an explicit scope, for callers (like
    /// a mount's own `on_query`) that already hold the object they're
    /// scoping to.
    pub fn select_from(&self, scope: Arc<Object>, expr: impl Into<String>) -> Select<'_> {
        Select::new(self, scope, expr)
    }

    /// Declares a child of `parent` and notifies `DECLARE` to anything
    /// listening on the parent's scope, mirroring the way `publish` already
    /// notifies for objects that already exist (§4.B/§4.E: state
    /// transitions are expected to reach the observer table). A no-op
    /// notification-wise on the idempotent "already declared" path, since
    /// nothing actually changed.
    pub fn declare(&self, parent: &Arc<Object>, name: Option<String>, ty: Arc<Type>) -> Result<Arc<Object>> {
        let already_existed = match &name {
            Some(n) => self.store.lookup(parent, n).is_ok(),
            None => false,
        };
        let object = self.store.declare(parent, name, ty)?;
        if !already_existed {
            self.notifier
                .notify(&ancestor_chain(&object), Event::DECLARE, observer::current_originator());
        }
        Ok(object)
    }

    /// Defines `object` and notifies `DEFINE`. A no-op notification-wise if
    /// the object was already `Valid` (`Store::define` is itself idempotent
    /// there).
    pub fn define(&self, object: &Arc<Object>) -> Result<()> {
        let was_valid = object.state() == store::State::Valid;
        self.store.define(object)?;
        if !was_valid {
            self.notifier
                .notify(&ancestor_chain(object), Event::DEFINE, observer::current_originator());
        }
        Ok(())
    }

    /// Applies `mutate` to `object`'s payload under `update_begin`/
    /// `update_end` and notifies `UPDATE`, the in-process equivalent of
    /// `publish` for callers that already hold the object (skips the
    /// id-lookup and ownership-resolution `publish` does for writes coming
    /// in as raw bytes from outside).
    pub fn update(&self, object: &Arc<Object>, mutate: impl FnOnce(&mut metamodel::Value)) -> Result<()> {
        let guard = self.store.update_begin(object);
        object.with_payload_mut(mutate);
        self.store.update_end(object, guard)?;
        self.notifier
            .notify(&ancestor_chain(object), Event::UPDATE, observer::current_originator());
        Ok(())
    }

    pub fn publish(&self, event: Event, id: &str, content_type: &str, value: &[u8]) -> Result<()> {
        let scope = self.store.current_scope();
        publish::publish(
            &self.store,
            &self.codecs,
            &self.notifier,
            &self.mounts,
            &scope,
            event,
            id,
            content_type,
            value,
        )
    }

    pub(crate) fn subscribe(
        &self,
        scope: Arc<Object>,
        query: Query,
        events: Event,
        on_event: Callback,
    ) -> Result<Subscription> {
        let align = Arc::new(AlignGuard::new());
        align.begin_align();

        let align_for_wrapper = align.clone();
        let inner = on_event.clone();
        let wrapped: Callback = Arc::new(move |notification| {
            if let Some(notification) = align_for_wrapper.hold_or_pass(notification) {
                (inner)(notification);
            }
        });

        let observer = self.notifier.listen(
            scope.id,
            events,
            Scope::ON_SELF | Scope::ON_SCOPE | Scope::ON_TREE,
            None,
            wrapped,
        );

        let initial = routing::route(&scope, &self.mounts, &query)?;
        for row in initial {
            on_event(observer::Notification {
                event: Event::DEFINE,
                object_id: row.id,
                originator: scope.id,
            });
        }

        for queued in align.end_align() {
            on_event(queued);
        }

        tracing::debug!(scope = scope.id, observer = observer.id, "subscription aligned");
        Ok(Subscription {
            observer,
            scope_id: scope.id,
        })
    }

    pub fn unsubscribe(&self, subscription: Subscription) {
        self.notifier.silence(subscription.scope_id, &subscription.observer);
    }
}
