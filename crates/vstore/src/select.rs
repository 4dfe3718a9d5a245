use crate::dispatcher::{Dispatcher, Subscription};
use crate::error::Result;
use crate::query::{HistoryWindow, Query, TimeBound};
use crate::result::QueryResult;
use crate::routing;
use chrono::Duration;
use std::sync::Arc;
use store::Object;

/// The fluent query builder §4.F describes, terminating in `iter`,
/// `iter_objects`, `resume`, `count`, or `subscribe`. Method names
/// (`instance`, `mount`, `fromNow`/`from_now`, …) follow the original
/// source's `include/vstore/vstore.h` (SPEC_FULL.md supplement #3).
pub struct Select<'d> {
    dispatcher: &'d Dispatcher,
    scope: Arc<Object>,
    query: Query,
}

impl<'d> Select<'d> {
    /// `select(expr)` (§6): `expr` is the glob/regex-like pattern matched
    /// against each candidate result's child id (`Query::expr`), not the
    /// scope it runs from — chain `.from(scope)` to set that.
    pub(crate) fn new(dispatcher: &'d Dispatcher, scope: Arc<Object>, expr: impl Into<String>) -> Select<'d> {
        Select {
            dispatcher,
            scope,
            query: Query {
                expr: Some(expr.into()),
                ..Query::default()
            },
        }
    }

    /// Scope the pattern is relative to (`Query::from`), e.g. `/a/b`.
    pub fn from(mut self, scope: impl Into<String>) -> Self {
        self.query.from = scope.into();
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.query.content_type = Some(content_type.into());
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.query.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn type_filter(mut self, ty: impl Into<String>) -> Self {
        self.query.type_filter = Some(ty.into());
        self
    }

    pub fn instanceof(mut self, ty: impl Into<String>) -> Self {
        self.query.instanceof_filter = Some(ty.into());
        self
    }

    /// `instance(id)` restrictor: exclude a specific instance from results
    /// (used from inside a mount's own `on_query` so it doesn't recurse into
    /// itself).
    pub fn exclude_instance(mut self, id: u64) -> Self {
        self.query.exclude_instance = Some(id);
        self
    }

    /// `mount(id)` restrictor: route only to the named mount.
    pub fn only_mount(mut self, id: u64) -> Self {
        self.query.only_mount = Some(id);
        self
    }

    pub fn from_now(mut self) -> Self {
        self.history_mut().from = Some(TimeBound::Now);
        self
    }

    pub fn from_time(mut self, at: chrono::DateTime<chrono::Utc>) -> Self {
        self.history_mut().from = Some(TimeBound::At(at));
        self
    }

    pub fn to_now(mut self) -> Self {
        self.history_mut().to = Some(TimeBound::Now);
        self
    }

    pub fn to_time(mut self, at: chrono::DateTime<chrono::Utc>) -> Self {
        self.history_mut().to = Some(TimeBound::At(at));
        self
    }

    pub fn for_duration(mut self, duration: Duration) -> Self {
        self.history_mut().for_duration = Some(duration);
        self
    }

    pub fn slimit(mut self, n: usize) -> Self {
        self.history_mut().slimit = Some(n);
        self
    }

    pub fn soffset(mut self, n: usize) -> Self {
        self.history_mut().soffset = Some(n);
        self
    }

    pub fn yield_unknown(mut self, yield_unknown: bool) -> Self {
        self.query.yield_unknown = yield_unknown;
        self
    }

    fn history_mut(&mut self) -> &mut HistoryWindow {
        &mut self.query.history
    }

    /// Lazy result iterator (§4.F): the composed rows, already offset/
    /// limited/filtered.
    pub fn iter(self) -> Result<impl Iterator<Item = QueryResult>> {
        let rows = routing::route(&self.scope, &self.dispatcher.mounts, &self.query)?;
        Ok(rows.into_iter())
    }

    /// Lazy anonymous objects: each row wrapped in a freshly-constructed,
    /// un-scoped `Object` (§4.F) rather than a bare `QueryResult`.
    pub fn iter_objects(self) -> Result<impl Iterator<Item = Arc<Object>>> {
        let rows = routing::route(&self.scope, &self.dispatcher.mounts, &self.query)?;
        Ok(rows.into_iter().map(|r| {
            let payload = r.value.unwrap_or_else(|| r.ty.default_value());
            Object::new(r.id, None, r.ty, None, payload)
        }))
    }

    /// Materialises every matching row into the in-memory store at its
    /// resolved absolute path, declaring and defining each one, and returns
    /// how many were materialised. The row's parent scope must already
    /// exist locally — `resume` fills in leaves under a scope the caller
    /// already declared, the same assumption `Store::declare` itself makes
    /// about its `parent` argument; it does not fabricate intermediate
    /// scope objects with a guessed type.
    pub fn resume(self) -> Result<usize> {
        let rows = routing::route(&self.scope, &self.dispatcher.mounts, &self.query)?;
        let mut count = 0;
        for row in rows {
            let path = store::Path::parse(&row.path)?;
            let Some((last, ancestors)) = path.components.as_slice().split_last() else {
                continue;
            };
            let mut parent = self.dispatcher.store.root();
            for component in ancestors {
                parent = self.dispatcher.store.lookup(&parent, component)?;
            }
            let object = self.dispatcher.store.declare(&parent, Some(last.clone()), row.ty.clone())?;
            if let Some(value) = row.value {
                object.with_payload_mut(|v| *v = value);
            }
            self.dispatcher.store.define(&object)?;
            count += 1;
        }
        Ok(count)
    }

    pub fn count(self) -> Result<usize> {
        Ok(self.iter()?.count())
    }

    pub fn subscribe(self, events: observer::Event, on_event: observer::Callback) -> Result<Subscription> {
        self.dispatcher.subscribe(self.scope, self.query, events, on_event)
    }
}
