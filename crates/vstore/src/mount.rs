use crate::query::Query;
use crate::result::QueryResult;
use std::sync::Arc;

/// `mountPolicy.ownership` (§4.F): who wins when a write lands on an object
/// a mount replicates.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Ownership {
    /// The mount is authoritative; local writes are rejected.
    RemoteSource,
    /// This process is authoritative; writes are accepted locally.
    LocalSource,
    /// This process caches a remote's data; writes are forwarded upstream.
    CacheOwner,
}

#[derive(Clone, Copy, Debug)]
pub struct MountPolicy {
    pub ownership: Ownership,
}

impl Default for MountPolicy {
    fn default() -> Self {
        MountPolicy {
            ownership: Ownership::LocalSource,
        }
    }
}

/// A callback a mount invokes to push a live event back through the
/// dispatcher while a `subscribe` registration is active (§4.F, §5: "mount
/// invocations may block arbitrarily; the dispatcher holds no locks across
/// them" — the mount drives this on its own thread, not inside a dispatcher
/// lock).
pub type MountSink = Arc<dyn Fn(QueryResult, observer::Event) + Send + Sync>;

/// An external collaborator the dispatcher routes queries and writes to
/// (§4.F). Object-safe so `Registry` can hold a homogeneous
/// `Vec<Arc<dyn Mount>>`, the same shape `automations::ObjSafe` gives
/// `Executor` implementations.
pub trait Mount: Send + Sync {
    fn policy(&self) -> MountPolicy {
        MountPolicy::default()
    }

    /// Answers a `select`, mount-relative (§4.F step 3: "translate
    /// identifiers to mount-relative, invoke `on_query`").
    fn on_query(&self, query: &Query) -> anyhow::Result<Vec<QueryResult>>;

    /// Answers a `resume`. Defaults to `on_query`'s result set, since
    /// resuming is "materialise matching objects" over the same selection
    /// `on_query` already computes; a mount with a cheaper bulk path may
    /// override this.
    fn on_resume(&self, query: &Query) -> anyhow::Result<Vec<QueryResult>> {
        self.on_query(query)
    }

    /// Registers interest in live events under `query`'s scope; `sink` is
    /// invoked by the mount (on whatever thread it chooses) for each
    /// matching event until `on_unsubscribe` is called with the same token.
    fn on_subscribe(&self, query: &Query, sink: MountSink) -> anyhow::Result<u64>;

    fn on_unsubscribe(&self, _token: u64) {}

    /// Forwards a write to a `CACHE_OWNER`-policy mount's remote source
    /// (§4.F ownership resolution). The default rejects, since a mount that
    /// doesn't implement forwarding shouldn't silently drop writes; a real
    /// `CacheOwner` mount overrides this.
    fn on_write(&self, _path: &str, _content_type: &str, _value: &[u8]) -> anyhow::Result<()> {
        anyhow::bail!("mount does not support forwarded writes")
    }
}
