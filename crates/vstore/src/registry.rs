use crate::error::{Error, Result};
use crate::mount::Mount;
use crate::pathutil;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use store::Path;

struct Registration {
    id: u64,
    order: u64,
    from: Path,
    mount: Arc<dyn Mount>,
}

/// The set of registered mounts (§4.F). Ordering for routing ties is
/// SPEC_FULL.md's Open Question Decision: by declaration order, stable for
/// the process's lifetime but not across de-registration/re-registration.
pub struct Registry {
    mounts: RwLock<Vec<Registration>>,
    next_order: AtomicU64,
}

impl Registry {
    pub fn new() -> Registry {
        Registry {
            mounts: RwLock::new(Vec::new()),
            next_order: AtomicU64::new(1),
        }
    }

    pub fn register(&self, from: &str, mount: Arc<dyn Mount>) -> Result<u64> {
        let from = Path::parse(from)?;
        let order = self.next_order.fetch_add(1, Ordering::Relaxed);
        let id = order;
        self.mounts.write().expect("mount registry lock poisoned").push(Registration {
            id,
            order,
            from,
            mount,
        });
        tracing::debug!(mount = id, "registered mount");
        Ok(id)
    }

    pub fn unregister(&self, id: u64) {
        self.mounts
            .write()
            .expect("mount registry lock poisoned")
            .retain(|r| r.id != id);
    }

    pub fn get(&self, id: u64) -> Result<Arc<dyn Mount>> {
        self.mounts
            .read()
            .expect("mount registry lock poisoned")
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.mount.clone())
            .ok_or_else(|| Error::NoMount(id.to_string()))
    }

    /// Mounts whose `from` overlaps `scope`, most specific first, ties
    /// broken by registration order (§4.F step 2).
    pub fn overlapping(&self, scope: &Path) -> Vec<(u64, Path, Arc<dyn Mount>)> {
        let mut matches: Vec<(u64, u64, Path, Arc<dyn Mount>)> = self
            .mounts
            .read()
            .expect("mount registry lock poisoned")
            .iter()
            .filter(|r| pathutil::overlaps(&r.from, scope))
            .map(|r| (r.id, r.order, r.from.clone(), r.mount.clone()))
            .collect();

        matches.sort_by(|a, b| {
            b.2.components
                .len()
                .cmp(&a.2.components.len())
                .then(a.1.cmp(&b.1))
        });

        matches.into_iter().map(|(id, _order, from, mount)| (id, from, mount)).collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}
