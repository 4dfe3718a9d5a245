use crate::error::{Error, Result};
use crate::mount::Ownership;
use crate::pathutil::{self, object_path};
use crate::registry::Registry;
use observer::{Event, Notifier};
use std::sync::Arc;
use store::{Object, Path, Store};

/// `publish(event, id, type, contentType, value)` (§4.F): synthesises a
/// notification without necessarily materialising an object. If `id`
/// resolves to a stored object, ownership resolution (§4.F) decides what a
/// write does: rejected, applied locally, or forwarded to the owning
/// mount. If `id` doesn't resolve, the event is handed directly to
/// whatever subscribers are listening on `scope` (the dispatcher doesn't
/// fabricate an object just to notify about one that doesn't exist
/// locally).
pub fn publish(
    store: &Store,
    codecs: &codec::Registry,
    notifier: &Notifier,
    mounts: &Registry,
    scope: &Arc<Object>,
    event: Event,
    id: &str,
    content_type: &str,
    value: &[u8],
) -> Result<()> {
    match store.lookup(scope, id) {
        Ok(object) => {
            let absolute = object_path(&object);
            let owner = mounts.overlapping(&absolute).into_iter().next();

            if let Some((mount_id, mount_from, mount)) = owner {
                match mount.policy().ownership {
                    Ownership::RemoteSource => {
                        return Err(Error::OwnershipRejected {
                            id: object.id,
                            ownership: Ownership::RemoteSource,
                        });
                    }
                    Ownership::CacheOwner => {
                        let relative = pathutil::relative_after(&absolute, &mount_from).unwrap_or(Path {
                            absolute: false,
                            components: Default::default(),
                        });
                        mount
                            .on_write(&pathutil::to_string(&relative), content_type, value)
                            .map_err(|source| Error::Mount { mount: mount_id, source })?;
                        notifier.notify(&ancestor_chain(&object), event, observer::current_originator());
                        tracing::debug!(id = object.id, mount = mount_id, "forwarded write to cache owner");
                        return Ok(());
                    }
                    Ownership::LocalSource => {}
                }
            }

            let codec = codecs.get(content_type)?;
            let decoded = codec.to_value(value, &object.ty)?;
            let guard = store.update_begin(&object);
            object.with_payload_mut(|v| *v = decoded);
            store.update_end(&object, guard)?;

            notifier.notify(&ancestor_chain(&object), event, observer::current_originator());
            tracing::debug!(id = object.id, ?event, "published update");
            Ok(())
        }
        Err(store::Error::NotFound { .. }) => {
            notifier.notify(&[scope.id], event, observer::current_originator());
            tracing::debug!(scope = scope.id, id, ?event, "published to unresolved id");
            Ok(())
        }
        Err(other) => Err(other.into()),
    }
}

pub(crate) fn ancestor_chain(object: &Arc<Object>) -> Vec<u64> {
    let mut ids = vec![object.id];
    let mut cur = object.clone();
    while let Some(parent) = cur.parent() {
        ids.push(parent.id);
        cur = parent;
    }
    ids.reverse();
    ids
}
