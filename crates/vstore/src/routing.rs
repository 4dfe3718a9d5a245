use crate::error::{Error, Result};
use crate::pathutil;
use crate::query::Query;
use crate::registry::Registry;
use crate::result::{is_instance_of, QueryResult};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::Arc;
use store::{Object, Path};

/// Runs §4.F's routing algorithm against the current mount set, returning a
/// single composed, de-duplicated, filtered result list.
///
/// This crate materialises every mount's results eagerly rather than
/// threading a lazy generator through `Mount::on_query` (a blocking,
/// object-safe trait method has no natural `yield` point without pulling in
/// an async-stream dependency the rest of this crate doesn't need) — `iter`/
/// `iter_objects` consume this same materialised `Vec`, so "lazy" describes
/// the query language, not this implementation's internals.
pub fn route(scope: &Arc<Object>, mounts: &Registry, query: &Query) -> Result<Vec<QueryResult>> {
    if query.yield_unknown && query.history.is_historical() {
        return Err(Error::InvalidArgument(
            "yield_unknown applies only to live queries, not history windows",
        ));
    }

    let from = Path::parse(&query.from)?;
    let absolute_scope = pathutil::join(&pathutil::object_path(scope), &from);

    let expr = query
        .expr
        .as_deref()
        .map(Regex::new)
        .transpose()?;

    let mut composed: IndexMap<u64, QueryResult> = IndexMap::new();

    for (mount_id, mount_from, mount) in mounts.overlapping(&absolute_scope) {
        if let Some(only) = query.only_mount {
            if only != mount_id {
                continue;
            }
        }

        let Some(mount_relative) = pathutil::relative_after(&absolute_scope, &mount_from)
            .or_else(|| pathutil::relative_after(&mount_from, &absolute_scope).map(|_| Path {
                absolute: false,
                components: Default::default(),
            }))
        else {
            continue;
        };

        let mut mount_query = query.clone();
        mount_query.from = pathutil::to_string(&mount_relative);

        let results = mount
            .on_query(&mount_query)
            .map_err(|source| Error::Mount { mount: mount_id, source })?;

        for mut result in results {
            if let Some(exclude) = query.exclude_instance {
                if result.id == exclude {
                    continue;
                }
            }
            let absolute = pathutil::join(&mount_from, &Path::parse(&result.path)?);
            result.path = pathutil::to_string(&absolute);

            let leaf = result.path.rsplit('/').next().unwrap_or(&result.path);
            if let Some(re) = &expr {
                if !re.is_match(leaf) {
                    continue;
                }
            }
            if let Some(type_name) = &query.type_filter {
                if &result.ty.name != type_name {
                    continue;
                }
            }
            if let Some(base_name) = &query.instanceof_filter {
                if !is_instance_of(&result.ty, base_name) {
                    continue;
                }
            }

            match composed.get(&result.id) {
                None => {
                    composed.insert(result.id, result);
                }
                Some(existing) if query.yield_unknown && existing.is_unknown() && !result.is_unknown() => {
                    composed.insert(result.id, result);
                }
                Some(_) => {}
            }
        }
    }

    let mut out: Vec<QueryResult> = composed.into_iter().map(|(_, v)| v).collect();
    if query.offset > 0 {
        out = out.into_iter().skip(query.offset).collect();
    }
    if let Some(limit) = query.limit {
        out.truncate(limit);
    }
    Ok(out)
}
