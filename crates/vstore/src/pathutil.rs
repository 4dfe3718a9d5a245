use std::sync::Arc;
use store::{Object, Path};
use tinyvec::TinyVec;

/// The absolute path from the root down to `object`, reconstructed by
/// walking `parent()` pointers (`store::Object` carries no cached path of
/// its own — §4.C's scope table is the only source of truth for names).
pub fn object_path(object: &Arc<Object>) -> Path {
    let mut names = Vec::new();
    let mut cur = object.clone();
    loop {
        let Some(parent) = cur.parent() else { break };
        if let Some(name) = &cur.name {
            names.push(name.clone());
        }
        cur = parent;
    }
    names.reverse();
    let mut components = TinyVec::new();
    for name in names {
        components.push(name);
    }
    Path {
        absolute: true,
        components,
    }
}

/// Resolves `rel_or_abs` against `base` (an absolute path), the way
/// `Store::lookup` resolves a relative path against a scope.
pub fn join(base: &Path, rel_or_abs: &Path) -> Path {
    if rel_or_abs.absolute {
        return rel_or_abs.clone();
    }
    let mut components = base.components.clone();
    for c in rel_or_abs.components.as_slice() {
        components.push(c.clone());
    }
    Path {
        absolute: true,
        components,
    }
}

/// `Some(suffix)` if `prefix` is a component-wise prefix of `path`.
pub fn relative_after(path: &Path, prefix: &Path) -> Option<Path> {
    let path_s = path.components.as_slice();
    let prefix_s = prefix.components.as_slice();
    if path_s.len() < prefix_s.len() || path_s[..prefix_s.len()] != *prefix_s {
        return None;
    }
    let mut components = TinyVec::new();
    for c in &path_s[prefix_s.len()..] {
        components.push(c.clone());
    }
    Some(Path {
        absolute: false,
        components,
    })
}

/// True if `a` and `b` are the same path or one is an ancestor of the other
/// (§4.F step 2: "mounts whose `from` overlaps the query scope").
pub fn overlaps(a: &Path, b: &Path) -> bool {
    relative_after(a, b).is_some() || relative_after(b, a).is_some()
}

pub fn to_string(path: &Path) -> String {
    let body = path.components.as_slice().join("/");
    if path.absolute {
        format!("/{body}")
    } else {
        body
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn relative_after_strips_shared_prefix() {
        let a = Path::parse("/a/b/c").unwrap();
        let prefix = Path::parse("/a/b").unwrap();
        let rel = relative_after(&a, &prefix).unwrap();
        assert_eq!(rel.components.as_slice(), ["c"]);
    }

    #[test]
    fn overlaps_is_symmetric_on_ancestry() {
        let mount_from = Path::parse("/mounts/db").unwrap();
        let narrower_scope = Path::parse("/mounts/db/tables").unwrap();
        let broader_scope = Path::parse("/mounts").unwrap();
        let disjoint = Path::parse("/other").unwrap();

        assert!(overlaps(&mount_from, &narrower_scope));
        assert!(overlaps(&mount_from, &broader_scope));
        assert!(!overlaps(&mount_from, &disjoint));
    }

    #[test]
    fn join_resolves_relative_against_absolute_base() {
        let base = Path::parse("/a/b").unwrap();
        let rel = Path::parse("c/d").unwrap();
        let joined = join(&base, &rel);
        assert_eq!(to_string(&joined), "/a/b/c/d");
    }
}
