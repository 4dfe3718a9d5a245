//! Layered configuration (SPEC_FULL.md ambient stack): a `serde`-derived
//! `Config` deserialized from YAML or JSON, located via `CORTO_CONFIG` (a
//! file, or a directory of fragments merged in filename order). Loading
//! itself is a Non-goal of the core's logic (§1) but not of its ambient
//! stack — `load_config()` is part of the exposed CLI surface (§6).

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// A mount's queue policy (§5: "dispatcher queues block producers when a
/// `queuePolicy.max` is set and the queue is full; policy determines
/// drop-oldest vs block").
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueueOverflow {
    Block,
    DropOldest,
}

impl Default for QueueOverflow {
    fn default() -> QueueOverflow {
        QueueOverflow::Block
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueuePolicy {
    pub max: Option<usize>,
    #[serde(default)]
    pub overflow: QueueOverflow,
}

/// The runtime-tunable knobs the core exposes (SPEC_FULL.md's Configuration
/// section). Every field has a default so a missing `CORTO_CONFIG` (or a
/// fragment that only overrides a subset) still produces a usable `Config`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub security_enabled: bool,
    pub autoload: bool,
    pub default_content_type: Option<String>,
    pub queue_policy: QueuePolicy,
    pub log_format: Option<String>,
}

/// Loads and merges `Config` from `path`: a single file is deserialized
/// directly; a directory has every `*.yaml`/`*.yml`/`*.json` fragment in it
/// read in filename order and folded left to right, each fragment
/// overriding only the fields it sets (mirroring `yaml-merge-keys`'s merge
/// semantics already vendored in this workspace).
pub fn load(path: &Path) -> Result<Config> {
    if path.is_dir() {
        let mut entries: Vec<_> = std::fs::read_dir(path)
            .map_err(|e| Error::InvalidArgument(format!("reading config directory {path:?}: {e}")))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| is_fragment(p))
            .collect();
        entries.sort();

        let mut merged = serde_json::Value::Object(Default::default());
        for entry in &entries {
            let fragment = parse_file(entry)?;
            merge(&mut merged, fragment);
        }
        serde_json::from_value(merged)
            .map_err(|e| Error::InvalidArgument(format!("config directory {path:?}: {e}")))
    } else {
        let value = parse_file(path)?;
        serde_json::from_value(value).map_err(|e| Error::InvalidArgument(format!("config file {path:?}: {e}")))
    }
}

fn is_fragment(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml") | Some("json")
    )
}

fn parse_file(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::InvalidArgument(format!("reading config file {path:?}: {e}")))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text)
            .map_err(|e| Error::InvalidArgument(format!("parsing {path:?}: {e}"))),
        _ => serde_yaml::from_str(&text)
            .map_err(|e| Error::InvalidArgument(format!("parsing {path:?}: {e}"))),
    }
}

/// Shallow, field-wise merge: `patch`'s object keys overwrite `base`'s; a
/// non-object `patch` replaces `base` wholesale.
fn merge(base: &mut serde_json::Value, patch: serde_json::Value) {
    match (base, patch) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(patch_map)) => {
            for (k, v) in patch_map {
                merge(base_map.entry(k).or_insert(serde_json::Value::Null), v);
            }
        }
        (base, patch) => *base = patch,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("runtime-config-test-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_a_single_yaml_file() {
        let dir = scratch_dir("single-file");
        let path = dir.join("config.yaml");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"securityEnabled: true\nautoload: false\n")
            .unwrap();

        let cfg = load(&path).unwrap();
        assert!(cfg.security_enabled);
        assert!(!cfg.autoload);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn merges_directory_fragments_in_filename_order() {
        let dir = scratch_dir("fragments");
        std::fs::write(dir.join("10-base.yaml"), b"autoload: true\ndefaultContentType: application/json\n").unwrap();
        std::fs::write(dir.join("20-override.yaml"), b"autoload: false\n").unwrap();

        let cfg = load(&dir).unwrap();
        assert!(!cfg.autoload, "later fragment should win");
        assert_eq!(cfg.default_content_type.as_deref(), Some("application/json"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = scratch_dir("defaults");
        let path = dir.join("config.json");
        std::fs::write(&path, b"{}").unwrap();

        let cfg = load(&path).unwrap();
        assert_eq!(cfg.queue_policy.overflow, QueueOverflow::Block);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
