//! The exposed CLI surface (§6): `start`, `stop`, `load_config`,
//! `get_build`, `enable_security`, `enable_load`, `autoload`, `random_id`,
//! plus the fluent `select`/`subscribe`/`publish`/`unsubscribe` entry
//! points. Every function but `start` requires a running instance
//! ([`crate::context::current`] panics otherwise, matching the original
//! C library's precondition that `corto_start` has already run).

use crate::config::Config;
use crate::context::{self, Runtime};
use crate::env::Env;
use rand::Rng;
use std::path::Path;

/// `start(appName) -> 0|nonzero` (§6). Installs the process-wide runtime
/// (idempotent: a second call returns success without re-initializing),
/// installs a `tracing_subscriber::fmt` subscriber honoring `CORTO_LOGFMT`,
/// and loads `CORTO_CONFIG` if set. Returns `0` on success, nonzero on any
/// failure — errors during operation are reported through [`crate::Error`]
/// rather than a process exit, per §7.
pub fn start(app_name: &str) -> i32 {
    let env = Env::read();
    install_tracing(&env);

    let config = match env.config.as_deref().map(Path::new) {
        Some(path) => match crate::config::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::error!(%err, path = ?path, "failed to load CORTO_CONFIG at start");
                return 1;
            }
        },
        None => Config::default(),
    };

    let already_running = context::installed();
    let runtime = context::install(app_name.to_string(), config);
    if already_running {
        tracing::warn!(app = app_name, "runtime::start called again; reusing the existing instance");
    } else {
        tracing::info!(app = app_name, "runtime started");
    }
    let _ = runtime;
    0
}

fn install_tracing(env: &Env) {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let result = match env.logfmt {
        crate::env::LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).try_init(),
        crate::env::LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed; leaving the existing one in place");
    }
}

/// `stop() -> 0|nonzero` (§6). Marks the runtime stopped; per §5 this runs
/// the cycle collector one final time over the object tree before
/// returning, the same point §4.B names as "called at store shutdown".
pub fn stop() -> i32 {
    if !context::installed() {
        tracing::warn!("runtime::stop called before runtime::start");
        return 1;
    }
    let runtime = context::current();
    let collected = runtime.store().collect_cycles();
    runtime.set_running(false);
    tracing::info!(app = runtime.app_name(), collected, "runtime stopped");
    0
}

/// `load_config() -> 0|nonzero` (§6): re-reads `CORTO_CONFIG` into the
/// running instance, replacing the config loaded (or defaulted) at
/// `start`.
pub fn load_config() -> i32 {
    let runtime = context::current();
    let env = Env::read();
    let Some(path) = env.config else {
        tracing::warn!("load_config called with no CORTO_CONFIG set");
        return 1;
    };
    match crate::config::load(Path::new(&path)) {
        Ok(cfg) => {
            runtime.set_security_enabled(cfg.security_enabled);
            runtime.set_autoload_enabled(cfg.autoload);
            *runtime.config.lock().expect("config lock poisoned") = cfg;
            0
        }
        Err(err) => {
            tracing::error!(%err, path, "load_config failed");
            1
        }
    }
}

/// `get_build() -> string` (§6): this crate's own version, since the core
/// has no separate build-identifier concept beyond its own release.
pub fn get_build() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub fn enable_security(enabled: bool) {
    context::current().set_security_enabled(enabled);
}

pub fn enable_load(enabled: bool) {
    context::current().set_load_enabled(enabled);
}

pub fn autoload(enabled: bool) {
    context::current().set_autoload_enabled(enabled);
}

/// `random_id(n) -> string` (§6): `n` random lowercase alphanumeric
/// characters, suitable for anonymous object naming.
pub fn random_id(n: usize) -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..n).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char).collect()
}

/// Starts a fluent query rooted at the runtime's current scope (§6: the
/// fluent `select(expr, …)` entry point).
pub fn select(expr: impl Into<String>) -> vstore::Select<'static> {
    runtime().dispatcher().select(expr)
}

pub fn publish(event: observer::Event, id: &str, content_type: &str, value: &[u8]) -> crate::error::Result<()> {
    runtime().dispatcher().publish(event, id, content_type, value).map_err(Into::into)
}

pub fn unsubscribe(subscription: vstore::Subscription) {
    runtime().dispatcher().unsubscribe(subscription);
}

fn runtime() -> &'static Runtime {
    context::current()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn random_id_has_requested_length_and_alphabet() {
        let id = random_id(12);
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn random_id_of_zero_is_empty() {
        assert_eq!(random_id(0), "");
    }
}
