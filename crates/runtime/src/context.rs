//! The runtime context (§4.G) and the thread-local state §5 assigns it:
//! "TLS holds per-thread owner, the declared-by-me set, the fluent-call
//! scratch buffer, and the current attribute defaults." `store`'s own TLS
//! (current scope, declared-by-me) already covers the first two; this
//! module carries the remaining two plus the process-wide singletons
//! (admin lock, bootstrap state) `start`/`stop` manage.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Mutex, OnceLock};

use crate::config::Config;
use store::{Attribute, Store};

thread_local! {
    /// The owner tag attached to objects this thread declares (§4.C:
    /// `Object::owner`), e.g. a mount identifying itself so its own writes
    /// can be told apart from a peer's.
    static CURRENT_OWNER: RefCell<Option<String>> = const { RefCell::new(None) };

    /// Scratch buffer reused across a fluent call chain (`Select`'s builder
    /// methods) to avoid a fresh heap allocation per call when assembling
    /// path fragments or formatted ids.
    static FLUENT_SCRATCH: RefCell<String> = const { RefCell::new(String::new()) };

    /// Attribute bits applied to an object declared on this thread unless
    /// the call site overrides them explicitly.
    static ATTRIBUTE_DEFAULTS: RefCell<Attribute> = const { RefCell::new(Attribute::NAMED) };
}

/// Reads the current thread's owner tag.
pub fn current_owner() -> Option<String> {
    CURRENT_OWNER.with(|o| o.borrow().clone())
}

/// Sets the current thread's owner tag for subsequent declares.
pub fn set_current_owner(owner: Option<String>) {
    CURRENT_OWNER.with(|o| *o.borrow_mut() = owner);
}

/// Runs `f` with exclusive access to this thread's fluent-call scratch
/// buffer, cleared first so callers never see a previous call's leftovers.
pub fn with_fluent_scratch<R>(f: impl FnOnce(&mut String) -> R) -> R {
    FLUENT_SCRATCH.with(|s| {
        let mut buf = s.borrow_mut();
        buf.clear();
        f(&mut buf)
    })
}

pub fn attribute_defaults() -> Attribute {
    ATTRIBUTE_DEFAULTS.with(|a| *a.borrow())
}

pub fn set_attribute_defaults(attrs: Attribute) {
    ATTRIBUTE_DEFAULTS.with(|a| *a.borrow_mut() = attrs);
}

/// Serializes registration of exit handlers and global singletons (§5:
/// "the admin lock serialises registration of exit handlers and global
/// singletons"), in the style of `automations::next_task_id`'s
/// `LazyLock<Mutex<_>>` global-state pattern.
static ADMIN_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// The live runtime instance, installed by [`crate::start`] and torn down
/// by [`crate::stop`].
pub struct Runtime {
    pub(crate) app_name: String,
    pub(crate) store: Arc<Store>,
    pub(crate) dispatcher: Arc<vstore::Dispatcher>,
    pub(crate) config: Mutex<Config>,
    security_enabled: AtomicBool,
    load_enabled: AtomicBool,
    autoload_enabled: AtomicBool,
    running: AtomicBool,
}

impl Runtime {
    fn new(app_name: String, config: Config) -> Runtime {
        let root_type = Arc::new(metamodel::Type::void());
        let store = Arc::new(Store::new(root_type));
        let dispatcher = Arc::new(vstore::Dispatcher::new(store.clone()));
        let security_enabled = config.security_enabled;
        let autoload_enabled = config.autoload;
        Runtime {
            app_name,
            store,
            dispatcher,
            config: Mutex::new(config),
            security_enabled: AtomicBool::new(security_enabled),
            load_enabled: AtomicBool::new(true),
            autoload_enabled: AtomicBool::new(autoload_enabled),
            running: AtomicBool::new(true),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn dispatcher(&self) -> &Arc<vstore::Dispatcher> {
        &self.dispatcher
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn security_enabled(&self) -> bool {
        self.security_enabled.load(Ordering::Acquire)
    }

    pub fn set_security_enabled(&self, enabled: bool) {
        self.security_enabled.store(enabled, Ordering::Release);
    }

    pub fn load_enabled(&self) -> bool {
        self.load_enabled.load(Ordering::Acquire)
    }

    pub fn set_load_enabled(&self, enabled: bool) {
        self.load_enabled.store(enabled, Ordering::Release);
    }

    pub fn autoload_enabled(&self) -> bool {
        self.autoload_enabled.load(Ordering::Acquire)
    }

    pub fn set_autoload_enabled(&self, enabled: bool) {
        self.autoload_enabled.store(enabled, Ordering::Release);
    }
}

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Installs the process-wide runtime, guarded by the admin lock so two
/// racing `start` calls can't both win. Returns the existing instance if
/// one is already installed (`start` is idempotent, matching §4.B's
/// `define` idempotency posture rather than erroring on a second call).
pub(crate) fn install(app_name: String, config: Config) -> &'static Runtime {
    let _guard = ADMIN_LOCK.lock().expect("admin lock poisoned");
    let runtime = RUNTIME.get_or_init(|| Runtime::new(app_name, config));
    runtime.set_running(true);
    runtime
}

pub(crate) fn installed() -> bool {
    RUNTIME.get().is_some()
}

/// Returns the running instance.
///
/// # Panics
/// Panics if called before `start` — every CLI surface function besides
/// `start` itself requires a running instance, the same precondition the
/// original C library's globally-initialized `corto_run` state carries.
pub fn current() -> &'static Runtime {
    RUNTIME.get().expect("runtime::start must be called before using the runtime")
}
