//! Per-object observation and notification (§4.E): subscribe to lifecycle
//! events on an object, its scope, or its subtree, and dispatch matching
//! notifications either inline or through a pluggable queue.

mod dispatcher;
mod flags;
mod notifier;
mod originator;
mod subscription;

pub use dispatcher::{Dispatcher, Inline};
pub use flags::{Event, Scope};
pub use notifier::Notifier;
pub use originator::{current as current_originator, set as set_originator, with as with_originator};
pub use subscription::{Callback, Notification, Observer};
