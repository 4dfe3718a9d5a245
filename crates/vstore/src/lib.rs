//! The virtual store dispatcher (§4.F, component F): a fluent query
//! builder, mount registry and routing algorithm, publish/subscribe
//! surface, and alignment guarantee layered over `store` and `observer`.

mod align;
mod dispatcher;
mod error;
mod mount;
mod pathutil;
mod query;
mod registry;
mod result;
mod routing;
mod select;

pub use dispatcher::{Dispatcher, Subscription};
pub use error::{Error, Result};
pub use mount::{Mount, MountPolicy, MountSink, Ownership};
pub use query::{HistoryWindow, Query, TimeBound};
pub use registry::Registry as MountRegistry;
pub use result::{is_instance_of, QueryResult};
pub use select::Select;
