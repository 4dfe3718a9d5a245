//! The runtime context, unified error type, configuration loading, and
//! exposed CLI surface (§4.G, §6, §7): the layer `cmd/corto` and any other
//! embedder links against rather than wiring `store`/`observer`/`vstore`
//! together itself.

pub mod config;
mod context;
mod env;
mod cli;
mod error;

pub use cli::{
    autoload, enable_load, enable_security, get_build, load_config, publish, random_id, select,
    start, stop, unsubscribe,
};
pub use config::Config;
pub use context::{
    attribute_defaults, current, current_owner, set_attribute_defaults, set_current_owner,
    with_fluent_scratch, Runtime,
};
pub use env::{Env, LogFormat};
pub use error::{Error, Result};
