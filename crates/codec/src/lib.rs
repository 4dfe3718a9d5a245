//! The content-type codec boundary (§6): projecting a `Value` to bytes and
//! back for a MIME identifier, plus the default `application/json` codec.

mod content_codec;
mod convert;
mod error;
mod json;
mod registry;

pub use content_codec::ContentCodec;
pub use convert::{from_json, to_json};
pub use error::{Error, Result};
pub use json::JsonCodec;
pub use registry::Registry;
