use crate::content_codec::ContentCodec;
use crate::error::{Error, Result};
use crate::json::JsonCodec;
use std::collections::HashMap;
use std::sync::Arc;

/// Looks up a `ContentCodec` by MIME identifier (§6). Registered codecs are
/// immutable for the registry's lifetime; `vstore` holds one `Registry` per
/// `Runtime`, seeded with [`JsonCodec`] by default.
pub struct Registry {
    codecs: HashMap<String, Arc<dyn ContentCodec>>,
}

impl Registry {
    pub fn new() -> Registry {
        let mut registry = Registry { codecs: HashMap::new() };
        registry.register(Arc::new(JsonCodec));
        registry
    }

    pub fn register(&mut self, codec: Arc<dyn ContentCodec>) {
        self.codecs.insert(codec.content_type().to_string(), codec);
    }

    pub fn get(&self, content_type: &str) -> Result<Arc<dyn ContentCodec>> {
        self.codecs
            .get(content_type)
            .cloned()
            .ok_or_else(|| Error::UnsupportedContentType(content_type.to_string()))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn json_is_registered_by_default() {
        let registry = Registry::new();
        assert!(registry.get("application/json").is_ok());
    }

    #[test]
    fn unknown_content_type_is_an_error() {
        let registry = Registry::new();
        assert!(matches!(
            registry.get("text/corto"),
            Err(Error::UnsupportedContentType(_))
        ));
    }
}
