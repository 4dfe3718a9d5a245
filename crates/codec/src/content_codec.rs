use crate::error::Result;
use metamodel::{Type, Value};

/// §6's "content type codec" consumed interface: given a MIME identifier,
/// project a `Value` to bytes and back. The core only consumes this
/// boundary (codecs themselves are out of scope); `vstore::publish` and
/// `select`'s `contentType` results are the two call sites.
pub trait ContentCodec: Send + Sync {
    /// The MIME identifier this codec answers for, e.g. `"application/json"`.
    fn content_type(&self) -> &str;

    fn from_value(&self, value: &Value) -> Result<Vec<u8>>;

    fn to_value(&self, bytes: &[u8], ty: &Type) -> Result<Value>;

    /// Invoked once a caller is done with bytes obtained from `from_value`
    /// on every exit path (§5's "release hook... must be called on every
    /// exit path"). The default codecs in this crate have nothing to
    /// release beyond ordinary `Drop`; mounts backed by borrowed or pooled
    /// buffers are expected to override this.
    fn release(&self, _bytes: Vec<u8>) {}
}
