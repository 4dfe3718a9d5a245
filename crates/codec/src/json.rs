use crate::content_codec::ContentCodec;
use crate::convert::{from_json, to_json};
use crate::error::{Error, Result};
use metamodel::{Type, Value};

/// The default, always-registered codec for `application/json` (§1 places
/// codec *implementations* out of scope, but a runnable crate needs at
/// least one to exercise `select`/`publish` against a `contentType`).
pub struct JsonCodec;

impl ContentCodec for JsonCodec {
    fn content_type(&self) -> &str {
        "application/json"
    }

    fn from_value(&self, value: &Value) -> Result<Vec<u8>> {
        serde_json::to_vec(&to_json(value)).map_err(Error::Json)
    }

    fn to_value(&self, bytes: &[u8], ty: &Type) -> Result<Value> {
        let parsed: serde_json::Value = serde_json::from_slice(bytes).map_err(Error::Json)?;
        from_json(&parsed, ty)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use metamodel::{Delegates, Member, Primitive};
    use std::sync::Arc;

    #[test]
    fn encodes_and_decodes_a_primitive() {
        let codec = JsonCodec;
        let ty = Type::primitive("int32", Primitive::Int32);
        let bytes = codec.from_value(&Value::Int(42)).unwrap();
        assert_eq!(bytes, b"42");
        match codec.to_value(&bytes, &ty).unwrap() {
            Value::Int(42) => {}
            other => panic!("expected Int(42), got {other:?}"),
        }
    }

    #[test]
    fn rejects_a_shape_mismatch() {
        let codec = JsonCodec;
        let i32_ty = Arc::new(Type::primitive("int32", Primitive::Int32));
        let ty = Type::composite("Pair", None, vec![Member::new("x", i32_ty, 0)], Delegates::default()).unwrap();
        let err = codec.to_value(b"42", &ty).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }
}
