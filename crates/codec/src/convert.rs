use crate::error::{Error, Result};
use metamodel::{ContainerKind, Kind, Primitive, Type, Value};
use std::sync::Arc;

/// Projects a `Value` into a serialization-neutral `serde_json::Value`
/// (§6's `from_value`). Has no failure mode: every `Value` variant maps to
/// some JSON shape, even ones JSON doesn't distinguish natively (`Bytes` is
/// base64, `Any` carries its runtime type name alongside the payload).
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Void => serde_json::Value::Null,
        Value::Any(ty, inner) => serde_json::json!({
            "$type": ty.name,
            "value": to_json(inner),
        }),
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::from(*i),
        Value::UInt(u) => serde_json::Value::from(*u),
        Value::Float(f) => serde_json::json!(f),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(b) => serde_json::Value::String(base64_encode(b)),
        Value::Composite(fields) => {
            serde_json::Value::Array(fields.iter().map(to_json).collect())
        }
        Value::Collection(items) | Value::Iterator(items) => {
            serde_json::Value::Array(items.iter().map(to_json).collect())
        }
        Value::List(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Map(entries) => serde_json::Value::Object(
            entries.iter().map(|(k, v)| (k.clone(), to_json(v))).collect(),
        ),
    }
}

/// Parses `json` into a `Value` matching `ty`'s shape (§6's `to_value`).
/// Driven by the target type rather than by JSON's own (coarser) type
/// system, the same way `Type::default_value` is driven by `ty` rather than
/// by an existing payload — both need the metamodel to disambiguate what
/// JSON alone cannot (an `Int` member vs. a `UInt` member are both JSON
/// numbers).
pub fn from_json(json: &serde_json::Value, ty: &Type) -> Result<Value> {
    match ty.kind {
        Kind::Void => Ok(Value::Void),
        Kind::Any => {
            let obj = json.as_object().ok_or_else(|| Error::ShapeMismatch {
                ty: ty.name.clone(),
                reason: "expected a {$type, value} object for an `any` member",
            })?;
            let inner = obj.get("value").unwrap_or(&serde_json::Value::Null);
            Ok(Value::Any(Arc::new(Type::void()), Box::new(from_json(inner, &Type::void())?)))
        }
        Kind::Primitive => from_json_primitive(json, ty),
        Kind::Composite => {
            let items = json.as_array().ok_or_else(|| Error::ShapeMismatch {
                ty: ty.name.clone(),
                reason: "expected a JSON array of member values",
            })?;
            let members = ty.all_members();
            if items.len() != members.len() {
                return Err(Error::ShapeMismatch {
                    ty: ty.name.clone(),
                    reason: "member count does not match JSON array length",
                });
            }
            let fields = items
                .iter()
                .zip(members)
                .map(|(item, member)| from_json(item, &member.ty))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Composite(fields))
        }
        Kind::Collection => {
            let c = ty.as_collection().ok_or_else(|| Error::ShapeMismatch {
                ty: ty.name.clone(),
                reason: "collection type carries no Collection shape",
            })?;
            match c.container {
                ContainerKind::Map => {
                    let obj = json.as_object().ok_or_else(|| Error::ShapeMismatch {
                        ty: ty.name.clone(),
                        reason: "expected a JSON object for a map container",
                    })?;
                    let mut out = std::collections::BTreeMap::new();
                    for (k, v) in obj {
                        out.insert(k.clone(), from_json(v, &c.element)?);
                    }
                    Ok(Value::Map(out))
                }
                ContainerKind::List => {
                    let items = json.as_array().ok_or_else(|| Error::ShapeMismatch {
                        ty: ty.name.clone(),
                        reason: "expected a JSON array for a list container",
                    })?;
                    let mut out = std::collections::LinkedList::new();
                    for item in items {
                        out.push_back(from_json(item, &c.element)?);
                    }
                    Ok(Value::List(out))
                }
                ContainerKind::Array(n) => {
                    let items = json.as_array().ok_or_else(|| Error::ShapeMismatch {
                        ty: ty.name.clone(),
                        reason: "expected a JSON array for an array container",
                    })?;
                    if items.len() != n {
                        return Err(Error::ShapeMismatch {
                            ty: ty.name.clone(),
                            reason: "array length does not match the fixed container size",
                        });
                    }
                    Ok(Value::Collection(
                        items.iter().map(|i| from_json(i, &c.element)).collect::<Result<_>>()?,
                    ))
                }
                ContainerKind::Sequence => {
                    let items = json.as_array().ok_or_else(|| Error::ShapeMismatch {
                        ty: ty.name.clone(),
                        reason: "expected a JSON array for a sequence container",
                    })?;
                    Ok(Value::Collection(
                        items.iter().map(|i| from_json(i, &c.element)).collect::<Result<_>>()?,
                    ))
                }
            }
        }
        Kind::Iterator => {
            let items = json.as_array().ok_or_else(|| Error::ShapeMismatch {
                ty: ty.name.clone(),
                reason: "expected a JSON array for an iterator snapshot",
            })?;
            Ok(Value::Iterator(items.iter().map(|i| from_json(i, &Type::void())).collect::<Result<_>>()?))
        }
    }
}

fn from_json_primitive(json: &serde_json::Value, ty: &Type) -> Result<Value> {
    let prim = ty.as_primitive().ok_or_else(|| Error::ShapeMismatch {
        ty: ty.name.clone(),
        reason: "primitive type carries no Primitive shape",
    })?;
    let mismatch = || Error::ShapeMismatch {
        ty: ty.name.clone(),
        reason: "JSON scalar does not match the expected primitive kind",
    };
    match prim {
        Primitive::Bool => Ok(Value::Bool(json.as_bool().ok_or_else(mismatch)?)),
        Primitive::Int8 | Primitive::Int16 | Primitive::Int32 | Primitive::Int64 => {
            Ok(Value::Int(json.as_i64().ok_or_else(mismatch)?))
        }
        Primitive::UInt8 | Primitive::UInt16 | Primitive::UInt32 | Primitive::UInt64 => {
            Ok(Value::UInt(json.as_u64().ok_or_else(mismatch)?))
        }
        Primitive::Float32 | Primitive::Float64 => {
            Ok(Value::Float(json.as_f64().ok_or_else(mismatch)?))
        }
        Primitive::String => Ok(Value::String(json.as_str().ok_or_else(mismatch)?.to_string())),
        Primitive::Bytes => Ok(Value::Bytes(base64_decode(json.as_str().ok_or_else(mismatch)?))),
    }
}

/// Minimal base64 (standard alphabet, padded) so `codec` doesn't pull in a
/// dedicated base64 crate for the one place `Bytes` needs a JSON-safe
/// encoding; every other conversion here goes through serde_json directly.
fn base64_encode(bytes: &[u8]) -> String {
    const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut out = String::with_capacity((bytes.len() + 2) / 3 * 4);
    for chunk in bytes.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied();
        let b2 = chunk.get(2).copied();
        out.push(ALPHABET[(b0 >> 2) as usize] as char);
        out.push(ALPHABET[(((b0 & 0x03) << 4) | (b1.unwrap_or(0) >> 4)) as usize] as char);
        if let Some(b1) = b1 {
            out.push(ALPHABET[(((b1 & 0x0f) << 2) | (b2.unwrap_or(0) >> 6)) as usize] as char);
        } else {
            out.push('=');
        }
        if let Some(b2) = b2 {
            out.push(ALPHABET[(b2 & 0x3f) as usize] as char);
        } else {
            out.push('=');
        }
    }
    out
}

fn base64_decode(s: &str) -> Vec<u8> {
    fn val(c: u8) -> Option<u8> {
        match c {
            b'A'..=b'Z' => Some(c - b'A'),
            b'a'..=b'z' => Some(c - b'a' + 26),
            b'0'..=b'9' => Some(c - b'0' + 52),
            b'+' => Some(62),
            b'/' => Some(63),
            _ => None,
        }
    }
    let mut out = Vec::with_capacity(s.len() / 4 * 3);
    let mut buf = 0u32;
    let mut bits = 0u32;
    for &b in s.as_bytes() {
        let Some(v) = val(b) else { continue };
        buf = (buf << 6) | v as u32;
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((buf >> bits) as u8);
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use metamodel::Member;

    #[test]
    fn round_trips_a_composite_through_json() {
        let i32_ty = Arc::new(Type::primitive("int32", Primitive::Int32));
        let str_ty = Arc::new(Type::primitive("string", Primitive::String));
        let ty = Type::composite(
            "Point",
            None,
            vec![Member::new("x", i32_ty, 0), Member::new("label", str_ty, 1)],
            metamodel::Delegates::default(),
        )
        .unwrap();

        let value = Value::Composite(vec![Value::Int(7), Value::String("origin".into())]);
        let json = to_json(&value);
        let back = from_json(&json, &ty).unwrap();
        match back {
            Value::Composite(fields) => {
                assert!(matches!(fields[0], Value::Int(7)));
                assert!(matches!(&fields[1], Value::String(s) if s == "origin"));
            }
            other => panic!("expected composite, got {other:?}"),
        }
    }

    #[test]
    fn bytes_round_trip_through_base64() {
        let bytes = vec![0u8, 1, 2, 250, 255];
        let encoded = base64_encode(&bytes);
        assert_eq!(base64_decode(&encoded), bytes);
    }
}
