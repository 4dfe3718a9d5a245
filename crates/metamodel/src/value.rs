use crate::ty::Type;
use std::collections::BTreeMap;
use std::collections::LinkedList;
use std::sync::Arc;

/// The owned, in-memory form of an instance payload (§3's "payload whose
/// layout is dictated by the type").
///
/// The source system addresses a payload as a raw pointer plus a
/// byte offset computed from the metamodel (`Instance::addr` plus
/// `Member::offset`). §9's Design Notes license reshaping that into an
/// idiomatic owned representation rather than carrying `unsafe` pointer
/// arithmetic through every layer that touches an object's data: `Value` is
/// that representation. `store::Object` holds one per instance; delegates
/// (`Delegate`, below) are called against a `&mut Value` instead of an
/// `Instance`.
#[derive(Debug, Clone)]
pub enum Value {
    Void,
    /// A dynamically-typed reference: the concrete type of the boxed value,
    /// plus the value itself.
    Any(Arc<Type>, Box<Value>),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Composite fields, base-members-first, in the order
    /// `Type::all_members` yields them.
    Composite(Vec<Value>),
    /// `ARRAY`/`SEQUENCE` container contents, in order.
    Collection(Vec<Value>),
    /// `LIST` container contents (external doubly-linked list, §6).
    List(LinkedList<Value>),
    /// `MAP` container contents (external red-black tree, §6), keyed by the
    /// element's natural key. Corto's map keys are themselves typed values;
    /// this crate restricts map keys to strings, which covers every mount
    /// and metamodel use in this workspace and keeps `Value` from needing
    /// to be `Ord` over arbitrary nested shapes.
    Map(BTreeMap<String, Value>),
    /// A materialized snapshot of an external iterator's remaining items.
    Iterator(Vec<Value>),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Any(..) => "any",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Composite(_) => "composite",
            Value::Collection(_) => "collection",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Iterator(_) => "iterator",
        }
    }
}
