use crate::error::{Error, Result};
use crate::flags::TypeFlags;
use crate::kind::{ContainerKind, Kind, Primitive};
use crate::member::Member;
use crate::value::Value;
use std::sync::Arc;

/// A type method override: `init`/`construct`/etc (§3). Invoked against the
/// owned payload directly rather than through a raw-pointer/offset
/// `Instance` view (`function invocation binding`, the native-call
/// boundary of §6, is an external collaborator outside this crate's
/// concern); `store` is the only caller.
pub type Delegate = Arc<dyn Fn(&mut Value) -> Result<()> + Send + Sync>;

/// The delegate slots a type may override, inherited from its nearest base
/// unless overridden (§3, §4.A).
#[derive(Clone, Default)]
pub struct Delegates {
    pub init: Option<Delegate>,
    pub deinit: Option<Delegate>,
    pub construct: Option<Delegate>,
    pub destruct: Option<Delegate>,
    pub define: Option<Delegate>,
    pub delete: Option<Delegate>,
    pub validate: Option<Delegate>,
    pub update: Option<Delegate>,
}

impl std::fmt::Debug for Delegates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let present = |d: &Option<Delegate>| d.is_some();
        f.debug_struct("Delegates")
            .field("init", &present(&self.init))
            .field("deinit", &present(&self.deinit))
            .field("construct", &present(&self.construct))
            .field("destruct", &present(&self.destruct))
            .field("define", &present(&self.define))
            .field("delete", &present(&self.delete))
            .field("validate", &present(&self.validate))
            .field("update", &present(&self.update))
            .finish()
    }
}

/// Composite-specific shape: an ordered member vector plus the indices of
/// `KEY`-modified members, collected once at `finalize` time for fast
/// composite comparison (§4.A "keycache").
#[derive(Debug, Clone, Default)]
pub struct Composite {
    pub members: Vec<Member>,
    pub keycache: Vec<usize>,
}

/// Collection-specific shape: element type and container kind (§3).
#[derive(Debug, Clone)]
pub struct Collection {
    pub element: Arc<Type>,
    pub container: ContainerKind,
}

enum Shape {
    None,
    Primitive(Primitive),
    Composite(Composite),
    Collection(Collection),
}

impl Default for Shape {
    fn default() -> Self {
        Shape::None
    }
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::None => write!(f, "None"),
            Shape::Primitive(p) => write!(f, "Primitive({:?})", p),
            Shape::Composite(c) => write!(f, "Composite({:?})", c),
            Shape::Collection(c) => write!(f, "Collection({:?})", c),
        }
    }
}

/// A reflective type descriptor (§3). Composite types carry `base`, an
/// ordered member vector and method overrides; collection types carry an
/// element type and a container kind. Delegates propagate from base to
/// derived at `finalize` time, the same point at which `flags` (the
/// cached `HAS_*`/`NEEDS_INIT`/`IS_CONTAINER` bits) is computed.
#[derive(Debug)]
pub struct Type {
    pub name: String,
    pub kind: Kind,
    pub base: Option<Arc<Type>>,
    pub delegates: Delegates,
    pub flags: TypeFlags,
    pub size: usize,
    pub align: usize,
    shape: Shape,
}

impl Type {
    /// Constructs the `VOID` type: the unique type with no payload.
    pub fn void() -> Type {
        Type {
            name: "void".to_string(),
            kind: Kind::Void,
            base: None,
            delegates: Delegates::default(),
            flags: TypeFlags::NONE,
            size: 0,
            align: 1,
            shape: Shape::None,
        }
    }

    /// Constructs the `ANY` type: an open-ended reference to a value of any
    /// type, represented as a fat pointer (type + address).
    pub fn any() -> Type {
        Type {
            name: "any".to_string(),
            kind: Kind::Any,
            base: None,
            delegates: Delegates::default(),
            flags: TypeFlags::HAS_REFERENCES,
            size: std::mem::size_of::<(*const Type, *mut u8)>(),
            align: std::mem::align_of::<*const Type>(),
            shape: Shape::None,
        }
    }

    pub fn primitive(name: impl Into<String>, prim: Primitive) -> Type {
        let (size, align) = prim.native_layout();
        Type {
            name: name.into(),
            kind: Kind::Primitive,
            base: None,
            delegates: Delegates::default(),
            flags: TypeFlags::NONE,
            size,
            align,
            shape: Shape::Primitive(prim),
        }
    }

    /// Builds a composite type from its (unfinalized) member vector and
    /// base, then runs the finalize pass: member offset packing, delegate
    /// propagation, and flag propagation (§4.A).
    pub fn composite(
        name: impl Into<String>,
        base: Option<Arc<Type>>,
        mut members: Vec<Member>,
        delegates: Delegates,
    ) -> Result<Type> {
        let name = name.into();
        let mut offset = base.as_ref().map(|b| b.size).unwrap_or(0);
        let mut align = base.as_ref().map(|b| b.align).unwrap_or(1);

        for m in members.iter_mut() {
            let member_align = m.ty.align.max(1);
            offset = round_up(offset, member_align);
            m.offset = offset;
            offset += m.ty.size;
            align = align.max(member_align);
        }
        let size = round_up(offset, align);

        let keycache = members
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_key())
            .map(|(i, _)| i)
            .collect();

        let mut flags = base.as_ref().map(|b| b.flags).unwrap_or(TypeFlags::NONE);
        let effective = propagate_delegates(base.as_deref(), delegates);
        if effective.init.is_some() {
            flags.insert(TypeFlags::HAS_INIT);
        }
        if effective.deinit.is_some() {
            flags.insert(TypeFlags::HAS_DEINIT);
        }
        if effective.construct.is_some() {
            flags.insert(TypeFlags::HAS_CONSTRUCT);
        }
        if effective.destruct.is_some() {
            flags.insert(TypeFlags::HAS_DESTRUCT);
        }
        for m in members.iter() {
            if m.ty.flags.contains(TypeFlags::HAS_REFERENCES) || matches!(m.ty.kind, Kind::Any) {
                flags.insert(TypeFlags::HAS_REFERENCES);
            }
            if m.ty.flags.contains(TypeFlags::HAS_RESOURCES) {
                flags.insert(TypeFlags::HAS_RESOURCES);
            }
            if m.ty.flags.contains(TypeFlags::NEEDS_INIT) || m.ty.flags.contains(TypeFlags::HAS_INIT)
            {
                flags.insert(TypeFlags::NEEDS_INIT);
            }
        }

        Ok(Type {
            name,
            kind: Kind::Composite,
            base,
            delegates: effective,
            flags,
            size,
            align,
            shape: Shape::Composite(Composite { members, keycache }),
        })
    }

    pub fn collection(
        name: impl Into<String>,
        element: Arc<Type>,
        container: ContainerKind,
    ) -> Type {
        let mut flags = TypeFlags::IS_CONTAINER;
        if element.flags.overlaps(TypeFlags::HAS_REFERENCES) || matches!(element.kind, Kind::Any) {
            flags.insert(TypeFlags::HAS_REFERENCES);
        }
        let (size, align) = match container {
            ContainerKind::Array(n) => (element.size * n, element.align.max(1)),
            ContainerKind::Sequence => (
                std::mem::size_of::<(usize, *mut u8)>(),
                std::mem::align_of::<usize>(),
            ),
            ContainerKind::List | ContainerKind::Map => (
                std::mem::size_of::<*mut u8>(),
                std::mem::align_of::<*mut u8>(),
            ),
        };
        Type {
            name: name.into(),
            kind: Kind::Collection,
            base: None,
            delegates: Delegates::default(),
            flags,
            size,
            align: align.max(1),
            shape: Shape::Collection(Collection { element, container }),
        }
    }

    pub fn iterator(name: impl Into<String>, element: Arc<Type>) -> Type {
        Type {
            name: name.into(),
            kind: Kind::Iterator,
            base: None,
            delegates: Delegates::default(),
            flags: TypeFlags::HAS_REFERENCES,
            size: std::mem::size_of::<*mut u8>(),
            align: std::mem::align_of::<*mut u8>(),
            shape: Shape::Collection(Collection {
                element,
                container: ContainerKind::List,
            }),
        }
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match &self.shape {
            Shape::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match &self.shape {
            Shape::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match &self.shape {
            Shape::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// All members, base members first, in declaration order.
    pub fn all_members(&self) -> Vec<&Member> {
        let mut out = Vec::new();
        if let Some(base) = &self.base {
            out.extend(base.all_members());
        }
        if let Some(c) = self.as_composite() {
            out.extend(c.members.iter());
        }
        out
    }

    pub fn find_member(&self, name: &str) -> Result<&Member> {
        self.all_members()
            .into_iter()
            .find(|m| m.name == name)
            .ok_or_else(|| Error::UnknownMember(name.to_string()))
    }

    /// The zero value for this type's shape: what `declare` gives an
    /// object before its `construct` delegate (if any) runs (§3's lifecycle
    /// summary, "declared → (init, constructors run) → valid"). Recurses
    /// through composite members and collection elements so the payload
    /// always matches `self`'s shape well enough for `walker::walk` to
    /// traverse it, even before construction.
    pub fn default_value(&self) -> Value {
        match self.kind {
            Kind::Void => Value::Void,
            Kind::Any => Value::Any(Arc::new(Type::void()), Box::new(Value::Void)),
            Kind::Primitive => match self.as_primitive() {
                Some(Primitive::Bool) => Value::Bool(false),
                Some(
                    Primitive::Int8 | Primitive::Int16 | Primitive::Int32 | Primitive::Int64,
                ) => Value::Int(0),
                Some(
                    Primitive::UInt8 | Primitive::UInt16 | Primitive::UInt32 | Primitive::UInt64,
                ) => Value::UInt(0),
                Some(Primitive::Float32 | Primitive::Float64) => Value::Float(0.0),
                Some(Primitive::String) => Value::String(String::new()),
                Some(Primitive::Bytes) | None => Value::Bytes(Vec::new()),
            },
            Kind::Composite => Value::Composite(
                self.all_members()
                    .iter()
                    .map(|m| m.ty.default_value())
                    .collect(),
            ),
            Kind::Collection => {
                let c = self.as_collection().expect("collection type carries Collection shape");
                match c.container {
                    ContainerKind::Array(n) => {
                        Value::Collection(vec![c.element.default_value(); n])
                    }
                    ContainerKind::Sequence => Value::Collection(Vec::new()),
                    ContainerKind::List => Value::List(std::collections::LinkedList::new()),
                    ContainerKind::Map => Value::Map(std::collections::BTreeMap::new()),
                }
            }
            Kind::Iterator => Value::Iterator(Vec::new()),
        }
    }
}

fn round_up(offset: usize, align: usize) -> usize {
    if align == 0 {
        return offset;
    }
    (offset + align - 1) / align * align
}

/// Resolves the effective delegate set for a type being constructed: its own
/// overrides take precedence, otherwise the nearest base's effective
/// delegate is pulled in (§4.A "pulls delegates from the nearest base").
fn propagate_delegates(base: Option<&Type>, own: Delegates) -> Delegates {
    let base = base.map(|b| &b.delegates);
    Delegates {
        init: own.init.or_else(|| base.and_then(|b| b.init.clone())),
        deinit: own.deinit.or_else(|| base.and_then(|b| b.deinit.clone())),
        construct: own
            .construct
            .or_else(|| base.and_then(|b| b.construct.clone())),
        destruct: own
            .destruct
            .or_else(|| base.and_then(|b| b.destruct.clone())),
        define: own.define.or_else(|| base.and_then(|b| b.define.clone())),
        delete: own.delete.or_else(|| base.and_then(|b| b.delete.clone())),
        validate: own
            .validate
            .or_else(|| base.and_then(|b| b.validate.clone())),
        update: own.update.or_else(|| base.and_then(|b| b.update.clone())),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn primitive_layout_matches_native() {
        let t = Type::primitive("int32", Primitive::Int32);
        assert_eq!(t.size, std::mem::size_of::<i32>());
        assert_eq!(t.align, std::mem::align_of::<i32>());
    }

    #[test]
    fn composite_packs_members_and_inherits_flags() {
        let i32_ty = Arc::new(Type::primitive("int32", Primitive::Int32));
        let bool_ty = Arc::new(Type::primitive("bool", Primitive::Bool));

        let base = Arc::new(
            Type::composite(
                "Base",
                None,
                vec![Member::new("a", i32_ty.clone(), 0)],
                Delegates::default(),
            )
            .unwrap(),
        );

        let derived = Type::composite(
            "Derived",
            Some(base.clone()),
            vec![Member::new("b", bool_ty, 1).with_modifiers(crate::flags::Modifier::KEY)],
            Delegates::default(),
        )
        .unwrap();

        assert!(derived.size >= base.size + 1);
        assert_eq!(derived.as_composite().unwrap().keycache, vec![0]);
        assert_eq!(derived.all_members().len(), 2);
    }

    #[test]
    fn default_value_matches_composite_member_count() {
        let i32_ty = Arc::new(Type::primitive("int32", Primitive::Int32));
        let t = Type::composite(
            "Point",
            None,
            vec![Member::new("x", i32_ty.clone(), 0), Member::new("y", i32_ty, 1)],
            Delegates::default(),
        )
        .unwrap();
        match t.default_value() {
            Value::Composite(fields) => assert_eq!(fields.len(), 2),
            other => panic!("expected composite default, got {other:?}"),
        }
    }

    #[test]
    fn has_references_propagates_through_any_member() {
        let any_ty = Arc::new(Type::any());
        let t = Type::composite(
            "HoldsAny",
            None,
            vec![Member::new("x", any_ty, 0)],
            Delegates::default(),
        )
        .unwrap();
        assert!(t.flags.contains(TypeFlags::HAS_REFERENCES));
    }
}
