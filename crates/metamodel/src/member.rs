use crate::flags::Modifier;
use crate::ty::Type;
use std::sync::Arc;

/// A typed field inside a composite (§3). `id` is assigned in declaration
/// order within the type and is stable across `define` calls; it's what the
/// walker and the reduce-style delegates use to address a member without
/// re-resolving its name.
#[derive(Clone)]
pub struct Member {
    pub name: String,
    pub ty: Arc<Type>,
    pub offset: usize,
    pub modifiers: Modifier,
    pub id: u32,
    pub unit: Option<String>,
    /// State condition expression governing `OPTIONAL` members: the member
    /// is only present when this expression (evaluated against sibling
    /// members) holds. `None` means the member is unconditionally present
    /// whenever `OPTIONAL` is not set, or always absent-checked when it is.
    pub condition: Option<String>,
}

impl Member {
    pub fn new(name: impl Into<String>, ty: Arc<Type>, id: u32) -> Member {
        Member {
            name: name.into(),
            ty,
            offset: 0,
            modifiers: Modifier::NONE,
            id,
            unit: None,
            condition: None,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifier) -> Member {
        self.modifiers = modifiers;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Member {
        self.offset = offset;
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Member {
        self.condition = Some(condition.into());
        self
    }

    pub fn is_key(&self) -> bool {
        self.modifiers.contains(Modifier::KEY)
    }
}

impl std::fmt::Debug for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("type", &self.ty.name)
            .field("offset", &self.offset)
            .field("modifiers", &self.modifiers)
            .field("id", &self.id)
            .finish()
    }
}
