/// Structural position of a value reached during a walk (§4.D: "second
/// vector covers structural positions").
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Position {
    /// The root value passed to `walk`.
    Object,
    /// A base type's member set, visited ahead of the derived type's own
    /// members when `Policy::visit_base` is set.
    Base,
    /// A composite member.
    Member,
    /// An element of an `ARRAY`/`SEQUENCE`/`LIST`/`MAP` collection.
    Element,
    /// The concrete value reached by following an `Any` indirection.
    ///
    /// The spec's structural-position vector doesn't separately name the
    /// far side of an alias; `Mem` (as in corto's `CORTO_MEMBER` indirection
    /// sense) keeps it distinguishable from `Member`/`Element` visits so a
    /// `Sink` can tell "this is a field" from "this is what that field's
    /// `any` points at" without inspecting the type itself.
    Mem,
}
