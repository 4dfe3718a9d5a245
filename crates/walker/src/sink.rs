use crate::position::Position;
use metamodel::{Type, Value};

/// The generic interface a caller of [`crate::walk`] implements (§4.D).
///
/// The sampled teacher's `json::Walker` trait has one method per concrete
/// node kind (`push_property`, `push_item`, `pop_object`, ...) and returns
/// `()`. This walker's contract requires "errors from any callback abort the
/// walk and are surfaced to the caller", so `Sink` collapses that surface to
/// two methods parameterized by [`Position`] and returns `Result`.
pub trait Sink {
    type Error: From<crate::Error>;

    /// Called before descending into a composite/collection member, or for
    /// a leaf value. Returning `Err` aborts the walk immediately.
    fn enter(&mut self, pos: Position, ty: &Type, value: &Value) -> Result<(), Self::Error>;

    /// Called after a composite/collection member (and its children, if
    /// any) has been fully visited. Not called for leaf values visited via
    /// `enter` alone.
    fn leave(&mut self, pos: Position, ty: &Type, value: &Value) -> Result<(), Self::Error> {
        let _ = (pos, ty, value);
        Ok(())
    }
}
