/// Errors a walk can fail with. "Errors from any callback abort the walk
/// and are surfaced to the caller" (§4.D) — `Sink` implementations return
/// their own error type, but it must be constructible from `Error` so the
/// engine can report its own shape-mismatch failures through the same path.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("value shape does not match type '{ty}': expected {expected}, found {found}")]
    ShapeMismatch {
        ty: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("composite '{ty}' expected {expected} fields, value carries {found}")]
    FieldCountMismatch {
        ty: String,
        expected: usize,
        found: usize,
    },
}

pub type Result<T, E> = std::result::Result<T, E>;
