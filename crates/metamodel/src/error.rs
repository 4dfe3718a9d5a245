/// Errors raised while constructing or querying the metamodel.
///
/// `Internal` is reserved for bootstrap failures (§4.A): a mismatch between
/// a built-in type's declared metamodel size and its native Rust layout.
/// Callers that observe `Internal` during bootstrap should abort the
/// process rather than attempt to continue with a corrupt metamodel.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("type '{0}' already defined with a different shape")]
    TypeMismatch(String),

    #[error("member '{0}' not found")]
    UnknownMember(String),

    #[error("bad modifier combination on member '{member}': {detail}")]
    InvalidModifiers { member: String, detail: String },

    #[error(
        "bootstrap layout mismatch for built-in type '{name}': metamodel size {meta_size} \
         (align {meta_align}) does not match native layout size {native_size} (align {native_align})"
    )]
    Internal {
        name: String,
        meta_size: usize,
        meta_align: usize,
        native_size: usize,
        native_align: usize,
    },

    #[error("delegate invocation failed: {0}")]
    Delegate(String),
}

pub type Result<T> = std::result::Result<T, Error>;
