#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("'{name}' already exists in this scope with a different type")]
    TypeMismatch { name: String },

    #[error("name '{name}' already exists in this scope")]
    NameConflict { name: String },

    #[error("no object found at '{path}'")]
    NotFound { path: String },

    #[error("invalid transition {from:?} -> {to:?} for object '{name}'")]
    InvalidTransition {
        name: String,
        from: crate::state::State,
        to: crate::state::State,
    },

    #[error("object '{name}' is deleted")]
    Deleted { name: String },

    #[error("invalid path segment '{segment}': {reason}")]
    InvalidPath { segment: String, reason: &'static str },

    #[error("delegate failed for '{name}': {source}")]
    Delegate {
        name: String,
        #[source]
        source: metamodel::Error,
    },

    #[error("payload does not match its type's shape: {0}")]
    Shape(#[from] walker::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
