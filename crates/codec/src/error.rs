use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("content type {0:?} has no registered codec")]
    UnsupportedContentType(String),
    #[error("value of kind {kind} cannot be represented as JSON scalar")]
    Unrepresentable { kind: &'static str },
    #[error("JSON does not match the shape of type {ty}: {reason}")]
    ShapeMismatch { ty: String, reason: &'static str },
    #[error("failed to parse JSON payload")]
    Json(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
