use thiserror::Error;

/// The unified error categories §7 names, with a `#[from]` conversion from
/// each subsystem's local error. Library code inside this workspace returns
/// the local error of the crate it's in (`store::Error`, `vstore::Error`,
/// …); this enum exists for the CLI surface and for anything that must
/// report across subsystem boundaries in terms of the categories §7 defines
/// rather than a specific crate's vocabulary.
#[derive(Error, Debug)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Raised during bootstrap (§4.A metamodel size mismatch); callers
    /// observing this outside of bootstrap have found a broken invariant.
    /// `metamodel::bootstrap::BUILTINS_REGISTRY` aborts the process itself
    /// on this category before it would ever reach here — this variant
    /// exists so `Error` can still represent it as a value, e.g. for a
    /// `runtime::start` caller's own bootstrap-adjacent checks.
    #[error("internal error: {0}")]
    Internal(String),

    /// A mount (or other external collaborator reached through `vstore`)
    /// reported failure; carries the mount's originator tag so user code
    /// can identify the failing mount (§7: "errors crossing a dispatcher
    /// boundary carry the mount's originator tag").
    #[error("backend error ({origin}): {source}")]
    BackendError {
        origin: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<store::Error> for Error {
    fn from(err: store::Error) -> Error {
        match err {
            store::Error::NotFound { path } => Error::NotFound(path),
            store::Error::TypeMismatch { name } | store::Error::NameConflict { name } => {
                Error::TypeMismatch(name)
            }
            store::Error::Deleted { name } => Error::InvalidState(format!("'{name}' is deleted")),
            store::Error::InvalidTransition { name, from, to } => {
                Error::InvalidState(format!("'{name}': {from:?} -> {to:?} is not a legal transition"))
            }
            store::Error::InvalidPath { segment, reason } => {
                Error::InvalidArgument(format!("'{segment}': {reason}"))
            }
            store::Error::Delegate { name, source } => {
                Error::Internal(format!("delegate failed for '{name}': {source}"))
            }
            store::Error::Shape(source) => Error::InvalidArgument(source.to_string()),
        }
    }
}

impl From<metamodel::Error> for Error {
    fn from(err: metamodel::Error) -> Error {
        match err {
            metamodel::Error::TypeMismatch(name) => Error::TypeMismatch(name),
            metamodel::Error::UnknownMember(name) => Error::NotFound(name),
            metamodel::Error::InvalidModifiers { member, detail } => {
                Error::InvalidArgument(format!("'{member}': {detail}"))
            }
            metamodel::Error::Internal { name, .. } => {
                Error::Internal(format!("bootstrap layout mismatch for '{name}'"))
            }
            metamodel::Error::Delegate(detail) => Error::Internal(detail),
        }
    }
}

impl From<walker::Error> for Error {
    fn from(err: walker::Error) -> Error {
        Error::InvalidArgument(err.to_string())
    }
}

impl From<codec::Error> for Error {
    fn from(err: codec::Error) -> Error {
        match err {
            codec::Error::UnsupportedContentType(ct) => {
                Error::InvalidArgument(format!("unsupported content type '{ct}'"))
            }
            codec::Error::Unrepresentable { .. } | codec::Error::ShapeMismatch { .. } => {
                Error::InvalidArgument(err.to_string())
            }
            codec::Error::Json(source) => Error::InvalidArgument(source.to_string()),
        }
    }
}

impl From<vstore::Error> for Error {
    fn from(err: vstore::Error) -> Error {
        match err {
            vstore::Error::Store(source) => source.into(),
            vstore::Error::Codec(source) => source.into(),
            vstore::Error::BadExpr(source) => Error::InvalidArgument(source.to_string()),
            vstore::Error::Mount { mount, source } => Error::BackendError {
                origin: mount.to_string(),
                source,
            },
            vstore::Error::OwnershipRejected { id, ownership } => {
                Error::Conflict(format!("write to {id} rejected by its owning mount ({ownership:?})"))
            }
            vstore::Error::InvalidArgument(detail) => Error::InvalidArgument(detail.to_string()),
            vstore::Error::NoMount(detail) => Error::NotFound(detail),
        }
    }
}
