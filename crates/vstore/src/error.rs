use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] store::Error),
    #[error(transparent)]
    Codec(#[from] codec::Error),
    #[error("bad select expression {0:?}")]
    BadExpr(#[from] regex::Error),
    #[error("mount {mount} rejected the call: {source}")]
    Mount { mount: u64, source: anyhow::Error },
    #[error("write to {id} rejected by its owning mount ({ownership:?})")]
    OwnershipRejected { id: u64, ownership: crate::mount::Ownership },
    #[error("invalid query argument: {0}")]
    InvalidArgument(&'static str),
    #[error("no mount registered at {0:?}")]
    NoMount(String),
}

pub type Result<T> = std::result::Result<T, Error>;
