//! Error type for `kana-sync`.
//!
//! Backend errors are boxed so the pipeline stays generic over its
//! [`LocalStore`](kana_core::store::LocalStore) and
//! [`RemoteBackend`](kana_core::remote::RemoteBackend).

use std::path::PathBuf;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("local store error: {0}")]
  Local(#[source] BoxError),

  #[error("remote backend error: {0}")]
  Remote(#[source] BoxError),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("reading recording {path:?}: {source}")]
  Recording {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl Error {
  pub(crate) fn local(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Local(Box::new(e))
  }

  pub(crate) fn remote(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Remote(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
