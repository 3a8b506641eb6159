//! Error type for `kana-remote`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("{operation} request failed: {source}")]
  Transport {
    operation: &'static str,
    #[source]
    source:    reqwest::Error,
  },

  #[error("{operation} → {status}: {body}")]
  Status {
    operation: &'static str,
    status:    StatusCode,
    body:      String,
  },

  #[error("deserialising {operation} response: {source}")]
  Decode {
    operation: &'static str,
    #[source]
    source:    reqwest::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
