//! The `LocalStore` trait: durable key-value storage on the device.
//!
//! The trait is implemented by storage backends (e.g. `kana-store-sqlite`).
//! The sync pipeline depends on this abstraction, not on any concrete backend.
//! Keys and values are plain strings; callers own the encoding.

use std::future::Future;

/// Abstraction over a string key-value store.
///
/// Each individual operation is atomic, but there is no transaction spanning
/// several calls. All methods return `Send` futures so the trait can be used
/// from multi-threaded async runtimes.
pub trait LocalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the value stored at `key`. Returns `None` if absent.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Store `value` at `key`, replacing any previous value.
  fn set(
    &self,
    key: String,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete `key`. Deleting an absent key is not an error.
  fn remove<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// List every key currently stored.
  fn keys(&self) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;
}
