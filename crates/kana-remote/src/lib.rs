//! REST backend for the Kana practice pipeline.
//!
//! Implements [`kana_core::remote::RemoteBackend`] over the HTTP dialect of a
//! Supabase-compatible project: PostgREST for the `practice_records` table and
//! the Storage API for recordings.

mod client;

pub mod error;

pub use client::{RestBackend, RestConfig};
pub use error::{Error, Result};
