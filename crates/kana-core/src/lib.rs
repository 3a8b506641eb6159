//! Core types and trait definitions for the Kana practice pipeline.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends and the sync pipeline depend on it; it depends on nothing
//! proprietary.

pub mod error;
pub mod partition;
pub mod record;
pub mod remote;
pub mod store;

pub use error::{Error, Result};
