//! The practice-record durability pipeline.
//!
//! A practice attempt is first appended to a day-partitioned local log
//! ([`local::LocalRecordStore`]), then pushed onto a memory-only
//! [`queue::UploadQueue`]. A single background worker ([`worker`]) drains the
//! queue through the [`uploader::BatchUploader`], which submits each batch to
//! the remote backend concurrently and re-enqueues failures for a later cycle.
//! [`sweeper::RetentionSweeper`] expires old records on both sides and
//! [`history::HistoryReader`] serves recent records back.
//!
//! [`service::PracticeService`] wires all of it together behind one object
//! that callers construct once and pass around by reference.

pub mod config;
pub mod error;
pub mod history;
pub mod local;
pub mod queue;
pub mod service;
pub mod status;
pub mod sweeper;
pub mod uploader;
pub mod worker;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use service::PracticeService;
pub use status::SyncStatus;
