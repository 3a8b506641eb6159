//! Observable state of the upload pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Snapshot of the upload pipeline, published on a `watch` channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncStatus {
  /// Records waiting in the upload queue.
  pub pending:       usize,
  /// Whether an upload cycle is in progress.
  pub syncing:       bool,
  /// When a cycle last synced at least one record.
  pub last_sync_at:  Option<DateTime<Utc>>,
  pub synced_total:  u64,
  /// Failed submissions, counting every retry.
  pub failed_total:  u64,
  pub dead_lettered: u64,
}

impl SyncStatus {
  /// Nothing queued and no cycle running.
  pub fn is_idle(&self) -> bool { self.pending == 0 && !self.syncing }
}
