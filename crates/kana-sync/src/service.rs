//! [`PracticeService`]: the entry point of the pipeline.
//!
//! Construct one per process with [`PracticeService::new`] and share it by
//! reference. The service owns the upload worker; call
//! [`PracticeService::shutdown`] to stop it and observe its exit.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use kana_core::{
  record::{NewPracticeRecord, PracticeRecord},
  remote::RemoteBackend,
  store::LocalStore,
};

use crate::{
  PipelineConfig, Result,
  history::HistoryReader,
  local::LocalRecordStore,
  status::SyncStatus,
  sweeper::{RetentionSweeper, SweepReport},
  uploader::BatchUploader,
  worker::SyncHandle,
};

pub struct PracticeService<L, R> {
  config:  PipelineConfig,
  local:   LocalRecordStore<L>,
  sweeper: RetentionSweeper<L, R>,
  history: HistoryReader<R>,
  sync:    SyncHandle<R>,
}

impl<L, R> PracticeService<L, R>
where
  L: LocalStore + 'static,
  R: RemoteBackend + 'static,
{
  /// Build the service and spawn its upload worker on the current runtime.
  pub fn new(local: Arc<L>, remote: Arc<R>, config: PipelineConfig) -> Self {
    let uploader = Arc::new(BatchUploader::new(remote.clone(), config.clone()));
    let sync = SyncHandle::spawn(uploader, config.retry_delay());

    Self {
      local: LocalRecordStore::new(local.clone()),
      sweeper: RetentionSweeper::new(local, remote.clone(), config.retention()),
      history: HistoryReader::new(remote),
      sync,
      config,
    }
  }

  pub fn config(&self) -> &PipelineConfig { &self.config }

  /// Record a practice attempt.
  ///
  /// Returns once the record is appended locally; the upload happens on the
  /// background worker. A local write failure is logged and the record is
  /// still queued for upload, so the caller never sees an error.
  pub async fn save_practice_data(&self, input: NewPracticeRecord) -> PracticeRecord {
    let record = PracticeRecord::create(input, Utc::now());

    if let Err(e) = self.local.append(&record).await {
      tracing::error!(id = %record.id, error = %e, "failed to save practice record locally");
    }

    self.sync.enqueue(record.clone()).await;
    record
  }

  /// Expire `user_id`'s records older than the retention window. Intended to
  /// run once at startup.
  pub async fn cleanup_old_data(&self, user_id: &str) -> SweepReport {
    self.sweeper.cleanup(user_id).await
  }

  /// Remote records of `user_id`, most recent first. `days` defaults to the
  /// configured history window. Empty on any failure.
  pub async fn practice_history(&self, user_id: &str, days: Option<u32>) -> Vec<PracticeRecord> {
    let days = days.unwrap_or(self.config.history_days);
    self.history.history(user_id, days).await
  }

  /// Records stored locally for `user_id` on `date`.
  pub async fn local_records(&self, user_id: &str, date: NaiveDate) -> Result<Vec<PracticeRecord>> {
    self.local.read_day(user_id, date).await
  }

  /// Local partitions of `user_id` with their record counts, oldest first.
  pub async fn local_partitions(&self, user_id: &str) -> Result<Vec<(NaiveDate, usize)>> {
    self.local.partitions(user_id).await
  }

  pub fn sync_status(&self) -> SyncStatus { self.sync.status() }

  /// Records the uploader gave up on.
  pub async fn dead_letters(&self) -> Vec<PracticeRecord> {
    self.sync.uploader().dead_letters().await
  }

  /// Resolve once every queued record has been synced or dead-lettered.
  pub async fn wait_idle(&self) { self.sync.wait_idle().await }

  /// Stop the upload worker and wait for it to exit.
  pub async fn shutdown(self) { self.sync.shutdown().await }
}
