//! [`BatchUploader`]: drains the [`UploadQueue`] into the remote backend.
//!
//! One call to [`BatchUploader::run_cycle`] takes up to `batch_size` entries
//! from the front of the queue and submits them concurrently. Each submission
//! optionally uploads the recording, then inserts the metadata row. Failures
//! are isolated per record: a failed entry goes back to the queue (or to the
//! dead-letter list once it has used up its attempts) without affecting its
//! siblings.

use std::{io, sync::Arc};

use chrono::Utc;
use futures::future::join_all;
use kana_core::{
  record::PracticeRecord,
  remote::{PracticeRow, RemoteBackend, audio_object_key},
};
use tokio::sync::{Mutex, watch};

use crate::{
  Error, PipelineConfig, Result,
  queue::{PendingUpload, UploadQueue},
  status::SyncStatus,
};

/// What a single upload cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
  pub dequeued:      usize,
  pub synced:        usize,
  pub requeued:      usize,
  pub dead_lettered: usize,
}

enum Outcome {
  Synced,
  Failed(PendingUpload),
}

pub struct BatchUploader<R> {
  remote:       Arc<R>,
  config:       PipelineConfig,
  queue:        Mutex<UploadQueue>,
  /// Held for the whole of a cycle so that cycles never overlap.
  cycle:        Mutex<()>,
  dead_letters: Mutex<Vec<PracticeRecord>>,
  status:       watch::Sender<SyncStatus>,
}

impl<R: RemoteBackend> BatchUploader<R> {
  pub fn new(remote: Arc<R>, config: PipelineConfig) -> Self {
    Self {
      remote,
      config,
      queue: Mutex::new(UploadQueue::new()),
      cycle: Mutex::new(()),
      dead_letters: Mutex::new(Vec::new()),
      status: watch::Sender::new(SyncStatus::default()),
    }
  }

  /// Push `record` onto the back of the queue.
  ///
  /// This only queues; waking the worker is the caller's job.
  pub async fn enqueue(&self, record: PracticeRecord) {
    let mut queue = self.queue.lock().await;
    queue.enqueue(record);
    let pending = queue.len();
    self.status.send_modify(|s| s.pending = pending);
  }

  pub async fn pending(&self) -> usize { self.queue.lock().await.len() }

  pub fn status(&self) -> SyncStatus { self.status.borrow().clone() }

  pub fn subscribe(&self) -> watch::Receiver<SyncStatus> { self.status.subscribe() }

  /// Records that exhausted their attempts, oldest first.
  pub async fn dead_letters(&self) -> Vec<PracticeRecord> {
    self.dead_letters.lock().await.clone()
  }

  /// Run one upload cycle and wait for every record in the batch to settle.
  ///
  /// Concurrent callers are serialised; a second call waits for the first
  /// cycle to finish and then drains whatever is left.
  pub async fn run_cycle(&self) -> CycleReport {
    let _cycle = self.cycle.lock().await;

    let batch = {
      let mut queue = self.queue.lock().await;
      let batch = queue.dequeue_batch(self.config.effective_batch_size());
      if batch.is_empty() {
        return CycleReport::default();
      }
      let pending = queue.len();
      self.status.send_modify(|s| {
        s.pending = pending;
        s.syncing = true;
      });
      batch
    };

    let mut report = CycleReport { dequeued: batch.len(), ..Default::default() };
    tracing::debug!(batch = batch.len(), "starting upload cycle");

    let outcomes = join_all(batch.into_iter().map(|p| self.submit(p))).await;

    let mut failed = Vec::new();
    for outcome in outcomes {
      match outcome {
        Outcome::Synced => report.synced += 1,
        Outcome::Failed(mut pending) => {
          pending.attempts += 1;
          failed.push(pending);
        }
      }
    }

    let mut dead = Vec::new();
    let mut queue = self.queue.lock().await;
    for pending in failed {
      if self.config.max_attempts != 0 && pending.attempts >= self.config.max_attempts {
        tracing::warn!(
          id = %pending.record.id,
          attempts = pending.attempts,
          "giving up on practice record; it remains in local storage"
        );
        dead.push(pending.record);
      } else {
        queue.requeue(pending);
        report.requeued += 1;
      }
    }
    report.dead_lettered = dead.len();
    if !dead.is_empty() {
      self.dead_letters.lock().await.extend(dead);
    }

    let pending = queue.len();
    self.status.send_modify(|s| {
      s.pending = pending;
      s.syncing = false;
      s.synced_total += report.synced as u64;
      s.failed_total += (report.requeued + report.dead_lettered) as u64;
      s.dead_lettered += report.dead_lettered as u64;
      if report.synced > 0 {
        s.last_sync_at = Some(Utc::now());
      }
    });
    drop(queue);

    tracing::info!(
      synced = report.synced,
      requeued = report.requeued,
      dead_lettered = report.dead_lettered,
      pending,
      "upload cycle finished"
    );
    report
  }

  async fn submit(&self, mut pending: PendingUpload) -> Outcome {
    if self.config.upload_audio && pending.record.needs_audio_upload() {
      match self.upload_recording(&pending.record).await {
        // Kept on the queued copy so a later retry skips the upload.
        Ok(Some(url)) => pending.record.audio_remote_url = Some(url),
        Ok(None) => {}
        Err(e) => {
          tracing::warn!(id = %pending.record.id, error = %e, "recording upload failed; will retry");
          return Outcome::Failed(pending);
        }
      }
    }

    let row = PracticeRow::from(&pending.record);
    match self.remote.insert_record(&row).await {
      Ok(()) => {
        tracing::debug!(id = %row.id, "practice record synced");
        Outcome::Synced
      }
      Err(e) => {
        tracing::warn!(id = %row.id, error = %e, "practice record insert failed; will retry");
        Outcome::Failed(pending)
      }
    }
  }

  /// Upload the record's recording and return its public URL.
  ///
  /// A recording that no longer exists on disk yields `Ok(None)`: retrying
  /// cannot bring it back, so the row is inserted without audio.
  async fn upload_recording(&self, record: &PracticeRecord) -> Result<Option<String>> {
    let Some(path) = record.audio_local_path.as_deref() else {
      return Ok(None);
    };

    let bytes = match tokio::fs::read(path).await {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        tracing::warn!(id = %record.id, path = %path.display(), "recording missing; syncing without audio");
        return Ok(None);
      }
      Err(source) => return Err(Error::Recording { path: path.to_owned(), source }),
    };

    let key = audio_object_key(&record.id);
    let url = self
      .remote
      .upload_audio(&key, bytes)
      .await
      .map_err(Error::remote)?;
    Ok(Some(url))
  }
}
