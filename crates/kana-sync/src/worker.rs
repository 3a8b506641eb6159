//! The background upload worker.
//!
//! A single spawned task owns the drain loop, so at most one cycle runs at a
//! time without any shared "is uploading" flag. Producers enqueue on the
//! [`BatchUploader`] and then send a wake-up over an unbounded channel.
//!
//! Loop:
//! - queue empty: sleep until a wake-up arrives;
//! - otherwise run one cycle, discard wake-ups that arrived during it, and if
//!   records remain wait `retry_delay` (cut short by a fresh wake-up).
//!
//! Dropping every sender closes the channel, which stops the loop after the
//! current cycle.

use std::{sync::Arc, time::Duration};

use kana_core::{record::PracticeRecord, remote::RemoteBackend};
use tokio::{
  sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError},
  task::JoinHandle,
};

use crate::{status::SyncStatus, uploader::BatchUploader};

/// Handle to a running upload worker.
pub struct SyncHandle<R> {
  uploader: Arc<BatchUploader<R>>,
  wake:     UnboundedSender<()>,
  task:     JoinHandle<()>,
}

impl<R: RemoteBackend + 'static> SyncHandle<R> {
  /// Spawn the worker onto the current tokio runtime.
  pub fn spawn(uploader: Arc<BatchUploader<R>>, retry_delay: Duration) -> Self {
    let (wake, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(uploader.clone(), rx, retry_delay));
    Self { uploader, wake, task }
  }

  /// Queue `record` and nudge the worker. Never waits on the network.
  pub async fn enqueue(&self, record: PracticeRecord) {
    self.uploader.enqueue(record).await;
    if self.wake.send(()).is_err() {
      tracing::error!("upload worker is gone; record stays queued until restart");
    }
  }

  pub fn uploader(&self) -> &BatchUploader<R> { &self.uploader }

  pub fn status(&self) -> SyncStatus { self.uploader.status() }

  /// Resolve once the queue is empty and no cycle is running.
  ///
  /// With `max_attempts = 0` and a backend that never recovers this never
  /// resolves; callers should bound it with a timeout.
  pub async fn wait_idle(&self) {
    let mut rx = self.uploader.subscribe();
    // The sender lives inside `uploader`, which we hold, so this cannot fail.
    let _ = rx.wait_for(SyncStatus::is_idle).await;
  }

  /// Stop the worker after its current cycle and wait for it to exit.
  ///
  /// Records still queued are dropped; their local copies remain.
  pub async fn shutdown(self) {
    let Self { uploader, wake, task } = self;
    drop(wake);
    if let Err(e) = task.await {
      tracing::error!(error = %e, "upload worker panicked");
    }
    let left = uploader.pending().await;
    if left > 0 {
      tracing::warn!(pending = left, "upload worker stopped with records still queued");
    }
  }
}

async fn run<R: RemoteBackend>(
  uploader: Arc<BatchUploader<R>>,
  mut wake: UnboundedReceiver<()>,
  retry_delay: Duration,
) {
  loop {
    if uploader.pending().await == 0 {
      match wake.recv().await {
        Some(()) => continue,
        None => break,
      }
    }

    uploader.run_cycle().await;

    loop {
      match wake.try_recv() {
        Ok(()) => {}
        Err(TryRecvError::Empty) => break,
        Err(TryRecvError::Disconnected) => return,
      }
    }

    if uploader.pending().await > 0 {
      tracing::debug!(delay = ?retry_delay, "records remain queued; scheduling retry");
      tokio::select! {
        () = tokio::time::sleep(retry_delay) => {}
        msg = wake.recv() => {
          if msg.is_none() {
            break;
          }
        }
      }
    }
  }
  tracing::debug!("upload worker stopped");
}
