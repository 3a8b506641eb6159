//! [`RetentionSweeper`]: expires practice records older than the retention
//! window, locally and remotely.
//!
//! The two deletions are independent: a failure on one side is logged and does
//! not stop the other, so the stores can disagree until the next sweep.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kana_core::{partition::PartitionKey, remote::RemoteBackend, store::LocalStore};

use crate::{Error, Result};

/// What a sweep did.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
  pub cutoff:        DateTime<Utc>,
  /// Local partitions deleted.
  pub local_removed: usize,
  /// Local partitions that could not be listed or deleted.
  pub local_errors:  usize,
  pub remote_ok:     bool,
}

pub struct RetentionSweeper<L, R> {
  local:     Arc<L>,
  remote:    Arc<R>,
  retention: chrono::Duration,
}

impl<L: LocalStore, R: RemoteBackend> RetentionSweeper<L, R> {
  pub fn new(local: Arc<L>, remote: Arc<R>, retention: chrono::Duration) -> Self {
    Self { local, remote, retention }
  }

  /// Sweep `user_id`'s records older than the retention window. Never fails;
  /// problems are logged and reflected in the report.
  pub async fn cleanup(&self, user_id: &str) -> SweepReport {
    self.cleanup_at(user_id, Utc::now()).await
  }

  /// [`cleanup`](Self::cleanup) with an explicit notion of "now".
  pub async fn cleanup_at(&self, user_id: &str, now: DateTime<Utc>) -> SweepReport {
    let cutoff = now.checked_sub_signed(self.retention).unwrap_or_else(|| {
      tracing::warn!(
        user_id,
        "retention window reaches past the representable range; keeping everything"
      );
      DateTime::<Utc>::MIN_UTC
    });
    let mut report = SweepReport {
      cutoff,
      local_removed: 0,
      local_errors: 0,
      remote_ok: false,
    };

    match self.sweep_local(user_id, cutoff, &mut report).await {
      Ok(()) => {}
      Err(e) => {
        report.local_errors += 1;
        tracing::error!(user_id, error = %e, "failed to list local partitions");
      }
    }

    match self.remote.delete_records_before(user_id, cutoff).await {
      Ok(()) => report.remote_ok = true,
      Err(e) => tracing::error!(user_id, error = %e, "failed to delete old remote records"),
    }

    tracing::info!(
      user_id,
      %cutoff,
      local_removed = report.local_removed,
      remote_ok = report.remote_ok,
      "retention sweep finished"
    );
    report
  }

  async fn sweep_local(
    &self,
    user_id: &str,
    cutoff: DateTime<Utc>,
    report: &mut SweepReport,
  ) -> Result<()> {
    let keys = self.local.keys().await.map_err(Error::local)?;

    for key in keys {
      let partition = match PartitionKey::parse_for_user(&key, user_id) {
        Ok(Some(p)) => p,
        Ok(None) => continue,
        Err(e) => {
          tracing::debug!(%key, error = %e, "skipping partition with unreadable date");
          continue;
        }
      };

      if partition.starts_at() >= cutoff {
        continue;
      }

      match self.local.remove(&key).await {
        Ok(()) => report.local_removed += 1,
        Err(e) => {
          report.local_errors += 1;
          tracing::error!(%key, error = %e, "failed to delete local partition");
        }
      }
    }
    Ok(())
  }
}
