//! [`HistoryReader`]: recent practice records for review screens.
//!
//! Reads go straight to the remote table; there is no local fallback. Any
//! failure reads as an empty history.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use kana_core::{record::PracticeRecord, remote::RemoteBackend};

pub struct HistoryReader<R> {
  remote: Arc<R>,
}

impl<R: RemoteBackend> HistoryReader<R> {
  pub fn new(remote: Arc<R>) -> Self { Self { remote } }

  /// Records of `user_id` from the last `days` days, most recent first.
  pub async fn history(&self, user_id: &str, days: u32) -> Vec<PracticeRecord> {
    self.history_at(user_id, days, Utc::now()).await
  }

  pub async fn history_at(
    &self,
    user_id: &str,
    days: u32,
    now: DateTime<Utc>,
  ) -> Vec<PracticeRecord> {
    let Some(since) = TimeDelta::try_days(i64::from(days)).and_then(|d| now.checked_sub_signed(d))
    else {
      tracing::warn!(user_id, days, "history window reaches past the representable range");
      return Vec::new();
    };

    let rows = match self.remote.select_records_since(user_id, since).await {
      Ok(rows) => rows,
      Err(e) => {
        tracing::warn!(user_id, error = %e, "failed to fetch practice history");
        return Vec::new();
      }
    };

    let mut records: Vec<PracticeRecord> = rows.into_iter().map(PracticeRecord::from).collect();
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    records
  }
}
