//! [`LocalRecordStore`]: the day-partitioned local record log.
//!
//! Each partition is a JSON array stored under one key of the underlying
//! [`LocalStore`]. Appends are read-modify-write with no atomicity across the
//! read and the write, so the store assumes a single producer per process.

use std::sync::Arc;

use chrono::NaiveDate;
use kana_core::{partition::PartitionKey, record::PracticeRecord, store::LocalStore};

use crate::{Error, Result};

pub struct LocalRecordStore<L> {
  store: Arc<L>,
}

impl<L> Clone for LocalRecordStore<L> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

impl<L: LocalStore> LocalRecordStore<L> {
  pub fn new(store: Arc<L>) -> Self { Self { store } }

  /// Append `record` to its user's partition for the record's UTC day.
  pub async fn append(&self, record: &PracticeRecord) -> Result<()> {
    let key = PartitionKey::for_timestamp(record.user_id.clone(), record.timestamp);
    let mut records = self.read_partition(&key).await?;
    records.push(record.clone());

    let value = serde_json::to_string(&records)?;
    self
      .store
      .set(key.to_string(), value)
      .await
      .map_err(Error::local)?;

    tracing::debug!(%key, count = records.len(), "appended practice record");
    Ok(())
  }

  /// Records stored for `user_id` on `date`, in append order.
  pub async fn read_day(&self, user_id: &str, date: NaiveDate) -> Result<Vec<PracticeRecord>> {
    self.read_partition(&PartitionKey::new(user_id, date)).await
  }

  /// Dates with a local partition for `user_id`, oldest first, with the
  /// number of records each holds.
  pub async fn partitions(&self, user_id: &str) -> Result<Vec<(NaiveDate, usize)>> {
    let mut keys: Vec<PartitionKey> = self
      .store
      .keys()
      .await
      .map_err(Error::local)?
      .iter()
      .filter_map(|k| PartitionKey::parse_for_user(k, user_id).ok().flatten())
      .collect();
    keys.sort_by_key(|k| k.date);

    let mut out = Vec::with_capacity(keys.len());
    for key in keys {
      let count = self.read_partition(&key).await?.len();
      out.push((key.date, count));
    }
    Ok(out)
  }

  /// Absence and malformed JSON both read as an empty partition.
  async fn read_partition(&self, key: &PartitionKey) -> Result<Vec<PracticeRecord>> {
    let key_str = key.to_string();
    let Some(raw) = self.store.get(&key_str).await.map_err(Error::local)? else {
      return Ok(Vec::new());
    };

    match serde_json::from_str(&raw) {
      Ok(records) => Ok(records),
      Err(e) => {
        tracing::warn!(key = %key_str, error = %e, "discarding malformed partition");
        Ok(Vec::new())
      }
    }
  }
}
