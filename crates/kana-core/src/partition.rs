//! Day partitions of the local record log.
//!
//! Local records are grouped per user and per UTC calendar day under keys of
//! the form `practice_<user_id>_<YYYY-MM-DD>`.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{Error, Result};

const KEY_PREFIX: &str = "practice_";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Identifies one user's records for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionKey {
  pub user_id: String,
  pub date:    NaiveDate,
}

impl PartitionKey {
  pub fn new(user_id: impl Into<String>, date: NaiveDate) -> Self {
    Self { user_id: user_id.into(), date }
  }

  /// The partition a record created at `timestamp` belongs to.
  pub fn for_timestamp(user_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
    Self::new(user_id, timestamp.date_naive())
  }

  /// Parse `key` as a partition belonging to `user_id`.
  ///
  /// Returns `Ok(None)` for keys of other users or other namespaces, and an
  /// error when the key is addressed to `user_id` but its date is invalid.
  /// User identifiers may themselves contain underscores, so ownership is
  /// decided by prefix rather than by splitting.
  pub fn parse_for_user(key: &str, user_id: &str) -> Result<Option<Self>> {
    let Some(date_str) = key
      .strip_prefix(KEY_PREFIX)
      .and_then(|rest| rest.strip_prefix(user_id))
      .and_then(|rest| rest.strip_prefix('_'))
    else {
      return Ok(None);
    };

    // `practice_u1_x_2024-01-01` belongs to user `u1_x`, not `u1`.
    if date_str.contains('_') {
      return Ok(None);
    }

    let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).map_err(|source| {
      Error::PartitionDate { key: key.to_owned(), source }
    })?;
    Ok(Some(Self::new(user_id, date)))
  }

  /// Start of the partition's day in UTC.
  pub fn starts_at(&self) -> DateTime<Utc> {
    self.date.and_time(chrono::NaiveTime::MIN).and_utc()
  }
}

impl fmt::Display for PartitionKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{KEY_PREFIX}{}_{}",
      self.user_id,
      self.date.format(DATE_FORMAT)
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn formats_key() {
    let key = PartitionKey::new("u1", date(2024, 3, 9));
    assert_eq!(key.to_string(), "practice_u1_2024-03-09");
  }

  #[test]
  fn timestamp_partition_uses_utc_day() {
    let ts = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap();
    assert_eq!(PartitionKey::for_timestamp("u1", ts).date, date(2024, 3, 9));
  }

  #[test]
  fn parse_for_user_matches_own_keys_only() {
    let own = PartitionKey::parse_for_user("practice_u1_2024-03-09", "u1").unwrap();
    assert_eq!(own, Some(PartitionKey::new("u1", date(2024, 3, 9))));

    assert_eq!(
      PartitionKey::parse_for_user("practice_u2_2024-03-09", "u1").unwrap(),
      None
    );
    assert_eq!(
      PartitionKey::parse_for_user("practice_u1_x_2024-03-09", "u1").unwrap(),
      None
    );
    assert_eq!(PartitionKey::parse_for_user("settings", "u1").unwrap(), None);
  }

  #[test]
  fn parse_for_user_rejects_bad_date() {
    assert!(PartitionKey::parse_for_user("practice_u1_yesterday", "u1").is_err());
  }

  #[test]
  fn starts_at_is_midnight_utc() {
    let key = PartitionKey::new("u1", date(2024, 3, 9));
    assert_eq!(key.starts_at(), Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap());
  }
}
