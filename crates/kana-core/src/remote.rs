//! The `RemoteBackend` trait and the row shape of the remote
//! `practice_records` table.
//!
//! The hosted backend is treated as an opaque API: an object store for audio
//! recordings plus one table of practice rows.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{AiResult, PracticeMetadata, PracticeRecord};

/// Storage bucket holding uploaded recordings.
pub const AUDIO_BUCKET: &str = "practice-audio";
/// Content type of uploaded recordings.
pub const AUDIO_CONTENT_TYPE: &str = "audio/wav";
/// Remote table holding practice rows.
pub const RECORDS_TABLE: &str = "practice_records";

/// Object key of the recording belonging to `record_id`, relative to
/// [`AUDIO_BUCKET`].
pub fn audio_object_key(record_id: &str) -> String { format!("{record_id}.wav") }

// ─── Row ─────────────────────────────────────────────────────────────────────

/// One row of the remote `practice_records` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeRow {
  pub id:            String,
  pub user_id:       String,
  pub character:     String,
  pub is_correct:    bool,
  pub response_time: f64,
  pub timestamp:     DateTime<Utc>,
  /// Always serialised; `null` when the attempt has no uploaded recording.
  #[serde(default)]
  pub audio_url:     Option<String>,
  #[serde(default)]
  pub ai_result:     Option<AiResult>,
  #[serde(default)]
  pub metadata:      Option<PracticeMetadata>,
}

impl From<&PracticeRecord> for PracticeRow {
  fn from(record: &PracticeRecord) -> Self {
    Self {
      id:            record.id.clone(),
      user_id:       record.user_id.clone(),
      character:     record.character.clone(),
      is_correct:    record.is_correct,
      response_time: record.response_time,
      timestamp:     record.timestamp,
      audio_url:     record.audio_remote_url.clone(),
      ai_result:     record.ai_result.clone(),
      metadata:      record.metadata.clone(),
    }
  }
}

impl From<PracticeRow> for PracticeRecord {
  fn from(row: PracticeRow) -> Self {
    Self {
      id:               row.id,
      user_id:          row.user_id,
      character:        row.character,
      is_correct:       row.is_correct,
      response_time:    row.response_time,
      timestamp:        row.timestamp,
      audio_local_path: None,
      audio_remote_url: row.audio_url,
      ai_result:        row.ai_result,
      metadata:         row.metadata,
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the hosted backend reached over the network.
pub trait RemoteBackend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Upload a recording to [`AUDIO_BUCKET`] under `object_key`, overwriting
  /// any previous object, and return its public URL.
  fn upload_audio<'a>(
    &'a self,
    object_key: &'a str,
    bytes: Vec<u8>,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// Insert one row into [`RECORDS_TABLE`].
  fn insert_record<'a>(
    &'a self,
    row: &'a PracticeRow,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete every row of `user_id` whose timestamp is strictly before
  /// `cutoff`.
  fn delete_records_before<'a>(
    &'a self,
    user_id: &'a str,
    cutoff: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Fetch every row of `user_id` whose timestamp is at or after `since`,
  /// most recent first.
  fn select_records_since<'a>(
    &'a self,
    user_id: &'a str,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<PracticeRow>, Self::Error>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::NewPracticeRecord;

  #[test]
  fn row_serialises_null_audio_url() {
    let record = PracticeRecord::create(NewPracticeRecord::new("u1", "あ", true, 1.2), Utc::now());
    let row = PracticeRow::from(&record);
    let json = serde_json::to_value(&row).unwrap();

    assert_eq!(json["user_id"], "u1");
    assert_eq!(json["is_correct"], true);
    assert!(json["audio_url"].is_null());
  }

  #[test]
  fn row_to_record_has_no_local_path() {
    let mut record =
      PracticeRecord::create(NewPracticeRecord::new("u1", "い", false, 2.0), Utc::now());
    record.audio_local_path = Some("/tmp/x.wav".into());
    record.audio_remote_url = Some("https://example.com/x.wav".into());

    let back = PracticeRecord::from(PracticeRow::from(&record));
    assert_eq!(back.audio_local_path, None);
    assert_eq!(back.audio_remote_url.as_deref(), Some("https://example.com/x.wav"));
    assert_eq!(back.id, record.id);
  }

  #[test]
  fn object_key_uses_record_id() {
    assert_eq!(audio_object_key("u1_1_abc"), "u1_1_abc.wav");
  }
}
