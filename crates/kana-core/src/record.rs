//! The practice record: one logged attempt at recognising or producing a
//! character.
//!
//! Records are immutable once created: the identifier is assigned exactly once
//! by [`PracticeRecord::create`]. The only field that changes after creation
//! is [`PracticeRecord::audio_remote_url`], which the uploader fills in once
//! the recording has reached object storage.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of the random suffix appended to generated record identifiers.
const ID_SUFFIX_LEN: usize = 9;

// ─── AI result ───────────────────────────────────────────────────────────────

/// One ranked alternative produced by the recognition model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterConfidence {
  pub character:  String,
  pub confidence: f64,
}

/// Confidence data attached to an attempt that was scored by the speech model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiResult {
  /// Confidence of the best candidate.
  pub confidence: f64,
  /// Best candidates, most confident first.
  #[serde(default)]
  pub top3:       Vec<CharacterConfidence>,
}

// ─── Metadata ────────────────────────────────────────────────────────────────

/// Contextual tags describing where in the game the attempt happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeMetadata {
  pub stage_type:     String,
  pub training_level: u32,
  /// Seconds allowed for the answer.
  pub time_limit:     f64,
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Caller-supplied input for a new practice attempt.
///
/// The identifier and creation timestamp are assigned by
/// [`PracticeRecord::create`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewPracticeRecord {
  pub user_id:          String,
  pub character:        String,
  pub is_correct:       bool,
  /// Response time in seconds.
  pub response_time:    f64,
  pub audio_local_path: Option<PathBuf>,
  pub ai_result:        Option<AiResult>,
  pub metadata:         Option<PracticeMetadata>,
}

impl NewPracticeRecord {
  /// A minimal attempt with no audio, AI result, or metadata.
  pub fn new(
    user_id: impl Into<String>,
    character: impl Into<String>,
    is_correct: bool,
    response_time: f64,
  ) -> Self {
    Self {
      user_id: user_id.into(),
      character: character.into(),
      is_correct,
      response_time,
      audio_local_path: None,
      ai_result: None,
      metadata: None,
    }
  }
}

/// A persisted practice attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeRecord {
  pub id:               String,
  pub user_id:          String,
  pub character:        String,
  pub is_correct:       bool,
  pub response_time:    f64,
  pub timestamp:        DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub audio_local_path: Option<PathBuf>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub audio_remote_url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ai_result:        Option<AiResult>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub metadata:         Option<PracticeMetadata>,
}

impl PracticeRecord {
  /// Build a record from `input`, stamping it with `now` and a fresh
  /// identifier.
  pub fn create(input: NewPracticeRecord, now: DateTime<Utc>) -> Self {
    Self {
      id:               generate_id(&input.user_id, now),
      user_id:          input.user_id,
      character:        input.character,
      is_correct:       input.is_correct,
      response_time:    input.response_time,
      timestamp:        now,
      audio_local_path: input.audio_local_path,
      audio_remote_url: None,
      ai_result:        input.ai_result,
      metadata:         input.metadata,
    }
  }

  /// Whether this attempt carries a recording that has not reached object
  /// storage yet.
  pub fn needs_audio_upload(&self) -> bool {
    self.audio_local_path.is_some() && self.audio_remote_url.is_none()
  }
}

/// Generate a record identifier of the form
/// `<user_id>_<unix_millis>_<random suffix>`.
pub fn generate_id(user_id: &str, now: DateTime<Utc>) -> String {
  let random = Uuid::new_v4().simple().to_string();
  format!(
    "{user_id}_{}_{}",
    now.timestamp_millis(),
    &random[..ID_SUFFIX_LEN]
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn generated_id_embeds_user_and_millis() {
    let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
    let id = generate_id("u1", now);

    let parts: Vec<&str> = id.split('_').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "u1");
    assert_eq!(parts[1], "1700000000123");
    assert_eq!(parts[2].len(), ID_SUFFIX_LEN);
  }

  #[test]
  fn generated_ids_are_unique() {
    let now = Utc::now();
    assert_ne!(generate_id("u1", now), generate_id("u1", now));
  }

  #[test]
  fn create_assigns_timestamp_and_leaves_remote_url_empty() {
    let now = Utc::now();
    let mut input = NewPracticeRecord::new("u1", "あ", true, 1.2);
    input.audio_local_path = Some("/tmp/a.wav".into());

    let record = PracticeRecord::create(input, now);
    assert_eq!(record.timestamp, now);
    assert!(record.id.starts_with("u1_"));
    assert!(record.audio_remote_url.is_none());
    assert!(record.needs_audio_upload());
  }

  #[test]
  fn json_uses_camel_case_and_omits_absent_fields() {
    let record = PracticeRecord::create(
      NewPracticeRecord::new("u1", "あ", true, 1.2),
      Utc::now(),
    );
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["userId"], "u1");
    assert_eq!(json["isCorrect"], true);
    assert_eq!(json["responseTime"], 1.2);
    assert!(json.get("audioLocalPath").is_none());
    assert!(json.get("aiResult").is_none());
  }

  #[test]
  fn metadata_round_trips_through_json() {
    let mut input = NewPracticeRecord::new("u1", "か", false, 3.5);
    input.metadata = Some(PracticeMetadata {
      stage_type:     "beginner".into(),
      training_level: 2,
      time_limit:     5.0,
    });
    input.ai_result = Some(AiResult {
      confidence: 0.42,
      top3:       vec![
        CharacterConfidence { character: "か".into(), confidence: 0.42 },
        CharacterConfidence { character: "が".into(), confidence: 0.31 },
      ],
    });
    let record = PracticeRecord::create(input, Utc::now());

    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains("\"stageType\":\"beginner\""));
    let back: PracticeRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
  }
}
