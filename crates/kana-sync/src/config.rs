//! Tunables of the pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Runtime configuration for [`PracticeService`](crate::PracticeService).
///
/// Deserialisable so that binaries can embed it in their own settings file;
/// every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
  /// Records submitted per upload cycle.
  pub batch_size:       usize,
  /// Pause before the next cycle while records remain queued.
  pub retry_delay_secs: u64,
  /// Failed submissions after which a record is dead-lettered.
  /// `0` retries forever.
  pub max_attempts:     u32,
  /// Age after which records are swept locally and remotely.
  pub retention_days:   u32,
  /// Default window of [`PracticeService::practice_history`](crate::PracticeService::practice_history).
  pub history_days:     u32,
  /// Upload recordings to object storage. Off in debug builds.
  pub upload_audio:     bool,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      batch_size:       5,
      retry_delay_secs: 5,
      max_attempts:     20,
      retention_days:   21,
      history_days:     7,
      upload_audio:     !cfg!(debug_assertions),
    }
  }
}

impl PipelineConfig {
  pub fn retry_delay(&self) -> Duration { Duration::from_secs(self.retry_delay_secs) }

  pub fn retention(&self) -> chrono::TimeDelta {
    chrono::TimeDelta::try_days(i64::from(self.retention_days)).unwrap_or(chrono::TimeDelta::MAX)
  }

  /// Batch size, never zero.
  pub fn effective_batch_size(&self) -> usize { self.batch_size.max(1) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let cfg = PipelineConfig::default();
    assert_eq!(cfg.batch_size, 5);
    assert_eq!(cfg.retry_delay(), Duration::from_secs(5));
    assert_eq!(cfg.retention(), chrono::Duration::days(21));
    assert_eq!(cfg.history_days, 7);
  }

  #[test]
  fn partial_json_fills_defaults() {
    let cfg: PipelineConfig =
      serde_json::from_str(r#"{"batch_size": 2, "max_attempts": 0}"#).unwrap();
    assert_eq!(cfg.batch_size, 2);
    assert_eq!(cfg.max_attempts, 0);
    assert_eq!(cfg.retention_days, 21);
  }

  #[test]
  fn huge_retention_does_not_overflow() {
    let cfg = PipelineConfig { retention_days: u32::MAX, ..Default::default() };
    assert_eq!(cfg.retention(), chrono::TimeDelta::days(i64::from(u32::MAX)));
  }

  #[test]
  fn zero_batch_size_is_clamped() {
    let cfg = PipelineConfig { batch_size: 0, ..Default::default() };
    assert_eq!(cfg.effective_batch_size(), 1);
  }
}
