//! Plain-text and JSON rendering for command results.

use chrono::NaiveDate;
use kana_core::record::PracticeRecord;
use kana_sync::{SyncStatus, sweeper::SweepReport};

use crate::settings::Settings;

pub fn print_records(records: &[PracticeRecord], json: bool) -> anyhow::Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(records)?);
    return Ok(());
  }

  if records.is_empty() {
    println!("no records");
    return Ok(());
  }

  for r in records {
    let mark = if r.is_correct { "o" } else { "x" };
    let audio = match (&r.audio_remote_url, &r.audio_local_path) {
      (Some(url), _) => url.clone(),
      (None, Some(path)) => path.display().to_string(),
      (None, None) => "-".to_string(),
    };
    println!(
      "{}  {}  {mark}  {:>6.2}s  {}  {audio}",
      r.timestamp.format("%Y-%m-%d %H:%M:%S"),
      r.character,
      r.response_time,
      r.id,
    );
  }
  Ok(())
}

pub fn print_status(status: &SyncStatus) {
  let last = status
    .last_sync_at
    .map(|t| t.to_rfc3339())
    .unwrap_or_else(|| "never".to_string());
  println!(
    "pending {}  synced {}  failed {}  dead-lettered {}  last sync {last}",
    status.pending, status.synced_total, status.failed_total, status.dead_lettered,
  );
}

pub fn print_sweep(report: &SweepReport) {
  println!("cutoff         {}", report.cutoff.to_rfc3339());
  println!("local removed  {}", report.local_removed);
  if report.local_errors > 0 {
    println!("local errors   {}", report.local_errors);
  }
  println!(
    "remote delete  {}",
    if report.remote_ok { "ok" } else { "failed" }
  );
}

pub fn print_config(settings: &Settings) {
  let sync = &settings.sync;
  println!("store          {}", settings.store_path.display());
  println!("remote         {}", settings.remote.url);
  println!("batch size     {}", sync.batch_size);
  println!("retry delay    {}s", sync.retry_delay_secs);
  println!(
    "max attempts   {}",
    if sync.max_attempts == 0 { "unbounded".to_string() } else { sync.max_attempts.to_string() }
  );
  println!("retention      {} days", sync.retention_days);
  println!("history        {} days", sync.history_days);
  println!("upload audio   {}", sync.upload_audio);
}

pub fn print_partitions(user: &str, partitions: &[(NaiveDate, usize)]) {
  if partitions.is_empty() {
    println!("no local records for {user}");
    return;
  }
  println!("local records for {user}:");
  for (date, count) in partitions {
    println!("  {date}  {count}");
  }
}
