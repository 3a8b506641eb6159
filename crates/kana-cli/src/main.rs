//! `kana`: record and inspect hiragana practice attempts.
//!
//! Reads `kana.toml` (or the path given with `--config`) and `KANA__*`
//! environment variables, opens the local SQLite store, and talks to the
//! hosted backend configured under `[remote]`.
//!
//! # Usage
//!
//! ```text
//! kana record --user u1 --character あ --correct --response-time 1.2
//! kana history --user u1 --days 7
//! kana cleanup --user u1
//! kana local --user u1 --date 2024-05-01
//! kana status --user u1
//! ```

mod output;
mod settings;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use kana_core::record::{AiResult, NewPracticeRecord, PracticeMetadata};
use kana_remote::RestBackend;
use kana_store_sqlite::SqliteStore;
use kana_sync::PracticeService;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

type Service = PracticeService<SqliteStore, RestBackend>;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "kana", version, about = "Hiragana practice record pipeline")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "kana.toml", env = "KANA_CONFIG")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Save one practice attempt and wait for it to sync.
  Record(RecordArgs),
  /// Show synced records from the last few days.
  History {
    #[arg(long)]
    user: String,
    /// Days to look back. Defaults to the configured history window.
    #[arg(long)]
    days: Option<u32>,
    #[arg(long)]
    json: bool,
  },
  /// Delete local and remote records older than the retention window.
  Cleanup {
    #[arg(long)]
    user: String,
  },
  /// Show one day of locally stored records.
  Local {
    #[arg(long)]
    user: String,
    /// UTC calendar day (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    json: bool,
  },
  /// Show the effective configuration and, with `--user`, local partitions.
  Status {
    #[arg(long)]
    user: Option<String>,
  },
}

#[derive(Args)]
struct RecordArgs {
  #[arg(long)]
  user:          String,
  #[arg(long)]
  character:     String,
  /// The answer was correct.
  #[arg(long)]
  correct:       bool,
  /// Seconds taken to answer.
  #[arg(long)]
  response_time: f64,
  /// Path to a WAV recording of the attempt.
  #[arg(long)]
  audio:         Option<PathBuf>,
  /// Recognition confidence for the target character.
  #[arg(long)]
  confidence:    Option<f64>,
  #[arg(long, requires_all = ["level", "time_limit"])]
  stage:         Option<String>,
  #[arg(long)]
  level:         Option<u32>,
  #[arg(long)]
  time_limit:    Option<f64>,
  /// Give up waiting for the upload after this many seconds.
  #[arg(long, default_value_t = 30)]
  wait_secs:     u64,
}

impl RecordArgs {
  fn into_new_record(self) -> NewPracticeRecord {
    let metadata = match (self.stage, self.level, self.time_limit) {
      (Some(stage_type), Some(training_level), Some(time_limit)) => Some(PracticeMetadata {
        stage_type,
        training_level,
        time_limit,
      }),
      _ => None,
    };

    NewPracticeRecord {
      ai_result: self
        .confidence
        .map(|confidence| AiResult { confidence, top3: Vec::new() }),
      metadata,
      audio_local_path: self.audio,
      ..NewPracticeRecord::new(self.user, self.character, self.correct, self.response_time)
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  if let Some(parent) = settings.store_path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;
  let remote = RestBackend::new(settings.remote.clone()).context("failed to build backend client")?;

  let service = PracticeService::new(Arc::new(store), Arc::new(remote), settings.sync.clone());
  let result = run(&service, &settings, cli.command).await;
  service.shutdown().await;
  result
}

async fn run(service: &Service, settings: &Settings, command: Command) -> anyhow::Result<()> {
  match command {
    Command::Record(args) => {
      let wait = Duration::from_secs(args.wait_secs);
      let record = service.save_practice_data(args.into_new_record()).await;
      println!("saved {}", record.id);

      if tokio::time::timeout(wait, service.wait_idle()).await.is_err() {
        tracing::warn!("upload still pending after {wait:?}; the local copy is kept");
      }
      output::print_status(&service.sync_status());
    }

    Command::History { user, days, json } => {
      let records = service.practice_history(&user, days).await;
      output::print_records(&records, json)?;
    }

    Command::Cleanup { user } => {
      let report = service.cleanup_old_data(&user).await;
      output::print_sweep(&report);
    }

    Command::Local { user, date, json } => {
      let date = date.unwrap_or_else(|| Utc::now().date_naive());
      let records = service
        .local_records(&user, date)
        .await
        .context("failed to read local records")?;
      output::print_records(&records, json)?;
    }

    Command::Status { user } => {
      output::print_config(settings);
      if let Some(user) = user {
        let partitions = service
          .local_partitions(&user)
          .await
          .context("failed to list local partitions")?;
        output::print_partitions(&user, &partitions);
      }
    }
  }
  Ok(())
}
