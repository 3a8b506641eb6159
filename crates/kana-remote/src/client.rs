//! Async HTTP client for the hosted backend's REST surface.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use kana_core::remote::{
  AUDIO_BUCKET, AUDIO_CONTENT_TYPE, PracticeRow, RECORDS_TABLE, RemoteBackend,
};
use reqwest::{Client, RequestBuilder, Response, header};
use serde::Deserialize;

use crate::{Error, Result};

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, Deserialize)]
pub struct RestConfig {
  /// Project base URL, e.g. `https://xyz.supabase.co`.
  pub url:          String,
  /// Public API key sent as the `apikey` header.
  pub api_key:      String,
  /// User session token. Falls back to `api_key` when absent.
  #[serde(default)]
  pub access_token: Option<String>,
  /// Per-request timeout in seconds.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 { 30 }

/// [`RemoteBackend`] speaking PostgREST and the Storage API over HTTP.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct RestBackend {
  client: Client,
  config: RestConfig,
}

impl RestBackend {
  pub fn new(config: RestConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(Error::Client)?;
    Ok(Self { client, config })
  }

  fn base(&self) -> &str { self.config.url.trim_end_matches('/') }

  fn table_url(&self) -> String {
    format!("{}/rest/v1/{RECORDS_TABLE}", self.base())
  }

  fn object_url(&self, object_key: &str) -> String {
    format!("{}/storage/v1/object/{AUDIO_BUCKET}/{object_key}", self.base())
  }

  /// Public URL of an object in [`AUDIO_BUCKET`].
  pub fn public_url(&self, object_key: &str) -> String {
    format!(
      "{}/storage/v1/object/public/{AUDIO_BUCKET}/{object_key}",
      self.base()
    )
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    let token = self
      .config
      .access_token
      .as_deref()
      .unwrap_or(&self.config.api_key);
    req
      .header("apikey", &self.config.api_key)
      .bearer_auth(token)
  }

  async fn send(&self, operation: &'static str, req: RequestBuilder) -> Result<Response> {
    let resp = self
      .auth(req)
      .send()
      .await
      .map_err(|source| Error::Transport { operation, source })?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { operation, status, body });
    }
    Ok(resp)
  }
}

fn encode_ts(ts: DateTime<Utc>) -> String { ts.to_rfc3339_opts(SecondsFormat::Millis, true) }

// ─── RemoteBackend impl ──────────────────────────────────────────────────────

impl RemoteBackend for RestBackend {
  type Error = Error;

  /// `POST /storage/v1/object/practice-audio/<key>`
  async fn upload_audio(&self, object_key: &str, bytes: Vec<u8>) -> Result<String> {
    let req = self
      .client
      .post(self.object_url(object_key))
      .header(header::CONTENT_TYPE, AUDIO_CONTENT_TYPE)
      .header("x-upsert", "true")
      .body(bytes);

    self.send("upload audio", req).await?;
    tracing::debug!(object_key, "uploaded recording");
    Ok(self.public_url(object_key))
  }

  /// `POST /rest/v1/practice_records`
  async fn insert_record(&self, row: &PracticeRow) -> Result<()> {
    let req = self
      .client
      .post(self.table_url())
      .header("Prefer", "return=minimal")
      .json(row);

    self.send("insert practice record", req).await?;
    Ok(())
  }

  /// `DELETE /rest/v1/practice_records?user_id=eq.<u>&timestamp=lt.<cutoff>`
  async fn delete_records_before(&self, user_id: &str, cutoff: DateTime<Utc>) -> Result<()> {
    let req = self.client.delete(self.table_url()).query(&[
      ("user_id", format!("eq.{user_id}")),
      ("timestamp", format!("lt.{}", encode_ts(cutoff))),
    ]);

    self.send("delete practice records", req).await?;
    Ok(())
  }

  /// `GET /rest/v1/practice_records?select=*&user_id=eq.<u>&timestamp=gte.<since>&order=timestamp.desc`
  async fn select_records_since(
    &self,
    user_id: &str,
    since: DateTime<Utc>,
  ) -> Result<Vec<PracticeRow>> {
    let operation = "select practice records";
    let req = self.client.get(self.table_url()).query(&[
      ("select", "*".to_string()),
      ("user_id", format!("eq.{user_id}")),
      ("timestamp", format!("gte.{}", encode_ts(since))),
      ("order", "timestamp.desc".to_string()),
    ]);

    let resp = self.send(operation, req).await?;
    resp
      .json()
      .await
      .map_err(|source| Error::Decode { operation, source })
  }
}
