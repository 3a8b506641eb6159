//! Settings file and environment handling.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use kana_remote::RestConfig;
use kana_sync::PipelineConfig;
use serde::Deserialize;

/// Runtime settings, deserialised from `kana.toml` layered under `KANA__*`
/// environment variables.
#[derive(Deserialize)]
pub struct Settings {
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  pub remote:     RestConfig,
  #[serde(default)]
  pub sync:       PipelineConfig,
}

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/kana/practice.sqlite") }

impl Settings {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(
        config::Environment::with_prefix("KANA")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    let mut settings: Settings = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    settings.store_path = expand_tilde(&settings.store_path);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn expand_tilde_leaves_absolute_paths() {
    let p = Path::new("/var/lib/kana.sqlite");
    assert_eq!(expand_tilde(p), p);
  }

  #[test]
  fn expand_tilde_uses_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/kana.sqlite")),
      PathBuf::from(home).join("kana.sqlite")
    );
  }

  #[test]
  fn loads_toml_with_defaults() {
    let dir = std::env::temp_dir().join(format!("kana-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("kana.toml");
    std::fs::write(
      &path,
      r#"
store_path = "/tmp/kana-test.sqlite"

[remote]
url = "https://example.supabase.co"
api_key = "anon"

[sync]
batch_size = 3
"#,
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.store_path, PathBuf::from("/tmp/kana-test.sqlite"));
    assert_eq!(settings.remote.url, "https://example.supabase.co");
    assert_eq!(settings.remote.timeout_secs, 30);
    assert_eq!(settings.sync.batch_size, 3);
    assert_eq!(settings.sync.retention_days, 21);

    let _ = std::fs::remove_dir_all(&dir);
  }
}
