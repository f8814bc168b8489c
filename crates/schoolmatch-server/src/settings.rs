//! Runtime configuration, deserialised from `config.toml` and `SCHOOLMATCH_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub connect_attempts:   u32,
  pub connect_backoff_ms: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               "0.0.0.0".to_string(),
      port:               8080,
      store_path:         PathBuf::from("schoolmatch.db"),
      connect_attempts:   10,
      connect_backoff_ms: 2000,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn connect_backoff(&self) -> Duration {
    Duration::from_millis(self.connect_backoff_ms)
  }

  /// The store path with a leading `~` expanded.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
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
