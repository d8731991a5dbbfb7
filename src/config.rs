use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::ClientError;

pub const DEFAULT_API_URL: &str = "http://localhost:3005";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
  pub api_url: String,
  pub session_token: String,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      api_url: DEFAULT_API_URL.to_string(),
      session_token: String::new(),
    }
  }
}

impl ClientConfig {
  pub fn session_token(&self) -> Option<String> {
    let token = self.session_token.trim();
    if token.is_empty() {
      None
    } else {
      Some(token.to_string())
    }
  }
}

pub fn current_dir_config_path() -> PathBuf {
  std::env::current_dir()
    .unwrap_or_else(|_| PathBuf::from("."))
    .join("config.json")
}

/// Missing files are created with defaults; unreadable ones fall back to defaults.
pub fn read_config(path: &Path) -> ClientConfig {
  match fs::read_to_string(path) {
    Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
      tracing::warn!("Ignoring invalid config at {}: {err}", path.display());
      ClientConfig::default()
    }),
    Err(_) => {
      let config = ClientConfig::default();
      let _ = write_config(path, &config);
      config
    }
  }
}

pub fn write_config(path: &Path, config: &ClientConfig) -> Result<(), ClientError> {
  let contents =
    serde_json::to_string_pretty(config).map_err(|e| ClientError::Config(e.to_string()))?;
  fs::write(path, contents).map_err(|e| ClientError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_config_is_created_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let config = read_config(&path);
    assert_eq!(config, ClientConfig::default());
    assert!(path.exists());
    assert_eq!(config.session_token(), None);
  }

  #[test]
  fn partial_config_keeps_defaults_for_missing_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "session_token": " tok " }"#).unwrap();
    let config = read_config(&path);
    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert_eq!(config.session_token().as_deref(), Some("tok"));
  }

  #[test]
  fn written_config_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let config = ClientConfig {
      api_url: "https://app.uvolution.ai".to_string(),
      session_token: "abc".to_string(),
    };
    write_config(&path, &config).unwrap();
    assert_eq!(read_config(&path), config);
  }
}
