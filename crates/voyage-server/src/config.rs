//! Runtime configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Runtime server configuration, deserialised from `config.toml` and
/// `VOYAGE_*` environment variables. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                          String,
  pub port:                          u16,
  pub store_path:                    PathBuf,
  /// Pending recommendation tasks held before new ones are dropped.
  pub recommendation_queue_capacity: usize,
  /// Header the authenticating proxy sets to the caller's owner id.
  pub identity_header:               String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                          "127.0.0.1".to_owned(),
      port:                          8080,
      store_path:                    PathBuf::from("~/.local/share/voyage/voyage.db"),
      recommendation_queue_capacity: 64,
      identity_header:               "x-owner-id".to_owned(),
    }
  }
}

#[cfg(test)]
mod tests {
  use ::config::{Config, File, FileFormat};

  use super::*;

  fn load(toml: &str) -> ServerConfig {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_file_gives_defaults() {
    let cfg = load("");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.identity_header, "x-owner-id");
    assert_eq!(cfg.recommendation_queue_capacity, 64);
  }

  #[test]
  fn file_overrides_individual_fields() {
    let cfg = load("port = 9000\nstore_path = \"/var/lib/voyage.db\"");
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/voyage.db"));
    assert_eq!(cfg.host, "127.0.0.1");
  }
}
