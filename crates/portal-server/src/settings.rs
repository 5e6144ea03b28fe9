//! Runtime configuration, layered from an optional TOML file and `PORTAL_*`
//! environment variables.

use std::{path::PathBuf, time::Duration};

use portal_core::transfer::{DEFAULT_DESIGNATIONS, DesignationSet};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                   String,
  pub port:                   u16,
  /// SQLite file; `~/` is expanded and `:memory:` opens a scratch database.
  pub store_path:             PathBuf,
  /// Only used the first time the store is opened.
  pub admin_default_password: String,
  pub designations:           Vec<String>,
  /// Transaction submissions allowed per client per window.
  pub rate_limit_max:         usize,
  pub rate_limit_window_secs: u64,
  pub cors_allow_any:         bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                   "0.0.0.0".to_string(),
      port:                   5000,
      store_path:             PathBuf::from("portal.db"),
      admin_default_password: "admin123".to_string(),
      designations:           DEFAULT_DESIGNATIONS.iter().map(|d| d.to_string()).collect(),
      rate_limit_max:         5,
      rate_limit_window_secs: 15 * 60,
      cors_allow_any:         true,
    }
  }
}

impl ServerConfig {
  /// Read `file` (if it exists) and then the environment.
  pub fn load(file: PathBuf) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(
        config::Environment::with_prefix("PORTAL")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("designations"),
      )
      .build()?
      .try_deserialize()
  }

  pub fn designation_set(&self) -> DesignationSet { DesignationSet::new(&self.designations) }

  pub fn rate_limit_window(&self) -> Duration { Duration::from_secs(self.rate_limit_window_secs) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}
