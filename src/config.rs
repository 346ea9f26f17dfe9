//! Process configuration: defaults, then an optional TOML file named by
//! IPA_CONFIG_PATH, then environment variables.
//!
//! TOML schema (all keys optional):
//!
//! ```toml
//! port = 8080
//! criteria_file_path = "./criteria.json"
//! token_secret = "..."
//! secure_cookie = false
//! allowed_origin = "http://localhost:5173"
//! static_dir = "./static"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ConfigError;

pub const DEFAULT_TOKEN_SECRET: &str = "change-this-secret-in-production";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
  pub port: u16,
  pub criteria_file_path: PathBuf,
  pub token_secret: String,
  /// Mark the auth cookie `Secure` (HTTPS deployments).
  pub secure_cookie: bool,
  /// Single origin allowed by CORS, with credentials.
  pub allowed_origin: String,
  pub static_dir: PathBuf,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      port: 8080,
      criteria_file_path: "./criteria.json".into(),
      token_secret: DEFAULT_TOKEN_SECRET.into(),
      secure_cookie: false,
      allowed_origin: "http://localhost:5173".into(),
      static_dir: "./static".into(),
    }
  }
}

impl AppConfig {
  /// Build the config from IPA_CONFIG_PATH (if set) and the process environment.
  pub fn load() -> Result<Self, ConfigError> {
    let mut cfg = match std::env::var("IPA_CONFIG_PATH") {
      Ok(path) => Self::from_toml_file(Path::new(&path))?,
      Err(_) => Self::default(),
    };
    cfg.apply_overrides(|key| std::env::var(key).ok())?;
    if cfg.token_secret == DEFAULT_TOKEN_SECRET {
      warn!(target: "ipa_backend", "TOKEN_SECRET not set; using the built-in development secret");
    }
    Ok(cfg)
  }

  pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let cfg = toml::from_str::<AppConfig>(&s).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    info!(target: "ipa_backend", path = %path.display(), "Loaded config (TOML)");
    Ok(cfg)
  }

  /// Apply `PORT`, `CRITERIA_FILE_PATH`, `TOKEN_SECRET`, `SECURE_COOKIE`,
  /// `ALLOWED_ORIGIN` and `STATIC_DIR` from `lookup`.
  pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
    if let Some(v) = lookup("PORT") {
      self.port = v.parse().map_err(|_| ConfigError::InvalidValue { field: "PORT", value: v })?;
    }
    if let Some(v) = lookup("CRITERIA_FILE_PATH") {
      self.criteria_file_path = v.into();
    }
    if let Some(v) = lookup("TOKEN_SECRET").filter(|v| !v.is_empty()) {
      self.token_secret = v;
    }
    if let Some(v) = lookup("SECURE_COOKIE") {
      self.secure_cookie = match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => true,
        "0" | "false" | "no" => false,
        _ => return Err(ConfigError::InvalidValue { field: "SECURE_COOKIE", value: v }),
      };
    }
    if let Some(v) = lookup("ALLOWED_ORIGIN") {
      self.allowed_origin = v;
    }
    if let Some(v) = lookup("STATIC_DIR") {
      self.static_dir = v.into();
    }
    Ok(())
  }
}
