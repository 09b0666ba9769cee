use chrono::Duration;
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECS};

pub const DEFAULT_GDC_URL: &str = "https://api.gdc.cancer.gov";

/// Upper bound on the configured TTL (100 years).
const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 3600;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub gdc: GdcConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GdcConfig {
  pub url: String,
  /// Hits requested per search page
  pub page_size: usize,
  /// Per-request timeout; a retrieval that exceeds it fails as an upstream error
  pub timeout_secs: u64,
}

impl Default for GdcConfig {
  fn default() -> Self {
    Self {
      url: DEFAULT_GDC_URL.to_string(),
      page_size: 1000,
      timeout_secs: 60,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// How long a case-set handle stays resolvable
  pub ttl_secs: u64,
  /// Entry count at which the entry closest to expiry is evicted
  pub max_entries: usize,
  /// Interval of the background purge of expired entries, 0 disables it
  pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      ttl_secs: DEFAULT_TTL_SECS as u64,
      max_entries: DEFAULT_MAX_ENTRIES,
      sweep_interval_secs: 300,
    }
  }
}

impl CacheConfig {
  pub fn ttl(&self) -> Duration {
    Duration::seconds(self.ttl_secs.min(MAX_TTL_SECS) as i64)
  }

  pub fn sweep_interval(&self) -> Option<std::time::Duration> {
    (self.sweep_interval_secs > 0).then(|| std::time::Duration::from_secs(self.sweep_interval_secs))
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./gdc-cases.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/gdc-cases/config.yaml
  ///
  /// Falls back to defaults when no file is found. `GDC_API_URL` overrides
  /// the configured API url.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };

    if let Ok(url) = std::env::var("GDC_API_URL") {
      config.gdc.url = url;
    }

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("gdc-cases.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("gdc-cases").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file deserializes to null, treat it as all defaults
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }
}
