//! The console's TOML config file.
//!
//! ```toml
//! [completion]
//! sort = "definition"
//! matching = "fuzzy"
//! max-candidates = 50
//!
//! [session]
//! connected = true
//! mode = "domain"
//! controller = "localhost:9990"
//!
//! [cache]
//! cache-limit = 200
//!
//! [cache.sources]
//! deployments = ["app.war", "api.war"]
//! ```

use std::{
  collections::HashMap,
  io,
  path::{
    Path,
    PathBuf,
  },
};

use serde::Deserialize;
use the_args::CompletionConfig;
use thiserror::Error;

pub const DEFAULT_CACHE_LIMIT: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
  pub completion: CompletionConfig,
  pub session:    SessionConfig,
  pub cache:      CacheConfig,
}

/// The session state the console starts with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SessionConfig {
  pub connected:  bool,
  pub mode:       Option<String>,
  pub controller: Option<String>,
}

/// Values pre-fetched for completion, keyed by value source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CacheConfig {
  /// Most values kept per source.
  pub cache_limit: usize,
  pub sources:     HashMap<String, Vec<String>>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      cache_limit: DEFAULT_CACHE_LIMIT,
      sources:     HashMap::new(),
    }
  }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
  #[error("failed to read {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("invalid config {path}: {source}")]
  Toml {
    path:   PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

impl ConsoleConfig {
  pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(source)
  }

  /// Reads the config at `path`. A missing file yields the defaults.
  pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
    let source = match std::fs::read_to_string(path) {
      Ok(source) => source,
      Err(err) if err.kind() == io::ErrorKind::NotFound => {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Self::default());
      },
      Err(source) => {
        tracing::warn!(path = %path.display(), %source, "unreadable config file");
        return Err(ConfigLoadError::Io {
          path: path.to_path_buf(),
          source,
        });
      },
    };

    Self::from_toml(&source).map_err(|source| {
      tracing::warn!(path = %path.display(), %source, "invalid config file");
      ConfigLoadError::Toml {
        path: path.to_path_buf(),
        source,
      }
    })
  }
}
