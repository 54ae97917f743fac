//! Completion settings, read from the `[completion]` table of the console
//! config.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
  /// Argument names sorted lexicographically.
  #[default]
  Lexicographic,
  /// Argument names in the order the command defines them.
  Definition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Matching {
  /// Candidates must start with the typed text.
  #[default]
  Prefix,
  /// Candidates are ranked by fuzzy score against the typed text.
  Fuzzy,
}

impl Matching {
  pub fn is_fuzzy(&self) -> bool {
    matches!(self, Self::Fuzzy)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CompletionConfig {
  pub sort:           SortOrder,
  pub matching:       Matching,
  /// Upper bound on the number of candidates returned for one request.
  pub max_candidates: Option<usize>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid completion config: {0}")]
  Toml(#[from] toml::de::Error),
}

impl CompletionConfig {
  pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(source)?)
  }

  /// Truncates `items` to `max_candidates`.
  pub fn limit<T>(&self, items: &mut Vec<T>) {
    if let Some(max) = self.max_candidates {
      items.truncate(max);
    }
  }
}
