//! Console session state.

use std::collections::HashMap;

use the_args::CommandContext;

use crate::config::{
  CacheConfig,
  SessionConfig,
};

#[derive(Debug, Clone)]
pub struct ConsoleContext {
  connected:   bool,
  mode:        Option<String>,
  controller:  Option<String>,
  cache:       HashMap<String, Vec<String>>,
  cache_limit: usize,
}

impl ConsoleContext {
  pub fn new(session: &SessionConfig, cache: &CacheConfig) -> Self {
    let mut ctx = Self {
      connected:   session.connected,
      mode:        session.mode.clone(),
      controller:  session.controller.clone(),
      cache:       HashMap::new(),
      cache_limit: cache.cache_limit,
    };
    for (source, values) in &cache.sources {
      ctx.prefetch(source, values.iter().cloned());
    }
    ctx
  }

  pub fn is_connected(&self) -> bool {
    self.connected
  }

  pub fn controller(&self) -> Option<&str> {
    self.controller.as_deref()
  }

  pub fn connect(&mut self, controller: Option<&str>) {
    if let Some(controller) = controller {
      self.controller = Some(controller.to_string());
    }
    self.connected = true;
    tracing::debug!(controller = ?self.controller, "connected");
  }

  pub fn disconnect(&mut self) {
    self.connected = false;
    tracing::debug!("disconnected");
  }

  pub fn set_mode(&mut self, mode: Option<&str>) {
    self.mode = mode.map(str::to_string);
  }

  /// Stores values for `source`, keeping at most `cache-limit` of them.
  pub fn prefetch(&mut self, source: &str, values: impl IntoIterator<Item = String>) {
    let values: Vec<_> = values.into_iter().take(self.cache_limit).collect();
    tracing::debug!(source, count = values.len(), "prefetched values");
    self.cache.insert(source.to_string(), values);
  }

  pub fn invalidate(&mut self, source: &str) {
    self.cache.remove(source);
  }
}

impl Default for ConsoleContext {
  fn default() -> Self {
    Self::new(&SessionConfig::default(), &CacheConfig::default())
  }
}

impl CommandContext for ConsoleContext {
  fn is_connected(&self) -> bool {
    self.connected
  }

  fn mode(&self) -> Option<&str> {
    self.mode.as_deref()
  }

  fn cached_values(&self, source: &str) -> Option<&[String]> {
    self.cache.get(source).map(Vec::as_slice)
  }
}
