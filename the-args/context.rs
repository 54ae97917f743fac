//! The console state that argument availability and completion read from.

/// Read-only view of the console session, implemented by the console.
///
/// Nothing in this crate mutates the context. Implementations must answer
/// without blocking: anything that needs the managed process is fetched ahead
/// of time and served from [`CommandContext::cached_values`].
pub trait CommandContext {
  /// Whether the console has an active session with the managed process.
  fn is_connected(&self) -> bool;

  /// The mode or sub-command currently selected, if any.
  fn mode(&self) -> Option<&str> {
    None
  }

  /// Pre-fetched values for a named value source such as `"deployments"`.
  fn cached_values(&self, _source: &str) -> Option<&[String]> {
    None
  }
}

/// A context with no session and no cached data.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disconnected;

impl CommandContext for Disconnected {
  fn is_connected(&self) -> bool {
    false
  }
}
