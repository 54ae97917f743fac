//! A management console built on `the-args`: built-in commands, session
//! state, config file and the input loop behind the `the-console` binary.

pub mod commands;
pub mod config;
pub mod console;
pub mod ctx;
pub mod registry;

pub use config::ConsoleConfig;
pub use console::{
  Console,
  Outcome,
};
pub use ctx::ConsoleContext;
pub use registry::{
  CommandError,
  CommandRegistry,
  TypableCommand,
};
