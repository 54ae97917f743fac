//! Argument resolution and tab-completion for console commands.
//!
//! A command registers an [`ArgumentSet`](argument::ArgumentSet). Every edit
//! of the input line is tokenized ([`command_line`]), resolved against that
//! set ([`parsed::ParsedArguments`]) and, on request, turned into completion
//! candidates ([`completion`]).

pub mod argument;
pub mod command_line;
pub mod completion;
pub mod config;
pub mod context;
pub mod fuzzy;
pub mod parsed;
pub mod policy;

pub use argument::{
  ArgumentDefinition,
  ArgumentKind,
  ArgumentSet,
  Availability,
  DefinitionError,
  Rule,
};
pub use command_line::{
  CommandLine,
  Token,
  tokenize,
};
pub use completion::{
  Completion,
  CompletionContext,
  ValueCompleter,
  complete,
};
pub use config::CompletionConfig;
pub use context::CommandContext;
pub use parsed::{
  ParseProblem,
  ParsedArguments,
  ValueError,
};
