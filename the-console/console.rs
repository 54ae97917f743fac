//! The line-oriented console: one input line in, one outcome out.

use std::fmt::Write;

use the_args::Completion;

use crate::{
  config::ConsoleConfig,
  ctx::ConsoleContext,
  registry::{
    CommandError,
    CommandRegistry,
    Invocation,
  },
};

#[derive(Debug)]
pub enum Outcome {
  Nothing,
  Output(String),
  Completions(Vec<Completion>),
  Quit,
}

#[derive(Debug)]
pub struct Console {
  registry: CommandRegistry,
  ctx:      ConsoleContext,
  config:   ConsoleConfig,
}

impl Console {
  pub fn new(registry: CommandRegistry, config: ConsoleConfig) -> Self {
    let ctx = ConsoleContext::new(&config.session, &config.cache);
    Self {
      registry,
      ctx,
      config,
    }
  }

  pub fn registry(&self) -> &CommandRegistry {
    &self.registry
  }

  pub fn ctx(&self) -> &ConsoleContext {
    &self.ctx
  }

  pub fn ctx_mut(&mut self) -> &mut ConsoleContext {
    &mut self.ctx
  }

  /// Completions for `input` with the cursor at byte `cursor`.
  pub fn complete(&self, input: &str, cursor: usize) -> Vec<Completion> {
    self
      .registry
      .complete_command_line(&self.ctx, input, cursor, &self.config.completion)
  }

  /// Handles one line of input. A line ending in `?` asks for completions of
  /// the text before it.
  pub fn handle_line(&mut self, line: &str) -> Result<Outcome, CommandError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
      return Ok(Outcome::Nothing);
    }
    if let Some(head) = line.strip_suffix('?') {
      return Ok(Outcome::Completions(self.complete(head, head.len())));
    }

    let invocation = self.registry.parse(line)?;
    let args = &invocation.args;
    tracing::debug!(command = invocation.command.name, "parsed command line");

    if args.has("--help") {
      return Ok(Outcome::Output(invocation.command.generate_doc()));
    }

    let outcome = match invocation.command.name {
      "connect" => {
        let controller = args.get("--controller").ok().flatten();
        self.ctx.connect(controller);
        Outcome::Output(format!(
          "connected to {}",
          self.ctx.controller().unwrap_or("the default controller")
        ))
      },
      "disconnect" => {
        self.ctx.disconnect();
        Outcome::Nothing
      },
      "mode" => {
        let mode = if args.has("--clear") {
          None
        } else {
          args.get("mode").ok().flatten()
        };
        self.ctx.set_mode(mode);
        Outcome::Nothing
      },
      "help" => {
        match args.get("command").ok().flatten() {
          Some(name) => {
            let command = self
              .registry
              .get(name)
              .ok_or_else(|| CommandError::NotFound(name.to_string()))?;
            Outcome::Output(command.generate_doc())
          },
          None => Outcome::Output(command_list(&self.registry)),
        }
      },
      "quit" => Outcome::Quit,
      _ => Outcome::Output(describe(&invocation)),
    };
    Ok(outcome)
  }
}

fn command_list(registry: &CommandRegistry) -> String {
  let commands = registry.all_commands();
  let width = commands.iter().map(|cmd| cmd.name.len()).max().unwrap_or(0);
  let mut out = String::new();
  for cmd in commands {
    let _ = writeln!(out, "{:width$}  {}", cmd.name, cmd.doc);
  }
  out
}

/// Lists the resolved arguments of an invocation, one per line.
pub fn describe(invocation: &Invocation<'_>) -> String {
  let mut out = String::from(invocation.command.name);
  for def in invocation.args.present() {
    match invocation.args.value(def) {
      Ok(Some(value)) => {
        let _ = write!(out, "\n  {} = {value}", def.default_name());
      },
      _ => {
        let _ = write!(out, "\n  {}", def.default_name());
      },
    }
  }
  out
}
