use std::{
  collections::{
    HashMap,
    HashSet,
  },
  sync::Arc,
};

use the_args::{
  ArgumentKind,
  ArgumentSet,
  CommandContext,
  CommandLine,
  Completion,
  CompletionConfig,
  ParseProblem,
  ParsedArguments,
  command_line::split,
  complete,
  fuzzy,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
  #[error("no command given")]
  Empty,
  #[error("command not found: {0}")]
  NotFound(String),
  #[error(transparent)]
  Parse(#[from] ParseProblem),
}

#[derive(Debug, Clone)]
pub struct TypableCommand {
  pub name:      &'static str,
  pub aliases:   &'static [&'static str],
  pub doc:       &'static str,
  pub arguments: ArgumentSet,
}

impl TypableCommand {
  pub fn new(name: &'static str, doc: &'static str, arguments: ArgumentSet) -> Self {
    Self {
      name,
      aliases: &[],
      doc,
      arguments,
    }
  }

  pub fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
    self.aliases = aliases;
    self
  }

  pub fn generate_doc(&self) -> String {
    use std::fmt::Write;

    let mut doc = String::new();

    let _ = writeln!(doc, "{} - {}", self.name, self.doc);
    if !self.aliases.is_empty() {
      let _ = writeln!(doc, "Aliases: {}", self.aliases.join(", "));
    }

    let mut positionals: Vec<_> = self
      .arguments
      .iter()
      .filter_map(|def| def.index().map(|index| (index, def)))
      .collect();
    positionals.sort_by_key(|(index, _)| *index);
    if !positionals.is_empty() {
      let _ = write!(doc, "Usage: {}", self.name);
      for (_, def) in &positionals {
        let _ = write!(doc, " [{}]", def.default_name().trim_start_matches('-'));
      }
      let _ = writeln!(doc);
    }

    let rows: Vec<_> = self
      .arguments
      .iter()
      .map(|def| {
        let mut names = match def.kind() {
          ArgumentKind::Positional(_) => format!("<{}>", def.default_name()),
          _ => def.names().collect::<Vec<_>>().join(", "),
        };
        if def.is_value_required() && def.kind().matches_name() {
          names.push_str(" <value>");
        }
        (names, def.doc_str())
      })
      .collect();

    if !rows.is_empty() {
      let _ = writeln!(doc, "Arguments:");
      let width = rows.iter().map(|(names, _)| names.len()).max().unwrap_or(0);
      for (names, help) in rows {
        let _ = writeln!(doc, "  {names:width$}  {help}");
      }
    }

    doc
  }
}

/// A command line resolved against its command.
#[derive(Debug)]
pub struct Invocation<'a> {
  pub command: &'a TypableCommand,
  pub args:    ParsedArguments<'a>,
}

#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
  commands: HashMap<String, Arc<TypableCommand>>,
}

impl CommandRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(&mut self, command: TypableCommand) {
    let cmd = Arc::new(command);
    tracing::debug!(name = cmd.name, "registered command");
    self.commands.insert(cmd.name.to_string(), cmd.clone());
    for alias in cmd.aliases {
      self.commands.insert(alias.to_string(), cmd.clone());
    }
  }

  pub fn get(&self, name: &str) -> Option<&TypableCommand> {
    self.commands.get(name).map(|cmd| cmd.as_ref())
  }

  pub fn command_names(&self) -> Vec<&'static str> {
    let mut names: Vec<_> = self.commands.values().map(|cmd| cmd.name).collect();
    names.sort();
    names.dedup();
    names
  }

  pub fn all_commands(&self) -> Vec<Arc<TypableCommand>> {
    let mut seen = HashSet::new();
    let mut commands: Vec<_> = self
      .commands
      .values()
      .filter(|cmd| seen.insert(cmd.name))
      .cloned()
      .collect();
    commands.sort_by(|a, b| a.name.cmp(b.name));
    commands
  }

  /// Resolves `line` against the command it names and validates it.
  pub fn parse<'a>(&'a self, line: &'a str) -> Result<Invocation<'a>, CommandError> {
    let (name, rest, _) = split(line);
    if name.is_empty() {
      return Err(CommandError::Empty);
    }
    let command = self
      .get(name)
      .ok_or_else(|| CommandError::NotFound(name.to_string()))?;

    let args = ParsedArguments::parse(&command.arguments, rest);
    args.check()?;
    Ok(Invocation { command, args })
  }

  /// Completion candidates for `input` with the cursor at byte `cursor`.
  pub fn complete_command_line(
    &self,
    ctx: &dyn CommandContext,
    input: &str,
    cursor: usize,
    config: &CompletionConfig,
  ) -> Vec<Completion> {
    let line = CommandLine::new(input, cursor);
    let head = &input[..line.cursor()];
    let (command, rest, complete_command_name) = split(head);

    if !complete_command_name {
      let start = head.len() - head.trim_start_matches([' ', '\t']).len();
      let mut names = self.command_names();
      if config.matching.is_fuzzy() {
        names = fuzzy::rank(command, names);
      } else {
        names.retain(|name| name.starts_with(command));
      }
      let mut completions: Vec<_> = names
        .into_iter()
        .map(|name| {
          Completion {
            range: start..,
            text:  name.to_string(),
            doc:   self.get(name).map(|cmd| cmd.doc.to_string()),
          }
        })
        .collect();
      config.limit(&mut completions);
      return completions;
    }

    let Some(cmd) = self.get(command) else {
      return Vec::new();
    };

    let offset = head.len() - rest.len();
    let args_line = CommandLine::at_end(rest);
    let mut completions = complete(&args_line, &cmd.arguments, ctx, config);
    for completion in &mut completions {
      completion.range = (offset + completion.range.start)..;
    }
    completions
  }
}
