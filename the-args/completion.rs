//! Tab-completion of argument names and values.
//!
//! [`complete`] looks at the token under the cursor and decides what is being
//! typed:
//!
//! - the value of a named argument (`--host loc`, `--host=loc`), completed by
//!   that argument's [`ValueCompleter`];
//! - an argument name (`--h`), completed from the arguments that are
//!   available and may appear next;
//! - a positional value, completed by the completer of the argument owning
//!   the next positional slot.
//!
//! On an empty token both names and the next positional values are offered.
//! Completers are synchronous and must not block: data from the managed
//! process is read from the context's pre-fetched cache.

use std::ops::RangeFrom;

use crate::{
  argument::{
    ArgumentDefinition,
    ArgumentSet,
  },
  command_line::{
    CommandLine,
    Token,
  },
  config::CompletionConfig,
  context::CommandContext,
  fuzzy,
  parsed::ParsedArguments,
  policy,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
  /// The part of the line the completion replaces.
  pub range: RangeFrom<usize>,
  pub text:  String,
  pub doc:   Option<String>,
}

/// What a value completer is asked about.
#[derive(Clone, Copy)]
pub struct CompletionContext<'a> {
  pub command_context: &'a dyn CommandContext,
  /// The value typed so far, without an unclosed opening quote.
  pub partial_value:   &'a str,
  /// Byte offset of the cursor in the line being completed.
  pub cursor_offset:   usize,
}

/// Produces candidate values for one argument.
///
/// Calling `complete` twice with the same context and partial value returns
/// the same candidates, ordered by relevance. A completer that cannot compute
/// anything returns an empty list.
pub trait ValueCompleter: Send + Sync {
  fn complete(&self, ctx: &CompletionContext<'_>) -> Vec<String>;
}

impl<F> ValueCompleter for F
where
  F: Fn(&CompletionContext<'_>) -> Vec<String> + Send + Sync,
{
  fn complete(&self, ctx: &CompletionContext<'_>) -> Vec<String> {
    self(ctx)
  }
}

/// A fixed list of values, filtered by prefix.
#[derive(Debug, Clone, Copy)]
pub struct StaticValues(pub &'static [&'static str]);

impl ValueCompleter for StaticValues {
  fn complete(&self, ctx: &CompletionContext<'_>) -> Vec<String> {
    self
      .0
      .iter()
      .filter(|value| value.starts_with(ctx.partial_value))
      .map(|value| (*value).to_string())
      .collect()
  }
}

/// A fixed list of values, ranked by fuzzy score.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyValues(pub &'static [&'static str]);

impl ValueCompleter for FuzzyValues {
  fn complete(&self, ctx: &CompletionContext<'_>) -> Vec<String> {
    fuzzy::rank(ctx.partial_value, self.0.iter().copied())
      .into_iter()
      .map(str::to_string)
      .collect()
  }
}

/// Values pre-fetched by the console under a named source, filtered by prefix.
#[derive(Debug, Clone, Copy)]
pub struct ContextValues(pub &'static str);

impl ValueCompleter for ContextValues {
  fn complete(&self, ctx: &CompletionContext<'_>) -> Vec<String> {
    ctx
      .command_context
      .cached_values(self.0)
      .unwrap_or_default()
      .iter()
      .filter(|value| value.starts_with(ctx.partial_value))
      .cloned()
      .collect()
  }
}

/// Routes a value request to the argument's completer.
///
/// Returns no candidates when the argument has no completer. Duplicates are
/// dropped, keeping the first occurrence, and the result is capped by
/// `max-candidates`.
pub fn complete_value(
  def: &ArgumentDefinition,
  ctx: &CompletionContext<'_>,
  config: &CompletionConfig,
) -> Vec<String> {
  let Some(completer) = def.value_completer() else {
    return Vec::new();
  };

  let mut values = completer.complete(ctx);
  let mut seen = Vec::with_capacity(values.len());
  values.retain(|value| {
    if seen.contains(value) {
      false
    } else {
      seen.push(value.clone());
      true
    }
  });
  config.limit(&mut values);

  tracing::trace!(
    argument = def.default_name(),
    partial = ctx.partial_value,
    candidates = values.len(),
    "completed value"
  );
  values
}

/// Quotes a value that would otherwise split into several tokens.
pub fn quote_value(value: &str) -> String {
  if !value.is_empty() && !value.contains([' ', '\t', '\'', '"', '`', '\\']) {
    return value.to_string();
  }
  format!("'{}'", value.replace('\'', "''"))
}

/// The value typed so far when its opening quote is not closed yet.
fn strip_unclosed_quote(partial: &str, quoted: bool) -> &str {
  match partial.as_bytes().first() {
    Some(b'\'' | b'"' | b'`') if !quoted => &partial[1..],
    _ => partial,
  }
}

fn value_completions(
  def: &ArgumentDefinition,
  ctx: &dyn CommandContext,
  partial: &str,
  start: usize,
  cursor: usize,
  config: &CompletionConfig,
) -> Vec<Completion> {
  let request = CompletionContext {
    command_context: ctx,
    partial_value:   partial,
    cursor_offset:   cursor,
  };
  complete_value(def, &request, config)
    .into_iter()
    .map(|value| {
      Completion {
        range: start..,
        text:  quote_value(&value),
        doc:   None,
      }
    })
    .collect()
}

fn name_completions(
  arguments: &ArgumentSet,
  parsed: &ParsedArguments<'_>,
  ctx: &dyn CommandContext,
  prefix: &str,
  start: usize,
  config: &CompletionConfig,
) -> Vec<Completion> {
  let mut names: Vec<_> = policy::candidate_names(arguments, parsed, ctx, prefix, config)
    .into_iter()
    .map(|def| {
      Completion {
        range: start..,
        text:  policy::completion_name(def, prefix).to_string(),
        doc:   Some(def.doc_str().to_string()).filter(|doc| !doc.is_empty()),
      }
    })
    .collect();
  config.limit(&mut names);
  names
}

/// Completion candidates for the argument part of a command line.
///
/// Offsets in the returned ranges are relative to `line`. Only the text before
/// the cursor is considered.
pub fn complete(
  line: &CommandLine<'_>,
  arguments: &ArgumentSet,
  ctx: &dyn CommandContext,
  config: &CompletionConfig,
) -> Vec<Completion> {
  let cursor = line.cursor();
  let head = CommandLine::at_end(&line.text()[..cursor]);

  let (completed, editing) = match head.editing() {
    Some(idx) => (&head.tokens()[..idx], head.tokens()[idx].clone()),
    None => (head.tokens(), Token::empty_at(cursor)),
  };
  let parsed = ParsedArguments::new(arguments, completed.to_vec());
  let partial = editing.text();
  let quoted_start = editing.content_start != editing.start();
  let value_partial = strip_unclosed_quote(partial, editing.is_quoted());
  // Never a value, see `ParsedArguments`.
  let typing_name = !quoted_start && partial.starts_with("--");

  // `--name <partial>`
  if let Some(def) = parsed.awaiting_value().filter(|_| !typing_name) {
    return value_completions(def, ctx, value_partial, editing.start(), cursor, config);
  }

  if !parsed.options_ended() && !quoted_start {
    // `--name=<partial>`
    let attached = arguments
      .match_name(partial)
      .and_then(|(idx, name_match)| Some((idx, name_match.attached?)));
    if let Some((idx, attached)) = attached {
      let def = &arguments.definitions()[idx];
      let raw = &line.text()[editing.span.clone()];
      let start = editing.start() + raw.find('=').map_or(0, |eq| eq + 1);
      let attached = strip_unclosed_quote(attached, editing.is_quoted());
      return value_completions(def, ctx, attached, start, cursor, config);
    }

    if partial.starts_with('-') {
      return name_completions(arguments, &parsed, ctx, partial, editing.start(), config);
    }
  }

  let mut completions = Vec::new();
  if partial.is_empty() && !parsed.options_ended() {
    completions = name_completions(arguments, &parsed, ctx, partial, editing.start(), config);
  }

  let next_slot = arguments
    .at_index(parsed.positional_count())
    .filter(|def| def.is_available(ctx) && def.can_appear_next(&parsed));
  if let Some(def) = next_slot {
    completions.extend(value_completions(
      def,
      ctx,
      value_partial,
      editing.start(),
      cursor,
      config,
    ));
  }

  config.limit(&mut completions);
  completions
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::argument::Availability;

  struct Session {
    connected:   bool,
    deployments: Vec<String>,
  }

  impl CommandContext for Session {
    fn is_connected(&self) -> bool {
      self.connected
    }

    fn cached_values(&self, source: &str) -> Option<&[String]> {
      (source == "deployments").then_some(self.deployments.as_slice())
    }
  }

  fn session() -> Session {
    Session {
      connected:   true,
      deployments: vec![
        "app.war".to_string(),
        "api.war".to_string(),
        "batch.jar".to_string(),
        "app.war".to_string(),
      ],
    }
  }

  fn connect_arguments() -> ArgumentSet {
    ArgumentSet::new([
      ArgumentDefinition::positional("operation", 0)
        .completer(StaticValues(&["connect", "disconnect"])),
      ArgumentDefinition::named("--host")
        .value_required()
        .completer(StaticValues(&["localhost", "10.0.0.1", "my host"])),
      ArgumentDefinition::named("--help").doc("Print help"),
    ])
    .unwrap()
  }

  fn undeploy_arguments() -> ArgumentSet {
    ArgumentSet::new([
      ArgumentDefinition::named_or_positional("--name", 0)
        .requires(Availability::Connected)
        .completer(ContextValues("deployments")),
      ArgumentDefinition::named("--keep-content"),
    ])
    .unwrap()
  }

  #[track_caller]
  fn assert_completions(
    arguments: &ArgumentSet,
    input: &str,
    expected: &[(usize, &str)],
  ) {
    let line = CommandLine::at_end(input);
    let actual: Vec<_> = complete(&line, arguments, &session(), &CompletionConfig::default())
      .into_iter()
      .map(|c| (c.range.start, c.text))
      .collect();
    let expected: Vec<_> = expected
      .iter()
      .map(|(start, text)| (*start, text.to_string()))
      .collect();
    assert_eq!(actual, expected);
  }

  #[test]
  fn argument_names() {
    let arguments = connect_arguments();
    assert_completions(&arguments, "connect --h", &[(8, "--help"), (8, "--host")]);
    assert_completions(&arguments, "connect --ho", &[(8, "--host")]);
    assert_completions(&arguments, "connect --host x --h", &[(17, "--help")]);
  }

  #[test]
  fn names_after_value_taking_name() {
    let arguments = connect_arguments();
    assert_completions(&arguments, "connect --host --h", &[(15, "--help")]);
    assert_completions(&arguments, "connect --host --", &[(15, "--help")]);
  }

  #[test]
  fn named_values() {
    let arguments = connect_arguments();
    assert_completions(&arguments, "connect --host ", &[
      (15, "localhost"),
      (15, "10.0.0.1"),
      (15, "'my host'"),
    ]);
    assert_completions(&arguments, "connect --host lo", &[(15, "localhost")]);
    assert_completions(&arguments, "connect --host=lo", &[(15, "localhost")]);
    assert_completions(&arguments, "connect --host 'my", &[(15, "'my host'")]);
    assert_completions(&arguments, "connect --host='my", &[(15, "'my host'")]);
    assert_completions(&arguments, "connect --host=", &[
      (15, "localhost"),
      (15, "10.0.0.1"),
      (15, "'my host'"),
    ]);
  }

  #[test]
  fn positional_values() {
    let arguments = connect_arguments();
    assert_completions(&arguments, "con", &[(0, "connect")]);
    assert_completions(&arguments, "", &[
      (0, "--help"),
      (0, "--host"),
      (0, "connect"),
      (0, "disconnect"),
    ]);
    // The positional slot is taken, only names remain.
    assert_completions(&arguments, "connect ", &[(8, "--help"), (8, "--host")]);
  }

  #[test]
  fn cached_values_are_deduplicated() {
    let arguments = undeploy_arguments();
    assert_completions(&arguments, "a", &[(0, "app.war"), (0, "api.war")]);
    assert_completions(&arguments, "--name b", &[(7, "batch.jar")]);
  }

  #[test]
  fn unavailable_arguments_complete_nothing() {
    let arguments = undeploy_arguments();
    let line = CommandLine::at_end("a");
    let offline = Session {
      connected:   false,
      deployments: vec!["app.war".to_string()],
    };
    assert!(complete(&line, &arguments, &offline, &CompletionConfig::default()).is_empty());
  }

  #[test]
  fn cursor_in_the_middle() {
    let arguments = connect_arguments();
    let line = CommandLine::new("connect --ho localhost", 12);
    let names: Vec<_> = complete(&line, &arguments, &session(), &CompletionConfig::default())
      .into_iter()
      .map(|c| c.text)
      .collect();
    assert_eq!(names, ["--host"]);
  }

  #[test]
  fn completion_is_repeatable() {
    let arguments = undeploy_arguments();
    let ctx = session();
    let def = arguments.get("--name").unwrap();
    let request = CompletionContext {
      command_context: &ctx,
      partial_value:   "ap",
      cursor_offset:   2,
    };
    let config = CompletionConfig::default();
    let first = complete_value(def, &request, &config);
    let second = complete_value(def, &request, &config);
    assert_eq!(first, second);
    assert_eq!(first, ["app.war", "api.war"]);
  }

  #[test]
  fn no_completer_no_values() {
    let arguments = connect_arguments();
    let ctx = session();
    let request = CompletionContext {
      command_context: &ctx,
      partial_value:   "",
      cursor_offset:   0,
    };
    let help = arguments.get("--help").unwrap();
    assert!(complete_value(help, &request, &CompletionConfig::default()).is_empty());
  }

  #[test]
  fn function_completer_and_limit() {
    fn numbers(request: &CompletionContext<'_>) -> Vec<String> {
      (0..50)
        .map(|n| n.to_string())
        .filter(|n| n.starts_with(request.partial_value))
        .collect()
    }

    let arguments =
      ArgumentSet::new([ArgumentDefinition::named("--port").value_required().completer(numbers)])
        .unwrap();
    let config = CompletionConfig {
      max_candidates: Some(3),
      ..CompletionConfig::default()
    };
    let line = CommandLine::at_end("--port 1");
    let values: Vec<_> = complete(&line, &arguments, &session(), &config)
      .into_iter()
      .map(|c| c.text)
      .collect();
    assert_eq!(values, ["1", "10", "11"]);
  }

  #[test]
  fn completers_see_the_cursor() {
    fn cursor(request: &CompletionContext<'_>) -> Vec<String> {
      vec![format!("{}@{}", request.partial_value, request.cursor_offset)]
    }

    let arguments =
      ArgumentSet::new([ArgumentDefinition::named("--port").value_required().completer(cursor)])
        .unwrap();
    let line = CommandLine::new("--port 12 --help", 9);
    let values: Vec<_> = complete(&line, &arguments, &session(), &CompletionConfig::default())
      .into_iter()
      .map(|c| c.text)
      .collect();
    assert_eq!(values, ["12@9"]);
  }

  #[test]
  fn quoting() {
    assert_eq!(quote_value("plain"), "plain");
    assert_eq!(quote_value("two words"), "'two words'");
    assert_eq!(quote_value("it's"), "'it''s'");
    assert_eq!(quote_value(""), "''");
  }
}
