//! End-to-end resolution and completion over the public API.

use quickcheck::quickcheck;
use the_args::{
  ArgumentDefinition,
  ArgumentSet,
  Availability,
  CommandContext,
  CommandLine,
  CompletionConfig,
  ParsedArguments,
  Rule,
  ValueError,
  complete,
  completion::StaticValues,
  context::Disconnected,
  tokenize,
};

struct Connected;

impl CommandContext for Connected {
  fn is_connected(&self) -> bool {
    true
  }
}

fn connect_command() -> ArgumentSet {
  ArgumentSet::new([
    ArgumentDefinition::named("--host").value_required(),
    ArgumentDefinition::named("--port").value_required(),
    ArgumentDefinition::positional("operation", 0),
  ])
  .unwrap()
}

fn names(input: &str, arguments: &ArgumentSet, ctx: &dyn CommandContext) -> Vec<String> {
  complete(
    &CommandLine::at_end(input),
    arguments,
    ctx,
    &CompletionConfig::default(),
  )
  .into_iter()
  .map(|completion| completion.text)
  .collect()
}

#[test]
fn test_connect_with_host() {
  let arguments = connect_command();
  let args = ParsedArguments::parse(&arguments, "connect --host localhost");

  let operation = arguments.get("operation").unwrap();
  let host = arguments.get("--host").unwrap();
  let port = arguments.get("--port").unwrap();

  assert!(args.is_present(operation));
  assert_eq!(args.value(operation), Ok(Some("connect")));
  assert!(args.is_present(host));
  assert_eq!(args.value(host), Ok(Some("localhost")));
  assert!(!args.is_present(port));
  assert!(args.check().is_ok());
}

#[test]
fn test_trailing_name_without_value() {
  let arguments = connect_command();
  let args = ParsedArguments::parse(&arguments, "--host");
  let host = arguments.get("--host").unwrap();

  assert!(args.is_present(host));
  assert_eq!(args.value(host), Err(ValueError::RequiredValueMissing {
    name: "--host",
  }));
  assert!(args.check().is_err());
}

#[test]
fn test_complete_help_and_host() {
  let arguments = ArgumentSet::new([
    ArgumentDefinition::positional("operation", 0),
    ArgumentDefinition::named("--host").value_required(),
    ArgumentDefinition::named("--help"),
  ])
  .unwrap();

  assert_eq!(names("connect --h", &arguments, &Disconnected), [
    "--help", "--host"
  ]);
}

#[test]
fn test_flag_leaves_positional_alone() {
  let arguments = ArgumentSet::new([
    ArgumentDefinition::named("--force"),
    ArgumentDefinition::positional("path", 0),
  ])
  .unwrap();
  let args = ParsedArguments::parse(&arguments, "--force foo");

  assert_eq!(args.get("--force"), Ok(None));
  assert_eq!(args.get("path"), Ok(Some("foo")));
}

#[test]
fn test_no_duplicate_offers() {
  let arguments = ArgumentSet::new([
    ArgumentDefinition::named("--force"),
    ArgumentDefinition::named("--name").value_required(),
  ])
  .unwrap();

  assert_eq!(names("--force --", &arguments, &Disconnected), ["--name"]);
  assert_eq!(names("--force --name x --", &arguments, &Disconnected), Vec::<String>::new());
}

#[test]
fn test_connected_only_arguments() {
  let arguments = ArgumentSet::new([
    ArgumentDefinition::positional("name", 0)
      .requires(Availability::Connected)
      .completer(StaticValues(&["app.war", "api.war"])),
    ArgumentDefinition::named("--all-relevant-server-groups")
      .requires(Availability::Connected)
      .rule(Rule::ConflictsWith(&["--server-groups"])),
    ArgumentDefinition::named("--server-groups")
      .value_required()
      .requires(Availability::Connected),
    ArgumentDefinition::named("--help").rule(Rule::Exclusive),
  ])
  .unwrap();

  assert_eq!(names("--", &arguments, &Disconnected), ["--help"]);
  assert_eq!(names("--", &arguments, &Connected), [
    "--all-relevant-server-groups",
    "--help",
    "--server-groups",
  ]);
  assert_eq!(names("ap", &arguments, &Connected), ["app.war", "api.war"]);
  assert_eq!(names("ap", &arguments, &Disconnected), Vec::<String>::new());
  assert_eq!(names("app.war --server-groups main --", &arguments, &Connected), Vec::<String>::new());
}

#[test]
fn test_completion_ranges() {
  let arguments = connect_command();
  let completions = complete(
    &CommandLine::at_end("connect --port=1 --h"),
    &arguments,
    &Disconnected,
    &CompletionConfig::default(),
  );

  assert_eq!(completions.len(), 1);
  assert_eq!(completions[0].text, "--host");
  assert_eq!(completions[0].range.start, 17);
}

quickcheck! {
  fn prop_tokenize_is_idempotent(line: String) -> bool {
    let spans: Vec<_> = tokenize(&line).into_iter().map(|token| token.span).collect();
    let again: Vec<_> = tokenize(&line).into_iter().map(|token| token.span).collect();
    spans == again
  }

  fn prop_named_only_is_never_positional(words: Vec<String>) -> bool {
    let arguments = connect_command();
    let line = words.join(" ");
    let args = ParsedArguments::parse(&arguments, &line);

    (0..args.tokens().len()).all(|i| {
      !matches!(
        args.claim(i),
        Some(the_args::parsed::Claim::Positional(idx)) if arguments.iter().nth(idx).and_then(|d| d.index()).is_none()
      )
    })
  }

  fn prop_present_never_next(words: Vec<String>) -> bool {
    let arguments = connect_command();
    let line = words.join(" ");
    let args = ParsedArguments::parse(&arguments, &line);
    arguments
      .iter()
      .filter(|def| args.is_present(def))
      .all(|def| !def.can_appear_next(&args))
  }

  fn prop_completion_never_panics(line: String, cursor: usize) -> bool {
    let arguments = connect_command();
    let line = CommandLine::new(&line, cursor);
    complete(&line, &arguments, &Connected, &CompletionConfig::default())
      .iter()
      .all(|completion| completion.range.start <= line.cursor())
  }
}
