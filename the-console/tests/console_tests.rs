//! Drives the console the way the input loop does.

use the_console::{
  CommandRegistry,
  Console,
  ConsoleConfig,
  Outcome,
  commands::DEPLOYMENTS,
};

fn console_from(toml: &str) -> Console {
  Console::new(
    CommandRegistry::with_builtins().unwrap(),
    ConsoleConfig::from_toml(toml).unwrap(),
  )
}

fn texts(console: &Console, input: &str) -> Vec<String> {
  console
    .complete(input, input.len())
    .into_iter()
    .map(|c| c.text)
    .collect()
}

#[test]
fn test_cached_values_from_config() {
  let console = console_from(
    r#"
    [session]
    connected = true

    [cache.sources]
    deployments = ["app.war", "api.war", "batch.jar"]
    "#,
  );

  assert_eq!(texts(&console, "undeploy "), [
    "--help",
    "--keep-content",
    "--name",
    "app.war",
    "api.war",
    "batch.jar",
  ]);
  assert_eq!(texts(&console, "undeploy b"), ["batch.jar"]);
}

#[test]
fn test_completion_settings_apply() {
  let console = console_from(
    r#"
    [completion]
    sort = "definition"
    max-candidates = 2
    "#,
  );

  assert_eq!(texts(&console, "deploy --"), ["--path", "--name"]);
}

#[test]
fn test_session_changes_availability() {
  let mut console = console_from("");
  console
    .ctx_mut()
    .prefetch(DEPLOYMENTS, ["app.war".to_string()]);

  assert!(texts(&console, "undeploy a").is_empty());
  assert!(matches!(console.handle_line("connect"), Ok(Outcome::Output(_))));
  assert_eq!(texts(&console, "undeploy a"), ["app.war"]);
}

#[test]
fn test_cursor_before_the_end() {
  let console = console_from("[session]\nconnected = true");
  let completions = console.complete("deploy --fo app.war", 11);

  assert_eq!(completions.len(), 1);
  assert_eq!(completions[0].text, "--force");
  assert_eq!(completions[0].range.start, 7);
}
