//! Built-in management commands.
//!
//! Values that only the managed process knows (deployments, server groups,
//! attribute names) are completed from the session's pre-fetched cache under
//! the source names below.

use the_args::{
  ArgumentDefinition,
  ArgumentSet,
  Availability,
  DefinitionError,
  Rule,
  completion::{
    CompletionContext,
    ContextValues,
    FuzzyValues,
    StaticValues,
    ValueCompleter,
  },
};

use crate::registry::{
  CommandRegistry,
  TypableCommand,
};

pub const CONTROLLERS: &str = "controllers";
pub const DEPLOYMENTS: &str = "deployments";
pub const FILES: &str = "files";
pub const SERVER_GROUPS: &str = "server-groups";
pub const NODES: &str = "nodes";
pub const ATTRIBUTES: &str = "attributes";

const BOOLEANS: &[&str] = &["true", "false"];

/// Names of the registered commands, filtered by prefix.
struct CommandNames(Vec<&'static str>);

impl ValueCompleter for CommandNames {
  fn complete(&self, ctx: &CompletionContext<'_>) -> Vec<String> {
    self
      .0
      .iter()
      .filter(|name| name.starts_with(ctx.partial_value))
      .map(|name| name.to_string())
      .collect()
  }
}

fn help_flag() -> ArgumentDefinition {
  ArgumentDefinition::named("--help")
    .alias("-h")
    .doc("Print help for the command")
    .rule(Rule::Exclusive)
}

fn connect() -> Result<TypableCommand, DefinitionError> {
  let arguments = ArgumentSet::new([
    ArgumentDefinition::named_or_positional("--controller", 0)
      .doc("Controller address, host:port")
      .requires(Availability::Disconnected)
      .completer(ContextValues(CONTROLLERS)),
    ArgumentDefinition::named("--user")
      .value_required()
      .doc("User name to authenticate with")
      .requires(Availability::Disconnected),
    help_flag(),
  ])?;
  Ok(TypableCommand::new("connect", "Connect to a controller", arguments))
}

fn disconnect() -> Result<TypableCommand, DefinitionError> {
  let arguments = ArgumentSet::new([help_flag()])?;
  Ok(TypableCommand::new(
    "disconnect",
    "Close the session with the controller",
    arguments,
  ))
}

fn deploy() -> Result<TypableCommand, DefinitionError> {
  let arguments = ArgumentSet::new([
    ArgumentDefinition::named_or_positional("--path", 0)
      .doc("Path to the archive")
      .completer(ContextValues(FILES)),
    ArgumentDefinition::named("--name")
      .value_required()
      .doc("Unique name of the deployment"),
    ArgumentDefinition::named("--runtime-name")
      .value_required()
      .doc("Name the deployment is known by at runtime"),
    ArgumentDefinition::named("--force")
      .alias("-f")
      .doc("Replace an existing deployment")
      .requires(Availability::Connected)
      .rule(Rule::ConflictsWith(&["--disabled"])),
    ArgumentDefinition::named("--disabled")
      .doc("Add the content without enabling it")
      .requires(Availability::Connected),
    ArgumentDefinition::named("--server-groups")
      .value_required()
      .doc("Comma separated server groups to deploy to")
      .requires(Availability::Connected)
      .requires(Availability::Mode("domain"))
      .rule(Rule::ConflictsWith(&["--all-server-groups"]))
      .completer(ContextValues(SERVER_GROUPS)),
    ArgumentDefinition::named("--all-server-groups")
      .doc("Deploy to every server group")
      .requires(Availability::Connected)
      .requires(Availability::Mode("domain")),
    help_flag(),
  ])?;
  Ok(TypableCommand::new("deploy", "Deploy an application archive", arguments))
}

fn undeploy() -> Result<TypableCommand, DefinitionError> {
  let arguments = ArgumentSet::new([
    ArgumentDefinition::named_or_positional("--name", 0)
      .doc("Name of the deployment")
      .requires(Availability::Connected)
      .completer(ContextValues(DEPLOYMENTS)),
    ArgumentDefinition::named("--keep-content")
      .doc("Keep the content in the repository")
      .requires(Availability::Connected),
    ArgumentDefinition::named("--server-groups")
      .value_required()
      .doc("Comma separated server groups to undeploy from")
      .requires(Availability::Connected)
      .requires(Availability::Mode("domain"))
      .rule(Rule::ConflictsWith(&["--all-relevant-server-groups"]))
      .completer(ContextValues(SERVER_GROUPS)),
    ArgumentDefinition::named("--all-relevant-server-groups")
      .doc("Undeploy from every server group the deployment is in")
      .requires(Availability::Connected)
      .requires(Availability::Mode("domain")),
    help_flag(),
  ])?;
  Ok(TypableCommand::new("undeploy", "Remove a deployment", arguments).aliases(&["rm-deployment"]))
}

fn read_attribute() -> Result<TypableCommand, DefinitionError> {
  let arguments = ArgumentSet::new([
    ArgumentDefinition::named_or_positional("--name", 0)
      .doc("Attribute to read")
      .requires(Availability::Connected)
      .completer(ContextValues(ATTRIBUTES)),
    ArgumentDefinition::named("--node")
      .value_required()
      .doc("Address of the node, defaults to the current node")
      .requires(Availability::Connected)
      .completer(ContextValues(NODES)),
    ArgumentDefinition::named("--include-defaults")
      .value_required()
      .doc("Whether unset attributes report their default")
      .requires(Availability::Connected)
      .completer(StaticValues(BOOLEANS)),
    ArgumentDefinition::named("--verbose")
      .alias("-v")
      .doc("Print the attribute description too")
      .requires(Availability::Connected),
    help_flag(),
  ])?;
  Ok(TypableCommand::new(
    "read-attribute",
    "Print the value of an attribute",
    arguments,
  ))
}

const BATCH_ACTIONS: &[&str] = &["start", "run", "discard", "list", "edit-line"];

fn batch() -> Result<TypableCommand, DefinitionError> {
  let arguments = ArgumentSet::new([
    ArgumentDefinition::positional("action", 0)
      .doc("What to do with the batch")
      .completer(FuzzyValues(BATCH_ACTIONS)),
    ArgumentDefinition::positional("line", 1).rule(Rule::RequiresValue {
      argument: "action",
      values:   &["edit-line"],
    }),
    ArgumentDefinition::named("--verbose")
      .alias("-v")
      .doc("Print the response of each step")
      .requires(Availability::Connected)
      .rule(Rule::RequiresValue {
        argument: "action",
        values:   &["run"],
      }),
    help_flag(),
  ])?;
  Ok(TypableCommand::new("batch", "Group commands into one atomic request", arguments))
}

fn set_mode() -> Result<TypableCommand, DefinitionError> {
  let arguments = ArgumentSet::new([
    ArgumentDefinition::positional("mode", 0)
      .doc("Console mode")
      .completer(StaticValues(&["standalone", "domain"])),
    ArgumentDefinition::named("--clear")
      .doc("Leave the current mode")
      .rule(Rule::ConflictsWith(&["mode"])),
  ])?;
  Ok(TypableCommand::new("mode", "Select the console mode", arguments))
}

fn help(commands: Vec<&'static str>) -> Result<TypableCommand, DefinitionError> {
  let arguments = ArgumentSet::new([
    ArgumentDefinition::positional("command", 0)
      .doc("Command to describe")
      .completer(CommandNames(commands)),
    ArgumentDefinition::named("--commands")
      .doc("List every command")
      .rule(Rule::ConflictsWith(&["command"])),
  ])?;
  Ok(TypableCommand::new("help", "Describe a command", arguments).aliases(&["h"]))
}

fn quit() -> Result<TypableCommand, DefinitionError> {
  Ok(TypableCommand::new("quit", "Leave the console", ArgumentSet::new([])?).aliases(&["q", "exit"]))
}

impl CommandRegistry {
  /// A registry holding every built-in command.
  pub fn with_builtins() -> Result<Self, DefinitionError> {
    let mut registry = Self::new();
    for command in [
      connect()?,
      disconnect()?,
      deploy()?,
      undeploy()?,
      read_attribute()?,
      batch()?,
      set_mode()?,
      quit()?,
    ] {
      registry.register(command);
    }

    let mut names = registry.command_names();
    names.push("help");
    names.sort();
    registry.register(help(names)?);
    Ok(registry)
  }
}
