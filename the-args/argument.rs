//! Argument definitions and the per-command argument set.
//!
//! An [`ArgumentDefinition`] is immutable metadata: its names, whether it can
//! be given by position, whether it takes a value, when it is available and
//! which sequencing rules apply to it. Definitions are grouped into an
//! [`ArgumentSet`] when a command is registered, which is also where
//! configuration mistakes (two definitions claiming the same position, a name
//! used twice) are rejected.
//!
//! ```ignore
//! use the_args::{ArgumentDefinition, ArgumentSet, Availability, Rule};
//!
//! let arguments = ArgumentSet::new([
//!   ArgumentDefinition::positional("operation", 0),
//!   ArgumentDefinition::named("--host").value_required(),
//!   ArgumentDefinition::named("--force")
//!     .alias("-f")
//!     .requires(Availability::Connected)
//!     .rule(Rule::ConflictsWith(&["--dry-run"])),
//!   ArgumentDefinition::named("--dry-run"),
//! ])?;
//! ```

use std::{
  fmt,
  sync::Arc,
};

use smallvec::SmallVec;
use thiserror::Error;

use crate::{
  completion::ValueCompleter,
  context::CommandContext,
  parsed::ParsedArguments,
  policy,
};

/// How an argument is located on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
  /// Only by its name or one of its aliases: `--name value`, `--name=value`.
  Named,
  /// Only by its position among the tokens no name claimed. The default name
  /// is reported (in help, in errors) but never matched.
  Positional(usize),
  /// By name when the name is typed, otherwise by position.
  NamedOrPositional(usize),
}

impl ArgumentKind {
  pub const fn index(&self) -> Option<usize> {
    match self {
      Self::Named => None,
      Self::Positional(index) | Self::NamedOrPositional(index) => Some(*index),
    }
  }

  pub const fn matches_name(&self) -> bool {
    !matches!(self, Self::Positional(_))
  }
}

/// A condition on the console session for an argument to be offered at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
  Always,
  /// Needs an active session with the managed process.
  Connected,
  /// Only makes sense while no session is active.
  Disconnected,
  /// Needs the console to be in the named mode.
  Mode(&'static str),
}

impl Availability {
  pub fn holds(&self, ctx: &dyn CommandContext) -> bool {
    match self {
      Self::Always => true,
      Self::Connected => ctx.is_connected(),
      Self::Disconnected => !ctx.is_connected(),
      Self::Mode(mode) => ctx.mode() == Some(*mode),
    }
  }
}

/// A sequencing rule relating an argument to the other arguments of its
/// command. Other arguments are referred to by their default name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
  /// The argument must be the only one on the line.
  Exclusive,
  /// None of the listed arguments may be present.
  ConflictsWith(&'static [&'static str]),
  /// At least one of the listed arguments must already be present.
  RequiresAny(&'static [&'static str]),
  /// `argument` must be present with one of `values`.
  RequiresValue {
    argument: &'static str,
    values:   &'static [&'static str],
  },
}

impl Rule {
  fn references(&self) -> impl Iterator<Item = &'static str> + '_ {
    let names: &[&'static str] = match self {
      Self::Exclusive => &[],
      Self::ConflictsWith(names) | Self::RequiresAny(names) => names,
      Self::RequiresValue { argument, .. } => std::slice::from_ref(argument),
    };
    names.iter().copied()
  }
}

/// A name token matched against a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameMatch<'t> {
  /// The text after `=` in `--name=value`.
  pub attached: Option<&'t str>,
}

#[derive(Clone)]
pub struct ArgumentDefinition {
  name:           &'static str,
  aliases:        SmallVec<[&'static str; 2]>,
  kind:           ArgumentKind,
  value_required: bool,
  doc:            &'static str,
  availability:   SmallVec<[Availability; 1]>,
  rules:          SmallVec<[Rule; 2]>,
  completer:      Option<Arc<dyn ValueCompleter>>,
}

impl ArgumentDefinition {
  fn new(name: &'static str, kind: ArgumentKind) -> Self {
    Self {
      name,
      aliases: SmallVec::new(),
      kind,
      // A positional argument is its value.
      value_required: kind.index().is_some(),
      doc: "",
      availability: SmallVec::new(),
      rules: SmallVec::new(),
      completer: None,
    }
  }

  /// An argument given by name, such as `--force` or `--host value`.
  pub fn named(name: &'static str) -> Self {
    Self::new(name, ArgumentKind::Named)
  }

  /// An argument given by position only.
  pub fn positional(name: &'static str, index: usize) -> Self {
    Self::new(name, ArgumentKind::Positional(index))
  }

  /// An argument given by name or, when the name is omitted, by position.
  pub fn named_or_positional(name: &'static str, index: usize) -> Self {
    Self::new(name, ArgumentKind::NamedOrPositional(index))
  }

  pub fn alias(mut self, alias: &'static str) -> Self {
    self.aliases.push(alias);
    self
  }

  pub fn value_required(mut self) -> Self {
    self.value_required = true;
    self
  }

  pub fn doc(mut self, doc: &'static str) -> Self {
    self.doc = doc;
    self
  }

  /// Adds an availability requirement. All requirements must hold.
  pub fn requires(mut self, availability: Availability) -> Self {
    self.availability.push(availability);
    self
  }

  pub fn rule(mut self, rule: Rule) -> Self {
    self.rules.push(rule);
    self
  }

  pub fn completer(mut self, completer: impl ValueCompleter + 'static) -> Self {
    self.completer = Some(Arc::new(completer));
    self
  }

  pub fn default_name(&self) -> &'static str {
    self.name
  }

  pub fn aliases(&self) -> &[&'static str] {
    &self.aliases
  }

  pub fn kind(&self) -> ArgumentKind {
    self.kind
  }

  /// The fixed position of the argument, `None` when it has none.
  pub fn index(&self) -> Option<usize> {
    self.kind.index()
  }

  pub fn is_value_required(&self) -> bool {
    self.value_required
  }

  pub fn doc_str(&self) -> &'static str {
    self.doc
  }

  pub fn rules(&self) -> &[Rule] {
    &self.rules
  }

  pub fn value_completer(&self) -> Option<&dyn ValueCompleter> {
    self.completer.as_deref()
  }

  /// The names this argument can be typed as. Empty for positional-only
  /// arguments.
  pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
    let matchable = self.kind.matches_name();
    std::iter::once(self.name)
      .chain(self.aliases.iter().copied())
      .filter(move |_| matchable)
  }

  /// Matches `text` against the argument's names, accepting `name` and
  /// `name=value`.
  pub fn match_name<'t>(&self, text: &'t str) -> Option<NameMatch<'t>> {
    self.names().find_map(|name| {
      let rest = text.strip_prefix(name)?;
      if rest.is_empty() {
        Some(NameMatch { attached: None })
      } else {
        rest
          .strip_prefix('=')
          .map(|value| NameMatch { attached: Some(value) })
      }
    })
  }

  /// Whether the argument means anything in the current session.
  pub fn is_available(&self, ctx: &dyn CommandContext) -> bool {
    self.availability.iter().all(|req| req.holds(ctx))
  }

  /// Whether the argument may be typed next, given what is already parsed.
  pub fn can_appear_next(&self, parsed: &ParsedArguments<'_>) -> bool {
    policy::can_appear_next(self, parsed)
  }
}

impl fmt::Debug for ArgumentDefinition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ArgumentDefinition")
      .field("name", &self.name)
      .field("aliases", &self.aliases)
      .field("kind", &self.kind)
      .field("value_required", &self.value_required)
      .field("has_completer", &self.completer.is_some())
      .finish()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
  #[error("argument definition without a name")]
  EmptyName,
  #[error("name '{name}' is used by more than one argument")]
  DuplicateName { name: &'static str },
  #[error("arguments '{first}' and '{second}' both claim position {index}")]
  AmbiguousPositional {
    index:  usize,
    first:  &'static str,
    second: &'static str,
  },
  #[error("argument '{argument}' refers to unknown argument '{reference}'")]
  UnknownReference {
    argument:  &'static str,
    reference: &'static str,
  },
}

/// The ordered, validated arguments of one command.
#[derive(Debug, Clone, Default)]
pub struct ArgumentSet {
  definitions: Vec<ArgumentDefinition>,
}

impl ArgumentSet {
  pub fn new(
    definitions: impl IntoIterator<Item = ArgumentDefinition>,
  ) -> Result<Self, DefinitionError> {
    let definitions: Vec<_> = definitions.into_iter().collect();
    validate(&definitions).inspect_err(|err| {
      tracing::warn!(%err, "rejected argument definitions");
    })?;
    Ok(Self { definitions })
  }

  pub fn iter(&self) -> std::slice::Iter<'_, ArgumentDefinition> {
    self.definitions.iter()
  }

  pub fn len(&self) -> usize {
    self.definitions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.definitions.is_empty()
  }

  /// Looks up a definition by default name or alias.
  pub fn get(&self, name: &str) -> Option<&ArgumentDefinition> {
    self
      .definitions
      .iter()
      .find(|def| def.name == name || def.aliases.contains(&name))
  }

  /// The definition claiming `index`.
  pub fn at_index(&self, index: usize) -> Option<&ArgumentDefinition> {
    self
      .definitions
      .iter()
      .find(|def| def.index() == Some(index))
  }

  /// Finds the definition whose name matches the token text.
  pub fn match_name<'t>(&self, text: &'t str) -> Option<(usize, NameMatch<'t>)> {
    self
      .definitions
      .iter()
      .enumerate()
      .find_map(|(idx, def)| def.match_name(text).map(|m| (idx, m)))
  }

  pub(crate) fn definitions(&self) -> &[ArgumentDefinition] {
    &self.definitions
  }
}

impl<'a> IntoIterator for &'a ArgumentSet {
  type Item = &'a ArgumentDefinition;
  type IntoIter = std::slice::Iter<'a, ArgumentDefinition>;

  fn into_iter(self) -> Self::IntoIter {
    self.definitions.iter()
  }
}

fn validate(definitions: &[ArgumentDefinition]) -> Result<(), DefinitionError> {
  let mut names: Vec<&'static str> = Vec::new();
  let mut indices: Vec<(usize, &'static str)> = Vec::new();

  for def in definitions {
    if def.name.is_empty() || def.aliases.iter().any(|alias| alias.is_empty()) {
      return Err(DefinitionError::EmptyName);
    }

    for name in std::iter::once(def.name).chain(def.aliases.iter().copied()) {
      if names.contains(&name) {
        return Err(DefinitionError::DuplicateName { name });
      }
      names.push(name);
    }

    if let Some(index) = def.index() {
      if let Some(&(_, first)) = indices.iter().find(|(i, _)| *i == index) {
        return Err(DefinitionError::AmbiguousPositional {
          index,
          first,
          second: def.name,
        });
      }
      indices.push((index, def.name));
    }
  }

  for def in definitions {
    for reference in def.rules.iter().flat_map(Rule::references) {
      if !definitions.iter().any(|other| other.name == reference) {
        return Err(DefinitionError::UnknownReference {
          argument: def.name,
          reference,
        });
      }
    }
  }

  Ok(())
}

#[cfg(test)]
mod test {
  use super::*;

  struct Session {
    connected: bool,
    mode:      Option<&'static str>,
  }

  impl CommandContext for Session {
    fn is_connected(&self) -> bool {
      self.connected
    }

    fn mode(&self) -> Option<&str> {
      self.mode
    }
  }

  #[test]
  fn kinds() {
    let host = ArgumentDefinition::named("--host").value_required();
    assert_eq!(host.index(), None);
    assert!(host.is_value_required());

    let operation = ArgumentDefinition::positional("operation", 0);
    assert_eq!(operation.index(), Some(0));
    assert!(operation.is_value_required());
    assert_eq!(operation.names().count(), 0);

    let path = ArgumentDefinition::named_or_positional("--path", 1).alias("-p");
    assert_eq!(path.index(), Some(1));
    assert_eq!(path.names().collect::<Vec<_>>(), ["--path", "-p"]);
  }

  #[test]
  fn name_matching() {
    let force = ArgumentDefinition::named("--force").alias("-f");
    assert_eq!(force.match_name("--force"), Some(NameMatch { attached: None }));
    assert_eq!(force.match_name("-f"), Some(NameMatch { attached: None }));
    assert_eq!(
      force.match_name("--force=yes"),
      Some(NameMatch {
        attached: Some("yes"),
      })
    );
    assert_eq!(force.match_name("--force="), Some(NameMatch { attached: Some("") }));
    assert_eq!(force.match_name("--forced"), None);
    assert_eq!(force.match_name("--forc"), None);

    let operation = ArgumentDefinition::positional("operation", 0);
    assert_eq!(operation.match_name("operation"), None);
  }

  #[test]
  fn availability() {
    let def = ArgumentDefinition::named("--server-group")
      .requires(Availability::Connected)
      .requires(Availability::Mode("domain"));

    let offline = Session {
      connected: false,
      mode:      Some("domain"),
    };
    let standalone = Session {
      connected: true,
      mode:      Some("standalone"),
    };
    let domain = Session {
      connected: true,
      mode:      Some("domain"),
    };

    assert!(!def.is_available(&offline));
    assert!(!def.is_available(&standalone));
    assert!(def.is_available(&domain));
    // Repeated calls with the same context agree.
    assert!(def.is_available(&domain));

    let always = ArgumentDefinition::named("--help");
    assert!(always.is_available(&offline));

    let connect = ArgumentDefinition::named("--controller").requires(Availability::Disconnected);
    assert!(connect.is_available(&offline));
    assert!(!connect.is_available(&domain));
  }

  #[test]
  fn set_rejects_shared_index() {
    let err = ArgumentSet::new([
      ArgumentDefinition::positional("operation", 0),
      ArgumentDefinition::named_or_positional("--path", 0),
    ])
    .unwrap_err();

    assert_eq!(err, DefinitionError::AmbiguousPositional {
      index:  0,
      first:  "operation",
      second: "--path",
    });
  }

  #[test]
  fn set_rejects_overlapping_names() {
    let err = ArgumentSet::new([
      ArgumentDefinition::named("--force").alias("-f"),
      ArgumentDefinition::named("--file").alias("-f"),
    ])
    .unwrap_err();
    assert_eq!(err, DefinitionError::DuplicateName { name: "-f" });

    let err = ArgumentSet::new([ArgumentDefinition::named("")]).unwrap_err();
    assert_eq!(err, DefinitionError::EmptyName);
  }

  #[test]
  fn set_rejects_unknown_references() {
    let err = ArgumentSet::new([
      ArgumentDefinition::named("--all").rule(Rule::ConflictsWith(&["--some"])),
    ])
    .unwrap_err();
    assert_eq!(err, DefinitionError::UnknownReference {
      argument:  "--all",
      reference: "--some",
    });
  }

  #[test]
  fn set_lookup() {
    let set = ArgumentSet::new([
      ArgumentDefinition::positional("operation", 0),
      ArgumentDefinition::named("--force").alias("-f"),
      ArgumentDefinition::named("--host").value_required(),
    ])
    .unwrap();

    assert_eq!(set.len(), 3);
    assert_eq!(set.get("-f").map(|d| d.default_name()), Some("--force"));
    assert_eq!(set.get("operation").map(|d| d.default_name()), Some("operation"));
    assert_eq!(set.at_index(0).map(|d| d.default_name()), Some("operation"));
    assert!(set.at_index(1).is_none());

    let (idx, m) = set.match_name("--host=localhost").unwrap();
    assert_eq!(idx, 2);
    assert_eq!(m.attached, Some("localhost"));
    assert!(set.match_name("operation").is_none());
  }
}
