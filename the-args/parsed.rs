//! Resolution of a tokenized line against a command's arguments.
//!
//! [`ParsedArguments`] is built fresh for every parse attempt, including each
//! re-parse while the user types, and resolves lazily on first query:
//!
//! 1. Tokens are scanned in order for a name or alias (`--name value` or
//!    `--name=value`). A value-taking argument claims the following token as
//!    its value unless that token is itself an argument name or another
//!    unquoted `--xxx` token.
//! 2. Tokens not claimed by any name are counted in order; the `n`th such
//!    token is the value of the argument with index `n`, unless that argument
//!    was already given by name.
//! 3. Everything else is absent.
//!
//! A lone `--` ends name matching: every later token is positional. Tokens
//! opening with a quote are never treated as names.

use std::cell::OnceCell;

use thiserror::Error;

use crate::{
  argument::{
    ArgumentDefinition,
    ArgumentSet,
    NameMatch,
  },
  command_line::{
    Token,
    tokenize,
  },
};

/// A lookup of an argument value that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
  /// The argument was named on the line but its required value is missing.
  #[error("argument '{name}' is missing a value")]
  RequiredValueMissing { name: &'static str },
}

/// A problem found while resolving the line. These are collected rather than
/// raised so that completion never fails half-way through an edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseProblem {
  #[error("argument '{name}' is missing a value")]
  RequiredValueMissing { name: &'static str },
  #[error("argument '{name}' specified more than once")]
  DuplicateArgument { name: &'static str },
  #[error("argument '{name}' does not accept a value")]
  UnexpectedValue { name: &'static str },
  #[error("unknown argument '{text}'")]
  UnknownArgument { text: String },
  #[error("unexpected argument '{text}'")]
  ExtraPositional { text: String },
}

/// What a token was resolved as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
  /// The name of the definition at this index of the argument set.
  Name(usize),
  /// The value following the name of the definition at this index.
  Value(usize),
  /// The positional value of the definition at this index.
  Positional(usize),
  /// The `--` end-of-options marker.
  EndOfOptions,
  /// A `--name` that matches no definition.
  Unknown,
  /// A positional token with no definition to receive it.
  Extra,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NamedValue {
  /// A flag without a value.
  None,
  /// `--name=value`: the value starts at this byte of the token content.
  Attached { token: usize, offset: usize },
  /// `--name value`
  Next { token: usize },
  Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
  Absent,
  Named { token: usize, value: NamedValue },
  Positional { token: usize },
}

#[derive(Debug, Default)]
struct Resolution {
  claims:           Vec<Option<Claim>>,
  slots:            Vec<Slot>,
  problems:         Vec<ParseProblem>,
  positional_count: usize,
  options_ended:    bool,
}

/// Read-only view answering presence and value queries for one line.
#[derive(Debug)]
pub struct ParsedArguments<'a> {
  arguments:  &'a ArgumentSet,
  tokens:     Vec<Token<'a>>,
  resolution: OnceCell<Resolution>,
}

impl<'a> ParsedArguments<'a> {
  pub fn new(arguments: &'a ArgumentSet, tokens: Vec<Token<'a>>) -> Self {
    Self {
      arguments,
      tokens,
      resolution: OnceCell::new(),
    }
  }

  /// Tokenizes `line` and resolves it against `arguments`.
  pub fn parse(arguments: &'a ArgumentSet, line: &'a str) -> Self {
    Self::new(arguments, tokenize(line))
  }

  pub fn arguments(&self) -> &'a ArgumentSet {
    self.arguments
  }

  pub fn tokens(&self) -> &[Token<'a>] {
    &self.tokens
  }

  fn resolution(&self) -> &Resolution {
    self
      .resolution
      .get_or_init(|| resolve(self.arguments, &self.tokens))
  }

  /// Where `def` sits in the argument set. Definitions of other commands
  /// have no position and are reported absent.
  fn position(&self, def: &ArgumentDefinition) -> Option<usize> {
    self
      .arguments
      .iter()
      .position(|other| other.default_name() == def.default_name())
  }

  fn slot(&self, def: &ArgumentDefinition) -> Slot {
    self
      .position(def)
      .map_or(Slot::Absent, |idx| self.resolution().slots[idx])
  }

  /// Whether the argument was given by name or by position.
  pub fn is_present(&self, def: &ArgumentDefinition) -> bool {
    !matches!(self.slot(def), Slot::Absent)
  }

  /// The argument's value.
  ///
  /// Returns `Ok(None)` when the argument is absent or is a flag without a
  /// value, and an error when it was named but its required value is
  /// missing.
  pub fn value(&self, def: &ArgumentDefinition) -> Result<Option<&str>, ValueError> {
    let text = |token: usize| self.tokens[token].text();
    match self.slot(def) {
      Slot::Absent => Ok(None),
      Slot::Positional { token } => Ok(Some(text(token))),
      Slot::Named { value, .. } => {
        match value {
          NamedValue::None => Ok(None),
          NamedValue::Attached { token, offset } => Ok(Some(&text(token)[offset..])),
          NamedValue::Next { token } => Ok(Some(text(token))),
          NamedValue::Missing => {
            Err(ValueError::RequiredValueMissing {
              name: def.default_name(),
            })
          },
        }
      },
    }
  }

  /// [`Self::is_present`] by default name or alias. Unknown names are absent.
  pub fn has(&self, name: &str) -> bool {
    self
      .arguments
      .get(name)
      .is_some_and(|def| self.is_present(def))
  }

  /// [`Self::value`] by default name or alias. Unknown names are absent.
  pub fn get(&self, name: &str) -> Result<Option<&str>, ValueError> {
    match self.arguments.get(name) {
      Some(def) => self.value(def),
      None => Ok(None),
    }
  }

  /// The definitions present on the line, in definition order.
  pub fn present(&self) -> impl Iterator<Item = &'a ArgumentDefinition> + '_ {
    let slots = &self.resolution().slots;
    self
      .arguments
      .iter()
      .zip(slots)
      .filter(|(_, slot)| !matches!(slot, Slot::Absent))
      .map(|(def, _)| def)
  }

  /// What the token at `index` resolved to.
  pub fn claim(&self, index: usize) -> Option<Claim> {
    self.resolution().claims.get(index).copied().flatten()
  }

  /// The number of positional slots the line fills.
  pub fn positional_count(&self) -> usize {
    self.resolution().positional_count
  }

  /// Whether a `--` marker was seen.
  pub fn options_ended(&self) -> bool {
    self.resolution().options_ended
  }

  /// The value-taking argument named by the last token, when no value has
  /// been typed for it yet.
  pub fn awaiting_value(&self) -> Option<&'a ArgumentDefinition> {
    let last = self.tokens.len().checked_sub(1)?;
    let Some(Claim::Name(idx)) = self.claim(last) else {
      return None;
    };
    let def = &self.arguments.definitions()[idx];
    let attached = def
      .match_name(self.tokens[last].text())
      .and_then(|m| m.attached);
    (def.is_value_required() && attached.is_none()).then_some(def)
  }

  pub fn problems(&self) -> &[ParseProblem] {
    &self.resolution().problems
  }

  /// Fails with the first problem found, for the dispatch layer.
  pub fn check(&self) -> Result<(), ParseProblem> {
    match self.problems().first() {
      Some(problem) => Err(problem.clone()),
      None => Ok(()),
    }
  }
}

fn starts_quoted(token: &Token<'_>) -> bool {
  token.content_start != token.start()
}

/// Whether `token` can be the value of the name before it. Names, `--` and
/// other `--xxx` tokens cannot.
fn usable_as_value(arguments: &ArgumentSet, token: &Token<'_>) -> bool {
  starts_quoted(token) || (!token.text().starts_with("--") && name_of(arguments, token).is_none())
}

fn name_of<'t>(
  arguments: &ArgumentSet,
  token: &'t Token<'_>,
) -> Option<(usize, NameMatch<'t>)> {
  if starts_quoted(token) {
    None
  } else {
    arguments.match_name(token.text())
  }
}

fn resolve(arguments: &ArgumentSet, tokens: &[Token<'_>]) -> Resolution {
  let definitions = arguments.definitions();
  let mut res = Resolution {
    claims: vec![None; tokens.len()],
    slots: vec![Slot::Absent; definitions.len()],
    ..Default::default()
  };

  for (i, token) in tokens.iter().enumerate() {
    if res.claims[i].is_some() || res.options_ended {
      continue;
    }
    if token.text() == "--" && !starts_quoted(token) {
      res.claims[i] = Some(Claim::EndOfOptions);
      res.options_ended = true;
      continue;
    }

    let Some((idx, name_match)) = name_of(arguments, token) else {
      if token.text().starts_with("--") && !starts_quoted(token) {
        res.claims[i] = Some(Claim::Unknown);
        res.problems.push(ParseProblem::UnknownArgument {
          text: token.text().to_string(),
        });
      }
      continue;
    };

    let def = &definitions[idx];
    res.claims[i] = Some(Claim::Name(idx));

    let value = match name_match.attached {
      Some("") if def.is_value_required() => {
        res.problems.push(ParseProblem::RequiredValueMissing {
          name: def.default_name(),
        });
        NamedValue::Missing
      },
      Some(attached) => {
        if !def.is_value_required() {
          res.problems.push(ParseProblem::UnexpectedValue {
            name: def.default_name(),
          });
        }
        NamedValue::Attached {
          token:  i,
          offset: token.text().len() - attached.len(),
        }
      },
      None if def.is_value_required() => {
        let usable = tokens
          .get(i + 1)
          .filter(|next| usable_as_value(arguments, next));
        match usable {
          Some(_) => {
            res.claims[i + 1] = Some(Claim::Value(idx));
            NamedValue::Next { token: i + 1 }
          },
          None => {
            res.problems.push(ParseProblem::RequiredValueMissing {
              name: def.default_name(),
            });
            NamedValue::Missing
          },
        }
      },
      None => NamedValue::None,
    };

    if matches!(res.slots[idx], Slot::Absent) {
      res.slots[idx] = Slot::Named { token: i, value };
    } else {
      res.problems.push(ParseProblem::DuplicateArgument {
        name: def.default_name(),
      });
    }
  }

  for (i, token) in tokens.iter().enumerate() {
    if res.claims[i].is_some() {
      continue;
    }

    let position = res.positional_count;
    res.positional_count += 1;

    let receiver = definitions
      .iter()
      .position(|def| def.index() == Some(position))
      .filter(|idx| matches!(res.slots[*idx], Slot::Absent));

    match receiver {
      Some(idx) => {
        res.slots[idx] = Slot::Positional { token: i };
        res.claims[i] = Some(Claim::Positional(idx));
      },
      None => {
        res.claims[i] = Some(Claim::Extra);
        res.problems.push(ParseProblem::ExtraPositional {
          text: token.text().to_string(),
        });
      },
    }
  }

  tracing::trace!(
    tokens = tokens.len(),
    positionals = res.positional_count,
    problems = res.problems.len(),
    "resolved arguments"
  );

  res
}
