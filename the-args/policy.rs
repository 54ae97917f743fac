//! Which arguments may be typed next.
//!
//! The candidate set for name completion is every argument of the command that
//! is available in the current session and allowed by the sequencing rules
//! given what is already on the line. It is recomputed on every request.

use crate::{
  argument::{
    ArgumentDefinition,
    ArgumentKind,
    ArgumentSet,
    Rule,
  },
  config::{
    CompletionConfig,
    SortOrder,
  },
  context::CommandContext,
  fuzzy,
  parsed::ParsedArguments,
};

/// Decides whether `def` may appear next on a line resolved as `parsed`.
pub fn can_appear_next(def: &ArgumentDefinition, parsed: &ParsedArguments<'_>) -> bool {
  if parsed.is_present(def) {
    return false;
  }

  // A positional-only argument is only offered for the next free slot, so the
  // line never gets a gap that a later token would fill ambiguously. After
  // `--` the same holds for arguments that could also be named.
  match def.kind() {
    ArgumentKind::Positional(index) if parsed.positional_count() != index => return false,
    ArgumentKind::NamedOrPositional(index)
      if parsed.options_ended() && parsed.positional_count() != index =>
    {
      return false;
    },
    ArgumentKind::Named if parsed.options_ended() => return false,
    _ => {},
  }

  if parsed.present().next().is_some() && def.rules().contains(&Rule::Exclusive) {
    return false;
  }

  for other in parsed.present() {
    let blocks = other.rules().iter().any(|rule| {
      match rule {
        Rule::Exclusive => true,
        Rule::ConflictsWith(names) => names.contains(&def.default_name()),
        _ => false,
      }
    });
    if blocks {
      return false;
    }
  }

  def.rules().iter().all(|rule| {
    match rule {
      Rule::Exclusive => true,
      Rule::ConflictsWith(names) => !names.iter().any(|name| parsed.has(name)),
      Rule::RequiresAny(names) => names.iter().any(|name| parsed.has(name)),
      Rule::RequiresValue { argument, values } => {
        matches!(parsed.get(argument), Ok(Some(value)) if values.contains(&value))
      },
    }
  })
}

/// The arguments that may be typed next, in definition order.
pub fn candidates<'a>(
  arguments: &'a ArgumentSet,
  parsed: &ParsedArguments<'_>,
  ctx: &dyn CommandContext,
) -> Vec<&'a ArgumentDefinition> {
  arguments
    .iter()
    .filter(|def| def.is_available(ctx) && def.can_appear_next(parsed))
    .collect()
}

/// The name to offer for `def` given the typed prefix: the default name when
/// it matches, otherwise the first matching alias.
fn offered_name(def: &ArgumentDefinition, prefix: &str) -> Option<&'static str> {
  let mut names = def.names();
  let default = names.next()?;
  if default.starts_with(prefix) {
    return Some(default);
  }
  names.find(|alias| alias.starts_with(prefix))
}

/// Argument names that may be typed next and match `prefix`.
///
/// Names are sorted lexicographically unless the config asks for definition
/// order. Fuzzy matching ranks by score instead.
pub fn candidate_names<'a>(
  arguments: &'a ArgumentSet,
  parsed: &ParsedArguments<'_>,
  ctx: &dyn CommandContext,
  prefix: &str,
  config: &CompletionConfig,
) -> Vec<&'a ArgumentDefinition> {
  let candidates = candidates(arguments, parsed, ctx)
    .into_iter()
    .filter(|def| def.kind().matches_name());

  let mut matched: Vec<_> = if config.matching.is_fuzzy() {
    let names: Vec<_> = candidates.map(|def| (def.default_name(), def)).collect();
    let ranked = fuzzy::rank(prefix.trim_start_matches('-'), names.iter().map(|(n, _)| *n));
    ranked
      .into_iter()
      .filter_map(|name| names.iter().find(|(n, _)| *n == name).map(|(_, def)| *def))
      .collect()
  } else {
    candidates
      .filter(|def| offered_name(def, prefix).is_some())
      .collect()
  };

  if !config.matching.is_fuzzy() && config.sort == SortOrder::Lexicographic {
    matched.sort_by_key(|def| offered_name(def, prefix).unwrap_or(def.default_name()));
  }

  matched
}

/// The name of `def` to insert when completing `prefix`.
pub fn completion_name(def: &ArgumentDefinition, prefix: &str) -> &'static str {
  offered_name(def, prefix).unwrap_or(def.default_name())
}
