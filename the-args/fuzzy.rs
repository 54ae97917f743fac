//! Fuzzy ranking of completion candidates, powered by [`nucleo`].
//!
//! Candidate lists in the console are small (argument names, a few hundred
//! cached values at most), so matching runs synchronously on the calling
//! thread with a thread-local matcher.
//!
//! Smart case is used: a lowercase pattern matches case-insensitively, a
//! pattern containing uppercase characters matches case-sensitively.

use std::cell::RefCell;

use nucleo::{
  Config,
  Matcher,
  pattern::{
    Atom,
    AtomKind,
    CaseMatching,
    Normalization,
  },
};

thread_local! {
  static MATCHER: RefCell<Matcher> = RefCell::new(Matcher::new(Config::DEFAULT));
}

/// Items matching `pattern`, best match first. Items of equal score keep
/// their input order. An empty pattern keeps every item.
pub fn rank<T: AsRef<str>>(pattern: &str, items: impl IntoIterator<Item = T>) -> Vec<T> {
  MATCHER.with(|matcher| {
    rank_with(&mut matcher.borrow_mut(), pattern, items)
      .into_iter()
      .map(|(item, _)| item)
      .collect()
  })
}

/// [`rank`] with a caller-provided matcher, keeping the scores.
pub fn rank_with<T: AsRef<str>>(
  matcher: &mut Matcher,
  pattern: &str,
  items: impl IntoIterator<Item = T>,
) -> Vec<(T, u16)> {
  let atom = Atom::new(
    pattern,
    CaseMatching::Smart,
    Normalization::Smart,
    AtomKind::Fuzzy,
    false,
  );
  atom.match_list(items, matcher)
}
