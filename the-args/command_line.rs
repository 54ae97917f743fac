//! Tokenizer and line model for console command input.
//!
//! The tokenizer is total: it never fails, whatever the user has typed so
//! far. A quote without a closing partner is kept as a literal character so
//! that completion keeps working while the user is in the middle of an edit.
//!
//! # Quoting Rules
//!
//! | Syntax | Behavior |
//! |--------|----------|
//! | `foo` | Unquoted, split on whitespace |
//! | `'foo bar'` | Single-quoted, one token |
//! | `"foo bar"` | Double-quoted, one token |
//! | `` `foo bar` `` | Backtick-quoted, one token |
//! | `--name="a b"` | Quotes may open in the middle of a token |
//! | `foo\ bar` | Backslash escapes whitespace, quotes and backslash |
//!
//! Quotes are escaped by doubling: `'it''s'` becomes `it's`.
//!
//! Every [`Token`] keeps the raw byte span it was read from so that
//! completion can find the token under the cursor.

use std::{
  borrow::Cow,
  ops::Range,
};

/// Splits a command line into the command and arguments parts.
///
/// The third tuple member describes whether the command part is finished. When
/// this boolean is false the completion code for the command line should
/// complete command names, otherwise command arguments.
pub fn split(line: &str) -> (&str, &str, bool) {
  const SEPARATOR_PATTERN: [char; 2] = [' ', '\t'];

  let line = line.trim_start_matches(SEPARATOR_PATTERN);
  let (command, rest) = line.split_once(SEPARATOR_PATTERN).unwrap_or((line, ""));

  let complete_command =
    command.is_empty() || (rest.trim().is_empty() && !line.ends_with(SEPARATOR_PATTERN));

  (command, rest, !complete_command)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
  Single,
  Double,
  Backtick,
}

impl Quote {
  pub const fn from_byte(byte: u8) -> Option<Self> {
    match byte {
      b'\'' => Some(Self::Single),
      b'"' => Some(Self::Double),
      b'`' => Some(Self::Backtick),
      _ => None,
    }
  }

  pub const fn char(&self) -> char {
    match self {
      Self::Single => '\'',
      Self::Double => '"',
      Self::Backtick => '`',
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
  /// The raw byte range of the token in the input, quotes and escapes
  /// included.
  pub span:          Range<usize>,
  /// The byte index into the input where the token's content starts.
  ///
  /// For a token opening with a quote this is the byte after the quote.
  pub content_start: usize,
  /// The unescaped content of the token.
  ///
  /// Borrowed from the input unless quoting or escaping changed it.
  pub content:       Cow<'a, str>,
  /// The first quote style used inside the token, if any.
  pub quote:         Option<Quote>,
}

impl<'a> Token<'a> {
  /// A zero-width token, used when the cursor sits on whitespace.
  pub fn empty_at(offset: usize) -> Self {
    Self {
      span:          offset..offset,
      content_start: offset,
      content:       Cow::Borrowed(""),
      quote:         None,
    }
  }

  pub fn start(&self) -> usize {
    self.span.start
  }

  pub fn end(&self) -> usize {
    self.span.end
  }

  pub fn text(&self) -> &str {
    self.content.as_ref()
  }

  pub fn is_quoted(&self) -> bool {
    self.quote.is_some()
  }

  /// Whether `offset` touches this token (its end included).
  pub fn contains(&self, offset: usize) -> bool {
    self.span.start <= offset && offset <= self.span.end
  }
}

#[derive(Debug)]
pub struct Tokenizer<'a> {
  input: &'a str,
  /// The current byte index of the input being considered.
  pos:   usize,
}

impl<'a> Tokenizer<'a> {
  pub fn new(input: &'a str) -> Self {
    Self { input, pos: 0 }
  }

  /// Returns the current byte index position of the parser in the input.
  pub fn pos(&self) -> usize {
    self.pos
  }

  fn byte(&self) -> Option<u8> {
    self.input.as_bytes().get(self.pos).copied()
  }

  fn peek_byte(&self) -> Option<u8> {
    self.input.as_bytes().get(self.pos + 1).copied()
  }

  fn skip_blanks(&mut self) {
    while let Some(b' ' | b'\t') = self.byte() {
      self.pos += 1;
    }
  }

  /// Reads a quoted section starting at the quote under the cursor.
  ///
  /// Returns the inner content and the position after the closing quote, or
  /// `None` if the quote is never closed. The tokenizer does not move.
  fn read_quoted(&self, quote: u8) -> Option<(Cow<'a, str>, usize)> {
    debug_assert_eq!(self.byte(), Some(quote));
    let mut from = self.pos + 1;
    let mut escaped = String::new();

    while let Some(offset) = self.input[from..].find(quote as char) {
      let idx = from + offset;
      if self.input.as_bytes().get(idx + 1) == Some(&quote) {
        // Treat two quotes in a row as an escape.
        escaped.push_str(&self.input[from..idx + 1]);
        from = idx + 2;
      } else {
        let quoted = if escaped.is_empty() {
          Cow::Borrowed(&self.input[from..idx])
        } else {
          escaped.push_str(&self.input[from..idx]);
          Cow::Owned(escaped)
        };
        return Some((quoted, idx + 1));
      }
    }

    None
  }
}

/// Accumulates token content, borrowing from the input for as long as no
/// quote or escape forces a copy.
struct Content<'a> {
  input:       &'a str,
  owned:       Option<String>,
  segment_pos: usize,
}

impl<'a> Content<'a> {
  fn new(input: &'a str, start: usize) -> Self {
    Self {
      input,
      owned: None,
      segment_pos: start,
    }
  }

  /// Copies the pending borrowed segment up to `end` and skips to `resume`.
  fn flush(&mut self, end: usize, resume: usize) -> &mut String {
    let owned = self.owned.get_or_insert_with(String::new);
    owned.push_str(&self.input[self.segment_pos..end]);
    self.segment_pos = resume;
    owned
  }

  fn finish(mut self, end: usize) -> Cow<'a, str> {
    match self.owned.take() {
      Some(mut owned) => {
        owned.push_str(&self.input[self.segment_pos..end]);
        Cow::Owned(owned)
      },
      None => Cow::Borrowed(&self.input[self.segment_pos..end]),
    }
  }
}

impl<'a> Iterator for Tokenizer<'a> {
  type Item = Token<'a>;

  fn next(&mut self) -> Option<Self::Item> {
    self.skip_blanks();

    let start = self.pos;
    self.byte()?;
    let mut content = Content::new(self.input, start);
    let mut content_start = start;
    let mut quote = None;

    while let Some(byte) = self.byte() {
      match byte {
        b' ' | b'\t' => break,
        b'\\' => {
          match self.peek_byte() {
            // Trailing backslash is dropped, this improves completions.
            None => {
              content.flush(self.pos, self.pos + 1);
              self.pos += 1;
            },
            Some(next @ (b' ' | b'\t' | b'\'' | b'"' | b'`' | b'\\')) => {
              content.flush(self.pos, self.pos + 2).push(next as char);
              self.pos += 2;
            },
            Some(_) => self.pos += 1,
          }
        },
        b'\'' | b'"' | b'`' => {
          match self.read_quoted(byte) {
            Some((quoted, resume)) => {
              if self.pos == start {
                content_start = start + 1;
              }
              content.flush(self.pos, resume).push_str(&quoted);
              if quote.is_none() {
                quote = Quote::from_byte(byte);
              }
              self.pos = resume;
            },
            // An unmatched quote is a literal character.
            None => self.pos += 1,
          }
        },
        _ => self.pos += 1,
      }
    }

    tracing::trace!(start, end = self.pos, "token");

    Some(Token {
      span: start..self.pos,
      content_start,
      content: content.finish(self.pos),
      quote,
    })
  }
}

/// Splits `input` into tokens. Never fails.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
  Tokenizer::new(input).collect()
}

/// A snapshot of the line being edited: its text, tokens and cursor.
#[derive(Debug, Clone)]
pub struct CommandLine<'a> {
  text:   &'a str,
  tokens: Vec<Token<'a>>,
  cursor: usize,
}

impl<'a> CommandLine<'a> {
  /// Tokenizes `text`. The cursor is clamped into the text and onto a char
  /// boundary.
  pub fn new(text: &'a str, cursor: usize) -> Self {
    let mut cursor = cursor.min(text.len());
    while !text.is_char_boundary(cursor) {
      cursor -= 1;
    }

    Self {
      text,
      tokens: tokenize(text),
      cursor,
    }
  }

  /// A line with the cursor at its end.
  pub fn at_end(text: &'a str) -> Self {
    Self::new(text, text.len())
  }

  pub fn text(&self) -> &'a str {
    self.text
  }

  pub fn tokens(&self) -> &[Token<'a>] {
    &self.tokens
  }

  pub fn cursor(&self) -> usize {
    self.cursor
  }

  /// Index of the token touching `offset`.
  pub fn token_at(&self, offset: usize) -> Option<usize> {
    self.tokens.iter().position(|token| token.contains(offset))
  }

  /// Index of the token currently being edited.
  pub fn editing(&self) -> Option<usize> {
    self.token_at(self.cursor)
  }

  /// Tokens that lie completely before the token under the cursor.
  pub fn completed_tokens(&self) -> &[Token<'a>] {
    let end = self.editing().unwrap_or_else(|| {
      self
        .tokens
        .iter()
        .take_while(|token| token.end() < self.cursor)
        .count()
    });
    &self.tokens[..end]
  }
}
