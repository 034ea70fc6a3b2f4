//! Seams to the host editing surface.
//!
//! The core never assumes a concrete editor: pastes go through
//! [`DocumentSurface`], and custom rule scoping goes through the
//! [`ScopeMatcher`] capability. [`Buffer`] is a minimal in-memory
//! implementation for hosts without a richer document model.

/// One selection, or a cursor when `anchor == head`. Offsets are byte
/// offsets into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
  pub anchor: usize,
  pub head:   usize,
}

impl Range {
  pub const fn new(anchor: usize, head: usize) -> Self {
    Self { anchor, head }
  }

  pub const fn point(at: usize) -> Self {
    Self { anchor: at, head: at }
  }

  /// Start of the range, regardless of direction.
  pub fn from(&self) -> usize {
    self.anchor.min(self.head)
  }

  /// End of the range, regardless of direction.
  pub fn to(&self) -> usize {
    self.anchor.max(self.head)
  }
}

/// Host-provided selector matching. The selector grammar belongs entirely to
/// the host; the core only interprets a score of zero as "does not match".
pub trait ScopeMatcher {
  fn score(&self, point: usize, selector: &str) -> u32;
}

/// The document-editing collaborator: enumerate selections, replace ranges,
/// and move the selections afterwards. Replacements never overlap.
pub trait DocumentSurface: ScopeMatcher {
  fn selections(&self) -> Vec<Range>;
  fn replace(&mut self, range: Range, text: &str);
  fn set_selections(&mut self, ranges: Vec<Range>);
}

/// In-memory document with no scope information, used by the CLI host and in
/// tests.
#[derive(Debug)]
pub struct Buffer {
  text:       String,
  selections: Vec<Range>,
}

impl Buffer {
  pub fn new(text: impl Into<String>) -> Self {
    Self {
      text:       text.into(),
      selections: vec![Range::point(0)],
    }
  }

  pub fn with_selections(text: impl Into<String>, selections: Vec<Range>) -> Self {
    Self {
      text: text.into(),
      selections,
    }
  }

  pub fn text(&self) -> &str {
    &self.text
  }
}

impl Default for Buffer {
  fn default() -> Self {
    Self::new(String::new())
  }
}

impl ScopeMatcher for Buffer {
  fn score(&self, _point: usize, _selector: &str) -> u32 {
    0
  }
}

impl DocumentSurface for Buffer {
  fn selections(&self) -> Vec<Range> {
    self.selections.clone()
  }

  fn replace(&mut self, range: Range, text: &str) {
    self.text.replace_range(range.from()..range.to(), text);
  }

  fn set_selections(&mut self, ranges: Vec<Range>) {
    if !ranges.is_empty() {
      self.selections = ranges;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn range_normalizes_direction() {
    let backwards = Range::new(7, 3);
    assert_eq!(backwards.from(), 3);
    assert_eq!(backwards.to(), 7);
  }

  #[test]
  fn buffer_replace_splices_text() {
    let mut buffer = Buffer::with_selections("hello world", vec![Range::new(6, 11)]);
    buffer.replace(Range::new(6, 11), "there");
    assert_eq!(buffer.text(), "hello there");
  }
}
