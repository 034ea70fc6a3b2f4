//! Built-in transformation stages.
//!
//! Stages run in a fixed order, each gated by its own flag and feeding the
//! next. Substitutions are best-effort: a pattern matching nothing is a
//! no-op, and no stage can fail on well-formed input.

use std::sync::LazyLock;

use regex::{
  Captures,
  Regex,
};

use crate::{
  config::FormatterConfig,
  pattern,
};

// Soft-return control character some creative-suite applications emit as a
// paragraph break.
const SOFT_RETURN: char = '\u{3}';

static WHITESPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| pattern(r"[^\S\n]{2,}"));
static LINEBREAK_RUNS: LazyLock<Regex> = LazyLock::new(|| pattern(r"[\n\r]{2,}"));
static BULLETS: LazyLock<Regex> = LazyLock::new(|| pattern(r"•\s*"));
static NEWLINES: LazyLock<Regex> = LazyLock::new(|| pattern(r"(\n\r?)"));

static BRACKET_OPEN_SPACE: LazyLock<Regex> =
  LazyLock::new(|| pattern(r"([^ \]()\[{}])([\[({])"));
static BRACKET_OPEN_PAD: LazyLock<Regex> = LazyLock::new(|| pattern(r"([\[({])\s+"));
static BRACKET_CLOSE_PAD: LazyLock<Regex> = LazyLock::new(|| pattern(r"\s+([\])}])\s*"));
static BRACKET_CLOSE_SPACE: LazyLock<Regex> =
  LazyLock::new(|| pattern(r"([\])}])(\p{L}\p{M}*|[\w-])"));

static PUNCT_LEADING_WS: LazyLock<Regex> = LazyLock::new(|| pattern(r"\s*([!?/;:.,])"));
static PUNCT_SPACING: LazyLock<Regex> = LazyLock::new(|| pattern(r"([!?/;:.,])([^!?/;:.,])"));
static INVERTED_PUNCT_PAD: LazyLock<Regex> = LazyLock::new(|| pattern(r"([¿¡]) +"));

static TRADEMARKS: LazyLock<Regex> = LazyLock::new(|| pattern(r" *(®|&reg;)"));

/// Run every enabled stage over `text`.
///
/// `from_html` marks text that came through the HTML sanitizer; such text is
/// never HTML-escaped again.
pub fn apply(text: &str, config: &FormatterConfig, from_html: bool) -> String {
  let mut out = text.to_owned();

  if config.photoshop {
    out = out.replace(SOFT_RETURN, "\n");
  }
  if config.trim {
    out = out.trim().to_owned();
  }
  if config.clean_whitespace {
    out = WHITESPACE_RUNS.replace_all(&out, " ").into_owned();
  }
  if config.clean_linebreaks {
    out = LINEBREAK_RUNS.replace_all(&out, "\n").into_owned();
  }
  if config.clean_brackets {
    out = clean_brackets(&out);
  }
  if config.clean_punctuation {
    out = clean_punctuation(&out);
  }
  if config.remove_bullets {
    out = BULLETS.replace_all(&out, "").into_owned();
  }
  if config.escape_html && !from_html {
    out = escape_html(&out, config.escape_quotes);
  }
  if config.registered_tm {
    out = superscript_trademarks(&out);
  }
  if config.nltobr {
    out = NEWLINES.replace_all(&out, "<br>$1").into_owned();
  }

  out
}

fn clean_brackets(text: &str) -> String {
  let out = BRACKET_OPEN_SPACE.replace_all(text, "$1 $2");
  let out = BRACKET_OPEN_PAD.replace_all(&out, "$1");
  // Note: this also eats whitespace trailing the closing bracket; the next
  // pass restores a single space when a word character follows.
  let out = BRACKET_CLOSE_PAD.replace_all(&out, "$1");
  BRACKET_CLOSE_SPACE.replace_all(&out, "$1 $2").into_owned()
}

fn clean_punctuation(text: &str) -> String {
  let out = PUNCT_LEADING_WS.replace_all(text, "$1").into_owned();
  let out = space_after_punctuation(&out);
  // The separate number-context spacing rule is pinned as inert: it requires
  // a tag opener in the position the punctuation itself occupies, which no
  // input can satisfy. Numeric contexts are instead kept tight by the digit
  // guard above; characterization tests lock this in.
  INVERTED_PUNCT_PAD.replace_all(&out, "$1").into_owned()
}

/// Insert a space after sentence punctuation unless another punctuation
/// character follows or a digit precedes (decimal and thousands separators
/// stay tight).
fn space_after_punctuation(text: &str) -> String {
  PUNCT_SPACING
    .replace_all(text, |caps: &Captures| {
      let start = caps.get(0).map_or(0, |m| m.start());
      let after_digit = text[..start]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_digit());
      if after_digit {
        caps[0].to_owned()
      } else {
        format!("{} {}", &caps[1], &caps[2])
      }
    })
    .into_owned()
}

/// HTML-entity escape; quotes only when asked.
fn escape_html(text: &str, escape_quotes: bool) -> String {
  let mut out = text
    .replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;");
  if escape_quotes {
    out = out.replace('"', "&quot;").replace('\'', "&#x27;");
  }
  out
}

/// Wrap registered-trademark glyphs in `<sup>`, swallowing any padding before
/// them. Glyphs already inside a `<sup>` are left alone, which makes the
/// stage idempotent.
fn superscript_trademarks(text: &str) -> String {
  TRADEMARKS
    .replace_all(text, |caps: &Captures| {
      let start = caps.get(0).map_or(0, |m| m.start());
      let before = &text[..start];
      if before.ends_with("<sup>") || before.ends_with("<SUP>") {
        caps[0].to_owned()
      } else {
        format!("<sup>{}</sup>", &caps[1])
      }
    })
    .into_owned()
}
