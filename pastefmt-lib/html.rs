//! Best-effort cleanup of raw clipboard HTML.
//!
//! This is not an HTML parser. Applications put wildly over-specified markup
//! on the clipboard; a handful of passes reduce it to a small inline subset
//! that survives pasting into text documents.

use std::sync::LazyLock;

use regex::{
  Captures,
  Regex,
};

use crate::{
  config::HtmlFormatterConfig,
  pattern,
};

static PRE_BODY: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)^.*<body.*?>"));
static POST_BODY: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)</body.*?>.*$"));
static STYLE_BLOCKS: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?is)<style[^>]*>.*?</style>"));
static SCRIPT_BLOCKS: LazyLock<Regex> =
  LazyLock::new(|| pattern(r"(?is)<script[^>]*>.*?</script>"));
static TAGS: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?s)<(/?)([a-zA-Z][a-zA-Z0-9]*)[^>]*>"));
static ADJACENT_PAIR: LazyLock<Regex> =
  LazyLock::new(|| pattern(r"</([a-zA-Z]+)>\s*<([a-zA-Z]+)>"));
static WRAPPED_LINES: LazyLock<Regex> = LazyLock::new(|| pattern(r"\n\r? "));

/// Reduce raw clipboard HTML to allow-listed inline markup.
///
/// Passes, in order: keep only the `<body>` contents, drop style and script
/// blocks with their contents, strip disallowed tags and all attributes,
/// collapse redundant `</tag><tag>` pairs, trim, and optionally unwrap
/// line-wrapped text.
pub fn sanitize(raw: &str, config: &HtmlFormatterConfig) -> String {
  let out = PRE_BODY.replace(raw, "");
  let out = POST_BODY.replace(&out, "");
  let out = STYLE_BLOCKS.replace_all(&out, "");
  let out = SCRIPT_BLOCKS.replace_all(&out, "");
  let out = filter_tags(&out, &config.allowed_tags);
  let out = collapse_adjacent_pairs(&out);
  let mut out = out.trim().to_owned();
  if config.remove_wrap {
    out = WRAPPED_LINES.replace_all(&out, " ").into_owned();
  }
  out
}

/// Keep allow-listed tags (shorn of attributes), drop everything else.
fn filter_tags(text: &str, allowed: &[String]) -> String {
  TAGS
    .replace_all(text, |caps: &Captures| {
      let name = &caps[2];
      if allowed.iter().any(|tag| tag.eq_ignore_ascii_case(name)) {
        format!("<{}{}>", &caps[1], name)
      } else {
        String::new()
      }
    })
    .into_owned()
}

/// Collapse an immediately-adjacent close/open pair of the same tag
/// (`</b><b>` and the like), which some applications emit per word.
fn collapse_adjacent_pairs(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut rest = text;

  while let Some(caps) = ADJACENT_PAIR.captures(rest) {
    let Some(whole) = caps.get(0) else { break };
    if caps[1].eq_ignore_ascii_case(&caps[2]) {
      out.push_str(&rest[..whole.start()]);
      rest = &rest[whole.end()..];
    } else {
      // Different tags: emit through the close tag and rescan from the open
      // tag, which may itself start a collapsible pair.
      let close_end = caps.get(1).map_or(whole.end(), |name| name.end() + 1);
      out.push_str(&rest[..close_end]);
      rest = &rest[close_end..];
    }
  }

  out.push_str(rest);
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sanitize_default(raw: &str) -> String {
    sanitize(raw, &HtmlFormatterConfig::default())
  }

  #[test]
  fn only_body_contents_survive() {
    let raw = "<html><head><title>t</title></head>\n<body class=\"x\">hello</body>\ntrailer";
    assert_eq!(sanitize_default(raw), "hello");
  }

  #[test]
  fn disallowed_tags_are_stripped_and_blocks_removed_entirely() {
    let raw = "<body><div><script>x</script><b>ok</b></div></body>";
    assert_eq!(sanitize_default(raw), "<b>ok</b>");
  }

  #[test]
  fn style_blocks_vanish_with_their_contents() {
    let raw = "<body><style type=\"text/css\">p { color: red; }</style>text</body>";
    assert_eq!(sanitize_default(raw), "text");
  }

  #[test]
  fn attributes_are_stripped_from_surviving_tags() {
    let raw = "<body><em style=\"font: x\">word</em></body>";
    assert_eq!(sanitize_default(raw), "<em>word</em>");
  }

  #[test]
  fn adjacent_same_tag_pairs_collapse() {
    let raw = "<body><b>one</b><b>two</b><b>three</b> tail</body>";
    assert_eq!(sanitize_default(raw), "<b>onetwothree</b> tail");
  }

  #[test]
  fn adjacent_different_tags_stay() {
    let raw = "<body><b>a</b><i>b</i></body>";
    assert_eq!(sanitize_default(raw), "<b>a</b><i>b</i>");
  }

  #[test]
  fn remove_wrap_unwraps_single_space_continuations() {
    let config = HtmlFormatterConfig {
      remove_wrap: true,
      ..HtmlFormatterConfig::default()
    };
    let raw = "<body>wrapped\n line</body>";
    assert_eq!(sanitize(raw, &config), "wrapped line");
  }

  #[test]
  fn custom_allow_list_is_honored() {
    let config = HtmlFormatterConfig {
      remove_wrap:  false,
      allowed_tags: vec!["code".to_owned()],
    };
    let raw = "<body><code>x</code> and <b>y</b></body>";
    assert_eq!(sanitize(raw, &config), "<code>x</code> and y");
  }

  #[test]
  fn text_without_body_tags_passes_through() {
    assert_eq!(sanitize_default("plain <b>text</b>"), "plain <b>text</b>");
  }
}
