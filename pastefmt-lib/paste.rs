//! The paste orchestrator: glue between the clipboard, the settings layers,
//! the rule engine and the document surface.

use toml::Table;

use crate::{
  clipboard::{
    ClipboardSource,
    HtmlCapture,
    Result,
  },
  config::{
    self,
    FormatterConfig,
    HtmlFormatterConfig,
  },
  custom::{
    self,
    CustomRule,
  },
  document::{
    DocumentSurface,
    Range,
  },
  html,
  rules,
  settings::{
    self,
    SettingsStore,
  },
};

/// Arguments to one paste invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasteRequest {
  /// Prefer the clipboard's HTML flavor. Degrades silently to plain text
  /// when capture is unsupported or fails.
  pub html: bool,
}

/// Format the clipboard contents and insert them at every selection.
///
/// The built-in stages run once on the shared clipboard text; custom rules
/// run per target with their own scope and dedup state. Cursors end up
/// collapsed at the end of each insertion.
pub fn paste(
  doc: &mut dyn DocumentSurface,
  clipboard: &dyn ClipboardSource,
  capture: &dyn HtmlCapture,
  base: &dyn SettingsStore,
  project: Option<&Table>,
  request: PasteRequest,
) -> Result<()> {
  let html_text = if request.html {
    capture_html(capture, base, project)
  } else {
    None
  };
  let from_html = html_text.is_some();

  let text = match html_text {
    Some(text) => text,
    None => clipboard.contents()?,
  };

  let formatter = merged_formatter_config(base, project);
  let formatted = rules::apply(&text, &formatter, from_html);

  let custom_rules = if formatter.allow_custom {
    merged_custom_rules(base, project)
  } else {
    Vec::new()
  };

  let mut targets = doc.selections();
  targets.sort_by_key(Range::from);

  // Replacements shift everything behind them; track the running delta so
  // later targets land where the host currently has them.
  let mut delta = 0isize;
  let mut cursors = Vec::with_capacity(targets.len());
  for target in targets {
    let start = target.from().saturating_add_signed(delta);
    let end = target.to().saturating_add_signed(delta);

    let clip = custom::run_custom(&formatted, &custom_rules, start, from_html, &*doc);
    doc.replace(Range::new(start, end), &clip);

    cursors.push(Range::point(start + clip.len()));
    delta += clip.len() as isize - (end - start) as isize;
  }
  doc.set_selections(cursors);

  Ok(())
}

/// The effective configuration for this invocation: base store overlaid by
/// the project layer, restricted to the recognized option names.
pub fn merged_formatter_config(base: &dyn SettingsStore, project: Option<&Table>) -> FormatterConfig {
  match settings::merge_settings(
    config::FORMATTER_SETTINGS_KEY,
    base,
    project,
    Some(config::FORMATTER_OPTIONS),
  ) {
    Some(value) => FormatterConfig::from_value(&value),
    None => FormatterConfig::default(),
  }
}

fn merged_custom_rules(base: &dyn SettingsStore, project: Option<&Table>) -> Vec<CustomRule> {
  settings::merge_settings(config::CUSTOM_FORMATTER_SETTINGS_KEY, base, project, None)
    .map(custom::rules_from_value)
    .unwrap_or_default()
}

fn capture_html(
  capture: &dyn HtmlCapture,
  base: &dyn SettingsStore,
  project: Option<&Table>,
) -> Option<String> {
  if !capture.supported() {
    return None;
  }

  let raw = match capture.capture() {
    Ok(Some(raw)) if !raw.is_empty() => raw,
    Ok(_) => return None,
    Err(err) => {
      log::warn!("html capture failed, falling back to plain text: {err}");
      return None;
    },
  };

  let html_config =
    match settings::merge_settings(config::HTML_FORMATTER_SETTINGS_KEY, base, project, None) {
      Some(value) => HtmlFormatterConfig::from_value(&value),
      None => HtmlFormatterConfig::default(),
    };

  Some(html::sanitize(&raw, &html_config))
}

#[cfg(test)]
mod tests {
  use std::borrow::Cow;

  use super::*;
  use crate::{
    clipboard::{
      ClipboardError,
      NoHtmlCapture,
    },
    document::Buffer,
    settings::MemoryStore,
  };

  struct FixedClipboard(&'static str);

  impl ClipboardSource for FixedClipboard {
    fn name(&self) -> Cow<'_, str> {
      "fixed".into()
    }

    fn contents(&self) -> Result<String> {
      Ok(self.0.to_owned())
    }
  }

  struct FixedHtml(&'static str);

  impl HtmlCapture for FixedHtml {
    fn supported(&self) -> bool {
      true
    }

    fn capture(&self) -> Result<Option<String>> {
      Ok(Some(self.0.to_owned()))
    }
  }

  struct FailingHtml;

  impl HtmlCapture for FailingHtml {
    fn supported(&self) -> bool {
      true
    }

    fn capture(&self) -> Result<Option<String>> {
      Err(ClipboardError::CommandFailed)
    }
  }

  fn store(content: &str) -> MemoryStore {
    MemoryStore::new(toml::from_str(content).unwrap())
  }

  #[test]
  fn pastes_formatted_text_at_every_target() {
    let base = store("paste_formatter = { trim = true }");
    let mut doc = Buffer::with_selections("[1] \n[2] \n", vec![
      Range::point(4),
      Range::point(9),
    ]);

    paste(
      &mut doc,
      &FixedClipboard("  pasted  "),
      &NoHtmlCapture,
      &base,
      None,
      PasteRequest::default(),
    )
    .unwrap();

    assert_eq!(doc.text(), "[1] pasted\n[2] pasted\n");
    assert_eq!(doc.selections(), vec![Range::point(10), Range::point(21)]);
  }

  #[test]
  fn selections_are_replaced_not_appended() {
    let base = store("paste_formatter = {}");
    let mut doc = Buffer::with_selections("aaa XXX bbb", vec![Range::new(4, 7)]);

    paste(
      &mut doc,
      &FixedClipboard("new"),
      &NoHtmlCapture,
      &base,
      None,
      PasteRequest::default(),
    )
    .unwrap();

    assert_eq!(doc.text(), "aaa new bbb");
    assert_eq!(doc.selections(), vec![Range::point(7)]);
  }

  #[test]
  fn custom_dedup_state_is_per_target() {
    let base = store(
      r#"
      paste_formatter = { allow_custom = true }
      paste_formatter_custom = [{ find = "x", replace = "y", id = "once" }]
      "#,
    );
    let mut doc = Buffer::with_selections("- \n- \n", vec![Range::point(2), Range::point(5)]);

    paste(
      &mut doc,
      &FixedClipboard("x"),
      &NoHtmlCapture,
      &base,
      None,
      PasteRequest::default(),
    )
    .unwrap();

    // Both targets get the rule applied: `ran` ids never leak across targets.
    assert_eq!(doc.text(), "- y\n- y\n");
  }

  #[test]
  fn html_paste_sanitizes_and_skips_reescaping() {
    let base = store("paste_formatter = { escape_html = true }");
    let mut doc = Buffer::default();

    paste(
      &mut doc,
      &FixedClipboard("unused"),
      &FixedHtml("<body><div><b class=\"x\">ok</b></div></body>"),
      &base,
      None,
      PasteRequest { html: true },
    )
    .unwrap();

    assert_eq!(doc.text(), "<b>ok</b>");
  }

  #[test]
  fn failed_capture_falls_back_to_plain_clipboard() {
    let base = store("paste_formatter = { escape_html = true }");
    let mut doc = Buffer::default();

    paste(
      &mut doc,
      &FixedClipboard("a < b"),
      &FailingHtml,
      &base,
      None,
      PasteRequest { html: true },
    )
    .unwrap();

    assert_eq!(doc.text(), "a &lt; b");
  }

  #[test]
  fn project_layer_overrides_recognized_options_only() {
    let base = store("paste_formatter = { trim = true, nltobr = false }");
    let project: Table = toml::from_str(
      r#"paste_formatter = { nltobr = true, invented = true }"#,
    )
    .unwrap();

    let config = merged_formatter_config(&base, Some(&project));
    assert!(config.trim);
    assert!(config.nltobr);
  }

  #[test]
  fn custom_rules_require_the_allow_flag() {
    let base = store(
      r#"
      paste_formatter = { allow_custom = false }
      paste_formatter_custom = [{ find = "x", replace = "y" }]
      "#,
    );
    let mut doc = Buffer::default();

    paste(
      &mut doc,
      &FixedClipboard("x"),
      &NoHtmlCapture,
      &base,
      None,
      PasteRequest::default(),
    )
    .unwrap();

    assert_eq!(doc.text(), "x");
  }
}
