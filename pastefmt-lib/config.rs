//! Configuration model for the formatting pipeline.

use serde::{
  Deserialize,
  Serialize,
};
use toml::Value;

/// Settings block holding the built-in formatter flags.
pub const FORMATTER_SETTINGS_KEY: &str = "paste_formatter";
/// Settings block holding the HTML sanitizer options.
pub const HTML_FORMATTER_SETTINGS_KEY: &str = "paste_html_formatter";
/// Settings block holding the ordered custom rule list.
pub const CUSTOM_FORMATTER_SETTINGS_KEY: &str = "paste_formatter_custom";

/// The recognized formatter option names, in stage order. Only these keys are
/// merged from project overrides and accepted by the toggle command.
pub const FORMATTER_OPTIONS: &[&str] = &[
  "trim",
  "photoshop",
  "clean_whitespace",
  "clean_linebreaks",
  "clean_brackets",
  "clean_punctuation",
  "remove_bullets",
  "escape_html",
  "escape_quotes",
  "registered_tm",
  "nltobr",
  "allow_custom",
];

/// Effective configuration for one paste invocation.
///
/// Every option has a definite value by the time the rule engine runs:
/// anything absent from the merged settings defaults to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
  pub trim:              bool,
  pub photoshop:         bool,
  pub clean_whitespace:  bool,
  pub clean_linebreaks:  bool,
  pub clean_brackets:    bool,
  pub clean_punctuation: bool,
  pub remove_bullets:    bool,
  pub escape_html:       bool,
  pub escape_quotes:     bool,
  pub registered_tm:     bool,
  pub nltobr:            bool,
  pub allow_custom:      bool,
}

impl FormatterConfig {
  /// Build a config from a merged settings value.
  ///
  /// Unknown keys and non-boolean values are ignored rather than failing, so
  /// a malformed entry degrades to that option's default.
  pub fn from_value(value: &Value) -> Self {
    let mut config = Self::default();
    if let Some(table) = value.as_table() {
      for (key, value) in table {
        if let Some(flag) = value.as_bool() {
          config.set(key, flag);
        }
      }
    }
    config
  }

  pub fn is_option(name: &str) -> bool {
    FORMATTER_OPTIONS.contains(&name)
  }

  /// Current value of a recognized option, `None` for unknown names.
  pub fn get(&self, option: &str) -> Option<bool> {
    let value = match option {
      "trim" => self.trim,
      "photoshop" => self.photoshop,
      "clean_whitespace" => self.clean_whitespace,
      "clean_linebreaks" => self.clean_linebreaks,
      "clean_brackets" => self.clean_brackets,
      "clean_punctuation" => self.clean_punctuation,
      "remove_bullets" => self.remove_bullets,
      "escape_html" => self.escape_html,
      "escape_quotes" => self.escape_quotes,
      "registered_tm" => self.registered_tm,
      "nltobr" => self.nltobr,
      "allow_custom" => self.allow_custom,
      _ => return None,
    };
    Some(value)
  }

  /// Set a recognized option, returning whether the name was known.
  pub fn set(&mut self, option: &str, value: bool) -> bool {
    let slot = match option {
      "trim" => &mut self.trim,
      "photoshop" => &mut self.photoshop,
      "clean_whitespace" => &mut self.clean_whitespace,
      "clean_linebreaks" => &mut self.clean_linebreaks,
      "clean_brackets" => &mut self.clean_brackets,
      "clean_punctuation" => &mut self.clean_punctuation,
      "remove_bullets" => &mut self.remove_bullets,
      "escape_html" => &mut self.escape_html,
      "escape_quotes" => &mut self.escape_quotes,
      "registered_tm" => &mut self.registered_tm,
      "nltobr" => &mut self.nltobr,
      "allow_custom" => &mut self.allow_custom,
      _ => return false,
    };
    *slot = value;
    true
  }
}

/// Options for the HTML sanitizer, used only when an HTML-mode paste both was
/// requested and is supported by the current runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlFormatterConfig {
  /// Collapse a newline followed by a single space into a space, undoing
  /// line-wrapping applied by the producing application.
  pub remove_wrap:  bool,
  /// Inline tags that survive sanitization. Matched by name,
  /// case-insensitively.
  pub allowed_tags: Vec<String>,
}

impl Default for HtmlFormatterConfig {
  fn default() -> Self {
    Self {
      remove_wrap:  false,
      allowed_tags: ["strong", "b", "i", "em", "sup", "sub"]
        .into_iter()
        .map(str::to_owned)
        .collect(),
    }
  }
}

impl HtmlFormatterConfig {
  /// Build from a merged settings value.
  ///
  /// Degrades per field, like [`FormatterConfig::from_value`]: a malformed
  /// entry falls back to that field's default without dragging the valid
  /// ones down with it.
  pub fn from_value(value: &Value) -> Self {
    let mut config = Self::default();
    let Some(table) = value.as_table() else {
      return config;
    };
    if let Some(flag) = table.get("remove_wrap").and_then(Value::as_bool) {
      config.remove_wrap = flag;
    }
    if let Some(tags) = table
      .get("allowed_tags")
      .cloned()
      .and_then(|tags| tags.try_into::<Vec<String>>().ok())
    {
      config.allowed_tags = tags;
    }
    config
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_option_defaults_to_false() {
    let config = FormatterConfig::default();
    for option in FORMATTER_OPTIONS {
      assert_eq!(config.get(option), Some(false), "{option}");
    }
  }

  #[test]
  fn from_value_ignores_unknown_and_malformed_keys() {
    let value: Value = toml::from_str(
      r#"
      trim = true
      escape_html = "yes"
      no_such_option = true
      "#,
    )
    .unwrap();

    let config = FormatterConfig::from_value(&value);
    assert!(config.trim);
    assert!(!config.escape_html);
  }

  #[test]
  fn html_config_falls_back_to_defaults_on_malformed_value() {
    let value: Value = toml::from_str("allowed_tags = 7").unwrap();
    let config = HtmlFormatterConfig::from_value(&value);
    assert_eq!(config, HtmlFormatterConfig::default());
    assert!(config.allowed_tags.iter().any(|tag| tag == "sup"));
  }

  #[test]
  fn html_config_degrades_per_field() {
    // A broken tag list must not discard the valid remove_wrap next to it.
    let value: Value = toml::from_str(
      r#"
      remove_wrap = true
      allowed_tags = 7
      "#,
    )
    .unwrap();
    let config = HtmlFormatterConfig::from_value(&value);
    assert!(config.remove_wrap);
    assert_eq!(config.allowed_tags, HtmlFormatterConfig::default().allowed_tags);

    let value: Value = toml::from_str(r#"allowed_tags = ["code"]"#).unwrap();
    let config = HtmlFormatterConfig::from_value(&value);
    assert!(!config.remove_wrap);
    assert_eq!(config.allowed_tags, vec!["code".to_owned()]);
  }
}
