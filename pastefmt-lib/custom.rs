//! User-defined find/replace rules, layered on top of the built-in stages.
//!
//! Rules run in list order against the already-formatted text, once per
//! paste target. Scope filtering and one-shot id deduplication are per
//! target, never shared across a multi-cursor paste.

use std::collections::HashSet;

use regex::{
  Captures,
  Regex,
};
use serde::Deserialize;
use thiserror::Error;
use toml::Value;

use crate::{
  document::ScopeMatcher,
  expr::{
    Expr,
    ExprError,
  },
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
  #[default]
  Text,
  Regex,
  Eval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleMode {
  Html,
  Plain,
}

/// One user-authored rule. `find` and `replace` are required; everything
/// else narrows when the rule applies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomRule {
  pub find:    String,
  pub replace: String,
  #[serde(default, rename = "type")]
  pub kind:    RuleKind,
  /// Restrict to HTML-mode or plain-mode pastes; absent matches both.
  #[serde(default)]
  pub mode:    Option<RuleMode>,
  /// Host-defined selector the paste position must match.
  #[serde(default)]
  pub scope:   Option<String>,
  /// Deduplication token: of all eligible rules sharing an id, only the
  /// first runs.
  #[serde(default)]
  pub id:      Option<String>,
}

#[derive(Debug, Error)]
pub enum EvalRuleError {
  #[error("invalid pattern: {0}")]
  Pattern(#[from] regex::Error),
  #[error(transparent)]
  Expr(#[from] ExprError),
}

/// Decode a merged `paste_formatter_custom` value. Entries that are not
/// tables or lack required fields are skipped with a warning, preserving the
/// rest of the list.
pub fn rules_from_value(value: Value) -> Vec<CustomRule> {
  let items = match value {
    Value::Array(items) => items,
    _ => {
      log::warn!("custom formatter settings must be an array of tables");
      return Vec::new();
    },
  };

  items
    .into_iter()
    .filter_map(|item| {
      if !item.is_table() {
        return None;
      }
      match item.try_into::<CustomRule>() {
        Ok(rule) => Some(rule),
        Err(err) => {
          log::warn!("skipping malformed custom rule: {err}");
          None
        },
      }
    })
    .collect()
}

/// Run the rule list over `text` for one paste target at `point`.
///
/// An `eval` rule that fails to parse or evaluate stops the remainder of the
/// list for this target; earlier rules' output is kept.
pub fn run_custom(
  text: &str,
  rules: &[CustomRule],
  point: usize,
  is_html: bool,
  scopes: &dyn ScopeMatcher,
) -> String {
  let mut out = text.to_owned();
  let mut ran: HashSet<&str> = HashSet::new();

  for rule in rules {
    if let Some(mode) = rule.mode
      && (mode == RuleMode::Html) != is_html
    {
      continue;
    }
    if let Some(id) = rule.id.as_deref()
      && ran.contains(id)
    {
      continue;
    }
    if let Some(scope) = rule.scope.as_deref()
      && scopes.score(point, scope) == 0
    {
      continue;
    }
    if let Some(id) = rule.id.as_deref() {
      ran.insert(id);
    }

    match rule.kind {
      RuleKind::Text => out = out.replace(&rule.find, &rule.replace),
      RuleKind::Regex => match Regex::new(&rule.find) {
        Ok(pattern) => out = pattern.replace_all(&out, rule.replace.as_str()).into_owned(),
        Err(err) => {
          log::warn!("skipping custom rule with invalid pattern {:?}: {err}", rule.find);
        },
      },
      RuleKind::Eval => match apply_eval(&out, &rule.find, &rule.replace) {
        Ok(next) => out = next,
        Err(err) => {
          log::warn!("custom eval rule {:?} failed, stopping rule list: {err}", rule.find);
          return out;
        },
      },
    }
  }

  out
}

fn apply_eval(text: &str, find: &str, replace: &str) -> Result<String, EvalRuleError> {
  let pattern = Regex::new(find)?;
  let template = Expr::parse(replace)?;

  let mut failure = None;
  let out = pattern
    .replace_all(text, |caps: &Captures| {
      match template.eval(caps) {
        Ok(replacement) => replacement,
        Err(err) => {
          failure.get_or_insert(err);
          String::new()
        },
      }
    })
    .into_owned();

  match failure {
    // A failing rule contributes nothing, not a partial substitution.
    Some(err) => Err(err.into()),
    None => Ok(out),
  }
}
