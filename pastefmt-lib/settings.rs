//! Layered settings: a base store, an optional project override and the
//! toggle command.
//!
//! Values are `toml::Value`s so merge behavior dispatches on an explicit
//! variant rather than duck typing: arrays prepend-merge, tables merge
//! key-wise, anything else lets the more specific layer win outright.

use thiserror::Error;
use toml::{
  Table,
  Value,
};

use crate::config::{
  FORMATTER_SETTINGS_KEY,
  FormatterConfig,
};

#[derive(Debug, Error)]
pub enum StoreError {
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error("failed to serialize settings: {0}")]
  Serialize(#[from] toml::ser::Error),
}

/// Access to one settings layer. Implementations decide where values live;
/// the core only ever reads blocks by name and writes them back on toggle.
pub trait SettingsStore {
  fn get(&self, key: &str) -> Option<Value>;
  fn set(&mut self, key: &str, value: Value);
  fn persist(&mut self) -> Result<(), StoreError>;
}

/// In-memory store, used in tests and as a null base layer.
#[derive(Debug, Default)]
pub struct MemoryStore {
  values: Table,
}

impl MemoryStore {
  pub fn new(values: Table) -> Self {
    Self { values }
  }
}

impl SettingsStore for MemoryStore {
  fn get(&self, key: &str) -> Option<Value> {
    self.values.get(key).cloned()
  }

  fn set(&mut self, key: &str, value: Value) {
    self.values.insert(key.to_owned(), value);
  }

  fn persist(&mut self) -> Result<(), StoreError> {
    Ok(())
  }
}

/// Merge one settings block across the base and project layers.
///
/// Absent from the base layer means there is nothing to merge; absent from
/// the project layer returns the base value unchanged. Merging is pure: the
/// stores are never written.
pub fn merge_settings(
  key: &str,
  base: &dyn SettingsStore,
  project: Option<&Table>,
  allowed: Option<&[&str]>,
) -> Option<Value> {
  let base_value = base.get(key)?;
  let Some(project_value) = project.and_then(|table| table.get(key)) else {
    return Some(base_value);
  };
  Some(merge_values(base_value, project_value.clone(), allowed))
}

/// Merge a project value onto a base value.
///
/// Arrays concatenate with the project entries in front, both fully
/// preserved. Tables keep every base key, overwriting exactly the keys the
/// project also defines (subject to `allowed` when given). Mismatched or
/// scalar kinds resolve to the project value.
pub fn merge_values(base: Value, project: Value, allowed: Option<&[&str]>) -> Value {
  match (base, project) {
    (Value::Array(base_items), Value::Array(mut project_items)) => {
      project_items.extend(base_items);
      Value::Array(project_items)
    },
    (Value::Table(mut base_map), Value::Table(project_map)) => {
      for (name, value) in project_map {
        if allowed.is_some_and(|allowed| !allowed.contains(&name.as_str())) {
          continue;
        }
        // Only keys the base layer already defines are overwritten; a
        // project layer cannot introduce new ones.
        if base_map.contains_key(&name) {
          base_map.insert(name, value);
        }
      }
      Value::Table(base_map)
    },
    (_, project) => project,
  }
}

/// Flip one formatter option in the base store and persist it.
///
/// Unrecognized option names are a no-op (returns `Ok(false)`). This is the
/// only settings operation with a side effect, and it never touches the
/// project layer.
pub fn toggle_option(
  store: &mut dyn SettingsStore,
  option: &str,
  value: bool,
) -> Result<bool, StoreError> {
  if !FormatterConfig::is_option(option) {
    log::debug!("ignoring toggle for unknown option {option:?}");
    return Ok(false);
  }

  let mut formatter = store
    .get(FORMATTER_SETTINGS_KEY)
    .and_then(|value| value.as_table().cloned())
    .unwrap_or_default();
  formatter.insert(option.to_owned(), Value::Boolean(value));
  store.set(FORMATTER_SETTINGS_KEY, Value::Table(formatter));
  store.persist()?;
  Ok(true)
}

/// Whether a toggle would set the option to its current value. Hosts use this
/// to suppress no-op toggle commands.
pub fn toggle_is_noop(store: &dyn SettingsStore, option: &str, value: bool) -> bool {
  store
    .get(FORMATTER_SETTINGS_KEY)
    .as_ref()
    .and_then(|block| block.get(option))
    .and_then(Value::as_bool)
    .is_some_and(|current| current == value)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn store(content: &str) -> MemoryStore {
    MemoryStore::new(toml::from_str(content).unwrap())
  }

  fn project(content: &str) -> Table {
    toml::from_str(content).unwrap()
  }

  #[test]
  fn absent_base_key_merges_to_nothing() {
    let base = store("");
    let project = project("paste_formatter = { trim = true }");
    assert_eq!(
      merge_settings("paste_formatter", &base, Some(&project), None),
      None
    );
  }

  #[test]
  fn absent_project_key_returns_base_unchanged() {
    let base = store("paste_formatter = { trim = true }");
    let merged = merge_settings("paste_formatter", &base, Some(&project("")), None).unwrap();
    assert_eq!(merged.get("trim").and_then(Value::as_bool), Some(true));

    let merged = merge_settings("paste_formatter", &base, None, None).unwrap();
    assert_eq!(merged.get("trim").and_then(Value::as_bool), Some(true));
  }

  #[test]
  fn arrays_prepend_merge() {
    let base = store(r#"paste_formatter_custom = [{ find = "a", replace = "b" }]"#);
    let project = project(
      r#"paste_formatter_custom = [{ find = "x", replace = "y" }, { find = "p", replace = "q" }]"#,
    );

    let merged = merge_settings("paste_formatter_custom", &base, Some(&project), None).unwrap();
    let items = merged.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(
      items[0].get("find").and_then(Value::as_str).unwrap(),
      "x",
      "project entries come first"
    );
    assert_eq!(items[2].get("find").and_then(Value::as_str).unwrap(), "a");
  }

  #[test]
  fn tables_overwrite_shared_keys_and_keep_base_only_keys() {
    let base = store("paste_formatter = { trim = true, nltobr = false }");
    let project = project("paste_formatter = { nltobr = true, invented = true }");

    let merged = merge_settings("paste_formatter", &base, Some(&project), None).unwrap();
    assert_eq!(merged.get("trim").and_then(Value::as_bool), Some(true));
    assert_eq!(merged.get("nltobr").and_then(Value::as_bool), Some(true));
    assert!(
      merged.get("invented").is_none(),
      "project-only keys are not introduced"
    );
  }

  #[test]
  fn table_merge_respects_allow_list() {
    let base = store("paste_formatter = { trim = true, extra = false }");
    let project = project("paste_formatter = { trim = false, extra = true }");

    let merged = merge_settings("paste_formatter", &base, Some(&project), Some(&["trim"])).unwrap();
    assert_eq!(merged.get("trim").and_then(Value::as_bool), Some(false));
    assert_eq!(
      merged.get("extra").and_then(Value::as_bool),
      Some(false),
      "keys outside the allow list keep the base value"
    );
  }

  #[test]
  fn mismatched_kinds_let_the_project_win() {
    let base = store("paste_formatter = { trim = true }");
    let project = project(r#"paste_formatter = "off""#);

    let merged = merge_settings("paste_formatter", &base, Some(&project), None).unwrap();
    assert_eq!(merged.as_str(), Some("off"));
  }

  #[test]
  fn toggle_sets_and_persists_recognized_options_only() {
    let mut base = store("paste_formatter = { trim = true }");

    assert!(toggle_option(&mut base, "nltobr", true).unwrap());
    let block = base.get(FORMATTER_SETTINGS_KEY).unwrap();
    assert_eq!(block.get("nltobr").and_then(Value::as_bool), Some(true));
    assert_eq!(block.get("trim").and_then(Value::as_bool), Some(true));

    assert!(!toggle_option(&mut base, "no_such_option", true).unwrap());
    let block = base.get(FORMATTER_SETTINGS_KEY).unwrap();
    assert!(block.get("no_such_option").is_none());
  }

  #[test]
  fn toggle_noop_detection() {
    let base = store("paste_formatter = { trim = true }");
    assert!(toggle_is_noop(&base, "trim", true));
    assert!(!toggle_is_noop(&base, "trim", false));
    assert!(!toggle_is_noop(&base, "nltobr", false), "unset options are never a no-op");
  }
}
