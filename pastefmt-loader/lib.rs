//! Locating and loading pastefmt settings.
//!
//! Three layers feed a paste: the embedded defaults, the user's
//! `settings.toml` in the config directory (together forming the base layer,
//! exposed as [`FileStore`]), and a workspace-local `.pastefmt/config.toml`
//! found by walking up from the current directory (the project layer).

use std::{
  fs,
  path::{
    Path,
    PathBuf,
  },
};

use anyhow::{
  Context,
  Result,
};
use etcetera::base_strategy::{
  BaseStrategy,
  choose_base_strategy,
};
use pastefmt_lib::settings::{
  self,
  SettingsStore,
  StoreError,
};
use toml::{
  Table,
  Value,
};

const DEFAULT_SETTINGS: &str = include_str!("default-settings.toml");

pub fn config_dir() -> PathBuf {
  if let Ok(dir) = std::env::var("PASTEFMT_CONFIG_DIR") {
    return PathBuf::from(dir);
  }
  let strategy = choose_base_strategy().expect("Unable to find the config directory!");
  let mut path = strategy.config_dir();
  path.push("pastefmt");
  path
}

pub fn settings_file() -> PathBuf {
  config_dir().join("settings.toml")
}

pub fn workspace_settings_file() -> PathBuf {
  find_workspace().0.join(".pastefmt").join("config.toml")
}

/// Finds the current workspace folder.
///
/// This function starts searching the FS upward from the CWD
/// and returns the first directory that contains either `.git`, `.svn`, `.jj`
/// or `.pastefmt`. If no workspace was found returns (CWD, true).
/// Otherwise (workspace, false) is returned.
pub fn find_workspace() -> (PathBuf, bool) {
  match std::env::current_dir() {
    Ok(current_dir) => find_workspace_in(current_dir),
    Err(_) => (PathBuf::new(), true),
  }
}

pub fn find_workspace_in(dir: impl AsRef<Path>) -> (PathBuf, bool) {
  let dir = dir.as_ref();
  for ancestor in dir.ancestors() {
    if ancestor.join(".git").exists()
      || ancestor.join(".svn").exists()
      || ancestor.join(".jj").exists()
      || ancestor.join(".pastefmt").exists()
    {
      return (ancestor.to_owned(), false);
    }
  }

  (dir.to_owned(), true)
}

/// The embedded defaults every base store starts from.
pub fn default_settings() -> Result<Table> {
  toml::from_str(DEFAULT_SETTINGS).context("failed to parse built-in default settings")
}

/// Project-scoped overrides, if the workspace carries any. Malformed files
/// are ignored with a warning rather than breaking the paste.
pub fn workspace_settings() -> Option<Table> {
  load_project_file(&workspace_settings_file())
}

pub fn load_project_file(path: &Path) -> Option<Table> {
  let content = fs::read_to_string(path).ok()?;
  match toml::from_str(&content) {
    Ok(table) => Some(table),
    Err(err) => {
      log::warn!("ignoring malformed settings in {}: {err}", path.display());
      None
    },
  }
}

/// File-backed base settings store: the embedded defaults overlaid with the
/// user's settings file. Toggles persist back to that file.
#[derive(Debug)]
pub struct FileStore {
  path:   PathBuf,
  values: Table,
}

impl FileStore {
  /// Load the user settings file from the config directory.
  pub fn load() -> Result<Self> {
    Self::load_from(settings_file())
  }

  pub fn load_from(path: PathBuf) -> Result<Self> {
    let mut values = default_settings()?;

    if let Ok(content) = fs::read_to_string(&path) {
      let user: Table = toml::from_str(&content)
        .with_context(|| format!("failed to parse settings in {}", path.display()))?;
      for (key, value) in user {
        let merged = match values.remove(&key) {
          Some(base) => settings::merge_values(base, value, None),
          None => value,
        };
        values.insert(key, merged);
      }
    }

    Ok(Self { path, values })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl SettingsStore for FileStore {
  fn get(&self, key: &str) -> Option<Value> {
    self.values.get(key).cloned()
  }

  fn set(&mut self, key: &str, value: Value) {
    self.values.insert(key.to_owned(), value);
  }

  fn persist(&mut self) -> Result<(), StoreError> {
    if let Some(parent) = self.path.parent()
      && !parent.exists()
    {
      fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(&self.values)?;
    fs::write(&self.path, content)?;
    Ok(())
  }
}
