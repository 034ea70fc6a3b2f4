//! Core of the pastefmt formatting pipeline.
//!
//! The lib is pure: it defines the configuration model, the settings merge,
//! the built-in transformation stages, the HTML sanitizer and the custom
//! formatter executor. Side-effectful collaborators (the system clipboard,
//! the HTML capture helper, the settings files) live behind the trait seams
//! in [`clipboard`], [`document`] and [`settings`] and are provided by
//! runtime hosts (see `pastefmt-runtime` and `pastefmt-loader`).

pub mod clipboard;
pub mod config;
pub mod custom;
pub mod document;
pub mod expr;
pub mod html;
pub mod paste;
pub mod rules;
pub mod settings;

pub use config::{
  FormatterConfig,
  HtmlFormatterConfig,
};
pub use custom::CustomRule;
pub use document::{
  DocumentSurface,
  Range,
  ScopeMatcher,
};
pub use settings::SettingsStore;

/// Compile a pattern known at build time.
pub(crate) fn pattern(pattern: &str) -> regex::Regex {
  regex::Regex::new(pattern).expect("static pattern must compile")
}
