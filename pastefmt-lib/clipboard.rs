//! Clipboard and HTML capture seams.
//!
//! The lib only defines the interfaces and error types. Runtime hosts
//! provide concrete implementations (see `pastefmt-runtime`).

use std::borrow::Cow;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error("could not convert provider output to UTF-8: {0}")]
  FromUtf8(#[from] std::string::FromUtf8Error),
  #[error("clipboard provider command failed")]
  CommandFailed,
  #[error("clipboard provider did not return any contents")]
  MissingStdout,
  #[error("clipboard provider did not finish in time")]
  TimedOut,
  #[error("clipboard provider does not support reading")]
  ReadingNotSupported,
}

pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Read-only access to the system clipboard's plain-text contents.
pub trait ClipboardSource: Send + Sync {
  fn name(&self) -> Cow<'_, str>;
  fn contents(&self) -> Result<String>;
}

/// Raw HTML capture from the platform clipboard.
///
/// `Ok(None)` means the platform has no capture support at all; helper
/// failures (bad exit, empty output, timeout) are errors the orchestrator
/// silently degrades to plain-text pasting.
pub trait HtmlCapture: Send + Sync {
  fn supported(&self) -> bool;
  fn capture(&self) -> Result<Option<String>>;
}

#[derive(Debug, Default)]
pub struct NoClipboard;

impl ClipboardSource for NoClipboard {
  fn name(&self) -> Cow<'_, str> {
    "none".into()
  }

  fn contents(&self) -> Result<String> {
    Err(ClipboardError::ReadingNotSupported)
  }
}

#[derive(Debug, Default)]
pub struct NoHtmlCapture;

impl HtmlCapture for NoHtmlCapture {
  fn supported(&self) -> bool {
    false
  }

  fn capture(&self) -> Result<Option<String>> {
    Ok(None)
  }
}
