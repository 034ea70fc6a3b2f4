//! Raw HTML capture from the platform clipboard.
//!
//! A small external helper prints the clipboard's HTML flavor on stdout;
//! a zero exit with non-empty output is the only success case. Platforms
//! without a helper are simply unsupported and the paste degrades to plain
//! text upstream.

use std::{
  path::PathBuf,
  process::Command,
  time::Duration,
};

use pastefmt_lib::clipboard::{
  ClipboardError,
  HtmlCapture,
  Result,
};

/// Overrides helper discovery, mainly for tests and unusual installs.
pub const HELPER_ENV: &str = "PASTEFMT_HTML_HELPER";
const HELPER_NAME: &str = "pastefmt-html-clipboard";
const CAPTURE_TIMEOUT: Duration = Duration::from_secs(2);

/// Capture via the bundled helper executable, when one can be found.
#[derive(Debug, Default)]
pub struct HelperCapture {
  helper: Option<PathBuf>,
}

impl HelperCapture {
  pub fn detect() -> Self {
    Self {
      helper: find_helper(),
    }
  }
}

fn find_helper() -> Option<PathBuf> {
  if let Some(path) = std::env::var_os(HELPER_ENV) {
    let path = PathBuf::from(path);
    return path.is_file().then_some(path);
  }

  // The helper speaks the pasteboard's HTML flavor and only ships for macOS.
  if !cfg!(target_os = "macos") {
    return None;
  }

  std::env::current_exe()
    .ok()
    .and_then(|exe| exe.parent().map(|dir| dir.join(HELPER_NAME)))
    .filter(|path| path.is_file())
    .or_else(|| which::which(HELPER_NAME).ok())
}

impl HtmlCapture for HelperCapture {
  fn supported(&self) -> bool {
    self.helper.is_some()
  }

  fn capture(&self) -> Result<Option<String>> {
    let Some(helper) = &self.helper else {
      return Ok(None);
    };

    let (status, output) =
      crate::process::capture_with_deadline(&mut Command::new(helper), CAPTURE_TIMEOUT)?;
    if !status.success() {
      return Err(ClipboardError::CommandFailed);
    }
    if output.is_empty() {
      return Err(ClipboardError::MissingStdout);
    }
    Ok(Some(output))
  }
}
