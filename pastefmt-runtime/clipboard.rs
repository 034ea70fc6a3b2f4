//! System clipboard readers.
//!
//! Reading goes through the platform's own paste command, detected once at
//! startup. Only plain text is read here; the HTML flavor has its own
//! capture path (see [`crate::html_capture`]).

use std::{
  borrow::Cow,
  process::Command,
  time::Duration,
};

use pastefmt_lib::clipboard::{
  ClipboardError,
  ClipboardSource,
  Result,
};

const READ_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemClipboard {
  Pasteboard,
  Wayland,
  XClip,
  XSel,
  Win32Yank,
  Tmux,
  Termux,
  None,
}

impl SystemClipboard {
  pub fn detect() -> Self {
    let provider = Self::default();
    log::debug!("using clipboard provider {}", provider.name());
    provider
  }

  fn read_command(&self) -> Option<(&'static str, &'static [&'static str])> {
    match self {
      Self::Pasteboard => Some(("pbpaste", &[])),
      Self::Wayland => Some(("wl-paste", &["--no-newline"])),
      Self::XClip => Some(("xclip", &["-o", "-selection", "clipboard"])),
      Self::XSel => Some(("xsel", &["-o", "-b"])),
      Self::Win32Yank => Some(("win32yank.exe", &["-o", "--lf"])),
      Self::Tmux => Some(("tmux", &["save-buffer", "-"])),
      Self::Termux => Some(("termux-clipboard-get", &[])),
      Self::None => None,
    }
  }
}

impl Default for SystemClipboard {
  #[cfg(windows)]
  fn default() -> Self {
    if binary_exists("win32yank.exe") {
      Self::Win32Yank
    } else {
      Self::None
    }
  }

  #[cfg(target_os = "macos")]
  fn default() -> Self {
    if env_var_is_set("TMUX") && binary_exists("tmux") {
      Self::Tmux
    } else if binary_exists("pbpaste") {
      Self::Pasteboard
    } else {
      Self::None
    }
  }

  #[cfg(not(any(windows, target_os = "macos")))]
  fn default() -> Self {
    if env_var_is_set("WAYLAND_DISPLAY") && binary_exists("wl-paste") {
      Self::Wayland
    } else if env_var_is_set("DISPLAY") && binary_exists("xclip") {
      Self::XClip
    } else if env_var_is_set("DISPLAY") && binary_exists("xsel") {
      Self::XSel
    } else if binary_exists("termux-clipboard-get") {
      Self::Termux
    } else if env_var_is_set("TMUX") && binary_exists("tmux") {
      Self::Tmux
    } else if binary_exists("win32yank.exe") {
      Self::Win32Yank
    } else {
      Self::None
    }
  }
}

impl ClipboardSource for SystemClipboard {
  fn name(&self) -> Cow<'_, str> {
    match self.read_command() {
      Some((program, _)) => program.into(),
      None => "none".into(),
    }
  }

  fn contents(&self) -> Result<String> {
    let Some((program, args)) = self.read_command() else {
      return Err(ClipboardError::ReadingNotSupported);
    };

    let mut command = Command::new(program);
    command.args(args);
    let (status, output) = crate::process::capture_with_deadline(&mut command, READ_TIMEOUT)?;
    if !status.success() {
      return Err(ClipboardError::CommandFailed);
    }
    Ok(output)
  }
}

fn env_var_is_set(name: &str) -> bool {
  std::env::var_os(name).is_some()
}

fn binary_exists(name: &str) -> bool {
  which::which(name).is_ok()
}
