//! One-shot subprocess capture with a bounded wait.

use std::{
  io::Read,
  process::{
    Command,
    ExitStatus,
    Stdio,
  },
  sync::mpsc,
  thread,
  time::Duration,
};

use pastefmt_lib::clipboard::{
  ClipboardError,
  Result,
};

/// Run `command`, collect its stdout and wait at most `timeout` for it to
/// finish. A slow or wedged helper is killed and reported as
/// [`ClipboardError::TimedOut`] rather than blocking the paste.
pub(crate) fn capture_with_deadline(
  command: &mut Command,
  timeout: Duration,
) -> Result<(ExitStatus, String)> {
  let mut child = command
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::null())
    .spawn()?;

  let Some(mut stdout) = child.stdout.take() else {
    return Err(ClipboardError::MissingStdout);
  };

  // Read on a separate thread so a full pipe can never wedge the wait.
  let (sender, receiver) = mpsc::channel();
  let reader = thread::spawn(move || {
    let mut buffer = Vec::new();
    let outcome = stdout.read_to_end(&mut buffer).map(|_| buffer);
    sender.send(outcome).ok();
  });

  match receiver.recv_timeout(timeout) {
    Ok(Ok(buffer)) => {
      let status = child.wait()?;
      reader.join().ok();
      Ok((status, String::from_utf8(buffer)?))
    },
    Ok(Err(err)) => {
      child.kill().ok();
      child.wait().ok();
      reader.join().ok();
      Err(err.into())
    },
    Err(_) => {
      log::warn!(
        "{:?} produced no output within {timeout:?}, killing it",
        command.get_program()
      );
      child.kill().ok();
      child.wait().ok();
      Err(ClipboardError::TimedOut)
    },
  }
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;

  #[test]
  fn captures_stdout_of_a_fast_command() {
    let mut command = Command::new("sh");
    command.args(["-c", "printf hello"]);
    let (status, output) = capture_with_deadline(&mut command, Duration::from_secs(5)).unwrap();
    assert!(status.success());
    assert_eq!(output, "hello");
  }

  #[test]
  fn nonzero_exit_is_reported_in_the_status() {
    let mut command = Command::new("sh");
    command.args(["-c", "exit 3"]);
    let (status, output) = capture_with_deadline(&mut command, Duration::from_secs(5)).unwrap();
    assert!(!status.success());
    assert!(output.is_empty());
  }

  #[test]
  fn slow_commands_time_out() {
    let mut command = Command::new("sleep");
    command.arg("10");
    let err = capture_with_deadline(&mut command, Duration::from_millis(50)).unwrap_err();
    assert!(matches!(err, ClipboardError::TimedOut));
  }
}
