//! Running external tools (yt, ffmpeg) with a deadline.

use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::ProcessError;

/// How often the child process is polled for completion
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A child process that ran to completion
#[derive(Debug)]
pub struct Finished {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

/// Run `command` to completion, killing it once `timeout` has passed.
/// Blocking; callers run it off the UI thread.
pub fn run(mut command: Command, timeout: Duration) -> Result<Finished, ProcessError> {
    let program = command.get_program().to_string_lossy().to_string();
    debug!("Running {}", program);

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;

    // Drain both pipes so the child never blocks on a full buffer
    let stdout_reader = child.stdout.take().map(|mut stdout| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stdout.read_to_end(&mut buf);
            buf
        })
    });
    let stderr_reader = child.stderr.take().map(|mut stderr| {
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf);
            buf
        })
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                warn!("{} did not finish within {:?}, killing it", program, timeout);
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProcessError::Timeout(timeout));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                let _ = child.kill();
                return Err(ProcessError::Spawn { program, source });
            }
        }
    };

    let stdout = stdout_reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    let stderr = stderr_reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();

    debug!("{} exited with {}", program, status);
    Ok(Finished {
        status,
        stdout,
        stderr,
    })
}

/// Last `lines` lines of `text`
pub fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

/// Write an executable shell script standing in for an external tool
#[cfg(all(test, unix))]
pub fn fake_tool(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_keeps_last_lines() {
        let text = "one\ntwo\nthree\nfour";
        assert_eq!(tail(text, 2), "three\nfour");
        assert_eq!(tail(text, 10), text);
        assert_eq!(tail("", 3), "");
    }

    #[test]
    fn test_missing_program_is_a_spawn_error() {
        let err = run(Command::new("/nonexistent/bin/tool"), Duration::from_secs(1)).unwrap_err();

        assert!(
            matches!(err, ProcessError::Spawn { ref program, .. } if program == "/nonexistent/bin/tool")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_output_and_status() {
        let mut command = Command::new("sh");
        command.args(["-c", "printf frame; echo oops >&2; exit 4"]);

        let finished = run(command, Duration::from_secs(10)).unwrap();

        assert_eq!(finished.status.code(), Some(4));
        assert_eq!(finished.stdout, b"frame");
        assert_eq!(finished.stderr, "oops\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_slow_child_is_killed_at_deadline() {
        let mut command = Command::new("sh");
        command.args(["-c", "sleep 30"]);

        let started = Instant::now();
        let err = run(command, Duration::from_millis(500)).unwrap_err();

        assert!(matches!(err, ProcessError::Timeout(t) if t == Duration::from_millis(500)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
