//! Shell command execution for command-backed verifiers

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// Default timeout for a single check command (60 seconds)
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for collecting output from child process pipes
const OUTPUT_COLLECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum captured output per stream (1MB)
const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// Outcome of running one shell command
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub command: String,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub duration: Duration,
    pub timed_out: bool,
}

impl CommandOutcome {
    /// Last non-empty line of stderr, falling back to stdout
    pub fn last_output_line(&self) -> Option<&str> {
        last_non_empty_line(&self.stderr).or_else(|| last_non_empty_line(&self.stdout))
    }
}

fn last_non_empty_line(s: &str) -> Option<&str> {
    s.lines().rev().map(str::trim).find(|l| !l.is_empty())
}

/// Run `command` through the system shell, killing it after `timeout`.
///
/// Output pipes are drained on background threads while waiting so a chatty
/// child cannot deadlock on a full pipe buffer.
pub fn run_command(
    command: &str,
    working_dir: Option<&Path>,
    timeout: Duration,
) -> Result<CommandOutcome> {
    let start = Instant::now();
    let mut child = spawn_shell_command(command, working_dir)?;

    let (stdout_tx, stdout_rx) = mpsc::channel();
    let (stderr_tx, stderr_rx) = mpsc::channel();

    match child.stdout.take() {
        Some(stdout) => {
            thread::spawn(move || {
                let _ = stdout_tx.send(read_stream_to_string(stdout));
            });
        }
        None => {
            let _ = stdout_tx.send(String::new());
        }
    }

    match child.stderr.take() {
        Some(stderr) => {
            thread::spawn(move || {
                let _ = stderr_tx.send(read_stream_to_string(stderr));
            });
        }
        None => {
            let _ = stderr_tx.send(String::new());
        }
    }

    let wait_result = child
        .wait_timeout(timeout)
        .with_context(|| format!("Failed to wait for command: {command}"))?;

    if wait_result.is_none() {
        kill_child_process(&mut child);
    }
    let duration = start.elapsed();

    let stdout = stdout_rx
        .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string());
    let stderr = stderr_rx
        .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string());

    Ok(match wait_result {
        Some(status) => CommandOutcome {
            command: command.to_string(),
            success: status.success(),
            stdout,
            stderr,
            exit_code: status.code(),
            duration,
            timed_out: false,
        },
        None => CommandOutcome {
            command: command.to_string(),
            success: false,
            stdout,
            stderr: format!(
                "{stderr}\n[Process killed after {}s timeout]",
                timeout.as_secs()
            ),
            exit_code: None,
            duration,
            timed_out: true,
        },
    })
}

/// Uses `sh -c` on Unix and `cmd /C` on Windows
fn spawn_shell_command(command: &str, working_dir: Option<&Path>) -> Result<Child> {
    let mut cmd = if cfg!(target_family = "unix") {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    } else {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    };

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    cmd.spawn()
        .with_context(|| format!("Failed to spawn command: {command}"))
}

/// Read a stream to string, keeping at most MAX_OUTPUT_SIZE bytes.
///
/// The stream is always drained to EOF so the writer never sees a broken pipe.
fn read_stream_to_string<R: Read>(mut stream: R) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let mut truncated = false;

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                let remaining = MAX_OUTPUT_SIZE.saturating_sub(buf.len());
                let to_copy = n.min(remaining);
                buf.extend_from_slice(&chunk[..to_copy]);
                if to_copy < n {
                    truncated = true;
                }
            }
            Err(_) => {
                if buf.is_empty() {
                    return "[error reading output]".to_string();
                }
                break;
            }
        }
    }

    let mut output = String::from_utf8_lossy(&buf).to_string();
    if truncated {
        output.push_str("\n[output truncated at 1MB]");
    }
    output
}

fn kill_child_process(child: &mut Child) {
    // The process may have exited between the timeout and the kill
    let _ = child.kill();
    let _ = child.wait();
}
