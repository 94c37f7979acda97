//! External process execution.
//!
//! Processes are run synchronously with captured output. A process that
//! cannot be started is not an error here: the failure is folded into the
//! returned [`ProcessOutput`] so callers can treat it like any other
//! unsuccessful run.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Captured result of running an external process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Standard output, lossily decoded.
    pub stdout: String,

    /// Standard error, lossily decoded.
    pub stderr: String,

    /// Exit code (`None` if killed by signal or never started).
    pub exit_code: Option<i32>,

    /// Wall-clock duration.
    pub duration: Duration,
}

impl ProcessOutput {
    /// Output for a process that could not be spawned.
    pub fn spawn_failure(program: &str, error: &std::io::Error) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!("failed to start '{}': {}", program, error),
            exit_code: None,
            duration: Duration::ZERO,
        }
    }

    /// Whether the process exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Whether this looks like a crash rather than a run that found
    /// problems: nothing on stdout, a non-zero (or missing) exit code and
    /// something on stderr.
    pub fn crashed(&self) -> bool {
        !self.success() && self.stdout.trim().is_empty() && !self.stderr.trim().is_empty()
    }
}

/// Run `program` with `args` in `cwd`, capturing stdout and stderr.
pub fn run_process<S: AsRef<str>>(program: &str, args: &[S], cwd: &Path) -> ProcessOutput {
    let start = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(args.iter().map(AsRef::as_ref))
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    tracing::debug!("Running {} with {} argument(s)", program, args.len());

    match cmd.output() {
        Ok(output) => ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
            duration: start.elapsed(),
        },
        Err(e) => ProcessOutput::spawn_failure(program, &e),
    }
}
