use std::ffi::OsString;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const STDERR_TAIL_BYTES: usize = 4096;

/// A fully specified external command invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalCommand {
    /// Program name or path, resolved through `PATH`.
    pub program: String,
    /// Arguments passed verbatim.
    pub args: Vec<OsString>,
}

impl ExternalCommand {
    /// Start a command for `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Shell-like rendering for logs and error messages.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for a in &self.args {
            line.push(' ');
            line.push_str(&a.to_string_lossy());
        }
        line
    }
}

/// Captured result of a successful invocation.
#[derive(Clone, Debug, Default)]
pub struct CommandOutput {
    /// Trailing diagnostic output (stderr), lossily decoded.
    pub stderr: String,
    /// Number of attempts it took (1 when the first attempt succeeded).
    pub attempts: u32,
}

/// Typed external command failure.
#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    /// The program could not be found.
    #[error("command '{program}' not found (is it installed and on PATH?)")]
    NotFound {
        /// Program that was requested.
        program: String,
    },

    /// The deadline expired; the process was killed.
    #[error("command '{program}' timed out after {after:?}")]
    Timeout {
        /// Program that timed out.
        program: String,
        /// Deadline that expired.
        after: Duration,
    },

    /// The process exited unsuccessfully.
    #[error("command '{program}' exited with status {}: {stderr}", exit_label(.status))]
    NonZeroExit {
        /// Program that failed.
        program: String,
        /// Exit code, `None` when terminated by a signal.
        status: Option<i32>,
        /// Trailing stderr output.
        stderr: String,
    },

    /// Spawning or waiting failed for a reason other than a missing program.
    #[error("command '{program}' io failure: {source}")]
    Io {
        /// Program involved.
        program: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    /// Program the failure refers to.
    pub fn program(&self) -> &str {
        match self {
            Self::NotFound { program }
            | Self::Timeout { program, .. }
            | Self::NonZeroExit { program, .. }
            | Self::Io { program, .. } => program,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::NonZeroExit { .. })
    }
}

/// Deadline and retry policy applied to every invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandPolicy {
    /// Per-attempt deadline.
    pub timeout: Duration,
    /// Extra attempts after the first failure (`NotFound` is never retried).
    pub retries: u32,
    /// Base backoff; attempt `n` waits `n * backoff` before running.
    pub backoff: Duration,
}

impl Default for CommandPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            retries: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Runs [`ExternalCommand`]s. Implementations must be shareable across threads.
pub trait CommandRunner: Send + Sync {
    /// Run `cmd` to completion.
    fn run(&self, cmd: &ExternalCommand) -> Result<CommandOutput, CommandError>;
}

/// Runner that spawns real processes.
#[derive(Clone, Debug, Default)]
pub struct SystemRunner {
    policy: CommandPolicy,
}

impl SystemRunner {
    /// Create a runner with `policy`.
    pub fn new(policy: CommandPolicy) -> Self {
        Self { policy }
    }

    /// The policy applied to every invocation.
    pub fn policy(&self) -> CommandPolicy {
        self.policy
    }

    fn run_once(&self, cmd: &ExternalCommand) -> Result<String, CommandError> {
        let program = cmd.program.clone();
        let mut child = Command::new(&cmd.program)
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => CommandError::NotFound {
                    program: program.clone(),
                },
                _ => CommandError::Io {
                    program: program.clone(),
                    source: e,
                },
            })?;

        let mut stderr = child.stderr.take().ok_or_else(|| CommandError::Io {
            program: program.clone(),
            source: std::io::Error::other("failed to open stderr pipe"),
        })?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes).map(|_| bytes)
        });

        let waited = wait_with_deadline(&mut child, self.policy.timeout);
        let stderr_bytes = stderr_drain
            .join()
            .map_err(|_| CommandError::Io {
                program: program.clone(),
                source: std::io::Error::other("stderr drain thread panicked"),
            })?
            .unwrap_or_default();
        let stderr = stderr_tail(&stderr_bytes);

        match waited {
            Ok(Some(status)) if status.success() => Ok(stderr),
            Ok(Some(status)) => Err(CommandError::NonZeroExit {
                program,
                status: status.code(),
                stderr,
            }),
            Ok(None) => Err(CommandError::Timeout {
                program,
                after: self.policy.timeout,
            }),
            Err(source) => Err(CommandError::Io { program, source }),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &ExternalCommand) -> Result<CommandOutput, CommandError> {
        let max_attempts = self.policy.retries.saturating_add(1);
        let mut attempt = 1;
        loop {
            tracing::debug!(command = %cmd.display_line(), attempt, "running external command");
            match self.run_once(cmd) {
                Ok(stderr) => {
                    return Ok(CommandOutput {
                        stderr,
                        attempts: attempt,
                    });
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let wait = self.policy.backoff.saturating_mul(attempt);
                    tracing::warn!(
                        program = %cmd.program,
                        attempt,
                        ?wait,
                        error = %e,
                        "external command failed, retrying"
                    );
                    std::thread::sleep(wait);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Wait for `child` up to `timeout`; kills it and returns `Ok(None)` on expiry.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            // The process may exit between try_wait and kill.
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn exit_label(status: &Option<i32>) -> String {
    status.map_or_else(|| "signal".to_string(), |c| c.to_string())
}

fn stderr_tail(bytes: &[u8]) -> String {
    let start = bytes.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&bytes[start..]).trim().to_string()
}

/// Return `true` when `program` can be invoked from `PATH` (probed with `probe_arg`).
pub fn is_on_path(program: impl AsRef<Path>, probe_arg: &str) -> bool {
    Command::new(program.as_ref())
        .arg(probe_arg)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/process/runner.rs"]
mod tests;
