// ABOUTME: Process runner - spawns external commands and reports their outcome.
// ABOUTME: Defines the CommandRunner seam so callers can be tested with fakes.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::types::ServiceName;

/// Description of one runnable unit. Immutable once constructed.
///
/// Arguments are always a structured sequence; a spec is never built by
/// splitting an interpolated command line.
#[derive(Debug, Clone)]
pub struct ServiceSpec {
    name: ServiceName,
    command: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    silent: bool,
    shell: bool,
}

impl ServiceSpec {
    pub fn new(name: ServiceName, command: impl Into<String>) -> Self {
        Self {
            name,
            command: command.into(),
            args: Vec::new(),
            cwd: None,
            silent: false,
            shell: false,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// When silent, only stderr is forwarded to the log. Errors always surface.
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Run the command through `sh -c` instead of spawning it directly.
    pub fn shell(mut self, shell: bool) -> Self {
        self.shell = shell;
        self
    }

    pub fn name(&self) -> &ServiceName {
        &self.name
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    fn shell_line(&self) -> String {
        let mut line = self.command.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Whether a run counts as success for orchestration purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// Produced exactly once per process run.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub service: ServiceName,
    pub exit_code: Option<i32>,
    pub outcome: Outcome,
}

impl RunResult {
    /// Map an exit status to an outcome. A missing exit code means the
    /// process was terminated by a signal - during rollback that is the
    /// expected way for infrastructure to go down, so it is not a failure.
    pub fn from_exit_code(service: ServiceName, exit_code: Option<i32>) -> Self {
        let outcome = match exit_code {
            Some(0) | None => Outcome::Success,
            Some(_) => Outcome::Failure,
        };
        Self {
            service,
            exit_code,
            outcome,
        }
    }

    /// A run that never got off the ground (spawn error).
    pub fn spawn_failure(service: ServiceName) -> Self {
        Self {
            service,
            exit_code: None,
            outcome: Outcome::Failure,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Failure
    }
}

/// Executes external commands. The production implementation spawns real
/// processes via tokio; tests substitute fakes that return canned results.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a spec to completion, forwarding its output to the log.
    ///
    /// Never returns an error: a command that cannot be spawned resolves as
    /// `Outcome::Failure` so the orchestrator applies uniform handling.
    async fn run(&self, spec: &ServiceSpec) -> RunResult;

    /// Run a command and capture its output. Used only for the image
    /// metadata queries, which parse stdout.
    async fn output(&self, program: &str, args: &[&str]) -> std::io::Result<std::process::Output>;
}

/// Production runner backed by `tokio::process`.
pub struct TokioRunner;

#[async_trait]
impl CommandRunner for TokioRunner {
    async fn run(&self, spec: &ServiceSpec) -> RunResult {
        let mut command = if spec.shell {
            let mut c = Command::new("sh");
            c.arg("-c").arg(spec.shell_line());
            c
        } else {
            let mut c = Command::new(&spec.command);
            c.args(&spec.args);
            c
        };

        if let Some(dir) = &spec.cwd {
            command.current_dir(dir);
        }

        // A silent child writes stdout to the void rather than into a pipe
        // nobody drains.
        command
            .stdin(Stdio::null())
            .stdout(if spec.silent {
                Stdio::null()
            } else {
                Stdio::piped()
            })
            .stderr(Stdio::piped());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(service = %spec.name, "failed to spawn {}: {e}", spec.command);
                return RunResult::spawn_failure(spec.name.clone());
            }
        };

        if let Some(stdout) = child.stdout.take() {
            forward_lines(stdout, spec.name.clone(), false);
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(stderr, spec.name.clone(), true);
        }

        match child.wait().await {
            Ok(status) => {
                let result = RunResult::from_exit_code(spec.name.clone(), status.code());
                tracing::debug!(
                    service = %result.service,
                    exit_code = ?result.exit_code,
                    "{} closed", spec.command
                );
                result
            }
            Err(e) => {
                tracing::error!(service = %spec.name, "failed waiting for {}: {e}", spec.command);
                RunResult::spawn_failure(spec.name.clone())
            }
        }
    }

    async fn output(&self, program: &str, args: &[&str]) -> std::io::Result<std::process::Output> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
    }
}

fn forward_lines(stream: impl AsyncRead + Unpin + Send + 'static, name: ServiceName, err: bool) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if err {
                tracing::warn!(service = %name, "{line}");
            } else {
                tracing::info!(service = %name, "{line}");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(value: &str) -> ServiceName {
        ServiceName::new(value).unwrap()
    }

    #[test]
    fn exit_code_zero_is_success() {
        let result = RunResult::from_exit_code(name("svc"), Some(0));
        assert_eq!(result.outcome, Outcome::Success);
    }

    #[test]
    fn missing_exit_code_is_success() {
        // Killed by signal, e.g. during rollback.
        let result = RunResult::from_exit_code(name("svc"), None);
        assert_eq!(result.outcome, Outcome::Success);
    }

    #[test]
    fn nonzero_exit_code_is_failure() {
        let result = RunResult::from_exit_code(name("svc"), Some(1));
        assert_eq!(result.outcome, Outcome::Failure);
    }

    #[test]
    fn spawn_failure_is_failure_without_exit_code() {
        let result = RunResult::spawn_failure(name("svc"));
        assert!(result.is_failure());
        assert_eq!(result.exit_code, None);
    }

    #[test]
    fn shell_line_joins_command_and_args() {
        let spec = ServiceSpec::new(name("svc"), "echo").args(["hello", "world"]);
        assert_eq!(spec.shell_line(), "echo hello world");
    }
}
