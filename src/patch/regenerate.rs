//! Builder for the post-patch regeneration command.
//!
//! After version strings are patched the project usually has derived files
//! (rendered manifests, `go.sum`) that must be rebuilt. This module runs the
//! configured command in the project root with inherited stdio so its output
//! lands in the CI log alongside ours.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::constants;
use crate::core::BumpError;

/// Fluent builder for running a regeneration command.
///
/// # Examples
///
/// ```rust,no_run
/// use bump_deps::patch::regenerate::RegenerateCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// RegenerateCommand::new("make")
///     .args(["generate"])
///     .current_dir("/path/to/project")
///     .execute()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RegenerateCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    timeout_duration: Duration,
}

impl RegenerateCommand {
    /// A command running `program` with no arguments and the default timeout.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            timeout_duration: constants::DEFAULT_REGENERATE_TIMEOUT,
        }
    }

    /// Build from an argv list; the first element is the program.
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        let (program, args) = argv.split_first().ok_or_else(|| BumpError::ConfigError {
            message: "regeneration command is empty".to_string(),
        })?;
        Ok(Self::new(program.clone()).args(args.iter().cloned()))
    }

    /// Append arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run in `dir` instead of the process working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Override the timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// The command line as it would be typed in a shell.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Locate the program on `PATH`. Programs given as a relative path are
    /// resolved against the working directory the command will run in.
    fn resolve_program(&self) -> Result<PathBuf, BumpError> {
        let resolved = match &self.current_dir {
            Some(dir) => std::path::absolute(dir).ok().and_then(|dir| {
                which::which_in(&self.program, std::env::var_os("PATH"), dir).ok()
            }),
            None => which::which(&self.program).ok(),
        };
        resolved.ok_or_else(|| BumpError::CommandNotFound {
            program: self.program.clone(),
        })
    }

    /// Run the command to completion.
    ///
    /// # Errors
    ///
    /// - [`BumpError::CommandNotFound`] when the program is not on `PATH`
    /// - [`BumpError::CommandTimedOut`] when the timeout elapses; the child is
    ///   killed
    /// - [`BumpError::CommandFailed`] on a non-zero exit
    pub async fn execute(self) -> Result<()> {
        let command_line = self.display();

        let program = self.resolve_program()?;
        debug!(program = %program.display(), "Resolved regeneration program");

        let mut cmd = Command::new(&program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }

        info!(command = %command_line, "Running regeneration command");
        let mut child = cmd.spawn().with_context(|| format!("Failed to run {command_line}"))?;

        let waited = timeout(self.timeout_duration, child.wait()).await;
        let status = match waited {
            Ok(status) => status.with_context(|| format!("Failed to run {command_line}"))?,
            Err(_) => {
                warn!(
                    command = %command_line,
                    seconds = self.timeout_duration.as_secs(),
                    "Regeneration command timed out"
                );
                // Best effort; kill_on_drop covers the rest
                let _ = child.kill().await;
                return Err(BumpError::CommandTimedOut {
                    command: command_line,
                    seconds: self.timeout_duration.as_secs(),
                }
                .into());
            }
        };

        if !status.success() {
            return Err(BumpError::CommandFailed {
                command: command_line,
                status: status.to_string(),
            }
            .into());
        }

        debug!(command = %command_line, "Regeneration command finished");
        Ok(())
    }
}
