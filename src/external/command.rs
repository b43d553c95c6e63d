//! Base command execution abstraction
//!
//! Provides the foundational trait for executing external commands, enabling
//! dependency injection for testing.

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status_code == 0
    }
}

#[derive(Debug, Error, Clone)]
pub enum CommandError {
    #[error("Command not found: {command}. Is it installed and on your PATH?")]
    CommandNotFound { command: String },
    #[error("`{command}` exited with status {status_code}")]
    NonZeroExit { command: String, status_code: i32 },
    #[error("IO error: {message}")]
    Io { message: String },
}

/// A program, its arguments and the directory to run it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Fail with [`CommandError::NonZeroExit`] unless `status_code` is zero.
    pub fn check_status(&self, status_code: i32) -> Result<(), CommandError> {
        if status_code == 0 {
            Ok(())
        } else {
            Err(CommandError::NonZeroExit {
                command: self.program.clone(),
                status_code,
            })
        }
    }

    fn to_command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command.args(&self.args).kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }

    fn map_spawn_error(&self, e: std::io::Error) -> CommandError {
        if e.kind() == std::io::ErrorKind::NotFound {
            CommandError::CommandNotFound {
                command: self.program.clone(),
            }
        } else {
            CommandError::Io {
                message: e.to_string(),
            }
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dir) = &self.current_dir {
            write!(f, "cd {} && ", dir.display())?;
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Trait for executing external commands
///
/// This abstraction allows the rest of the codebase to execute commands
/// without directly depending on `tokio::process::Command`, enabling testing
/// with mock implementations.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run to completion and capture stdout/stderr.
    async fn execute(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError>;

    /// Run attached to the terminal and return the exit status code.
    async fn run(&self, invocation: &Invocation) -> Result<i32, CommandError>;
}

/// Real implementation using `tokio::process::Command`
pub struct ProcessCommandExecutor;

#[async_trait]
impl CommandExecutor for ProcessCommandExecutor {
    async fn execute(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        let output = invocation
            .to_command()
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| invocation.map_spawn_error(e))?;

        Ok(CommandOutput {
            status_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn run(&self, invocation: &Invocation) -> Result<i32, CommandError> {
        let status = invocation
            .to_command()
            .status()
            .await
            .map_err(|e| invocation.map_spawn_error(e))?;
        Ok(status.code().unwrap_or(-1))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_process_command_executor_success() {
        let executor = ProcessCommandExecutor;
        let result = executor.execute(&Invocation::new("echo").arg("hello")).await;

        assert!(result.is_ok());
        let output = result.unwrap();
        assert!(output.success());
        assert!(output.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_process_command_executor_command_not_found() {
        let executor = ProcessCommandExecutor;
        let result = executor.run(&Invocation::new("nonexistent_command_xyz")).await;

        assert!(matches!(result.unwrap_err(), CommandError::CommandNotFound { .. }));
    }

    #[tokio::test]
    async fn test_run_uses_current_dir() {
        let dir = tempfile::tempdir().unwrap();
        let executor = ProcessCommandExecutor;
        let output = executor
            .execute(&Invocation::new("pwd").current_dir(dir.path()))
            .await
            .unwrap();

        let reported = std::fs::canonicalize(output.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn test_invocation_display_quotes_spaced_args() {
        let invocation = Invocation::new("rsync")
            .args(["-avPhr", "my results"])
            .current_dir("/data");
        assert_eq!(invocation.to_string(), "cd /data && rsync -avPhr 'my results'");
    }

    #[test]
    fn test_check_status() {
        let invocation = Invocation::new("snakemake");
        assert!(invocation.check_status(0).is_ok());
        assert!(matches!(
            invocation.check_status(2),
            Err(CommandError::NonZeroExit { status_code: 2, .. })
        ));
    }
}
