use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;

/// Shell family used to execute commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    /// `sh -c`
    Unix,
    /// `cmd /D /S /C`
    Windows,
}

impl ShellKind {
    /// Shell family of the platform the crate was built for.
    pub const fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Prefix that switches the console to `code` before the command runs.
    ///
    /// Only `cmd` has a console code page; `sh` output is passed through as
    /// produced, so the prefix is empty there.
    pub fn code_page_prefix(self, code: &str) -> String {
        match self {
            Self::Windows => format!("chcp {code} >nul && "),
            Self::Unix => String::new(),
        }
    }
}

impl Default for ShellKind {
    fn default() -> Self {
        Self::host()
    }
}

/// Describes a command that will be executed by a [`CommandExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub shell: ShellKind,
    /// Full text handed to the shell, redirections included.
    pub command: String,
    pub working_dir: Option<PathBuf>,
}

impl CommandInvocation {
    pub fn new(shell: ShellKind, command: String) -> Self {
        Self {
            shell,
            command,
            working_dir: None,
        }
    }

    pub fn with_working_dir(mut self, working_dir: Option<PathBuf>) -> Self {
        self.working_dir = working_dir;
        self
    }
}

/// Describes the exit status of a command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    success: bool,
    code: Option<i32>,
}

impl CommandStatus {
    pub fn new(success: bool, code: Option<i32>) -> Self {
        Self { success, code }
    }

    /// Status of a process that exited with `code`.
    pub fn exited(code: i32) -> Self {
        Self::new(code == 0, Some(code))
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }
}

impl From<std::process::ExitStatus> for CommandStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        #[cfg(unix)]
        let code = {
            use std::os::unix::process::ExitStatusExt as _;
            // Same convention the shell uses for `$?` after a signal.
            status
                .code()
                .or_else(|| status.signal().map(|signal| 128 + signal))
        };
        #[cfg(not(unix))]
        let code = status.code();

        Self {
            success: status.success(),
            code,
        }
    }
}

/// Output produced by the executor for a command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: CommandStatus,
    pub stdout: Vec<u8>,
    /// Whatever the shell itself wrote to stderr outside the command's
    /// `2>&1` redirection.
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            status: CommandStatus::exited(0),
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    pub fn failure(code: i32, stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            status: CommandStatus::exited(code),
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }
}

/// Trait implemented by concrete command execution strategies.
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, invocation: &CommandInvocation) -> Result<CommandOutput>;
}

impl<E: CommandExecutor + ?Sized> CommandExecutor for Arc<E> {
    fn execute(&self, invocation: &CommandInvocation) -> Result<CommandOutput> {
        (**self).execute(invocation)
    }
}

/// Executes commands by delegating to the system shell via [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCommandExecutor;

impl ProcessCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CommandExecutor for ProcessCommandExecutor {
    fn execute(&self, invocation: &CommandInvocation) -> Result<CommandOutput> {
        let mut cmd = match invocation.shell {
            ShellKind::Unix => {
                let mut command = Command::new("sh");
                command.arg("-c").arg(&invocation.command);
                command
            }
            ShellKind::Windows => {
                let mut command = Command::new("cmd");
                command.arg("/D").arg("/S").arg("/C");
                push_cmd_line(&mut command, &invocation.command);
                command
            }
        };

        if let Some(dir) = &invocation.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());

        let output = cmd
            .output()
            .with_context(|| format!("failed to execute command: {}", invocation.command))?;

        Ok(CommandOutput {
            status: CommandStatus::from(output.status),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

// `cmd /S /C` strips one pair of outer quotes and takes the rest verbatim,
// so the line must bypass the MSVCRT argument quoting.
#[cfg(windows)]
fn push_cmd_line(command: &mut Command, line: &str) {
    use std::os::windows::process::CommandExt as _;
    command.raw_arg(format!("\"{line}\""));
}

#[cfg(not(windows))]
fn push_cmd_line(command: &mut Command, line: &str) {
    command.arg(line);
}
