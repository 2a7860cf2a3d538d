//! Fluent builder for running shell commands and inspecting what they print.
//!
//! A [`ConsoleRunner`] composes a command line from raw text and escaped
//! arguments, runs it through the platform shell with stderr merged into
//! stdout, and keeps every output line together with the exit code. The
//! captured lines can then be searched with regular expressions.
//!
//! Consoles that print in a legacy code page (CP866, CP1251, ...) are
//! supported through an encoding code: `cmd` is switched to that code page
//! before the command runs, captured lines are converted to UTF-8 before
//! extraction, and extracted values can be converted back on request.
//!
//! ```no_run
//! use fluent_console::ConsoleRunner;
//!
//! # fn main() -> Result<(), fluent_console::RunnerError> {
//! let mut runner = ConsoleRunner::new()
//!     .command("ipconfig")
//!     .append_argument("/all")
//!     .encoding(Some("866"));
//!
//! if runner.execute() {
//!     let addresses = runner.extract_matches([r"IPv4.*: ([\d.]+)"])?;
//!     for address in addresses {
//!         println!("{address}");
//!     }
//! } else if runner.has_error_matching("(?i)not recognized")? {
//!     eprintln!("ipconfig is not available");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Process spawning sits behind the [`CommandExecutor`] trait so callers can
//! substitute their own strategy. With the `scripted` feature enabled,
//! `ScriptedCommandExecutor` answers with canned output and logs every
//! invocation, which is handy in downstream tests.

pub mod config;
pub mod encoding;
pub mod error;
pub mod escape;
pub mod executor;
pub mod line;
pub mod runner;
#[cfg(any(test, feature = "scripted"))]
pub mod scripted;

pub use config::RunnerConfig;
pub use encoding::{CODEPAGES, Charset, Codepage};
pub use error::RunnerError;
pub use escape::escape_argument;
pub use executor::{
    CommandExecutor, CommandInvocation, CommandOutput, CommandStatus, ProcessCommandExecutor,
    ShellKind,
};
pub use line::{Line, split_lines};
pub use runner::{ConsoleRunner, SPAWN_FAILURE_EXIT_CODE};
#[cfg(any(test, feature = "scripted"))]
pub use scripted::ScriptedCommandExecutor;
