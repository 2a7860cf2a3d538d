use regex::bytes::Regex;
use std::path::PathBuf;
use tracing::{debug, trace, warn};

use crate::config::RunnerConfig;
use crate::encoding::Codepage;
use crate::error::RunnerError;
use crate::escape::escape_argument;
use crate::executor::{CommandExecutor, CommandInvocation, ProcessCommandExecutor, ShellKind};
use crate::line::{Line, split_lines};

/// Exit code recorded when the shell could not be spawned at all.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = -1;

const MERGE_STDERR: &str = " 2>&1";

/// Fluent builder that composes a command line, runs it through the shell,
/// and inspects the merged stdout/stderr it produced.
///
/// ```no_run
/// use fluent_console::ConsoleRunner;
///
/// let mut runner = ConsoleRunner::new().command("git status --short");
/// if !runner.execute() {
///     eprintln!("git exited with {}", runner.exit_code());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ConsoleRunner<E = ProcessCommandExecutor> {
    executor: E,
    shell: ShellKind,
    working_dir: Option<PathBuf>,
    command: String,
    output: Vec<Line>,
    exit_code: i32,
    encoding: Option<String>,
    reverse_conversion: bool,
}

impl ConsoleRunner {
    pub fn new() -> Self {
        Self::with_executor(ProcessCommandExecutor::new())
    }
}

impl Default for ConsoleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> ConsoleRunner<E> {
    pub fn with_executor(executor: E) -> Self {
        Self {
            executor,
            shell: ShellKind::host(),
            working_dir: None,
            command: String::new(),
            output: Vec::new(),
            exit_code: 0,
            encoding: None,
            reverse_conversion: false,
        }
    }

    /// Applies an options record. An absent encoding keeps the current one,
    /// exactly like [`encoding`](Self::encoding).
    pub fn apply_config(mut self, config: &RunnerConfig) -> Self {
        if let Some(shell) = config.shell {
            self.shell = shell;
        }
        if let Some(dir) = &config.working_dir {
            self.working_dir = Some(dir.clone());
        }
        self = self.encoding(config.encoding.as_deref());
        if config.reverse_conversion {
            self = self.reverse_conversion();
        }
        self
    }

    pub fn shell(mut self, shell: ShellKind) -> Self {
        self.shell = shell;
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Replaces the command line with `text`, verbatim and unescaped.
    pub fn command(mut self, text: impl Into<String>) -> Self {
        self.command = text.into();
        self
    }

    /// Appends `value` as one escaped token. Empty values are ignored.
    ///
    /// The separating space is escaped together with the value, so the
    /// space ends up inside the quotes: `' foo bar'` on Unix.
    pub fn append_argument(mut self, value: impl AsRef<str>) -> Self {
        let value = value.as_ref();
        if !value.is_empty() {
            let token = format!(" {value}");
            self.command.push_str(&escape_argument(self.shell, &token));
        }
        self
    }

    /// Sets the console encoding code (e.g. `"866"`).
    ///
    /// `None` and `Some("")` leave the current code untouched; there is no
    /// way to clear a code once it has been set.
    pub fn encoding(mut self, code: Option<&str>) -> Self {
        if let Some(code) = code.filter(|code| !code.is_empty()) {
            self.encoding = Some(code.to_string());
        }
        self
    }

    /// Requests that extracted matches be converted back into the console
    /// encoding before they are returned.
    pub fn reverse_conversion(mut self) -> Self {
        self.reverse_conversion = true;
        self
    }

    /// The command line composed so far.
    pub fn command_line(&self) -> &str {
        &self.command
    }

    /// The exact text handed to the shell: the code page switch (if any), the
    /// command line, and the stderr-to-stdout redirection.
    pub fn composed_command_line(&self) -> String {
        let prefix = self
            .encoding
            .as_deref()
            .map(|code| self.shell.code_page_prefix(code))
            .unwrap_or_default();
        format!("{prefix}{}{MERGE_STDERR}", self.command)
    }

    pub fn encoding_code(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// Table entry for the configured encoding code, if one is set.
    pub fn codepage(&self) -> Result<Option<&'static Codepage>, RunnerError> {
        self.encoding.as_deref().map(Codepage::lookup).transpose()
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Runs the command and blocks until it exits. Returns `true` when the
    /// exit code is 0.
    ///
    /// Output and exit code from any earlier run are replaced. A shell that
    /// cannot be spawned leaves no output and [`SPAWN_FAILURE_EXIT_CODE`].
    pub fn execute(&mut self) -> bool {
        let invocation = CommandInvocation::new(self.shell, self.composed_command_line())
            .with_working_dir(self.working_dir.clone());
        debug!(command = %invocation.command, shell = ?invocation.shell, "executing console command");

        match self.executor.execute(&invocation) {
            Ok(output) => {
                if !output.stderr.is_empty() {
                    debug!(
                        stderr = %String::from_utf8_lossy(&output.stderr),
                        "shell wrote outside the merged stream"
                    );
                }
                self.output = split_lines(&output.stdout);
                self.exit_code = output.status.code().unwrap_or(SPAWN_FAILURE_EXIT_CODE);
            }
            Err(error) => {
                warn!(error = %error, "failed to spawn console command");
                self.output.clear();
                self.exit_code = SPAWN_FAILURE_EXIT_CODE;
            }
        }

        debug!(
            exit_code = self.exit_code,
            lines = self.output.len(),
            "console command finished"
        );
        self.exit_code == 0
    }

    /// Captured output lines; empty until [`execute`](Self::execute) runs.
    pub fn output(&self) -> &[Line] {
        &self.output
    }

    /// Exit code of the last run; 0 before any run.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// True when `pattern` matches anywhere in at least one captured line.
    ///
    /// Lines are matched as captured: no encoding conversion is applied.
    pub fn has_error_matching(&self, pattern: &str) -> Result<bool, RunnerError> {
        let regex = compile(pattern)?;
        Ok(self.output.iter().any(|line| regex.is_match(line.as_bytes())))
    }

    /// Converts the captured output from the configured console encoding to
    /// UTF-8, in place.
    ///
    /// The conversion is not idempotent: running it twice decodes already
    /// converted text a second time.
    pub fn normalize_encoding(&mut self) -> Result<(), RunnerError> {
        let Some(page) = self.codepage()? else {
            return Ok(());
        };

        trace!(codepage = page.name(), lines = self.output.len(), "normalizing output to UTF-8");
        for line in &mut self.output {
            let decoded = page.decode(line.as_bytes());
            *line = Line::from(decoded);
        }
        Ok(())
    }

    /// Extracts one value per matching line.
    ///
    /// Patterns are tried in order and the first that matches a line wins.
    /// When it has capture groups and any of them participated, the first
    /// group's text is taken (empty if that group did not participate);
    /// otherwise the whole match.
    ///
    /// With an encoding code set, the captured output is first normalized to
    /// UTF-8 in place (see [`normalize_encoding`](Self::normalize_encoding)).
    /// With reverse conversion also requested, the returned values are
    /// encoded back into the console encoding; the captured output stays
    /// UTF-8.
    pub fn extract_matches<I, S>(&mut self, patterns: I) -> Result<Vec<Line>, RunnerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.normalize_encoding()?;

        let regexes = patterns
            .into_iter()
            .map(|pattern| compile(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut matches: Vec<Line> = self
            .output
            .iter()
            .filter_map(|line| first_extraction(&regexes, line.as_bytes()))
            .map(Line::from)
            .collect();

        if self.reverse_conversion
            && let Some(page) = self.codepage()?
        {
            trace!(codepage = page.name(), matches = matches.len(), "converting matches back");
            for value in &mut matches {
                let encoded = page.encode(&value.to_str_lossy());
                *value = Line::from(encoded);
            }
        }

        Ok(matches)
    }
}

fn compile(pattern: &str) -> Result<Regex, RunnerError> {
    Regex::new(pattern).map_err(|source| RunnerError::invalid_pattern(pattern, source))
}

fn first_extraction<'a>(regexes: &[Regex], line: &'a [u8]) -> Option<&'a [u8]> {
    regexes.iter().find_map(|regex| {
        let captures = regex.captures(line)?;
        let any_group = captures.iter().skip(1).any(|group| group.is_some());
        let extracted = if any_group {
            captures.get(1).map_or(&[][..], |group| group.as_bytes())
        } else {
            captures.get(0).map_or(&[][..], |whole| whole.as_bytes())
        };
        Some(extracted)
    })
}
