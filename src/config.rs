use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::encoding::Codepage;
use crate::executor::ShellKind;

/// Options record for a [`ConsoleRunner`](crate::ConsoleRunner), usually
/// read from a TOML file:
///
/// ```toml
/// shell = "windows"
/// encoding = "866"
/// reverse_conversion = true
/// working_dir = "C:/build"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Shell family; the host platform's shell when absent.
    #[serde(default)]
    pub shell: Option<ShellKind>,
    /// Console encoding code, e.g. `"866"`.
    #[serde(default)]
    pub encoding: Option<String>,
    /// Convert extracted matches back into the console encoding.
    #[serde(default)]
    pub reverse_conversion: bool,
    /// Working directory for the child; the caller's when absent.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl RunnerConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).context("failed to parse runner config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read runner config {}", path.display()))?;
        Self::from_toml_str(&source)
            .with_context(|| format!("invalid runner config {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(code) = self.encoding.as_deref().filter(|code| !code.is_empty()) {
            ensure!(
                Codepage::lookup(code).is_ok(),
                "encoding `{code}` is not a supported console code page"
            );
        }

        if let Some(dir) = &self.working_dir {
            ensure!(
                !dir.as_os_str().is_empty(),
                "working_dir must not be empty"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write as _;

    #[test]
    fn empty_document_yields_defaults() -> Result<()> {
        assert_eq!(RunnerConfig::from_toml_str("")?, RunnerConfig::default());
        Ok(())
    }

    #[test]
    fn parses_every_field() -> Result<()> {
        let config = RunnerConfig::from_toml_str(
            r#"
            shell = "windows"
            encoding = "1251"
            reverse_conversion = true
            working_dir = "build"
            "#,
        )?;
        assert_eq!(
            config,
            RunnerConfig {
                shell: Some(ShellKind::Windows),
                encoding: Some("1251".to_string()),
                reverse_conversion: true,
                working_dir: Some(PathBuf::from("build")),
            }
        );
        Ok(())
    }

    #[test]
    fn rejects_unknown_code_page() {
        let error = RunnerConfig::from_toml_str("encoding = \"1200\"").err();
        let message = error.map(|err| format!("{err:#}")).unwrap_or_default();
        assert!(message.contains("`1200` is not a supported console code page"));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(RunnerConfig::from_toml_str("timeout = 5").is_err());
    }

    #[test]
    fn loads_from_disk() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "encoding = \"437\"")?;
        let config = RunnerConfig::load(file.path())?;
        assert_eq!(config.encoding.as_deref(), Some("437"));
        assert!(!config.reverse_conversion);
        Ok(())
    }

    #[test]
    fn missing_file_reports_path() {
        let error = RunnerConfig::load("/nonexistent/fluent-console.toml").err();
        let message = error.map(|err| err.to_string()).unwrap_or_default();
        assert!(message.contains("/nonexistent/fluent-console.toml"));
    }
}
