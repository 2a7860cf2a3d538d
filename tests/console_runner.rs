#![cfg(unix)]

use anyhow::Result;
use fluent_console::{ConsoleRunner, RunnerConfig, ShellKind};
use pretty_assertions::assert_eq;
use std::fs;

#[test]
fn echo_hello_succeeds() {
    let mut runner = ConsoleRunner::new().command("echo hello");

    assert!(runner.execute());
    assert_eq!(runner.output(), ["hello"]);
    assert_eq!(runner.exit_code(), 0);
}

#[test]
fn silent_success_has_no_output() {
    let mut runner = ConsoleRunner::new().command("true");

    assert!(runner.execute());
    assert!(runner.output().is_empty());
    assert_eq!(runner.exit_code(), 0);
}

#[test]
fn stderr_is_merged_in_order() {
    let mut runner =
        ConsoleRunner::new().command("(echo out1; echo err1 1>&2; echo out2; echo err2 1>&2)");

    assert!(runner.execute());
    assert_eq!(runner.output(), ["out1", "err1", "out2", "err2"]);
}

#[test]
fn nonzero_exit_is_reported() -> Result<()> {
    let mut runner = ConsoleRunner::new().command("ls /fluent-console/definitely/missing");

    assert!(!runner.execute());
    assert_ne!(runner.exit_code(), 0);
    assert!(runner.has_error_matching("(?i)no such file")?);
    Ok(())
}

#[test]
fn exit_code_passes_through() {
    let mut runner = ConsoleRunner::new().command("exit 7");

    assert!(!runner.execute());
    assert_eq!(runner.exit_code(), 7);
    assert!(runner.output().is_empty());
}

#[test]
fn escaped_argument_is_not_interpreted() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let marker = dir.path().join("pwned");
    let payload = format!("; touch {}", marker.display());

    let mut runner = ConsoleRunner::new()
        .command("printf '%s\\n' x")
        .append_argument(&payload);

    // The quoted token (leading space included) is glued onto `x`.
    assert!(runner.execute());
    assert!(!marker.exists());
    assert_eq!(runner.output(), [format!("x {payload}").as_str()]);
    Ok(())
}

#[test]
fn legacy_output_round_trips_through_extraction() -> Result<()> {
    // "Ошибка: диск" in CP1251, printed as raw bytes.
    let mut runner = ConsoleRunner::new()
        .command(r"printf '\316\370\350\341\352\340: \344\350\361\352\n'")
        .encoding(Some("1251"))
        .reverse_conversion();

    assert!(runner.execute());
    let matches = runner.extract_matches([r"Ошибка: (\w+)"])?;

    let expected: Vec<u8> = vec![0xE4, 0xE8, 0xF1, 0xEA];
    assert_eq!(matches.len(), 1);
    assert_eq!(matches.first().map(|line| line.as_bytes()), Some(expected.as_slice()));
    assert_eq!(runner.output(), ["Ошибка: диск"]);
    Ok(())
}

#[test]
fn config_file_drives_the_runner() -> Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("marker.txt"), "")?;
    let config_path = dir.path().join("runner.toml");
    fs::write(
        &config_path,
        format!(
            "shell = \"unix\"\nworking_dir = \"{}\"\n",
            dir.path().display()
        ),
    )?;

    let config = RunnerConfig::load(&config_path)?;
    assert_eq!(config.shell, Some(ShellKind::Unix));

    let mut runner = ConsoleRunner::new().apply_config(&config).command("ls");
    assert!(runner.execute());
    let names = runner.extract_matches([r"^(marker)\.txt$"])?;
    assert_eq!(names, ["marker"]);
    Ok(())
}
