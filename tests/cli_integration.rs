//! Integration tests for the seedline binary.
//!
//! These tests exercise the full CLI against script files in a temporary
//! directory, with config discovery pointed at that directory.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for running seedline with an isolated config search.
fn seedline(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("seedline").unwrap();
    cmd.env_remove("SEEDLINE_CONFIG")
        .env_remove("RUST_LOG")
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("xdg"));
    cmd
}

fn write_script(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

const CATALOGUE: &str = r#"# sample catalogue
add language es Spanish --native=Español
add author ul "Ursula K. Le Guin"
add book earthsea "A Wizard of Earthsea" ul 1968 --lang=es
"#;

// =============================================================================
// run / exec
// =============================================================================

#[test]
fn run_emits_regenerated_commands() {
    let temp = TempDir::new().unwrap();
    let script = write_script(&temp, "catalogue.txt", CATALOGUE);

    seedline(temp.path())
        .arg("run")
        .arg(&script)
        .arg("--emit")
        .assert()
        .success()
        .stdout(predicate::eq(
            "add language es Spanish --NativeName=Español\n\
             add author ul \"Ursula K. Le Guin\"\n\
             add book earthsea \"A Wizard of Earthsea\" ul 1968 --Language=es\n",
        ))
        .stderr(predicate::str::contains(
            "ran 3 commands, library holds 3 records",
        ));
}

#[test]
fn run_reports_failing_line() {
    let temp = TempDir::new().unwrap();
    let script = write_script(
        &temp,
        "broken.txt",
        "add language en English\nadd book b1 Dune --Year=soon\n",
    );

    seedline(temp.path())
        .arg("run")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.txt: line 2: invalid value for book.Year"));
}

#[test]
fn run_missing_file_fails() {
    let temp = TempDir::new().unwrap();

    seedline(temp.path())
        .args(["run", "no-such-script.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read script"));
}

#[test]
fn exec_runs_lines_in_order() {
    let temp = TempDir::new().unwrap();

    seedline(temp.path())
        .args([
            "exec",
            "add book b1 Dune",
            "retire-book b1 \"water damage\"",
            "--emit",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("retired b1 (Dune): water damage"))
        .stderr(predicate::str::contains("ran 2 commands, library holds 0 records"));
}

#[test]
fn exec_names_failing_command() {
    let temp = TempDir::new().unwrap();

    seedline(temp.path())
        .args(["exec", "add language en English", "publish en"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("command 2: "))
        .stderr(predicate::str::contains("publish"));
}

#[test]
fn quiet_suppresses_status() {
    let temp = TempDir::new().unwrap();

    seedline(temp.path())
        .args(["--quiet", "exec", "add language en English"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

// =============================================================================
// Generation options
// =============================================================================

#[test]
fn flags_shape_emitted_commands() {
    let temp = TempDir::new().unwrap();

    seedline(temp.path())
        .args(["exec", "add language es Spanish --native=Español", "--emit", "--aliases"])
        .assert()
        .success()
        .stdout("add lang es Spanish --native=Español\n");
}

#[test]
fn config_file_sets_defaults() {
    let temp = TempDir::new().unwrap();
    let config = write_script(&temp, "seedline.toml", "[generate]\npositional = false\n");

    seedline(temp.path())
        .arg("--config")
        .arg(&config)
        .args(["exec", "add language en English", "--emit"])
        .assert()
        .success()
        .stdout("add language en --Name=English\n");
}

#[test]
fn bad_config_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_script(&temp, "seedline.toml", "[generate]\ncolour = true\n");

    seedline(temp.path())
        .arg("--config")
        .arg(&config)
        .args(["exec", "add language en English"])
        .assert()
        .failure();
}

// =============================================================================
// usage / completion
// =============================================================================

#[test]
fn usage_without_name_prints_help() {
    let temp = TempDir::new().unwrap();

    seedline(temp.path())
        .arg("usage")
        .assert()
        .success()
        .stdout(predicate::str::contains("Record types:"))
        .stdout(predicate::str::contains("Custom commands:"));
}

#[test]
fn usage_detailed_record() {
    let temp = TempDir::new().unwrap();

    seedline(temp.path())
        .args(["usage", "book", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("add book <Key> <Title> <Author> <Year>"))
        .stdout(predicate::str::contains("aliases: b, title"));
}

#[test]
fn usage_custom_command() {
    let temp = TempDir::new().unwrap();

    seedline(temp.path())
        .args(["usage", "update-language"])
        .assert()
        .success()
        .stdout("update-language <key> <name> [<native>]\n");
}

#[test]
fn usage_unknown_name_fails() {
    let temp = TempDir::new().unwrap();

    seedline(temp.path())
        .args(["usage", "magazine"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no record type or command named 'magazine'"));
}

#[test]
fn completion_bash() {
    let temp = TempDir::new().unwrap();

    seedline(temp.path())
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_seedline"));
}
