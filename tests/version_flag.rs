use assert_cmd::Command;
use predicates::prelude::*;

fn hn_hiring() -> Command {
    Command::cargo_bin("hn-hiring").expect("hn-hiring binary")
}

#[test]
fn prints_version() {
    hn_hiring()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn prints_help() {
    hn_hiring()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("hn-hiring"))
        .stdout(predicate::str::contains("--version"))
        .stdout(predicate::str::contains("--user <name>"));
}

#[test]
fn rejects_unknown_arguments() {
    hn_hiring()
        .arg("--bogus")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown argument \"--bogus\""));
}

#[test]
fn flag_values_are_required() {
    hn_hiring()
        .arg("--user")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--user needs a value"));
}

#[test]
fn missing_config_file_fails_before_the_terminal_opens() {
    let dir = tempfile::tempdir().unwrap();
    hn_hiring()
        .arg("--config")
        .arg(dir.path().join("absent.yaml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("load config"));
}
