// ABOUTME: Integration tests for the hedera-local command line.
// ABOUTME: Validates help output, argument errors and the debug workflow's exit code.

use assert_cmd::Command;
use predicates::prelude::*;

fn hedera_local_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("hedera-local"))
}

#[test]
fn help_shows_commands() {
    hedera_local_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("stop"))
        .stdout(predicate::str::contains("restart"))
        .stdout(predicate::str::contains("generate-accounts"))
        .stdout(predicate::str::contains("debug"));
}

#[test]
fn start_help_lists_network_options() {
    hedera_local_cmd()
        .args(["start", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--detached"))
        .stdout(predicate::str::contains("--network"))
        .stdout(predicate::str::contains("--enable-debug"));
}

#[test]
fn unknown_subcommand_fails() {
    hedera_local_cmd()
        .arg("deploy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn unknown_network_is_rejected() {
    hedera_local_cmd()
        .args(["start", "-n", "devnet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("devnet"));
}

#[test]
fn debug_with_malformed_timestamp_exits_with_one() {
    let temp = tempfile::tempdir().unwrap();

    hedera_local_cmd()
        .current_dir(temp.path())
        .env("HEDERA_LOCAL_WORKDIR", temp.path().join("work"))
        .env("DOCKER_SOCKET", temp.path().join("docker.sock"))
        .env_remove("RUST_LOG")
        .args(["debug", "1707081291"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Invalid timestamp string"));
}

#[test]
fn missing_settings_file_is_reported() {
    let temp = tempfile::tempdir().unwrap();

    hedera_local_cmd()
        .current_dir(temp.path())
        .args(["--config", "missing.yml", "stop"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing.yml"));
}
