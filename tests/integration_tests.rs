use assert_cmd::prelude::*;
use std::process::Command;

fn moss() -> Command {
    Command::cargo_bin("moss").unwrap()
}

#[test]
fn runs_without_arguments() {
    moss().assert().success();
}

#[test]
fn run_reports_final_state() {
    let assert = moss()
        .args(["run", "--minimal", "tests/files/basic.asm"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("A 0x84"), "got: {stdout}");
    assert!(stdout.contains("X 0xc1"), "got: {stdout}");
    assert!(stdout.contains("C 1"), "got: {stdout}");
    assert!(stdout.contains("N 1"), "got: {stdout}");
}

#[test]
fn run_honors_the_load_address() {
    let assert = moss()
        .args(["run", "--minimal", "--load-addr", "0x0700", "tests/files/loop.asm"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("X 0x05"), "got: {stdout}");
    assert!(stdout.contains("PC 0x0707"), "got: {stdout}");
}

#[test]
fn check_passes_a_clean_file() {
    moss().args(["check", "tests/files/basic.asm"]).assert().success();
}

#[test]
fn check_names_the_offending_line() {
    let assert = moss()
        .args(["check", "tests/files/bad.asm"])
        .assert()
        .failure();
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("FOO"), "got: {stderr}");
}

#[test]
fn rejects_unknown_extensions() {
    moss().args(["check", "Cargo.toml"]).assert().failure();
}
