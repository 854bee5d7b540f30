//! Integration tests for top-level CLI behavior.

mod common;

use std::path::Path;
use std::process::Command;

use common::{domain_reply, write_llm_cassette, write_project, BOARD_REPLY};

fn islgen() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_islgen"));
    cmd.env_remove("ISLGEN_RECORD").env_remove("ISLGEN_REPLAY").env_remove("RUST_LOG");
    cmd
}

fn run_islgen(args: &[&str]) -> std::process::Output {
    islgen().args(args).output().expect("failed to run islgen binary")
}

fn run_replaying(cassettes: &Path, args: &[&str]) -> std::process::Output {
    islgen()
        .env("ISLGEN_REPLAY", cassettes)
        .args(args)
        .output()
        .expect("failed to run islgen binary")
}

#[test]
fn stacks_lists_builtin_presets() {
    let output = run_islgen(&["stacks"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("react-js (default)"));
    assert!(stdout.contains("python-fastapi"));
}

#[test]
fn generate_help_shows_options() {
    let output = run_islgen(&["generate", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("--force"));
    assert!(stdout.contains("--stack"));
    assert!(stdout.contains("--debug"));
}

#[test]
fn unknown_subcommand_fails() {
    let output = run_islgen(&["compile"]);
    assert!(!output.status.success());
}

#[test]
fn missing_manifest_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("build-manifest.json");
    let output = run_islgen(&["generate", manifest.to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("manifest not found"));
    assert!(!dir.path().join("gen-lock.json").exists());
}

#[test]
fn generate_then_rerun_skips_everything() {
    let project = tempfile::tempdir().unwrap();
    let cassettes = tempfile::tempdir().unwrap();
    write_project(project.path());
    let reply = domain_reply();
    write_llm_cassette(cassettes.path(), &[&reply, BOARD_REPLY]);
    let root = project.path().to_str().unwrap();

    let first = run_replaying(cassettes.path(), &["generate", root]);
    let stdout = String::from_utf8_lossy(&first.stdout);
    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    assert!(stdout.contains("Generated: 2, Skipped: 0, Failed: 0"));
    assert!(project.path().join("bin/domain.js").exists());
    assert!(project.path().join("bin/board.jsx").exists());

    // The cassette is consumed per process; a rerun must not need it.
    let second = run_replaying(cassettes.path(), &["generate", root]);
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(second.status.success());
    assert!(stdout.contains("Generated: 0, Skipped: 2, Failed: 0"));
}

#[test]
fn debug_flag_dumps_requests_to_custom_dir() {
    let project = tempfile::tempdir().unwrap();
    let cassettes = tempfile::tempdir().unwrap();
    write_project(project.path());
    let reply = domain_reply();
    write_llm_cassette(cassettes.path(), &[&reply, BOARD_REPLY]);
    let dumps = project.path().join("dumps");

    let output = run_replaying(
        cassettes.path(),
        &["generate", project.path().to_str().unwrap(), "--debug", "--debug-dir", dumps.to_str().unwrap()],
    );
    assert!(output.status.success());
    let board_request = std::fs::read_to_string(dumps.join("board.isl.md")).unwrap();
    assert!(board_request.contains("Component: ./domain"));
    assert!(board_request.contains(common::DOMAIN_SIGNATURE));
}

#[test]
fn failed_entries_exit_non_zero_after_flushing_lock() {
    let project = tempfile::tempdir().unwrap();
    let cassettes = tempfile::tempdir().unwrap();
    write_project(project.path());
    let reply = domain_reply();
    write_llm_cassette(cassettes.path(), &[&reply]);
    std::fs::remove_file(project.path().join("build/board.build.md")).unwrap();

    let output = run_replaying(cassettes.path(), &["generate", project.path().to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stdout.contains("FAILED board.isl.md (build context)"));
    assert!(stderr.contains("1 of 2 entries failed"));
    assert!(project.path().join("build/gen-lock.json").exists());
}

#[test]
fn review_prints_verdict() {
    let project = tempfile::tempdir().unwrap();
    let cassettes = tempfile::tempdir().unwrap();
    let file = project.path().join("board.jsx");
    std::fs::write(&file, "export default function Board() { return null; }\n").unwrap();
    write_llm_cassette(
        cassettes.path(),
        &["{\"approved\": false, \"suggestions\": [\"render the cards\"]}"],
    );

    let output = run_replaying(cassettes.path(), &["review", file.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!output.status.success());
    assert!(stdout.contains("CHANGES REQUESTED"));
    assert!(stdout.contains("render the cards"));
}
