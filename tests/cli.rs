// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! End-to-end tests of the `ballast` binary.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ballast(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ballast").unwrap();
    cmd.current_dir(dir.path())
        .env("BALLAST_COLOR", "never")
        .env_remove("BALLAST_CONFIG")
        .env_remove("BALLAST_TRIVIA");
    cmd
}

fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    ballast(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("roundtrip"));
}

#[test]
fn test_check_clean_file() {
    let dir = TempDir::new().unwrap();
    write(&dir, "ok.bal", "function main() {\n    int x = 1;\n}\n");
    ballast(&dir)
        .args(["check", "ok.bal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: 1 file(s) checked"));
}

#[test]
fn test_check_reports_line_and_column() {
    let dir = TempDir::new().unwrap();
    write(&dir, "bad.bal", "function main() {\n    int x = 1\n}\n");
    ballast(&dir)
        .args(["check", "bad.bal"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("bad.bal:2:14: error[BCE0003]"));
}

#[test]
fn test_check_many_files_in_order() {
    let dir = TempDir::new().unwrap();
    let names: Vec<String> = (0..6).map(|i| format!("f{i}.bal")).collect();
    for name in &names {
        write(&dir, name, "int x = ;\n");
    }
    let output = ballast(&dir).arg("check").args(&names).output().unwrap();
    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let positions: Vec<usize> = names.iter().map(|name| stdout.find(name.as_str()).unwrap()).collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{stdout}");
}

#[test]
fn test_parse_prints_tree() {
    let dir = TempDir::new().unwrap();
    write(&dir, "s.bal", "x += 1;");
    ballast(&dir)
        .args(["parse", "--fragment", "statement", "s.bal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CompoundAssignmentStatement"));
}

#[test]
fn test_parse_unknown_fragment() {
    let dir = TempDir::new().unwrap();
    write(&dir, "s.bal", "x");
    ballast(&dir)
        .args(["parse", "--fragment", "paragraph", "s.bal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown fragment"));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    ballast(&dir)
        .args(["check", "absent.bal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read absent.bal"));
}

#[test]
fn test_roundtrip_broken_source() {
    let dir = TempDir::new().unwrap();
    write(&dir, "junk.bal", "function ( { ] int = = ;; class }}} \"open");
    ballast(&dir)
        .args(["roundtrip", "junk.bal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok junk.bal"));
}

#[test]
fn test_tokens_with_trivia() {
    let dir = TempDir::new().unwrap();
    write(&dir, "t.bal", "int x; // done\n");
    ballast(&dir)
        .args(["tokens", "--trivia", "t.bal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("IntKeyword"))
        .stdout(predicate::str::contains("comment"));
}

#[test]
fn test_config_file_in_working_directory() {
    let dir = TempDir::new().unwrap();
    write(&dir, "ballast.toml", "show_diagnostics = false\n");
    write(&dir, "s.bal", "int x = 1");
    ballast(&dir)
        .args(["parse", "s.bal"])
        .assert()
        .success()
        .stderr(predicate::str::contains("BCE0003").not());
}

#[test]
fn test_invalid_config_file() {
    let dir = TempDir::new().unwrap();
    write(&dir, "ballast.toml", "history_size = \"lots\"\n");
    write(&dir, "s.bal", "int x = 1;");
    ballast(&dir)
        .args(["check", "s.bal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config file"));
}
