//! End-to-end tests of the `extenv` binary.

use assert_cmd::Command;
use extenv::test_utils::ArchiveFixture;
use predicates::prelude::*;
use std::fs;

use crate::helpers::{Workspace, jar_location};

/// The binary with no user configuration and colors disabled.
fn extenv(ws: &Workspace) -> Command {
    let mut cmd = Command::cargo_bin("extenv").unwrap();
    cmd.env("EXTENV_CONFIG", ws.root().join("missing-config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .current_dir(ws.root());
    cmd
}

#[test]
fn test_locate_prefers_common() {
    let ws = Workspace::new();
    let common = ws.common();
    ws.plugin(ArchiveFixture::new("a.jar").entry("shared.txt", "a"));

    extenv(&ws)
        .args(["--common", "lib/common.jar", "locate", "plugins/a.jar", "shared.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains(jar_location(&common, "shared.txt")));
}

#[test]
fn test_locate_all_lists_every_location() {
    let ws = Workspace::new();
    let common = ws.common();
    let e = ws.extension(ArchiveFixture::new("e.jar").provides("ext1", None).entry("shared.txt", "e"));
    let a = ws.plugin(ArchiveFixture::new("a.jar").requires("ext1", None).entry("shared.txt", "a"));

    let output = extenv(&ws)
        .args(["--common", "lib/common.jar", "--ext-dir", "ext", "locate", "plugins/a.jar", "shared.txt", "--all"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout).to_string();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            jar_location(&common, "shared.txt"),
            jar_location(&e, "shared.txt"),
            jar_location(&a, "shared.txt"),
        ]
    );
}

#[test]
fn test_locate_missing_resource_fails() {
    let ws = Workspace::new();
    ws.plugin(ArchiveFixture::new("a.jar"));

    extenv(&ws)
        .args(["locate", "plugins/a.jar", "nowhere.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nowhere.txt"));
}

#[test]
fn test_tree_prints_providers() {
    let ws = Workspace::new();
    ws.extension(ArchiveFixture::new("util.jar").provides("util", None));
    ws.extension(ArchiveFixture::new("xml.jar").provides("xml", None).requires("util", None));
    ws.plugin(ArchiveFixture::new("task.jar").requires("xml", None));

    extenv(&ws)
        .args(["--ext-dir", "ext", "tree", "plugins/task.jar", "--order"])
        .assert()
        .success()
        .stdout(predicate::str::contains("task.jar"))
        .stdout(predicate::str::contains("└── xml.jar"))
        .stdout(predicate::str::contains("util.jar"))
        .stdout(predicate::str::contains("Build order:"))
        .stdout(predicate::str::contains("1. util.jar"));
}

#[test]
fn test_check_reports_misspelled_extension() {
    let ws = Workspace::new();
    ws.extension(ArchiveFixture::new("xml.jar").provides("org.example.xml", None));
    ws.plugin(ArchiveFixture::new("good.jar").requires("org.example.xml", None));
    ws.plugin(ArchiveFixture::new("bad.jar").requires("org.example.xmll", None));

    extenv(&ws)
        .args(["--ext-dir", "ext", "check", "plugins/good.jar", "plugins/bad.jar"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("✓ plugins/good.jar (1 provider(s))"))
        .stdout(predicate::str::contains("✗ plugins/bad.jar"))
        .stdout(predicate::str::contains("Did you mean 'org.example.xml'?"))
        .stderr(predicate::str::contains("1 artifact(s) failed to resolve"));
}

#[test]
fn test_config_file_supplies_directories() {
    let ws = Workspace::new();
    let common = ws.common();
    ws.extension(ArchiveFixture::new("e.jar").provides("ext1", None));
    ws.plugin(ArchiveFixture::new("a.jar").requires("ext1", None));

    let config = ws.root().join("extenv.toml");
    fs::write(
        &config,
        format!(
            "extension_dirs = [\"{}\"]\ncommon = [\"{}\"]\n",
            ws.ext_dir().display(),
            ws.common_jar_path().display()
        ),
    )
    .unwrap();

    extenv(&ws)
        .arg("-c")
        .arg(&config)
        .args(["locate", "plugins/a.jar", "shared.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains(jar_location(&common, "shared.txt")));
}

#[test]
fn test_invalid_config_is_reported() {
    let ws = Workspace::new();
    ws.plugin(ArchiveFixture::new("a.jar"));
    let config = ws.root().join("extenv.toml");
    fs::write(&config, "unknown_key = true\n").unwrap();

    extenv(&ws)
        .arg("--config")
        .arg(&config)
        .args(["check", "plugins/a.jar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}
