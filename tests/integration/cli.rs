//! `weft` binary behavior.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_project(root: &std::path::Path) {
    fs::create_dir_all(root.join("frontend")).unwrap();
    fs::create_dir_all(root.join("backend")).unwrap();
    fs::create_dir_all(root.join("common")).unwrap();
    fs::write(root.join("weft.toml"), "[app]\nname = \"demo\"\n").unwrap();
    fs::write(
        root.join("frontend/entrypoint.ts"),
        r#"import { nav } from "./nav.ts";"#,
    )
    .unwrap();
    fs::write(
        root.join("frontend/nav.ts"),
        r#"import { theme } from "../common/theme.ts";"#,
    )
    .unwrap();
    fs::write(root.join("common/theme.ts"), "export const theme = {};\n").unwrap();
}

#[test]
fn tree_renders_project_graph() {
    let temp = TempDir::new().unwrap();
    write_project(temp.path());

    Command::cargo_bin("weft")
        .unwrap()
        .args(["tree", "frontend/entrypoint.ts"])
        .arg("--manifest-path")
        .arg(temp.path().join("weft.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("frontend/entrypoint.ts"))
        .stdout(predicate::str::contains("frontend/nav.ts"))
        .stdout(predicate::str::contains("common/theme.ts"));
}

#[test]
fn tree_json_format_is_parseable() {
    let temp = TempDir::new().unwrap();
    write_project(temp.path());

    let output = Command::cargo_bin("weft")
        .unwrap()
        .args(["tree", "frontend/entrypoint.ts", "--format", "json"])
        .arg("--manifest-path")
        .arg(temp.path().join("weft.toml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(tree.get("frontend/nav.ts").is_some());
}

#[test]
fn missing_manifest_fails_with_suggestion() {
    let temp = TempDir::new().unwrap();

    Command::cargo_bin("weft")
        .unwrap()
        .args(["tree", "frontend/entrypoint.ts"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("weft.toml not found"));
}

#[test]
fn missing_app_directory_is_reported() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("frontend")).unwrap();
    fs::create_dir_all(root.join("common")).unwrap();
    fs::write(root.join("weft.toml"), "[app]\n").unwrap();

    Command::cargo_bin("weft")
        .unwrap()
        .args(["tree", "frontend/entrypoint.ts"])
        .arg("--manifest-path")
        .arg(root.join("weft.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("backend"));
}
