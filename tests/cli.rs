use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::tempdir;

fn bin() -> Command {
  Command::cargo_bin("vendor-shim").unwrap()
}

fn write(root: &Path, relative: &str, contents: &str) {
  let path = root.join(relative);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, contents).unwrap();
}

fn project(root: &Path) {
  write(root, "node_modules/markdown/markdown.js", "exports.render = r;\nexports.toHTML = t;\n");
  write(
    root,
    "node_modules/markdown/package.json",
    r#"{"version": "0.5.0", "main": "markdown.js"}"#,
  );
  write(root, "node_modules/moment/moment.js", "export function utc() {}\n");
  write(root, "node_modules/moment/package.json", r#"{"main": "moment.js"}"#);
  write(
    root,
    "vendor.config.json",
    r#"{
 "dependencies": [
  {"logicalName": "markdown", "packageIdentifier": "markdown", "destSubdirectory": "markdown"},
  {"logicalName": "moment", "packageIdentifier": "moment", "destSubdirectory": "moment"}
 ]
}"#,
  );
}

#[test]
fn build_then_show() {
  let tmp = tempdir().unwrap();
  project(tmp.path());

  bin()
    .arg("--project")
    .arg(tmp.path())
    .arg("build")
    .assert()
    .success()
    .stdout(predicate::str::contains("markdown -> vendor/shims/markdown.js"))
    .stdout(predicate::str::contains("exports: default, render, toHTML"));

  assert!(tmp.path().join("vendor/markdown/markdown.js").is_file());
  assert!(tmp.path().join("vendor/shims/moment.js").is_file());

  bin()
    .arg("--project")
    .arg(tmp.path())
    .arg("show")
    .assert()
    .success()
    .stdout(predicate::str::contains("adapter vendor/shims/moment.js"))
    .stdout(predicate::str::contains("exports default, utc"));
}

#[test]
fn build_honours_skip() {
  let tmp = tempdir().unwrap();
  project(tmp.path());

  bin()
    .arg("--project")
    .arg(tmp.path())
    .args(["build", "--skip", "moment"])
    .assert()
    .success();

  assert!(tmp.path().join("vendor/markdown").is_dir());
  assert!(!tmp.path().join("vendor/moment").exists());
}

#[test]
fn check_reports_missing_packages() {
  let tmp = tempdir().unwrap();
  project(tmp.path());
  fs::remove_dir_all(tmp.path().join("node_modules/moment")).unwrap();

  bin()
    .arg("--project")
    .arg(tmp.path())
    .arg("check")
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to resolve `moment`"));

  assert!(!tmp.path().join("vendor").exists());
}

#[test]
fn check_lists_resolved_versions() {
  let tmp = tempdir().unwrap();
  project(tmp.path());

  bin()
    .arg("--project")
    .arg(tmp.path())
    .args(["check", "--only", "markdown"])
    .assert()
    .success()
    .stdout(predicate::str::contains("ok markdown@0.5.0"))
    .stdout(predicate::str::contains("resolved 1 dependencies"));
}
