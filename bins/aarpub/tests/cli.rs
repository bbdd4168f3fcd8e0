use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn sample_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "gradle.properties",
        "lib.group=com.fearth.sample\n\
         lib.artifact=samplelib\n\
         lib.version=1.0.0\n\
         lib.name=samplelib\n\
         github.maven.url=https://maven.pkg.github.com/fearth/sample\n",
    );
    write(
        root,
        "gradle/libs.versions.toml",
        "[versions]\n\
         jackson = \"2.17.1\"\n\
         \n\
         [libraries]\n\
         jackson-databind = { module = \"com.fasterxml.jackson.core:jackson-databind\", version.ref = \"jackson\" }\n\
         okhttp = \"com.squareup.okhttp3:okhttp:4.12.0\"\n",
    );
    write(
        root,
        "samplelib/build.gradle.kts",
        "dependencies {\n\
         \x20   implementation(libs.jackson.databind)\n\
         \x20   implementation(files(\"libs/vendor.jar\"))\n\
         \x20   implementation(libs.okhttp)\n\
         }\n",
    );
    write(root, "samplelib/build/outputs/aar/samplelib-release.aar", "PK-aar");
    dir
}

fn aarpub(project: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("aarpub").unwrap();
    cmd.current_dir(project.path())
        .arg("--root")
        .arg(project.path())
        .env_remove("GITHUB_USERNAME")
        .env_remove("GITHUB_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn resolve_prefers_secrets_file_over_environment() {
    let project = sample_project();
    write(project.path(), ".env", "GITHUB_TOKEN=abc123\n");

    aarpub(&project)
        .env("GITHUB_TOKEN", "xyz789")
        .args(["resolve", "GITHUB_TOKEN", "--reveal"])
        .assert()
        .success()
        .stdout("abc123\n");
}

#[test]
fn resolve_falls_back_to_environment() {
    let project = sample_project();

    aarpub(&project)
        .env("GITHUB_USERNAME", "bob")
        .args(["resolve", "GITHUB_USERNAME", "--reveal"])
        .assert()
        .success()
        .stdout("bob\n");
}

#[test]
fn resolve_missing_key_fails_without_error_output() {
    let project = sample_project();

    aarpub(&project)
        .args(["resolve", "GITHUB_TOKEN"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn manifest_json_keeps_complete_declarations_in_order() {
    let project = sample_project();

    let output = aarpub(&project).args(["--json", "manifest"]).output().unwrap();
    assert!(
        output.status.success(),
        "manifest failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let entries: Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["artifact"], "jackson-databind");
    assert_eq!(entries[1]["artifact"], "okhttp");
    assert!(entries.iter().all(|e| e["scope"] == "runtime"));
}

#[test]
fn pom_renders_dependencies() {
    let project = sample_project();

    aarpub(&project)
        .arg("pom")
        .assert()
        .success()
        .stdout(predicate::str::contains("<packaging>aar</packaging>"))
        .stdout(predicate::str::contains("<artifactId>jackson-databind</artifactId>"))
        .stdout(predicate::str::contains("vendor.jar").not());
}

#[test]
fn descriptor_never_prints_token() {
    let project = sample_project();
    write(project.path(), ".env", "GITHUB_USERNAME=alice\nGITHUB_TOKEN=abc123\n");

    aarpub(&project)
        .arg("descriptor")
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"))
        .stdout(predicate::str::contains("<redacted>"))
        .stdout(predicate::str::contains("abc123").not());
}

#[test]
fn publish_to_file_repository() {
    let project = sample_project();
    let repo = project.path().join("repo");

    aarpub(&project)
        .args(["publish", "--repository"])
        .arg(format!("file://{}", repo.display()))
        .assert()
        .success();

    let dir = repo.join("com/fearth/sample/samplelib/1.0.0");
    assert_eq!(
        std::fs::read_to_string(dir.join("samplelib-1.0.0.aar")).unwrap(),
        "PK-aar"
    );
    assert!(dir.join("samplelib-1.0.0.pom").exists());
    assert!(dir.join("samplelib-1.0.0.pom.sha1").exists());
}

#[test]
fn publish_to_remote_url_is_refused() {
    let project = sample_project();

    aarpub(&project)
        .arg("publish")
        .assert()
        .code(5)
        .stderr(predicate::str::contains("E5002"));
}

#[test]
fn dry_run_reports_planned_files() {
    let project = sample_project();

    let output = aarpub(&project)
        .args(["--json", "publish", "--dry-run"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["package"], "com.fearth.sample:samplelib:1.0.0");
    assert!(!project.path().join("com").exists());
}

#[test]
fn missing_artifact_is_build_input_error() {
    let project = sample_project();
    std::fs::remove_file(
        project
            .path()
            .join("samplelib/build/outputs/aar/samplelib-release.aar"),
    )
    .unwrap();

    aarpub(&project)
        .args(["publish", "--dry-run"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Artifact not found"));
}

#[test]
fn malformed_config_reports_config_error() {
    let project = sample_project();
    write(project.path(), "aarpub.toml", "[project\n");

    aarpub(&project)
        .arg("manifest")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("E3002"));
}

#[test]
fn missing_explicit_config_reports_json_error() {
    let project = sample_project();

    let output = aarpub(&project)
        .args(["--json", "--config", "nope.toml", "manifest"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));

    let report: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(report["code_str"], "E3001");
}

#[test]
fn multi_line_and_commented_declarations() {
    let project = sample_project();
    write(
        project.path(),
        "samplelib/build.gradle.kts",
        "dependencies {\n\
         \x20   /* implementation(\"com.old:removed:0.1\") */\n\
         \x20   implementation(\n\
         \x20       \"com.x:lib:1.0\"\n\
         \x20   )\n\
         }\n",
    );

    let output = aarpub(&project).args(["--json", "manifest"]).output().unwrap();
    assert!(output.status.success());

    let entries: Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["group"], "com.x");
}
