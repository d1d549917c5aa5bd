//! The `bump-deps` and `bump-envoy` binaries.

use assert_cmd::Command;
use predicates::prelude::*;

use crate::common::{
    ENVOY_RELEASES_PATH, FakeReleaseServer, ProjectFixture, Route, envoy_releases,
};

fn bump_deps() -> Command {
    let mut cmd = Command::cargo_bin("bump-deps").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("GITHUB_TOKEN");
    cmd
}

#[test]
fn test_release_track_is_required() {
    bump_deps()
        .arg("envoy")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--release-track"));
}

#[test]
fn test_unsupported_component() {
    bump_deps()
        .args(["nginx", "--release-track", "1.27"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("invalid value 'nginx'"));
}

#[test]
fn test_missing_config_file() {
    let project = ProjectFixture::new().unwrap();
    bump_deps()
        .args(["envoy", "--release-track", "v1.31", "--config"])
        .arg(project.path().join("absent.toml"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to read config"));
}

#[test]
fn test_invalid_config_file() {
    let project = ProjectFixture::new().unwrap();
    let config = project.path().join("bump.toml");
    std::fs::write(&config, "[regenerate]\nenvoy = []\n").unwrap();

    bump_deps()
        .args(["envoy", "--release-track", "v1.31", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("regenerate.envoy must name a program"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_envoy_bump() {
    let server = FakeReleaseServer::start(vec![Route::json(
        ENVOY_RELEASES_PATH,
        envoy_releases(&["v1.31.2", "v1.30.6"]),
    )])
    .await
    .unwrap();
    let project = ProjectFixture::new().unwrap();
    let root = project.path().to_path_buf();
    let releases_url = server.url(ENVOY_RELEASES_PATH);

    tokio::task::spawn_blocking(move || {
        bump_deps()
            .env("BUMP_DEPS_ENVOY_RELEASES_URL", &releases_url)
            .args(["envoy", "--release-track", "v1.31", "--skip-regenerate"])
            .arg("--project-root")
            .arg(&root)
            .arg("--output-version-file")
            .arg(root.join("version.txt"))
            .arg("--commit-message-file")
            .arg(root.join("commit-message.txt"))
            .assert()
            .success()
            .stderr(predicate::str::contains("Bump complete"));
    })
    .await
    .unwrap();

    assert_eq!(project.read("version.txt"), "v1.31.2");
    assert!(project.read("commit-message.txt").contains("releases/tag/v1.31.2"));
    assert!(project.read("examples/contour/03-envoy.yaml").contains("envoy:v1.31.2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_reports_no_matching_release() {
    let server = FakeReleaseServer::start(vec![Route::json(
        ENVOY_RELEASES_PATH,
        envoy_releases(&["v1.30.6"]),
    )])
    .await
    .unwrap();
    let project = ProjectFixture::new().unwrap();
    let root = project.path().to_path_buf();
    let releases_url = server.url(ENVOY_RELEASES_PATH);

    tokio::task::spawn_blocking(move || {
        bump_deps()
            .env("BUMP_DEPS_ENVOY_RELEASES_URL", &releases_url)
            .args(["envoy", "--release-track", "v1.31", "--skip-regenerate", "--quiet"])
            .arg("--project-root")
            .arg(&root)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("No matching release found for track: v1.31"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bump_envoy_binary() {
    let server = FakeReleaseServer::start(vec![Route::json(
        ENVOY_RELEASES_PATH,
        envoy_releases(&["v1.31.2"]),
    )])
    .await
    .unwrap();
    let project = ProjectFixture::new().unwrap();
    let root = project.path().to_path_buf();
    let releases_url = server.url(ENVOY_RELEASES_PATH);

    tokio::task::spawn_blocking(move || {
        Command::cargo_bin("bump-envoy")
            .unwrap()
            .env_remove("RUST_LOG")
            .env("BUMP_DEPS_ENVOY_RELEASES_URL", &releases_url)
            .args(["--release-track", "v1.31", "--skip-regenerate"])
            .arg("--project-root")
            .arg(&root)
            .assert()
            .success();
    })
    .await
    .unwrap();

    assert!(project.read("Makefile").contains("envoy:v1.31.2"));
}
