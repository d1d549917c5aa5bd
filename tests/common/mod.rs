//! Common test utilities for bump-deps integration tests
//!
//! - [`FakeReleaseServer`] answers release-index and registry requests from a
//!   fixed route table on a local port
//! - [`ProjectFixture`] lays out a temporary checkout with every file the
//!   updaters patch, pinned to older versions

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::{Context, Result};
use bump_deps::config::BumpConfig;
use bump_deps::test_utils::write_project_files;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub const OLD_DIGEST: &str =
    "sha256:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const AMD64_DIGEST: &str =
    "sha256:1111111111111111111111111111111111111111111111111111111111111111";
pub const ARM64_DIGEST: &str =
    "sha256:2222222222222222222222222222222222222222222222222222222222222222";

pub const ENVOY_RELEASES_PATH: &str = "/repos/envoyproxy/envoy/releases";
pub const GO_RELEASES_PATH: &str = "/dl/?mode=json";
pub const GOLANG_TAGS_PATH: &str = "/v2/repositories/library/golang/tags";

/// A canned response.
#[derive(Debug, Clone)]
pub struct Route {
    pub path: String,
    pub status: u16,
    pub body: String,
    /// Read the request but never answer
    pub stall: bool,
}

impl Route {
    pub fn json(path: &str, body: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            status: 200,
            body: body.into(),
            stall: false,
        }
    }

    pub fn status(path: &str, status: u16) -> Self {
        Self {
            path: path.to_string(),
            status,
            body: r#"{"message":"error"}"#.to_string(),
            stall: false,
        }
    }

    pub fn stalled(path: &str) -> Self {
        Self {
            stall: true,
            ..Self::json(path, "[]")
        }
    }
}

/// A request the server has seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
}

/// Minimal HTTP/1.1 server serving JSON from a route table.
///
/// Requests for unknown paths get a 404. The accept loop is aborted when the
/// server is dropped.
pub struct FakeReleaseServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl FakeReleaseServer {
    pub async fn start(routes: Vec<Route>) -> Result<Self> {
        let listener =
            TcpListener::bind("127.0.0.1:0").await.context("Failed to bind fake server")?;
        let addr = listener.local_addr()?;
        let routes = Arc::new(routes);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let handle = tokio::spawn({
            let requests = Arc::clone(&requests);
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let routes = Arc::clone(&routes);
                    let requests = Arc::clone(&requests);
                    tokio::spawn(async move {
                        let _ = serve(stream, &routes, &requests).await;
                    });
                }
            }
        });

        Ok(Self {
            addr,
            requests,
            handle,
        })
    }

    /// Absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Configuration pointing every endpoint at this server.
    pub fn config(&self) -> BumpConfig {
        let mut config = BumpConfig::default();
        config.endpoints.envoy_releases = self.url(ENVOY_RELEASES_PATH);
        config.endpoints.go_releases = self.url(GO_RELEASES_PATH);
        config.endpoints.golang_image_tags = self.url(GOLANG_TAGS_PATH);
        config
    }
}

impl Drop for FakeReleaseServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn header(head: &str, name: &str) -> Option<String> {
    head.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim().eq_ignore_ascii_case(name).then(|| value.trim().to_string())
    })
}

async fn serve(
    mut stream: TcpStream,
    routes: &[Route],
    requests: &Mutex<Vec<RecordedRequest>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf).to_string();
    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    if let Ok(mut seen) = requests.lock() {
        seen.push(RecordedRequest {
            path: path.clone(),
            authorization: header(&head, "authorization"),
            user_agent: header(&head, "user-agent"),
        });
    }

    let route = routes.iter().find(|route| route.path == path);
    if route.is_some_and(|route| route.stall) {
        tokio::time::sleep(std::time::Duration::from_secs(120)).await;
        return Ok(());
    }

    let (status, body) = route
        .map(|route| (route.status, route.body.clone()))
        .unwrap_or((404, r#"{"message":"Not Found"}"#.to_string()));
    let reason = match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Requests",
        _ => "Internal Server Error",
    };

    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

/// GitHub releases listing with the given tags, newest first.
pub fn envoy_releases(tags: &[&str]) -> String {
    let entries: Vec<String> = tags
        .iter()
        .map(|tag| format!(r#"{{"tag_name": "{tag}", "name": "{tag}", "draft": false}}"#))
        .collect();
    format!("[{}]", entries.join(","))
}

/// go.dev download index with the given versions, newest first.
pub fn go_releases(versions: &[&str]) -> String {
    let entries: Vec<String> = versions
        .iter()
        .map(|v| format!(r#"{{"version": "{v}", "stable": true, "files": []}}"#))
        .collect();
    format!("[{}]", entries.join(","))
}

/// Docker Hub tag descriptor with arm64 and amd64 images.
pub fn golang_tag(tag: &str) -> String {
    format!(
        r#"{{"name": "{tag}", "images": [
            {{"architecture": "arm64", "os": "linux", "digest": "{ARM64_DIGEST}"}},
            {{"architecture": "amd64", "os": "linux", "digest": "{AMD64_DIGEST}"}}
        ]}}"#
    )
}

/// Temporary project checkout pinned to Envoy v1.30.0 and Go 1.23.4.
pub struct ProjectFixture {
    pub dir: TempDir,
}

impl ProjectFixture {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        let makefile = format!(
            "ENVOY_IMAGE ?= docker.io/envoyproxy/envoy:v1.30.0\n\
             BUILD_BASE_IMAGE ?= golang:1.23.4@{OLD_DIGEST}\n\
             \n\
             generate:\n\t@echo generating\n"
        );
        let workflow = "env:\n  GOPROXY: https://proxy.golang.org/\n  GO_VERSION: 1.23.4\n";

        write_project_files(
            dir.path(),
            [
                ("Makefile", makefile.as_str()),
                (
                    "cmd/contour/gatewayprovisioner.go",
                    "const envoyImage = \"docker.io/envoyproxy/envoy:v1.30.0\"\n",
                ),
                (
                    "examples/contour/03-envoy.yaml",
                    "        image: docker.io/envoyproxy/envoy:v1.30.0\n",
                ),
                (
                    "examples/deployment/03-envoy-deployment.yaml",
                    "        image: docker.io/envoyproxy/envoy:v1.30.0\n",
                ),
                (".github/workflows/build_daily.yaml", workflow),
                (".github/workflows/build_tag.yaml", workflow),
                (".github/workflows/codeql-analysis.yml", workflow),
                (".github/workflows/prbuild.yaml", workflow),
            ],
        )?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path().join(relative)).unwrap_or_default()
    }
}
