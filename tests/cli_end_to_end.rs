use std::path::Path;

use assert_cmd::Command;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use httpmock::MockServer;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::{Value, json};
use tempfile::TempDir;

fn bridgeus(workdir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bridgeus"));
    cmd.current_dir(workdir.path())
        .env_remove("BRIDGEUS_PASSWORD")
        .env_remove("BRIDGEUS_CONFIG_FILE")
        .env_remove("RUST_LOG");
    cmd
}

fn read_session(path: &Path) -> Value {
    let raw = std::fs::read_to_string(path).expect("session file");
    serde_json::from_str(&raw).expect("session json")
}

#[test]
fn render_prints_markdown_tree_from_stdin() {
    let workdir = TempDir::new().expect("tempdir");
    bridgeus(&workdir)
        .arg("render")
        .write_stdin("## Hello\n- one\n- two")
        .assert()
        .success()
        .stdout(contains(r#""mode": "markdown""#))
        .stdout(contains(r#""kind": "heading""#))
        .stdout(contains(r#""kind": "bullet_list""#));
}

#[test]
fn render_sanitises_html_files() {
    let workdir = TempDir::new().expect("tempdir");
    let post = workdir.path().join("post.html");
    std::fs::write(&post, "<p onclick=\"alert(1)\">hi</p><script>alert(2)</script>")
        .expect("write post");

    bridgeus(&workdir)
        .arg("render")
        .arg(&post)
        .assert()
        .success()
        .stdout(contains(r#""mode": "html""#))
        .stdout(contains("<p>hi</p>"))
        .stdout(contains("alert").not());
}

#[test]
fn preview_truncates_plain_text() {
    let workdir = TempDir::new().expect("tempdir");
    bridgeus(&workdir)
        .args(["preview", "--max-length", "5"])
        .write_stdin("**Hello** world")
        .assert()
        .success()
        .stdout("Hello...\n");
}

#[test]
fn missing_input_file_fails() {
    let workdir = TempDir::new().expect("tempdir");
    bridgeus(&workdir)
        .args(["render", "does-not-exist.md"])
        .assert()
        .failure()
        .stderr(contains("does-not-exist.md"));
}

#[test]
fn login_whoami_logout_round_trip() {
    let server = MockServer::start();
    let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"u-1"}"#);
    let access = format!("h.{payload}.s");
    let login = server.mock(|when, then| {
        when.method("POST")
            .path("/api/auth/login")
            .json_body(json!({"email": "ada@example.com", "password": "secret"}));
        then.status(200)
            .json_body(json!({"access_token": access, "refresh_token": "r-1"}));
    });
    let logout = server.mock(|when, then| {
        when.method("POST")
            .path("/api/auth/logout")
            .json_body(json!({"refresh_token": "r-1"}));
        then.status(200).json_body(json!({"status": "ok"}));
    });

    let workdir = TempDir::new().expect("tempdir");
    let session = workdir.path().join("session.json");
    let base = server.url("/api");

    bridgeus(&workdir)
        .args(["login", "--email", "ada@example.com"])
        .args(["--api-base-url", base.as_str()])
        .arg("--session-file")
        .arg(&session)
        .env("BRIDGEUS_PASSWORD", "secret")
        .assert()
        .success()
        .stdout(contains(r#""display_name": "ada""#));
    login.assert();

    let stored = read_session(&session);
    assert_eq!(stored["refresh_token"], "r-1");
    assert_eq!(stored["identity"]["user_id"], "u-1");

    bridgeus(&workdir)
        .arg("whoami")
        .arg("--session-file")
        .arg(&session)
        .assert()
        .success()
        .stdout(contains(r#""email": "ada@example.com""#))
        .stdout(contains("r-1").not());

    bridgeus(&workdir)
        .arg("logout")
        .args(["--api-base-url", base.as_str()])
        .arg("--session-file")
        .arg(&session)
        .assert()
        .success();
    logout.assert();
    assert!(!session.exists());
}

#[test]
fn login_requires_a_password() {
    let workdir = TempDir::new().expect("tempdir");
    bridgeus(&workdir)
        .args(["login", "--email", "a@example.com"])
        .assert()
        .failure()
        .stderr(contains("password required"));
}

#[test]
fn whoami_without_session_fails() {
    let workdir = TempDir::new().expect("tempdir");
    bridgeus(&workdir)
        .arg("whoami")
        .assert()
        .failure()
        .stderr(contains("not signed in"));
}

#[test]
fn request_refreshes_and_persists_new_tokens() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET")
            .path("/api/notifications")
            .header("authorization", "Bearer old");
        then.status(401);
    });
    let fresh = server.mock(|when, then| {
        when.method("GET")
            .path("/api/notifications")
            .header("authorization", "Bearer new");
        then.status(200).json_body(json!([{"id": 1}]));
    });
    server.mock(|when, then| {
        when.method("POST").path("/api/auth/refresh");
        then.status(200)
            .json_body(json!({"access_token": "new", "refresh_token": "r-2"}));
    });

    let workdir = TempDir::new().expect("tempdir");
    let session = workdir.path().join("session.json");
    std::fs::write(
        &session,
        json!({"access_token": "old", "refresh_token": "r-1", "identity": {"email": "a@example.com"}})
            .to_string(),
    )
    .expect("seed session");

    bridgeus(&workdir)
        .args(["request", "get", "/notifications"])
        .args(["--api-base-url", server.url("/api").as_str()])
        .arg("--session-file")
        .arg(&session)
        .assert()
        .success()
        .stdout(contains(r#""id": 1"#));
    fresh.assert();

    let stored = read_session(&session);
    assert_eq!(stored["access_token"], "new");
    assert_eq!(stored["refresh_token"], "r-2");
    assert_eq!(stored["identity"]["email"], "a@example.com");
}

#[test]
fn request_rejects_non_json_body() {
    let workdir = TempDir::new().expect("tempdir");
    bridgeus(&workdir)
        .args(["request", "POST", "/posts", "--body", "not json"])
        .assert()
        .failure()
        .stderr(contains("request body is not JSON"));
}
