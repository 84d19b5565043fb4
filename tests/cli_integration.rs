//! Integration tests that run the CLI binary.
//!
//! Every command runs against a temporary config directory and never reaches the network.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};
use std::thread::JoinHandle;

fn bin(config_dir: &Path) -> Command {
    // CARGO_BIN_EXE_<name> uses the binary target name; hyphens require concat! for env!()
    let bin = env!(concat!("CARGO_BIN_EXE_pantry", "-", "recipes"));
    let mut cmd = Command::new(bin);
    cmd.env("PANTRY_CONFIG_DIR", config_dir)
        .env("GEMINI_BASE_URL", "http://127.0.0.1:9")
        .env_remove("GEMINI_API_KEY")
        .env_remove("PANTRY_STORE")
        .env_remove("PANTRY_MODEL")
        .env_remove("RUST_LOG")
        // Run from the temp dir so dotenv() won't load .env from the project root
        .current_dir(config_dir);
    cmd
}

fn run(config_dir: &Path, args: &[&str]) -> Output {
    bin(config_dir)
        .args(args)
        .output()
        .expect("binary not found - run cargo build first")
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Answer one generateContent request with `reply_text`; returns the raw request.
fn serve_once(reply_text: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let handle = std::thread::spawn(move || {
        let (mut sock, _) = listener.accept().expect("accept");
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = sock.read(&mut chunk).expect("read");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = find_header_end(&buf) {
                let head = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
                let len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + len {
                    break;
                }
            }
        }
        let body = serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": reply_text}]}}]
        })
        .to_string();
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        sock.write_all(response.as_bytes()).expect("write");
        String::from_utf8_lossy(&buf).to_string()
    });
    (format!("http://{}", addr), handle)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn cli_help_succeeds_and_outputs_usage() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = run(tmp.path(), &["--help"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("generate"));
    assert!(out.contains("key"));
}

#[test]
fn cli_version_succeeds() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = run(tmp.path(), &["--version"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("pantry-recipes"));
}

#[test]
fn key_set_show_clear_roundtrip() {
    let tmp = tempfile::TempDir::new().expect("temp dir");

    let output = run(tmp.path(), &["key", "set", "ABCDEFGHIJKLMNOP"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("ABCDEFGHIJ..."));
    assert!(!stdout(&output).contains("ABCDEFGHIJKLMNOP"));
    assert!(tmp.path().join("gemini-api-key").exists());

    let output = run(tmp.path(), &["key", "show"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "ABCDEFGHIJ...");

    let output = run(tmp.path(), &["key", "clear"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!tmp.path().join("gemini-api-key").exists());

    let output = run(tmp.path(), &["key", "show"]);
    assert_eq!(stdout(&output).trim(), "not set");
}

#[test]
fn key_set_blank_is_rejected() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = run(tmp.path(), &["key", "set", "   "]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("must not be empty"));
    assert!(!tmp.path().join("gemini-api-key").exists());
}

#[test]
fn generate_without_key_is_not_configured() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = run(tmp.path(), &["generate", "onion, carrot, potato"]);
    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("No API key configured"),
        "got: {}",
        stderr(&output)
    );
}

#[test]
fn generate_blank_ingredients_is_rejected() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = run(tmp.path(), &["generate", "  "]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("at least one ingredient"));
}

#[test]
fn key_test_without_key_fails() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = run(tmp.path(), &["key", "test"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No API key configured"));
}

#[test]
fn models_marks_default_and_active() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = run(tmp.path(), &["models", "-m", "models/gemini-1.5-pro"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("gemini-1.5-flash  (default)"));
    assert!(out.contains("gemini-1.5-pro  (active)"));
    assert!(out.contains("gemini-2.0-flash"));
    assert!(!out.contains("models/"));
}

#[test]
fn memory_store_is_seeded_from_env_and_not_persisted() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = bin(tmp.path())
        .env("PANTRY_STORE", "memory")
        .env("GEMINI_API_KEY", "ZYXWVUTSRQPONMLK")
        .args(["key", "show"])
        .output()
        .expect("binary not found - run cargo build first");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "ZYXWVUTSRQ...");
    assert!(!tmp.path().join("gemini-api-key").exists());
}

#[test]
fn invalid_store_kind_is_an_error() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = bin(tmp.path())
        .env("PANTRY_STORE", "browser")
        .args(["config"])
        .output()
        .expect("binary not found - run cargo build first");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("PANTRY_STORE"));
}

#[test]
fn config_reports_key_status() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = run(tmp.path(), &["config"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("API key:  not set"));
    assert!(out.contains("gemini-1.5-flash (default)"));
}

#[test]
fn config_reports_model_override_with_ready_key() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = run(tmp.path(), &["key", "set", "ABCDEFGHIJKLMNOP"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = run(tmp.path(), &["config", "-m", "models/gemini-1.5-pro"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Model:    gemini-1.5-pro (from --model)"), "got: {}", out);
    assert!(out.contains("ABCDEFGHIJ... ✓"), "got: {}", out);
}

#[test]
fn generate_sends_raw_ingredients_to_selected_model() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = run(tmp.path(), &["key", "set", "ABCDEFGHIJKLMNOP"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let (base, server) = serve_once("# Three quick recipes");
    let output = bin(tmp.path())
        .env("GEMINI_BASE_URL", &base)
        .args(["generate", "  onion, carrot, potato  ", "-m", "models/gemini-1.5-pro"])
        .output()
        .expect("binary not found - run cargo build first");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "# Three quick recipes");

    let raw = server.join().expect("server thread");
    assert!(
        raw.starts_with("POST /models/gemini-1.5-pro:generateContent HTTP/1.1"),
        "got: {}",
        raw
    );
    assert!(raw.to_ascii_lowercase().contains("x-goog-api-key: abcdefghijklmnop"));
    let body = &raw[find_header_end(raw.as_bytes()).expect("headers") + 4..];
    let json: serde_json::Value = serde_json::from_str(body).expect("json body");
    let prompt = json["contents"][0]["parts"][0]["text"]
        .as_str()
        .expect("prompt text");
    assert!(prompt.contains("ingredients:   onion, carrot, potato  \n"), "got: {}", prompt);
}
