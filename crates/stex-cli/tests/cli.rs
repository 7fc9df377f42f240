use std::fs;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::thread;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn stex(dir: &Path) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("stex").into();
    cmd.current_dir(dir);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("OLLAMA_HOST");
    cmd
}

/// Point the config lookup at a directory inside the tempdir so tests never
/// touch a real user configuration.
fn isolated(cmd: &mut Command, dir: &Path) {
    cmd.env("XDG_CONFIG_HOME", dir.join("xdg"));
}

/// Read one HTTP request off the stream, honoring Content-Length.
fn read_http_request(stream: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            let header = String::from_utf8_lossy(&data[..pos]).to_string();
            let body_len = header
                .lines()
                .filter_map(|l| l.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= pos + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).to_string()
}

/// Serve exactly one chat completion whose assistant content is `content`.
fn serve_chat_once(listener: TcpListener, content: String) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_http_request(&mut stream);

        let body =
            serde_json::json!({"message": {"role": "assistant", "content": content}}).to_string();
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
    })
}

/// Write a config file routing inference at a loopback listener, and return
/// (listener, config path).
fn loopback_config(dir: &Path) -> (TcpListener, std::path::PathBuf) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let config_path = dir.join("config.json");
    let config = serde_json::json!({
        "inference": {
            "host": "127.0.0.1",
            "port": port,
            "model": "phi4",
            "timeout_secs": 10
        }
    });
    fs::write(&config_path, config.to_string()).unwrap();

    (listener, config_path)
}

// --- Binary startup ---

#[test]
fn binary_runs() {
    let mut cmd: Command = cargo_bin_cmd!("stex").into();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("stex"));
}

#[test]
fn help_lists_commands() {
    let mut cmd: Command = cargo_bin_cmd!("stex").into();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(
            predicate::str::contains("process")
                .and(predicate::str::contains("batch"))
                .and(predicate::str::contains("config")),
        );
}

// --- Process ---

#[test]
fn process_requires_existing_input() {
    let tmp = TempDir::new().unwrap();
    stex(tmp.path())
        .args(["process", "no-such-statement.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn process_rejects_unknown_formats() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("statement.docx"), "not a pdf").unwrap();

    stex(tmp.path())
        .args(["process", "statement.docx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn process_names_unreadable_files() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("broken.pdf"), b"not a pdf at all").unwrap();

    stex(tmp.path())
        .args(["process", "broken.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.pdf"));
}

#[test]
fn process_refuses_empty_submissions() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("blank.txt"), "   \n").unwrap();

    stex(tmp.path())
        .args(["process", "blank.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No text could be extracted"));
}

#[test]
fn process_extracts_end_to_end() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("statement.txt"),
        "01-04-2024 NEFT SALARY APRIL CR 5,000.00 15,000.00\n",
    )
    .unwrap();

    let (listener, config_path) = loopback_config(tmp.path());
    let envelope = serde_json::json!({
        "transactions": {
            "account_holder": {"name": "Priya Sharma", "account_number": "XX1234"},
            "transactions": [{
                "date": "01-04-2024",
                "amount": 5000.0,
                "currency": "INR",
                "type": "CREDIT",
                "description": "Salary April",
                "balance": 15000.0
            }]
        }
    })
    .to_string();
    let server = serve_chat_once(listener, envelope);

    stex(tmp.path())
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "process",
            "statement.txt",
            "-o",
            "out.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    server.join().unwrap();

    let export = fs::read_to_string(tmp.path().join("out.json")).unwrap();
    assert!(export.contains("\"data\""));
    assert!(export.contains("Priya Sharma"));
    assert!(export.contains("CREDIT"));
}

#[test]
fn process_warns_when_nothing_extracted() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("statement.txt"), "just boilerplate\n").unwrap();

    let (listener, config_path) = loopback_config(tmp.path());
    let envelope = serde_json::json!({
        "transactions": {
            "account_holder": {"name": "Priya Sharma", "account_number": "XX1234"},
            "transactions": []
        }
    })
    .to_string();
    let server = serve_chat_once(listener, envelope);

    stex(tmp.path())
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "process",
            "statement.txt",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("No transactions were extracted"));

    server.join().unwrap();
}

// --- Batch ---

#[test]
fn batch_requires_matching_files() {
    let tmp = TempDir::new().unwrap();
    stex(tmp.path())
        .args(["batch", "missing-dir/*.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

// --- Config ---

#[test]
fn config_path_prints_location() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = stex(tmp.path());
    isolated(&mut cmd, tmp.path());
    cmd.args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"));
}

#[test]
fn config_get_reads_defaults() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = stex(tmp.path());
    isolated(&mut cmd, tmp.path());
    cmd.args(["config", "get", "inference.model"])
        .assert()
        .success()
        .stdout(predicate::str::contains("phi4"));
}

#[test]
fn config_get_unknown_key_fails() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = stex(tmp.path());
    isolated(&mut cmd, tmp.path());
    cmd.args(["config", "get", "no.such.key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn config_init_set_get_round_trip() {
    let tmp = TempDir::new().unwrap();

    let mut cmd = stex(tmp.path());
    isolated(&mut cmd, tmp.path());
    cmd.args(["config", "init"]).assert().success();

    let mut cmd = stex(tmp.path());
    isolated(&mut cmd, tmp.path());
    cmd.args(["config", "set", "inference.model", "llama3"])
        .assert()
        .success();

    let mut cmd = stex(tmp.path());
    isolated(&mut cmd, tmp.path());
    cmd.args(["config", "get", "inference.model"])
        .assert()
        .success()
        .stdout(predicate::str::contains("llama3"));
}
