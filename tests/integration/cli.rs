//! End-to-end runs of the pnr-repl binary

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use pnr_repl::repl::engine::FAREWELL;
use pnr_repl::HOST_UNAVAILABLE_EXIT_CODE;
use tempfile::TempDir;

/// Command isolated from the operator's real configuration and history
fn pnr_repl(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pnr-repl"));
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_STATE_HOME", home.join("state"))
        .env("XDG_CACHE_HOME", home.join("cache"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(home.join("config.toml"));
    cmd
}

fn run_with_stdin(
    mut cmd: Command,
    stdin: &str,
) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_missing_host_exits_with_dedicated_status() {
    let home = TempDir::new().unwrap();
    let output = pnr_repl(home.path())
        .args(["--host", "nextpnr", "--no-history"])
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(HOST_UNAVAILABLE_EXIT_CODE as i32));
    assert!(stderr(&output).contains("Unable to import `nextpnr` API"));
    assert!(!stdout(&output).contains("scripting console"));
}

#[test]
fn test_inline_code_runs_without_banner() {
    let home = TempDir::new().unwrap();
    let output = pnr_repl(home.path())
        .args(["-c", "print(1 + 1)"])
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout(&output), "2\n");
}

#[test]
fn test_inline_code_error_fails() {
    let home = TempDir::new().unwrap();
    let output = pnr_repl(home.path())
        .args(["-c", "1 / 0"])
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("ZeroDivisionError"));
}

#[test]
fn test_exec_file_sees_host_context() {
    let home = TempDir::new().unwrap();
    let script = home.path().join("report.py");
    std::fs::write(&script, "print(ctx.arch)\nprint(len(ctx.cells))\n").unwrap();

    let output = pnr_repl(home.path())
        .args(["--arch", "ice40", "--exec"])
        .arg(&script)
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout(&output), "ice40\n3\n");
}

#[test]
fn test_piped_session_echoes_and_says_goodbye() {
    let home = TempDir::new().unwrap();
    let mut cmd = pnr_repl(home.path());
    cmd.arg("--no-history");
    let output = run_with_stdin(cmd, "x = 40 + 2\nx\n");

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Current architecture: generic"));
    assert!(out.contains("42"));
    assert!(out.contains(FAREWELL));
    assert!(!home.path().join("state").join("pnr-repl").join("history").exists());
}

#[test]
fn test_piped_session_writes_history() {
    let home = TempDir::new().unwrap();
    let history = home.path().join("h");
    let mut cmd = pnr_repl(home.path());
    cmd.arg("--history-file").arg(&history);
    let output = run_with_stdin(cmd, "net = 'clk'\n");

    assert!(output.status.success());
    let saved = std::fs::read_to_string(&history).unwrap();
    assert!(saved.contains("net = 'clk'"));
}

#[test]
fn test_list_hosts_names_the_builtin_host() {
    let home = TempDir::new().unwrap();
    let output = pnr_repl(home.path())
        .arg("--list-hosts")
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(stdout(&output), "generic\n");
}

#[test]
fn test_write_config_saves_effective_settings() {
    let home = TempDir::new().unwrap();
    let output = pnr_repl(home.path())
        .args(["--write-config", "--console", "rich", "--history-size", "64"])
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(output.status.success());

    let config = pnr_repl::util::config::load_user_config(&home.path().join("config.toml")).unwrap();
    assert_eq!(config.repl.console, pnr_repl::util::config::ConsoleKind::Rich);
    assert_eq!(config.repl.history_size, 64);
    assert_eq!(config.repl.prompt, ">>> ");
}
