use std::net::TcpListener;
use std::process::Output;
use std::time::Duration;

use assert_cmd::Command;

fn run(args: &[&str]) -> Output {
    Command::cargo_bin("tcp-pty-client")
        .unwrap()
        .args(args)
        .timeout(Duration::from_secs(10))
        .output()
        .unwrap()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn missing_arguments_exit_1() {
    let out = run(&[]);
    assert_eq!(out.status.code(), Some(1));
    let out = run(&["127.0.0.1"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn zero_port_rejected() {
    let out = run(&["127.0.0.1", "0"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("invalid port"), "{}", stderr(&out));
}

#[test]
fn port_above_range_rejected() {
    let out = run(&["127.0.0.1", "65536"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("invalid port"));
}

#[test]
fn bad_address_rejected() {
    let out = run(&["not-an-ip", "4422"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("invalid ip"));
}

#[test]
fn help_exits_0() {
    let out = run(&["--help"]);
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn refused_connection_exits_1() {
    let port = {
        let l = TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let out = run(&["127.0.0.1", &port.to_string()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("connect"), "{}", stderr(&out));
}

#[test]
fn non_terminal_stdin_fails_after_connect() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let out = Command::cargo_bin("tcp-pty-client")
        .unwrap()
        .args(["127.0.0.1", &port.to_string()])
        .write_stdin("")
        .timeout(Duration::from_secs(10))
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains(&format!("Connected to 127.0.0.1:{port}")));
    assert!(stderr(&out).contains("tcgetattr"), "{}", stderr(&out));
}
