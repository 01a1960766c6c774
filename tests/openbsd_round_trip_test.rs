//! Real-kernel round trip, OpenBSD only.
//!
//! Restrictions are irrevocable and process-wide, so pledging the test
//! runner itself would wedge the harness. Every scenario drives the `verho`
//! wrapper binary in a subprocess instead, the same technique the kernel's
//! own regression tests use.

#![cfg(target_os = "openbsd")]

use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn verho() -> Command {
    Command::new(env!("CARGO_BIN_EXE_verho"))
}

#[test]
fn test_round_trip_read_and_write_inside_the_veil() {
    let dir = TempDir::new().unwrap();
    let scratch = dir.path().join("scratch");
    fs::create_dir(&scratch).unwrap();

    // Declare /tmp-scratch rw+create and resolv.conf read-only, seal, then
    // exercise both from inside.
    let status = verho()
        .args([
            "-u",
            &format!("{}:rwc", scratch.display()),
            "-u",
            "/etc/resolv.conf:r",
            "-u",
            "/bin/sh:x",
            "-u",
            "/usr/lib:r",
            "-u",
            "/usr/libexec:r",
            "-P",
            "stdio rpath wpath cpath",
            "--",
            "/bin/sh",
            "-c",
            &format!(
                "cat /etc/resolv.conf > /dev/null && echo ok > {}/x",
                scratch.display()
            ),
        ])
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(fs::read_to_string(scratch.join("x")).unwrap(), "ok\n");
}

#[test]
fn test_undeclared_path_is_unreachable() {
    let status = verho()
        .args([
            "-u",
            "/bin/sh:x",
            "-u",
            "/usr/lib:r",
            "-u",
            "/usr/libexec:r",
            "-P",
            "stdio rpath",
            "--",
            "/bin/sh",
            "-c",
            "cat /var/log/messages > /dev/null 2>&1",
        ])
        .status()
        .unwrap();
    assert!(!status.success(), "reads outside the veil must fail");
}

#[test]
fn test_exec_promises_bind_the_command() {
    // The command gets only stdio: reading any file must fail.
    let status = verho()
        .args([
            "-u",
            "/bin/sh:x",
            "-u",
            "/usr/lib:r",
            "-u",
            "/usr/libexec:r",
            "-P",
            "stdio",
            "--",
            "/bin/sh",
            "-c",
            "cat /etc/resolv.conf > /dev/null 2>&1",
        ])
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn test_invalid_promise_is_reported() {
    let output = verho()
        .args(["-P", "stdio", "--self-promises", "frobnicate", "--", "true"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid promise"));
}
