// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub mod common;

use crate::common::{URL, Workspace};
use predicates::prelude::*;

#[test]
fn test_archive_show_and_history() {
    let ws = Workspace::new();
    let v1 = ws.write("v1.html", "<h1>News</h1>\n<p>first</p>\n");
    let v2 = ws.write("v2.html", "<h1>News</h1>\n<p>second</p>\n");

    ws.archive(&v1)
        .success()
        .stdout(predicate::str::contains("as version 1 (base"));
    ws.archive(&v2)
        .success()
        .stdout(predicate::str::contains("as version 2 (delta"));
    ws.archive(&v2)
        .success()
        .stdout(predicate::str::contains("Unchanged (identical_content)"));

    ws.cmd()
        .args(["show", URL, "--version", "1"])
        .assert()
        .success()
        .stdout("<h1>News</h1>\n<p>first</p>\n");
    ws.cmd()
        .args(["show", URL, "--exact"])
        .assert()
        .success()
        .stdout("<h1>News</h1>\n<p>second</p>\n");

    let output = ws.cmd().args(["history", URL]).output().unwrap();
    assert!(output.status.success());
    let history = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = history.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].trim_start().starts_with("2 "));
    assert!(lines[0].contains("delta"));
    assert!(lines[1].contains("base"));
}

#[test]
fn test_archive_from_stdin_and_not_modified() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["archive", URL, "--etag", "\"v1\""])
        .write_stdin("<p>from stdin</p>\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("as version 1"));
    ws.cmd()
        .args(["archive", URL, "--not-modified"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Unchanged (protocol), latest version is 1",
        ));
    ws.cmd()
        .args(["show", URL])
        .assert()
        .success()
        .stdout("<p>from stdin</p>\n");
}

#[test]
fn test_failed_fetch_is_reported() {
    let ws = Workspace::new();
    let page = ws.write("error.html", "<p>Internal Server Error</p>");
    ws.cmd()
        .arg("archive")
        .arg(URL)
        .arg("--file")
        .arg(&page)
        .args(["--status", "500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected HTTP status 500"));
    ws.cmd()
        .args(["history", URL])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_diff_between_versions() {
    let ws = Workspace::new();
    ws.archive(&ws.write("v1.html", "a\nb\nc\n")).success();
    ws.archive(&ws.write("v2.html", "a\nB\nc\n")).success();

    ws.cmd()
        .args(["diff", URL, "1", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- Version 1"))
        .stdout(predicate::str::contains("+++ Version 2"))
        .stdout(predicate::str::contains("-b\n+B\n"));
    ws.cmd()
        .args(["diff", URL, "1", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no version 3"));
}

#[test]
fn test_rebase() {
    let ws = Workspace::new();
    ws.archive(&ws.write("v1.html", "one\n")).success();
    ws.archive(&ws.write("v2.html", "one\ntwo\n")).success();

    ws.cmd()
        .args(["rebase", URL, "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is now a base"));
    ws.cmd()
        .args(["rebase", URL, "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is already a base"));
    ws.cmd()
        .args(["show", URL, "--version", "2", "--exact"])
        .assert()
        .success()
        .stdout("one\ntwo\n");
}

#[test]
fn test_pages_listing() {
    let ws = Workspace::new();
    ws.archive(&ws.write("v1.html", "one\n")).success();

    ws.cmd()
        .arg("pages")
        .assert()
        .success()
        .stdout(predicate::str::contains(URL).and(predicate::str::contains("versions: 1")));
    ws.cmd()
        .args(["pages", "example.org"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_unknown_page() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["show", "https://nowhere.example"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not archived"));
}
