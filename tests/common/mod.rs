// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::{Path, PathBuf};

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use tempfile::TempDir;

pub const URL: &str = "https://example.com/news";

pub fn cli() -> Command {
    let mut cmd = cargo_bin_cmd!("page-archive");
    cmd.env_remove("PAGE_ARCHIVE_CONFIG_PATH")
        .env_remove("RUST_LOG")
        .arg("--color")
        .arg("never");
    cmd
}

/// A scratch directory holding an empty configuration file and the archive database.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("couldn't create temp dir");
        std::fs::write(dir.path().join("config.toml"), "").expect("couldn't write config");
        Self { dir }
    }

    pub fn db(&self) -> PathBuf {
        self.dir.path().join("archive.db")
    }

    pub fn config(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    /// `page-archive` bound to this workspace's configuration and database.
    pub fn cmd(&self) -> Command {
        let mut cmd = cli();
        cmd.arg("--config")
            .arg(self.config())
            .arg("--db")
            .arg(self.db());
        cmd
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("couldn't write snapshot");
        path
    }

    pub fn archive(&self, snapshot: &Path) -> assert_cmd::assert::Assert {
        self.cmd()
            .arg("archive")
            .arg(URL)
            .arg("--file")
            .arg(snapshot)
            .assert()
    }
}
