// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod config;

pub use self::config::*;

use crate::utils::misc::LoggingColor;
use clap::Args;
use directories::ProjectDirs;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable pointing at a configuration file.
pub const CONFIG_PATH_ENV: &str = "PAGE_ARCHIVE_CONFIG_PATH";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Options shared by every `page-archive` subcommand.
#[derive(Default, Debug, Clone, Args)]
pub struct CliOpts {
    /// A TOML file containing relevant configurations
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Archive database file, overrides `store.database` from the configuration
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
    /// Enable or disable colored logging in `stderr`
    #[arg(long, global = true, default_value = "auto")]
    pub color: LoggingColor,
    /// Directory for hourly rolling log files, overrides `log.log_dir`
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
}

impl CliOpts {
    /// Applies command line overrides on top of `config`.
    pub fn to_config(&self, mut config: Config) -> Config {
        if let Some(db) = &self.db {
            config.store.database.clone_from(db);
        }
        if let Some(log_dir) = &self.log_dir {
            config.log.log_dir = Some(log_dir.clone());
        }
        config
    }
}

/// Where a configuration file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigPath {
    Cli(PathBuf),
    Env(PathBuf),
    Project(PathBuf),
}

impl ConfigPath {
    pub fn to_path_buf(&self) -> &PathBuf {
        match self {
            ConfigPath::Cli(path) | ConfigPath::Env(path) | ConfigPath::Project(path) => path,
        }
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self {
            ConfigPath::Cli(_) => "command line",
            ConfigPath::Env(_) => CONFIG_PATH_ENV,
            ConfigPath::Project(_) => "project directory",
        };
        write!(f, "{} (from {source})", self.to_path_buf().display())
    }
}

pub fn project_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "page-archive", "page-archive")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Looks for a configuration file given on the command line, then in [`CONFIG_PATH_ENV`],
/// then in the per-user project configuration directory.
pub fn find_config_path(config: Option<&PathBuf>) -> Option<ConfigPath> {
    if let Some(path) = config {
        return Some(ConfigPath::Cli(path.clone()));
    }
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Some(ConfigPath::Env(PathBuf::from(path)));
    }
    project_config_path()
        .filter(|path| Path::exists(path))
        .map(ConfigPath::Project)
}
