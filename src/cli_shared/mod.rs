// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub mod cli;
pub mod logger;

use crate::cli_shared::cli::{Config, ConfigPath, find_config_path};
use crate::utils::io::read_toml;
use anyhow::Context as _;
use std::path::PathBuf;

pub fn read_config(
    config_path_opt: Option<&PathBuf>,
) -> anyhow::Result<(Option<ConfigPath>, Config)> {
    let (path, config) = match find_config_path(config_path_opt) {
        Some(path) => {
            // Read from config file
            let toml = std::fs::read_to_string(path.to_path_buf())
                .with_context(|| format!("failed to read configuration {path}"))?;
            // Parse and return the configuration file
            let config =
                read_toml(&toml).with_context(|| format!("invalid configuration {path}"))?;
            (Some(path), config)
        }
        None => (None, Config::default()),
    };
    Ok((path, config))
}
