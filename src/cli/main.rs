// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::ffi::OsString;

use crate::cli_shared::{logger, read_config};
use crate::store::{StoreConfig, VersionStore};
use anyhow::Context as _;
use clap::Parser;
use tracing::info;

use super::subcommands::{Cli, Subcommand};

pub async fn main<ArgT>(args: impl IntoIterator<Item = ArgT>) -> anyhow::Result<()>
where
    ArgT: Into<OsString> + Clone,
{
    // Capture Cli inputs
    let Cli { opts, cmd } = Cli::parse_from(args);

    let (path, config) = read_config(opts.config.as_ref())?;
    let config = opts.to_config(config);
    logger::setup_logger(&config.log, &opts.color);
    if let Some(path) = &path {
        info!("using configuration {path}");
    }

    // Run command
    match cmd {
        Subcommand::Archive(cmd) => cmd.run(open_store(&config.store).await?).await,
        Subcommand::Pages(cmd) => cmd.run(open_store(&config.store).await?).await,
        Subcommand::History(cmd) => cmd.run(open_store(&config.store).await?).await,
        Subcommand::Show(cmd) => cmd.run(open_store(&config.store).await?).await,
        Subcommand::Diff(cmd) => cmd.run(open_store(&config.store).await?).await,
        Subcommand::Rebase(cmd) => cmd.run(open_store(&config.store).await?).await,
        Subcommand::Config(cmd) => cmd.run(&config, &mut std::io::stdout()),
    }
}

async fn open_store(config: &StoreConfig) -> anyhow::Result<VersionStore> {
    VersionStore::open(config)
        .await
        .with_context(|| format!("failed to open archive {}", config.database.display()))
}
