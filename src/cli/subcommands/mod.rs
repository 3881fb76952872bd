// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod archive_cmd;
mod config_cmd;
mod diff_cmd;
mod history_cmd;
mod pages_cmd;
mod rebase_cmd;
mod show_cmd;

pub(super) use self::{
    archive_cmd::ArchiveCommand, config_cmd::ConfigCommands, diff_cmd::DiffCommand,
    history_cmd::HistoryCommand, pages_cmd::PagesCommand, rebase_cmd::RebaseCommand,
    show_cmd::ShowCommand,
};
use crate::cli_shared::cli::CliOpts;
use crate::store::{Page, VersionStore};
use clap::Parser;

/// CLI structure generated when interacting with the `page-archive` binary
#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"), bin_name = "page-archive", author = env!("CARGO_PKG_AUTHORS"), version = env!("CARGO_PKG_VERSION"), about = env!("CARGO_PKG_DESCRIPTION")
)]
pub struct Cli {
    #[command(flatten)]
    pub opts: CliOpts,
    #[command(subcommand)]
    pub cmd: Subcommand,
}

/// `page-archive` sub-commands available.
#[derive(clap::Subcommand, Debug)]
pub enum Subcommand {
    /// Record a fetched snapshot of a page
    Archive(ArchiveCommand),

    /// List archived pages
    Pages(PagesCommand),

    /// List the versions of a page, newest first
    History(HistoryCommand),

    /// Print the content of one version of a page
    Show(ShowCommand),

    /// Print a unified diff between two versions of a page
    Diff(DiffCommand),

    /// Store a version as a full snapshot so later reconstructions start there
    Rebase(RebaseCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Looks up the page archived under `url`.
async fn archived_page(store: &VersionStore, url: &str) -> anyhow::Result<Page> {
    store
        .page_by_url(url)
        .await?
        .ok_or_else(|| anyhow::anyhow!("{url} is not archived"))
}
