// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::archived_page;
use crate::store::{VersionNumber, VersionStore};
use clap::Args;
use std::io::Write as _;
use tracing::warn;

#[derive(Debug, Args)]
pub struct ShowCommand {
    /// URL of the archived page
    url: String,
    /// Version to print, defaults to the latest
    #[arg(short, long)]
    version: Option<VersionNumber>,
    /// Fail instead of printing a best-effort reconstruction
    #[arg(long)]
    exact: bool,
}

impl ShowCommand {
    pub async fn run(self, store: VersionStore) -> anyhow::Result<()> {
        let page = archived_page(&store, &self.url).await?;
        let version = match self.version {
            Some(version) => version,
            None => store
                .latest_version(page.id)
                .await?
                .map(|latest| latest.version_number)
                .ok_or_else(|| anyhow::anyhow!("{} has no archived versions", self.url))?,
        };
        let content = if self.exact {
            store.materialize_exact(page.id, version).await?
        } else {
            let reconstruction = store.materialize(page.id, version).await?;
            if reconstruction.is_degraded() {
                warn!(
                    "version {version} of {} is degraded: {} hunk(s) failed to apply",
                    self.url,
                    reconstruction.failed_hunks.len()
                );
            }
            reconstruction.content
        };
        store.close().await;

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}
