// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::archived_page;
use crate::store::{VersionNumber, VersionStore};
use clap::Args;
use tracing::warn;

#[derive(Debug, Args)]
pub struct DiffCommand {
    /// URL of the archived page
    url: String,
    /// Older version
    from: VersionNumber,
    /// Newer version
    to: VersionNumber,
}

impl DiffCommand {
    pub async fn run(self, store: VersionStore) -> anyhow::Result<()> {
        let page = archived_page(&store, &self.url).await?;
        let diff = store.diff_between(page.id, self.from, self.to).await?;
        if diff.degraded {
            warn!("diff involves a degraded reconstruction and may be inaccurate");
        }
        print!("{diff}");
        store.close().await;
        Ok(())
    }
}
