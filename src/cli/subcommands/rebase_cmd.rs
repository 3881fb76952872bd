// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::archived_page;
use crate::store::{VersionNumber, VersionStore};
use clap::Args;

#[derive(Debug, Args)]
pub struct RebaseCommand {
    /// URL of the archived page
    url: String,
    /// Version to store as a full snapshot
    version: VersionNumber,
}

impl RebaseCommand {
    pub async fn run(self, store: VersionStore) -> anyhow::Result<()> {
        let page = archived_page(&store, &self.url).await?;
        if store.rebase(page.id, self.version).await? {
            println!("Version {} of {} is now a base", self.version, self.url);
        } else {
            println!("Version {} of {} is already a base", self.version, self.url);
        }
        store.close().await;
        Ok(())
    }
}
