// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::archived_page;
use crate::store::VersionStore;
use clap::Args;
use human_repr::HumanCount as _;

#[derive(Debug, Args)]
pub struct HistoryCommand {
    /// URL of the archived page
    url: String,
}

impl HistoryCommand {
    pub async fn run(self, store: VersionStore) -> anyhow::Result<()> {
        let page = archived_page(&store, &self.url).await?;
        for info in store.history(page.id).await? {
            println!(
                "{:>5}  {}  {:<5}  {}  {}  {}",
                info.version_number,
                info.fetched_at.to_rfc3339(),
                info.kind,
                info.http_status,
                info.content_hash.short(),
                info.stored_size.human_count_bytes(),
            );
        }
        store.close().await;
        Ok(())
    }
}
