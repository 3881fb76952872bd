// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::store::VersionStore;
use clap::Args;

#[derive(Debug, Args)]
pub struct PagesCommand {
    /// Only list pages whose URL contains this text
    filter: Option<String>,
}

impl PagesCommand {
    pub async fn run(self, store: VersionStore) -> anyhow::Result<()> {
        let pages = store.pages().await?;
        for summary in pages.iter().filter(|summary| {
            self.filter
                .as_deref()
                .is_none_or(|filter| summary.page.url.contains(filter))
        }) {
            let last = summary
                .last_fetched_at
                .map(|at| at.to_rfc3339())
                .unwrap_or_else(|| "never".into());
            println!(
                "{}\t{}\tversions: {}\tlast archived: {last}",
                summary.page.id, summary.page.url, summary.versions
            );
        }
        store.close().await;
        Ok(())
    }
}
