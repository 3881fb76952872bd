// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::PathBuf;

use crate::archive::{ArchiveOutcome, Archiver, FetchedPage};
use crate::store::VersionStore;
use crate::utils::io::read_text_input;
use clap::Args;
use human_repr::HumanCount as _;

#[derive(Debug, Args)]
pub struct ArchiveCommand {
    /// URL the snapshot was fetched from
    url: String,
    /// File holding the fetched content, `-` for standard input
    #[arg(short, long, default_value = "-")]
    file: PathBuf,
    /// HTTP status of the response
    #[arg(long, default_value_t = 200)]
    status: u16,
    /// `ETag` header of the response
    #[arg(long)]
    etag: Option<String>,
    /// `Last-Modified` header of the response
    #[arg(long)]
    last_modified: Option<String>,
    /// `Content-Type` header of the response
    #[arg(long, default_value = "text/html")]
    content_type: String,
    /// The server answered `304 Not Modified`; no content is read
    #[arg(long)]
    not_modified: bool,
}

impl ArchiveCommand {
    pub async fn run(self, store: VersionStore) -> anyhow::Result<()> {
        let content = if self.not_modified {
            None
        } else {
            Some(read_text_input(&self.file)?)
        };
        let fetched = FetchedPage {
            status: self.status,
            content,
            etag: self.etag,
            last_modified: self.last_modified,
            content_type: Some(self.content_type),
            not_modified: self.not_modified,
        };

        let archiver = Archiver::new(store);
        let outcome = archiver.record(&self.url, Ok(fetched)).await;
        archiver.into_store().close().await;
        match outcome? {
            ArchiveOutcome::Archived(record) => println!(
                "Archived {} as version {} ({}, {} stored as {})",
                self.url,
                record.version_number,
                record.kind,
                record.content_size.human_count_bytes(),
                record.stored_size.human_count_bytes(),
            ),
            ArchiveOutcome::Unchanged {
                reason, version, ..
            } => match version {
                Some(version) => {
                    println!("Unchanged ({reason}), latest version is {version}")
                }
                None => println!("Unchanged ({reason}), no version archived yet"),
            },
            ArchiveOutcome::FetchFailed { error, .. } => anyhow::bail!("fetch failed: {error}"),
        }
        Ok(())
    }
}
