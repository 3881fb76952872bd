// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Delta-compressed archive of successive snapshots of web pages.
//!
//! The first version of a page is stored as a full compressed snapshot and every later one
//! as a compressed line patch against its predecessor. Any version can be reconstructed by
//! replaying the chain.

mod archive;
mod cli;
mod cli_shared;
mod normalize;
mod patch;
mod store;
mod utils;

pub use archive::{
    ArchiveOutcome, Archiver, FETCH_TIMEOUT, FetchError, FetchedPage, Fetcher, UnchangedReason,
};
pub use cli::main::main as page_archive_main;
pub use cli_shared::cli::{Config, LogConfig};
pub use normalize::{Normalizer, Passthrough};
pub use patch::{Applied, Edit, Hunk, Patch};
pub use store::{
    ConditionalHeaders, Error, FailedHunk, FetchMetadata, Page, PageId, PageSummary,
    Reconstruction, StorageKind, StoreConfig, UnifiedDiff, VersionInfo, VersionNumber,
    VersionRecord, VersionStore, VersionSummary,
};
pub use utils::compression::Codec;
pub use utils::encoding::{Fingerprint, fingerprint};
pub use utils::io::read_toml;
