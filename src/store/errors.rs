// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{PageId, VersionNumber};
use thiserror::Error;

/// Version store error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("failed to compress version payload: {0}")]
    Compression(#[source] std::io::Error),

    /// Data written by the store can no longer be read back. Reconstruction of the page must
    /// not continue past this point.
    #[error("corrupt storage for page {page} version {version}: {reason}")]
    CorruptStorage {
        page: PageId,
        version: VersionNumber,
        reason: String,
    },

    #[error("page {0} is not archived")]
    UnknownPage(PageId),

    #[error("page {page} has no version {version} (latest is {latest})")]
    UnknownVersion {
        page: PageId,
        version: VersionNumber,
        latest: VersionNumber,
    },

    #[error("version {version} of page {page} was reconstructed with {failed} unapplied hunk(s)")]
    DegradedReconstruction {
        page: PageId,
        version: VersionNumber,
        failed: usize,
    },
}

impl Error {
    pub(super) fn corrupt(page: PageId, version: VersionNumber, reason: impl Into<String>) -> Self {
        Error::CorruptStorage {
            page,
            version,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
