// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! One archival attempt for one URL: fetch, normalize, detect change and commit.
//!
//! Every attempt ends in exactly one [`ArchiveOutcome`]. Fetch problems are outcomes and never
//! reach the store; storage problems are returned as errors.

#[cfg(test)]
mod tests;

use crate::normalize::{Normalizer, Passthrough};
use crate::store::{
    self, ConditionalHeaders, FetchMetadata, PageId, VersionNumber, VersionRecord, VersionStore,
};
use crate::utils::encoding::fingerprint;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Upper bound on a single fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const HTTP_NOT_MODIFIED: u16 = 304;

/// What the fetch collaborator observed for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    /// Response body, absent on `304 Not Modified`.
    pub content: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub content_type: Option<String>,
    pub not_modified: bool,
}

impl FetchedPage {
    /// A `200 OK` HTML response carrying `content`.
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            status: 200,
            content: Some(content.into()),
            content_type: Some("text/html".into()),
            ..Default::default()
        }
    }

    pub fn not_modified() -> Self {
        Self {
            status: HTTP_NOT_MODIFIED,
            not_modified: true,
            ..Default::default()
        }
    }

    fn is_not_modified(&self) -> bool {
        self.not_modified || self.status == HTTP_NOT_MODIFIED
    }

    fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_none_or(|ty| ty.to_ascii_lowercase().contains("html"))
    }

    fn metadata(&self) -> FetchMetadata {
        FetchMetadata {
            http_status: self.status,
            etag: self.etag.clone(),
            last_modified: self.last_modified.clone(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("fetch timed out after {}", humantime::format_duration(*.0))]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("response has no content")]
    MissingContent,
}

/// Network side of an archival attempt.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, sending `conditional` as `If-None-Match`/`If-Modified-Since` when set.
    async fn fetch(
        &self,
        url: &str,
        conditional: &ConditionalHeaders,
    ) -> Result<FetchedPage, FetchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum UnchangedReason {
    /// The server answered `304 Not Modified`.
    Protocol,
    /// The normalized content hashes to the latest stored fingerprint.
    IdenticalContent,
}

#[derive(Debug)]
pub enum ArchiveOutcome {
    Unchanged {
        page_id: PageId,
        reason: UnchangedReason,
        /// Latest stored version, if any.
        version: Option<VersionNumber>,
    },
    Archived(VersionRecord),
    FetchFailed {
        page_id: PageId,
        error: FetchError,
    },
}

impl ArchiveOutcome {
    pub fn page_id(&self) -> PageId {
        match self {
            Self::Unchanged { page_id, .. } | Self::FetchFailed { page_id, .. } => *page_id,
            Self::Archived(record) => record.page_id,
        }
    }
}

pub struct Archiver {
    store: VersionStore,
    normalizer: Box<dyn Normalizer>,
    fetch_timeout: Duration,
}

impl Archiver {
    pub fn new(store: VersionStore) -> Self {
        Self::with_normalizer(store, Passthrough)
    }

    pub fn with_normalizer(store: VersionStore, normalizer: impl Normalizer + 'static) -> Self {
        Self {
            store,
            normalizer: Box::new(normalizer),
            fetch_timeout: FETCH_TIMEOUT,
        }
    }

    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    pub fn into_store(self) -> VersionStore {
        self.store
    }

    /// Fetches `url` with the validators of its latest version and records the result.
    pub async fn archive(&self, url: &str, fetcher: &dyn Fetcher) -> store::Result<ArchiveOutcome> {
        let page = self.store.get_or_create_page(url).await?;
        let conditional = self.store.conditional_headers(page).await?;
        debug!("fetching {url} (conditional: {})", !conditional.is_empty());
        let attempt = tokio::time::timeout(self.fetch_timeout, fetcher.fetch(url, &conditional))
            .await
            .unwrap_or(Err(FetchError::Timeout(self.fetch_timeout)));
        self.record_attempt(page, url, attempt).await
    }

    /// Records a fetch attempt that was performed elsewhere.
    pub async fn record(
        &self,
        url: &str,
        attempt: Result<FetchedPage, FetchError>,
    ) -> store::Result<ArchiveOutcome> {
        let page = self.store.get_or_create_page(url).await?;
        self.record_attempt(page, url, attempt).await
    }

    async fn record_attempt(
        &self,
        page: PageId,
        url: &str,
        attempt: Result<FetchedPage, FetchError>,
    ) -> store::Result<ArchiveOutcome> {
        let (fetched, content) = match attempt.and_then(accept) {
            Ok(Accepted::NotModified) => {
                let version = self.store.latest_version(page).await?;
                debug!("{url} not modified");
                return Ok(ArchiveOutcome::Unchanged {
                    page_id: page,
                    reason: UnchangedReason::Protocol,
                    version: version.map(|v| v.version_number),
                });
            }
            Ok(Accepted::Content(fetched, content)) => (fetched, content),
            Err(error) => {
                warn!("fetching {url} failed: {error}");
                return Ok(ArchiveOutcome::FetchFailed {
                    page_id: page,
                    error,
                });
            }
        };
        if !fetched.is_html() {
            warn!(
                "{url} has content type {}, archiving anyway",
                fetched.content_type.as_deref().unwrap_or_default()
            );
        }

        let normalized = self.normalizer.normalize(&content);
        let hash = fingerprint(normalized.as_bytes());
        if let Some(latest) = self.store.latest_version(page).await?
            && latest.content_hash == hash
        {
            debug!("{url} unchanged since version {}", latest.version_number);
            return Ok(ArchiveOutcome::Unchanged {
                page_id: page,
                reason: UnchangedReason::IdenticalContent,
                version: Some(latest.version_number),
            });
        }

        let record = self
            .store
            .commit_version(page, &normalized, &fetched.metadata())
            .await?;
        Ok(ArchiveOutcome::Archived(record))
    }
}

enum Accepted {
    NotModified,
    Content(FetchedPage, String),
}

fn accept(mut fetched: FetchedPage) -> Result<Accepted, FetchError> {
    if fetched.is_not_modified() {
        return Ok(Accepted::NotModified);
    }
    if !(200..300).contains(&fetched.status) {
        return Err(FetchError::Status(fetched.status));
    }
    let content = fetched.content.take().ok_or(FetchError::MissingContent)?;
    Ok(Accepted::Content(fetched, content))
}
