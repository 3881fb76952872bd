// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! The version store: a SQLite ledger of archived pages and their version chains.
//!
//! Version 1 of every page holds the full compressed snapshot. Every later version holds a
//! compressed [`Patch`] against the reconstructed content of the version just before it, so
//! materializing version `N` replays the chain from its base.

mod errors;
mod reconstruct;
mod schema;

pub use errors::{Error, Result};
pub use reconstruct::{FailedHunk, Reconstruction, UnifiedDiff};

use crate::patch::{DEFAULT_CONTEXT_LINES, Patch};
use crate::utils::compression::{Codec, DEFAULT_COMPRESSION_LEVEL};
use crate::utils::encoding::{Fingerprint, fingerprint};
use crate::utils::sqlite;
use anyhow::Context as _;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use std::{fmt, path::PathBuf};
use tracing::{info, warn};

pub const DB_FILE_NAME: &str = "archive.db";

pub type VersionNumber = u32;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct PageId(i64);

impl PageId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the SQLite database file.
    pub database: PathBuf,
    pub compression_level: i32,
    /// Unchanged lines kept around every change in stored patches.
    pub patch_context_lines: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let database = ProjectDirs::from("org", "page-archive", "page-archive")
            .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME));
        Self {
            database,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            patch_context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Page {
    pub id: PageId,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PageSummary {
    #[sqlx(flatten)]
    pub page: Page,
    pub versions: u32,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

/// Fields copied from the fetch that produced a version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchMetadata {
    pub http_status: u16,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

/// Validators of the latest version, handed back to the fetcher for a conditional request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalHeaders {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

impl ConditionalHeaders {
    pub fn is_empty(&self) -> bool {
        self.etag.is_none() && self.last_modified.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSummary {
    pub version_number: VersionNumber,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub content_hash: Fingerprint,
}

impl From<&VersionSummary> for ConditionalHeaders {
    fn from(summary: &VersionSummary) -> Self {
        Self {
            etag: summary.etag.clone(),
            last_modified: summary.last_modified.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum StorageKind {
    /// Full compressed snapshot.
    Base,
    /// Compressed patch against the previous version.
    Delta,
}

impl StorageKind {
    fn from_is_base(is_base: bool) -> Self {
        if is_base { Self::Base } else { Self::Delta }
    }
}

/// A freshly committed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub page_id: PageId,
    pub version_number: VersionNumber,
    pub kind: StorageKind,
    pub content_hash: Fingerprint,
    /// Size of the uncompressed content in bytes.
    pub content_size: usize,
    /// Size of the stored blob in bytes.
    pub stored_size: usize,
    pub fetched_at: DateTime<Utc>,
}

/// One row of a page's history listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub version_number: VersionNumber,
    pub kind: StorageKind,
    pub http_status: u16,
    pub fetched_at: DateTime<Utc>,
    pub content_hash: Fingerprint,
    pub stored_size: usize,
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    version_number: VersionNumber,
    etag: Option<String>,
    last_modified: Option<String>,
    content_hash: String,
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    version_number: VersionNumber,
    is_base: bool,
    http_status: u16,
    fetched_at: DateTime<Utc>,
    content_hash: String,
    stored_size: i64,
}

fn parse_hash(page: PageId, version: VersionNumber, hash: &str) -> Result<Fingerprint> {
    hash.parse()
        .map_err(|e| Error::corrupt(page, version, format!("invalid content hash {hash:?}: {e}")))
}

/// Takes the database write lock for the rest of the transaction, so that the chain head read
/// afterwards cannot change before commit.
async fn lock_page(conn: &mut SqliteConnection, page: PageId) -> Result<()> {
    let touched = sqlx::query("UPDATE pages SET url = url WHERE id = ?")
        .bind(page)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    if touched == 0 {
        return Err(Error::UnknownPage(page));
    }
    Ok(())
}

pub struct VersionStore {
    pool: SqlitePool,
    codec: Codec,
    context_lines: usize,
}

impl VersionStore {
    /// Opens (or creates) the database file named in `config`.
    pub async fn open(config: &StoreConfig) -> anyhow::Result<Self> {
        let pool = sqlite::open_file(&config.database)
            .await
            .with_context(|| format!("failed to open {}", config.database.display()))?;
        Self::with_pool(pool, config).await
    }

    /// Opens a store that lives only as long as the returned value.
    pub async fn open_in_memory(config: &StoreConfig) -> anyhow::Result<Self> {
        Self::with_pool(sqlite::open_memory().await?, config).await
    }

    pub async fn with_pool(pool: SqlitePool, config: &StoreConfig) -> anyhow::Result<Self> {
        sqlite::init_db(&pool, schema::DB_NAME, schema::ddls(), schema::migrations()).await?;
        Ok(Self {
            pool,
            codec: Codec::new(config.compression_level),
            context_lines: config.patch_context_lines,
        })
    }

    pub async fn close(self) {
        self.pool.close().await
    }

    /// Returns the id of the page registered for `url`, registering it if needed.
    pub async fn get_or_create_page(&self, url: &str) -> Result<PageId> {
        sqlx::query("INSERT INTO pages (url, created_at) VALUES (?, ?) ON CONFLICT (url) DO NOTHING")
            .bind(url)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(sqlx::query_scalar("SELECT id FROM pages WHERE url = ?")
            .bind(url)
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn page(&self, page: PageId) -> Result<Option<Page>> {
        Ok(
            sqlx::query_as("SELECT id, url, created_at FROM pages WHERE id = ?")
                .bind(page)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn page_by_url(&self, url: &str) -> Result<Option<Page>> {
        Ok(
            sqlx::query_as("SELECT id, url, created_at FROM pages WHERE url = ?")
                .bind(url)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Every registered page with its version count, ordered by URL.
    pub async fn pages(&self) -> Result<Vec<PageSummary>> {
        Ok(sqlx::query_as(
            "SELECT p.id, p.url, p.created_at,
                    COUNT(v.id) AS versions,
                    MAX(v.fetched_at) AS last_fetched_at
             FROM pages p LEFT JOIN versions v ON v.page_id = p.id
             GROUP BY p.id
             ORDER BY p.url",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn latest_version(&self, page: PageId) -> Result<Option<VersionSummary>> {
        let row: Option<SummaryRow> = sqlx::query_as(
            "SELECT version_number, etag, last_modified, content_hash FROM versions
             WHERE page_id = ? ORDER BY version_number DESC LIMIT 1",
        )
        .bind(page)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|row| -> Result<VersionSummary> {
            Ok(VersionSummary {
                content_hash: parse_hash(page, row.version_number, &row.content_hash)?,
                version_number: row.version_number,
                etag: row.etag,
                last_modified: row.last_modified,
            })
        })
        .transpose()
    }

    pub async fn conditional_headers(&self, page: PageId) -> Result<ConditionalHeaders> {
        Ok(self
            .latest_version(page)
            .await?
            .as_ref()
            .map(ConditionalHeaders::from)
            .unwrap_or_default())
    }

    /// Appends `content` as the next version of `page`.
    ///
    /// The chain head is read, the payload computed and the row inserted inside one
    /// transaction that holds the database write lock throughout, so concurrent commits to
    /// the same page are serialized and a failure leaves no partial row behind.
    pub async fn commit_version(
        &self,
        page: PageId,
        content: &str,
        metadata: &FetchMetadata,
    ) -> Result<VersionRecord> {
        let mut tx = self.pool.begin().await?;
        lock_page(tx.as_mut(), page).await?;

        let previous = reconstruct::latest_number(tx.as_mut(), page).await?;
        let version_number = previous.map_or(1, |n| n + 1);
        let (kind, payload) = match previous {
            None => (StorageKind::Base, content.as_bytes().to_vec()),
            Some(previous) => {
                let prior = reconstruct::replay(tx.as_mut(), &self.codec, page, previous).await?;
                if prior.is_degraded() {
                    warn!(
                        "version {previous} of page {page} is degraded, storing version {version_number} as a full snapshot"
                    );
                    (StorageKind::Base, content.as_bytes().to_vec())
                } else {
                    let patch = Patch::diff(&prior.content, content, self.context_lines);
                    let bytes = patch
                        .to_bytes()
                        .map_err(|e| Error::Compression(std::io::Error::other(e)))?;
                    (StorageKind::Delta, bytes)
                }
            }
        };
        let blob = self.codec.encode(&payload).map_err(Error::Compression)?;
        let content_hash = fingerprint(content.as_bytes());
        let fetched_at = Utc::now();

        sqlx::query(
            "INSERT INTO versions
             (page_id, version_number, is_base, content, content_hash, etag, last_modified, http_status, fetched_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(page)
        .bind(version_number)
        .bind(kind == StorageKind::Base)
        .bind(&blob)
        .bind(content_hash.to_string())
        .bind(&metadata.etag)
        .bind(&metadata.last_modified)
        .bind(metadata.http_status)
        .bind(fetched_at)
        .execute(tx.as_mut())
        .await?;
        tx.commit().await?;

        info!(
            "archived page {page} version {version_number} as {kind} ({} -> {} bytes)",
            content.len(),
            blob.len()
        );
        Ok(VersionRecord {
            page_id: page,
            version_number,
            kind,
            content_hash,
            content_size: content.len(),
            stored_size: blob.len(),
            fetched_at,
        })
    }

    /// Version summaries of `page`, newest first.
    pub async fn history(&self, page: PageId) -> Result<Vec<VersionInfo>> {
        let rows: Vec<HistoryRow> = sqlx::query_as(
            "SELECT version_number, is_base, http_status, fetched_at, content_hash,
                    LENGTH(content) AS stored_size
             FROM versions WHERE page_id = ? ORDER BY version_number DESC",
        )
        .bind(page)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| -> Result<VersionInfo> {
                Ok(VersionInfo {
                    content_hash: parse_hash(page, row.version_number, &row.content_hash)?,
                    version_number: row.version_number,
                    kind: StorageKind::from_is_base(row.is_base),
                    http_status: row.http_status,
                    fetched_at: row.fetched_at,
                    stored_size: usize::try_from(row.stored_size).unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Reconstructs `version` of `page`. Degraded results are returned, tagged as such.
    pub async fn materialize(
        &self,
        page: PageId,
        version: VersionNumber,
    ) -> Result<Reconstruction> {
        let mut conn = self.pool.acquire().await?;
        reconstruct::replay(&mut conn, &self.codec, page, version).await
    }

    /// Reconstructs `version` of `page`, failing if any hunk did not apply.
    pub async fn materialize_exact(&self, page: PageId, version: VersionNumber) -> Result<String> {
        self.materialize(page, version).await?.into_exact()
    }

    /// Unified diff from version `from` to version `to`. Has no effect on storage.
    pub async fn diff_between(
        &self,
        page: PageId,
        from: VersionNumber,
        to: VersionNumber,
    ) -> Result<UnifiedDiff> {
        let mut conn = self.pool.acquire().await?;
        let old = reconstruct::replay(&mut conn, &self.codec, page, from).await?;
        let new = reconstruct::replay(&mut conn, &self.codec, page, to).await?;
        Ok(UnifiedDiff::between(&old, &new, self.context_lines))
    }

    /// Rewrites the stored blob of `version` as a full snapshot, so that reconstructing it and
    /// every later version starts there instead of at version 1.
    ///
    /// Content, fingerprints and numbering are unchanged. Returns `false` if the version was
    /// already a base.
    pub async fn rebase(&self, page: PageId, version: VersionNumber) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        lock_page(tx.as_mut(), page).await?;

        let row: Option<(bool, String)> = sqlx::query_as(
            "SELECT is_base, content_hash FROM versions WHERE page_id = ? AND version_number = ?",
        )
        .bind(page)
        .bind(version)
        .fetch_optional(tx.as_mut())
        .await?;
        let Some((is_base, content_hash)) = row else {
            let latest = reconstruct::latest_number(tx.as_mut(), page)
                .await?
                .unwrap_or(0);
            return Err(Error::UnknownVersion {
                page,
                version,
                latest,
            });
        };
        if is_base {
            return Ok(false);
        }

        let content = reconstruct::replay(tx.as_mut(), &self.codec, page, version)
            .await?
            .into_exact()?;
        if fingerprint(content.as_bytes()) != parse_hash(page, version, &content_hash)? {
            return Err(Error::corrupt(
                page,
                version,
                "reconstructed content does not match its fingerprint",
            ));
        }
        let blob = self
            .codec
            .encode(content.as_bytes())
            .map_err(Error::Compression)?;
        sqlx::query(
            "UPDATE versions SET is_base = 1, content = ? WHERE page_id = ? AND version_number = ?",
        )
        .bind(&blob)
        .bind(page)
        .bind(version)
        .execute(tx.as_mut())
        .await?;
        tx.commit().await?;

        info!("rebased page {page} at version {version}");
        Ok(true)
    }
}
