// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Replays a page's patch chain to materialize a historical version.

use super::{Error, PageId, Result, VersionNumber};
use crate::patch::Patch;
use crate::utils::compression::Codec;
use similar::TextDiff;
use sqlx::SqliteConnection;
use std::fmt;
use tracing::{debug, warn};

/// A patch hunk that could not be placed while replaying the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedHunk {
    pub version: VersionNumber,
    pub hunk: usize,
}

/// Materialized content of one version.
///
/// A reconstruction with failed hunks is *degraded*: its content is a best-effort result and
/// may differ from what was archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstruction {
    pub page_id: PageId,
    pub version_number: VersionNumber,
    pub content: String,
    pub failed_hunks: Vec<FailedHunk>,
}

impl Reconstruction {
    pub fn is_degraded(&self) -> bool {
        !self.failed_hunks.is_empty()
    }

    /// Returns the content, refusing degraded reconstructions.
    pub fn into_exact(self) -> Result<String> {
        if self.is_degraded() {
            return Err(Error::DegradedReconstruction {
                page: self.page_id,
                version: self.version_number,
                failed: self.failed_hunks.len(),
            });
        }
        Ok(self.content)
    }
}

/// Line-oriented unified diff between two materialized versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedDiff {
    pub from: VersionNumber,
    pub to: VersionNumber,
    /// Set when either side came from a degraded reconstruction.
    pub degraded: bool,
    text: String,
}

impl UnifiedDiff {
    pub(super) fn between(old: &Reconstruction, new: &Reconstruction, context: usize) -> Self {
        let text = TextDiff::from_lines(&old.content, &new.content)
            .unified_diff()
            .context_radius(context)
            .header(
                &format!("Version {}", old.version_number),
                &format!("Version {}", new.version_number),
            )
            .to_string();
        Self {
            from: old.version_number,
            to: new.version_number,
            degraded: old.is_degraded() || new.is_degraded(),
            text,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when both versions have identical content.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for UnifiedDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(sqlx::FromRow)]
struct ChainLink {
    version_number: VersionNumber,
    is_base: bool,
    content: Vec<u8>,
}

pub(super) async fn latest_number(
    conn: &mut SqliteConnection,
    page: PageId,
) -> Result<Option<VersionNumber>> {
    Ok(
        sqlx::query_scalar("SELECT MAX(version_number) FROM versions WHERE page_id = ?")
            .bind(page)
            .fetch_one(&mut *conn)
            .await?,
    )
}

/// Materializes `target` by starting from the closest base at or below it and applying every
/// later patch in order.
pub(super) async fn replay(
    conn: &mut SqliteConnection,
    codec: &Codec,
    page: PageId,
    target: VersionNumber,
) -> Result<Reconstruction> {
    let latest = latest_number(conn, page).await?.unwrap_or(0);
    if target == 0 || target > latest {
        return Err(Error::UnknownVersion {
            page,
            version: target,
            latest,
        });
    }

    let base: Option<VersionNumber> = sqlx::query_scalar(
        "SELECT MAX(version_number) FROM versions WHERE page_id = ? AND is_base = 1 AND version_number <= ?",
    )
    .bind(page)
    .bind(target)
    .fetch_one(&mut *conn)
    .await?;
    let base = base.ok_or_else(|| Error::corrupt(page, target, "chain has no base version"))?;

    let links: Vec<ChainLink> = sqlx::query_as(
        "SELECT version_number, is_base, content FROM versions
         WHERE page_id = ? AND version_number >= ? AND version_number <= ?
         ORDER BY version_number ASC",
    )
    .bind(page)
    .bind(base)
    .bind(target)
    .fetch_all(&mut *conn)
    .await?;
    debug!(
        "replaying page {page} from base {base} to version {target} ({} links)",
        links.len()
    );

    let mut content = String::new();
    let mut failed_hunks = vec![];
    let mut expected = base;
    for link in links {
        let version = link.version_number;
        if version != expected {
            return Err(Error::corrupt(page, expected, "version missing from chain"));
        }
        let payload = codec
            .decode(&link.content)
            .map_err(|e| Error::corrupt(page, version, format!("undecodable payload: {e}")))?;
        if link.is_base {
            content = String::from_utf8(payload)
                .map_err(|e| Error::corrupt(page, version, format!("invalid snapshot: {e}")))?;
        } else {
            let patch = Patch::from_bytes(&payload)
                .map_err(|e| Error::corrupt(page, version, format!("invalid patch: {e}")))?;
            let applied = patch.apply(&content);
            if !applied.is_clean() {
                warn!(
                    "{} of {} hunks failed to apply for page {page} version {version}",
                    applied.failed().count(),
                    applied.hunks.len()
                );
            }
            failed_hunks.extend(applied.failed().map(|hunk| FailedHunk { version, hunk }));
            content = applied.text;
        }
        expected += 1;
    }
    if expected <= target {
        return Err(Error::corrupt(page, expected, "version missing from chain"));
    }

    Ok(Reconstruction {
        page_id: page,
        version_number: target,
        content,
        failed_hunks,
    })
}
