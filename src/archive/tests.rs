// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::*;
use crate::store::{StorageKind, StoreConfig};
use std::collections::VecDeque;
use std::sync::Mutex;

const URL: &str = "https://example.com/";

/// Replays canned responses and remembers the validators it was handed.
#[derive(Default)]
struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<FetchedPage, FetchError>>>,
    seen: Mutex<Vec<ConditionalHeaders>>,
}

impl ScriptedFetcher {
    fn new(responses: impl IntoIterator<Item = Result<FetchedPage, FetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        _url: &str,
        conditional: &ConditionalHeaders,
    ) -> Result<FetchedPage, FetchError> {
        self.seen.lock().unwrap().push(conditional.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(FetchError::Transport("script exhausted".into())))
    }
}

struct StalledFetcher;

#[async_trait]
impl Fetcher for StalledFetcher {
    async fn fetch(&self, _: &str, _: &ConditionalHeaders) -> Result<FetchedPage, FetchError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(FetchedPage::ok("too late"))
    }
}

async fn archiver() -> Archiver {
    Archiver::new(
        VersionStore::open_in_memory(&StoreConfig::default())
            .await
            .unwrap(),
    )
}

fn version_of(outcome: &ArchiveOutcome) -> (VersionNumber, StorageKind) {
    match outcome {
        ArchiveOutcome::Archived(record) => (record.version_number, record.kind),
        other => panic!("expected a new version, got {other:?}"),
    }
}

#[tokio::test]
async fn test_archive_scenario() {
    let archiver = archiver().await;

    let first = archiver.record(URL, Ok(FetchedPage::ok("A"))).await.unwrap();
    assert_eq!(version_of(&first), (1, StorageKind::Base));
    let page = first.page_id();

    let second = archiver.record(URL, Ok(FetchedPage::ok("AB"))).await.unwrap();
    assert_eq!(version_of(&second), (2, StorageKind::Delta));
    assert_eq!(archiver.store().materialize_exact(page, 2).await.unwrap(), "AB");

    let third = archiver.record(URL, Ok(FetchedPage::ok("AB"))).await.unwrap();
    assert!(matches!(
        third,
        ArchiveOutcome::Unchanged {
            reason: UnchangedReason::IdenticalContent,
            version: Some(2),
            ..
        }
    ));

    let mut not_modified = FetchedPage::ok("entirely different");
    not_modified.status = 304;
    let fourth = archiver.record(URL, Ok(not_modified)).await.unwrap();
    assert!(matches!(
        fourth,
        ArchiveOutcome::Unchanged {
            reason: UnchangedReason::Protocol,
            version: Some(2),
            ..
        }
    ));
    assert_eq!(archiver.store().history(page).await.unwrap().len(), 2);

    let diff = archiver.store().diff_between(page, 1, 2).await.unwrap();
    assert!(diff.text().contains("+AB"));
}

#[tokio::test]
async fn test_not_modified_flag_wins_over_status() {
    let archiver = archiver().await;
    let fetched = FetchedPage {
        not_modified: true,
        ..FetchedPage::ok("<p>new</p>")
    };
    let outcome = archiver.record(URL, Ok(fetched)).await.unwrap();
    assert!(matches!(
        outcome,
        ArchiveOutcome::Unchanged {
            reason: UnchangedReason::Protocol,
            version: None,
            ..
        }
    ));
    let page = outcome.page_id();
    assert!(archiver.store().latest_version(page).await.unwrap().is_none());
}

#[tokio::test]
async fn test_fetch_failures_never_commit() {
    let archiver = archiver().await;
    let attempts = [
        Err(FetchError::Transport("connection reset".into())),
        Ok(FetchedPage {
            status: 500,
            ..FetchedPage::ok("<p>oops</p>")
        }),
        Ok(FetchedPage {
            status: 404,
            ..Default::default()
        }),
        Ok(FetchedPage {
            content: None,
            ..FetchedPage::ok("")
        }),
    ];
    let expected = [
        FetchError::Transport("connection reset".into()),
        FetchError::Status(500),
        FetchError::Status(404),
        FetchError::MissingContent,
    ];
    for (attempt, expected) in attempts.into_iter().zip(expected) {
        match archiver.record(URL, attempt).await.unwrap() {
            ArchiveOutcome::FetchFailed { error, page_id } => {
                assert_eq!(error, expected);
                assert!(archiver.store().history(page_id).await.unwrap().is_empty());
            }
            other => panic!("expected a fetch failure, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_conditional_headers_are_handed_back() {
    let archiver = archiver().await;
    let fetcher = ScriptedFetcher::new([
        Ok(FetchedPage {
            etag: Some("\"v1\"".into()),
            last_modified: Some("Mon, 01 Jan 2024 00:00:00 GMT".into()),
            ..FetchedPage::ok("<p>one</p>")
        }),
        Ok(FetchedPage::not_modified()),
    ]);

    let first = archiver.archive(URL, &fetcher).await.unwrap();
    assert_eq!(version_of(&first).0, 1);
    let second = archiver.archive(URL, &fetcher).await.unwrap();
    assert!(matches!(
        second,
        ArchiveOutcome::Unchanged {
            reason: UnchangedReason::Protocol,
            version: Some(1),
            ..
        }
    ));

    let seen = fetcher.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].is_empty());
    assert_eq!(seen[1].etag.as_deref(), Some("\"v1\""));
    assert_eq!(
        seen[1].last_modified.as_deref(),
        Some("Mon, 01 Jan 2024 00:00:00 GMT")
    );
}

#[tokio::test]
async fn test_fetch_timeout_is_a_failure() {
    let mut archiver = archiver().await;
    archiver.fetch_timeout = Duration::from_millis(20);
    let outcome = archiver.archive(URL, &StalledFetcher).await.unwrap();
    assert!(matches!(
        outcome,
        ArchiveOutcome::FetchFailed {
            error: FetchError::Timeout(_),
            ..
        }
    ));
    assert!(
        archiver
            .store()
            .latest_version(outcome.page_id())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_normalizer_runs_before_fingerprinting() {
    let store = VersionStore::open_in_memory(&StoreConfig::default())
        .await
        .unwrap();
    let strip_ads = |raw: &str| {
        raw.lines()
            .filter(|line| !line.contains("class=\"ad\""))
            .map(|line| format!("{line}\n"))
            .collect::<String>()
    };
    let archiver = Archiver::with_normalizer(store, strip_ads);

    let first = archiver
        .record(URL, Ok(FetchedPage::ok("<p>news</p>\n<div class=\"ad\">buy</div>\n")))
        .await
        .unwrap();
    let page = first.page_id();
    let second = archiver
        .record(URL, Ok(FetchedPage::ok("<p>news</p>\n<div class=\"ad\">sell</div>\n")))
        .await
        .unwrap();
    assert!(matches!(
        second,
        ArchiveOutcome::Unchanged {
            reason: UnchangedReason::IdenticalContent,
            ..
        }
    ));
    assert_eq!(
        archiver.store().materialize_exact(page, 1).await.unwrap(),
        "<p>news</p>\n"
    );
}

#[tokio::test]
async fn test_non_html_content_is_archived() {
    let archiver = archiver().await;
    let fetched = FetchedPage {
        content_type: Some("application/json".into()),
        ..FetchedPage::ok("{\"a\": 1}")
    };
    let outcome = archiver.record(URL, Ok(fetched)).await.unwrap();
    assert_eq!(version_of(&outcome), (1, StorageKind::Base));
}

#[test]
fn test_timeout_message() {
    assert_eq!(
        FetchError::Timeout(FETCH_TIMEOUT).to_string(),
        "fetch timed out after 30s"
    );
    assert_eq!(UnchangedReason::IdenticalContent.to_string(), "identical_content");
}
