// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::utils::sqlite::SqliteQuery;

pub const DB_NAME: &str = "archive";

pub fn ddls() -> Vec<SqliteQuery<'static>> {
    vec![
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS pages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT UNIQUE NOT NULL,
                created_at TIMESTAMP NOT NULL
            )"#,
        ),
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS versions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                page_id INTEGER NOT NULL REFERENCES pages(id),
                version_number INTEGER NOT NULL CHECK (version_number > 0),
                is_base BOOLEAN NOT NULL DEFAULT 0,
                content BLOB NOT NULL,
                content_hash TEXT NOT NULL,
                etag TEXT,
                last_modified TEXT,
                http_status INTEGER NOT NULL,
                fetched_at TIMESTAMP NOT NULL,
                UNIQUE (page_id, version_number)
            )"#,
        ),
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_page_versions ON versions (page_id, version_number DESC)",
        ),
    ]
}

/// Schema migrations, oldest first. Entry `i` upgrades the schema from version `i + 1`.
pub fn migrations() -> Vec<SqliteQuery<'static>> {
    vec![]
}
