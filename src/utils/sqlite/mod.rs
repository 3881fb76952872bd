// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//!
//! Connection and schema management for the SQLite-backed archive ledger.
//!


use anyhow::Context as _;
use sqlx::{
    SqlitePool,
    query::Query,
    sqlite::{
        SqliteArguments, SqliteAutoVacuum, SqliteConnectOptions, SqliteJournalMode,
        SqlitePoolOptions, SqliteSynchronous,
    },
};
use std::{cmp::Ordering, path::Path, time::Instant};

pub type SqliteQuery<'q> = Query<'q, sqlx::Sqlite, SqliteArguments<'q>>;

/// Opens or creates a database at the specified path
pub async fn open_file(file: &Path) -> anyhow::Result<SqlitePool> {
    if let Some(dir) = file.parent()
        && !dir.as_os_str().is_empty()
        && !dir.is_dir()
    {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create database directory {}", dir.display()))?;
    }
    let options = SqliteConnectOptions::new()
        .filename(file)
        .create_if_missing(true);
    Ok(open(options).await?)
}

/// Opens a private in-memory database.
///
/// The pool is pinned to a single connection that is never recycled, since every new
/// in-memory connection would otherwise see its own empty database.
pub async fn open_memory() -> sqlx::Result<SqlitePool> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(tune(SqliteConnectOptions::new().in_memory(true)))
        .await
}

/// Opens a database with the given options. If the database does not exist, it will be created.
pub async fn open(options: SqliteConnectOptions) -> sqlx::Result<SqlitePool> {
    SqlitePool::connect_with(tune(options)).await
}

fn tune(options: SqliteConnectOptions) -> SqliteConnectOptions {
    options
        .synchronous(SqliteSynchronous::Normal)
        .pragma("temp_store", "memory")
        .auto_vacuum(SqliteAutoVacuum::None)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .read_only(false)
}

/// This function initializes the database by checking whether it needs to be created or upgraded.
/// The `ddls` are the `DDL`(Data Definition Language) statements to create the tables in the database and their initial required
/// content. The schema version will be set inside the database if it is newly created. Otherwise, the
/// version is read from the database and any migration newer than it is applied in order.
/// It is up to the caller to close the database if an error is returned by this function.
pub async fn init_db<'q>(
    db: &SqlitePool,
    name: &str,
    ddls: impl IntoIterator<Item = SqliteQuery<'q>>,
    version_migrations: Vec<SqliteQuery<'q>>,
) -> anyhow::Result<()> {
    let schema_version = version_migrations.len() + 1;

    let init = async |db: &SqlitePool, schema_version| {
        let mut tx = db.begin().await?;
        sqlx::query("CREATE TABLE IF NOT EXISTS _meta (version UINT64 NOT NULL UNIQUE)")
            .execute(tx.as_mut())
            .await?;
        for i in 1..=schema_version {
            sqlx::query("INSERT OR IGNORE INTO _meta (version) VALUES (?)")
                .bind(i as i64)
                .execute(tx.as_mut())
                .await?;
        }
        for ddl in ddls.into_iter() {
            ddl.execute(tx.as_mut()).await?;
        }
        tx.commit().await
    };

    if sqlx::query("SELECT name FROM sqlite_master WHERE type='table' AND name='_meta';")
        .fetch_optional(db)
        .await
        .map_err(|e| anyhow::anyhow!("error looking for {name} database _meta table: {e}"))?
        .is_none()
    {
        init(db, schema_version).await?;
    }

    let found_version: i64 = sqlx::query_scalar("SELECT max(version) FROM _meta")
        .fetch_optional(db)
        .await?
        .with_context(|| format!("invalid {name} database version: no version found"))?;
    anyhow::ensure!(found_version > 0, "schema version should be 1 based");

    match found_version.cmp(&(schema_version as i64)) {
        Ordering::Greater => {
            anyhow::bail!(
                "invalid {name} database version: version {found_version} is greater than the number of migrations {schema_version}"
            );
        }
        Ordering::Equal | Ordering::Less => {}
    }

    // versions start at 1, but the migrations are 0-indexed where the first migration would take us to version 2
    for (from_version, to_version, migration) in version_migrations
        .into_iter()
        .enumerate()
        .map(|(i, m)| (i + 1, i + 2, m))
        .skip(found_version as usize - 1)
    {
        tracing::info!("Migrating {name} database to version {to_version}");
        let now = Instant::now();
        let mut tx = db.begin().await?;
        migration.execute(tx.as_mut()).await?;
        sqlx::query("INSERT OR IGNORE INTO _meta (version) VALUES (?)")
            .bind(to_version as i64)
            .execute(tx.as_mut())
            .await?;
        tx.commit().await?;
        tracing::info!(
            "Successfully migrated {name} database from version {from_version} to {to_version} in {}",
            humantime::format_duration(now.elapsed())
        );
    }

    Ok(())
}
