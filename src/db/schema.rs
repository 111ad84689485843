use std::collections::HashSet;

use anyhow::{Context, Result};
use rusqlite::Connection;

struct Migration {
    version: &'static str,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "001",
        name: "initial",
        sql: include_str!("migrations/001_initial.sql"),
    },
    Migration {
        version: "002",
        name: "task_category",
        sql: include_str!("migrations/002_task_category.sql"),
    },
];

/// Brings `conn` up to the latest schema.
///
/// Each migration and its `schema_migrations` row commit together, so a
/// failed step leaves neither behind and is retried on the next start.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .context("Failed to create schema_migrations table")?;

    // The first app release created the tables without tracking rows.
    if is_untracked_legacy_db(conn)? {
        record(conn, &MIGRATIONS[0])?;
        tracing::info!("Detected existing database, marked migration 001 as applied");
    }

    let applied = applied_versions(conn)?;
    let pending = MIGRATIONS
        .iter()
        .filter(|m| !applied.contains(m.version));

    for migration in pending {
        apply(conn, migration)?;
    }

    Ok(())
}

fn is_untracked_legacy_db(conn: &Connection) -> Result<bool> {
    let tracked: i64 = conn.query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
        row.get(0)
    })?;
    if tracked > 0 {
        return Ok(false);
    }

    let has_tasks: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'tasks')",
        [],
        |row| row.get(0),
    )?;
    Ok(has_tasks)
}

fn applied_versions(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<HashSet<String>>>()?;
    Ok(versions)
}

fn record(conn: &Connection, migration: &Migration) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
        (
            migration.version,
            migration.name,
            chrono::Utc::now().to_rfc3339(),
        ),
    )?;
    Ok(())
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    tracing::info!(
        version = migration.version,
        "Applying migration {}",
        migration.name
    );

    let failed = || {
        format!(
            "Failed to apply migration {}: {}",
            migration.version, migration.name
        )
    };

    // Rolled back on drop if either step fails.
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql).with_context(failed)?;
    record(&tx, migration).with_context(failed)?;
    tx.commit()?;

    tracing::info!(version = migration.version, "Migration applied");
    Ok(())
}
