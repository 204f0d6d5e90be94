//! Database migrations
//!
//! Versioned schema migrations, each applied inside its own transaction.

use crate::core::error::Result;
use rusqlite::Connection;
use tracing::{info, warn};

/// Migration version tracking table
const MIGRATION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Initial schema migration (version 1)
const MIGRATION_V1: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

/// Ordered list of (version, description, sql)
const MIGRATIONS: &[(i64, &str, &str)] = &[(1, "Users table", MIGRATION_V1)];

/// Run all pending migrations
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    info!("Running database migrations");

    conn.execute_batch(MIGRATION_TABLE)?;

    let current_version = current_version(conn)?;
    info!("Current database schema version: {}", current_version);

    for (version, description, sql) in MIGRATIONS {
        if current_version < *version {
            info!("Applying migration v{}: {}", version, description);
            apply_migration(conn, *version, sql)?;
        }
    }

    Ok(())
}

/// Highest applied migration version, 0 for a fresh database
pub fn current_version(conn: &Connection) -> Result<i64> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn apply_migration(conn: &mut Connection, version: i64, sql: &str) -> Result<()> {
    let tx = conn.transaction()?;

    tx.execute_batch(sql).map_err(|e| {
        warn!("Migration v{} failed: {}", version, e);
        e
    })?;

    tx.execute(
        "INSERT INTO schema_migrations (version) VALUES (?)",
        [version],
    )?;

    tx.commit()?;

    info!("Migration v{} applied successfully", version);
    Ok(())
}
