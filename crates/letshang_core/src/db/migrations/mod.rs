//! Schema migrations for the hang store.
//!
//! # Invariants
//! - `version` values start at 1 and increase by one per entry.
//! - All pending steps run in one transaction; `user_version` moves with
//!   each step so a failure leaves the previous version in place.
//!
//! # Schema
//! - 0001: `hangs`, `attendees`, `suggestions` with insertion-order `seq`.
//! - 0002: nullable `suggestions.author`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "suggestion_author",
        sql: include_str!("0002_suggestion_author.sql"),
    },
];

/// Latest schema version this build can write.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Current `user_version` of the connection's main database.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Runs every migration newer than the stored version.
///
/// Returns the number of steps applied (0 when already current).
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let found = schema_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let pending = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > found)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(0);
    }

    info!("event=db_migrate module=db status=start from_version={found} to_version={supported}");
    let tx = conn.transaction()?;
    for migration in &pending {
        let step = format!(
            "{}\nPRAGMA user_version = {};",
            migration.sql, migration.version
        );
        tx.execute_batch(&step).map_err(|source| DbError::Migration {
            version: migration.version,
            name: migration.name,
            source,
        })?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok version={supported} applied={}",
        pending.len()
    );
    Ok(pending.len())
}
