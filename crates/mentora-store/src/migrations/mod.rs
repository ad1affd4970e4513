//! Schema migrations, applied in order by [`Database::open_at`].
//!
//! `PRAGMA user_version` records the last applied step, so each step runs
//! once per database file.
//!
//! [`Database::open_at`]: crate::Database::open_at

pub mod v001_initial;
pub mod v002_active_booking_unique;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

type Step = fn(&Connection) -> rusqlite::Result<()>;

const STEPS: &[(u32, &str, Step)] = &[
    (1, "v001_initial", v001_initial::up as Step),
    (2, "v002_active_booking_unique", v002_active_booking_unique::up as Step),
];

/// Schema version after all steps have run.
pub const CURRENT_VERSION: u32 = 2;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema v{current} is newer than this build (v{CURRENT_VERSION})"
        )));
    }

    for (version, name, up) in STEPS.iter().filter(|(v, _, _)| *v > current) {
        tracing::info!(version, migration = name, "applying migration");
        up(conn).map_err(|e| StoreError::Migration(format!("{name}: {e}")))?;
        conn.pragma_update(None, "user_version", version)?;
    }

    tracing::debug!(version = CURRENT_VERSION, "schema up to date");
    Ok(())
}
