//! v001 -- Initial schema creation.
//!
//! Creates the four core tables: `profiles`, `offerings`, `bookings` and
//! `client_slots`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Profiles (one JSON document per user)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS profiles (
    user_id    TEXT PRIMARY KEY NOT NULL,   -- identity provider uid
    document   TEXT NOT NULL,               -- serialized Profile
    updated_at TEXT NOT NULL                -- RFC-3339
);

-- ----------------------------------------------------------------
-- Offerings (sessions and mentor services)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS offerings (
    id          TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    kind        TEXT NOT NULL,              -- 'session' | 'mentor_service'
    title       TEXT NOT NULL,
    host_id     TEXT,                       -- mentor uid (services only)
    host_name   TEXT NOT NULL,              -- instructor / mentor name
    date        TEXT,                       -- YYYY-MM-DD (sessions only)
    time        TEXT,                       -- HH:MM (sessions only)
    domain      TEXT NOT NULL,
    level       TEXT,
    capacity    INTEGER NOT NULL,
    price       INTEGER NOT NULL DEFAULT 0, -- whole rupees
    description TEXT,
    group_link  TEXT,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_offerings_date ON offerings(date, time);

-- ----------------------------------------------------------------
-- Bookings (offering fields snapshotted at booking time)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS bookings (
    id                TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    user_id           TEXT NOT NULL,
    user_name         TEXT NOT NULL,
    user_email        TEXT NOT NULL,
    offering_id       TEXT NOT NULL,              -- by id, not FK
    offering_kind     TEXT NOT NULL,
    title             TEXT NOT NULL,
    host_name         TEXT NOT NULL,
    date              TEXT NOT NULL,
    time              TEXT NOT NULL,
    domain            TEXT NOT NULL,
    price             INTEGER NOT NULL,
    status            TEXT NOT NULL,              -- pending | booked | cancelled
    payment_status    TEXT NOT NULL,              -- free | pending | completed
    group_link        TEXT,
    payment_reference TEXT,
    created_at        TEXT NOT NULL,
    paid_at           TEXT
);

CREATE INDEX IF NOT EXISTS idx_bookings_user_offering
    ON bookings(user_id, offering_id);

-- ----------------------------------------------------------------
-- Durable client slots (survive a reload during payment)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS client_slots (
    key        TEXT PRIMARY KEY NOT NULL,
    value      TEXT NOT NULL,
    written_at TEXT NOT NULL
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
