use rusqlite::Connection;

// At most one pending/booked row per (user, offering).
const UP_SQL: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_bookings_one_active
    ON bookings(user_id, offering_id)
    WHERE status IN ('pending', 'booked');
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
