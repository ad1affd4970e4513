//! Durable key/value slots scoped to this client.
//!
//! Slots hold small markers that must survive a reload (for example the id
//! of a booking waiting for payment). They are written once, read once and
//! then cleared.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Write `value` under `key`, replacing any previous value.
    pub fn put_slot(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO client_slots (key, value, written_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Read `key` without clearing it.
    pub fn peek_slot(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM client_slots WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Read and clear `key` atomically.
    pub fn take_slot(&self, key: &str) -> Result<Option<String>> {
        let tx = self.conn().unchecked_transaction()?;
        let value: Option<String> = tx
            .query_row(
                "SELECT value FROM client_slots WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        if value.is_some() {
            tx.execute("DELETE FROM client_slots WHERE key = ?1", params![key])?;
        }
        tx.commit()?;
        Ok(value)
    }

    /// Remove `key` only while it still holds `expected`. Returns `true` if
    /// it was removed.
    pub fn clear_slot_if(&self, key: &str, expected: &str) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM client_slots WHERE key = ?1 AND value = ?2",
            params![key, expected],
        )?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_is_read_once() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("slots.db")).unwrap();

        db.put_slot("pendingBookingId", "abc").unwrap();
        assert_eq!(db.peek_slot("pendingBookingId").unwrap().as_deref(), Some("abc"));
        assert_eq!(db.take_slot("pendingBookingId").unwrap().as_deref(), Some("abc"));
        assert_eq!(db.take_slot("pendingBookingId").unwrap(), None);
    }

    #[test]
    fn slots_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slots.db");

        {
            let db = Database::open_at(&path).unwrap();
            db.put_slot("paymentSuccess", "true").unwrap();
            db.put_slot("paymentSuccess", "true").unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.peek_slot("paymentSuccess").unwrap().as_deref(), Some("true"));
        assert!(db.clear_slot_if("paymentSuccess", "true").unwrap());
        assert!(!db.clear_slot_if("paymentSuccess", "true").unwrap());
    }

    #[test]
    fn clear_if_leaves_a_newer_value() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("slots.db")).unwrap();

        db.put_slot("pendingBookingId", "first").unwrap();
        db.put_slot("pendingBookingId", "second").unwrap();

        assert!(!db.clear_slot_if("pendingBookingId", "first").unwrap());
        assert_eq!(db.peek_slot("pendingBookingId").unwrap().as_deref(), Some("second"));
        assert!(db.clear_slot_if("pendingBookingId", "second").unwrap());
        assert_eq!(db.peek_slot("pendingBookingId").unwrap(), None);
    }
}
