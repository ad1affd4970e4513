//! Profile documents, keyed by the identity provider uid.

use chrono::Utc;
use rusqlite::params;

use mentora_shared::{Profile, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};

impl Database {
    /// Write the initial profile at signup. Fails with
    /// [`StoreError::Conflict`] if the user already has one.
    pub fn create_profile(&self, user: &UserId, profile: &Profile) -> Result<()> {
        let document = serde_json::to_string(profile)?;
        self.conn()
            .execute(
                "INSERT INTO profiles (user_id, document, updated_at) VALUES (?1, ?2, ?3)",
                params![user.as_str(), document, Utc::now().to_rfc3339()],
            )
            .map_err(StoreError::from_write)?;
        Ok(())
    }

    /// Replace the user's profile (profile page "save").
    pub fn save_profile(&self, user: &UserId, profile: &Profile) -> Result<()> {
        let document = serde_json::to_string(profile)?;
        self.conn().execute(
            "INSERT INTO profiles (user_id, document, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET
                 document = excluded.document,
                 updated_at = excluded.updated_at",
            params![user.as_str(), document, Utc::now().to_rfc3339()],
        )?;
        tracing::debug!(user = %user, complete = profile.is_complete(), "profile saved");
        Ok(())
    }

    pub fn get_profile(&self, user: &UserId) -> Result<Profile> {
        let document: String = self
            .conn()
            .query_row(
                "SELECT document FROM profiles WHERE user_id = ?1",
                params![user.as_str()],
                |row| row.get(0),
            )
            .map_err(StoreError::from_lookup)?;
        Ok(serde_json::from_str(&document)?)
    }
}
