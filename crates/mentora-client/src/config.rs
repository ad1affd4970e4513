//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so a development build starts with no
//! configuration at all.

use std::path::PathBuf;

use mentora_store::Database;

use crate::payment::PaymentButtons;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// SQLite file holding profiles, offerings, bookings and recovery slots.
    /// Env: `MENTORA_DB_PATH`
    /// Default: `mentora.db` in the platform data directory.
    pub db_path: PathBuf,

    /// Payment buttons for sessions and mentor services.
    /// Env: `SESSION_PAYMENT_BUTTON_ID`, `MENTOR_PAYMENT_BUTTON_ID`
    pub payment_buttons: PaymentButtons,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            payment_buttons: PaymentButtons::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = non_blank(var("MENTORA_DB_PATH")) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(id) = non_blank(var("SESSION_PAYMENT_BUTTON_ID")) {
            config.payment_buttons.session = id;
        }

        if let Some(id) = non_blank(var("MENTOR_PAYMENT_BUTTON_ID")) {
            config.payment_buttons.mentor_service = id;
        }

        tracing::debug!(db = %config.db_path.display(), "client configuration loaded");
        config
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_db_path() -> PathBuf {
    match Database::default_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!(error = %e, "No platform data directory, using ./mentora.db");
            PathBuf::from("mentora.db")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> ClientConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = load(&[]);
        assert_eq!(config.payment_buttons, PaymentButtons::default());
        assert!(config.db_path.ends_with("mentora.db"));
    }

    #[test]
    fn overrides_from_environment() {
        let config = load(&[
            ("MENTORA_DB_PATH", "/tmp/m.db"),
            ("SESSION_PAYMENT_BUTTON_ID", "pl_session"),
            ("MENTOR_PAYMENT_BUTTON_ID", " pl_mentor "),
        ]);
        assert_eq!(config.db_path, PathBuf::from("/tmp/m.db"));
        assert_eq!(config.payment_buttons.session, "pl_session");
        assert_eq!(config.payment_buttons.mentor_service, "pl_mentor");
    }

    #[test]
    fn blank_values_keep_defaults() {
        let config = load(&[("SESSION_PAYMENT_BUTTON_ID", "  ")]);
        assert_eq!(config.payment_buttons.session, "pl_QVF8JctVh7OEfL");
    }
}
