use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// The signed-in user as reported by the identity provider.
///
/// The core never creates or mutates identities; it only reads the uid, the
/// email and whether the address has been verified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub display_name: Option<String>,
    pub verified: bool,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: impl Into<String>, verified: bool) -> Self {
        Self {
            id: UserId::new(id),
            email: email.into(),
            display_name: None,
            verified,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name shown on bookings: display name, falling back to the email.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_falls_back_to_email() {
        let identity = Identity::new("u1", "a@b.in", true);
        assert_eq!(identity.label(), "a@b.in");

        let named = identity.clone().with_display_name("  ");
        assert_eq!(named.label(), "a@b.in");

        let named = identity.with_display_name("Asha");
        assert_eq!(named.label(), "Asha");
    }
}
