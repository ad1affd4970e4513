//! User profile record and the completeness rule consulted by the access gate.

use serde::{Deserialize, Serialize};

/// Education details collected on the profile page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub degree: String,
    pub specialization: String,
    pub college: String,
    pub college_location: String,
    pub current_year: String,
    pub graduation_year: String,
}

/// A user-owned profile document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    #[serde(default)]
    pub education: Education,
}

impl Profile {
    /// The record written at signup: only name and email are known.
    pub fn at_signup(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    /// `true` iff every one of the nine required fields is non-blank.
    pub fn is_complete(&self) -> bool {
        self.required_fields()
            .iter()
            .all(|(_, value)| !value.trim().is_empty())
    }

    /// Dotted names of the required fields that are still blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.required_fields()
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    fn required_fields(&self) -> [(&'static str, &str); 9] {
        let edu = &self.education;
        [
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("whatsapp", self.whatsapp.as_str()),
            ("education.degree", edu.degree.as_str()),
            ("education.specialization", edu.specialization.as_str()),
            ("education.college", edu.college.as_str()),
            ("education.collegeLocation", edu.college_location.as_str()),
            ("education.currentYear", edu.current_year.as_str()),
            ("education.graduationYear", edu.graduation_year.as_str()),
        ]
    }
}
