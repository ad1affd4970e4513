//! Route access gate for protected pages.
//!
//! [`decide`] is a pure function of the session snapshot, the profile
//! completeness and the requested path. [`check`] performs the profile lookup
//! first and feeds the result into [`decide`].

use serde::Serialize;

use mentora_shared::constants::{LOGIN_PATH, PROFILE_PATH, VERIFY_EMAIL_PATH};
use mentora_shared::{Identity, UserId};

use crate::collab::ProfileStore;
use crate::error::FlowError;
use crate::session::SessionContext;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "kebab-case")]
pub enum GateDecision {
    /// Identity is still being resolved; render a neutral placeholder.
    Loading,
    Allow,
    /// `from` is the requested path, to resume after sign-in.
    RedirectToLogin { from: String },
    RedirectToVerify { from: String },
    RedirectToProfile,
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow)
    }

    /// Path to navigate to, if this decision is a redirect.
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            GateDecision::RedirectToLogin { .. } => Some(LOGIN_PATH),
            GateDecision::RedirectToVerify { .. } => Some(VERIFY_EMAIL_PATH),
            GateDecision::RedirectToProfile => Some(PROFILE_PATH),
            GateDecision::Loading | GateDecision::Allow => None,
        }
    }
}

/// Everything the gate looks at.
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
    pub loading: bool,
    pub identity: Option<&'a Identity>,
    pub profile_complete: bool,
    pub path: &'a str,
}

/// First failing requirement, in order: signed in, verified, profile
/// complete (except on the profile page itself).
fn requirement(input: &GateInput<'_>) -> Result<(), FlowError> {
    let identity = input.identity.ok_or(FlowError::AuthRequired)?;
    if !identity.verified {
        return Err(FlowError::NotVerified);
    }
    if !input.profile_complete && !is_profile_page(input.path) {
        return Err(FlowError::ProfileIncomplete);
    }
    Ok(())
}

pub fn decide(input: GateInput<'_>) -> GateDecision {
    if input.loading {
        return GateDecision::Loading;
    }

    match requirement(&input) {
        Ok(()) => GateDecision::Allow,
        Err(FlowError::AuthRequired) => GateDecision::RedirectToLogin {
            from: input.path.to_string(),
        },
        Err(FlowError::NotVerified) => GateDecision::RedirectToVerify {
            from: input.path.to_string(),
        },
        Err(_) => GateDecision::RedirectToProfile,
    }
}

/// Profile completeness for `user`. Lookup errors and missing records count
/// as incomplete.
pub async fn profile_complete<P: ProfileStore>(profiles: &P, user: &UserId) -> bool {
    match profiles.get_profile(user).await {
        Ok(Some(profile)) => profile.is_complete(),
        Ok(None) => {
            tracing::debug!(user = %user, "no profile record");
            false
        }
        Err(e) => {
            tracing::warn!(user = %user, error = %e, "profile lookup failed, treating as incomplete");
            false
        }
    }
}

/// Gate a navigation to `path` for the current session.
pub async fn check<P: ProfileStore>(
    session: &SessionContext,
    profiles: &P,
    path: &str,
) -> GateDecision {
    let snapshot = session.snapshot();

    let complete = match (&snapshot.identity, snapshot.loading) {
        (Some(identity), false) => profile_complete(profiles, &identity.id).await,
        _ => false,
    };

    let decision = decide(GateInput {
        loading: snapshot.loading,
        identity: snapshot.identity.as_ref(),
        profile_complete: complete,
        path,
    });

    tracing::debug!(path, ?decision, "gate decision");
    decision
}

/// `/profile`, ignoring a query, a fragment and a trailing slash.
fn is_profile_page(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = path.strip_suffix('/').unwrap_or(path);
    path == PROFILE_PATH
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentora_shared::{Education, Profile};
    use mentora_store::{Result, StoreError};

    use crate::session::SessionHandle;

    fn complete_profile() -> Profile {
        Profile {
            name: "Asha Rao".into(),
            email: "asha@example.in".into(),
            whatsapp: "+91 90000 00000".into(),
            education: Education {
                degree: "B.E.".into(),
                specialization: "CSE".into(),
                college: "PSG Tech".into(),
                college_location: "Coimbatore".into(),
                current_year: "2".into(),
                graduation_year: "2028".into(),
            },
        }
    }

    enum Profiles {
        Stored(Profile),
        Missing,
        Broken,
    }

    impl ProfileStore for Profiles {
        async fn get_profile(&self, _user: &UserId) -> Result<Option<Profile>> {
            match self {
                Profiles::Stored(p) => Ok(Some(p.clone())),
                Profiles::Missing => Ok(None),
                Profiles::Broken => Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "offline",
                ))),
            }
        }
    }

    fn input<'a>(identity: Option<&'a Identity>, complete: bool, path: &'a str) -> GateInput<'a> {
        GateInput {
            loading: false,
            identity,
            profile_complete: complete,
            path,
        }
    }

    #[test]
    fn loading_is_not_a_decision() {
        let decision = decide(GateInput {
            loading: true,
            identity: None,
            profile_complete: false,
            path: "/sessions",
        });
        assert_eq!(decision, GateDecision::Loading);
        assert_eq!(decision.redirect_path(), None);
    }

    #[test]
    fn anonymous_goes_to_login_with_origin() {
        let decision = decide(input(None, true, "/booking"));
        assert_eq!(
            decision,
            GateDecision::RedirectToLogin {
                from: "/booking".into()
            }
        );
        assert_eq!(decision.redirect_path(), Some("/login"));
    }

    #[test]
    fn unverified_never_allowed() {
        let user = Identity::new("u1", "u1@example.in", false);
        for path in ["/booking", "/profile", "/sessions", "/"] {
            for complete in [true, false] {
                let decision = decide(input(Some(&user), complete, path));
                assert!(!decision.is_allowed());
                assert_eq!(
                    decision,
                    GateDecision::RedirectToVerify { from: path.into() }
                );
            }
        }
    }

    #[test]
    fn incomplete_profile_redirects_except_on_profile_page() {
        let user = Identity::new("u1", "u1@example.in", true);
        assert_eq!(
            decide(input(Some(&user), false, "/booking")),
            GateDecision::RedirectToProfile
        );
        assert_eq!(
            decide(input(Some(&user), false, "/mentors")),
            GateDecision::RedirectToProfile
        );
        assert!(decide(input(Some(&user), false, "/profile")).is_allowed());
        assert!(decide(input(Some(&user), false, "/profile/?tab=edit")).is_allowed());
        assert_eq!(
            decide(input(Some(&user), false, "/profiles")),
            GateDecision::RedirectToProfile
        );
    }

    #[test]
    fn complete_verified_user_is_allowed() {
        let user = Identity::new("u1", "u1@example.in", true);
        assert!(decide(input(Some(&user), true, "/booking")).is_allowed());
    }

    #[tokio::test]
    async fn missing_college_redirects_booking_but_not_profile() {
        let mut profile = complete_profile();
        profile.education.college = String::new();
        let profiles = Profiles::Stored(profile);

        let handle = SessionHandle::new();
        handle.sign_in(Identity::new("u1", "u1@example.in", true));
        let ctx = handle.context();

        assert_eq!(
            check(&ctx, &profiles, "/booking").await,
            GateDecision::RedirectToProfile
        );
        assert_eq!(check(&ctx, &profiles, "/profile").await, GateDecision::Allow);
    }

    #[tokio::test]
    async fn lookup_failures_fail_closed() {
        let handle = SessionHandle::new();
        handle.sign_in(Identity::new("u1", "u1@example.in", true));
        let ctx = handle.context();

        for profiles in [Profiles::Missing, Profiles::Broken] {
            assert_eq!(
                check(&ctx, &profiles, "/booking").await,
                GateDecision::RedirectToProfile
            );
        }

        let stored = Profiles::Stored(complete_profile());
        assert_eq!(check(&ctx, &stored, "/booking").await, GateDecision::Allow);
    }

    #[tokio::test]
    async fn check_waits_for_identity_resolution() {
        let handle = SessionHandle::new();
        let ctx = handle.context();
        let profiles = Profiles::Stored(complete_profile());

        assert_eq!(check(&ctx, &profiles, "/booking").await, GateDecision::Loading);

        handle.sign_out();
        assert_eq!(
            check(&ctx, &profiles, "/booking").await,
            GateDecision::RedirectToLogin {
                from: "/booking".into()
            }
        );
    }
}
