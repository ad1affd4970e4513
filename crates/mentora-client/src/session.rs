//! Who is signed in, published from the composition root.
//!
//! [`SessionHandle`] is the only writer. Everything else receives a
//! [`SessionContext`], a cheap read view over the latest [`AuthSnapshot`].

use tokio::sync::watch;

use mentora_shared::Identity;

use crate::collab::IdentityService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub identity: Option<Identity>,
    /// `true` until the first identity resolution settles.
    pub loading: bool,
}

impl AuthSnapshot {
    fn resolving() -> Self {
        Self {
            identity: None,
            loading: true,
        }
    }
}

/// Write side, owned by the composition root.
pub struct SessionHandle {
    tx: watch::Sender<AuthSnapshot>,
}

impl SessionHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthSnapshot::resolving());
        Self { tx }
    }

    pub fn context(&self) -> SessionContext {
        SessionContext {
            rx: self.tx.subscribe(),
        }
    }

    /// Ask the identity provider who is signed in and publish the answer.
    pub async fn resolve<I: IdentityService>(&self, service: &I) -> Option<Identity> {
        let identity = service.resolve_identity().await;
        match &identity {
            Some(user) => tracing::info!(user = %user.id, verified = user.verified, "identity resolved"),
            None => tracing::info!("no signed-in user"),
        }
        self.publish(identity.clone());
        identity
    }

    pub fn sign_in(&self, identity: Identity) {
        tracing::info!(user = %identity.id, verified = identity.verified, "signed in");
        self.publish(Some(identity));
    }

    pub fn sign_out(&self) {
        tracing::info!("signed out");
        self.publish(None);
    }

    /// Record a fresh verification check for the current user.
    pub fn set_verified(&self, verified: bool) {
        self.tx.send_modify(|snapshot| {
            if let Some(identity) = snapshot.identity.as_mut() {
                identity.verified = verified;
            }
        });
    }

    fn publish(&self, identity: Option<Identity>) {
        self.tx.send_replace(AuthSnapshot {
            identity,
            loading: false,
        });
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of the session: identity, verified, loading.
#[derive(Clone)]
pub struct SessionContext {
    rx: watch::Receiver<AuthSnapshot>,
}

impl SessionContext {
    pub fn snapshot(&self) -> AuthSnapshot {
        self.rx.borrow().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.rx.borrow().identity.clone()
    }

    pub fn is_verified(&self) -> bool {
        self.rx
            .borrow()
            .identity
            .as_ref()
            .map(|i| i.verified)
            .unwrap_or(false)
    }

    pub fn is_loading(&self) -> bool {
        self.rx.borrow().loading
    }

    /// Wait for the next published change. Returns `false` once the handle
    /// has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
