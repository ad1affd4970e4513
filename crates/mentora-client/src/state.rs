//! Application state shared by every page of the client.
//!
//! [`AppState`] is the composition root: it owns the database backend, the
//! session writer and the event bus, and hands out read-only session views
//! and booking flows wired to them.

use mentora_shared::{Booking, BookingStatus, Identity, Offering, OfferingFilter, Profile};
use mentora_store::StoreError;

use crate::backend::Backend;
use crate::booking::BookingFlow;
use crate::collab::OfferingStore;
use crate::config::ClientConfig;
use crate::error::FlowError;
use crate::events::EventBus;
use crate::gate::{self, GateDecision};
use crate::payment;
use crate::session::{SessionContext, SessionHandle};

pub struct AppState {
    pub config: ClientConfig,

    /// Local database behind the profile, offering, booking and slot stores.
    pub backend: Backend,

    /// Writer side of the session. Only the composition root signs users in
    /// and out.
    pub session: SessionHandle,

    pub events: EventBus,
}

impl AppState {
    /// Open the configured database and start with an unresolved session.
    pub fn open(config: ClientConfig) -> Result<Self, StoreError> {
        let backend = Backend::open_at(&config.db_path)?;
        tracing::info!(db = %config.db_path.display(), "client state ready");
        Ok(Self::with_backend(config, backend))
    }

    pub fn with_backend(config: ClientConfig, backend: Backend) -> Self {
        Self {
            config,
            backend,
            session: SessionHandle::new(),
            events: EventBus::default(),
        }
    }

    pub fn context(&self) -> SessionContext {
        self.session.context()
    }

    /// Gate a navigation to a protected `path`.
    pub async fn guard(&self, path: &str) -> GateDecision {
        gate::check(&self.session.context(), &self.backend, path).await
    }

    pub fn booking_flow(&self) -> BookingFlow<Backend> {
        BookingFlow::new(
            self.backend.clone(),
            self.session.context(),
            self.config.payment_buttons.clone(),
            self.events.clone(),
        )
    }

    /// Flow for a freshly loaded booking page. A payment that completed on
    /// the redirect page is reconciled first, in which case the flow starts
    /// out `PaidBooked`.
    pub async fn on_load(&self) -> Result<BookingFlow<Backend>, FlowError> {
        let flow = self.booking_flow();
        if let Some(recovered) = flow.recover_on_load().await? {
            tracing::info!(booking = %recovered.booking.id, "payment recovered on load");
        }
        Ok(flow)
    }

    /// Entry point of the post-payment redirect page.
    pub async fn record_payment_redirect(&self, reference: Option<&str>) -> Result<(), FlowError> {
        payment::record_redirect(&self.backend, reference)
            .await
            .map_err(FlowError::RemoteWrite)
    }

    /// Create the user's empty profile at signup and sign them in.
    pub async fn signup(&self, identity: Identity, name: &str) -> Result<(), FlowError> {
        let profile = Profile::at_signup(name, identity.email.as_str());
        match self.backend.create_profile(&identity.id, &profile).await {
            Ok(()) => tracing::info!(user = %identity.id, "profile created"),
            Err(StoreError::Conflict(_)) => {
                tracing::debug!(user = %identity.id, "profile already exists")
            }
            Err(e) => return Err(FlowError::RemoteWrite(e)),
        }
        self.session.sign_in(identity);
        Ok(())
    }

    pub async fn save_profile(&self, profile: &Profile) -> Result<(), FlowError> {
        let identity = self.session.context().identity().ok_or(FlowError::AuthRequired)?;
        self.backend
            .save_profile(&identity.id, profile)
            .await
            .map_err(FlowError::RemoteWrite)?;

        let missing = profile.missing_fields();
        tracing::info!(user = %identity.id, missing = missing.len(), "profile saved");
        Ok(())
    }

    pub async fn list_offerings(&self, filter: &OfferingFilter) -> Result<Vec<Offering>, FlowError> {
        self.backend
            .list_offerings(filter)
            .await
            .map_err(FlowError::RemoteRead)
    }

    /// The signed-in user's confirmed bookings, soonest first.
    pub async fn my_bookings(&self) -> Result<Vec<Booking>, FlowError> {
        let identity = self.session.context().identity().ok_or(FlowError::AuthRequired)?;
        self.backend
            .list_user_bookings(&identity.id, &[BookingStatus::Booked])
            .await
            .map_err(FlowError::RemoteRead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentora_shared::{Education, OfferingId, OfferingKind, SessionOffering, Slot};

    use crate::payment::PaymentSignal;

    fn open() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            db_path: dir.path().join("state.db"),
            ..ClientConfig::default()
        };
        let state = AppState::open(config).unwrap();
        (dir, state)
    }

    fn session(title: &str, date: &str, price: u32) -> Offering {
        Offering::Session(SessionOffering {
            id: OfferingId::new(),
            title: title.into(),
            instructor: "Meera".into(),
            slot: Slot::parse(date, "10:00").unwrap(),
            domain: "Front End Development".into(),
            level: "Beginner".into(),
            capacity: 20,
            price,
            description: None,
            group_link: None,
        })
    }

    fn filled(name: &str, email: &str) -> Profile {
        Profile {
            name: name.into(),
            email: email.into(),
            whatsapp: "+91 98888 77777".into(),
            education: Education {
                degree: "B.Tech".into(),
                specialization: "IT".into(),
                college: "NIT Trichy".into(),
                college_location: "Tiruchirappalli".into(),
                current_year: "3".into(),
                graduation_year: "2027".into(),
            },
        }
    }

    #[tokio::test]
    async fn signup_then_complete_profile_opens_the_gate() {
        let (_dir, state) = open();
        assert_eq!(state.guard("/booking").await, GateDecision::Loading);

        state
            .signup(Identity::new("u1", "u1@example.in", true), "Asha")
            .await
            .unwrap();
        assert_eq!(state.guard("/booking").await, GateDecision::RedirectToProfile);
        assert!(state.guard("/profile").await.is_allowed());

        state.save_profile(&filled("Asha", "u1@example.in")).await.unwrap();
        assert!(state.guard("/booking").await.is_allowed());

        // Signing up again keeps the saved profile.
        state
            .signup(Identity::new("u1", "u1@example.in", true), "Asha")
            .await
            .unwrap();
        assert!(state.guard("/booking").await.is_allowed());
    }

    #[tokio::test]
    async fn unverified_user_is_sent_to_verification() {
        let (_dir, state) = open();
        state
            .signup(Identity::new("u2", "u2@example.in", false), "Ravi")
            .await
            .unwrap();
        state.save_profile(&filled("Ravi", "u2@example.in")).await.unwrap();

        assert_eq!(
            state.guard("/booking").await,
            GateDecision::RedirectToVerify {
                from: "/booking".into()
            }
        );
        state.session.set_verified(true);
        assert!(state.guard("/booking").await.is_allowed());
    }

    #[tokio::test]
    async fn anonymous_calls_need_auth() {
        let (_dir, state) = open();
        state.session.sign_out();

        assert!(matches!(
            state.my_bookings().await.unwrap_err(),
            FlowError::AuthRequired
        ));
        assert!(matches!(
            state.save_profile(&filled("x", "x@example.in")).await.unwrap_err(),
            FlowError::AuthRequired
        ));
    }

    #[tokio::test]
    async fn offerings_listed_by_date() {
        let (_dir, state) = open();
        {
            let db = state.backend.database().await;
            db.create_offering(&session("Later", "2026-12-05", 0)).unwrap();
            db.create_offering(&session("Sooner", "2026-11-05", 0)).unwrap();
        }

        let titles: Vec<String> = state
            .list_offerings(&OfferingFilter::all().domain("Web Development"))
            .await
            .unwrap()
            .iter()
            .map(|o| o.title().to_string())
            .collect();
        assert_eq!(titles, ["Sooner", "Later"]);

        let services = state
            .list_offerings(&OfferingFilter::all().kind(OfferingKind::MentorService))
            .await
            .unwrap();
        assert!(services.is_empty());
    }

    #[tokio::test]
    async fn paid_booking_shows_up_after_redirect() {
        let (_dir, state) = open();
        state
            .signup(Identity::new("u1", "u1@example.in", true), "Asha")
            .await
            .unwrap();
        let offering = session("System design", "2026-11-28", 799);
        state.backend.database().await.create_offering(&offering).unwrap();

        let flow = state.booking_flow();
        flow.select(offering.clone()).unwrap();
        let pending = flow.confirm(None).await.unwrap();
        let booking_id = pending.booking().unwrap().id;
        assert!(state.my_bookings().await.unwrap().is_empty());

        state.record_payment_redirect(Some("pay_777")).await.unwrap();
        let reloaded = state.on_load().await.unwrap();
        assert_eq!(reloaded.state().name(), "paid-booked");

        let mine = state.my_bookings().await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, booking_id);
        assert_eq!(mine[0].payment_reference.as_deref(), Some("pay_777"));

        // The in-page signal arriving late changes nothing.
        let late = flow
            .complete_payment(PaymentSignal {
                booking_id,
                payment_reference: "pay_777".into(),
            })
            .await
            .unwrap();
        assert_eq!(late.name(), "paid-booked");
        assert_eq!(state.my_bookings().await.unwrap().len(), 1);
    }
}
