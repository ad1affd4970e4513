//! Collaborators the client core talks to.
//!
//! Each trait is one remote surface (identity provider, document store,
//! durable client storage). [`crate::backend::Backend`] implements the store
//! traits on top of the local SQLite database.

use mentora_shared::{
    Booking, BookingId, BookingStatus, BookingUpdate, Identity, NewBooking, Offering,
    OfferingFilter, OfferingId, Profile, UserId,
};
use mentora_store::Result;

/// Resolves the currently signed-in user. Failures resolve to nobody.
#[allow(async_fn_in_trait)]
pub trait IdentityService {
    async fn resolve_identity(&self) -> Option<Identity>;
}

#[allow(async_fn_in_trait)]
pub trait ProfileStore {
    async fn get_profile(&self, user: &UserId) -> Result<Option<Profile>>;
}

#[allow(async_fn_in_trait)]
pub trait OfferingStore {
    async fn get_offering(&self, id: OfferingId) -> Result<Option<Offering>>;

    async fn list_offerings(&self, filter: &OfferingFilter) -> Result<Vec<Offering>>;
}

#[allow(async_fn_in_trait)]
pub trait BookingStore {
    async fn create_booking(&self, record: &NewBooking) -> Result<BookingId>;

    async fn find_bookings(
        &self,
        user: &UserId,
        offering: OfferingId,
        statuses: &[BookingStatus],
    ) -> Result<Vec<Booking>>;

    async fn update_booking_status(&self, id: BookingId, update: &BookingUpdate) -> Result<()>;

    async fn get_booking(&self, id: BookingId) -> Result<Option<Booking>>;
}

/// Client-side storage that survives a reload.
#[allow(async_fn_in_trait)]
pub trait RecoverySlots {
    async fn put_slot(&self, key: &str, value: &str) -> Result<()>;

    async fn peek_slot(&self, key: &str) -> Result<Option<String>>;

    /// Read and clear in one step.
    async fn take_slot(&self, key: &str) -> Result<Option<String>>;

    /// Clear `key` only if it still holds `expected`; `false` when another
    /// value has replaced it.
    async fn clear_slot_if(&self, key: &str, expected: &str) -> Result<bool>;
}
