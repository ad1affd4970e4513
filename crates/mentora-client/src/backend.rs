//! SQLite-backed implementation of the store collaborators.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use mentora_shared::{
    Booking, BookingId, BookingStatus, BookingUpdate, NewBooking, Offering, OfferingFilter,
    OfferingId, Profile, UserId,
};
use mentora_store::{Database, Result, StoreError};

use crate::collab::{BookingStore, OfferingStore, ProfileStore, RecoverySlots};

/// Shared handle to the local database.
#[derive(Clone)]
pub struct Backend {
    db: Arc<Mutex<Database>>,
}

impl Backend {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        Database::open_at(path).map(Self::new)
    }

    /// Exclusive access to the database for operations without a trait
    /// method (seeding offerings, maintenance queries).
    pub async fn database(&self) -> MutexGuard<'_, Database> {
        self.db.lock().await
    }

    pub async fn create_profile(&self, user: &UserId, profile: &Profile) -> Result<()> {
        self.db.lock().await.create_profile(user, profile)
    }

    pub async fn save_profile(&self, user: &UserId, profile: &Profile) -> Result<()> {
        self.db.lock().await.save_profile(user, profile)
    }

    pub async fn list_user_bookings(
        &self,
        user: &UserId,
        statuses: &[BookingStatus],
    ) -> Result<Vec<Booking>> {
        self.db.lock().await.list_user_bookings(user, statuses)
    }
}

/// `NotFound` means "absent" for the lookup-style collaborator methods.
fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(StoreError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

impl ProfileStore for Backend {
    async fn get_profile(&self, user: &UserId) -> Result<Option<Profile>> {
        optional(self.db.lock().await.get_profile(user))
    }
}

impl OfferingStore for Backend {
    async fn get_offering(&self, id: OfferingId) -> Result<Option<Offering>> {
        optional(self.db.lock().await.get_offering(id))
    }

    async fn list_offerings(&self, filter: &OfferingFilter) -> Result<Vec<Offering>> {
        self.db.lock().await.list_offerings(filter)
    }
}

impl BookingStore for Backend {
    async fn create_booking(&self, record: &NewBooking) -> Result<BookingId> {
        self.db.lock().await.create_booking(record)
    }

    async fn find_bookings(
        &self,
        user: &UserId,
        offering: OfferingId,
        statuses: &[BookingStatus],
    ) -> Result<Vec<Booking>> {
        self.db.lock().await.find_bookings(user, offering, statuses)
    }

    async fn update_booking_status(&self, id: BookingId, update: &BookingUpdate) -> Result<()> {
        self.db.lock().await.update_booking_status(id, update)
    }

    async fn get_booking(&self, id: BookingId) -> Result<Option<Booking>> {
        optional(self.db.lock().await.get_booking(id))
    }
}

impl RecoverySlots for Backend {
    async fn put_slot(&self, key: &str, value: &str) -> Result<()> {
        self.db.lock().await.put_slot(key, value)
    }

    async fn peek_slot(&self, key: &str) -> Result<Option<String>> {
        self.db.lock().await.peek_slot(key)
    }

    async fn take_slot(&self, key: &str) -> Result<Option<String>> {
        self.db.lock().await.take_slot(key)
    }

    async fn clear_slot_if(&self, key: &str, expected: &str) -> Result<bool> {
        self.db.lock().await.clear_slot_if(key, expected)
    }
}
