//! # mentora-shared
//!
//! Domain types shared by the Mentora store and client crates: identifiers,
//! the signed-in identity, profiles, offerings and bookings.

pub mod booking;
pub mod constants;
pub mod error;
pub mod identity;
pub mod offering;
pub mod profile;
pub mod types;

pub use booking::{Booking, BookingStatus, BookingUpdate, NewBooking, PaymentStatus};
pub use error::ModelError;
pub use identity::Identity;
pub use offering::{MentorService, Offering, OfferingFilter, OfferingKind, SessionOffering, Slot};
pub use profile::{Education, Profile};
pub use types::{BookingId, OfferingId, UserId};
