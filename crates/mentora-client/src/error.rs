use thiserror::Error;

use mentora_shared::{BookingId, OfferingId};
use mentora_store::StoreError;

/// Everything that can stop a gate check or a booking transition.
///
/// Gate variants (`AuthRequired`, `NotVerified`, `ProfileIncomplete`) are
/// turned into redirects and never shown. Booking variants abort the current
/// transition; [`FlowError::user_message`] says what, if anything, to show.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("You must be logged in to book a session")]
    AuthRequired,

    #[error("Please verify your email before continuing")]
    NotVerified,

    #[error("Please complete your profile before continuing")]
    ProfileIncomplete,

    #[error("You have already booked this session")]
    DuplicateBooking,

    #[error("This offering is no longer available ({0})")]
    OfferingUnavailable(OfferingId),

    #[error("Please select date and time.")]
    SlotRequired,

    #[error("Failed to load booking data: {0}")]
    RemoteRead(#[source] StoreError),

    #[error("Failed to book the session: {0}")]
    RemoteWrite(#[source] StoreError),

    #[error("Payment signal for booking {received} does not match the pending booking")]
    PaymentCorrelationMismatch { received: BookingId },

    #[error("Cannot {action} while the booking is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("Another booking step is still in progress")]
    InFlight,
}

impl FlowError {
    /// Text for a dismissible message, or `None` when the error is not the
    /// user's concern (stale payment signals, double clicks).
    pub fn user_message(&self) -> Option<String> {
        match self {
            FlowError::PaymentCorrelationMismatch { .. } | FlowError::InFlight => None,
            other => Some(other.to_string()),
        }
    }
}
