//! Booking flow: select an offering, confirm, pay, reconcile.

pub mod flow;
pub mod reconcile;

use serde::Serialize;

use mentora_shared::{Booking, Offering, OfferingId};

use crate::payment::PaymentWidget;

pub use flow::BookingFlow;
pub use reconcile::{promote_pending, recover_on_load, Recovered};

/// Where a single booking attempt stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum BookingState {
    NotStarted,
    /// Offering chosen, waiting for the user to confirm. No I/O yet.
    PendingConfirmation { offering: Offering },
    /// A `pending` booking exists and the payment button is showing.
    AwaitingPayment {
        booking: Booking,
        widget: PaymentWidget,
    },
    FreeBooked { booking: Booking },
    PaidBooked { booking: Booking },
    Cancelled,
    RejectedDuplicate { offering_id: OfferingId },
    RejectedUnauthenticated,
}

impl BookingState {
    pub fn name(&self) -> &'static str {
        match self {
            BookingState::NotStarted => "not-started",
            BookingState::PendingConfirmation { .. } => "pending-confirmation",
            BookingState::AwaitingPayment { .. } => "awaiting-payment",
            BookingState::FreeBooked { .. } => "free-booked",
            BookingState::PaidBooked { .. } => "paid-booked",
            BookingState::Cancelled => "cancelled",
            BookingState::RejectedDuplicate { .. } => "rejected-duplicate",
            BookingState::RejectedUnauthenticated => "rejected-unauthenticated",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingState::FreeBooked { .. }
                | BookingState::PaidBooked { .. }
                | BookingState::Cancelled
                | BookingState::RejectedDuplicate { .. }
                | BookingState::RejectedUnauthenticated
        )
    }

    /// The booking record this state carries, if any.
    pub fn booking(&self) -> Option<&Booking> {
        match self {
            BookingState::AwaitingPayment { booking, .. }
            | BookingState::FreeBooked { booking }
            | BookingState::PaidBooked { booking } => Some(booking),
            _ => None,
        }
    }

    /// Community link to show once the booking is settled.
    pub fn group_link(&self) -> Option<&str> {
        match self {
            BookingState::FreeBooked { booking } | BookingState::PaidBooked { booking } => {
                booking.group_link.as_deref()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!BookingState::NotStarted.is_terminal());
        assert!(BookingState::Cancelled.is_terminal());
        assert!(BookingState::RejectedUnauthenticated.is_terminal());
        assert!(BookingState::RejectedDuplicate {
            offering_id: OfferingId::new()
        }
        .is_terminal());
        assert_eq!(BookingState::NotStarted.booking(), None);
        assert_eq!(BookingState::Cancelled.group_link(), None);
    }

    #[test]
    fn serializes_with_state_tag() {
        let json = serde_json::to_value(BookingState::RejectedUnauthenticated).unwrap();
        assert_eq!(json["state"], "rejected-unauthenticated");
    }
}
