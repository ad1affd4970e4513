use serde::Serialize;
use tokio::sync::broadcast;

use mentora_shared::{Booking, OfferingId};

use crate::payment::PaymentWidget;

pub const EVENT_BOOKING_CONFIRMED: &str = "booking-confirmed";
pub const EVENT_PAYMENT_REQUESTED: &str = "payment-requested";
pub const EVENT_PAYMENT_COMPLETED: &str = "payment-completed";
pub const EVENT_BOOKING_REJECTED: &str = "booking-rejected";

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum FlowEvent {
    BookingConfirmed { booking: Booking },
    PaymentRequested { widget: PaymentWidget },
    PaymentCompleted { booking: Booking },
    BookingRejected { offering_id: OfferingId, reason: String },
}

impl FlowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            FlowEvent::BookingConfirmed { .. } => EVENT_BOOKING_CONFIRMED,
            FlowEvent::PaymentRequested { .. } => EVENT_PAYMENT_REQUESTED,
            FlowEvent::PaymentCompleted { .. } => EVENT_PAYMENT_COMPLETED,
            FlowEvent::BookingRejected { .. } => EVENT_BOOKING_REJECTED,
        }
    }
}

/// Fan-out of booking events to whoever renders them.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<FlowEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FlowEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: FlowEvent) {
        let name = event.name();
        if self.tx.send(event).is_err() {
            tracing::trace!(event = name, "no event subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_events() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let offering_id = OfferingId::new();

        bus.emit(FlowEvent::BookingRejected {
            offering_id,
            reason: "duplicate".into(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name(), EVENT_BOOKING_REJECTED);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "booking-rejected");
    }

    #[test]
    fn emit_without_subscribers_is_fine() {
        let bus = EventBus::new(4);
        bus.emit(FlowEvent::BookingRejected {
            offering_id: OfferingId::new(),
            reason: "unauthenticated".into(),
        });
    }
}
