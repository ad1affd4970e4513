//! Hand-off to the external payment button and the signals it sends back.

use serde::{Deserialize, Serialize};

use mentora_shared::constants::{
    DEFAULT_MENTOR_BUTTON_ID, DEFAULT_SESSION_BUTTON_ID, SLOT_PAYMENT_REFERENCE,
    SLOT_PAYMENT_SUCCESS,
};
use mentora_shared::{BookingId, OfferingKind};

use crate::collab::RecoverySlots;

/// Merchant-configured payment buttons, one per offering kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentButtons {
    pub session: String,
    pub mentor_service: String,
}

impl PaymentButtons {
    pub fn for_kind(&self, kind: OfferingKind) -> &str {
        match kind {
            OfferingKind::Session => &self.session,
            OfferingKind::MentorService => &self.mentor_service,
        }
    }
}

impl Default for PaymentButtons {
    fn default() -> Self {
        Self {
            session: DEFAULT_SESSION_BUTTON_ID.to_string(),
            mentor_service: DEFAULT_MENTOR_BUTTON_ID.to_string(),
        }
    }
}

/// What the UI needs to mount the payment button for a pending booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWidget {
    pub button_id: String,
    pub booking_id: BookingId,
    /// Whole rupees.
    pub amount: u32,
}

/// In-page completion event from the payment button.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSignal {
    pub booking_id: BookingId,
    pub payment_reference: String,
}

/// Called by the post-payment redirect: leave a marker for the next load to
/// reconcile.
pub async fn record_redirect<S: RecoverySlots>(
    slots: &S,
    payment_reference: Option<&str>,
) -> mentora_store::Result<()> {
    if let Some(reference) = payment_reference.filter(|r| !r.trim().is_empty()) {
        slots.put_slot(SLOT_PAYMENT_REFERENCE, reference.trim()).await?;
    }
    slots.put_slot(SLOT_PAYMENT_SUCCESS, "true").await?;
    tracing::info!("payment redirect recorded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;

    #[test]
    fn buttons_per_kind() {
        let buttons = PaymentButtons::default();
        assert_eq!(buttons.for_kind(OfferingKind::Session), "pl_QVF8JctVh7OEfL");
        assert_eq!(
            buttons.for_kind(OfferingKind::MentorService),
            "pl_QZQCMR4tWobPfx"
        );
    }

    #[test]
    fn signal_from_event_json() {
        let id = BookingId::new();
        let json = format!(r#"{{"bookingId":"{id}","paymentReference":"pay_Q1"}}"#);
        let signal: PaymentSignal = serde_json::from_str(&json).unwrap();
        assert_eq!(signal.booking_id, id);
        assert_eq!(signal.payment_reference, "pay_Q1");
    }

    #[tokio::test]
    async fn redirect_sets_marker_and_reference() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Backend::open_at(&dir.path().join("pay.db")).unwrap();

        record_redirect(&backend, Some(" pay_Q1 ")).await.unwrap();
        assert_eq!(
            backend.peek_slot(SLOT_PAYMENT_SUCCESS).await.unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(
            backend.peek_slot(SLOT_PAYMENT_REFERENCE).await.unwrap().as_deref(),
            Some("pay_Q1")
        );
    }

    #[tokio::test]
    async fn redirect_without_reference() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Backend::open_at(&dir.path().join("pay.db")).unwrap();

        record_redirect(&backend, Some("  ")).await.unwrap();
        assert_eq!(backend.peek_slot(SLOT_PAYMENT_REFERENCE).await.unwrap(), None);
        assert!(backend.peek_slot(SLOT_PAYMENT_SUCCESS).await.unwrap().is_some());
    }
}
