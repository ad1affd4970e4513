//! Turning a completed payment into a `booked` record, both from the in-page
//! signal and from the redirect marker found on the next load.

use chrono::Utc;

use mentora_shared::constants::{
    SLOT_PAYMENT_REFERENCE, SLOT_PAYMENT_SUCCESS, SLOT_PENDING_BOOKING_ID,
};
use mentora_shared::{Booking, BookingId, BookingStatus, BookingUpdate};
use mentora_store::StoreError;

use crate::collab::{BookingStore, OfferingStore, RecoverySlots};
use crate::error::FlowError;

/// A booking settled by [`recover_on_load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    pub booking: Booking,
    pub group_link: Option<String>,
}

/// Promote booking `id` from `pending` to `booked`/`completed`.
///
/// A booking that is already `booked` is returned unchanged, so replays write
/// nothing.
pub async fn promote_pending<S: BookingStore>(
    store: &S,
    id: BookingId,
    payment_reference: Option<String>,
) -> Result<Booking, FlowError> {
    let mut booking = store
        .get_booking(id)
        .await
        .map_err(FlowError::RemoteRead)?
        .ok_or(FlowError::RemoteRead(StoreError::NotFound))?;

    match booking.status {
        BookingStatus::Booked => {
            tracing::debug!(booking = %id, "booking already settled");
            return Ok(booking);
        }
        BookingStatus::Cancelled => {
            tracing::warn!(booking = %id, "payment received for a cancelled booking");
            return Err(FlowError::InvalidTransition {
                action: "complete payment",
                state: booking.status.as_str(),
            });
        }
        BookingStatus::Pending => {}
    }

    let update = BookingUpdate::payment_completed(payment_reference, Utc::now());
    store
        .update_booking_status(id, &update)
        .await
        .map_err(FlowError::RemoteWrite)?;
    booking.apply(&update);

    tracing::info!(
        booking = %id,
        user = %booking.user_id,
        reference = booking.payment_reference.as_deref().unwrap_or("-"),
        "payment completed"
    );
    Ok(booking)
}

/// Settle a payment that finished on the redirect page.
///
/// Consumes the `paymentSuccess` marker together with `pendingBookingId` and
/// `paymentReference`. Returns `None` when there is nothing to reconcile.
pub async fn recover_on_load<S>(store: &S) -> Result<Option<Recovered>, FlowError>
where
    S: OfferingStore + BookingStore + RecoverySlots,
{
    let marker = store
        .take_slot(SLOT_PAYMENT_SUCCESS)
        .await
        .map_err(FlowError::RemoteRead)?;
    if marker.as_deref() != Some("true") {
        return Ok(None);
    }

    let pending = store
        .take_slot(SLOT_PENDING_BOOKING_ID)
        .await
        .map_err(FlowError::RemoteRead)?;
    let reference = store
        .take_slot(SLOT_PAYMENT_REFERENCE)
        .await
        .map_err(FlowError::RemoteRead)?;

    let Some(raw) = pending else {
        tracing::warn!("payment marker without a pending booking id");
        return Ok(None);
    };
    let id = match BookingId::parse(&raw) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(value = %raw, error = %e, "unreadable pending booking id");
            return Ok(None);
        }
    };

    let booking = match promote_pending(store, id, reference).await {
        Ok(booking) => booking,
        Err(e) => {
            tracing::error!(booking = %id, error = %e, "payment reconciliation failed");
            return Err(e);
        }
    };

    let group_link = match &booking.group_link {
        Some(link) => Some(link.clone()),
        None => match store.get_offering(booking.offering_id).await {
            Ok(offering) => offering.and_then(|o| o.group_link().map(str::to_string)),
            Err(e) => {
                tracing::debug!(offering = %booking.offering_id, error = %e, "no fresh group link");
                None
            }
        },
    };

    Ok(Some(Recovered { booking, group_link }))
}
