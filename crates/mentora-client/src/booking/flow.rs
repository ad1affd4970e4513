use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use mentora_shared::constants::SLOT_PENDING_BOOKING_ID;
use mentora_shared::{Booking, BookingId, BookingStatus, NewBooking, Offering, OfferingId, Slot};
use mentora_store::StoreError;

use crate::booking::reconcile::{self, promote_pending, Recovered};
use crate::booking::BookingState;
use crate::collab::{BookingStore, OfferingStore, RecoverySlots};
use crate::error::FlowError;
use crate::events::{EventBus, FlowEvent};
use crate::payment::{PaymentButtons, PaymentSignal, PaymentWidget};
use crate::session::SessionContext;

/// One booking attempt, from selection to a terminal state.
///
/// Remote steps (`confirm`, `complete_payment`, `recover_on_load`) are
/// serialized by an in-flight flag: a second call while one is running gets
/// [`FlowError::InFlight`] and does no I/O. Failed steps leave the state
/// untouched. `cancel` is not a remote step and always applies; a confirm
/// still running when it lands finishes its writes but leaves the flow
/// `Cancelled`.
pub struct BookingFlow<S> {
    store: S,
    session: SessionContext,
    buttons: PaymentButtons,
    events: EventBus,
    state: Mutex<BookingState>,
    in_flight: AtomicBool,
}

/// Holds the in-flight flag; cleared on drop, including when the owning
/// future is cancelled.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, FlowError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| {
                tracing::debug!("booking step already in flight");
                FlowError::InFlight
            })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S> BookingFlow<S>
where
    S: OfferingStore + BookingStore + RecoverySlots,
{
    pub fn new(store: S, session: SessionContext, buttons: PaymentButtons, events: EventBus) -> Self {
        Self {
            store,
            session,
            buttons,
            events,
            state: Mutex::new(BookingState::NotStarted),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> BookingState {
        self.lock().clone()
    }

    /// Choose what to book. No I/O.
    pub fn select(&self, offering: Offering) -> Result<BookingState, FlowError> {
        {
            let state = self.lock();
            if *state != BookingState::NotStarted {
                return Err(FlowError::InvalidTransition {
                    action: "select",
                    state: state.name(),
                });
            }
        }

        if self.session.identity().is_none() {
            return Err(self.reject_unauthenticated(offering.id()));
        }

        self.transition(BookingState::PendingConfirmation { offering });
        Ok(self.state())
    }

    /// Confirm the selected offering.
    ///
    /// `chosen` is the booker's date and time; it is required for mentor
    /// services and ignored for sessions, which carry their own slot.
    pub async fn confirm(&self, chosen: Option<Slot>) -> Result<BookingState, FlowError> {
        let _in_flight = InFlight::acquire(&self.in_flight)?;

        let selected = match &*self.lock() {
            BookingState::PendingConfirmation { offering } => offering.clone(),
            other => {
                return Err(FlowError::InvalidTransition {
                    action: "confirm",
                    state: other.name(),
                })
            }
        };

        let Some(identity) = self.session.identity() else {
            return Err(self.reject_unauthenticated(selected.id()));
        };

        if selected.fixed_slot().is_none() && chosen.is_none() {
            return Err(FlowError::SlotRequired);
        }

        let offering = self
            .store
            .get_offering(selected.id())
            .await
            .map_err(FlowError::RemoteRead)?
            .ok_or(FlowError::OfferingUnavailable(selected.id()))?;
        let slot = offering
            .fixed_slot()
            .or(chosen)
            .ok_or(FlowError::SlotRequired)?;

        let active = self
            .store
            .find_bookings(&identity.id, offering.id(), &BookingStatus::ACTIVE)
            .await
            .map_err(FlowError::RemoteRead)?;
        if let Some(existing) = active.iter().find(|b| b.status.is_active()) {
            tracing::info!(
                user = %identity.id,
                booking = %existing.id,
                status = %existing.status,
                "active booking already exists"
            );
            return Err(self.reject_duplicate(offering.id()));
        }

        let record = NewBooking::snapshot(&identity, &offering, slot);
        let id = match self.store.create_booking(&record).await {
            Ok(id) => id,
            Err(StoreError::Conflict(detail)) => {
                tracing::info!(user = %identity.id, %detail, "concurrent booking won the race");
                return Err(self.reject_duplicate(offering.id()));
            }
            Err(e) => {
                tracing::warn!(user = %identity.id, offering = %offering.id(), error = %e, "booking write failed");
                return Err(FlowError::RemoteWrite(e));
            }
        };
        let booking = Booking::from_new(id, record);

        if offering.is_free() {
            tracing::info!(booking = %id, user = %identity.id, "free booking confirmed");
            self.settle(BookingState::FreeBooked {
                booking: booking.clone(),
            });
            self.events.emit(FlowEvent::BookingConfirmed { booking });
            return Ok(self.state());
        }

        if let Err(e) = self.store.put_slot(SLOT_PENDING_BOOKING_ID, &id.to_string()).await {
            tracing::warn!(booking = %id, error = %e, "pending booking written but not recoverable");
            return Err(FlowError::RemoteWrite(e));
        }

        let widget = PaymentWidget {
            button_id: self.buttons.for_kind(offering.kind()).to_string(),
            booking_id: id,
            amount: offering.price(),
        };
        tracing::info!(booking = %id, amount = widget.amount, "awaiting payment");
        let settled = self.settle(BookingState::AwaitingPayment {
            booking,
            widget: widget.clone(),
        });
        if settled {
            self.events.emit(FlowEvent::PaymentRequested { widget });
        }
        Ok(self.state())
    }

    /// Handle the payment button's completion event.
    ///
    /// The signal must name the booking this flow is waiting on, or, after a
    /// reload, the one recorded in the recovery slot. Anything else is
    /// [`FlowError::PaymentCorrelationMismatch`] and changes nothing.
    pub async fn complete_payment(&self, signal: PaymentSignal) -> Result<BookingState, FlowError> {
        let _in_flight = InFlight::acquire(&self.in_flight)?;

        let expected = match self.awaiting_id()? {
            Some(id) => Some(id),
            None => self
                .store
                .peek_slot(SLOT_PENDING_BOOKING_ID)
                .await
                .map_err(FlowError::RemoteRead)?
                .and_then(|raw| BookingId::parse(&raw).ok()),
        };

        if expected != Some(signal.booking_id) {
            tracing::debug!(
                received = %signal.booking_id,
                expected = ?expected,
                "ignoring uncorrelated payment signal"
            );
            return Err(FlowError::PaymentCorrelationMismatch {
                received: signal.booking_id,
            });
        }

        let reference = Some(signal.payment_reference).filter(|r| !r.trim().is_empty());
        let booking = promote_pending(&self.store, signal.booking_id, reference).await?;

        match self
            .store
            .clear_slot_if(SLOT_PENDING_BOOKING_ID, &booking.id.to_string())
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(booking = %booking.id, "pending booking slot holds another booking")
            }
            Err(e) => {
                tracing::warn!(booking = %booking.id, error = %e, "could not clear pending booking slot")
            }
        }

        self.transition(BookingState::PaidBooked {
            booking: booking.clone(),
        });
        self.events.emit(FlowEvent::PaymentCompleted { booking });
        Ok(self.state())
    }

    /// Abandon the attempt. A pending booking row and its recovery slot are
    /// left in place for a later redirect marker.
    pub fn cancel(&self) -> Result<BookingState, FlowError> {
        let mut state = self.lock();

        match &*state {
            BookingState::PendingConfirmation { .. } => {}
            BookingState::AwaitingPayment { booking, .. } => {
                tracing::warn!(booking = %booking.id, "payment abandoned, booking stays pending");
            }
            other => {
                return Err(FlowError::InvalidTransition {
                    action: "cancel",
                    state: other.name(),
                })
            }
        }

        tracing::info!(from = state.name(), to = "cancelled", "booking flow transition");
        *state = BookingState::Cancelled;
        Ok(BookingState::Cancelled)
    }

    /// Reconcile a payment that completed on the redirect page. A fresh flow,
    /// or one still waiting on the recovered booking, moves to `PaidBooked`.
    pub async fn recover_on_load(&self) -> Result<Option<Recovered>, FlowError> {
        let _in_flight = InFlight::acquire(&self.in_flight)?;

        let recovered = reconcile::recover_on_load(&self.store).await?;
        if let Some(found) = &recovered {
            let applies = match &*self.lock() {
                BookingState::NotStarted => true,
                BookingState::AwaitingPayment { booking, .. } => booking.id == found.booking.id,
                _ => false,
            };
            if applies {
                self.transition(BookingState::PaidBooked {
                    booking: found.booking.clone(),
                });
            }
            self.events.emit(FlowEvent::PaymentCompleted {
                booking: found.booking.clone(),
            });
        }
        Ok(recovered)
    }

    fn awaiting_id(&self) -> Result<Option<BookingId>, FlowError> {
        match &*self.lock() {
            BookingState::AwaitingPayment { booking, .. } => Ok(Some(booking.id)),
            BookingState::NotStarted | BookingState::Cancelled => Ok(None),
            other => Err(FlowError::InvalidTransition {
                action: "complete payment",
                state: other.name(),
            }),
        }
    }

    fn reject_unauthenticated(&self, offering_id: OfferingId) -> FlowError {
        self.settle(BookingState::RejectedUnauthenticated);
        self.events.emit(FlowEvent::BookingRejected {
            offering_id,
            reason: "unauthenticated".to_string(),
        });
        FlowError::AuthRequired
    }

    fn reject_duplicate(&self, offering_id: OfferingId) -> FlowError {
        self.settle(BookingState::RejectedDuplicate { offering_id });
        self.events.emit(FlowEvent::BookingRejected {
            offering_id,
            reason: "duplicate".to_string(),
        });
        FlowError::DuplicateBooking
    }

    /// Outcome of `select` or `confirm`. A cancel that landed while the step
    /// was running wins.
    fn settle(&self, next: BookingState) -> bool {
        let mut state = self.lock();
        if *state == BookingState::Cancelled {
            tracing::info!(outcome = next.name(), "flow cancelled while confirming");
            return false;
        }
        tracing::info!(from = state.name(), to = next.name(), "booking flow transition");
        *state = next;
        true
    }

    fn transition(&self, next: BookingState) {
        let mut state = self.lock();
        tracing::info!(from = state.name(), to = next.name(), "booking flow transition");
        *state = next;
    }

    fn lock(&self) -> MutexGuard<'_, BookingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
