//! Booking records. Offering fields are snapshotted at booking time so later
//! edits to the offering do not rewrite history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::identity::Identity;
use crate::offering::{Offering, OfferingKind, Slot};
use crate::types::{BookingId, OfferingId, UserId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Booked,
    Cancelled,
}

impl BookingStatus {
    /// Statuses that hold a slot and block a second booking of the same
    /// offering by the same user.
    pub const ACTIVE: [BookingStatus; 2] = [BookingStatus::Pending, BookingStatus::Booked];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Booked => "booked",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ModelError> {
        match s {
            "pending" => Ok(Self::Pending),
            "booked" => Ok(Self::Booked),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Free,
    Pending,
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ModelError> {
        match s {
            "free" => Ok(Self::Free),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booking as it is written to the store; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
    pub offering_id: OfferingId,
    pub offering_kind: OfferingKind,
    pub title: String,
    pub host_name: String,
    pub slot: Slot,
    pub domain: String,
    pub price: u32,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub group_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewBooking {
    /// Snapshot `offering` for `identity` at `slot`.
    ///
    /// Free offerings are booked outright; paid ones start out pending until
    /// the payment is reconciled.
    pub fn snapshot(identity: &Identity, offering: &Offering, slot: Slot) -> Self {
        let (status, payment_status) = if offering.is_free() {
            (BookingStatus::Booked, PaymentStatus::Free)
        } else {
            (BookingStatus::Pending, PaymentStatus::Pending)
        };

        Self {
            user_id: identity.id.clone(),
            user_name: identity.label().to_string(),
            user_email: identity.email.clone(),
            offering_id: offering.id(),
            offering_kind: offering.kind(),
            title: offering.title().to_string(),
            host_name: offering.host_name().to_string(),
            slot,
            domain: offering.domain().to_string(),
            price: offering.price(),
            status,
            payment_status,
            group_link: offering.group_link().map(str::to_string),
            created_at: Utc::now(),
        }
    }
}

/// A persisted booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
    pub offering_id: OfferingId,
    pub offering_kind: OfferingKind,
    pub title: String,
    pub host_name: String,
    pub slot: Slot,
    pub domain: String,
    pub price: u32,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub group_link: Option<String>,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn from_new(id: BookingId, new: NewBooking) -> Self {
        Self {
            id,
            user_id: new.user_id,
            user_name: new.user_name,
            user_email: new.user_email,
            offering_id: new.offering_id,
            offering_kind: new.offering_kind,
            title: new.title,
            host_name: new.host_name,
            slot: new.slot,
            domain: new.domain,
            price: new.price,
            status: new.status,
            payment_status: new.payment_status,
            group_link: new.group_link,
            payment_reference: None,
            created_at: new.created_at,
            paid_at: None,
        }
    }

    pub fn is_awaiting_payment(&self) -> bool {
        self.status == BookingStatus::Pending
    }

    pub fn apply(&mut self, update: &BookingUpdate) {
        self.status = update.status;
        self.payment_status = update.payment_status;
        if update.payment_reference.is_some() {
            self.payment_reference = update.payment_reference.clone();
        }
        if update.paid_at.is_some() {
            self.paid_at = update.paid_at;
        }
    }
}

/// Fields changed by a status transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingUpdate {
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl BookingUpdate {
    pub fn payment_completed(reference: Option<String>, at: DateTime<Utc>) -> Self {
        Self {
            status: BookingStatus::Booked,
            payment_status: PaymentStatus::Completed,
            payment_reference: reference,
            paid_at: Some(at),
        }
    }
}
