//! CRUD operations for [`Booking`] records.

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter};
use uuid::Uuid;

use mentora_shared::{
    Booking, BookingId, BookingStatus, BookingUpdate, NewBooking, OfferingId, OfferingKind,
    PaymentStatus, Slot, UserId,
};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::offerings::conversion_failure;

const SELECT_COLUMNS: &str = "SELECT id, user_id, user_name, user_email, offering_id,
        offering_kind, title, host_name, date, time, domain, price, status, payment_status,
        group_link, payment_reference, created_at, paid_at
 FROM bookings";

impl Database {
    /// Insert a booking and return its new id.
    ///
    /// A second active booking for the same (user, offering) is rejected by
    /// the schema with [`StoreError::Conflict`].
    pub fn create_booking(&self, booking: &NewBooking) -> Result<BookingId> {
        let id = BookingId::new();
        self.conn()
            .execute(
                "INSERT INTO bookings (id, user_id, user_name, user_email, offering_id,
                                       offering_kind, title, host_name, date, time, domain,
                                       price, status, payment_status, group_link, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    id.0.to_string(),
                    booking.user_id.as_str(),
                    booking.user_name,
                    booking.user_email,
                    booking.offering_id.0.to_string(),
                    booking.offering_kind.as_str(),
                    booking.title,
                    booking.host_name,
                    booking.slot.date.to_string(),
                    booking.slot.time_24h(),
                    booking.domain,
                    booking.price,
                    booking.status.as_str(),
                    booking.payment_status.as_str(),
                    booking.group_link,
                    booking.created_at.to_rfc3339(),
                ],
            )
            .map_err(StoreError::from_write)?;

        tracing::debug!(
            booking = %id,
            user = %booking.user_id,
            offering = %booking.offering_id,
            status = %booking.status,
            "booking created"
        );
        Ok(id)
    }

    pub fn get_booking(&self, id: BookingId) -> Result<Booking> {
        self.conn()
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.0.to_string()],
                row_to_booking,
            )
            .map_err(StoreError::from_lookup)
    }

    /// Bookings of `user` for `offering` whose status is one of `statuses`.
    pub fn find_bookings(
        &self,
        user: &UserId,
        offering: OfferingId,
        statuses: &[BookingStatus],
    ) -> Result<Vec<Booking>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "{SELECT_COLUMNS}
             WHERE user_id = ?1 AND offering_id = ?2 AND status IN ({})
             ORDER BY created_at ASC",
            placeholders(3, statuses.len())
        );

        let args = [user.as_str().to_string(), offering.0.to_string()]
            .into_iter()
            .chain(statuses.iter().map(|s| s.as_str().to_string()));

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), row_to_booking)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// All bookings of `user` with one of `statuses`, soonest first.
    pub fn list_user_bookings(
        &self,
        user: &UserId,
        statuses: &[BookingStatus],
    ) -> Result<Vec<Booking>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "{SELECT_COLUMNS}
             WHERE user_id = ?1 AND status IN ({})
             ORDER BY date ASC, time ASC",
            placeholders(2, statuses.len())
        );

        let args = std::iter::once(user.as_str().to_string())
            .chain(statuses.iter().map(|s| s.as_str().to_string()));

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), row_to_booking)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Apply a status transition. Unknown ids are [`StoreError::NotFound`].
    pub fn update_booking_status(&self, id: BookingId, update: &BookingUpdate) -> Result<()> {
        let affected = self
            .conn()
            .execute(
                "UPDATE bookings
                 SET status = ?2,
                     payment_status = ?3,
                     payment_reference = COALESCE(?4, payment_reference),
                     paid_at = COALESCE(?5, paid_at)
                 WHERE id = ?1",
                params![
                    id.0.to_string(),
                    update.status.as_str(),
                    update.payment_status.as_str(),
                    update.payment_reference,
                    update.paid_at.map(|t| t.to_rfc3339()),
                ],
            )
            .map_err(StoreError::from_write)?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::debug!(
            booking = %id,
            status = %update.status,
            payment = %update.payment_status,
            "booking updated"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `?first, ?first+1, ...` for `count` positional parameters.
fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_failure(idx, e))
}

/// Map a `rusqlite::Row` to a [`Booking`].
fn row_to_booking(row: &rusqlite::Row<'_>) -> rusqlite::Result<Booking> {
    let id_str: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let offering_str: String = row.get(4)?;
    let kind_str: String = row.get(5)?;
    let date: String = row.get(8)?;
    let time: String = row.get(9)?;
    let status_str: String = row.get(12)?;
    let payment_str: String = row.get(13)?;
    let created_str: String = row.get(16)?;
    let paid_str: Option<String> = row.get(17)?;

    let id = Uuid::parse_str(&id_str)
        .map(BookingId)
        .map_err(|e| conversion_failure(0, e))?;
    let offering_id = Uuid::parse_str(&offering_str)
        .map(OfferingId)
        .map_err(|e| conversion_failure(4, e))?;
    let offering_kind = OfferingKind::parse(&kind_str).map_err(|e| conversion_failure(5, e))?;
    let slot = Slot::parse(&date, &time).map_err(|e| conversion_failure(8, e))?;
    let status = BookingStatus::parse(&status_str).map_err(|e| conversion_failure(12, e))?;
    let payment_status =
        PaymentStatus::parse(&payment_str).map_err(|e| conversion_failure(13, e))?;
    let created_at = parse_timestamp(16, &created_str)?;
    let paid_at = paid_str
        .as_deref()
        .map(|s| parse_timestamp(17, s))
        .transpose()?;

    Ok(Booking {
        id,
        user_id: UserId(user_id),
        user_name: row.get(2)?,
        user_email: row.get(3)?,
        offering_id,
        offering_kind,
        title: row.get(6)?,
        host_name: row.get(7)?,
        slot,
        domain: row.get(10)?,
        price: row.get(11)?,
        status,
        payment_status,
        group_link: row.get(14)?,
        payment_reference: row.get(15)?,
        created_at,
        paid_at,
    })
}
