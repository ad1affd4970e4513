//! CRUD operations for [`Offering`] records.

use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use mentora_shared::{
    MentorService, Offering, OfferingFilter, OfferingId, OfferingKind, SessionOffering, Slot,
    UserId,
};

use crate::database::Database;
use crate::error::{Result, StoreError};

const SELECT_COLUMNS: &str = "SELECT id, kind, title, host_id, host_name, date, time, domain,
        level, capacity, price, description, group_link
 FROM offerings";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new offering.
    pub fn create_offering(&self, offering: &Offering) -> Result<()> {
        let (host_id, date, time, level, description) = match offering {
            Offering::Session(s) => (
                None,
                Some(s.slot.date.to_string()),
                Some(s.slot.time_24h()),
                Some(s.level.as_str()),
                s.description.as_deref(),
            ),
            Offering::MentorService(m) => (Some(m.mentor_id.as_str()), None, None, None, None),
        };

        self.conn()
            .execute(
                "INSERT INTO offerings (id, kind, title, host_id, host_name, date, time, domain,
                                        level, capacity, price, description, group_link, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    offering.id().0.to_string(),
                    offering.kind().as_str(),
                    offering.title(),
                    host_id,
                    offering.host_name(),
                    date,
                    time,
                    offering.domain(),
                    level,
                    offering.capacity(),
                    offering.price(),
                    description,
                    offering.group_link(),
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(StoreError::from_write)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single offering by id.
    pub fn get_offering(&self, id: OfferingId) -> Result<Offering> {
        self.conn()
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.0.to_string()],
                row_to_offering,
            )
            .map_err(StoreError::from_lookup)
    }

    /// List offerings matching `filter`: dated offerings first by date and
    /// time, then open-schedule services by title.
    pub fn list_offerings(&self, filter: &OfferingFilter) -> Result<Vec<Offering>> {
        let mut stmt = self.conn().prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE (?1 IS NULL OR kind = ?1)
             ORDER BY date IS NULL, date ASC, time ASC, title ASC"
        ))?;

        let kind = filter.kind.map(|k| k.as_str());
        let rows = stmt.query_map(params![kind], row_to_offering)?;

        let mut offerings = Vec::new();
        for row in rows {
            let offering = row?;
            if filter.matches(&offering) {
                offerings.push(offering);
            }
        }
        Ok(offerings)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn conversion_failure<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

/// Map a `rusqlite::Row` to an [`Offering`].
fn row_to_offering(row: &rusqlite::Row<'_>) -> rusqlite::Result<Offering> {
    let id_str: String = row.get(0)?;
    let kind_str: String = row.get(1)?;
    let title: String = row.get(2)?;
    let host_id: Option<String> = row.get(3)?;
    let host_name: String = row.get(4)?;
    let date: Option<String> = row.get(5)?;
    let time: Option<String> = row.get(6)?;
    let domain: String = row.get(7)?;
    let level: Option<String> = row.get(8)?;
    let capacity: u32 = row.get(9)?;
    let price: u32 = row.get(10)?;
    let description: Option<String> = row.get(11)?;
    let group_link: Option<String> = row.get(12)?;

    let id = Uuid::parse_str(&id_str)
        .map(OfferingId)
        .map_err(|e| conversion_failure(0, e))?;
    let kind = OfferingKind::parse(&kind_str).map_err(|e| conversion_failure(1, e))?;

    let offering = match kind {
        OfferingKind::Session => {
            let slot = Slot::parse(
                date.as_deref().unwrap_or_default(),
                time.as_deref().unwrap_or_default(),
            )
            .map_err(|e| conversion_failure(5, e))?;
            Offering::Session(SessionOffering {
                id,
                title,
                instructor: host_name,
                slot,
                domain,
                level: level.unwrap_or_default(),
                capacity,
                price,
                description,
                group_link,
            })
        }
        OfferingKind::MentorService => Offering::MentorService(MentorService {
            id,
            title,
            mentor_id: UserId(host_id.unwrap_or_default()),
            mentor_name: host_name,
            domain,
            capacity,
            price,
            group_link,
        }),
    };

    Ok(offering)
}
