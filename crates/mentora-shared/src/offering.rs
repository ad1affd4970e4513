//! Bookable offerings: fixed-schedule sessions and open-schedule mentor
//! services.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::types::{OfferingId, UserId};

/// Domain value that disables domain filtering.
pub const ALL_DOMAINS: &str = "All";

/// Umbrella domain shown in the sidebar that covers several stored domains.
const WEB_DEVELOPMENT: &str = "Web Development";
const WEB_DEVELOPMENT_MEMBERS: [&str; 2] =
    ["Front End Development", "Python Full Stack Development"];

/// A calendar date plus a wall-clock start time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl Slot {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    /// Parse an ISO date (`2026-10-19`) and a 24-hour time (`18:30`).
    pub fn parse(date: &str, time: &str) -> Result<Self, ModelError> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| ModelError::InvalidDate(date.to_string()))?;
        let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
            .map_err(|_| ModelError::InvalidTime(time.to_string()))?;
        Ok(Self { date, time })
    }

    /// `HH:MM`, the format offerings and bookings are stored with.
    pub fn time_24h(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OfferingKind {
    Session,
    MentorService,
}

impl OfferingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::MentorService => "mentor_service",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ModelError> {
        match s {
            "session" => Ok(Self::Session),
            "mentor_service" => Ok(Self::MentorService),
            other => Err(ModelError::UnknownKind(other.to_string())),
        }
    }
}

/// A scheduled group session run by an instructor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionOffering {
    pub id: OfferingId,
    pub title: String,
    pub instructor: String,
    pub slot: Slot,
    pub domain: String,
    pub level: String,
    pub capacity: u32,
    /// Whole rupees; zero means free.
    pub price: u32,
    pub description: Option<String>,
    pub group_link: Option<String>,
}

/// A one-to-one service listed by a mentor. The booker picks the slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MentorService {
    pub id: OfferingId,
    pub title: String,
    pub mentor_id: UserId,
    pub mentor_name: String,
    pub domain: String,
    pub capacity: u32,
    /// Whole rupees; zero means free.
    pub price: u32,
    pub group_link: Option<String>,
}

/// Anything a user can book.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Offering {
    Session(SessionOffering),
    MentorService(MentorService),
}

impl Offering {
    pub fn id(&self) -> OfferingId {
        match self {
            Self::Session(s) => s.id,
            Self::MentorService(m) => m.id,
        }
    }

    pub fn kind(&self) -> OfferingKind {
        match self {
            Self::Session(_) => OfferingKind::Session,
            Self::MentorService(_) => OfferingKind::MentorService,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Session(s) => &s.title,
            Self::MentorService(m) => &m.title,
        }
    }

    /// Instructor of a session or mentor behind a service.
    pub fn host_name(&self) -> &str {
        match self {
            Self::Session(s) => &s.instructor,
            Self::MentorService(m) => &m.mentor_name,
        }
    }

    pub fn domain(&self) -> &str {
        match self {
            Self::Session(s) => &s.domain,
            Self::MentorService(m) => &m.domain,
        }
    }

    pub fn capacity(&self) -> u32 {
        match self {
            Self::Session(s) => s.capacity,
            Self::MentorService(m) => m.capacity,
        }
    }

    pub fn price(&self) -> u32 {
        match self {
            Self::Session(s) => s.price,
            Self::MentorService(m) => m.price,
        }
    }

    pub fn is_free(&self) -> bool {
        self.price() == 0
    }

    pub fn group_link(&self) -> Option<&str> {
        let link = match self {
            Self::Session(s) => s.group_link.as_deref(),
            Self::MentorService(m) => m.group_link.as_deref(),
        };
        link.filter(|l| !l.trim().is_empty())
    }

    /// The schedule fixed by the offering itself, if any.
    pub fn fixed_slot(&self) -> Option<Slot> {
        match self {
            Self::Session(s) => Some(s.slot),
            Self::MentorService(_) => None,
        }
    }
}

/// Listing filter used by the sessions and mentors pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OfferingFilter {
    /// `None` or `"All"` matches every domain.
    pub domain: Option<String>,
    pub kind: Option<OfferingKind>,
    /// Hide fixed-schedule offerings dated before this day.
    pub upcoming_from: Option<NaiveDate>,
}

impl OfferingFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn kind(mut self, kind: OfferingKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn upcoming_from(mut self, day: NaiveDate) -> Self {
        self.upcoming_from = Some(day);
        self
    }

    pub fn matches(&self, offering: &Offering) -> bool {
        if let Some(kind) = self.kind {
            if offering.kind() != kind {
                return false;
            }
        }

        if let (Some(cutoff), Some(slot)) = (self.upcoming_from, offering.fixed_slot()) {
            if slot.date < cutoff {
                return false;
            }
        }

        match self.domain.as_deref() {
            None | Some(ALL_DOMAINS) => true,
            Some(WEB_DEVELOPMENT) => {
                offering.domain() == WEB_DEVELOPMENT
                    || WEB_DEVELOPMENT_MEMBERS.contains(&offering.domain())
            }
            Some(domain) => offering.domain() == domain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(domain: &str, date: &str, price: u32) -> Offering {
        Offering::Session(SessionOffering {
            id: OfferingId::new(),
            title: "Intro to VLSI".into(),
            instructor: "Dr. Iyer".into(),
            slot: Slot::parse(date, "18:30").unwrap(),
            domain: domain.into(),
            level: "Beginner".into(),
            capacity: 40,
            price,
            description: None,
            group_link: Some("https://chat.whatsapp.com/abc".into()),
        })
    }

    fn service(domain: &str) -> Offering {
        Offering::MentorService(MentorService {
            id: OfferingId::new(),
            title: "Resume review".into(),
            mentor_id: UserId::new("mentor-1"),
            mentor_name: "Kavya".into(),
            domain: domain.into(),
            capacity: 1,
            price: 499,
            group_link: Some("   ".into()),
        })
    }

    #[test]
    fn slot_parse_and_format() {
        let slot = Slot::parse("2026-10-19", "18:05").unwrap();
        assert_eq!(slot.time_24h(), "18:05");
        assert!(Slot::parse("19/10/2026", "18:05").is_err());
        assert!(Slot::parse("2026-10-19", "6pm").is_err());
    }

    #[test]
    fn accessors_cover_both_variants() {
        let s = session("VLSI", "2026-10-20", 0);
        assert!(s.is_free());
        assert_eq!(s.kind(), OfferingKind::Session);
        assert_eq!(s.host_name(), "Dr. Iyer");
        assert!(s.fixed_slot().is_some());
        assert_eq!(s.group_link(), Some("https://chat.whatsapp.com/abc"));

        let m = service("Tech");
        assert!(!m.is_free());
        assert_eq!(m.host_name(), "Kavya");
        assert!(m.fixed_slot().is_none());
        assert_eq!(m.group_link(), None);
    }

    #[test]
    fn web_development_covers_member_domains() {
        let filter = OfferingFilter::all().domain("Web Development");
        assert!(filter.matches(&session("Front End Development", "2026-10-20", 0)));
        assert!(filter.matches(&session("Python Full Stack Development", "2026-10-20", 0)));
        assert!(!filter.matches(&session("VLSI", "2026-10-20", 0)));
    }

    #[test]
    fn all_domain_matches_everything() {
        let filter = OfferingFilter::all().domain(ALL_DOMAINS);
        assert!(filter.matches(&session("VLSI", "2026-10-20", 0)));
        assert!(filter.matches(&service("Design")));
    }

    #[test]
    fn upcoming_cutoff_only_applies_to_fixed_slots() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let filter = OfferingFilter::all().upcoming_from(today);
        assert!(!filter.matches(&session("VLSI", "2026-10-18", 0)));
        assert!(filter.matches(&session("VLSI", "2026-10-19", 0)));
        assert!(filter.matches(&service("Tech")));
    }

    #[test]
    fn kind_filter() {
        let filter = OfferingFilter::all().kind(OfferingKind::MentorService);
        assert!(filter.matches(&service("Tech")));
        assert!(!filter.matches(&session("VLSI", "2026-10-20", 0)));
    }

    #[test]
    fn offering_json_is_tagged() {
        let json = serde_json::to_value(service("Tech")).unwrap();
        assert_eq!(json["kind"], "mentor_service");
        assert_eq!(OfferingKind::parse("session").unwrap(), OfferingKind::Session);
        assert!(OfferingKind::parse("webinar").is_err());
    }
}
