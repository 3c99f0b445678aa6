//! Event records and the drafts the UI submits to create or edit them.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EventBookError, EventBookResult};
use crate::media::{MediaHandles, MediaItem};

/// Where an event sits in the approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    /// Records stored without a status predate the workflow and count as approved.
    #[default]
    Approved,
    Rejected,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            EventStatus::Pending => "pending",
            EventStatus::Approved => "approved",
            EventStatus::Rejected => "rejected",
        };
        write!(f, "{}", label)
    }
}

/// A recorded college event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub document_id: String,
    pub title: String,
    pub category: String,
    pub event_type: String,
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Start date.
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Free text such as "10:30" or "2:00 PM".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<String>,

    pub coordinator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_members: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_persons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_participants: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsored_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_assistance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_expenses: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,

    #[serde(default)]
    pub media: Vec<MediaItem>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub archived: bool,
}

impl Event {
    /// Build an event from an already validated draft.
    pub fn from_draft(
        id: i64,
        draft: EventDraft,
        dates: EventDates,
        media: Vec<MediaItem>,
        status: EventStatus,
    ) -> Self {
        Event {
            id,
            document_id: document_id_for(id, Utc::now().year()),
            title: draft.title.trim().to_string(),
            category: draft.category.trim().to_string(),
            event_type: draft.event_type.trim().to_string(),
            department: draft.department.trim().to_string(),
            venue: non_empty(draft.venue),
            description: non_empty(draft.description),
            date: dates.start,
            end_date: dates.end,
            time_slot: non_empty(draft.time_slot),
            coordinator: draft.coordinator.trim().to_string(),
            team_members: non_empty(draft.team_members),
            resource_persons: clean_names(draft.resource_persons),
            participants_count: draft.participants_count,
            external_participants: draft.external_participants,
            sponsored_by: non_empty(draft.sponsored_by),
            financial_assistance: non_empty(draft.financial_assistance),
            total_expenses: draft.total_expenses,
            organizer: non_empty(draft.organizer),
            academic_year: non_empty(draft.academic_year),
            media,
            status,
            archived: false,
        }
    }

    /// Apply an edited draft, keeping identity, status and archival state.
    pub fn revised(&self, draft: EventDraft, dates: EventDates, media: Vec<MediaItem>) -> Self {
        let mut revised = Event::from_draft(self.id, draft, dates, media, self.status);
        revised.document_id = self.document_id.clone();
        revised.archived = self.archived;
        revised
    }

    /// True when the event starts before `cutoff`.
    pub fn is_before(&self, cutoff: NaiveDate) -> bool {
        self.date < cutoff
    }

    /// Release every display handle held by this event's media.
    pub fn release_handles(&mut self, handles: &MediaHandles) {
        for item in &mut self.media {
            item.release_handle(handles);
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// `D<id>-<year>`, the identifier printed on reports.
pub fn document_id_for(id: i64, year: i32) -> String {
    format!("D{}-{}", id, year)
}

/// Next identifier: the current time in milliseconds, bumped past `last` so
/// identifiers stay strictly increasing.
pub fn next_id(last: Option<i64>) -> i64 {
    let now = Utc::now().timestamp_millis();
    match last {
        Some(last) if last >= now => last + 1,
        _ => now,
    }
}

// =============================================================================
// Drafts
// =============================================================================

/// Validated start/end pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventDates {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

/// Event fields as submitted by the UI, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventDraft {
    pub title: String,
    pub category: String,
    pub event_type: String,
    pub department: String,
    pub venue: Option<String>,
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub time_slot: Option<String>,
    pub coordinator: String,
    pub team_members: Option<String>,
    pub resource_persons: Vec<String>,
    pub participants_count: Option<u32>,
    pub external_participants: Option<u32>,
    pub sponsored_by: Option<String>,
    pub financial_assistance: Option<String>,
    pub total_expenses: Option<f64>,
    pub organizer: Option<String>,
    pub academic_year: Option<String>,
    pub media: Vec<MediaItem>,
}

impl EventDraft {
    /// Check the draft and return its normalized dates.
    pub fn validate(&self) -> EventBookResult<EventDates> {
        let start = parse_event_date(&self.start_date)?;

        let end = match self.end_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) => {
                let end = parse_event_date(s)?;
                if end < start {
                    return Err(EventBookError::Validation(format!(
                        "End date {} cannot be before start date {}",
                        end, start
                    )));
                }
                Some(end)
            }
        };

        if let Some(expenses) = self.total_expenses {
            if !expenses.is_finite() || expenses < 0.0 {
                return Err(EventBookError::Validation(format!(
                    "Total expenses must be a non-negative amount, got {}",
                    expenses
                )));
            }
        }

        Ok(EventDates { start, end })
    }
}

impl From<&Event> for EventDraft {
    fn from(event: &Event) -> Self {
        EventDraft {
            title: event.title.clone(),
            category: event.category.clone(),
            event_type: event.event_type.clone(),
            department: event.department.clone(),
            venue: event.venue.clone(),
            description: event.description.clone(),
            start_date: event.date.to_string(),
            end_date: event.end_date.map(|d| d.to_string()),
            time_slot: event.time_slot.clone(),
            coordinator: event.coordinator.clone(),
            team_members: event.team_members.clone(),
            resource_persons: event.resource_persons.clone(),
            participants_count: event.participants_count,
            external_participants: event.external_participants,
            sponsored_by: event.sponsored_by.clone(),
            financial_assistance: event.financial_assistance.clone(),
            total_expenses: event.total_expenses,
            organizer: event.organizer.clone(),
            academic_year: event.academic_year.clone(),
            media: event.media.clone(),
        }
    }
}

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp into a calendar date.
pub fn parse_event_date(s: &str) -> EventBookResult<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return Err(EventBookError::Validation("Date is required".into()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .map_err(|_| {
            EventBookError::Validation(format!(
                "Invalid date format '{}'. Expected YYYY-MM-DD",
                s
            ))
        })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft(start: &str, end: Option<&str>) -> EventDraft {
        EventDraft {
            title: "Hack Day".into(),
            category: "Technical".into(),
            start_date: start.into(),
            end_date: end.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn start_only_draft_is_valid() {
        let dates = draft("2024-03-01", None).validate().unwrap();
        assert_eq!(dates.start, ymd(2024, 3, 1));
        assert_eq!(dates.end, None);
    }

    #[test]
    fn blank_end_date_is_treated_as_absent() {
        let dates = draft("2024-03-01", Some("  ")).validate().unwrap();
        assert_eq!(dates.end, None);
    }

    #[test]
    fn same_day_end_is_valid() {
        let dates = draft("2024-03-01", Some("2024-03-01")).validate().unwrap();
        assert_eq!(dates.end, Some(ymd(2024, 3, 1)));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = draft("2024-03-05", Some("2024-03-01")).validate().unwrap_err();
        match err {
            EventBookError::Validation(msg) => assert!(msg.contains("before start"), "{msg}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_and_malformed_start_dates_are_rejected() {
        assert!(matches!(
            draft("", None).validate(),
            Err(EventBookError::Validation(_))
        ));
        assert!(matches!(
            draft("March 1st", None).validate(),
            Err(EventBookError::Validation(_))
        ));
    }

    #[test]
    fn rfc3339_start_is_normalized_to_date() {
        let dates = draft("2024-03-01T09:30:00+05:30", None).validate().unwrap();
        assert_eq!(dates.start, ymd(2024, 3, 1));
    }

    #[test]
    fn negative_expenses_are_rejected() {
        let mut d = draft("2024-03-01", None);
        d.total_expenses = Some(-10.0);
        assert!(matches!(d.validate(), Err(EventBookError::Validation(_))));
    }

    #[test]
    fn from_draft_trims_and_drops_blank_optionals() {
        let mut d = draft("2024-03-01", None);
        d.venue = Some("  ".into());
        d.description = Some(" Annual hackathon ".into());
        d.resource_persons = vec!["Dr. Rao".into(), "".into()];
        let dates = d.validate().unwrap();

        let event = Event::from_draft(42, d, dates, vec![], EventStatus::Approved);
        assert_eq!(event.venue, None);
        assert_eq!(event.description.as_deref(), Some("Annual hackathon"));
        assert_eq!(event.resource_persons, vec!["Dr. Rao".to_string()]);
        assert!(event.document_id.starts_with("D42-"));
        assert!(!event.archived);
    }

    #[test]
    fn revised_keeps_identity_and_status() {
        let d = draft("2024-03-01", None);
        let dates = d.validate().unwrap();
        let mut original = Event::from_draft(7, d, dates, vec![], EventStatus::Approved);
        original.archived = true;

        let mut edit = EventDraft::from(&original);
        edit.title = "Hack Night".into();
        let dates = edit.validate().unwrap();
        let revised = original.revised(edit, dates, vec![]);

        assert_eq!(revised.id, 7);
        assert_eq!(revised.document_id, original.document_id);
        assert_eq!(revised.title, "Hack Night");
        assert!(revised.archived);
    }

    #[test]
    fn next_id_is_strictly_increasing() {
        let far_future = Utc::now().timestamp_millis() + 1_000_000;
        assert_eq!(next_id(Some(far_future)), far_future + 1);
        assert!(next_id(None) > 0);
    }

    #[test]
    fn serialized_event_uses_stored_field_names() {
        let d = draft("2024-03-01", Some("2024-03-02"));
        let dates = d.validate().unwrap();
        let event = Event::from_draft(1, d, dates, vec![], EventStatus::Approved);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["endDate"], "2024-03-02");
        assert_eq!(json["eventType"], "");
        assert_eq!(json["status"], "approved");
        assert!(json.get("venue").is_none());
    }
}
