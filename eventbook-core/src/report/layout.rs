//! What goes on a report page, independent of how it is drawn.

use chrono::{Datelike, NaiveDate};
use printpdf::image_crate::DynamicImage;

use crate::constants::NOT_PROVIDED;
use crate::event::Event;
use crate::media::MediaItem;

pub const HEADING: &str = "EVENT DETAILS";

/// Institution block at the top of every page.
#[derive(Debug, Clone, Default)]
pub struct Letterhead {
    pub institution: Vec<String>,
    pub tagline: Vec<String>,
    /// Decoded logo, or `None` for the text-only fallback.
    pub logo: Option<DynamicImage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub field: &'static str,
    pub value: String,
}

/// A clickable attachment name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLink {
    pub label: String,
    /// Handle URL the link points at, if the item has one.
    pub target: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReportPage {
    pub letterhead: Letterhead,
    pub heading: String,
    pub rows: Vec<ReportRow>,
    pub media: Vec<MediaLink>,
}

impl ReportPage {
    pub fn value_of(&self, field: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.field == field)
            .map(|row| row.value.as_str())
    }
}

/// Lay out one event. `link_target` picks the handle each media item links to.
pub fn build_page(
    event: &Event,
    letterhead: Letterhead,
    mut link_target: impl FnMut(&MediaItem) -> Option<String>,
) -> ReportPage {
    let media: Vec<MediaLink> = event
        .media
        .iter()
        .enumerate()
        .map(|(i, item)| MediaLink {
            label: media_label(i, item),
            target: link_target(item),
        })
        .collect();

    let media_names = if media.is_empty() {
        None
    } else {
        Some(
            media
                .iter()
                .map(|link| link.label.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        )
    };

    let resource_persons = if event.resource_persons.is_empty() {
        None
    } else {
        Some(event.resource_persons.join(", "))
    };

    let rows = vec![
        row("Document ID", Some(event.document_id.clone())),
        row("Event Title", Some(event.title.clone())),
        row("Category", Some(event.category.clone())),
        row("Event Type", Some(event.event_type.clone())),
        row("Department", Some(event.department.clone())),
        row("Venue", event.venue.clone()),
        row("Start Date", Some(format_date(event.date))),
        row("End Date", event.end_date.map(format_date)),
        row("Time Slot", event.time_slot.as_deref().map(format_time_slot)),
        row("Coordinator", Some(event.coordinator.clone())),
        row("Team Members", event.team_members.clone()),
        row("Resource Persons", resource_persons),
        row("Participants Count", event.participants_count.map(|n| n.to_string())),
        row(
            "External Participants",
            event.external_participants.map(|n| n.to_string()),
        ),
        row("Sponsored By", event.sponsored_by.clone()),
        row("Financial Assistance", event.financial_assistance.clone()),
        row("Total Expenses", event.total_expenses.map(format_expenses)),
        row("Description", event.description.clone()),
        row("Media", media_names),
    ];

    ReportPage {
        letterhead,
        heading: HEADING.to_string(),
        rows,
        media,
    }
}

fn row(field: &'static str, value: Option<String>) -> ReportRow {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_PROVIDED.to_string());
    ReportRow { field, value }
}

fn media_label(index: usize, item: &MediaItem) -> String {
    let name = item.name.trim();
    if name.is_empty() {
        format!("{}. Media {}", index + 1, index + 1)
    } else {
        format!("{}. {}", index + 1, name)
    }
}

/// `dd/mm/yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    format!("{:02}/{:02}/{}", date.day(), date.month(), date.year())
}

/// Turn a 24-hour `HH:MM` slot into `h:MM AM/PM`. Anything already marked
/// AM/PM, or not in that shape, is returned as written.
pub fn format_time_slot(slot: &str) -> String {
    let slot = slot.trim();
    let upper = slot.to_ascii_uppercase();
    if upper.contains("AM") || upper.contains("PM") {
        return slot.to_string();
    }

    let Some((hours, minutes)) = slot.split_once(':') else {
        return slot.to_string();
    };
    let Ok(hour) = hours.trim().parse::<u32>() else {
        return slot.to_string();
    };
    if hour > 23 {
        return slot.to_string();
    }

    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{} {}", hour12, minutes.trim(), suffix)
}

pub fn format_expenses(amount: f64) -> String {
    format!("Rs. {}", amount)
}

/// Greedy word wrap to at most `width` characters per line.
///
/// Words longer than `width` are split. Existing line breaks are kept.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let line_len = line.chars().count();
            if !line.is_empty() && line_len + 1 + word.len() > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.extend(word);
        }
        lines.push(line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventDraft, EventStatus};
    use crate::media::{MediaSource, encode_data_url};

    const FIELD_ORDER: [&str; 19] = [
        "Document ID",
        "Event Title",
        "Category",
        "Event Type",
        "Department",
        "Venue",
        "Start Date",
        "End Date",
        "Time Slot",
        "Coordinator",
        "Team Members",
        "Resource Persons",
        "Participants Count",
        "External Participants",
        "Sponsored By",
        "Financial Assistance",
        "Total Expenses",
        "Description",
        "Media",
    ];

    fn hack_day() -> Event {
        let draft = EventDraft {
            title: "Hack Day".into(),
            category: "Technical".into(),
            start_date: "2024-03-01".into(),
            coordinator: "Prof. Iyer".into(),
            ..Default::default()
        };
        let dates = draft.validate().unwrap();
        Event::from_draft(1709251200000, draft, dates, vec![], EventStatus::Approved)
    }

    #[test]
    fn zero_media_renders_placeholder_and_no_links() {
        let page = build_page(&hack_day(), Letterhead::default(), |_| {
            panic!("no media to link")
        });

        assert_eq!(page.value_of("Media"), Some(NOT_PROVIDED));
        assert!(page.media.is_empty());
    }

    #[test]
    fn rows_follow_fixed_order_whatever_is_filled() {
        let sparse = build_page(&hack_day(), Letterhead::default(), |_| None);

        let mut full_event = hack_day();
        full_event.venue = Some("Main Hall".into());
        full_event.total_expenses = Some(1250.5);
        full_event.resource_persons = vec!["Dr. Rao".into(), "Ms. Sen".into()];
        let full = build_page(&full_event, Letterhead::default(), |_| None);

        for page in [&sparse, &full] {
            let fields: Vec<&str> = page.rows.iter().map(|r| r.field).collect();
            assert_eq!(fields, FIELD_ORDER);
        }
        assert_eq!(sparse.value_of("Venue"), Some(NOT_PROVIDED));
        assert_eq!(full.value_of("Venue"), Some("Main Hall"));
        assert_eq!(full.value_of("Total Expenses"), Some("Rs. 1250.5"));
        assert_eq!(full.value_of("Resource Persons"), Some("Dr. Rao, Ms. Sen"));
    }

    #[test]
    fn dates_render_day_first() {
        let mut event = hack_day();
        event.end_date = NaiveDate::from_ymd_opt(2024, 3, 2);
        let page = build_page(&event, Letterhead::default(), |_| None);

        assert_eq!(page.value_of("Start Date"), Some("01/03/2024"));
        assert_eq!(page.value_of("End Date"), Some("02/03/2024"));
    }

    #[test]
    fn media_links_use_the_chosen_target() {
        let mut event = hack_day();
        event.media = vec![MediaItem {
            name: "poster.png".into(),
            mime_type: "image/png".into(),
            size: 1,
            source: MediaSource::Durable(encode_data_url("image/png", &[1])),
            handle: None,
        }];
        let page = build_page(&event, Letterhead::default(), |_| {
            Some("blob:eventbook/fresh".into())
        });

        assert_eq!(
            page.media,
            vec![MediaLink {
                label: "1. poster.png".into(),
                target: Some("blob:eventbook/fresh".into()),
            }]
        );
        assert_eq!(page.value_of("Media"), Some("1. poster.png"));
    }

    #[test]
    fn time_slots_become_twelve_hour() {
        assert_eq!(format_time_slot("14:30"), "2:30 PM");
        assert_eq!(format_time_slot("00:15"), "12:15 AM");
        assert_eq!(format_time_slot("12:00"), "12:00 PM");
        assert_eq!(format_time_slot("9:45"), "9:45 AM");
        assert_eq!(format_time_slot("10:30 am"), "10:30 am");
        assert_eq!(format_time_slot("Morning"), "Morning");
    }

    #[test]
    fn wrap_breaks_on_words_and_splits_long_ones() {
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("a\nb", 10), vec!["a", "b"]);
        assert_eq!(wrap("", 10), vec![""]);
    }
}
