//! Searching, filtering and paging over the in-memory event list.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::constants::OTHER_LABEL;
use crate::event::Event;

/// Events matching a free-text query, in input order.
///
/// A query equal to some event's venue selects exactly the events held at
/// that venue. Otherwise the query is a case-insensitive substring match over
/// the descriptive fields, coordinator, resource persons, time slot and the
/// dates written as `d/m/yyyy` or `dd/mm/yyyy`.
pub fn search<'a>(events: &'a [Event], query: &str) -> Vec<&'a Event> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return events.iter().collect();
    }

    let venue_matches = |e: &Event| {
        e.venue
            .as_deref()
            .is_some_and(|v| v.to_lowercase() == needle)
    };
    if events.iter().any(|e| venue_matches(e)) {
        return events.iter().filter(|e| venue_matches(e)).collect();
    }

    events.iter().filter(|e| matches_text(e, &needle)).collect()
}

fn matches_text(event: &Event, needle: &str) -> bool {
    let contains = |value: &str| value.to_lowercase().contains(needle);
    let contains_opt = |value: &Option<String>| value.as_deref().is_some_and(contains);

    contains(&event.title)
        || contains_opt(&event.description)
        || contains(&event.department)
        || contains_opt(&event.organizer)
        || contains(&event.event_type)
        || contains_opt(&event.academic_year)
        || contains(&date_forms(event.date))
        || event.end_date.is_some_and(|d| contains(&date_forms(d)))
        || contains_opt(&event.time_slot)
        || contains(&event.coordinator)
        || event.resource_persons.iter().any(|p| contains(p))
}

/// `d/m/yyyy dd/mm/yyyy`, so either spelling of a date is found.
fn date_forms(date: NaiveDate) -> String {
    format!(
        "{}/{}/{} {:02}/{:02}/{}",
        date.day(),
        date.month(),
        date.year(),
        date.day(),
        date.month(),
        date.year()
    )
}

/// Criteria for picking events into a batch report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub coordinator: Option<String>,
    pub venue: Option<String>,
    pub department: Option<String>,
}

impl ReportFilter {
    pub fn is_empty(&self) -> bool {
        *self == ReportFilter::default()
    }

    /// Date bounds are inclusive on the start date; text criteria are
    /// case-insensitive substring matches and ignored when blank.
    pub fn matches(&self, event: &Event) -> bool {
        if self.from.is_some_and(|from| event.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| event.date > to) {
            return false;
        }

        text_matches(&self.coordinator, Some(&event.coordinator))
            && text_matches(&self.venue, event.venue.as_ref())
            && text_matches(&self.department, Some(&event.department))
    }

    pub fn apply<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        events.iter().filter(|e| self.matches(e)).collect()
    }
}

fn text_matches(criterion: &Option<String>, value: Option<&String>) -> bool {
    let Some(criterion) = criterion.as_deref().map(str::trim).filter(|c| !c.is_empty()) else {
        return true;
    };
    value.is_some_and(|v| v.to_lowercase().contains(&criterion.to_lowercase()))
}

/// Number of pages needed for `total` items.
pub fn page_count(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page)
}

/// The 1-based `page` of `items`. Out-of-range pages are empty.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if page == 0 || per_page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = (start + per_page).min(items.len());
    &items[start..end]
}

/// Events per category for the dashboard.
///
/// Every known category appears, even with a zero count, alongside any
/// category only used by events. "Other" and blank names are left out.
pub fn category_counts(events: &[Event], known: &[String]) -> BTreeMap<String, usize> {
    let keep = |name: &str| !name.trim().is_empty() && name != OTHER_LABEL;

    let mut counts: BTreeMap<String, usize> = known
        .iter()
        .filter(|c| keep(c))
        .map(|c| (c.clone(), 0))
        .collect();

    for event in events.iter().filter(|e| keep(&e.category)) {
        *counts.entry(event.category.clone()).or_default() += 1;
    }
    counts
}
