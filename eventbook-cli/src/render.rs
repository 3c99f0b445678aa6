//! Terminal rendering for eventbook types.
//!
//! Extension traits that add colored output to eventbook-core types using
//! owo_colors.

use eventbook_core::constants::NOT_PROVIDED;
use eventbook_core::event::{Event, EventStatus};
use eventbook_core::pending::PendingEvent;
use eventbook_core::report::layout::{format_date, format_time_slot};
use eventbook_core::session::{Role, Session};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for EventStatus {
    fn render(&self) -> String {
        match self {
            EventStatus::Approved => self.to_string().green().to_string(),
            EventStatus::Pending => self.to_string().yellow().to_string(),
            EventStatus::Rejected => self.to_string().red().to_string(),
        }
    }
}

impl Render for Role {
    fn render(&self) -> String {
        match self {
            Role::Admin => self.to_string().magenta().to_string(),
            Role::Edit => self.to_string().cyan().to_string(),
            Role::View => self.to_string().dimmed().to_string(),
        }
    }
}

impl Render for Session {
    fn render(&self) -> String {
        format!("{} ({})", self.username.bold(), self.role.render())
    }
}

/// One-line summary used in lists.
impl Render for Event {
    fn render(&self) -> String {
        let mut line = format!(
            "{}  {}  {}",
            self.id.to_string().dimmed(),
            format_date(self.date),
            self.title.bold()
        );
        if !self.category.is_empty() {
            line.push_str(&format!("  {}", format!("[{}]", self.category).cyan()));
        }
        if let Some(venue) = &self.venue {
            line.push_str(&format!("  @ {}", venue));
        }
        if self.archived {
            line.push_str(&format!("  {}", "archived".dimmed()));
        }
        line
    }
}

impl Render for PendingEvent {
    fn render(&self) -> String {
        format!(
            "{}  {}  {}  {}",
            self.id.to_string().dimmed(),
            self.draft.start_date,
            self.draft.title.bold(),
            format!("by {} on {}", self.submitted_by, self.submitted_at.format("%d/%m/%Y")).dimmed()
        )
    }
}

/// Every field of an event, one per line.
pub fn render_details(event: &Event) -> String {
    let text = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_PROVIDED.to_string());
    let number = |v: Option<u32>| v.map_or_else(|| NOT_PROVIDED.to_string(), |n| n.to_string());

    let fields = [
        ("Document ID", event.document_id.clone()),
        ("Category", event.category.clone()),
        ("Event Type", event.event_type.clone()),
        ("Department", event.department.clone()),
        ("Venue", text(&event.venue)),
        ("Start Date", format_date(event.date)),
        (
            "End Date",
            event.end_date.map_or_else(|| NOT_PROVIDED.to_string(), format_date),
        ),
        (
            "Time Slot",
            event
                .time_slot
                .as_deref()
                .map_or_else(|| NOT_PROVIDED.to_string(), format_time_slot),
        ),
        ("Coordinator", event.coordinator.clone()),
        ("Team Members", text(&event.team_members)),
        ("Resource Persons", event.resource_persons.join(", ")),
        ("Organizer", text(&event.organizer)),
        ("Academic Year", text(&event.academic_year)),
        ("Participants", number(event.participants_count)),
        ("External", number(event.external_participants)),
        ("Sponsored By", text(&event.sponsored_by)),
        ("Financial Aid", text(&event.financial_assistance)),
        (
            "Total Expenses",
            event
                .total_expenses
                .map_or_else(|| NOT_PROVIDED.to_string(), |x| format!("Rs. {}", x)),
        ),
        ("Status", event.status.render()),
        ("Description", text(&event.description)),
    ];

    let mut lines = vec![event.title.bold().to_string()];
    for (label, value) in fields {
        let value = if value.is_empty() { NOT_PROVIDED.to_string() } else { value };
        lines.push(format!("   {:<16} {}", label.dimmed(), value));
    }

    if event.media.is_empty() {
        lines.push(format!("   {:<16} {}", "Media".dimmed(), NOT_PROVIDED));
    } else {
        lines.push(format!("   {}", "Media".dimmed()));
        for item in &event.media {
            lines.push(format!(
                "      {} {}",
                item.name,
                format!("({}, {} bytes)", item.mime_type, item.size).dimmed()
            ));
        }
    }

    lines.join("\n")
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
