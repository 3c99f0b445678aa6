use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use dialoguer::Input;
use eventbook_core::event::{EventDraft, parse_event_date};
use eventbook_core::media::MediaItem;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::Render;
use crate::utils::tui;

/// Event fields accepted by `add` and `edit`.
#[derive(Args, Debug, Default)]
pub struct EventArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub event_type: Option<String>,

    #[arg(long)]
    pub department: Option<String>,

    #[arg(long)]
    pub venue: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(short, long)]
    pub start: Option<String>,

    /// End date (YYYY-MM-DD), not before the start
    #[arg(short, long)]
    pub end: Option<String>,

    /// e.g. "14:30" or "2:30 PM"
    #[arg(long)]
    pub time_slot: Option<String>,

    #[arg(long)]
    pub coordinator: Option<String>,

    #[arg(long)]
    pub team_members: Option<String>,

    /// Repeat for each resource person
    #[arg(long = "resource-person")]
    pub resource_persons: Vec<String>,

    #[arg(long)]
    pub participants: Option<u32>,

    #[arg(long)]
    pub external_participants: Option<u32>,

    #[arg(long)]
    pub sponsored_by: Option<String>,

    #[arg(long)]
    pub financial_assistance: Option<String>,

    /// Total expenses in rupees
    #[arg(long)]
    pub expenses: Option<f64>,

    #[arg(long)]
    pub organizer: Option<String>,

    /// e.g. "2023-24"
    #[arg(long)]
    pub academic_year: Option<String>,

    /// File to attach; repeat for several
    #[arg(long = "media")]
    pub media: Vec<PathBuf>,
}

impl EventArgs {
    /// Overwrite the fields of `draft` that were given on the command line.
    /// Media files are appended.
    pub fn apply(self, draft: &mut EventDraft) -> Result<()> {
        if let Some(v) = self.title {
            draft.title = v;
        }
        if let Some(v) = self.category {
            draft.category = v;
        }
        if let Some(v) = self.event_type {
            draft.event_type = v;
        }
        if let Some(v) = self.department {
            draft.department = v;
        }
        if let Some(v) = self.start {
            draft.start_date = v;
        }
        if let Some(v) = self.coordinator {
            draft.coordinator = v;
        }
        if !self.resource_persons.is_empty() {
            draft.resource_persons = self.resource_persons;
        }

        set(&mut draft.venue, self.venue);
        set(&mut draft.description, self.description);
        set(&mut draft.end_date, self.end);
        set(&mut draft.time_slot, self.time_slot);
        set(&mut draft.team_members, self.team_members);
        set(&mut draft.sponsored_by, self.sponsored_by);
        set(&mut draft.financial_assistance, self.financial_assistance);
        set(&mut draft.organizer, self.organizer);
        set(&mut draft.academic_year, self.academic_year);
        set(&mut draft.participants_count, self.participants);
        set(&mut draft.external_participants, self.external_participants);
        set(&mut draft.total_expenses, self.expenses);

        for path in self.media {
            let item = MediaItem::upload(&path, None)
                .with_context(|| format!("Cannot attach {}", path.display()))?;
            draft.media.push(item);
        }
        Ok(())
    }
}

fn set<T>(field: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *field = value;
    }
}

pub async fn run(args: EventArgs) -> Result<()> {
    let mut app = App::load()?;
    let session = app.session()?;
    session.require_edit()?;

    let interactive = args.title.is_none() || args.start.is_none();
    let mut draft = EventDraft::default();
    args.apply(&mut draft)?;

    if draft.title.trim().is_empty() {
        draft.title = Input::<String>::new()
            .with_prompt("  Title")
            .interact_text()?;
    }
    if draft.start_date.trim().is_empty() {
        draft.start_date = prompt_date("  Start date (YYYY-MM-DD)")?;
    }
    if interactive && draft.category.trim().is_empty() {
        draft.category = prompt_category(&app)?;
    }
    if interactive {
        println!();
    }

    if session.is_admin() {
        let spinner = tui::create_spinner("Saving event".to_string());
        let result = app.manager.add_event(draft, session.submission_status()).await;
        spinner.finish_and_clear();

        let event = result?;
        println!("{} Added {}", "✓".green(), event.render());
        if !event.media.is_empty() {
            println!("   {} media attached", event.media.len());
        }
    } else {
        let mut queue = app.pending()?;
        let entry = queue.submit(draft, &session.username)?;
        println!(
            "{} Submitted \"{}\" for admin approval {}",
            "✓".green(),
            entry.draft.title,
            format!("(pending id {})", entry.id).dimmed()
        );
    }

    Ok(())
}

/// Prompt until the input parses as a date.
fn prompt_date(prompt: &str) -> Result<String> {
    loop {
        let input: String = Input::new().with_prompt(prompt).interact_text()?;
        match parse_event_date(&input) {
            Ok(_) => return Ok(input),
            Err(e) => println!("  {}", e.to_string().red()),
        }
    }
}

fn prompt_category(app: &App) -> Result<String> {
    let categories = app.taxonomy()?.categories()?;
    let input: String = Input::new()
        .with_prompt(format!("  Category ({})", categories.join(", ")))
        .allow_empty(true)
        .interact_text()?;
    Ok(input)
}
