use anyhow::Result;
use eventbook_core::query::category_counts;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::{Render, pluralize};

/// Events shown under "Recent".
const RECENT: usize = 5;

pub fn run() -> Result<()> {
    let app = App::load()?;
    let session = app.session()?;

    let events = app.manager.events();
    let active = events.iter().filter(|e| !e.archived).count();
    let archived = events.len() - active;

    println!("{}", session.render());
    println!();
    println!(
        "{} {}  {}",
        active.to_string().bold(),
        pluralize("event", active),
        format!("({} archived)", archived).dimmed()
    );

    if session.can_edit() {
        let pending = app.pending()?.list().len();
        if pending > 0 {
            println!(
                "{} {} awaiting approval",
                pending.to_string().yellow(),
                pluralize("event", pending)
            );
        }
    }

    let categories = app.taxonomy()?.categories()?;
    let counts = category_counts(events, &categories);
    if !counts.is_empty() {
        println!();
        println!("{}", "By category".dimmed());
        for (category, count) in &counts {
            println!("   {:<20} {}", category, count);
        }
    }

    let mut recent: Vec<_> = events.iter().filter(|e| !e.archived).collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    if !recent.is_empty() {
        println!();
        println!("{}", "Recent".dimmed());
        for event in recent.into_iter().take(RECENT) {
            println!("   {}", event.render());
        }
    }

    Ok(())
}
