use anyhow::{Result, bail};
use eventbook_core::constants::EVENTS_PER_PAGE;
use eventbook_core::query::{page_count, paginate, search};
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::{Render, pluralize, render_details};

pub fn run(search_query: Option<String>, page: usize, archived: bool) -> Result<()> {
    let app = App::load()?;
    app.session()?;

    let matched = search(app.manager.events(), search_query.as_deref().unwrap_or(""));
    let visible: Vec<_> = matched
        .into_iter()
        .filter(|e| e.archived == archived)
        .collect();

    if visible.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    let pages = page_count(visible.len(), EVENTS_PER_PAGE);
    if page == 0 || page > pages {
        bail!("Page {} out of range (1-{})", page, pages);
    }

    for event in paginate(&visible, page, EVENTS_PER_PAGE) {
        println!("{}", event.render());
    }

    println!();
    println!(
        "{}",
        format!(
            "Page {} of {} ({} {})",
            page,
            pages,
            visible.len(),
            pluralize("event", visible.len())
        )
        .dimmed()
    );
    Ok(())
}

pub fn show(id: i64) -> Result<()> {
    let app = App::load()?;
    app.session()?;

    let Some(event) = app.manager.get(id) else {
        bail!("Event {} not found", id);
    };
    println!("{}", render_details(event));
    Ok(())
}
