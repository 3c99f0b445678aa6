use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::{Render, pluralize};
use crate::utils::tui;

pub fn list() -> Result<()> {
    let app = App::load()?;
    app.session()?.require_edit()?;

    let queue = app.pending()?;
    if queue.list().is_empty() {
        println!("{}", "No events awaiting approval".dimmed());
        return Ok(());
    }

    for entry in queue.list() {
        println!("{}", entry.render());
    }
    println!();
    println!(
        "{}",
        format!(
            "{} {} awaiting approval",
            queue.list().len(),
            pluralize("event", queue.list().len())
        )
        .dimmed()
    );
    Ok(())
}

pub async fn approve(id: i64) -> Result<()> {
    let mut app = App::load()?;
    app.session()?.require_admin()?;

    let mut queue = app.pending()?;
    let spinner = tui::create_spinner("Approving".to_string());
    let result = app.manager.approve(&mut queue, id).await;
    spinner.finish_and_clear();

    let event = result?;
    println!("{} Approved {}", "✓".green(), event.render());
    Ok(())
}

pub fn reject(id: i64) -> Result<()> {
    let app = App::load()?;
    app.session()?.require_admin()?;

    let mut queue = app.pending()?;
    let entry = queue.reject(id)?;
    println!("{} Rejected \"{}\"", "✗".red(), entry.draft.title);
    Ok(())
}
