use anyhow::Result;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::Render;

pub fn run(id: i64, force: bool) -> Result<()> {
    let mut app = App::load()?;
    app.session()?.require_edit()?;

    let Some(event) = app.manager.get(id) else {
        println!("{}", format!("No event with id {}", id).dimmed());
        return Ok(());
    };

    // Confirm unless --force
    if !force {
        println!("{}", event.render());
        let confirmed = Confirm::new()
            .with_prompt("Delete this event?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    app.manager.delete_event(id)?;
    println!("{} Deleted event {}", "✓".green(), id);
    Ok(())
}
