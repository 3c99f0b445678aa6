use anyhow::{Result, bail};
use eventbook_core::event::EventDraft;
use owo_colors::OwoColorize;

use super::add::EventArgs;
use crate::app::App;
use crate::render::Render;
use crate::utils::tui;

pub async fn run(id: i64, args: EventArgs, clear_media: bool) -> Result<()> {
    let mut app = App::load()?;
    app.session()?.require_edit()?;

    let Some(event) = app.manager.get(id) else {
        bail!("Event {} not found", id);
    };

    let mut draft = EventDraft::from(event);
    if clear_media {
        draft.media.clear();
    }
    args.apply(&mut draft)?;

    let spinner = tui::create_spinner(format!("Saving {}", event.title));
    let result = app.manager.update_event(id, draft).await;
    spinner.finish_and_clear();

    let updated = result?;
    println!("{} Updated {}", "✓".green(), updated.render());
    Ok(())
}
