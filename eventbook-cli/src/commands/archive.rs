use anyhow::Result;
use chrono::Local;
use eventbook_core::archive::spawn_archiver;
use owo_colors::OwoColorize;
use tokio::sync::watch;

use crate::app::App;
use crate::render::pluralize;

/// Archive old events now, or with `watch` keep sweeping on the configured
/// interval until interrupted.
pub async fn run(watch_mode: bool) -> Result<()> {
    let mut app = App::load()?;
    app.session()?.require_admin()?;

    let years = app.config.archive_after_years;

    if !watch_mode {
        let count = app.manager.archive_sweep(Local::now().date_naive(), years)?;
        if count == 0 {
            println!("{}", "Nothing to archive".dimmed());
        } else {
            println!("{} Archived {} {}", "✓".green(), count, pluralize("event", count));
        }
        return Ok(());
    }

    let period = app.config.archive_interval()?;
    let manager = app.manager.into_shared();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = spawn_archiver(manager, period, years, shutdown_rx);

    println!(
        "Archiving events older than {} years every {} {}",
        years,
        humantime::format_duration(period),
        "(Ctrl-C to stop)".dimmed()
    );

    tokio::signal::ctrl_c().await?;
    let _ = shutdown_tx.send(true);
    task.await?;
    Ok(())
}
