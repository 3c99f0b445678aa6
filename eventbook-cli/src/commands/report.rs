use std::path::PathBuf;

use anyhow::{Result, bail};
use eventbook_core::event::parse_event_date;
use eventbook_core::query::ReportFilter;
use eventbook_core::report::{generate_batch_report, generate_event_report};
use owo_colors::OwoColorize;

use crate::app::App;
use crate::render::pluralize;
use crate::utils::tui;

pub async fn single(id: i64, out: Option<PathBuf>) -> Result<()> {
    let app = App::load()?;
    app.session()?;

    let Some(event) = app.manager.get(id) else {
        bail!("Event {} not found", id);
    };
    let options = app.config.report_options()?;
    let handles = app.manager.handles();

    let spinner = tui::create_spinner(format!("Generating report for {}", event.title));
    let result = generate_event_report(event, handles, &options).await;
    spinner.finish_and_clear();

    let report = result?;
    let written = report.write_to(&out_dir(out));
    report.release(handles);

    println!("{} Wrote {}", "✓".green(), written?.display());
    Ok(())
}

pub struct BatchArgs {
    pub from: Option<String>,
    pub to: Option<String>,
    pub coordinator: Option<String>,
    pub venue: Option<String>,
    pub department: Option<String>,
    pub out: Option<PathBuf>,
}

pub async fn batch(args: BatchArgs) -> Result<()> {
    let app = App::load()?;
    app.session()?;

    let filter = ReportFilter {
        from: args.from.as_deref().map(parse_event_date).transpose()?,
        to: args.to.as_deref().map(parse_event_date).transpose()?,
        coordinator: args.coordinator,
        venue: args.venue,
        department: args.department,
    };

    let events = filter.apply(app.manager.events());
    if events.is_empty() {
        println!("{}", "No events match these filters".dimmed());
        return Ok(());
    }

    let options = app.config.report_options()?;
    let handles = app.manager.handles();

    let spinner = tui::create_spinner(format!(
        "Generating report for {} {}",
        events.len(),
        pluralize("event", events.len())
    ));
    let result = generate_batch_report(&events, handles, &options).await;
    spinner.finish_and_clear();

    let report = result?;
    let written = report.write_to(&out_dir(args.out));
    report.release(handles);

    println!("{} Wrote {}", "✓".green(), written?.display());
    Ok(())
}

fn out_dir(out: Option<PathBuf>) -> PathBuf {
    out.unwrap_or_else(|| PathBuf::from("."))
}
