use anyhow::{Context, Result};
use eventbook_core::config::EventBookConfig;
use eventbook_core::session::{Role, Session};
use owo_colors::OwoColorize;

use crate::app::current_session;
use crate::render::Render;

pub fn login(username: String, role: Role, password: Option<String>) -> Result<()> {
    let config = EventBookConfig::load()?;

    let password = match (role, password) {
        (Role::View, _) => None,
        (_, Some(p)) => Some(p),
        (_, None) => Some(prompt_password("Password")?),
    };

    let session = Session::login(&username, password.as_deref(), role)?;
    session.save(&config.session_path())?;

    println!("{} Logged in as {}", "✓".green(), session.render());
    Ok(())
}

pub fn logout() -> Result<()> {
    let config = EventBookConfig::load()?;
    if Session::clear(&config.session_path())? {
        println!("{}", "Logged out".dimmed());
    } else {
        println!("{}", "Not logged in".dimmed());
    }
    Ok(())
}

pub fn whoami() -> Result<()> {
    let config = EventBookConfig::load()?;
    let session = current_session(&config)?;
    println!("{}", session.render());
    Ok(())
}

/// Prompt the user for password input (hidden).
fn prompt_password(label: &str) -> Result<String> {
    let prompt = format!("{}: ", label);
    rpassword::prompt_password(&prompt).context("Failed to read password")
}
