use anyhow::Result;
use clap::Subcommand;
use owo_colors::OwoColorize;

use crate::app::App;

#[derive(Subcommand)]
pub enum CategoryCommand {
    /// List categories
    List,
    /// Add a category (admin only)
    Add { name: String },
}

#[derive(Subcommand)]
pub enum EventTypeCommand {
    /// List event types, optionally for one category
    List {
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Add an event type under a category (admin only)
    Add {
        #[arg(short, long)]
        category: String,
        name: String,
    },
}

#[derive(Subcommand)]
pub enum DepartmentCommand {
    /// List departments
    List,
    /// Add a department (admin only)
    Add { name: String },
}

pub fn category(command: CategoryCommand) -> Result<()> {
    let app = App::load()?;
    let session = app.session()?;
    let taxonomy = app.taxonomy()?;

    match command {
        CategoryCommand::List => print_names(&taxonomy.categories()?),
        CategoryCommand::Add { name } => {
            session.require_admin()?;
            let name = taxonomy.add_category(&name)?;
            println!("{} Added category {}", "✓".green(), name.bold());
        }
    }
    Ok(())
}

pub fn event_type(command: EventTypeCommand) -> Result<()> {
    let app = App::load()?;
    let session = app.session()?;
    let taxonomy = app.taxonomy()?;

    match command {
        EventTypeCommand::List { category: Some(category) } => {
            print_names(&taxonomy.event_types_for(&category)?)
        }
        EventTypeCommand::List { category: None } => {
            let types = taxonomy.event_types()?;
            let mut categories: Vec<&str> = Vec::new();
            for entry in &types {
                if !categories.contains(&entry.category.as_str()) {
                    categories.push(&entry.category);
                }
            }
            for category in categories {
                println!("{}", category.bold());
                for entry in types.iter().filter(|t| t.category == category) {
                    println!("   {}", entry.name);
                }
            }
        }
        EventTypeCommand::Add { category, name } => {
            session.require_admin()?;
            let name = taxonomy.add_event_type(&category, &name)?;
            println!(
                "{} Added event type {} under {}",
                "✓".green(),
                name.bold(),
                category
            );
        }
    }
    Ok(())
}

pub fn department(command: DepartmentCommand) -> Result<()> {
    let app = App::load()?;
    let session = app.session()?;
    let taxonomy = app.taxonomy()?;

    match command {
        DepartmentCommand::List => print_names(&taxonomy.departments()?),
        DepartmentCommand::Add { name } => {
            session.require_admin()?;
            let name = taxonomy.add_department(&name)?;
            println!("{} Added department {}", "✓".green(), name.bold());
        }
    }
    Ok(())
}

fn print_names(names: &[String]) {
    if names.is_empty() {
        println!("{}", "None".dimmed());
    }
    for name in names {
        println!("{}", name);
    }
}
