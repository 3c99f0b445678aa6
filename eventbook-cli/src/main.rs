mod app;
mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use eventbook_core::session::Role;
use tracing_subscriber::EnvFilter;

use commands::add::EventArgs;
use commands::report::BatchArgs;
use commands::taxonomy::{CategoryCommand, DepartmentCommand, EventTypeCommand};

#[derive(Parser)]
#[command(name = "eventbook")]
#[command(about = "Record college events, approve submissions and generate PDF reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a session
    Login {
        username: String,

        /// view, edit or admin
        #[arg(short, long, default_value = "view")]
        role: Role,

        /// Prompted for when omitted and the role needs one
        #[arg(short, long)]
        password: Option<String>,
    },
    Logout,
    Whoami,
    /// List events, nine per page
    List {
        /// Match title, dates, venue, department, coordinator and more
        #[arg(short, long)]
        search: Option<String>,

        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Show archived events instead of current ones
        #[arg(long)]
        archived: bool,
    },
    Show {
        id: i64,
    },
    /// Add an event (admins save directly, editors submit for approval)
    Add {
        #[command(flatten)]
        fields: EventArgs,
    },
    Edit {
        id: i64,

        #[command(flatten)]
        fields: EventArgs,

        /// Drop existing attachments before adding --media files
        #[arg(long)]
        clear_media: bool,
    },
    Delete {
        id: i64,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Review submissions awaiting approval
    Pending {
        #[command(subcommand)]
        command: PendingCommand,
    },
    /// PDF report for one event
    Report {
        id: i64,

        /// Directory to write the PDF into (default: current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// One PDF covering every event that matches the filters
    ReportAll {
        /// Earliest start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Latest start date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        #[arg(long)]
        coordinator: Option<String>,

        #[arg(long)]
        venue: Option<String>,

        #[arg(long)]
        department: Option<String>,

        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    Dashboard,
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },
    EventType {
        #[command(subcommand)]
        command: EventTypeCommand,
    },
    Department {
        #[command(subcommand)]
        command: DepartmentCommand,
    },
    /// Archive events older than the configured age
    Archive {
        /// Keep running and sweep on the configured interval
        #[arg(long)]
        watch: bool,
    },
}

#[derive(Subcommand)]
enum PendingCommand {
    List,
    Approve { id: i64 },
    Reject { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("EVENTBOOK_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Login {
            username,
            role,
            password,
        } => commands::session::login(username, role, password),
        Commands::Logout => commands::session::logout(),
        Commands::Whoami => commands::session::whoami(),
        Commands::List {
            search,
            page,
            archived,
        } => commands::list::run(search, page, archived),
        Commands::Show { id } => commands::list::show(id),
        Commands::Add { fields } => commands::add::run(fields).await,
        Commands::Edit {
            id,
            fields,
            clear_media,
        } => commands::edit::run(id, fields, clear_media).await,
        Commands::Delete { id, force } => commands::delete::run(id, force),
        Commands::Pending { command } => match command {
            PendingCommand::List => commands::pending::list(),
            PendingCommand::Approve { id } => commands::pending::approve(id).await,
            PendingCommand::Reject { id } => commands::pending::reject(id),
        },
        Commands::Report { id, out } => commands::report::single(id, out).await,
        Commands::ReportAll {
            from,
            to,
            coordinator,
            venue,
            department,
            out,
        } => {
            commands::report::batch(BatchArgs {
                from,
                to,
                coordinator,
                venue,
                department,
                out,
            })
            .await
        }
        Commands::Dashboard => commands::dashboard::run(),
        Commands::Category { command } => commands::taxonomy::category(command),
        Commands::EventType { command } => commands::taxonomy::event_type(command),
        Commands::Department { command } => commands::taxonomy::department(command),
        Commands::Archive { watch } => commands::archive::run(watch).await,
    }
}
