//! Fixed values shared across eventbook.

use std::time::Duration;

/// Categories seeded into an empty taxonomy.
pub const DEFAULT_CATEGORIES: &[&str] = &["Technical", "Cultural", "Sports"];

/// Event types seeded under each default category.
pub const DEFAULT_EVENT_TYPES: &[(&str, &[&str])] = &[
    (
        "Technical",
        &[
            "Hackathon",
            "Workshop",
            "Coding Competition",
            "Project Exhibition",
            "Technical Quiz",
            "Paper Presentation",
        ],
    ),
    (
        "Cultural",
        &["Dance", "Music", "Drama", "Fashion Show", "Art Exhibition", "Photography"],
    ),
    (
        "Sports",
        &["Cricket", "Football", "Basketball", "Volleyball", "Athletics", "Chess"],
    ),
];

pub const DEFAULT_DEPARTMENTS: &[&str] = &["CSE", "EEE", "ECE", "MECHANICAL", "CHEMICAL"];

/// Choice label shown next to taxonomy entries; never stored as an entry itself.
pub const OTHER_LABEL: &str = "Other";

/// Placeholder rendered in reports for absent optional fields.
pub const NOT_PROVIDED: &str = "Not provided";

pub const EVENTS_PER_PAGE: usize = 9;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Events dated further back than this are archived by the periodic sweep.
pub const DEFAULT_ARCHIVE_AFTER_YEARS: u32 = 2;

pub const DEFAULT_ARCHIVE_INTERVAL: &str = "30days";

pub const DEFAULT_CONVERSION_CONCURRENCY: usize = 4;

/// How long report generation waits for the logo before drawing without it.
pub const DEFAULT_LOGO_TIMEOUT: Duration = Duration::from_secs(10);

pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

pub const BATCH_REPORT_FILENAME: &str = "all-events-report.pdf";

pub const DATABASE_FILE: &str = "events.db";
pub const PENDING_FILE: &str = "pending.json";
pub const SESSION_FILE: &str = "session.json";
