//! User configuration at ~/.config/eventbook/config.toml

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DATABASE_FILE, DEFAULT_ARCHIVE_AFTER_YEARS, DEFAULT_ARCHIVE_INTERVAL,
    DEFAULT_CONVERSION_CONCURRENCY, DEFAULT_LOGO_TIMEOUT, PENDING_FILE, SESSION_FILE,
};
use crate::error::{EventBookError, EventBookResult};
use crate::report::ReportOptions;

static DEFAULT_DATA_DIR: &str = "~/.local/share/eventbook";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_archive_interval() -> String {
    DEFAULT_ARCHIVE_INTERVAL.to_string()
}

fn default_archive_after_years() -> u32 {
    DEFAULT_ARCHIVE_AFTER_YEARS
}

fn default_conversion_concurrency() -> usize {
    DEFAULT_CONVERSION_CONCURRENCY
}

fn default_institution() -> Vec<String> {
    vec![
        "Government College of Engineering".to_string(),
        "Department Event Records".to_string(),
    ]
}

fn default_tagline() -> Vec<String> {
    vec!["(An Autonomous Institution)".to_string()]
}

fn default_logo_timeout() -> String {
    humantime::format_duration(DEFAULT_LOGO_TIMEOUT).to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBookConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_archive_interval")]
    pub archive_interval: String,

    #[serde(default = "default_archive_after_years")]
    pub archive_after_years: u32,

    #[serde(default = "default_conversion_concurrency")]
    pub conversion_concurrency: usize,

    #[serde(default)]
    pub report: ReportConfig,
}

/// Letterhead settings under `[report]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_institution")]
    pub institution: Vec<String>,

    #[serde(default = "default_tagline")]
    pub tagline: Vec<String>,

    #[serde(default)]
    pub logo_path: Option<PathBuf>,

    #[serde(default = "default_logo_timeout")]
    pub logo_timeout: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            institution: default_institution(),
            tagline: default_tagline(),
            logo_path: None,
            logo_timeout: default_logo_timeout(),
        }
    }
}

impl Default for EventBookConfig {
    fn default() -> Self {
        EventBookConfig {
            data_dir: default_data_dir(),
            archive_interval: default_archive_interval(),
            archive_after_years: default_archive_after_years(),
            conversion_concurrency: default_conversion_concurrency(),
            report: ReportConfig::default(),
        }
    }
}

impl EventBookConfig {
    pub fn config_path() -> EventBookResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EventBookError::Config("Could not determine config directory".into()))?
            .join("eventbook");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user's config, writing a commented-out default file first if
    /// there is none. `EVENTBOOK_*` environment variables override the file.
    pub fn load() -> EventBookResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> EventBookResult<Self> {
        let config: EventBookConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("EVENTBOOK").separator("__"))
            .build()
            .map_err(|e| EventBookError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| EventBookError::Config(e.to_string()))?;

        config.archive_interval()?;
        config.logo_timeout()?;
        Ok(config)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> EventBookResult<()> {
        let contents = format!(
            "\
# eventbook configuration

# Where the event database, pending submissions and session live:
# data_dir = \"{}\"

# How often the archival sweep runs, and how old an event must be to be archived:
# archive_interval = \"{}\"
# archive_after_years = {}

# How many media files are read at once when saving an event:
# conversion_concurrency = {}

# [report]
# institution = [\"Government College of Engineering\", \"Department Event Records\"]
# tagline = [\"(An Autonomous Institution)\"]
# logo_path = \"~/Pictures/college-logo.png\"
# logo_timeout = \"{}\"
",
            DEFAULT_DATA_DIR,
            DEFAULT_ARCHIVE_INTERVAL,
            DEFAULT_ARCHIVE_AFTER_YEARS,
            DEFAULT_CONVERSION_CONCURRENCY,
            default_logo_timeout(),
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EventBookError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| EventBookError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// `data_dir` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        expand(&self.data_dir)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_path().join(DATABASE_FILE)
    }

    pub fn pending_path(&self) -> PathBuf {
        self.data_path().join(PENDING_FILE)
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_path().join(SESSION_FILE)
    }

    /// Time between archival sweeps. Must be non-zero.
    pub fn archive_interval(&self) -> EventBookResult<Duration> {
        let interval = parse_duration("archive_interval", &self.archive_interval)?;
        if interval.is_zero() {
            return Err(EventBookError::Config(
                "archive_interval must be greater than zero".into(),
            ));
        }
        Ok(interval)
    }

    pub fn logo_timeout(&self) -> EventBookResult<Duration> {
        parse_duration("report.logo_timeout", &self.report.logo_timeout)
    }

    pub fn report_options(&self) -> EventBookResult<ReportOptions> {
        Ok(ReportOptions {
            institution: self.report.institution.clone(),
            tagline: self.report.tagline.clone(),
            logo_path: self.report.logo_path.as_deref().map(expand),
            logo_timeout: self.logo_timeout()?,
        })
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

fn parse_duration(key: &str, value: &str) -> EventBookResult<Duration> {
    humantime::parse_duration(value)
        .map_err(|e| EventBookError::Config(format!("Invalid {} '{}': {}", key, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = EventBookConfig::load_from(&dir.path().join("missing.toml")).unwrap();

        assert_eq!(config.archive_after_years, 2);
        assert_eq!(config.conversion_concurrency, 4);
        assert_eq!(
            config.archive_interval().unwrap(),
            Duration::from_secs(30 * 24 * 60 * 60)
        );
        assert_eq!(config.logo_timeout().unwrap(), Duration::from_secs(10));
        assert!(config.report.logo_path.is_none());
    }

    #[test]
    fn generated_default_file_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eventbook").join("config.toml");
        EventBookConfig::create_default_config(&path).unwrap();

        let config = EventBookConfig::load_from(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(config.archive_interval, DEFAULT_ARCHIVE_INTERVAL);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "data_dir = \"/srv/eventbook\"\narchive_interval = \"1day\"\n\n[report]\ninstitution = [\"City College\"]\nlogo_timeout = \"2s\"\n",
        )
        .unwrap();

        let config = EventBookConfig::load_from(&path).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/srv/eventbook/events.db"));
        assert_eq!(config.pending_path(), PathBuf::from("/srv/eventbook/pending.json"));
        assert_eq!(config.archive_interval().unwrap(), Duration::from_secs(86_400));

        let options = config.report_options().unwrap();
        assert_eq!(options.institution, vec!["City College".to_string()]);
        assert_eq!(options.tagline, default_tagline());
        assert_eq!(options.logo_timeout, Duration::from_secs(2));
    }

    #[test]
    fn bad_durations_are_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "archive_interval = \"monthly\"\n").unwrap();

        assert!(matches!(
            EventBookConfig::load_from(&path),
            Err(EventBookError::Config(_))
        ));
    }

    #[test]
    fn zero_archive_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "archive_interval = \"0s\"\n").unwrap();

        assert!(matches!(
            EventBookConfig::load_from(&path),
            Err(EventBookError::Config(_))
        ));

        let config = EventBookConfig {
            archive_interval: "0s".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.archive_interval(),
            Err(EventBookError::Config(_))
        ));
    }

    #[test]
    fn tilde_is_expanded_in_data_path() {
        let config = EventBookConfig::default();
        assert!(!config.data_path().to_string_lossy().starts_with('~'));
        assert!(config.session_path().ends_with("eventbook/session.json"));
    }
}
