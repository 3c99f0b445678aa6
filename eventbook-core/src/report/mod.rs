//! PDF reports for one event or a batch of events.
//!
//! Pages are first laid out by [`layout::build_page`] and then drawn by
//! [`render::render_pages`]. Media links point at display handles; any
//! handle allocated just for a report is carried in [`Report::handles`] and
//! must be released with [`Report::release`] once the document is done with.

pub mod layout;
pub mod render;

use std::path::{Path, PathBuf};
use std::time::Duration;

use printpdf::image_crate::{self, DynamicImage};
use tracing::{debug, warn};

use crate::constants::{BATCH_REPORT_FILENAME, DEFAULT_LOGO_TIMEOUT};
use crate::error::{EventBookError, EventBookResult};
use crate::event::Event;
use crate::media::{MediaHandles, MediaItem};
use layout::{Letterhead, ReportPage, build_page};

/// Letterhead settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub institution: Vec<String>,
    pub tagline: Vec<String>,
    pub logo_path: Option<PathBuf>,
    pub logo_timeout: Duration,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            institution: Vec::new(),
            tagline: Vec::new(),
            logo_path: None,
            logo_timeout: DEFAULT_LOGO_TIMEOUT,
        }
    }
}

/// A finished document.
#[derive(Debug)]
pub struct Report {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Handles allocated as link targets for this document.
    pub handles: Vec<String>,
}

impl Report {
    /// Free the handles allocated for this report's links.
    pub fn release(self, handles: &MediaHandles) {
        handles.release_all(&self.handles);
    }

    /// Write the document into `dir` under its filename.
    pub fn write_to(&self, dir: &Path) -> EventBookResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        let temp = dir.join(format!(".{}.tmp", self.filename));
        std::fs::write(&temp, &self.bytes)?;
        std::fs::rename(&temp, &path)?;
        Ok(path)
    }
}

/// `<documentId>-<title>.pdf`, with every non-alphanumeric title character
/// replaced by `_`.
pub fn report_filename(event: &Event) -> String {
    let title: String = event
        .title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}-{}.pdf", event.document_id, title)
}

pub async fn generate_event_report(
    event: &Event,
    handles: &MediaHandles,
    options: &ReportOptions,
) -> EventBookResult<Report> {
    let mut allocated = Vec::new();
    let letterhead = load_letterhead(options).await;
    let page = build_page(event, letterhead, |item| link_target(item, handles, &mut allocated));

    finish(report_filename(event), &event.title, &[page], handles, allocated)
}

/// One page per event, in the order given.
pub async fn generate_batch_report(
    events: &[&Event],
    handles: &MediaHandles,
    options: &ReportOptions,
) -> EventBookResult<Report> {
    if events.is_empty() {
        return Err(EventBookError::Render("no events to report".into()));
    }

    let mut allocated = Vec::new();
    let mut pages = Vec::with_capacity(events.len());
    for event in events {
        let letterhead = load_letterhead(options).await;
        pages.push(build_page(event, letterhead, |item| {
            link_target(item, handles, &mut allocated)
        }));
    }

    finish(
        BATCH_REPORT_FILENAME.to_string(),
        "All Events Report",
        &pages,
        handles,
        allocated,
    )
}

fn finish(
    filename: String,
    title: &str,
    pages: &[ReportPage],
    handles: &MediaHandles,
    allocated: Vec<String>,
) -> EventBookResult<Report> {
    match render::render_pages(title, pages) {
        Ok(bytes) => {
            debug!(filename = %filename, pages = pages.len(), size = bytes.len(), "rendered report");
            Ok(Report {
                filename,
                bytes,
                handles: allocated,
            })
        }
        Err(e) => {
            handles.release_all(&allocated);
            Err(e)
        }
    }
}

/// A live handle for `item`, allocating one from its payload if needed.
fn link_target(item: &MediaItem, handles: &MediaHandles, allocated: &mut Vec<String>) -> Option<String> {
    if let Some(handle) = item.handle.as_deref().filter(|h| handles.contains(h)) {
        return Some(handle.to_string());
    }

    let data = item.data()?;
    match handles.create_from_data_url(data) {
        Ok(handle) => {
            allocated.push(handle.clone());
            Some(handle)
        }
        Err(e) => {
            warn!(name = %item.name, error = %e, "media payload unreadable, listing without link");
            None
        }
    }
}

async fn load_letterhead(options: &ReportOptions) -> Letterhead {
    let logo = match &options.logo_path {
        Some(path) => load_logo(path, options.logo_timeout).await,
        None => None,
    };
    Letterhead {
        institution: options.institution.clone(),
        tagline: options.tagline.clone(),
        logo,
    }
}

/// Read and decode the logo within `timeout`. Any failure means no logo.
async fn load_logo(path: &Path, timeout: Duration) -> Option<DynamicImage> {
    let bytes = match tokio::time::timeout(timeout, tokio::fs::read(path)).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            warn!(path = %path.display(), error = %e, "could not read logo, using text letterhead");
            return None;
        }
        Err(_) => {
            warn!(path = %path.display(), ?timeout, "logo load timed out, using text letterhead");
            return None;
        }
    };

    match image_crate::load_from_memory(&bytes) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not decode logo, using text letterhead");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NOT_PROVIDED;
    use crate::event::{EventDraft, EventStatus};
    use crate::media::{MediaSource, encode_data_url};

    fn event(id: i64, title: &str) -> Event {
        let draft = EventDraft {
            title: title.into(),
            category: "Technical".into(),
            start_date: "2024-03-01".into(),
            coordinator: "Prof. Iyer".into(),
            ..Default::default()
        };
        let dates = draft.validate().unwrap();
        let mut event = Event::from_draft(id, draft, dates, vec![], EventStatus::Approved);
        event.document_id = format!("D{}-2024", id);
        event
    }

    fn durable(name: &str, handle: Option<String>) -> MediaItem {
        MediaItem {
            name: name.into(),
            mime_type: "image/png".into(),
            size: 1,
            source: MediaSource::Durable(encode_data_url("image/png", &[1])),
            handle,
        }
    }

    #[test]
    fn filename_sanitizes_title() {
        assert_eq!(report_filename(&event(7, "Hack Day: 2024!")), "D7-2024-Hack_Day__2024_.pdf");
    }

    #[tokio::test]
    async fn zero_media_report_renders() {
        let handles = MediaHandles::new();
        let e = event(1, "Hack Day");
        let page = build_page(&e, Letterhead::default(), |_| None);
        assert_eq!(page.value_of("Media"), Some(NOT_PROVIDED));

        let report = generate_event_report(&e, &handles, &ReportOptions::default())
            .await
            .unwrap();
        assert_eq!(report.filename, "D1-2024-Hack_Day.pdf");
        assert!(report.bytes.starts_with(b"%PDF"));
        assert!(report.handles.is_empty());
    }

    #[tokio::test]
    async fn links_reuse_live_handles_and_allocate_missing_ones() {
        let handles = MediaHandles::new();
        let live = handles.create("image/png", vec![1]);

        let mut e = event(1, "Expo");
        e.media = vec![
            durable("live.png", Some(live.clone())),
            durable("stale.png", Some("blob:eventbook/released".into())),
            durable("bare.png", None),
        ];

        let report = generate_event_report(&e, &handles, &ReportOptions::default())
            .await
            .unwrap();
        assert_eq!(report.handles.len(), 2);
        assert!(!report.handles.contains(&live));
        assert_eq!(handles.len(), 3);

        report.release(&handles);
        assert_eq!(handles.len(), 1);
        assert!(handles.contains(&live));
    }

    #[tokio::test]
    async fn missing_or_broken_logo_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("logo.png");
        std::fs::write(&broken, b"not an image").unwrap();

        assert!(load_logo(&dir.path().join("absent.png"), Duration::from_secs(1)).await.is_none());
        assert!(load_logo(&broken, Duration::from_secs(1)).await.is_none());

        let options = ReportOptions {
            institution: vec!["City College".into()],
            logo_path: Some(broken),
            ..Default::default()
        };
        let report = generate_event_report(&event(1, "Talk"), &MediaHandles::new(), &options)
            .await
            .unwrap();
        assert!(report.bytes.starts_with(b"%PDF"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn logo_that_never_arrives_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let fifo = dir.path().join("logo.png");
        let status = std::process::Command::new("mkfifo").arg(&fifo).status().unwrap();
        assert!(status.success());

        // Opening a FIFO for reading blocks until a writer shows up.
        let started = std::time::Instant::now();
        assert!(load_logo(&fifo, Duration::from_millis(50)).await.is_none());
        assert!(started.elapsed() < Duration::from_secs(5));

        // Let the abandoned read finish.
        drop(std::fs::OpenOptions::new().write(true).open(&fifo).unwrap());
    }

    #[tokio::test]
    async fn batch_report_has_fixed_name_and_rejects_empty_input() {
        let handles = MediaHandles::new();
        let a = event(1, "A");
        let b = event(2, "B");

        let report = generate_batch_report(&[&a, &b], &handles, &ReportOptions::default())
            .await
            .unwrap();
        assert_eq!(report.filename, BATCH_REPORT_FILENAME);

        assert!(matches!(
            generate_batch_report(&[], &handles, &ReportOptions::default()).await,
            Err(EventBookError::Render(_))
        ));
    }

    #[tokio::test]
    async fn write_to_places_file_under_its_name() {
        let dir = tempfile::tempdir().unwrap();
        let report = generate_event_report(&event(3, "Quiz"), &MediaHandles::new(), &ReportOptions::default())
            .await
            .unwrap();

        let path = report.write_to(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("D3-2024-Quiz.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), report.bytes);
    }
}
