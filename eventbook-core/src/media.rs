//! Media attachments: durable payloads, transient handles and upload conversion.
//!
//! A freshly picked file is a [`MediaSource::Upload`] pointing at a path on
//! disk. Before its event is saved it is read and turned into a
//! [`MediaSource::Durable`] data URL (`data:<mime>;base64,<bytes>`), which is
//! what the store persists. Conversion only goes one way.
//!
//! For display, durable items also carry a transient `blob:` handle issued by
//! [`MediaHandles`]. Handles live only in memory and must be released when the
//! item is deleted, archived or superseded.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::constants::FALLBACK_MIME_TYPE;
use crate::error::{EventBookError, EventBookResult};

const HANDLE_PREFIX: &str = "blob:eventbook/";

/// Where the bytes of a media item currently live.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSource {
    /// A file picked by the user that has not been read yet.
    Upload(PathBuf),
    /// Self-contained data URL holding the file bytes.
    Durable(String),
}

/// One file attached to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "MediaRecord", try_from = "MediaRecord")]
pub struct MediaItem {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub source: MediaSource,
    /// Display handle issued by [`MediaHandles`]. Never persisted.
    pub handle: Option<String>,
}

/// On-disk shape of a media item: `name`, `type`, `size` and either `data`
/// or, for staged uploads, `file`.
#[derive(Serialize, Deserialize)]
struct MediaRecord {
    name: String,
    #[serde(rename = "type", default)]
    mime_type: String,
    #[serde(default)]
    size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file: Option<PathBuf>,
}

impl From<MediaItem> for MediaRecord {
    fn from(item: MediaItem) -> Self {
        let (data, file) = match item.source {
            MediaSource::Durable(data) => (Some(data), None),
            MediaSource::Upload(path) => (None, Some(path)),
        };
        MediaRecord {
            name: item.name,
            mime_type: item.mime_type,
            size: item.size,
            data,
            file,
        }
    }
}

impl TryFrom<MediaRecord> for MediaItem {
    type Error = String;

    fn try_from(record: MediaRecord) -> Result<Self, Self::Error> {
        let source = match (record.data, record.file) {
            (Some(data), _) => MediaSource::Durable(data),
            (None, Some(path)) => MediaSource::Upload(path),
            (None, None) => {
                return Err(format!(
                    "media item '{}' has neither data nor file",
                    record.name
                ));
            }
        };
        Ok(MediaItem {
            name: record.name,
            mime_type: record.mime_type,
            size: record.size,
            source,
            handle: None,
        })
    }
}

impl MediaItem {
    /// Describe a file on disk as a not-yet-converted upload.
    ///
    /// The MIME type is guessed from the extension when not given.
    pub fn upload(path: impl Into<PathBuf>, mime_type: Option<&str>) -> EventBookResult<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = match mime_type {
            Some(m) if !m.trim().is_empty() => m.trim().to_string(),
            _ => guess_mime_type(&path).to_string(),
        };

        Ok(MediaItem {
            name,
            mime_type,
            size: metadata.len(),
            source: MediaSource::Upload(path),
            handle: None,
        })
    }

    pub fn is_durable(&self) -> bool {
        matches!(self.source, MediaSource::Durable(_))
    }

    /// The durable data URL, if this item has been converted.
    pub fn data(&self) -> Option<&str> {
        match &self.source {
            MediaSource::Durable(data) => Some(data),
            MediaSource::Upload(_) => None,
        }
    }

    /// Release the display handle, if any.
    pub fn release_handle(&mut self, handles: &MediaHandles) {
        if let Some(handle) = self.handle.take() {
            handles.release(&handle);
        }
    }
}

/// Guess a MIME type from a file extension.
pub fn guess_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("ppt") => "application/vnd.ms-powerpoint",
        Some("pptx") => {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        }
        Some("txt") => "text/plain",
        _ => FALLBACK_MIME_TYPE,
    }
}

// =============================================================================
// Data URLs
// =============================================================================

pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Split a base64 data URL into its MIME type and decoded bytes.
pub fn decode_data_url(url: &str) -> EventBookResult<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| EventBookError::Payload("missing 'data:' prefix".into()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| EventBookError::Payload("missing ',' separator".into()))?;

    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| EventBookError::Payload("only base64 payloads are supported".into()))?;
    let mime_type = if mime_type.is_empty() {
        FALLBACK_MIME_TYPE
    } else {
        mime_type
    };

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| EventBookError::Payload(e.to_string()))?;

    Ok((mime_type.to_string(), bytes))
}

// =============================================================================
// Transient handles
// =============================================================================

struct HandleEntry {
    mime_type: String,
    bytes: Arc<[u8]>,
}

/// Registry of in-memory `blob:` handles, shared across the process.
///
/// Clones share the same registry.
#[derive(Clone, Default)]
pub struct MediaHandles {
    entries: Arc<Mutex<HashMap<String, HandleEntry>>>,
}

impl MediaHandles {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, HandleEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register bytes and return a fresh handle URL.
    pub fn create(&self, mime_type: &str, bytes: Vec<u8>) -> String {
        let url = format!("{}{}", HANDLE_PREFIX, Uuid::new_v4());
        let entry = HandleEntry {
            mime_type: mime_type.to_string(),
            bytes: bytes.into(),
        };
        self.lock().insert(url.clone(), entry);
        url
    }

    /// Decode a durable payload and register it.
    pub fn create_from_data_url(&self, data_url: &str) -> EventBookResult<String> {
        let (mime_type, bytes) = decode_data_url(data_url)?;
        Ok(self.create(&mime_type, bytes))
    }

    /// Look up a live handle, returning its MIME type and bytes.
    pub fn get(&self, url: &str) -> Option<(String, Arc<[u8]>)> {
        self.lock()
            .get(url)
            .map(|entry| (entry.mime_type.clone(), Arc::clone(&entry.bytes)))
    }

    /// Free a handle. Returns false if it was not live.
    pub fn release(&self, url: &str) -> bool {
        self.lock().remove(url).is_some()
    }

    pub fn release_all<'a>(&self, urls: impl IntoIterator<Item = &'a String>) {
        let mut entries = self.lock();
        for url in urls {
            entries.remove(url);
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Upload conversion
// =============================================================================

/// Convert one item to durable form.
///
/// Durable items pass through untouched. Uploads are read from disk, encoded,
/// and given a fresh display handle. The returned flag is true when a new
/// handle was created.
pub async fn convert_upload(
    item: MediaItem,
    handles: &MediaHandles,
) -> EventBookResult<(MediaItem, bool)> {
    let path = match &item.source {
        MediaSource::Durable(_) => return Ok((item, false)),
        MediaSource::Upload(path) => path.clone(),
    };

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| EventBookError::Conversion {
            name: item.name.clone(),
            reason: e.to_string(),
        })?;

    let mime_type = if item.mime_type.trim().is_empty() {
        FALLBACK_MIME_TYPE.to_string()
    } else {
        item.mime_type
    };
    let size = bytes.len() as u64;
    let data = encode_data_url(&mime_type, &bytes);
    let handle = handles.create(&mime_type, bytes);

    debug!(name = %item.name, size, "converted upload");

    Ok((
        MediaItem {
            name: item.name,
            mime_type,
            size,
            source: MediaSource::Durable(data),
            handle: Some(handle),
        },
        true,
    ))
}

/// Outcome of converting a list of media items.
#[derive(Debug, Default)]
pub struct MediaBatch {
    /// Converted items in input order, minus any that failed.
    pub items: Vec<MediaItem>,
    /// Handles created by this batch.
    pub fresh_handles: Vec<String>,
}

/// Convert every upload in `items`, at most `concurrency` files at a time.
///
/// A file that fails to convert is logged and dropped; the rest continue.
pub async fn convert_batch(
    items: Vec<MediaItem>,
    handles: &MediaHandles,
    concurrency: usize,
) -> MediaBatch {
    let results: Vec<EventBookResult<(MediaItem, bool)>> = stream::iter(items)
        .map(|item| convert_upload(item, handles))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut batch = MediaBatch::default();
    for result in results {
        match result {
            Ok((item, fresh)) => {
                if fresh {
                    if let Some(handle) = &item.handle {
                        batch.fresh_handles.push(handle.clone());
                    }
                }
                batch.items.push(item);
            }
            Err(e) => warn!(error = %e, "dropping media item"),
        }
    }
    batch
}
