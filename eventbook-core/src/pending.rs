//! Staging list for submissions that wait on an admin.
//!
//! Kept apart from the event store as a JSON file next to the database.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EventBookError, EventBookResult};
use crate::event::{EventDraft, next_id};

/// A draft waiting for approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEvent {
    pub id: i64,
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
    pub draft: EventDraft,
}

pub struct PendingQueue {
    path: PathBuf,
    entries: Vec<PendingEvent>,
}

impl PendingQueue {
    /// Read the queue at `path`. A missing file is an empty queue.
    pub fn load(path: impl Into<PathBuf>) -> EventBookResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Vec::new()
        };

        debug!(count = entries.len(), path = %path.display(), "loaded pending queue");
        Ok(PendingQueue { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[PendingEvent] {
        &self.entries
    }

    pub fn get(&self, id: i64) -> Option<&PendingEvent> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Validate `draft` and stage it under a new id.
    pub fn submit(&mut self, draft: EventDraft, submitted_by: &str) -> EventBookResult<PendingEvent> {
        draft.validate()?;

        let last = self.entries.iter().map(|e| e.id).max();
        let entry = PendingEvent {
            id: next_id(last),
            submitted_by: submitted_by.to_string(),
            submitted_at: Utc::now(),
            draft,
        };

        self.entries.push(entry.clone());
        if let Err(e) = self.save() {
            self.entries.pop();
            return Err(e);
        }

        info!(id = entry.id, by = submitted_by, "staged event for approval");
        Ok(entry)
    }

    /// Remove and return an entry.
    pub fn take(&mut self, id: i64) -> EventBookResult<PendingEvent> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| EventBookError::NotFound(format!("pending event {}", id)))?;

        let entry = self.entries.remove(index);
        if let Err(e) = self.save() {
            self.entries.insert(index, entry);
            return Err(e);
        }
        Ok(entry)
    }

    /// Put a taken entry back in id order.
    pub fn restore(&mut self, entry: PendingEvent) -> EventBookResult<()> {
        let index = self.entries.partition_point(|e| e.id < entry.id);
        let id = entry.id;
        self.entries.insert(index, entry);
        self.save()?;
        debug!(id, "restored pending event");
        Ok(())
    }

    /// Discard an entry without creating an event.
    pub fn reject(&mut self, id: i64) -> EventBookResult<PendingEvent> {
        let entry = self.take(id)?;
        info!(id, title = %entry.draft.title, "rejected pending event");
        Ok(entry)
    }

    fn save(&self) -> EventBookResult<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let temp = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> EventDraft {
        EventDraft {
            title: title.into(),
            category: "Cultural".into(),
            start_date: "2024-05-10".into(),
            coordinator: "Ms. Das".into(),
            ..Default::default()
        }
    }

    #[test]
    fn missing_file_is_empty_queue() {
        let dir = tempfile::tempdir().unwrap();
        let queue = PendingQueue::load(dir.path().join("pending.json")).unwrap();
        assert!(queue.list().is_empty());
    }

    #[test]
    fn submissions_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pending.json");

        let mut queue = PendingQueue::load(&path).unwrap();
        let first = queue.submit(draft("Dance Night"), "ravi").unwrap();
        let second = queue.submit(draft("Music Fest"), "ravi").unwrap();
        assert!(second.id > first.id);

        let reloaded = PendingQueue::load(&path).unwrap();
        assert_eq!(reloaded.list().len(), 2);
        assert_eq!(reloaded.get(first.id).unwrap().draft.title, "Dance Night");
        assert_eq!(reloaded.get(first.id).unwrap().submitted_by, "ravi");
    }

    #[test]
    fn invalid_drafts_are_not_staged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pending.json");
        let mut queue = PendingQueue::load(&path).unwrap();

        let mut bad = draft("Backwards");
        bad.end_date = Some("2024-05-01".into());
        assert!(matches!(
            queue.submit(bad, "ravi"),
            Err(EventBookError::Validation(_))
        ));
        assert!(queue.list().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn take_and_reject_remove_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pending.json");
        let mut queue = PendingQueue::load(&path).unwrap();
        let a = queue.submit(draft("A"), "u").unwrap();
        let b = queue.submit(draft("B"), "u").unwrap();

        assert_eq!(queue.take(a.id).unwrap().draft.title, "A");
        assert_eq!(queue.reject(b.id).unwrap().draft.title, "B");
        assert!(matches!(queue.take(a.id), Err(EventBookError::NotFound(_))));

        assert!(PendingQueue::load(&path).unwrap().list().is_empty());
    }

    #[test]
    fn restore_puts_entry_back_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pending.json");
        let mut queue = PendingQueue::load(&path).unwrap();
        let a = queue.submit(draft("A"), "u").unwrap();
        let b = queue.submit(draft("B"), "u").unwrap();

        let taken = queue.take(a.id).unwrap();
        queue.restore(taken).unwrap();

        let ids: Vec<i64> = PendingQueue::load(&path).unwrap().list().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }
}
