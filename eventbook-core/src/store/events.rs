//! Event collection operations.

use rusqlite::params;
use tracing::{debug, warn};

use super::EventStore;
use crate::error::EventBookResult;
use crate::event::Event;
use crate::media::MediaHandles;

/// Copy of `event` with only durable media, ready to persist.
fn durable_record(event: &Event) -> Event {
    let mut record = event.clone();
    let before = record.media.len();
    record.media.retain(|item| item.is_durable());

    let dropped = before - record.media.len();
    if dropped > 0 {
        warn!(
            id = event.id,
            dropped, "media without a durable payload was not persisted"
        );
    }
    record
}

impl EventStore {
    /// Replace the whole event collection with `events` in one transaction.
    ///
    /// If any insert fails the transaction rolls back and the previous
    /// collection is left intact.
    pub fn replace_all_events(&self, events: &[Event]) -> EventBookResult<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM events", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO events (id, date, record) VALUES (?1, ?2, ?3)")?;
            for event in events {
                let record = serde_json::to_string(&durable_record(event))?;
                stmt.execute(params![event.id, event.date.to_string(), record])?;
            }
        }

        tx.commit()?;
        debug!(count = events.len(), "replaced event collection");
        Ok(())
    }

    /// Overwrite records that are still in the store, in one transaction.
    ///
    /// Rows deleted since `events` were read stay deleted. Returns how many
    /// records were written.
    pub fn update_events(&self, events: &[Event]) -> EventBookResult<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt =
                tx.prepare("UPDATE events SET date = ?2, record = ?3 WHERE id = ?1")?;
            for event in events {
                let record = serde_json::to_string(&durable_record(event))?;
                written += stmt.execute(params![event.id, event.date.to_string(), record])?;
            }
        }
        tx.commit()?;
        debug!(requested = events.len(), written, "updated event records");
        Ok(written)
    }

    /// Read every event back, ordered by id.
    ///
    /// Each durable media item gets a fresh display handle from `handles`.
    pub fn get_all_events(&self, handles: &MediaHandles) -> EventBookResult<Vec<Event>> {
        let records: Vec<String> = {
            let conn = self.conn();
            let mut stmt = conn.prepare("SELECT record FROM events ORDER BY id")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            rows.collect::<Result<_, _>>()?
        };

        let mut events = Vec::with_capacity(records.len());
        for record in records {
            let mut event: Event = serde_json::from_str(&record)?;
            for item in &mut event.media {
                let Some(data) = item.data() else { continue };
                match handles.create_from_data_url(data) {
                    Ok(handle) => item.handle = Some(handle),
                    Err(e) => warn!(id = event.id, name = %item.name, error = %e, "unreadable media payload"),
                }
            }
            events.push(event);
        }

        debug!(count = events.len(), "loaded events");
        Ok(events)
    }

    /// Delete one record. Returns false if no record had that id.
    pub fn delete_event(&self, id: i64) -> EventBookResult<bool> {
        let conn = self.conn();
        let changed = conn.execute("DELETE FROM events WHERE id = ?1", params![id])?;
        debug!(id, changed, "deleted event");
        Ok(changed > 0)
    }

    pub fn count_events(&self) -> EventBookResult<usize> {
        let conn = self.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventDraft, EventStatus};
    use crate::media::{MediaItem, MediaSource, decode_data_url, encode_data_url};
    use std::path::PathBuf;

    fn event(id: i64, title: &str, date: &str) -> Event {
        let draft = EventDraft {
            title: title.into(),
            category: "Technical".into(),
            start_date: date.into(),
            coordinator: "Prof. Iyer".into(),
            ..Default::default()
        };
        let dates = draft.validate().unwrap();
        Event::from_draft(id, draft, dates, vec![], EventStatus::Approved)
    }

    fn durable(name: &str, bytes: &[u8]) -> MediaItem {
        MediaItem {
            name: name.into(),
            mime_type: "image/png".into(),
            size: bytes.len() as u64,
            source: MediaSource::Durable(encode_data_url("image/png", bytes)),
            handle: None,
        }
    }

    fn without_handles(mut events: Vec<Event>) -> Vec<Event> {
        for event in &mut events {
            for item in &mut event.media {
                item.handle = None;
            }
        }
        events
    }

    #[test]
    fn round_trip_preserves_fields_and_media_bytes() {
        let store = EventStore::open_in_memory().unwrap();
        let handles = MediaHandles::new();

        let mut first = event(1, "Hack Day", "2024-03-01");
        first.media = vec![durable("poster.png", &[1, 2, 3])];
        first.total_expenses = Some(1250.5);
        let second = event(2, "Dance Night", "2024-04-10");

        store
            .replace_all_events(&[first.clone(), second.clone()])
            .unwrap();
        let loaded = store.get_all_events(&handles).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(without_handles(loaded.clone()), vec![first, second]);

        let media = &loaded[0].media[0];
        let (_, bytes) = decode_data_url(media.data().unwrap()).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        let handle = media.handle.as_deref().unwrap();
        assert_eq!(&*handles.get(handle).unwrap().1, &[1, 2, 3]);
    }

    #[test]
    fn repeated_reads_are_equal_apart_from_handles() {
        let store = EventStore::open_in_memory().unwrap();
        let handles = MediaHandles::new();
        let mut e = event(1, "Hack Day", "2024-03-01");
        e.media = vec![durable("a.png", &[9])];
        store.replace_all_events(&[e]).unwrap();

        let a = store.get_all_events(&handles).unwrap();
        let b = store.get_all_events(&handles).unwrap();
        assert_ne!(a[0].media[0].handle, b[0].media[0].handle);
        assert_eq!(without_handles(a), without_handles(b));
    }

    #[test]
    fn replace_all_is_atomic() {
        let store = EventStore::open_in_memory().unwrap();
        let handles = MediaHandles::new();
        store
            .replace_all_events(&[event(1, "Original", "2024-01-01")])
            .unwrap();

        // Duplicate ids violate the primary key halfway through the batch.
        let result = store.replace_all_events(&[
            event(5, "New", "2024-02-01"),
            event(5, "Clash", "2024-02-02"),
        ]);
        assert!(result.is_err());

        let loaded = store.get_all_events(&handles).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "Original");
    }

    #[test]
    fn uploads_are_not_persisted() {
        let store = EventStore::open_in_memory().unwrap();
        let mut e = event(1, "Hack Day", "2024-03-01");
        e.media = vec![
            durable("kept.png", &[1]),
            MediaItem {
                name: "raw.png".into(),
                mime_type: "image/png".into(),
                size: 1,
                source: MediaSource::Upload(PathBuf::from("/tmp/raw.png")),
                handle: None,
            },
        ];
        store.replace_all_events(&[e]).unwrap();

        let loaded = store.get_all_events(&MediaHandles::new()).unwrap();
        assert_eq!(loaded[0].media.len(), 1);
        assert_eq!(loaded[0].media[0].name, "kept.png");
    }

    #[test]
    fn delete_removes_only_that_id() {
        let store = EventStore::open_in_memory().unwrap();
        store
            .replace_all_events(&[event(1, "A", "2024-01-01"), event(2, "B", "2024-01-02")])
            .unwrap();

        assert!(store.delete_event(1).unwrap());
        assert!(!store.delete_event(99).unwrap());

        let ids: Vec<i64> = store
            .get_all_events(&MediaHandles::new())
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn update_events_overwrites_in_place() {
        let store = EventStore::open_in_memory().unwrap();
        let mut e = event(1, "A", "2020-01-01");
        store.replace_all_events(&[e.clone()]).unwrap();

        e.archived = true;
        assert_eq!(store.update_events(&[e]).unwrap(), 1);

        let loaded = store.get_all_events(&MediaHandles::new()).unwrap();
        assert_eq!(store.count_events().unwrap(), 1);
        assert!(loaded[0].archived);
    }

    #[test]
    fn update_events_skips_deleted_rows() {
        let store = EventStore::open_in_memory().unwrap();
        let mut gone = event(1, "Gone", "2020-01-01");
        let mut kept = event(2, "Kept", "2020-01-02");
        store.replace_all_events(&[gone.clone(), kept.clone()]).unwrap();
        store.delete_event(gone.id).unwrap();

        gone.archived = true;
        kept.archived = true;
        assert_eq!(store.update_events(&[gone, kept]).unwrap(), 1);

        let loaded = store.get_all_events(&MediaHandles::new()).unwrap();
        let flags: Vec<(i64, bool)> = loaded.iter().map(|e| (e.id, e.archived)).collect();
        assert_eq!(flags, vec![(2, true)]);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events.db");
        {
            let store = EventStore::open(&path).unwrap();
            store
                .replace_all_events(&[event(1, "Persisted", "2024-01-01")])
                .unwrap();
        }

        let store = EventStore::open(&path).unwrap();
        let loaded = store.get_all_events(&MediaHandles::new()).unwrap();
        assert_eq!(loaded[0].title, "Persisted");
        assert_eq!(store.path(), Some(path.as_path()));
    }
}
