//! The canonical in-memory event list and its write-through to the store.
//!
//! Every mutation works on the in-memory list first and then persists. How
//! a persistence failure is handled differs per operation:
//!
//! - `add_event` rolls the list back and releases the handles it created.
//! - `update_event` keeps the replaced record in memory. Memory and store
//!   disagree until the next successful write or `fetch_all`.
//! - `delete_event` keeps the record removed from memory even if the store
//!   delete fails.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Months, NaiveDate};
use tracing::{error, info, warn};

use crate::constants::DEFAULT_CONVERSION_CONCURRENCY;
use crate::error::{EventBookError, EventBookResult};
use crate::event::{Event, EventDraft, EventStatus, next_id};
use crate::media::{MediaHandles, convert_batch};
use crate::pending::PendingQueue;
use crate::store::EventStore;

/// Manager shared between the CLI and the background archiver.
pub type SharedManager = Arc<tokio::sync::Mutex<EventManager>>;

pub struct EventManager {
    store: EventStore,
    handles: MediaHandles,
    events: Vec<Event>,
    conversion_concurrency: usize,
    last_id: Option<i64>,
}

impl EventManager {
    /// An empty manager. Call [`EventManager::fetch_all`] to load the store.
    pub fn new(store: EventStore, handles: MediaHandles) -> Self {
        EventManager {
            store,
            handles,
            events: Vec::new(),
            conversion_concurrency: DEFAULT_CONVERSION_CONCURRENCY,
            last_id: None,
        }
    }

    pub fn with_conversion_concurrency(mut self, concurrency: usize) -> Self {
        self.conversion_concurrency = concurrency.max(1);
        self
    }

    pub fn into_shared(self) -> SharedManager {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, id: i64) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn handles(&self) -> &MediaHandles {
        &self.handles
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Replace the in-memory list with the store's contents.
    pub fn fetch_all(&mut self) -> EventBookResult<&[Event]> {
        let loaded = self.store.get_all_events(&self.handles)?;

        for event in &mut self.events {
            event.release_handles(&self.handles);
        }
        self.events = loaded;
        self.last_id = self.events.iter().map(|e| e.id).max().max(self.last_id);

        info!(count = self.events.len(), "loaded events");
        Ok(&self.events)
    }

    fn allocate_id(&mut self) -> i64 {
        let id = next_id(self.last_id);
        self.last_id = Some(id);
        id
    }

    /// Validate `draft`, convert its uploads and append it as a new event.
    ///
    /// Uploads that fail to convert are dropped. If the store write fails the
    /// list is restored and the new handles are released.
    pub async fn add_event(&mut self, mut draft: EventDraft, status: EventStatus) -> EventBookResult<Event> {
        let dates = draft.validate()?;
        let uploads = std::mem::take(&mut draft.media);
        let batch = convert_batch(uploads, &self.handles, self.conversion_concurrency).await;

        let id = self.allocate_id();
        let event = Event::from_draft(id, draft, dates, batch.items, status);

        self.events.push(event.clone());
        if let Err(e) = self.store.replace_all_events(&self.events) {
            self.events.pop();
            self.handles.release_all(&batch.fresh_handles);
            error!(id, error = %e, "could not persist new event, rolled back");
            return Err(e);
        }

        info!(id, title = %event.title, %status, "added event");
        Ok(event)
    }

    /// Replace event `id` with the edited `draft`.
    ///
    /// Handles of media the edit dropped are released. A failed store write
    /// is returned but the in-memory replacement stays.
    pub async fn update_event(&mut self, id: i64, mut draft: EventDraft) -> EventBookResult<Event> {
        let index = self
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| EventBookError::NotFound(format!("event {}", id)))?;

        let dates = draft.validate()?;
        let uploads = std::mem::take(&mut draft.media);
        let batch = convert_batch(uploads, &self.handles, self.conversion_concurrency).await;

        let revised = self.events[index].revised(draft, dates, batch.items);

        let kept: HashSet<&String> = revised.media.iter().filter_map(|m| m.handle.as_ref()).collect();
        for item in &mut self.events[index].media {
            if item.handle.as_ref().is_some_and(|h| !kept.contains(h)) {
                item.release_handle(&self.handles);
            }
        }

        self.events[index] = revised.clone();
        if let Err(e) = self.store.replace_all_events(&self.events) {
            error!(id, error = %e, "could not persist edited event; memory and store now differ");
            return Err(e);
        }

        info!(id, title = %revised.title, "updated event");
        Ok(revised)
    }

    /// Remove event `id`. Returns false, touching nothing, if there is no
    /// such event.
    pub fn delete_event(&mut self, id: i64) -> EventBookResult<bool> {
        let Some(index) = self.events.iter().position(|e| e.id == id) else {
            return Ok(false);
        };

        let mut removed = self.events.remove(index);
        removed.release_handles(&self.handles);

        if let Err(e) = self.store.delete_event(id) {
            error!(id, error = %e, "event removed from memory but not from the store");
            return Err(e);
        }

        info!(id, title = %removed.title, "deleted event");
        Ok(true)
    }

    /// Archive every event dated more than `years` years before `today`.
    ///
    /// Archived events lose their display handles. Returns how many events
    /// were newly archived.
    pub fn archive_sweep(&mut self, today: NaiveDate, years: u32) -> EventBookResult<usize> {
        let cutoff = today
            .checked_sub_months(Months::new(years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN);

        let mut changed = Vec::new();
        for event in &mut self.events {
            if event.archived || !event.is_before(cutoff) {
                continue;
            }
            event.release_handles(&self.handles);
            event.archived = true;
            changed.push(event.clone());
        }

        if changed.is_empty() {
            return Ok(0);
        }

        match self.store.update_events(&changed) {
            Ok(written) if written < changed.len() => {
                warn!(
                    archived = changed.len(),
                    written, "some archived events were already deleted from the store"
                );
            }
            Ok(_) => {}
            Err(e) => {
                warn!(count = changed.len(), error = %e, "archived flag not persisted");
                return Err(e);
            }
        }

        info!(count = changed.len(), %cutoff, "archived old events");
        Ok(changed.len())
    }

    /// Move a staged submission into the event list.
    ///
    /// The entry leaves the queue before the event is added and is put back
    /// if the add fails, so an approval never yields two events.
    pub async fn approve(&mut self, queue: &mut PendingQueue, id: i64) -> EventBookResult<Event> {
        let entry = queue.take(id)?;

        match self.add_event(entry.draft.clone(), EventStatus::Approved).await {
            Ok(event) => {
                info!(id = event.id, pending_id = id, "approved pending event");
                Ok(event)
            }
            Err(e) => {
                if let Err(restore) = queue.restore(entry) {
                    error!(pending_id = id, error = %restore, "could not return entry to the pending queue");
                }
                Err(e)
            }
        }
    }
}
