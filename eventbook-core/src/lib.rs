//! Core library for eventbook, a college event register.
//!
//! - `event` and `media` for event records and their attachments
//! - `store` for the SQLite-backed event and taxonomy collections
//! - `manager` for the in-memory event list that writes through to the store
//! - `pending`, `session` and `taxonomy` for the approval workflow, logins
//!   and category naming
//! - `query` and `report` for searching and PDF reports

pub mod archive;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod manager;
pub mod media;
pub mod pending;
pub mod query;
pub mod report;
pub mod session;
pub mod store;
pub mod taxonomy;

pub use config::EventBookConfig;
pub use error::{EventBookError, EventBookResult};
pub use event::{Event, EventDraft, EventStatus};
pub use manager::{EventManager, SharedManager};
pub use media::{MediaHandles, MediaItem};
pub use store::EventStore;
