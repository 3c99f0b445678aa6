//! Per-invocation context: config, store, event list and session.

use anyhow::{Context, Result};
use eventbook_core::config::EventBookConfig;
use eventbook_core::manager::EventManager;
use eventbook_core::media::MediaHandles;
use eventbook_core::pending::PendingQueue;
use eventbook_core::session::Session;
use eventbook_core::store::EventStore;
use eventbook_core::taxonomy::Taxonomy;

pub struct App {
    pub config: EventBookConfig,
    pub store: EventStore,
    pub manager: EventManager,
}

impl App {
    /// Load config, open the database and read every event into memory.
    pub fn load() -> Result<Self> {
        let config = EventBookConfig::load()?;
        let db_path = config.database_path();
        let store = EventStore::open(&db_path)
            .with_context(|| format!("Failed to open event database at {}", db_path.display()))?;

        let mut manager = EventManager::new(store.clone(), MediaHandles::new())
            .with_conversion_concurrency(config.conversion_concurrency);
        let count = manager.fetch_all()?.len();
        tracing::debug!(count, path = %db_path.display(), "loaded events");

        Ok(App {
            config,
            store,
            manager,
        })
    }

    pub fn pending(&self) -> Result<PendingQueue> {
        Ok(PendingQueue::load(self.config.pending_path())?)
    }

    pub fn taxonomy(&self) -> Result<Taxonomy<EventStore>> {
        Ok(Taxonomy::load(self.store.clone())?)
    }

    /// The logged-in session, or an error telling the user to log in.
    pub fn session(&self) -> Result<Session> {
        current_session(&self.config)
    }
}

pub fn current_session(config: &EventBookConfig) -> Result<Session> {
    Session::load(&config.session_path())?.ok_or_else(|| {
        anyhow::anyhow!(
            "Not logged in.\n\n\
            Log in with:\n  \
            eventbook login <username> --role <view|edit|admin>"
        )
    })
}
