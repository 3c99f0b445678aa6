//! Category, event type and department collections.
//!
//! Names are stored as given. Duplicates are accepted and nothing here
//! touches events that reference a name.

use rusqlite::params;
use tracing::debug;

use super::EventStore;
use crate::error::EventBookResult;
use crate::taxonomy::{EventTypeEntry, TaxonomyRepo};

impl EventStore {
    fn list_names(&self, sql: &str) -> EventBookResult<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }
}

impl TaxonomyRepo for EventStore {
    fn add_category(&self, name: &str) -> EventBookResult<()> {
        self.conn()
            .execute("INSERT INTO categories (name) VALUES (?1)", params![name])?;
        debug!(name, "added category");
        Ok(())
    }

    fn categories(&self) -> EventBookResult<Vec<String>> {
        self.list_names("SELECT name FROM categories ORDER BY seq")
    }

    fn add_event_type(&self, category: &str, name: &str) -> EventBookResult<()> {
        self.conn().execute(
            "INSERT INTO event_types (name, category) VALUES (?1, ?2)",
            params![name, category],
        )?;
        debug!(category, name, "added event type");
        Ok(())
    }

    fn event_types(&self) -> EventBookResult<Vec<EventTypeEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT name, category FROM event_types ORDER BY seq")?;
        let rows = stmt.query_map([], |row| {
            Ok(EventTypeEntry {
                name: row.get(0)?,
                category: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn add_department(&self, name: &str) -> EventBookResult<()> {
        self.conn()
            .execute("INSERT INTO departments (name) VALUES (?1)", params![name])?;
        debug!(name, "added department");
        Ok(())
    }

    fn departments(&self) -> EventBookResult<Vec<String>> {
        self.list_names("SELECT name FROM departments ORDER BY seq")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_keep_insertion_order_and_duplicates() {
        let store = EventStore::open_in_memory().unwrap();
        store.add_category("Technical").unwrap();
        store.add_category("Cultural").unwrap();
        store.add_category("Technical").unwrap();

        assert_eq!(
            store.categories().unwrap(),
            vec!["Technical", "Cultural", "Technical"]
        );
    }

    #[test]
    fn event_types_remember_their_category() {
        let store = EventStore::open_in_memory().unwrap();
        store.add_event_type("Sports", "Chess").unwrap();

        let types = store.event_types().unwrap();
        assert_eq!(
            types,
            vec![EventTypeEntry {
                name: "Chess".into(),
                category: "Sports".into()
            }]
        );
    }

    #[test]
    fn departments_are_listed() {
        let store = EventStore::open_in_memory().unwrap();
        store.add_department("CSE").unwrap();
        assert_eq!(store.departments().unwrap(), vec!["CSE"]);
    }
}
