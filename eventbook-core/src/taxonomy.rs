//! Category, event type and department naming.
//!
//! [`Taxonomy`] owns the read/add rules; where the names are kept is up to
//! the injected [`TaxonomyRepo`] (the event store in practice).

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::{DEFAULT_CATEGORIES, DEFAULT_DEPARTMENTS, DEFAULT_EVENT_TYPES, OTHER_LABEL};
use crate::error::{EventBookError, EventBookResult};

/// An event type name scoped under a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeEntry {
    pub name: String,
    pub category: String,
}

/// Storage for taxonomy names.
pub trait TaxonomyRepo {
    fn add_category(&self, name: &str) -> EventBookResult<()>;
    fn categories(&self) -> EventBookResult<Vec<String>>;
    fn add_event_type(&self, category: &str, name: &str) -> EventBookResult<()>;
    fn event_types(&self) -> EventBookResult<Vec<EventTypeEntry>>;
    fn add_department(&self, name: &str) -> EventBookResult<()>;
    fn departments(&self) -> EventBookResult<Vec<String>>;
}

pub struct Taxonomy<R: TaxonomyRepo> {
    repo: R,
}

impl<R: TaxonomyRepo> Taxonomy<R> {
    /// Wrap `repo`, seeding the default names into any empty collection.
    pub fn load(repo: R) -> EventBookResult<Self> {
        let taxonomy = Taxonomy { repo };
        taxonomy.seed_defaults()?;
        Ok(taxonomy)
    }

    fn seed_defaults(&self) -> EventBookResult<()> {
        if self.repo.categories()?.is_empty() {
            for category in DEFAULT_CATEGORIES {
                self.repo.add_category(category)?;
            }
            info!("seeded default categories");
        }

        if self.repo.event_types()?.is_empty() {
            for (category, types) in DEFAULT_EVENT_TYPES {
                for name in *types {
                    self.repo.add_event_type(category, name)?;
                }
            }
            info!("seeded default event types");
        }

        if self.repo.departments()?.is_empty() {
            for department in DEFAULT_DEPARTMENTS {
                self.repo.add_department(department)?;
            }
            info!("seeded default departments");
        }

        Ok(())
    }

    pub fn categories(&self) -> EventBookResult<Vec<String>> {
        self.repo.categories()
    }

    pub fn event_types(&self) -> EventBookResult<Vec<EventTypeEntry>> {
        self.repo.event_types()
    }

    /// Event type names filed under `category`.
    pub fn event_types_for(&self, category: &str) -> EventBookResult<Vec<String>> {
        Ok(self
            .repo
            .event_types()?
            .into_iter()
            .filter(|entry| entry.category == category)
            .map(|entry| entry.name)
            .collect())
    }

    pub fn departments(&self) -> EventBookResult<Vec<String>> {
        self.repo.departments()
    }

    pub fn add_category(&self, name: &str) -> EventBookResult<String> {
        let name = checked_name(name, "Category")?;
        self.repo.add_category(&name)?;
        Ok(name)
    }

    pub fn add_event_type(&self, category: &str, name: &str) -> EventBookResult<String> {
        let category = checked_name(category, "Category")?;
        let name = checked_name(name, "Event type")?;
        self.repo.add_event_type(&category, &name)?;
        Ok(name)
    }

    pub fn add_department(&self, name: &str) -> EventBookResult<String> {
        let name = checked_name(name, "Department")?;
        self.repo.add_department(&name)?;
        Ok(name)
    }
}

fn checked_name(name: &str, what: &str) -> EventBookResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EventBookError::Validation(format!("{} name is required", what)));
    }
    if name.eq_ignore_ascii_case(OTHER_LABEL) {
        return Err(EventBookError::Validation(format!(
            "'{}' is reserved and cannot be added as a {}",
            OTHER_LABEL,
            what.to_lowercase()
        )));
    }
    Ok(name.to_string())
}
