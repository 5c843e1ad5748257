/// In-memory collection state and every mutation on it
///
/// Each mutation validates, builds the candidate next state, saves it, and
/// only then swaps it in. A rejected or unsaved mutation leaves the
/// collection exactly as it was.

use std::collections::BTreeMap;

use super::data::Item;
use super::image::ImageSource;
use super::library::Library;
use super::progress::{aggregate, SeriesSelection, SubjectProgress};
use super::registry::{SeriesDefinition, SeriesRegistry};
use super::universe::{build, hydrate, saved_state_of};
use crate::catalog::{Catalog, Category};
use crate::error::{CollectionError, Result};

pub struct Collection {
    catalog: Catalog,
    registry: SeriesRegistry,
    items: Vec<Item>,
    library: Library,
    warnings: Vec<CollectionError>,
    migrated: bool,
}

impl Collection {
    /// Load the snapshot and reconcile it against the catalog
    pub fn open(catalog: Catalog, library: Library) -> Self {
        let loaded = library.load(&catalog);
        Collection {
            catalog,
            registry: loaded.registry,
            items: loaded.items,
            library,
            warnings: loaded.warnings,
            migrated: loaded.migrated,
        }
    }

    // ========== Read access ==========

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn registry(&self) -> &SeriesRegistry {
        &self.registry
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Items in the selection, in universe order
    pub fn items_for(&self, selection: &SeriesSelection) -> Vec<&Item> {
        self.items.iter().filter(|i| selection.matches(i)).collect()
    }

    /// One subject's items in the selection, ordered by series then pose
    pub fn items_for_subject(&self, subject: &str, selection: &SeriesSelection) -> Vec<&Item> {
        let mut items: Vec<&Item> = self
            .items
            .iter()
            .filter(|i| i.subject_name == subject && selection.matches(i))
            .collect();
        items.sort_by(|a, b| {
            a.series_name
                .cmp(&b.series_name)
                .then(a.pose_variant().sort_order.cmp(&b.pose_variant().sort_order))
        });
        items
    }

    pub fn progress(&self, selection: &SeriesSelection) -> BTreeMap<String, SubjectProgress> {
        aggregate(&self.items, selection)
    }

    /// Recovered load problems, handed over once
    pub fn take_warnings(&mut self) -> Vec<CollectionError> {
        std::mem::take(&mut self.warnings)
    }

    /// True when the snapshot was upgraded from a legacy layout on open
    pub fn was_migrated(&self) -> bool {
        self.migrated
    }

    /// Display-only; not persisted
    pub fn set_pinned(&mut self, subject: &str, pinned: bool) -> Result<()> {
        self.catalog.set_pinned(subject, pinned)
    }

    // ========== Series mutations ==========

    pub fn create_series(&mut self, category: Category, series: &str) -> Result<()> {
        let mut next = self.registry.clone();
        next.create_series(category, series)?;
        self.commit_registry(next)?;
        tracing::info!(%category, series = series.trim(), "series created");
        Ok(())
    }

    /// Replace what a series tracks. Owned counts for dropped pairs are pruned.
    pub fn update_series(
        &mut self,
        category: Category,
        series: &str,
        definition: SeriesDefinition,
    ) -> Result<()> {
        let mut next = self.registry.clone();
        next.update_series(category, series, definition)?;
        self.commit_registry(next)?;
        tracing::info!(%category, series = series.trim(), items = self.items.len(), "series updated");
        Ok(())
    }

    /// Remove a series and every item in it. Returns how many items went away.
    ///
    /// Irreversible; callers should confirm with the user first.
    pub fn delete_series(&mut self, category: Category, series: &str) -> Result<usize> {
        let mut next = self.registry.clone();
        next.delete_series(category, series)?;
        let before = self.items.len();
        self.commit_registry(next)?;
        let removed = before.saturating_sub(self.items.len());
        tracing::info!(%category, series = series.trim(), removed, "series deleted");
        Ok(removed)
    }

    fn commit_registry(&mut self, next: SeriesRegistry) -> Result<()> {
        let mut items = build(&self.catalog, &next);
        hydrate(&mut items, &saved_state_of(&self.items));
        self.library.save(&next, &items)?;
        self.registry = next;
        self.items = items;
        Ok(())
    }

    // ========== Item mutations ==========

    /// Set the owned count, clamping negatives to 0. Returns whether anything changed.
    pub fn set_owned_count(&mut self, id: &str, count: i64) -> Result<bool> {
        let index = self.index_of(id)?;
        let count = count.clamp(0, i64::from(u32::MAX)) as u32;
        if self.items[index].owned_count == count {
            return Ok(false);
        }
        let mut next = self.items.clone();
        next[index].owned_count = count;
        self.commit_items(next)?;
        Ok(true)
    }

    /// Returns the new count
    pub fn increment(&mut self, id: &str) -> Result<u32> {
        let current = self.current_count(id)?;
        self.set_owned_count(id, i64::from(current) + 1)?;
        self.current_count(id)
    }

    /// Returns the new count; never goes below 0
    pub fn decrement(&mut self, id: &str) -> Result<u32> {
        let current = self.current_count(id)?;
        self.set_owned_count(id, i64::from(current) - 1)?;
        self.current_count(id)
    }

    pub fn reset_count(&mut self, id: &str) -> Result<bool> {
        self.set_owned_count(id, 0)
    }

    /// Raise every matching item to at least `target`; never lowers a count.
    /// Returns how many items changed.
    pub fn top_up(&mut self, subject: &str, selection: &SeriesSelection, target: u32) -> Result<usize> {
        let series = match selection {
            SeriesSelection::All => {
                return Err(CollectionError::validation(
                    "bulk update needs a specific series, not all series",
                ))
            }
            SeriesSelection::Series(name) => name,
        };
        if !self.registry.all_series_names().contains(series) {
            return Err(CollectionError::NotFound(format!("series '{}'", series)));
        }

        let mut next = self.items.clone();
        let mut changed = 0;
        for item in next
            .iter_mut()
            .filter(|i| i.subject_name == subject && i.series_name == *series)
        {
            if item.owned_count < target {
                item.owned_count = target;
                changed += 1;
            }
        }
        if changed > 0 {
            self.commit_items(next)?;
        }
        tracing::info!(%subject, %series, target, changed, "top-up applied");
        Ok(changed)
    }

    /// Override the item's image. A blank URL or empty upload is a no-op.
    pub fn set_custom_image(&mut self, id: &str, source: ImageSource) -> Result<bool> {
        let index = self.index_of(id)?;
        let Some(reference) = source.into_reference() else {
            return Ok(false);
        };
        if self.items[index].custom_image.as_deref() == Some(reference.as_str()) {
            return Ok(false);
        }
        let mut next = self.items.clone();
        next[index].custom_image = Some(reference);
        self.commit_items(next)?;
        Ok(true)
    }

    /// Revert to the derived default image
    pub fn clear_custom_image(&mut self, id: &str) -> Result<bool> {
        let index = self.index_of(id)?;
        if self.items[index].custom_image.is_none() {
            return Ok(false);
        }
        let mut next = self.items.clone();
        next[index].custom_image = None;
        self.commit_items(next)?;
        Ok(true)
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| CollectionError::NotFound(format!("item '{}'", id)))
    }

    fn current_count(&self, id: &str) -> Result<u32> {
        Ok(self.items[self.index_of(id)?].owned_count)
    }

    fn commit_items(&mut self, next: Vec<Item>) -> Result<()> {
        self.library.save(&self.registry, &next)?;
        self.items = next;
        Ok(())
    }
}

/// Turn raw form input into a count. Negatives clamp to 0.
pub fn coerce_count(raw: &str) -> Result<u32> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| CollectionError::validation(format!("'{}' is not a whole number", raw.trim())))?;
    Ok(value.clamp(0, i64::from(u32::MAX)) as u32)
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("library", &self.library)
            .field("items", &self.items.len())
            .finish()
    }
}
