/// Expands catalog x registry into the full set of trackable items
use std::collections::HashMap;

use super::data::Item;
use super::registry::SeriesRegistry;
use crate::catalog::Catalog;

/// Build every item the registry describes, all with nothing owned.
///
/// Subjects missing from the catalog or filed under the wrong category are
/// skipped, so stale registries still produce a usable universe.
pub fn build(catalog: &Catalog, registry: &SeriesRegistry) -> Vec<Item> {
    let mut items = Vec::new();
    for (category, series_name, definition) in registry.iter() {
        for (subject_name, poses) in &definition.members_with_poses {
            let Some(subject) = catalog.subject_in(subject_name, category) else {
                tracing::debug!(
                    subject = %subject_name,
                    series = %series_name,
                    %category,
                    "skipping subject not in catalog for this category"
                );
                continue;
            };
            for &pose in poses {
                items.push(Item::new(series_name, &subject.name, category, pose));
            }
        }
    }
    items
}

/// Owned count and custom image carried across a rebuild
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedState {
    pub owned_count: u32,
    pub custom_image: Option<String>,
}

/// Copy saved state onto freshly built items by id. Returns how many matched.
///
/// Saved entries with no matching item are simply not carried forward.
pub fn hydrate(items: &mut [Item], saved: &HashMap<String, SavedState>) -> usize {
    let mut matched = 0;
    for item in items.iter_mut() {
        if let Some(state) = saved.get(&item.id) {
            item.owned_count = state.owned_count;
            item.custom_image = state.custom_image.clone();
            matched += 1;
        }
    }
    matched
}

/// Index the live items so a rebuilt universe can be hydrated from them
pub fn saved_state_of(items: &[Item]) -> HashMap<String, SavedState> {
    items
        .iter()
        .map(|item| {
            (
                item.id.clone(),
                SavedState {
                    owned_count: item.owned_count,
                    custom_image: item.custom_image.clone(),
                },
            )
        })
        .collect()
}
