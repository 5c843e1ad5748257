/// Series registry: which series exist per category and what they track
///
/// The registry is the only source of truth for which items exist. It is
/// changed through the three transitions below, each of which validates
/// completely before touching anything.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

use super::progress::ALL_SERIES;
use crate::catalog::{Category, PoseKey};
use crate::error::{CollectionError, Result};

/// Subject name -> poses tracked for that subject in one series, in insertion order
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesDefinition {
    pub members_with_poses: IndexMap<String, Vec<PoseKey>>,
}

impl SeriesDefinition {
    /// Build a definition, dropping subjects without poses and repeated poses
    pub fn from_assignments<I, S, P>(assignments: I) -> Self
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: IntoIterator<Item = PoseKey>,
    {
        let mut members_with_poses = IndexMap::new();
        for (subject, poses) in assignments {
            let mut kept: Vec<PoseKey> = Vec::new();
            for pose in poses {
                if !kept.contains(&pose) {
                    kept.push(pose);
                }
            }
            if !kept.is_empty() {
                members_with_poses.insert(subject.into(), kept);
            }
        }
        Self { members_with_poses }
    }

    pub fn is_empty(&self) -> bool {
        self.members_with_poses.is_empty()
    }

    /// Number of (subject, pose) pairs listed
    pub fn pair_count(&self) -> usize {
        self.members_with_poses.values().map(Vec::len).sum()
    }
}

/// Category -> series name -> definition. Every category is always present,
/// and series keep the order they were created in.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct SeriesRegistry {
    groups: BTreeMap<Category, IndexMap<String, SeriesDefinition>>,
}

impl Default for SeriesRegistry {
    fn default() -> Self {
        Self {
            groups: Category::ALL
                .into_iter()
                .map(|c| (c, IndexMap::new()))
                .collect(),
        }
    }
}

impl SeriesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Series of one category, in creation order
    pub fn series_in(&self, category: Category) -> &IndexMap<String, SeriesDefinition> {
        // Default populates every category, and nothing ever removes one
        &self.groups[&category]
    }

    fn series_in_mut(&mut self, category: Category) -> &mut IndexMap<String, SeriesDefinition> {
        self.groups.entry(category).or_default()
    }

    pub fn get(&self, category: Category, series: &str) -> Option<&SeriesDefinition> {
        self.series_in(category).get(series.trim())
    }

    pub fn contains(&self, category: Category, series: &str) -> bool {
        self.get(category, series).is_some()
    }

    pub fn series_names(&self, category: Category) -> Vec<String> {
        self.series_in(category).keys().cloned().collect()
    }

    /// Every series name across categories, de-duplicated, for selection widgets
    pub fn all_series_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for category in Category::ALL {
            for name in self.series_in(category).keys() {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    /// Iterate (category, series name, definition) in registry order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &str, &SeriesDefinition)> {
        self.groups.iter().flat_map(|(category, series)| {
            series
                .iter()
                .map(move |(name, definition)| (*category, name.as_str(), definition))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(|series| series.is_empty())
    }

    /// Insert without validation; used when normalizing loaded data
    pub(crate) fn insert(&mut self, category: Category, series: String, definition: SeriesDefinition) {
        self.series_in_mut(category).insert(series, definition);
    }

    // ========== Transitions ==========

    /// Add an empty series
    pub fn create_series(&mut self, category: Category, series: &str) -> Result<()> {
        let name = validate_name(series)?;
        if self.contains(category, &name) {
            return Err(CollectionError::DuplicateSeries {
                category: category.to_string(),
                series: name,
            });
        }
        self.series_in_mut(category)
            .insert(name, SeriesDefinition::default());
        Ok(())
    }

    /// Replace a series definition wholesale
    pub fn update_series(
        &mut self,
        category: Category,
        series: &str,
        definition: SeriesDefinition,
    ) -> Result<()> {
        let name = series.trim();
        if !self.contains(category, name) {
            return Err(not_found(category, name));
        }
        // Re-run the filtering in case the caller built the struct directly
        let definition = SeriesDefinition::from_assignments(definition.members_with_poses);
        if definition.is_empty() {
            return Err(CollectionError::validation(format!(
                "series '{}' must track at least one member with at least one pose",
                name
            )));
        }
        self.series_in_mut(category).insert(name.to_string(), definition);
        Ok(())
    }

    /// Remove a series; returns what it used to track
    pub fn delete_series(&mut self, category: Category, series: &str) -> Result<SeriesDefinition> {
        let name = series.trim();
        self.series_in_mut(category)
            .shift_remove(name)
            .ok_or_else(|| not_found(category, name))
    }
}

fn validate_name(series: &str) -> Result<String> {
    let name = series.trim();
    if name.is_empty() {
        return Err(CollectionError::validation("series name must not be empty"));
    }
    if is_reserved_name(name) {
        return Err(CollectionError::validation(format!(
            "'{}' is reserved for the all-series view",
            name
        )));
    }
    Ok(name.to_string())
}

/// True for names that would be read back as the all-series selection
pub(crate) fn is_reserved_name(series: &str) -> bool {
    series.trim().eq_ignore_ascii_case(ALL_SERIES)
}

fn not_found(category: Category, series: &str) -> CollectionError {
    CollectionError::NotFound(format!("series '{}' in {}", series, category))
}
