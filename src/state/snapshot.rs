/// On-disk snapshot format and schema migration
///
/// Current shape:
///
/// ```text
/// { "sets": { "<category>": { "<series>": { "members_with_poses": { "<subject>": ["Y", ...] } } } },
///   "collection": [ { "id", "set_name", "member_name", "group", "pose", "owned_count", "custom_image_url" } ] }
/// ```
///
/// Older shapes accepted on read only:
/// - `{"member_list": [...], "poses": [...]}` per series (every listed subject gets every listed pose)
/// - a bare pose list per series (every catalog subject of the category gets those poses)
/// - a bare top-level array of collection entries with no `sets` at all
///
/// Anything that does not resolve against the catalog is dropped here, so the
/// rest of the crate only ever sees a clean registry. A series whose name
/// collides with the all-series selection is renamed on the way in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::data::{item_id, Item};
use super::registry::{is_reserved_name, SeriesDefinition, SeriesRegistry};
use super::universe::SavedState;
use crate::catalog::{Catalog, Category, PoseKey};

/// One row of the persisted `collection` list
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CollectionEntry {
    pub id: String,
    pub set_name: String,
    pub member_name: String,
    pub group: String,
    pub pose: String,
    /// Signed on read so that bad values clamp instead of failing the whole file
    pub owned_count: i64,
    pub custom_image_url: Option<String>,
}

impl From<&Item> for CollectionEntry {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            set_name: item.series_name.clone(),
            member_name: item.subject_name.clone(),
            group: item.category.name().to_string(),
            pose: item.pose.as_str().to_string(),
            owned_count: i64::from(item.owned_count),
            custom_image_url: item.custom_image.clone(),
        }
    }
}

impl CollectionEntry {
    fn saved_state(&self) -> SavedState {
        let owned_count = self.owned_count.clamp(0, i64::from(u32::MAX)) as u32;
        let custom_image = self
            .custom_image_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        SavedState {
            owned_count,
            custom_image,
        }
    }
}

#[derive(Serialize)]
struct SnapshotOut<'a> {
    sets: &'a SeriesRegistry,
    collection: Vec<CollectionEntry>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SnapshotIn {
    sets: IndexMap<String, IndexMap<String, RawSeries>>,
    collection: Vec<CollectionEntry>,
}

/// Every per-series shape ever written
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSeries {
    Current {
        members_with_poses: IndexMap<String, Vec<String>>,
    },
    MemberList {
        member_list: Vec<String>,
        poses: Vec<String>,
    },
    PoseList(Vec<String>),
}

/// Result of parsing a snapshot file
#[derive(Debug, Default)]
pub struct ParsedSnapshot {
    pub registry: SeriesRegistry,
    /// Hydration cache keyed by item id
    pub saved: HashMap<String, SavedState>,
    /// True when a legacy shape was converted
    pub migrated: bool,
}

/// Serialize the registry and items in the current shape
pub fn render(registry: &SeriesRegistry, items: &[Item]) -> serde_json::Result<String> {
    let out = SnapshotOut {
        sets: registry,
        collection: items.iter().map(CollectionEntry::from).collect(),
    };
    serde_json::to_string_pretty(&out)
}

/// Parse snapshot text in any accepted shape
pub fn parse(text: &str, catalog: &Catalog) -> serde_json::Result<ParsedSnapshot> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Array(_) => {
            let entries: Vec<CollectionEntry> = serde_json::from_value(value)?;
            let mut saved = saved_map(&entries);
            let registry = registry_from_entries(&entries, catalog, &mut saved);
            Ok(ParsedSnapshot {
                registry,
                saved,
                migrated: true,
            })
        }
        Value::Object(_) => {
            let raw: SnapshotIn = serde_json::from_value(value)?;
            let mut parsed = ParsedSnapshot {
                saved: saved_map(&raw.collection),
                ..ParsedSnapshot::default()
            };
            for (group, series) in raw.sets {
                let Some(category) = Category::from_name(&group) else {
                    tracing::debug!(%group, "dropping unknown category");
                    continue;
                };
                let taken: Vec<String> = series.keys().cloned().collect();
                for (name, shape) in series {
                    let (definition, legacy) = normalize_series(shape, category, catalog);
                    parsed.migrated |= legacy;
                    let name = if is_reserved_name(&name) {
                        parsed.migrated = true;
                        rename_reserved(
                            &name,
                            category,
                            &definition,
                            &taken,
                            &parsed.registry,
                            &mut parsed.saved,
                        )
                    } else {
                        name
                    };
                    parsed.registry.insert(category, name, definition);
                }
            }
            Ok(parsed)
        }
        other => Err(serde::de::Error::custom(format!(
            "expected a JSON object or array at top level, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn saved_map(entries: &[CollectionEntry]) -> HashMap<String, SavedState> {
    entries
        .iter()
        .filter(|e| !e.id.is_empty())
        .map(|e| (e.id.clone(), e.saved_state()))
        .collect()
}

/// Valid pose keys in first-seen order
fn parse_poses(tokens: &[String]) -> Vec<PoseKey> {
    let mut poses = Vec::new();
    for token in tokens {
        match PoseKey::parse(token.trim()) {
            Some(pose) if !poses.contains(&pose) => poses.push(pose),
            Some(_) => {}
            None => tracing::debug!(%token, "dropping unknown pose key"),
        }
    }
    poses
}

/// Convert any per-series shape into a clean definition.
/// The flag reports whether the shape was a legacy one.
fn normalize_series(
    shape: RawSeries,
    category: Category,
    catalog: &Catalog,
) -> (SeriesDefinition, bool) {
    let (assignments, legacy): (Vec<(String, Vec<PoseKey>)>, bool) = match shape {
        RawSeries::Current { members_with_poses } => (
            members_with_poses
                .into_iter()
                .map(|(subject, poses)| {
                    let poses = parse_poses(&poses);
                    (subject, poses)
                })
                .collect(),
            false,
        ),
        RawSeries::MemberList { member_list, poses } => {
            let poses = parse_poses(&poses);
            (
                member_list
                    .into_iter()
                    .map(|subject| (subject, poses.clone()))
                    .collect(),
                true,
            )
        }
        RawSeries::PoseList(poses) => {
            let poses = parse_poses(&poses);
            (
                catalog
                    .in_category(category)
                    .map(|s| (s.name.clone(), poses.clone()))
                    .collect(),
                true,
            )
        }
    };

    let known = assignments.into_iter().filter(|(subject, _)| {
        let ok = catalog.subject_in(subject, category).is_some();
        if !ok {
            tracing::debug!(%subject, %category, "dropping subject not in catalog");
        }
        ok
    });
    (SeriesDefinition::from_assignments(known), legacy)
}

/// Pick a free name for a series called `all` and move its saved state over.
/// Counts are keyed by item id, which embeds the series name.
fn rename_reserved(
    name: &str,
    category: Category,
    definition: &SeriesDefinition,
    taken: &[String],
    registry: &SeriesRegistry,
    saved: &mut HashMap<String, SavedState>,
) -> String {
    let base = format!("{} series", name.trim());
    let mut renamed = base.clone();
    let mut suffix = 2;
    while taken.contains(&renamed) || registry.contains(category, &renamed) {
        renamed = format!("{} {}", base, suffix);
        suffix += 1;
    }
    tracing::warn!(
        %category,
        from = %name,
        to = %renamed,
        "series name collides with the all-series selection, renaming"
    );

    for (subject, poses) in &definition.members_with_poses {
        for &pose in poses {
            if let Some(state) = saved.remove(&item_id(subject, name, pose)) {
                saved.insert(item_id(subject, &renamed, pose), state);
            }
        }
    }
    renamed
}

/// Rebuild a registry from the oldest format, which only stored items
fn registry_from_entries(
    entries: &[CollectionEntry],
    catalog: &Catalog,
    saved: &mut HashMap<String, SavedState>,
) -> SeriesRegistry {
    let mut grouped: IndexMap<(Category, String), Vec<(String, Vec<PoseKey>)>> = IndexMap::new();
    for entry in entries {
        let Some(category) = Category::from_name(&entry.group) else {
            continue;
        };
        let Some(pose) = PoseKey::parse(&entry.pose) else {
            continue;
        };
        if entry.set_name.is_empty() || catalog.subject_in(&entry.member_name, category).is_none() {
            continue;
        }
        let subjects = grouped.entry((category, entry.set_name.clone())).or_default();
        match subjects.iter_mut().find(|(name, _)| *name == entry.member_name) {
            Some((_, poses)) => poses.push(pose),
            None => subjects.push((entry.member_name.clone(), vec![pose])),
        }
    }

    let mut registry = SeriesRegistry::new();
    for ((category, series), subjects) in &grouped {
        let definition = SeriesDefinition::from_assignments(subjects.iter().cloned());
        let name = if is_reserved_name(series) {
            let taken: Vec<String> = grouped
                .keys()
                .filter(|(c, _)| c == category)
                .map(|(_, name)| name.clone())
                .collect();
            rename_reserved(series, *category, &definition, &taken, &registry, saved)
        } else {
            series.clone()
        };
        registry.insert(*category, name, definition);
    }
    registry
}
