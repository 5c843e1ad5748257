/// Completion progress per subject
///
/// One owned copy of every item counts as a full set. Copies beyond that
/// are surplus and never push completion past 100%.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::data::Item;
use crate::catalog::Category;

/// Sentinel selection meaning "every series"
pub const ALL_SERIES: &str = "all";

/// Which series a view or bulk operation applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesSelection {
    All,
    Series(String),
}

impl SeriesSelection {
    /// Interpret a raw selection coming from the UI
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case(ALL_SERIES) {
            SeriesSelection::All
        } else {
            SeriesSelection::Series(raw.to_string())
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        match self {
            SeriesSelection::All => true,
            SeriesSelection::Series(name) => item.series_name == *name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectProgress {
    pub category: Category,
    /// One per distinct item
    pub total_needed: u32,
    pub total_owned: u32,
}

impl SubjectProgress {
    /// Completion in [0, 100]
    pub fn completion_percent(&self) -> f64 {
        if self.total_needed == 0 {
            return 0.0;
        }
        let owned = self.total_owned.min(self.total_needed);
        f64::from(owned) / f64::from(self.total_needed) * 100.0
    }

    /// Copies owned beyond one full set
    pub fn surplus(&self) -> u32 {
        self.total_owned.saturating_sub(self.total_needed)
    }

    pub fn is_complete(&self) -> bool {
        self.total_needed > 0 && self.total_owned >= self.total_needed
    }
}

/// Totals per subject for the selected series
pub fn aggregate<'a, I>(items: I, selection: &SeriesSelection) -> BTreeMap<String, SubjectProgress>
where
    I: IntoIterator<Item = &'a Item>,
{
    let mut progress: BTreeMap<String, SubjectProgress> = BTreeMap::new();
    for item in items.into_iter().filter(|i| selection.matches(i)) {
        let entry = progress
            .entry(item.subject_name.clone())
            .or_insert_with(|| SubjectProgress {
                category: item.category,
                total_needed: 0,
                total_owned: 0,
            });
        entry.total_needed = entry.total_needed.saturating_add(1);
        entry.total_owned = entry.total_owned.saturating_add(item.owned_count);
    }
    progress
}

/// Display order: completion descending, then subject name ascending
pub fn ranked(progress: &BTreeMap<String, SubjectProgress>) -> Vec<(&str, &SubjectProgress)> {
    let mut rows: Vec<(&str, &SubjectProgress)> =
        progress.iter().map(|(name, p)| (name.as_str(), p)).collect();
    rows.sort_by(|a, b| {
        b.1.completion_percent()
            .partial_cmp(&a.1.completion_percent())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    rows
}

/// Collection-wide totals for a selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    pub subjects: usize,
    pub complete_subjects: usize,
    pub total_needed: u32,
    /// Owned copies capped at one per item
    pub total_collected: u32,
    pub total_surplus: u32,
}

impl CollectionSummary {
    pub fn completion_percent(&self) -> f64 {
        if self.total_needed == 0 {
            0.0
        } else {
            f64::from(self.total_collected) / f64::from(self.total_needed) * 100.0
        }
    }
}

pub fn collection_summary(progress: &BTreeMap<String, SubjectProgress>) -> CollectionSummary {
    progress.values().fold(CollectionSummary::default(), |mut acc, p| {
        acc.subjects += 1;
        if p.is_complete() {
            acc.complete_subjects += 1;
        }
        acc.total_needed = acc.total_needed.saturating_add(p.total_needed);
        acc.total_collected = acc
            .total_collected
            .saturating_add(p.total_owned.min(p.total_needed));
        acc.total_surplus = acc.total_surplus.saturating_add(p.surplus());
        acc
    })
}
