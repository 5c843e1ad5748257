/// Shared data structures for the collection state
///
/// Items are derived from the series registry every time the universe is
/// rebuilt. Only their owned count and custom image survive a rebuild, and
/// they do so by matching on `id`.

use crate::catalog::{default_image_ref, Category, PoseKey, PoseVariant};

/// One trackable (series, subject, pose) photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// `<subject>_<series>_<pose>`, the reconciliation key
    pub id: String,
    pub series_name: String,
    pub subject_name: String,
    pub category: Category,
    pub pose: PoseKey,
    /// Number of copies owned
    pub owned_count: u32,
    /// URL or inline `data:` URI overriding the default image
    pub custom_image: Option<String>,
}

impl Item {
    /// Create a fresh item with nothing owned
    pub fn new(series_name: &str, subject_name: &str, category: Category, pose: PoseKey) -> Self {
        Self {
            id: item_id(subject_name, series_name, pose),
            series_name: series_name.to_string(),
            subject_name: subject_name.to_string(),
            category,
            pose,
            owned_count: 0,
            custom_image: None,
        }
    }

    pub fn pose_variant(&self) -> &'static PoseVariant {
        self.pose.variant()
    }

    /// Image to display: the custom override, else the derived default
    pub fn image_ref(&self) -> String {
        match &self.custom_image {
            Some(custom) => custom.clone(),
            None => default_image_ref(&self.subject_name, self.pose),
        }
    }

    pub fn has_custom_image(&self) -> bool {
        self.custom_image.is_some()
    }
}

/// Derive the stable item identifier
pub fn item_id(subject_name: &str, series_name: &str, pose: PoseKey) -> String {
    format!("{}_{}_{}", subject_name, series_name, pose.as_str())
}
