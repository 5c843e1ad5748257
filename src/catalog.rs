/// Static catalog of subjects and pose variants
///
/// The catalog is code-defined and never persisted. Only the `pinned` flag
/// on a subject can change at runtime, and it is a display-only hint.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CollectionError, Result};

/// Directory prefix for derived default image references
pub const DEFAULT_IMAGE_DIR: &str = "images";

// ========== Categories ==========

/// The three fixed groups a subject can belong to.
///
/// Serialized by display name, which is also the registry key and the
/// `group` field of collection entries on disk.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    #[serde(rename = "乃木坂46")]
    Nogizaka,
    #[serde(rename = "櫻坂46")]
    Sakurazaka,
    #[serde(rename = "日向坂46")]
    Hinatazaka,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 3] = [Category::Nogizaka, Category::Sakurazaka, Category::Hinatazaka];

    pub fn name(self) -> &'static str {
        match self {
            Category::Nogizaka => "乃木坂46",
            Category::Sakurazaka => "櫻坂46",
            Category::Hinatazaka => "日向坂46",
        }
    }

    /// Resolve a stored category key
    pub fn from_name(name: &str) -> Option<Category> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ========== Pose variants ==========

/// Stable pose token, as stored in the snapshot
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PoseKey {
    Y,
    C,
    H,
    T,
    SP,
}

/// Immutable description of one pose variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoseVariant {
    pub key: PoseKey,
    /// Display ordering, lowest first
    pub sort_order: u8,
    pub label: &'static str,
    /// Token used when deriving a default image reference
    pub image_suffix: &'static str,
}

/// The closed set of pose variants, in display order
pub static POSE_VARIANTS: [PoseVariant; 5] = [
    PoseVariant { key: PoseKey::Y, sort_order: 1, label: "ヨリ", image_suffix: "yori" },
    PoseVariant { key: PoseKey::C, sort_order: 2, label: "チュウ", image_suffix: "chuu" },
    PoseVariant { key: PoseKey::H, sort_order: 3, label: "ヒキ", image_suffix: "hiki" },
    PoseVariant { key: PoseKey::T, sort_order: 4, label: "座り", image_suffix: "suwari" },
    PoseVariant { key: PoseKey::SP, sort_order: 5, label: "スペシャル", image_suffix: "special" },
];

impl PoseKey {
    pub fn as_str(self) -> &'static str {
        match self {
            PoseKey::Y => "Y",
            PoseKey::C => "C",
            PoseKey::H => "H",
            PoseKey::T => "T",
            PoseKey::SP => "SP",
        }
    }

    /// Parse a stored token; unknown tokens yield `None`
    pub fn parse(token: &str) -> Option<PoseKey> {
        POSE_VARIANTS.iter().map(|v| v.key).find(|k| k.as_str() == token)
    }

    pub fn variant(self) -> &'static PoseVariant {
        // POSE_VARIANTS is laid out in declaration order
        &POSE_VARIANTS[self as usize]
    }
}

impl fmt::Display for PoseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ========== Subjects ==========

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub name: String,
    pub category: Category,
    /// Generation/cohort number, starting at 1
    pub cohort: u8,
    /// Display-only; never persisted
    pub pinned: bool,
}

impl Subject {
    pub fn new(name: impl Into<String>, category: Category, cohort: u8) -> Self {
        Self {
            name: name.into(),
            category,
            cohort,
            pinned: false,
        }
    }

    /// Default image reference for one of this subject's poses
    pub fn default_image_ref(&self, pose: PoseKey) -> String {
        default_image_ref(&self.name, pose)
    }
}

/// Derived image reference used when no custom image is set
pub fn default_image_ref(subject_name: &str, pose: PoseKey) -> String {
    format!(
        "{}/{}_{}.jpg",
        DEFAULT_IMAGE_DIR,
        subject_name,
        pose.variant().image_suffix
    )
}

/// The subject roster, in catalog order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    subjects: Vec<Subject>,
}

impl Catalog {
    /// Build a catalog from an explicit roster. Later duplicates of a name are ignored.
    pub fn from_subjects(subjects: impl IntoIterator<Item = Subject>) -> Self {
        let mut kept: Vec<Subject> = Vec::new();
        for subject in subjects {
            if kept.iter().any(|s| s.name == subject.name) {
                tracing::debug!(name = %subject.name, "duplicate subject ignored");
                continue;
            }
            kept.push(subject);
        }
        Self { subjects: kept }
    }

    /// The fixed roster shipped with the application
    pub fn builtin() -> Self {
        Self::from_subjects(
            BUILTIN_ROSTER
                .iter()
                .map(|&(name, category, cohort)| Subject::new(name, category, cohort)),
        )
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn subject(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.name == name)
    }

    /// Subject lookup that also checks category membership
    pub fn subject_in(&self, name: &str, category: Category) -> Option<&Subject> {
        self.subject(name).filter(|s| s.category == category)
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &Subject> {
        self.subjects.iter().filter(move |s| s.category == category)
    }

    /// Toggle the display-only pinned flag
    pub fn set_pinned(&mut self, name: &str, pinned: bool) -> Result<()> {
        let subject = self
            .subjects
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| CollectionError::NotFound(format!("subject '{}'", name)))?;
        subject.pinned = pinned;
        Ok(())
    }

    /// A category's subjects for display: pinned first, then by cohort, then catalog order
    pub fn display_order(&self, category: Category) -> Vec<&Subject> {
        let mut subjects: Vec<&Subject> = self.in_category(category).collect();
        // Stable sort keeps catalog order within a cohort
        subjects.sort_by_key(|s| (!s.pinned, s.cohort));
        subjects
    }
}

const BUILTIN_ROSTER: &[(&str, Category, u8)] = &[
    // 乃木坂46
    ("梅澤美波", Category::Nogizaka, 3),
    ("岩本蓮加", Category::Nogizaka, 3),
    ("与田祐希", Category::Nogizaka, 3),
    ("久保史緒里", Category::Nogizaka, 3),
    ("遠藤さくら", Category::Nogizaka, 4),
    ("賀喜遥香", Category::Nogizaka, 4),
    ("筒井あやめ", Category::Nogizaka, 4),
    ("田村真佑", Category::Nogizaka, 4),
    ("金川紗耶", Category::Nogizaka, 4),
    ("清宮レイ", Category::Nogizaka, 4),
    ("井上和", Category::Nogizaka, 5),
    ("一ノ瀬美空", Category::Nogizaka, 5),
    ("川﨑桜", Category::Nogizaka, 5),
    ("菅原咲月", Category::Nogizaka, 5),
    ("五百城茉央", Category::Nogizaka, 5),
    ("冨里奈央", Category::Nogizaka, 5),
    ("奥田いろは", Category::Nogizaka, 5),
    ("中西アルノ", Category::Nogizaka, 5),
    ("矢田萌華", Category::Nogizaka, 6),
    ("瀬戸口心月", Category::Nogizaka, 6),
    ("川端晃菜", Category::Nogizaka, 6),
    ("海邉朱莉", Category::Nogizaka, 6),
    ("長嶋凛桜", Category::Nogizaka, 6),
    ("森平麗心", Category::Nogizaka, 6),
    ("愛宕心響", Category::Nogizaka, 6),
    ("大越ひなの", Category::Nogizaka, 6),
    ("鈴木佑捺", Category::Nogizaka, 6),
    ("小津玲奈", Category::Nogizaka, 6),
    ("増田三莉音", Category::Nogizaka, 6),
    // 櫻坂46
    ("田村保乃", Category::Sakurazaka, 2),
    ("森田ひかる", Category::Sakurazaka, 2),
    ("松田里奈", Category::Sakurazaka, 2),
    ("守屋麗奈", Category::Sakurazaka, 2),
    ("大園玲", Category::Sakurazaka, 2),
    ("武元唯衣", Category::Sakurazaka, 2),
    ("谷口愛理", Category::Sakurazaka, 3),
    ("中嶋優月", Category::Sakurazaka, 3),
    ("山下瞳月", Category::Sakurazaka, 3),
    ("村井優", Category::Sakurazaka, 3),
    ("的野美青", Category::Sakurazaka, 3),
    ("石森璃花", Category::Sakurazaka, 3),
    ("浅井恋乃未", Category::Sakurazaka, 4),
    ("稲熊ひな", Category::Sakurazaka, 4),
    ("勝又春", Category::Sakurazaka, 4),
    ("佐藤愛桜", Category::Sakurazaka, 4),
    ("中川智尋", Category::Sakurazaka, 4),
    ("松本和子", Category::Sakurazaka, 4),
    ("目黒陽色", Category::Sakurazaka, 4),
    ("山川宇衣", Category::Sakurazaka, 4),
    ("山田桃実", Category::Sakurazaka, 4),
    // 日向坂46
    ("佐々木久美", Category::Hinatazaka, 1),
    ("高瀬愛奈", Category::Hinatazaka, 1),
    ("佐々木美玲", Category::Hinatazaka, 1),
    ("金村美玖", Category::Hinatazaka, 2),
    ("河田陽菜", Category::Hinatazaka, 2),
    ("小坂菜緒", Category::Hinatazaka, 2),
    ("丹生明里", Category::Hinatazaka, 2),
    ("松田好花", Category::Hinatazaka, 2),
    ("上村ひなの", Category::Hinatazaka, 3),
    ("髙橋未來虹", Category::Hinatazaka, 3),
    ("森本茉莉", Category::Hinatazaka, 3),
    ("清水理央", Category::Hinatazaka, 4),
    ("正源司陽子", Category::Hinatazaka, 4),
    ("山下葉留花", Category::Hinatazaka, 4),
    ("藤嶌果歩", Category::Hinatazaka, 4),
    ("平尾帆夏", Category::Hinatazaka, 4),
    ("大田美月", Category::Hinatazaka, 5),
    ("大野愛実", Category::Hinatazaka, 5),
    ("片山紗希", Category::Hinatazaka, 5),
    ("蔵盛妃那乃", Category::Hinatazaka, 5),
    ("坂井新奈", Category::Hinatazaka, 5),
    ("佐藤優羽", Category::Hinatazaka, 5),
    ("下田衣珠季", Category::Hinatazaka, 5),
    ("高井俐香", Category::Hinatazaka, 5),
    ("鶴崎仁香", Category::Hinatazaka, 5),
    ("松尾桜", Category::Hinatazaka, 5),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_tokens_round_trip() {
        for variant in POSE_VARIANTS {
            assert_eq!(PoseKey::parse(variant.key.as_str()), Some(variant.key));
            assert_eq!(variant.key.variant().label, variant.label);
        }
        assert_eq!(PoseKey::parse("SPY"), None);
        assert_eq!(PoseKey::parse("y"), None);
    }

    #[test]
    fn test_category_names_match_serde() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.name()));
            assert_eq!(Category::from_name(category.name()), Some(category));
        }
        assert_eq!(Category::from_name("G1"), None);
    }

    #[test]
    fn test_builtin_roster_is_unique_and_covers_all_categories() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.subjects().len(), BUILTIN_ROSTER.len());
        for category in Category::ALL {
            assert!(catalog.in_category(category).count() > 0);
        }
    }

    #[test]
    fn test_duplicate_subject_is_ignored() {
        let catalog = Catalog::from_subjects([
            Subject::new("Alice", Category::Nogizaka, 1),
            Subject::new("Alice", Category::Hinatazaka, 2),
        ]);
        assert_eq!(catalog.subjects().len(), 1);
        assert_eq!(catalog.subject("Alice").unwrap().category, Category::Nogizaka);
        assert!(catalog.subject_in("Alice", Category::Hinatazaka).is_none());
    }

    #[test]
    fn test_display_order_puts_pinned_first() {
        let mut catalog = Catalog::from_subjects([
            Subject::new("A", Category::Nogizaka, 3),
            Subject::new("B", Category::Nogizaka, 1),
            Subject::new("C", Category::Nogizaka, 3),
            Subject::new("D", Category::Sakurazaka, 1),
        ]);
        let names: Vec<_> = catalog
            .display_order(Category::Nogizaka)
            .iter()
            .map(|s| s.name.clone())
            .collect();
        assert_eq!(names, vec!["B", "A", "C"]);

        catalog.set_pinned("C", true).unwrap();
        let names: Vec<_> = catalog
            .display_order(Category::Nogizaka)
            .iter()
            .map(|s| s.name.clone())
            .collect();
        assert_eq!(names, vec!["C", "B", "A"]);

        assert!(matches!(
            catalog.set_pinned("Nobody", true),
            Err(CollectionError::NotFound(_))
        ));
    }

    #[test]
    fn test_default_image_ref_uses_suffix() {
        let subject = Subject::new("Alice", Category::Nogizaka, 1);
        assert_eq!(subject.default_image_ref(PoseKey::H), "images/Alice_hiki.jpg");
    }
}
