//! End-to-end scenarios over an on-disk snapshot
//!
//! Each test works in its own temp directory and reopens the collection
//! from disk to check what actually persisted.

use std::fs;
use std::path::{Path, PathBuf};

use photo_collection::{
    build, Catalog, Category, Collection, CollectionError, ImageSource, Library, PoseKey,
    SeriesDefinition, SeriesSelection, Subject,
};
use tempfile::TempDir;

fn catalog() -> Catalog {
    Catalog::from_subjects([
        Subject::new("Alice", Category::Nogizaka, 1),
        Subject::new("Bob", Category::Nogizaka, 2),
        Subject::new("Hana", Category::Hinatazaka, 4),
    ])
}

fn data_path(dir: &TempDir) -> PathBuf {
    dir.path().join("collection.json")
}

fn open(path: &Path) -> Collection {
    Collection::open(catalog(), Library::open(path))
}

fn alice_yc() -> SeriesDefinition {
    SeriesDefinition::from_assignments([("Alice", vec![PoseKey::Y, PoseKey::C])])
}

#[test]
fn test_create_then_populate() {
    let dir = TempDir::new().unwrap();
    let mut collection = open(&data_path(&dir));

    collection.create_series(Category::Nogizaka, "S1").unwrap();
    assert!(collection.items().is_empty());
    collection
        .update_series(Category::Nogizaka, "S1", alice_yc())
        .unwrap();

    let items = build(collection.catalog(), collection.registry());
    let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["Alice_S1_Y", "Alice_S1_C"]);
    assert!(items.iter().all(|i| i.owned_count == 0));
    assert_eq!(collection.items(), items.as_slice());
}

#[test]
fn test_hydration_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = data_path(&dir);
    {
        let mut collection = open(&path);
        collection.create_series(Category::Nogizaka, "S1").unwrap();
        collection
            .update_series(Category::Nogizaka, "S1", alice_yc())
            .unwrap();
        collection.set_owned_count("Alice_S1_Y", 3).unwrap();
        collection
            .set_custom_image("Alice_S1_C", ImageSource::Upload(b"GIF89a....".to_vec()))
            .unwrap();
    }

    let reopened = open(&path);
    assert_eq!(reopened.item("Alice_S1_Y").unwrap().owned_count, 3);
    let custom = reopened.item("Alice_S1_C").unwrap().custom_image.clone().unwrap();
    assert!(custom.starts_with("data:image/gif;base64,"));
}

#[test]
fn test_reconciliation_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = data_path(&dir);
    {
        let mut collection = open(&path);
        collection.create_series(Category::Nogizaka, "S1").unwrap();
        collection
            .update_series(Category::Nogizaka, "S1", alice_yc())
            .unwrap();
        collection.set_owned_count("Alice_S1_C", 7).unwrap();
    }

    drop(open(&path));
    let first = fs::read_to_string(&path).unwrap();
    drop(open(&path));
    let second = fs::read_to_string(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_removed_pose_is_pruned() {
    let dir = TempDir::new().unwrap();
    let path = data_path(&dir);
    {
        let mut collection = open(&path);
        collection.create_series(Category::Nogizaka, "S1").unwrap();
        collection
            .update_series(Category::Nogizaka, "S1", alice_yc())
            .unwrap();
        collection.set_owned_count("Alice_S1_C", 2).unwrap();
        collection
            .update_series(
                Category::Nogizaka,
                "S1",
                SeriesDefinition::from_assignments([("Alice", vec![PoseKey::Y])]),
            )
            .unwrap();
    }

    let reopened = open(&path);
    assert!(reopened.item("Alice_S1_C").is_none());
    let text = fs::read_to_string(&path).unwrap();
    assert!(!text.contains("Alice_S1_C"));

    // Re-adding the pose starts from zero
    let mut reopened = reopened;
    reopened
        .update_series(Category::Nogizaka, "S1", alice_yc())
        .unwrap();
    assert_eq!(reopened.item("Alice_S1_C").unwrap().owned_count, 0);
}

#[test]
fn test_delete_cascades() {
    let dir = TempDir::new().unwrap();
    let path = data_path(&dir);
    {
        let mut collection = open(&path);
        collection.create_series(Category::Nogizaka, "S1").unwrap();
        collection.create_series(Category::Nogizaka, "S2").unwrap();
        collection
            .update_series(Category::Nogizaka, "S1", alice_yc())
            .unwrap();
        collection
            .update_series(Category::Nogizaka, "S2", alice_yc())
            .unwrap();
        collection.set_owned_count("Alice_S1_Y", 4).unwrap();
        collection.set_owned_count("Alice_S2_Y", 1).unwrap();

        assert_eq!(collection.delete_series(Category::Nogizaka, "S1").unwrap(), 2);
        assert!(matches!(
            collection.delete_series(Category::Nogizaka, "S1"),
            Err(CollectionError::NotFound(_))
        ));
    }

    let reopened = open(&path);
    assert!(reopened.items().iter().all(|i| i.series_name != "S1"));
    assert_eq!(reopened.item("Alice_S2_Y").unwrap().owned_count, 1);
    assert!(!fs::read_to_string(&path).unwrap().contains("Alice_S1_"));
}

#[test]
fn test_legacy_member_list_is_migrated_and_resaved() {
    let dir = TempDir::new().unwrap();
    let path = data_path(&dir);
    fs::write(
        &path,
        r#"{"sets":{"乃木坂46":{"S1":{"member_list":["Alice"],"poses":["Y","C"]}}},
            "collection":[{"id":"Alice_S1_C","owned_count":2}]}"#,
    )
    .unwrap();

    let collection = open(&path);
    assert!(collection.was_migrated());
    assert_eq!(collection.items().len(), 2);
    assert_eq!(collection.item("Alice_S1_C").unwrap().owned_count, 2);

    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        saved["sets"]["乃木坂46"]["S1"],
        serde_json::json!({"members_with_poses": {"Alice": ["Y", "C"]}})
    );

    // Second open reads the current shape
    assert!(!open(&path).was_migrated());
}

#[test]
fn test_top_up_is_monotonic_and_persisted() {
    let dir = TempDir::new().unwrap();
    let path = data_path(&dir);
    let mut collection = open(&path);
    collection.create_series(Category::Nogizaka, "S1").unwrap();
    collection
        .update_series(Category::Nogizaka, "S1", alice_yc())
        .unwrap();
    collection.set_owned_count("Alice_S1_Y", 9).unwrap();

    let selection = SeriesSelection::parse("S1");
    let before: Vec<u32> = collection.items().iter().map(|i| i.owned_count).collect();
    assert_eq!(collection.top_up("Alice", &selection, 3).unwrap(), 1);
    let after: Vec<u32> = collection.items().iter().map(|i| i.owned_count).collect();
    for (b, a) in before.iter().zip(&after) {
        assert!(a >= b);
        assert!(*a >= 3);
    }

    let reopened = open(&path);
    assert_eq!(reopened.item("Alice_S1_C").unwrap().owned_count, 3);
    assert_eq!(reopened.item("Alice_S1_Y").unwrap().owned_count, 9);
}

#[test]
fn test_completion_bounded_with_surplus() {
    let dir = TempDir::new().unwrap();
    let mut collection = open(&data_path(&dir));
    collection.create_series(Category::Nogizaka, "S1").unwrap();
    collection
        .update_series(Category::Nogizaka, "S1", alice_yc())
        .unwrap();
    collection.set_owned_count("Alice_S1_Y", 10).unwrap();
    collection.set_owned_count("Alice_S1_C", 10).unwrap();

    let progress = collection.progress(&SeriesSelection::All);
    let alice = &progress["Alice"];
    assert_eq!(alice.completion_percent(), 100.0);
    assert_eq!(alice.surplus(), 18);
}

#[test]
fn test_failed_save_leaves_state_and_file_intact() {
    let dir = TempDir::new().unwrap();
    let path = data_path(&dir);
    let mut collection = open(&path);
    collection.create_series(Category::Nogizaka, "S1").unwrap();
    collection
        .update_series(Category::Nogizaka, "S1", alice_yc())
        .unwrap();
    let on_disk = fs::read_to_string(&path).unwrap();

    // Replace the snapshot with a directory so the rename fails
    fs::remove_file(&path).unwrap();
    fs::create_dir(&path).unwrap();

    let err = collection.set_owned_count("Alice_S1_Y", 5).unwrap_err();
    assert!(matches!(err, CollectionError::StorageWrite { .. }));
    assert_eq!(collection.item("Alice_S1_Y").unwrap().owned_count, 0);

    let err = collection.delete_series(Category::Nogizaka, "S1").unwrap_err();
    assert!(matches!(err, CollectionError::StorageWrite { .. }));
    assert!(collection.registry().contains(Category::Nogizaka, "S1"));

    fs::remove_dir(&path).unwrap();
    fs::write(&path, &on_disk).unwrap();
    assert_eq!(open(&path).items().len(), 2);
}

#[test]
fn test_subjects_from_other_category_are_ignored() {
    let dir = TempDir::new().unwrap();
    let mut collection = open(&data_path(&dir));
    collection.create_series(Category::Hinatazaka, "H1").unwrap();
    collection
        .update_series(
            Category::Hinatazaka,
            "H1",
            SeriesDefinition::from_assignments([
                ("Hana", vec![PoseKey::SP]),
                ("Alice", vec![PoseKey::Y]),
            ]),
        )
        .unwrap();
    let ids: Vec<&str> = collection.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["Hana_H1_SP"]);
}

#[test]
fn test_creation_order_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = data_path(&dir);
    {
        let mut collection = open(&path);
        collection.create_series(Category::Nogizaka, "Zeta").unwrap();
        collection.create_series(Category::Nogizaka, "Alpha").unwrap();
        collection
            .update_series(
                Category::Nogizaka,
                "Alpha",
                SeriesDefinition::from_assignments([
                    ("Bob", vec![PoseKey::Y]),
                    ("Alice", vec![PoseKey::C]),
                ]),
            )
            .unwrap();
    }

    let reopened = open(&path);
    assert_eq!(
        reopened.registry().series_names(Category::Nogizaka),
        vec!["Zeta", "Alpha"]
    );
    let ids: Vec<&str> = reopened.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["Bob_Alpha_Y", "Alice_Alpha_C"]);
}

#[test]
fn test_top_up_on_unknown_series_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = data_path(&dir);
    let mut collection = open(&path);
    collection.create_series(Category::Nogizaka, "S1").unwrap();
    collection
        .update_series(Category::Nogizaka, "S1", alice_yc())
        .unwrap();
    let on_disk = fs::read_to_string(&path).unwrap();

    let err = collection
        .top_up("Alice", &SeriesSelection::parse("S2"), 5)
        .unwrap_err();
    assert!(matches!(err, CollectionError::NotFound(_)));
    assert_eq!(fs::read_to_string(&path).unwrap(), on_disk);
}

#[test]
fn test_loaded_series_named_all_is_renamed() {
    let dir = TempDir::new().unwrap();
    let path = data_path(&dir);
    fs::write(
        &path,
        r#"{"sets":{"乃木坂46":{"ALL":{"members_with_poses":{"Alice":["Y"]}}}},
            "collection":[{"id":"Alice_ALL_Y","owned_count":4}]}"#,
    )
    .unwrap();

    let collection = open(&path);
    assert!(!collection.registry().contains(Category::Nogizaka, "ALL"));
    assert_eq!(collection.item("Alice_ALL series_Y").unwrap().owned_count, 4);

    // The renamed series is selectable on its own
    let progress = collection.progress(&SeriesSelection::parse("ALL series"));
    assert_eq!(progress["Alice"].total_owned, 4);
}
