/// State management module
///
/// This module handles all collection state, including:
/// - Item records shared with callers (data.rs)
/// - The series registry and its transitions (registry.rs)
/// - Expanding the registry into items (universe.rs)
/// - The on-disk format and its migrations (snapshot.rs)
/// - Loading, reconciling and saving the snapshot (library.rs)
/// - Completion progress (progress.rs)
/// - Custom image sources (image.rs)
/// - The mutable collection facade (collection.rs)

pub mod collection;
pub mod data;
pub mod image;
pub mod library;
pub mod progress;
pub mod registry;
pub mod snapshot;
pub mod universe;
