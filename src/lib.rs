//! Collectible photo tracker core
//!
//! Records how many copies of each photo item a collector owns, organizes
//! items into user-defined series, and reports completion per subject.
//! State lives in a single JSON snapshot owned by one process at a time.

pub mod catalog;
pub mod config;
pub mod error;
pub mod state;

pub use catalog::{Catalog, Category, PoseKey, PoseVariant, Subject, POSE_VARIANTS};
pub use error::{CollectionError, Result};
pub use state::collection::{coerce_count, Collection};
pub use state::data::Item;
pub use state::image::ImageSource;
pub use state::library::{Library, Loaded};
pub use state::progress::{
    aggregate, collection_summary, ranked, CollectionSummary, SeriesSelection, SubjectProgress,
    ALL_SERIES,
};
pub use state::registry::{SeriesDefinition, SeriesRegistry};
pub use state::universe::build;
