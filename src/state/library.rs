use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;

use super::data::Item;
use super::registry::SeriesRegistry;
use super::snapshot;
use super::universe::{build, hydrate};
use crate::catalog::Catalog;
use crate::config;
use crate::error::{CollectionError, Result};

/// The Library manages the JSON snapshot file.
/// It stores the series registry and the owned counts of every item.
pub struct Library {
    data_path: PathBuf,
}

/// Outcome of loading the snapshot
#[derive(Debug)]
pub struct Loaded {
    pub registry: SeriesRegistry,
    pub items: Vec<Item>,
    /// Problems that were recovered from; never fatal
    pub warnings: Vec<CollectionError>,
    /// True when a legacy on-disk shape was upgraded
    pub migrated: bool,
}

impl Library {
    /// Use an explicit snapshot path
    pub fn open(data_path: impl Into<PathBuf>) -> Self {
        Library {
            data_path: data_path.into(),
        }
    }

    /// Use the platform default location:
    /// - Linux: ~/.local/share/photo-collection/collection.json
    /// - macOS: ~/Library/Application Support/photo-collection/collection.json
    /// - Windows: %APPDATA%\photo-collection\collection.json
    pub fn open_default() -> Self {
        Self::open(config::default_data_file())
    }

    /// Get the path to the snapshot file
    pub fn path(&self) -> &Path {
        &self.data_path
    }

    /// Load, migrate, and reconcile the snapshot against the catalog.
    ///
    /// Never fails: read and parse problems fall back to an empty registry and
    /// are returned as warnings. The reconciled state is written back once, so
    /// legacy shapes and stale entries are healed on first load. The write is
    /// skipped when the existing file could not be read or moved aside, so
    /// nothing on disk is lost.
    pub fn load(&self, catalog: &Catalog) -> Loaded {
        let mut warnings = Vec::new();
        let mut write_back = true;

        let parsed = match fs::read(&self.data_path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) if text.trim().is_empty() => {
                    tracing::warn!(path = %self.data_path.display(), "snapshot is empty, starting fresh");
                    warnings.push(CollectionError::read(&self.data_path, "file is empty"));
                    snapshot::ParsedSnapshot::default()
                }
                Ok(text) => match snapshot::parse(&text, catalog) {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        write_back = self.recover_corrupt(e, &mut warnings);
                        snapshot::ParsedSnapshot::default()
                    }
                },
                Err(e) => {
                    write_back = self.recover_corrupt(e, &mut warnings);
                    snapshot::ParsedSnapshot::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.data_path.display(), "no snapshot yet, initializing");
                snapshot::ParsedSnapshot::default()
            }
            Err(e) => {
                tracing::warn!(path = %self.data_path.display(), error = %e, "could not read snapshot, leaving it untouched");
                warnings.push(CollectionError::read(&self.data_path, e));
                write_back = false;
                snapshot::ParsedSnapshot::default()
            }
        };

        if parsed.migrated {
            tracing::info!("upgraded legacy snapshot layout");
        }

        let mut items = build(catalog, &parsed.registry);
        let matched = hydrate(&mut items, &parsed.saved);
        let dropped = parsed.saved.len().saturating_sub(matched);
        if dropped > 0 {
            tracing::info!(dropped, "pruned saved entries that no longer match any item");
        }

        // Normalization pass
        if write_back {
            if let Err(e) = self.save(&parsed.registry, &items) {
                warnings.push(e);
            }
        }

        tracing::info!(items = items.len(), restored = matched, "collection loaded");

        Loaded {
            registry: parsed.registry,
            items,
            warnings,
            migrated: parsed.migrated,
        }
    }

    /// Overwrite the snapshot with the given state.
    ///
    /// The file is written to a sibling temp file and renamed into place, so a
    /// failed write leaves the previous snapshot intact.
    pub fn save(&self, registry: &SeriesRegistry, items: &[Item]) -> Result<()> {
        let text = snapshot::render(registry, items)
            .map_err(|e| CollectionError::write(&self.data_path, e))?;

        let parent = match self.data_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| CollectionError::write(&self.data_path, e))?;

        let mut tmp =
            NamedTempFile::new_in(&parent).map_err(|e| CollectionError::write(&self.data_path, e))?;
        tmp.write_all(text.as_bytes())
            .and_then(|_| tmp.flush())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| CollectionError::write(&self.data_path, e))?;
        tmp.persist(&self.data_path)
            .map_err(|e| CollectionError::write(&self.data_path, e.error))?;

        tracing::debug!(path = %self.data_path.display(), items = items.len(), "snapshot saved");
        Ok(())
    }

    /// Record an undecodable snapshot and move it aside.
    /// Returns whether the path is now free to be rewritten.
    fn recover_corrupt(
        &self,
        error: impl std::fmt::Display,
        warnings: &mut Vec<CollectionError>,
    ) -> bool {
        tracing::warn!(path = %self.data_path.display(), %error, "snapshot is corrupt, starting fresh");
        warnings.push(CollectionError::read(&self.data_path, error));
        self.quarantine()
    }

    /// Move an undecodable snapshot aside before the normalization pass overwrites it
    fn quarantine(&self) -> bool {
        let mut name = self.data_path.as_os_str().to_owned();
        name.push(format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%SZ")));
        let backup = PathBuf::from(name);
        match fs::rename(&self.data_path, &backup) {
            Ok(()) => {
                tracing::warn!(backup = %backup.display(), "kept a copy of the corrupt snapshot");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not keep a copy of the corrupt snapshot, leaving it in place");
                false
            }
        }
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("data_path", &self.data_path)
            .finish()
    }
}
