// SPDX-License-Identifier: GPL-3.0-only

//! JSON persistence for the keyboard height cache.

use super::{HeightCache, HeightContext};
use crate::error::{PopupError, PopupResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// One persisted cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct HeightEntry {
    #[serde(flatten)]
    context: HeightContext,
    height: u32,
}

/// On-disk layout of the cache file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct HeightFile {
    version: u64,
    entries: Vec<HeightEntry>,
}

const HEIGHT_FILE_VERSION: u64 = 1;

impl HeightCache {
    /// Loads a cache from `path`. A missing file yields an empty cache.
    pub fn load(path: impl AsRef<Path>) -> PopupResult<Self> {
        let path = path.as_ref();
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No height cache at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(PopupError::io(e, path)),
        };

        let file: HeightFile = serde_json::from_str(&json).map_err(|e| PopupError::json(e, path))?;
        if file.version != HEIGHT_FILE_VERSION {
            tracing::warn!(
                "Height cache {} has version {}, expected {}; ignoring",
                path.display(),
                file.version,
                HEIGHT_FILE_VERSION
            );
            return Ok(Self::new());
        }

        let cache = Self::new();
        for entry in file.entries {
            cache.set(&entry.context, entry.height);
        }
        tracing::info!(
            "Loaded {} keyboard height(s) from {}",
            cache.len(),
            path.display()
        );
        Ok(cache)
    }

    /// Writes the cache to `path`, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> PopupResult<()> {
        let path = path.as_ref();
        let mut entries: Vec<HeightEntry> = self
            .heights
            .borrow()
            .iter()
            .map(|(context, height)| HeightEntry {
                context: *context,
                height: *height,
            })
            .collect();
        // Stable output keeps the file diffable.
        entries.sort_by_key(|e| (e.context.display_width, e.context.display_height));

        let file = HeightFile {
            version: HEIGHT_FILE_VERSION,
            entries,
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| PopupError::json(e, path))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PopupError::io(e, parent))?;
        }
        fs::write(path, json).map_err(|e| PopupError::io(e, path))?;
        tracing::debug!("Saved keyboard heights to {}", path.display());
        Ok(())
    }
}
